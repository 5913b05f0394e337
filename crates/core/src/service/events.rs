//! Typed observer lists for cache events.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::Error;

/// Operations that notify observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheEvent {
    Get,
    Set,
    Fetch,
    Remove,
    Flush,
}

impl CacheEvent {
    pub const ALL: [CacheEvent; 5] =
        [CacheEvent::Get, CacheEvent::Set, CacheEvent::Fetch, CacheEvent::Remove, CacheEvent::Flush];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheEvent::Get => "get",
            CacheEvent::Set => "set",
            CacheEvent::Fetch => "fetch",
            CacheEvent::Remove => "remove",
            CacheEvent::Flush => "flush",
        }
    }
}

impl fmt::Display for CacheEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheEvent {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        CacheEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == name)
            .ok_or_else(|| Error::UnknownEvent(name.to_string()))
    }
}

/// What an observer is told about a completed operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPayload {
    /// The URL the operation concerned; `None` for directory-wide events.
    pub url: Option<String>,
    /// Rendered error, when the operation failed.
    pub error: Option<String>,
}

impl EventPayload {
    pub fn from_result<T>(url: Option<&str>, result: &Result<T, Error>) -> Self {
        Self { url: url.map(str::to_string), error: result.as_ref().err().map(ToString::to_string) }
    }
}

pub type EventHandler = Arc<dyn Fn(&EventPayload) + Send + Sync>;

/// Registered observers, per event kind.
#[derive(Default)]
pub struct Hooks {
    handlers: RwLock<HashMap<CacheEvent, Vec<EventHandler>>>,
}

impl Hooks {
    pub fn register(&self, event: CacheEvent, handler: EventHandler) {
        self.handlers.write().entry(event).or_default().push(handler);
    }

    /// Call every handler for `event` in registration order.
    ///
    /// The registry lock is released before handlers run, so a handler may
    /// register further handlers.
    pub fn emit(&self, event: CacheEvent, payload: &EventPayload) {
        let handlers = self.handlers.read().get(&event).cloned().unwrap_or_default();
        for handler in handlers {
            handler(payload);
        }
    }

    pub fn count(&self, event: CacheEvent) -> usize {
        self.handlers.read().get(&event).map_or(0, Vec::len)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.read();
        let mut map = f.debug_map();
        for event in CacheEvent::ALL {
            map.entry(&event.as_str(), &handlers.get(&event).map_or(0, Vec::len));
        }
        map.finish()
    }
}
