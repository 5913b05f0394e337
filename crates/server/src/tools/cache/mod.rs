//! Cache inspection and eviction tools.
//!
//! These never touch the network.

pub mod get;
pub mod purge;

pub use get::{get_impl, is_cached_impl};
pub use purge::{flush_impl, remove_impl};
