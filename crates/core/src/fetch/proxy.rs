//! Google image proxy URL rewriting.
//!
//! Only the retrieval URL is rewritten. Cache keys are always computed from
//! the original URL.

use url::form_urlencoded;

use crate::CacheConfig;

pub const GOOGLE_PROXY_ENDPOINT: &str = "https://images1-focus-opensocial.googleusercontent.com/gadgets/proxy";

/// Build the proxied retrieval URL for `url`.
pub fn proxy_url(url: &str, config: &CacheConfig) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("container", "focus").append_pair("url", url);

    if let Some(width) = config.proxy_width {
        query.append_pair("resize_w", &width.to_string());
    }
    if let Some(refresh) = config.proxy_refresh {
        query.append_pair("refresh", &refresh.to_string());
    }

    format!("{GOOGLE_PROXY_ENDPOINT}?{}", query.finish())
}
