//! Request URL normalization.
//!
//! Only the URL sent over the wire is normalized. Cache keys are derived
//! from the caller's original string in `imgcache-core`.

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("invalid URL: {0}")]
    Invalid(String),
}

/// Normalize an image URL before requesting it.
///
/// Trims whitespace, assumes `https://` when no scheme is given, accepts
/// only http(s), lowercases the host and drops any fragment. The query
/// string is left exactly as written.
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let with_scheme =
        if trimmed.contains("://") { std::borrow::Cow::Borrowed(trimmed) } else { format!("https://{trimmed}").into() };

    let mut parsed = url::Url::parse(&with_scheme).map_err(|e| UrlError::Invalid(e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(UrlError::UnsupportedScheme(parsed.scheme().to_string()));
    }

    let host = parsed
        .host_str()
        .map(str::to_lowercase)
        .ok_or_else(|| UrlError::MissingHost(trimmed.to_string()))?;
    parsed.set_host(Some(&host)).map_err(|e| UrlError::Invalid(e.to_string()))?;
    parsed.set_fragment(None);

    Ok(parsed)
}
