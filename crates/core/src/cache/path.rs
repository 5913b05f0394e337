//! Cache file naming.
//!
//! Layout: `<dir>/<sha256(url)>[_min]<extname>`.

use std::path::PathBuf;

use super::hash::compute_cache_key;
use crate::CacheConfig;

/// Filename suffix marking a compressed cache file.
pub const COMPRESSED_SUFFIX: &str = "_min";

/// Resolve the cache file path for `url` under `config`.
pub fn resolve(url: &str, config: &CacheConfig) -> PathBuf {
    resolve_key(&compute_cache_key(url), config)
}

/// Resolve the cache file path for a precomputed hash key.
pub fn resolve_key(hash_key: &str, config: &CacheConfig) -> PathBuf {
    let suffix = if config.compressed { COMPRESSED_SUFFIX } else { "" };
    config.dir.join(format!("{hash_key}{suffix}{}", config.extname))
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/a.png";

    #[test]
    fn test_resolve_stable() {
        let config = CacheConfig::with_dir("/var/cache/img");
        assert_eq!(resolve(URL, &config), resolve(URL, &config));
    }

    #[test]
    fn test_resolve_layout() {
        let config = CacheConfig::with_dir("/var/cache/img");
        let path = resolve(URL, &config);

        assert_eq!(path.parent().unwrap(), std::path::Path::new("/var/cache/img"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name, format!("{}.cache", compute_cache_key(URL)));
    }

    #[test]
    fn test_resolve_compressed_suffix() {
        let config = CacheConfig { compressed: true, ..CacheConfig::with_dir("/var/cache/img") };
        let name = resolve(URL, &config).file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.ends_with("_min.cache"));
    }

    #[test]
    fn test_resolve_custom_extname() {
        let config = CacheConfig { extname: ".img".into(), ..CacheConfig::with_dir("/var/cache/img") };
        assert_eq!(resolve(URL, &config).extension().unwrap(), "img");
    }

    #[test]
    fn test_resolve_ignores_proxy_setting() {
        let plain = CacheConfig::with_dir("/var/cache/img");
        let proxied = CacheConfig { google_cache: true, proxy_width: Some(100), ..plain.clone() };
        assert_eq!(resolve(URL, &plain), resolve(URL, &proxied));
    }

    #[test]
    fn test_resolve_key_matches_resolve() {
        let config = CacheConfig::with_dir("/var/cache/img");
        assert_eq!(resolve_key(&compute_cache_key(URL), &config), resolve(URL, &config));
    }
}
