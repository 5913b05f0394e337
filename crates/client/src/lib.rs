//! Client code for imgcache.
//!
//! This crate provides the HTTP retrieval client that turns an image URL
//! into a base64 data URI for the cache in `imgcache-core`.

pub mod fetch;

pub use fetch::{ClientConfig, ClientError, ImageClient, UrlError, canonicalize};
