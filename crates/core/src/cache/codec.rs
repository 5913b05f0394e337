//! On-disk encoding of cache records.
//!
//! Records are stored as JSON. With `compressed` set the JSON is wrapped in
//! a zlib stream. Reading a file with the other compression setting fails
//! with [`Error::Decode`].

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use super::record::CacheRecord;
use crate::{CacheConfig, Error};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Encode a record into the bytes written to its cache file.
///
/// Failures are write-side I/O errors; the caller attaches the path.
pub fn encode(record: &CacheRecord, config: &CacheConfig) -> io::Result<Vec<u8>> {
    let json = serde_json::to_vec(record)?;

    if !config.compressed {
        return Ok(json);
    }

    let mut encoder = ZlibEncoder::new(Vec::with_capacity(json.len() / 2), Compression::default());
    encoder.write_all(&json)?;
    encoder.finish()
}

/// Decode the bytes of a cache file back into a record.
pub fn decode(bytes: &[u8], config: &CacheConfig) -> Result<CacheRecord, Error> {
    let inflated = if config.compressed {
        let mut buf = Vec::with_capacity(bytes.len() * 2);
        ZlibDecoder::new(bytes)
            .read_to_end(&mut buf)
            .map_err(|e| Error::Decode(format!("failed to decompress record: {e}")))?;
        Some(buf)
    } else {
        None
    };

    let json = inflated.as_deref().unwrap_or(bytes);
    let json = json.strip_prefix(UTF8_BOM).unwrap_or(json);

    serde_json::from_slice(json).map_err(|e| Error::Decode(format!("invalid cache record: {e}")))
}
