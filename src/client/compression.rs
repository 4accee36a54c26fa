//! Gzip encoding of JSON request bodies.

use std::io::Write;

use flate2::{write::GzEncoder, Compression};
use serde::Serialize;

/// Serialize `value` to JSON and gzip it
pub fn gzip_json<T: Serialize>(value: &T) -> std::io::Result<Vec<u8>> {
    let json = serde_json::to_vec(value)?;
    let mut encoder = GzEncoder::new(Vec::with_capacity(json.len() / 2), Compression::default());
    encoder.write_all(&json)?;
    encoder.finish()
}
