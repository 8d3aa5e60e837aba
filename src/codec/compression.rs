use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::{Ceiling, Result, SnapshotError};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Gzip `data` when it is larger than `threshold` bytes; smaller inputs pass
/// through untouched. Serialized snapshots start with `{`, so the gzip magic
/// alone tells the decoder which case it is looking at.
pub fn compress_if_large(data: Vec<u8>, threshold: usize) -> Result<Vec<u8>> {
    if data.len() <= threshold {
        return Ok(data);
    }
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder
        .write_all(&data)
        .map_err(|e| SnapshotError::Format(format!("compression failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| SnapshotError::Format(format!("compression failed: {e}")))
}

pub fn is_compressed(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}

/// Inverse of `compress_if_large`, refusing to inflate past `max_bytes`.
pub fn decompress(data: Vec<u8>, max_bytes: usize) -> Result<Vec<u8>> {
    if !is_compressed(&data) {
        return Ok(data);
    }
    let mut out = Vec::new();
    let limit = max_bytes as u64 + 1;
    GzDecoder::new(data.as_slice())
        .take(limit)
        .read_to_end(&mut out)
        .map_err(|e| SnapshotError::Format(format!("payload does not inflate: {e}")))?;
    if out.len() > max_bytes {
        return Err(SnapshotError::capacity(Ceiling::PayloadBytes, out.len(), max_bytes));
    }
    Ok(out)
}
