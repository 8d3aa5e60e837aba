use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::checksum::{checksum, is_well_formed};
use crate::codec::compression::{compress_if_large, decompress, is_compressed};
use crate::codec::snapshot_model::{FORMAT_VERSION, Snapshot};
use crate::error::{Ceiling, Result, SnapshotError};
use crate::extract::extractor::DEFAULT_MAX_CONTROLS;

pub const TOKEN_SEPARATOR: char = '|';
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_COMPRESSION_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecOptions {
    /// Largest serialized snapshot accepted, before compression
    pub max_payload_bytes: usize,

    /// Most controls a snapshot may carry
    pub max_controls: usize,

    /// Serialized snapshots above this size are gzipped
    pub compression_threshold: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            max_controls: DEFAULT_MAX_CONTROLS,
            compression_threshold: DEFAULT_COMPRESSION_THRESHOLD,
        }
    }
}

/// Encode a snapshot as `version|checksum|payload`.
///
/// The snapshot must be in the current format; ceilings are checked before
/// any compression is attempted.
pub fn encode(snapshot: &Snapshot, options: &CodecOptions) -> Result<String> {
    snapshot.ensure_current_version()?;
    if snapshot.controls.len() > options.max_controls {
        return Err(SnapshotError::capacity(
            Ceiling::ControlCount,
            snapshot.controls.len(),
            options.max_controls,
        ));
    }

    let serialized = serde_json::to_vec(snapshot)?;
    if serialized.len() > options.max_payload_bytes {
        return Err(SnapshotError::capacity(
            Ceiling::PayloadBytes,
            serialized.len(),
            options.max_payload_bytes,
        ));
    }

    let raw_len = serialized.len();
    let packed = compress_if_large(serialized, options.compression_threshold)?;
    debug!(
        raw = raw_len,
        packed = packed.len(),
        compressed = is_compressed(&packed),
        "snapshot payload prepared"
    );

    let payload = URL_SAFE_NO_PAD.encode(&packed);
    let sum = checksum(&payload);
    Ok(format!(
        "{FORMAT_VERSION}{sep}{sum}{sep}{payload}",
        sep = TOKEN_SEPARATOR
    ))
}

/// Decode a token produced by `encode`.
///
/// The payload is only interpreted after its checksum has been verified.
pub fn decode(token: &str, options: &CodecOptions) -> Result<Snapshot> {
    let parts: Vec<&str> = token.trim().split(TOKEN_SEPARATOR).collect();
    let [version, sum, payload] = parts.as_slice() else {
        return Err(SnapshotError::Format(format!(
            "expected 3 '{TOKEN_SEPARATOR}'-separated parts, found {}",
            parts.len()
        )));
    };

    let expected_version = FORMAT_VERSION.to_string();
    if *version != expected_version {
        return Err(SnapshotError::Version {
            found: version.to_string(),
            expected: expected_version,
        });
    }

    if !is_well_formed(sum) {
        return Err(SnapshotError::Format(format!(
            "checksum segment '{sum}' is not 16 lowercase hex characters"
        )));
    }
    let actual = checksum(payload);
    if actual != *sum {
        return Err(SnapshotError::Integrity {
            expected: sum.to_string(),
            actual,
        });
    }

    let packed = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| SnapshotError::Format(format!("payload is not url-safe base64: {e}")))?;
    let raw = decompress(packed, options.max_payload_bytes)?;

    let snapshot: Snapshot = serde_json::from_slice(&raw)
        .map_err(|e| SnapshotError::Format(format!("payload is not a snapshot: {e}")))?;
    if snapshot.format_version != FORMAT_VERSION {
        return Err(SnapshotError::Format(format!(
            "token version {FORMAT_VERSION} wraps a snapshot declaring version {}",
            snapshot.format_version
        )));
    }

    Ok(snapshot)
}
