use sha2::{Digest, Sha256};

/// Hex characters carried in the token's checksum segment.
pub const CHECKSUM_LEN: usize = 16;

/// Leading 16 lowercase hex chars of SHA-256 over the encoded payload text.
pub fn checksum(encoded: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(encoded.as_bytes());
    let digest = hasher.finalize();
    digest
        .iter()
        .take(CHECKSUM_LEN / 2)
        .map(|b| format!("{b:02x}"))
        .collect()
}

pub fn is_well_formed(segment: &str) -> bool {
    segment.len() == CHECKSUM_LEN
        && segment
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_sixteen_hex_chars() {
        let sum = checksum("payload");
        assert_eq!(sum.len(), CHECKSUM_LEN);
        assert!(is_well_formed(&sum));
        assert_eq!(sum, checksum("payload"));
        assert_ne!(sum, checksum("payloae"));
    }

    #[test]
    fn uppercase_or_short_segments_are_rejected() {
        assert!(!is_well_formed("ABCDEF0123456789"));
        assert!(!is_well_formed("abc"));
    }
}
