use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;

use form_snapshot::codec::checksum::checksum;
use form_snapshot::codec::codec::{CodecOptions, decode, encode};
use form_snapshot::codec::compression::is_compressed;
use form_snapshot::codec::snapshot_model::Snapshot;
use form_snapshot::error::{Ceiling, SnapshotError};
use form_snapshot::extract::descriptor_model::ControlValue;
use form_snapshot::extract::extractor::{ExtractOptions, extract};
use form_snapshot::page::dom::Document;

use crate::common::{pages::many_inputs, utils::fixture};

mod common;

// =========================================================================
// Helpers
// =========================================================================

fn snapshot_of(doc: &Document) -> Snapshot {
    let controls = extract(doc, &ExtractOptions::default()).unwrap().into_controls();
    Snapshot::new(1_700_000_000_000, doc.url.clone(), doc.title.clone(), controls)
}

fn parts(token: &str) -> Vec<String> {
    token.split('|').map(str::to_string).collect()
}

fn payload_bytes(token: &str) -> Vec<u8> {
    URL_SAFE_NO_PAD.decode(&parts(token)[2]).unwrap()
}

/// Token around an arbitrary payload, with a correct checksum.
fn wrap(version: &str, raw: &[u8]) -> String {
    let payload = URL_SAFE_NO_PAD.encode(raw);
    format!("{version}|{}|{payload}", checksum(&payload))
}

// =========================================================================
// Scenario: email + subscribe
// =========================================================================

#[test]
fn signup_token_has_three_parts_and_hex_checksum() {
    let snapshot = snapshot_of(&fixture("signup.json"));
    let token = encode(&snapshot, &CodecOptions::default()).unwrap();

    let parts = parts(&token);
    assert_eq!(parts.len(), 3, "token: {token}");
    assert_eq!(parts[0], "1");
    assert_eq!(parts[1].len(), 16);
    assert!(parts[1].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert!(
        parts[2]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
        "payload must be url-safe base64 without padding"
    );
}

#[test]
fn signup_token_decodes_to_both_descriptors() {
    let snapshot = snapshot_of(&fixture("signup.json"));
    let token = encode(&snapshot, &CodecOptions::default()).unwrap();
    let decoded = decode(&token, &CodecOptions::default()).unwrap();

    assert_eq!(decoded, snapshot);

    let email = decoded.controls.iter().find(|c| c.name == "email").unwrap();
    assert_eq!(email.value, ControlValue::Text("a@b.com".into()));
    let subscribe = decoded.controls.iter().find(|c| c.name == "subscribe").unwrap();
    assert_eq!(subscribe.value, ControlValue::Bool(true));
}

#[test]
fn encode_is_deterministic() {
    let snapshot = snapshot_of(&fixture("profile.json"));
    let a = encode(&snapshot, &CodecOptions::default()).unwrap();
    let b = encode(&snapshot, &CodecOptions::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn surrounding_whitespace_is_ignored() {
    let snapshot = snapshot_of(&fixture("signup.json"));
    let token = encode(&snapshot, &CodecOptions::default()).unwrap();
    let decoded = decode(&format!("  {token}\n"), &CodecOptions::default()).unwrap();
    assert_eq!(decoded, snapshot);
}

// =========================================================================
// Integrity
// =========================================================================

#[test]
fn single_payload_character_change_fails_integrity() {
    let snapshot = snapshot_of(&fixture("signup.json"));
    let token = encode(&snapshot, &CodecOptions::default()).unwrap();

    let mut parts = parts(&token);
    let mut payload: Vec<char> = parts[2].chars().collect();
    let mid = payload.len() / 2;
    payload[mid] = if payload[mid] == 'A' { 'B' } else { 'A' };
    parts[2] = payload.into_iter().collect();
    let tampered = parts.join("|");

    let err = decode(&tampered, &CodecOptions::default()).unwrap_err();
    assert!(
        matches!(err, SnapshotError::Integrity { .. }),
        "expected integrity error, got {err:?}"
    );
}

#[test]
fn single_checksum_character_change_fails_integrity() {
    let snapshot = snapshot_of(&fixture("signup.json"));
    let token = encode(&snapshot, &CodecOptions::default()).unwrap();

    let mut parts = parts(&token);
    let first = if parts[1].starts_with('0') { "1" } else { "0" };
    parts[1].replace_range(0..1, first);

    let err = decode(&parts.join("|"), &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, SnapshotError::Integrity { .. }), "got {err:?}");
}

#[test]
fn checked_but_non_snapshot_payload_is_format_error() {
    let token = wrap("1", br#"{"hello":"world"}"#);
    let err = decode(&token, &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, SnapshotError::Format(_)), "got {err:?}");
}

// =========================================================================
// Version and shape gating
// =========================================================================

#[test]
fn unknown_token_version_is_rejected() {
    let snapshot = snapshot_of(&fixture("signup.json"));
    let token = encode(&snapshot, &CodecOptions::default()).unwrap();
    let bumped = token.replacen("1|", "2|", 1);

    let err = decode(&bumped, &CodecOptions::default()).unwrap_err();
    match err {
        SnapshotError::Version { found, expected } => {
            assert_eq!(found, "2");
            assert_eq!(expected, "1");
        }
        other => panic!("expected version error, got {other:?}"),
    }
}

#[test]
fn foreign_snapshot_version_is_refused_at_encode() {
    let mut snapshot = snapshot_of(&fixture("signup.json"));
    snapshot.format_version = 2;

    let err = encode(&snapshot, &CodecOptions::default()).unwrap_err();
    match err {
        SnapshotError::Version { found, expected } => {
            assert_eq!(found, "2");
            assert_eq!(expected, "1");
        }
        other => panic!("expected version error, got {other:?}"),
    }
}

#[test]
fn inner_version_must_match_token_version() {
    let raw = serde_json::to_vec(&json!({
        "formatVersion": 2,
        "capturedAtEpochMillis": 0,
        "pageUrl": "",
        "pageTitle": "",
        "controls": []
    }))
    .unwrap();
    let err = decode(&wrap("1", &raw), &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, SnapshotError::Format(_)), "got {err:?}");
}

#[test]
fn wrong_part_count_is_format_error() {
    for token in ["", "1", "1|abc", "1|a|b|c"] {
        let err = decode(token, &CodecOptions::default()).unwrap_err();
        assert!(matches!(err, SnapshotError::Format(_)), "{token:?} gave {err:?}");
    }
}

#[test]
fn malformed_checksum_segment_is_format_error() {
    let err = decode("1|XYZ|e30", &CodecOptions::default()).unwrap_err();
    assert!(matches!(err, SnapshotError::Format(_)), "got {err:?}");
}

// =========================================================================
// Capacity
// =========================================================================

#[test]
fn too_many_controls_rejected_before_compression() {
    let snapshot = snapshot_of(&many_inputs(5));
    let options = CodecOptions {
        max_controls: 3,
        ..CodecOptions::default()
    };

    let err = encode(&snapshot, &options).unwrap_err();
    match err {
        SnapshotError::Capacity {
            ceiling,
            actual,
            limit,
        } => {
            assert_eq!(ceiling, Ceiling::ControlCount);
            assert_eq!(actual, 6, "five inputs plus their form");
            assert_eq!(limit, 3);
        }
        other => panic!("expected capacity error, got {other:?}"),
    }
}

#[test]
fn oversized_payload_rejected_on_raw_size() {
    let snapshot = snapshot_of(&many_inputs(40));
    let options = CodecOptions {
        max_payload_bytes: 2048,
        ..CodecOptions::default()
    };
    let err = encode(&snapshot, &options).unwrap_err();
    assert!(
        matches!(
            err,
            SnapshotError::Capacity {
                ceiling: Ceiling::PayloadBytes,
                ..
            }
        ),
        "got {err:?}"
    );
}

#[test]
fn decompression_is_bounded() {
    let snapshot = snapshot_of(&many_inputs(40));
    let token = encode(&snapshot, &CodecOptions::default()).unwrap();
    let options = CodecOptions {
        max_payload_bytes: 1024,
        ..CodecOptions::default()
    };
    let err = decode(&token, &options).unwrap_err();
    assert!(err.is_capacity(), "got {err:?}");
}

// =========================================================================
// Compression threshold
// =========================================================================

#[test]
fn small_snapshot_is_not_compressed() {
    let snapshot = snapshot_of(&fixture("signup.json"));
    let options = CodecOptions {
        compression_threshold: usize::MAX,
        ..CodecOptions::default()
    };
    let token = encode(&snapshot, &options).unwrap();
    let raw = payload_bytes(&token);
    assert!(!is_compressed(&raw));
    assert_eq!(raw.first(), Some(&b'{'));
}

#[test]
fn large_snapshot_is_gzipped_and_still_decodes() {
    let snapshot = snapshot_of(&many_inputs(40));
    assert!(serde_json::to_vec(&snapshot).unwrap().len() > 1024);

    let token = encode(&snapshot, &CodecOptions::default()).unwrap();
    assert!(is_compressed(&payload_bytes(&token)));
    assert_eq!(decode(&token, &CodecOptions::default()).unwrap(), snapshot);
}
