//! End-to-end tests for the backslash transcoder and persisted value tags.
//!
//! Round-trip over arbitrary text, marker-bearing text and pure backslash
//! runs; the below-threshold no-op; and the oversize sentinel.

use cablenet::{
    Engine, EngineConfig, MemoryWorld, SlashTranscoder, Value, ValueTag, COMPRESSION_MARKER, TOO_LONG,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

fn eager() -> SlashTranscoder {
    SlashTranscoder::new(0, 32)
}

/// Text built from fragments that stress the token grammar.
fn arb_tricky_string() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        "[a-z0-9 ]{0,8}",
        (0usize..80).prop_map(|n| "\\".repeat(n)),
        Just(COMPRESSION_MARKER.to_string()),
        Just("#".to_string()),
        Just("#HACK".to_string()),
        Just("!".to_string()),
        Just("#HACK:12#\\#".to_string()),
        "[#:!\\\\]{1,4}",
        Just("ü日".to_string()),
    ];
    proptest::collection::vec(fragment, 0..16).prop_map(|parts| parts.concat())
}

// ============================================================================
// 1. Round-trip
// ============================================================================

proptest! {
    #[test]
    fn round_trip_any_text(s in any::<String>()) {
        let t = eager();
        prop_assert_eq!(t.decompress(&t.compress(&s)).unwrap(), s);
    }

    #[test]
    fn round_trip_tricky_text(s in arb_tricky_string()) {
        let t = eager();
        let compressed = t.compress(&s);
        prop_assert_eq!(t.decompress(&compressed).unwrap(), s);
    }

    #[test]
    fn round_trip_default_thresholds(s in arb_tricky_string()) {
        let t = SlashTranscoder::default();
        prop_assert_eq!(t.decompress(&t.compress(&s)).unwrap(), s);
    }

    #[test]
    fn idempotent_under_threshold(s in "[a-z\\\\#!]{0,99}") {
        prop_assume!(!s.contains(COMPRESSION_MARKER));
        let t = SlashTranscoder::new(100, 32);
        prop_assert_eq!(t.compress(&s), s);
    }

    #[test]
    fn compressed_never_longer_for_long_runs(n in 33usize..2000) {
        let s = "\\".repeat(n);
        prop_assert!(eager().compress(&s).len() < s.len());
    }
}

#[test]
fn test_backslash_only_strings() {
    let t = eager();
    for n in 0..=200 {
        let s = "\\".repeat(n);
        assert_eq!(t.decompress(&t.compress(&s)).unwrap(), s, "run of {n}");
    }
}

#[test]
fn test_repeated_reescaping_does_not_grow_tokens() {
    // Each round: compress, then an outer layer doubles every backslash.
    let t = eager();
    let mut expected = "\\".repeat(40);
    let mut stored = t.compress(&expected);
    for _ in 0..5 {
        stored = stored.replace('\\', "\\\\");
        expected = expected.replace('\\', "\\\\");
        assert_eq!(t.decompress(&stored).unwrap(), expected);
    }
    assert!(stored.len() < 64, "stored form grew to {}", stored.len());
}

// ============================================================================
// 2. Persisted tags
// ============================================================================

#[test]
fn test_engine_round_trips_string_values() {
    let engine = Engine::open_memory();
    let value = Value::String(format!("say {}\"hi\"", "\\".repeat(100)));
    let tag = engine.serialize_value(&value).unwrap();
    assert_eq!(tag.value_type, "string");
    assert_eq!(engine.deserialize_value(&tag).unwrap(), Some(value));
}

#[test]
fn test_oversize_sentinel_is_lossy() {
    let config = EngineConfig { max_value_byte_size: 64, ..EngineConfig::default() };
    let engine = Engine::with_world(Arc::new(MemoryWorld::new()), config).unwrap();

    let tag = engine.serialize_value(&Value::String("y".repeat(64))).unwrap();
    assert_eq!(tag.value, TOO_LONG);
    assert_eq!(engine.deserialize_value(&tag).unwrap(), Some(Value::String(String::new())));

    let tag = engine.serialize_value(&Value::String("y".repeat(63))).unwrap();
    assert_ne!(tag.value, TOO_LONG);
}

#[test]
fn test_unknown_type_key_is_missing() {
    let engine = Engine::open_memory();
    let tag = ValueTag { value_type: "energy".into(), value: "100".into() };
    assert_eq!(engine.deserialize_value(&tag).unwrap(), None);
}

#[test]
fn test_corrupted_token_fails_loudly() {
    let engine = Engine::open_memory();
    let tag = ValueTag { value_type: "string".into(), value: "#HACK:x#\\#".into() };
    assert!(engine.deserialize_value(&tag).is_err());
}
