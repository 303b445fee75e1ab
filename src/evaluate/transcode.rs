//! Backslash-run compression for persisted value strings.
//!
//! Serialized values are often serialized again inside other values, and
//! every round of escaping doubles the backslashes already present. Long
//! backslash runs are therefore replaced by a counted token:
//!
//! ```text
//! \\\\…(n > 32 times)   →   #HACK:<n-1>#\#
//! literal "#HACK:"      →   #HACK:!
//! ```
//!
//! The token keeps exactly one real backslash between its `#` delimiters.
//! If an outer serializer later escapes that backslash into `m` of them,
//! decompression repeats the whole fragment `n` times and restores the
//! correctly multiplied run.
//!
//! The marker's first character occurs nowhere else in it, so no marker
//! occurrence can straddle literal text and a token, and left-to-right
//! token parsing is an exact inverse of compression.

use std::fmt::Write as _;

use crate::config::EngineConfig;
use crate::{Error, Result};

/// Prefix of every compression token.
pub const COMPRESSION_MARKER: &str = "#HACK:";

/// Follows the marker when the input itself contained the marker text.
const LITERAL_ESCAPE: char = '!';

const TOKEN_DELIMITER: char = '#';

/// Decompressed output may grow to this multiple of the value size cap.
pub const MAX_EXPANSION_FACTOR: usize = 1024;

/// Reversible backslash-run compressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlashTranscoder {
    compression_threshold: usize,
    run_threshold: usize,
    max_expanded_len: usize,
}

impl SlashTranscoder {
    /// `compression_threshold`: inputs shorter than this (in bytes) are left
    /// alone. `run_threshold`: runs up to this length are copied literally.
    pub fn new(compression_threshold: usize, run_threshold: usize) -> Self {
        let max_expanded_len = EngineConfig::default().max_value_byte_size * MAX_EXPANSION_FACTOR;
        Self { compression_threshold, run_threshold, max_expanded_len }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.compression_threshold(), config.slash_threshold)
            .with_max_expanded_len(config.max_value_byte_size.saturating_mul(MAX_EXPANSION_FACTOR))
    }

    /// Reject decompressed output longer than `max` bytes.
    pub fn with_max_expanded_len(mut self, max: usize) -> Self {
        self.max_expanded_len = max;
        self
    }

    /// Compress long backslash runs.
    ///
    /// Inputs below the compression threshold that do not contain the
    /// marker text are returned unchanged. Short inputs that do contain it
    /// still get the marker escaped, so `decompress(compress(s)) == s`
    /// holds for every input.
    pub fn compress(&self, input: &str) -> String {
        if input.len() < self.compression_threshold && !input.contains(COMPRESSION_MARKER) {
            return input.to_string();
        }

        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix(COMPRESSION_MARKER) {
                out.push_str(COMPRESSION_MARKER);
                out.push(LITERAL_ESCAPE);
                rest = after;
                continue;
            }

            let run = rest.bytes().take_while(|b| *b == b'\\').count();
            if run > self.run_threshold {
                // Writing into a String cannot fail.
                let _ = write!(out, "{COMPRESSION_MARKER}{}{TOKEN_DELIMITER}\\{TOKEN_DELIMITER}", run - 1);
                rest = &rest[run..];
                continue;
            }
            if run > 0 {
                out.push_str(&rest[..run]);
                rest = &rest[run..];
                continue;
            }

            // Copy up to the next character that may start a run or a marker.
            let first = rest.chars().next().map_or(1, char::len_utf8);
            let stop = rest[first..]
                .find(['\\', TOKEN_DELIMITER])
                .map_or(rest.len(), |i| i + first);
            out.push_str(&rest[..stop]);
            rest = &rest[stop..];
        }
        out
    }

    /// Expand every token produced by [`compress`](Self::compress).
    ///
    /// Fails on a marker that is not followed by a well-formed token, or on
    /// output that would exceed the expansion cap. Both only happen for
    /// corrupted persisted state.
    pub fn decompress(&self, input: &str) -> Result<String> {
        if !input.contains(COMPRESSION_MARKER) {
            return Ok(input.to_string());
        }

        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(index) = rest.find(COMPRESSION_MARKER) {
            out.push_str(&rest[..index]);
            rest = &rest[index + COMPRESSION_MARKER.len()..];

            if let Some(after) = rest.strip_prefix(LITERAL_ESCAPE) {
                out.push_str(COMPRESSION_MARKER);
                rest = after;
                continue;
            }

            let (count, after) = rest
                .split_once(TOKEN_DELIMITER)
                .ok_or_else(|| malformed(input, "unterminated run length"))?;
            if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed(input, "run length is not a number"));
            }
            let count: usize = count
                .parse()
                .map_err(|_| malformed(input, "run length out of range"))?;
            let (fragment, after) = after
                .split_once(TOKEN_DELIMITER)
                .ok_or_else(|| malformed(input, "unterminated run fragment"))?;

            let repeats = count
                .checked_add(1)
                .ok_or_else(|| malformed(input, "run length out of range"))?;
            let expanded = fragment
                .len()
                .checked_mul(repeats)
                .and_then(|len| len.checked_add(out.len()))
                .ok_or_else(|| malformed(input, "run length out of range"))?;
            if expanded > self.max_expanded_len {
                return Err(malformed(input, "expanded run exceeds size cap"));
            }
            out.push_str(&fragment.repeat(repeats));
            rest = after;
        }
        out.push_str(rest);
        Ok(out)
    }
}

impl Default for SlashTranscoder {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

fn malformed(input: &str, reason: &str) -> Error {
    let preview: String = input.chars().take(64).collect();
    Error::Deserialization(format!("malformed compressed string ({reason}): {preview:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eager() -> SlashTranscoder {
        SlashTranscoder::new(0, 32)
    }

    #[test]
    fn test_short_input_untouched() {
        let t = SlashTranscoder::new(100, 32);
        let s = "\\".repeat(50);
        assert_eq!(t.compress(&s), s);
    }

    #[test]
    fn test_run_at_threshold_is_literal() {
        let s = format!("a{}b", "\\".repeat(32));
        assert_eq!(eager().compress(&s), s);
    }

    #[test]
    fn test_long_run_becomes_token() {
        let s = format!("a{}b", "\\".repeat(40));
        let compressed = eager().compress(&s);
        assert_eq!(compressed, "a#HACK:39#\\#b");
        assert_eq!(eager().decompress(&compressed).unwrap(), s);
    }

    #[test]
    fn test_trailing_run() {
        let s = format!("x{}", "\\".repeat(33));
        let compressed = eager().compress(&s);
        assert_eq!(compressed, "x#HACK:32#\\#");
        assert_eq!(eager().decompress(&compressed).unwrap(), s);
    }

    #[test]
    fn test_reescaped_token_multiplies_run() {
        // An outer serializer doubled every backslash after compression.
        let original = "\\".repeat(40);
        let compressed = eager().compress(&original);
        let escaped = compressed.replace('\\', "\\\\");
        assert_eq!(eager().decompress(&escaped).unwrap(), "\\".repeat(80));
    }

    #[test]
    fn test_literal_marker_survives() {
        let s = "before #HACK:12#\\# after";
        let t = SlashTranscoder::new(1000, 32);
        let compressed = t.compress(s);
        assert_ne!(compressed, s);
        assert_eq!(t.decompress(&compressed).unwrap(), s);
    }

    #[test]
    fn test_marker_adjacent_to_run() {
        let s = format!("#HACK{}#HACK:#HACK:!", "\\".repeat(35));
        let compressed = eager().compress(&s);
        assert_eq!(eager().decompress(&compressed).unwrap(), s);
    }

    #[test]
    fn test_compress_twice_still_inverts() {
        let s = format!("{}#{}", "\\".repeat(70), "\\".repeat(5));
        let once = eager().compress(&s);
        let twice = eager().compress(&once);
        assert_eq!(eager().decompress(&eager().decompress(&twice).unwrap()).unwrap(), s);
    }

    #[test]
    fn test_multibyte_text() {
        let s = format!("日本{}語#ü", "\\".repeat(64));
        let compressed = eager().compress(&s);
        assert_eq!(eager().decompress(&compressed).unwrap(), s);
    }

    #[test]
    fn test_short_input_with_marker_is_escaped() {
        let t = SlashTranscoder::new(1000, 32);
        assert_eq!(t.compress("a #HACK: b"), "a #HACK:! b");
        assert_eq!(t.compress("a # b"), "a # b");
        assert_eq!(t.decompress("a #HACK:! b").unwrap(), "a #HACK: b");
    }

    #[test]
    fn test_oversized_run_length_fails() {
        let err = SlashTranscoder::default().decompress("#HACK:99999999999#\\#").unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));

        let capped = eager().with_max_expanded_len(100);
        assert_eq!(capped.decompress("#HACK:99#\\#").unwrap(), "\\".repeat(100));
        assert!(capped.decompress("#HACK:100#\\#").is_err());
        assert!(capped.decompress(&format!("{}#HACK:0#\\#", "x".repeat(100))).is_err());
    }

    #[test]
    fn test_malformed_token_fails() {
        assert!(eager().decompress("#HACK:abc#\\#").is_err());
        assert!(eager().decompress("#HACK:12").is_err());
        assert!(eager().decompress("#HACK:12#\\").is_err());
    }
}
