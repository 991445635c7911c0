//! Codec limits.

use serde::Deserialize;

pub use telegraphy_core::DEFAULT_MAX_DEPTH;

/// Largest accepted input, wire form or HTML (8 MiB)
pub const DEFAULT_MAX_INPUT_BYTES: usize = 8 * 1024 * 1024;

/// Largest encoded payload handed to a store (1 MiB)
pub const DEFAULT_MAX_STORED_BYTES: usize = 1024 * 1024;

/// Longest slug a store accepts
pub const DEFAULT_SLUG_MAX_LEN: usize = 255;

/// Identifier candidates tried before giving up
pub const DEFAULT_MAX_SLUG_ATTEMPTS: u32 = 100;

/// Options for [`ContentService`](crate::ContentService)
///
/// Missing fields take their defaults when deserialized, so a partial
/// config table is enough:
///
/// ```rust
/// use telegraphy::CodecOptions;
///
/// let options: CodecOptions = serde_json::from_str(r#"{"max_depth": 8}"#).unwrap();
/// assert_eq!(options.max_depth, 8);
/// assert_eq!(options.slug_max_len, 255);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Size limit for raw input
    pub max_input_bytes: usize,

    /// Size limit for the encoded payload
    pub max_stored_bytes: usize,

    /// Deepest element nesting accepted by both parsers
    pub max_depth: usize,

    pub slug_max_len: usize,

    pub max_slug_attempts: u32,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_stored_bytes: DEFAULT_MAX_STORED_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
            slug_max_len: DEFAULT_SLUG_MAX_LEN,
            max_slug_attempts: DEFAULT_MAX_SLUG_ATTEMPTS,
        }
    }
}
