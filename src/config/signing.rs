//! Signing configuration record.
//!
//! The record lives in the configuration store as JSON and is fetched once
//! per request:
//!
//! ```json
//! {
//!   "key": "943b421c9eb07c83...",
//!   "salt": "520f986b998545b4...",
//!   "signature_size": 32,
//!   "trusted_signatures": [],
//!   "arguments_separator": ":",
//!   "log_level": "info"
//! }
//! ```
//!
//! An empty `key` or `salt` disables signing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{DEFAULT_ARGUMENTS_SEPARATOR, DEFAULT_SIGNATURE_SIZE};
use crate::signature;

fn default_signature_size() -> usize {
    DEFAULT_SIGNATURE_SIZE
}

fn default_separator() -> char {
    DEFAULT_ARGUMENTS_SEPARATOR
}

/// Per-request log verbosity requested by the record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Whether an event at `level` should be emitted under this setting
    pub fn enables(&self, level: LogLevel) -> bool {
        level >= *self
    }
}

/// Signing settings shared by verification and re-signing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SigningConfig {
    /// Hex-encoded HMAC key
    #[serde(default)]
    pub key: String,

    /// Hex-encoded salt prepended to the signed message
    #[serde(default)]
    pub salt: String,

    /// Signature length in bytes before encoding (default: 32)
    #[serde(default = "default_signature_size")]
    pub signature_size: usize,

    /// Signatures accepted without verification
    #[serde(default)]
    pub trusted_signatures: Vec<String>,

    /// Separator between option names and arguments (default: ":")
    #[serde(
        default = "default_separator",
        deserialize_with = "deserialize_separator",
        serialize_with = "serialize_separator"
    )]
    pub arguments_separator: char,

    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            salt: String::new(),
            signature_size: default_signature_size(),
            trusted_signatures: Vec::new(),
            arguments_separator: default_separator(),
            log_level: LogLevel::default(),
        }
    }
}

impl SigningConfig {
    /// Parse a record fetched from the store
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Create a config with signing enabled
    pub fn with_signing(key: impl Into<String>, salt: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            salt: salt.into(),
            ..Default::default()
        }
    }

    pub fn signing_enabled(&self) -> bool {
        signature::signing_enabled(&self.key, &self.salt)
    }

    /// Check an incoming signature against the signed part of the path
    ///
    /// Trusted signatures pass without recomputation.
    pub fn verify(&self, message: &str, token: &str) -> bool {
        if !self.signing_enabled() {
            return true;
        }
        if self
            .trusted_signatures
            .iter()
            .any(|trusted| signature::constant_time_compare(trusted, token))
        {
            return true;
        }
        signature::verify(&self.salt, message, &self.key, self.signature_size, token)
    }

    /// Signature for an outgoing path, or `unsigned` when signing is disabled
    pub fn sign(&self, message: &str) -> String {
        signature::sign(&self.salt, message, &self.key, self.signature_size)
    }
}

/// Whether `separator` can split option arguments
///
/// Path separators and base64url characters are rejected: a base64 source
/// segment containing the separator would be read as an option.
pub fn is_valid_separator(separator: char) -> bool {
    !(separator.is_ascii_alphanumeric() || matches!(separator, '/' | '-' | '_' | '='))
}

fn deserialize_separator<'de, D>(deserializer: D) -> Result<char, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(sep), None) if is_valid_separator(sep) => Ok(sep),
        _ => Err(serde::de::Error::custom(format!(
            "arguments_separator must be a single character outside the path and base64url alphabets, got {:?}",
            raw
        ))),
    }
}

fn serialize_separator<S>(separator: &char, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&separator.to_string())
}
