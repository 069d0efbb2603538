//! URL signing
//!
//! Provides:
//! - HMAC-SHA256 signatures over `salt || message`, truncated and base64url encoded
//! - Constant-time verification
//! - Signing-disabled mode, where the literal `unsigned` stands in for a signature
//!
//! ```text
//! signature = base64url(truncate(HMAC-SHA256(key, salt + path), size))
//! ```

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signature token used when signing is disabled
pub const UNSIGNED: &str = "unsigned";

/// Length of a full HMAC-SHA256 digest in bytes
pub const MAX_SIGNATURE_SIZE: usize = 32;

/// Decode key or salt material
///
/// Material is expected hex-encoded; anything that is not valid hex is used
/// as raw bytes.
pub fn decode_key_material(material: &str) -> Vec<u8> {
    hex::decode(material).unwrap_or_else(|_| material.as_bytes().to_vec())
}

/// Whether signing is enabled for this key/salt pair
pub fn signing_enabled(key: &str, salt: &str) -> bool {
    !key.is_empty() && !salt.is_empty()
}

/// Sign `message`
///
/// Returns [`UNSIGNED`] when `key` or `salt` is empty.
pub fn sign(salt: &str, message: &str, key: &str, size: usize) -> String {
    if !signing_enabled(key, salt) {
        return UNSIGNED.to_string();
    }

    let digest = compute_hmac_signature(
        &decode_key_material(key),
        &decode_key_material(salt),
        message.as_bytes(),
    );
    let size = size.clamp(1, MAX_SIGNATURE_SIZE).min(digest.len());

    URL_SAFE_NO_PAD.encode(&digest[..size])
}

/// Verify `token` against `message`
///
/// Always true when `key` or `salt` is empty.
pub fn verify(salt: &str, message: &str, key: &str, size: usize, token: &str) -> bool {
    if !signing_enabled(key, salt) {
        return true;
    }

    let expected = sign(salt, message, key, size);
    constant_time_compare(token, &expected)
}

/// Compute HMAC-SHA256 over the salt followed by the message
fn compute_hmac_signature(key: &[u8], salt: &[u8], message: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length, including empty
    let mut mac = match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => return Vec::new(),
    };

    mac.update(salt);
    mac.update(message);

    mac.finalize().into_bytes().to_vec()
}

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
