//! Slack request signature verification.
//!
//! Slack signs every Events API request with HMAC-SHA256 over the base
//! string `v0:{X-Slack-Request-Timestamp}:{raw body}` keyed by the app's
//! signing secret, and sends the result as `X-Slack-Signature: v0=<hex>`.
//! Requests whose timestamp is more than five minutes away from the local
//! clock are rejected to limit replay.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signature scheme version prefix.
pub const SIGNATURE_VERSION: &str = "v0";

/// Maximum accepted distance between request timestamp and local clock.
pub const MAX_TIMESTAMP_SKEW_SECS: i64 = 60 * 5;

/// Errors from signature verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid request timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("request timestamp outside the accepted window ({age_secs}s)")]
    StaleTimestamp { age_secs: i64 },

    #[error("malformed signature header")]
    MalformedSignature,

    #[error("signature verification failed")]
    Mismatch,

    #[error("invalid signing secret: {0}")]
    InvalidKey(String),
}

fn signing_mac(secret: &[u8], timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
    mac.update(SIGNATURE_VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

/// Verify a Slack request signature.
///
/// `now` is the current Unix time in seconds.
pub fn verify_slack_signature(
    secret: &[u8],
    timestamp: &str,
    body: &[u8],
    signature: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let ts: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| SignatureError::InvalidTimestamp(timestamp.to_string()))?;

    // Saturates so hostile timestamps near i64::MIN/MAX read as stale.
    let age_secs = now.saturating_sub(ts);
    if age_secs.unsigned_abs() > MAX_TIMESTAMP_SKEW_SECS.unsigned_abs() {
        return Err(SignatureError::StaleTimestamp { age_secs });
    }

    let hex_sig = signature
        .strip_prefix("v0=")
        .ok_or(SignatureError::MalformedSignature)?;
    let expected = hex_decode(hex_sig).ok_or(SignatureError::MalformedSignature)?;

    // Constant-time comparison via `verify_slice`.
    signing_mac(secret, timestamp, body)?
        .verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

/// Compute the `v0=<hex>` signature Slack would send for a request.
pub fn compute_slack_signature(
    secret: &[u8],
    timestamp: &str,
    body: &[u8],
) -> Result<String, SignatureError> {
    let digest = signing_mac(secret, timestamp, body)?.finalize().into_bytes();
    Ok(format!("{SIGNATURE_VERSION}={}", hex_encode(&digest)))
}

/// Decode a hex string to bytes.
fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    if !hex.is_ascii() || hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

/// Encode bytes to a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
