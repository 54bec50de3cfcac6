//! Verification of `Stripe-Signature` headers.
//!
//! The header looks like `t=1700000000,v1=<hex>,v1=<hex>`; each `v1` is an
//! HMAC-SHA256 of `"{t}.{raw body}"` keyed with the endpoint secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use crate::models::{PaymentError, WebhookEvent};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_TOLERANCE_SECONDS: i64 = 300;

fn invalid(reason: &str) -> PaymentError {
    PaymentError::InvalidSignature(reason.to_string())
}

pub fn verify_signature(payload: &[u8], header: &str, secret: &str, now: i64) -> Result<(), PaymentError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| invalid("Unable to extract timestamp from header"))?;
    if signatures.is_empty() {
        return Err(invalid("No v1 signatures found in header"));
    }
    if now.abs_diff(timestamp) > SIGNATURE_TOLERANCE_SECONDS.unsigned_abs() {
        return Err(invalid("Timestamp outside the tolerance zone"));
    }

    for signature in signatures {
        let Ok(expected) = hex::decode(signature) else {
            continue;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| invalid("Invalid webhook secret"))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        if mac.verify_slice(&expected).is_ok() {
            return Ok(());
        }
    }

    debug!("No webhook signature matched");
    Err(invalid("No signatures found matching the expected signature for payload"))
}

/// Verifies the signature, then parses the event.
pub fn construct_event(payload: &[u8], header: &str, secret: &str, now: i64) -> Result<WebhookEvent, PaymentError> {
    verify_signature(payload, header, secret, now)?;
    serde_json::from_slice(payload).map_err(|e| invalid(&format!("Invalid payload: {}", e)))
}

/// Builds a header value the way the processor does. Used by tests and local tooling.
pub fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return format!("t={}", timestamp),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";

    #[test]
    fn accepts_a_fresh_valid_signature() {
        let body = br#"{"type":"payment_intent.succeeded"}"#;
        let header = sign(body, SECRET, 1_700_000_000);
        assert!(verify_signature(body, &header, SECRET, 1_700_000_100).is_ok());
    }

    #[test]
    fn rejects_tampering_and_stale_timestamps() {
        let body = br#"{"amount":100}"#;
        let header = sign(body, SECRET, 1_700_000_000);

        assert!(verify_signature(br#"{"amount":1}"#, &header, SECRET, 1_700_000_000).is_err());
        assert!(verify_signature(body, &header, "other", 1_700_000_000).is_err());
        assert!(verify_signature(body, &header, SECRET, 1_700_000_301).is_err());
        assert!(verify_signature(body, "v1=abc", SECRET, 1_700_000_000).is_err());
    }

    #[test]
    fn any_matching_v1_is_enough() {
        let body = b"{}";
        let valid = sign(body, SECRET, 42);
        let header = format!("t=42,v1=deadbeef,{}", valid.trim_start_matches("t=42,"));
        assert!(verify_signature(body, &header, SECRET, 42).is_ok());
    }

    #[test]
    fn extreme_timestamps_are_rejected() {
        for header in ["t=-9223372036854775808,v1=00", "t=9223372036854775807,v1=00"] {
            let err = verify_signature(b"{}", header, SECRET, 1_700_000_000).unwrap_err();
            assert_eq!(
                err.to_string(),
                invalid("Timestamp outside the tolerance zone").to_string()
            );
        }
    }
}
