//! Webhook signature verification.
//!
//! The platform signs each delivery with HMAC-SHA256 over the raw request body
//! and sends the result as `x-hub-signature-256: sha256=<hex>`. Verification
//! must run on the exact bytes received; re-serializing the parsed JSON would
//! change what was signed.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

/// Verify a delivery signature.
///
/// Returns `true` when the header is absent (unsigned deliveries pass through,
/// see [`SignaturePolicy`]) or when the header matches the HMAC-SHA256 of
/// `body` under `secret`. A malformed header is a failed verification, never
/// a panic.
pub fn verify(secret: &str, body: &[u8], signature: Option<&str>) -> bool {
    let Some(signature) = signature else {
        return true;
    };

    let Some(hex_digest) = signature.strip_prefix(SIGNATURE_PREFIX) else {
        warn!(header_length = signature.len(), "webhook_signature_bad_prefix");
        return false;
    };

    let provided = match hex::decode(hex_digest) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "webhook_signature_bad_encoding");
            return false;
        }
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("webhook_signature_invalid_key");
            return false;
        }
    };
    mac.update(body);

    // verify_slice compares in constant time and rejects a wrong length.
    mac.verify_slice(&provided).is_ok()
}

/// Compute the `sha256=<hex>` signature header for `body`.
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts keys of any length");
    mac.update(body);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

/// Whether deliveries without a signature header are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignaturePolicy {
    pub require_signature: bool,
}

impl SignaturePolicy {
    /// Apply the policy, then [`verify`].
    pub fn check(&self, secret: &str, body: &[u8], signature: Option<&str>) -> bool {
        match signature {
            None if self.require_signature => {
                warn!("webhook_signature_missing");
                false
            }
            None => {
                warn!("webhook_signature_absent_accepted");
                true
            }
            Some(_) => verify(secret, body, signature),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"action":"opened","issue":{"number":1}}"#;

    #[test]
    fn test_verify_valid_signature() {
        let signature = sign("s3cret", BODY);
        assert!(signature.starts_with("sha256="));
        assert!(verify("s3cret", BODY, Some(&signature)));
    }

    #[test]
    fn test_verify_uppercase_hex() {
        let signature = sign("s3cret", BODY);
        let upper = format!("sha256={}", signature["sha256=".len()..].to_uppercase());
        assert!(verify("s3cret", BODY, Some(&upper)));
    }

    #[test]
    fn test_verify_wrong_secret() {
        let signature = sign("other-secret", BODY);
        assert!(!verify("s3cret", BODY, Some(&signature)));
    }

    #[test]
    fn test_verify_tampered_body() {
        let signature = sign("s3cret", BODY);
        let tampered = br#"{"action":"opened","issue":{"number":2}}"#;
        assert!(!verify("s3cret", tampered, Some(&signature)));
    }

    #[test]
    fn test_verify_raw_bytes_not_reserialized() {
        // Same JSON value, different bytes.
        let spaced = br#"{ "action": "opened", "issue": { "number": 1 } }"#;
        let signature = sign("s3cret", BODY);
        assert!(!verify("s3cret", spaced, Some(&signature)));
    }

    #[test]
    fn test_verify_missing_header_passes_through() {
        assert!(verify("s3cret", BODY, None));
        assert!(verify("s3cret", b"", None));
    }

    #[test]
    fn test_verify_malformed_headers() {
        let signature = sign("s3cret", BODY);
        let bare_hex = &signature["sha256=".len()..];

        assert!(!verify("s3cret", BODY, Some(bare_hex)));
        assert!(!verify("s3cret", BODY, Some("sha1=abcdef")));
        assert!(!verify("s3cret", BODY, Some("sha256=not-hex")));
        assert!(!verify("s3cret", BODY, Some("sha256=abcd")));
        assert!(!verify("s3cret", BODY, Some("sha256=")));
        assert!(!verify("s3cret", BODY, Some("")));
    }

    #[test]
    fn test_policy_lenient_by_default() {
        let policy = SignaturePolicy::default();
        assert!(policy.check("s3cret", BODY, None));
        assert!(!policy.check("s3cret", BODY, Some("sha256=00")));
    }

    #[test]
    fn test_policy_requires_signature() {
        let policy = SignaturePolicy {
            require_signature: true,
        };
        let signature = sign("s3cret", BODY);

        assert!(!policy.check("s3cret", BODY, None));
        assert!(policy.check("s3cret", BODY, Some(&signature)));
    }
}
