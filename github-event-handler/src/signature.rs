//! Signature verifier (§4.1): legacy `X-Hub-Signature: sha1=<hex>` HMAC
//! scheme. GitHub's newer `sha256=` header isn't accepted here — this
//! gateway only speaks the scheme its `Project.sharedSecret`s were
//! provisioned against.

use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_PREFIX: &str = "sha1=";

/// Verify `header` (the raw `X-Hub-Signature` value) against `HMAC-SHA1(secret, body)`.
/// Returns `false` on any mismatch, missing prefix, or malformed hex — never panics.
///
/// Uses `Mac::verify_slice`, which compares in constant time by construction,
/// rather than hand-rolling a constant-time comparison.
pub fn verify(secret: &str, body: &[u8], header: &str) -> bool {
    let Some(hex_digest) = header.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    let Ok(given) = hex::decode(hex_digest) else {
        return false;
    };
    let Ok(mut mac) = HmacSha1::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&given).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha1::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        format!("sha1={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn accepts_matching_signature() {
        let body = b"{\"hello\":\"world\"}";
        let header = sign("shhh", body);
        assert!(verify("shhh", body, &header));
    }

    #[test]
    fn rejects_wrong_secret() {
        let body = b"{\"hello\":\"world\"}";
        let header = sign("shhh", body);
        assert!(!verify("other", body, &header));
    }

    #[test]
    fn rejects_single_byte_tamper_in_body() {
        let body = b"{\"hello\":\"world\"}";
        let header = sign("shhh", body);
        let mut tampered = body.to_vec();
        tampered[2] ^= 0x01;
        assert!(!verify("shhh", &tampered, &header));
    }

    #[test]
    fn rejects_missing_prefix() {
        assert!(!verify("shhh", b"body", "deadbeef"));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(!verify("shhh", b"body", "sha1=not-hex"));
    }
}
