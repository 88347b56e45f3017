use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of the raw webhook body
pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    // HMAC accepts keys of any length
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of a hex signature against the raw body
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const BODY: &[u8] = br#"{"type":"payment.succeeded","data":{"id":"pi_1"}}"#;

    #[test]
    fn test_valid_signature() {
        let signature = sign_payload(SECRET, BODY);
        assert_eq!(signature.len(), 64);
        assert!(verify_signature(SECRET, BODY, &signature));
        assert!(verify_signature(SECRET, BODY, &signature.to_uppercase()));
    }

    #[test]
    fn test_tampered_body_is_rejected() {
        let signature = sign_payload(SECRET, BODY);
        let tampered = br#"{"type":"payment.succeeded","data":{"id":"pi_2"}}"#;
        assert!(!verify_signature(SECRET, tampered, &signature));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let signature = sign_payload("another-secret", BODY);
        assert!(!verify_signature(SECRET, BODY, &signature));
    }

    #[test]
    fn test_malformed_signature_is_rejected() {
        assert!(!verify_signature(SECRET, BODY, "not-hex"));
        assert!(!verify_signature(SECRET, BODY, ""));
        assert!(!verify_signature(SECRET, BODY, "abcd"));
    }
}
