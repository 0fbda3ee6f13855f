//! Paddle webhook signature verification.
//!
//! Paddle Classic signs every alert with its RSA private key. The signed
//! message is the PHP `serialize()` output of all alert fields except
//! `p_signature`, sorted by key, hashed with SHA-1 and signed PKCS#1 v1.5.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::RsaPublicKey;
use sha1::Sha1;

use super::payload::{AlertPayload, SIGNATURE_FIELD};
use super::php_serialize::serialize_string_map;
use super::webhook_errors::WebhookError;

const PKCS1_PEM_LABEL: &str = "BEGIN RSA PUBLIC KEY";

/// Verifier for Paddle webhook signatures.
pub struct PaddleWebhookVerifier {
    key: VerifyingKey<Sha1>,
}

impl PaddleWebhookVerifier {
    /// Builds a verifier from the vendor public key in PEM form.
    ///
    /// Accepts SPKI (`BEGIN PUBLIC KEY`, as shown in the Paddle dashboard)
    /// and PKCS#1 (`BEGIN RSA PUBLIC KEY`). Literal `\n` sequences are
    /// treated as line breaks so the key can live in a single env var.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::InvalidPublicKey` if the PEM does not hold an
    /// RSA public key.
    pub fn from_pem(pem: &str) -> Result<Self, WebhookError> {
        let pem = pem.trim().replace("\\n", "\n");

        let key = if pem.contains(PKCS1_PEM_LABEL) {
            RsaPublicKey::from_pkcs1_pem(&pem)
                .map_err(|e| WebhookError::InvalidPublicKey(e.to_string()))?
        } else {
            RsaPublicKey::from_public_key_pem(&pem)
                .map_err(|e| WebhookError::InvalidPublicKey(e.to_string()))?
        };

        Ok(Self {
            key: VerifyingKey::new(key),
        })
    }

    /// The exact bytes Paddle signs for a payload.
    ///
    /// Every field except `p_signature` in key order, PHP-serialized.
    pub fn signed_message(payload: &AlertPayload) -> String {
        let mut fields = payload.as_map().clone();
        fields.remove(SIGNATURE_FIELD);
        serialize_string_map(&fields)
    }

    /// Returns true when the payload's `p_signature` verifies.
    ///
    /// A missing or undecodable signature is a failed verification, never
    /// an error.
    pub fn verify(&self, payload: &AlertPayload) -> bool {
        let Some(encoded) = payload.get(SIGNATURE_FIELD) else {
            tracing::warn!(alert_name = ?payload.alert_name(), "Webhook has no p_signature");
            return false;
        };

        let raw = match STANDARD.decode(encoded.trim()) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Webhook p_signature is not valid base64");
                return false;
            }
        };

        let signature = match Signature::try_from(raw.as_slice()) {
            Ok(signature) => signature,
            Err(e) => {
                tracing::warn!(error = %e, "Webhook p_signature has an invalid length");
                return false;
            }
        };

        let message = Self::signed_message(payload);
        match self.key.verify(message.as_bytes(), &signature) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    alert_name = ?payload.alert_name(),
                    alert_id = ?payload.get("alert_id"),
                    "Webhook signature verification failed"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for PaddleWebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaddleWebhookVerifier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::test_support::{
        sign, signed, test_verifier, TEST_PUBLIC_KEY_PEM, TEST_PUBLIC_KEY_PKCS1_PEM,
    };
    use proptest::prelude::*;

    /// Signature produced offline for `fixed_payload()` with the test key.
    const FIXED_SIGNATURE: &str = "OWvkuCq25ydPtaVluO87FMYwPcYhP8XGZwPupDFvWb/zIG0aA2P/8kTP8iscoAC8Wl5YxdDNj1IC7jOPQBzQdsQOsJfdRRNjeLswGL7hsqo3GROSBNEu+Is/RRi6XOYzI0visViPdpBFQCrbFm7AysoMul0F9vPq6iqewb+7J3o=";

    fn fixed_payload() -> AlertPayload {
        AlertPayload::new()
            .with("alert_id", "1")
            .with("alert_name", "subscription_created")
            .with("email", "a@b.com")
            .with("event_time", "2020-01-13 19:19:18")
            .with("status", "active")
            .with("subscription_id", "1")
            .with("subscription_plan_id", "10")
    }

    // ══════════════════════════════════════════════════════════════
    // Key Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn accepts_spki_pem() {
        assert!(PaddleWebhookVerifier::from_pem(TEST_PUBLIC_KEY_PEM).is_ok());
    }

    #[test]
    fn accepts_pkcs1_pem() {
        assert!(PaddleWebhookVerifier::from_pem(TEST_PUBLIC_KEY_PKCS1_PEM).is_ok());
    }

    #[test]
    fn accepts_pem_with_escaped_newlines() {
        let flattened = TEST_PUBLIC_KEY_PEM.trim().replace('\n', "\\n");
        assert!(PaddleWebhookVerifier::from_pem(&flattened).is_ok());
    }

    #[test]
    fn rejects_garbage_pem() {
        let result = PaddleWebhookVerifier::from_pem("-----BEGIN PUBLIC KEY-----\nnope\n-----END PUBLIC KEY-----");
        assert!(matches!(result, Err(WebhookError::InvalidPublicKey(_))));
    }

    #[test]
    fn rejects_empty_pem() {
        assert!(PaddleWebhookVerifier::from_pem("").is_err());
    }

    // ══════════════════════════════════════════════════════════════
    // Verification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn signed_message_excludes_signature_field() {
        let payload = fixed_payload().with(SIGNATURE_FIELD, "abc");
        let message = PaddleWebhookVerifier::signed_message(&payload);
        assert!(message.starts_with("a:7:{s:8:\"alert_id\""));
        assert!(!message.contains("p_signature"));
    }

    #[test]
    fn verifies_known_signature() {
        let payload = fixed_payload().with(SIGNATURE_FIELD, FIXED_SIGNATURE);
        assert!(test_verifier().verify(&payload));
    }

    #[test]
    fn known_signature_matches_test_signer() {
        assert_eq!(sign(&fixed_payload()), FIXED_SIGNATURE);
    }

    #[test]
    fn missing_signature_fails_without_panicking() {
        assert!(!test_verifier().verify(&fixed_payload()));
    }

    #[test]
    fn non_base64_signature_fails() {
        let payload = fixed_payload().with(SIGNATURE_FIELD, "!!not base64!!");
        assert!(!test_verifier().verify(&payload));
    }

    #[test]
    fn truncated_signature_fails() {
        let payload = fixed_payload().with(SIGNATURE_FIELD, "AAAA");
        assert!(!test_verifier().verify(&payload));
    }

    #[test]
    fn tampered_field_fails() {
        let payload = fixed_payload()
            .with(SIGNATURE_FIELD, FIXED_SIGNATURE)
            .with("status", "deleted");
        assert!(!test_verifier().verify(&payload));
    }

    #[test]
    fn added_field_fails() {
        let payload = fixed_payload()
            .with(SIGNATURE_FIELD, FIXED_SIGNATURE)
            .with("passthrough", "");
        assert!(!test_verifier().verify(&payload));
    }

    #[test]
    fn every_flipped_signature_byte_fails() {
        let raw = STANDARD.decode(FIXED_SIGNATURE).unwrap();
        let verifier = test_verifier();
        for i in 0..raw.len() {
            let mut flipped = raw.clone();
            flipped[i] ^= 0x01;
            let payload = fixed_payload().with(SIGNATURE_FIELD, STANDARD.encode(&flipped));
            assert!(!verifier.verify(&payload), "flip at byte {} still verified", i);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn any_signed_payload_verifies(
            fields in proptest::collection::btree_map("[a-z_]{1,16}", ".{0,24}", 0..10)
        ) {
            let payload = signed(AlertPayload::from(fields));
            prop_assert!(test_verifier().verify(&payload));
        }
    }
}
