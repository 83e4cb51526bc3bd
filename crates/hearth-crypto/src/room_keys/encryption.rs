//! Message encryption and decryption.
//!
//! Plaintext goes in, a base64 `{ciphertext, iv}` pair comes out, matching
//! the shape the transport layer relays between devices. One canonical
//! base64 codec is used for every field in both directions.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use super::{
    derivation::RoomKey,
    error::CryptoError,
    provider::{CipherProvider, IV_SIZE},
};

/// Wire form of one encrypted message body.
///
/// The GCM authentication tag is embedded at the end of `ciphertext`;
/// there is no separate tag field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    /// Base64-encoded ciphertext, tag included.
    pub ciphertext: String,
    /// Base64-encoded 96-bit initialization vector, fresh per message.
    pub iv: String,
}

/// Encrypt a message body under a room key.
///
/// Draws a fresh iv from the provider's random source on every call, so
/// concurrent encryptions under the same key never collide.
pub fn encrypt_message<P: CipherProvider>(
    provider: &P,
    key: &RoomKey,
    plaintext: &str,
) -> Result<EncryptedPayload, CryptoError> {
    let mut iv = [0u8; IV_SIZE];
    provider.fill_random(&mut iv);

    let ciphertext = provider.seal(key, &iv, plaintext.as_bytes())?;

    Ok(EncryptedPayload { ciphertext: STANDARD.encode(ciphertext), iv: STANDARD.encode(iv) })
}

/// Decrypt a message body under a room key.
///
/// All-or-nothing: malformed base64, a wrong-length iv, a failed
/// authentication tag, or non-UTF-8 plaintext each reject the whole
/// message.
///
/// # Errors
///
/// [`CryptoError::DecryptionFailed`] in every failure case above.
pub fn decrypt_message<P: CipherProvider>(
    provider: &P,
    key: &RoomKey,
    payload: &EncryptedPayload,
) -> Result<String, CryptoError> {
    let ciphertext =
        STANDARD.decode(&payload.ciphertext).map_err(|e| CryptoError::DecryptionFailed {
            reason: format!("malformed ciphertext encoding: {e}"),
        })?;

    let iv_bytes = STANDARD.decode(&payload.iv).map_err(|e| CryptoError::DecryptionFailed {
        reason: format!("malformed iv encoding: {e}"),
    })?;

    let iv: [u8; IV_SIZE] =
        iv_bytes.try_into().map_err(|bytes: Vec<u8>| CryptoError::DecryptionFailed {
            reason: format!("iv must be {IV_SIZE} bytes, got {}", bytes.len()),
        })?;

    let plaintext = provider.open(key, &iv, &ciphertext)?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptionFailed {
        reason: "plaintext is not valid UTF-8".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{super::provider::SoftwareProvider, *};

    fn test_key() -> RoomKey {
        RoomKey::from_bytes([0x42; 32])
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let provider = SoftwareProvider::new();

        let payload = encrypt_message(&provider, &test_key(), "soccer practice moved to 5pm").unwrap();
        let decrypted = decrypt_message(&provider, &test_key(), &payload).unwrap();

        assert_eq!(decrypted, "soccer practice moved to 5pm");
    }

    #[test]
    fn empty_message_roundtrips() {
        let provider = SoftwareProvider::new();

        let payload = encrypt_message(&provider, &test_key(), "").unwrap();
        assert_eq!(decrypt_message(&provider, &test_key(), &payload).unwrap(), "");
    }

    #[test]
    fn multibyte_text_roundtrips() {
        let provider = SoftwareProvider::new();
        let text = "école à 8h 🎒 — не забудь!";

        let payload = encrypt_message(&provider, &test_key(), text).unwrap();
        assert_eq!(decrypt_message(&provider, &test_key(), &payload).unwrap(), text);
    }

    #[test]
    fn both_fields_are_valid_base64() {
        let provider = SoftwareProvider::new();

        let payload = encrypt_message(&provider, &test_key(), "hi").unwrap();

        assert!(STANDARD.decode(&payload.ciphertext).is_ok());
        assert_eq!(STANDARD.decode(&payload.iv).unwrap().len(), IV_SIZE);
    }

    #[test]
    fn wrong_key_fails_decryption() {
        let provider = SoftwareProvider::new();
        let other_key = RoomKey::from_bytes([0x43; 32]);

        let payload = encrypt_message(&provider, &test_key(), "secret plans").unwrap();
        let result = decrypt_message(&provider, &other_key, &payload);

        assert!(matches!(result, Err(CryptoError::DecryptionFailed { .. })));
    }

    #[test]
    fn tampered_ciphertext_fails_decryption() {
        let provider = SoftwareProvider::new();

        let mut payload = encrypt_message(&provider, &test_key(), "original").unwrap();
        let mut raw = STANDARD.decode(&payload.ciphertext).unwrap();
        raw[0] ^= 0xFF;
        payload.ciphertext = STANDARD.encode(raw);

        assert!(decrypt_message(&provider, &test_key(), &payload).is_err());
    }

    #[test]
    fn malformed_base64_fails_decryption() {
        let provider = SoftwareProvider::new();

        let payload =
            EncryptedPayload { ciphertext: "!!not base64!!".to_string(), iv: "AAAA".to_string() };

        let result = decrypt_message(&provider, &test_key(), &payload);
        assert!(matches!(
            result,
            Err(CryptoError::DecryptionFailed { reason }) if reason.contains("ciphertext encoding")
        ));
    }

    #[test]
    fn wrong_length_iv_fails_decryption() {
        let provider = SoftwareProvider::new();

        let mut payload = encrypt_message(&provider, &test_key(), "hello").unwrap();
        payload.iv = STANDARD.encode([0u8; 16]);

        let result = decrypt_message(&provider, &test_key(), &payload);
        assert!(matches!(
            result,
            Err(CryptoError::DecryptionFailed { reason }) if reason.contains("12 bytes")
        ));
    }

    #[test]
    fn thousand_encryptions_use_distinct_ivs() {
        let provider = SoftwareProvider::new();
        let key = test_key();

        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let payload = encrypt_message(&provider, &key, "ping").unwrap();
            assert!(seen.insert(payload.iv), "iv reused under the same key");
        }
    }

    #[test]
    fn payload_serializes_to_wire_shape() {
        let payload = EncryptedPayload { ciphertext: "Y3Q=".to_string(), iv: "aXY=".to_string() };

        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"ciphertext":"Y3Q=","iv":"aXY="}"#);
    }
}
