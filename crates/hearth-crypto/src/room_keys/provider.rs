//! Cipher primitive backend.
//!
//! Business logic never names a concrete cipher implementation. Everything
//! runs through [`CipherProvider`], so the backend is selected once at
//! composition time and platform-specific builds can swap implementations
//! without a single branch inside callers.

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

use super::{derivation::RoomKey, error::CryptoError};

/// Size of a symmetric room key in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// Size of the GCM initialization vector in bytes (96-bit nonce).
pub const IV_SIZE: usize = 12;

/// Size of the GCM authentication tag appended to every ciphertext.
pub const TAG_SIZE: usize = 16;

/// Backend providing the authenticated cipher, digest, and random source.
///
/// One concrete implementation exists per target platform. Callers are
/// generic over the trait and never inspect which backend is active.
pub trait CipherProvider: Clone + Send + Sync + 'static {
    /// Encrypt `plaintext` under `(key, iv)` with AES-256-GCM.
    ///
    /// The returned ciphertext carries the [`TAG_SIZE`]-byte
    /// authentication tag at its end, standard GCM layout; there is no
    /// separate tag field.
    fn seal(
        &self,
        key: &RoomKey,
        iv: &[u8; IV_SIZE],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// Decrypt and authenticate `ciphertext` under `(key, iv)`.
    ///
    /// # Errors
    ///
    /// [`CryptoError::DecryptionFailed`] on tag mismatch. Decryption is
    /// all-or-nothing; unauthenticated bytes are never returned.
    fn open(
        &self,
        key: &RoomKey,
        iv: &[u8; IV_SIZE],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// SHA-256 digest of `data`.
    fn sha256(&self, data: &[u8]) -> [u8; KEY_SIZE];

    /// Fill `buf` with cryptographically secure random bytes.
    fn fill_random(&self, buf: &mut [u8]);
}

/// Software backend built on the RustCrypto implementations.
///
/// The default on every current target; hardware-backed providers slot in
/// behind the same trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareProvider;

impl SoftwareProvider {
    /// Create the software backend.
    pub fn new() -> Self {
        Self
    }
}

impl CipherProvider for SoftwareProvider {
    fn seal(
        &self,
        key: &RoomKey,
        iv: &[u8; IV_SIZE],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        cipher.encrypt(Nonce::from_slice(iv), plaintext).map_err(|_| {
            CryptoError::EncryptionFailed { reason: "AEAD rejected input".to_string() }
        })
    }

    fn open(
        &self,
        key: &RoomKey,
        iv: &[u8; IV_SIZE],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        cipher.decrypt(Nonce::from_slice(iv), ciphertext).map_err(|_| {
            CryptoError::DecryptionFailed { reason: "authentication failed".to_string() }
        })
    }

    fn sha256(&self, data: &[u8]) -> [u8; KEY_SIZE] {
        Sha256::digest(data).into()
    }

    fn fill_random(&self, buf: &mut [u8]) {
        OsRng.fill_bytes(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> RoomKey {
        RoomKey::from_bytes([0x42; KEY_SIZE])
    }

    #[test]
    fn seal_open_roundtrip() {
        let provider = SoftwareProvider::new();
        let iv = [0x07; IV_SIZE];

        let sealed = provider.seal(&test_key(), &iv, b"family dinner at six").unwrap();
        let opened = provider.open(&test_key(), &iv, &sealed).unwrap();

        assert_eq!(opened, b"family dinner at six");
    }

    #[test]
    fn ciphertext_carries_embedded_tag() {
        let provider = SoftwareProvider::new();
        let iv = [0x00; IV_SIZE];

        let sealed = provider.seal(&test_key(), &iv, b"hello").unwrap();

        assert_eq!(sealed.len(), 5 + TAG_SIZE);
    }

    #[test]
    fn tampered_ciphertext_fails_open() {
        let provider = SoftwareProvider::new();
        let iv = [0x00; IV_SIZE];

        let mut sealed = provider.seal(&test_key(), &iv, b"original").unwrap();
        sealed[0] ^= 0xFF;

        let result = provider.open(&test_key(), &iv, &sealed);
        assert!(matches!(result, Err(CryptoError::DecryptionFailed { .. })));
    }

    #[test]
    fn wrong_iv_fails_open() {
        let provider = SoftwareProvider::new();

        let sealed = provider.seal(&test_key(), &[0x01; IV_SIZE], b"original").unwrap();
        let result = provider.open(&test_key(), &[0x02; IV_SIZE], &sealed);

        assert!(result.is_err());
    }

    #[test]
    fn sha256_matches_known_vector() {
        let provider = SoftwareProvider::new();
        let digest = provider.sha256(b"abc");

        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn fill_random_produces_distinct_buffers() {
        let provider = SoftwareProvider::new();
        let mut a = [0u8; IV_SIZE];
        let mut b = [0u8; IV_SIZE];

        provider.fill_random(&mut a);
        provider.fill_random(&mut b);

        assert_ne!(a, b, "two 96-bit draws colliding is effectively impossible");
    }
}
