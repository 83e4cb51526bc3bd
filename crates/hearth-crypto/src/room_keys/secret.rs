//! Family secret representation and codec.

use core::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use zeroize::Zeroize;

use super::error::CryptoError;

/// Decoded size of a family secret in bytes.
pub const SECRET_SIZE: usize = 32;

/// Length of the canonical base64 encoding of a family secret.
pub const ENCODED_SECRET_LEN: usize = 44;

/// 256-bit shared secret scoped to one family.
///
/// Every room key for the family is derived from this value, so all
/// devices holding the same secret converge on identical room keys
/// without exchanging key material.
///
/// A persisted value whose decoded length is not exactly [`SECRET_SIZE`]
/// bytes is corrupt by definition and must be discarded, never repaired.
#[derive(Clone, PartialEq, Eq)]
pub struct FamilySecret {
    bytes: [u8; SECRET_SIZE],
}

impl FamilySecret {
    /// Wrap raw secret bytes.
    pub fn from_bytes(bytes: [u8; SECRET_SIZE]) -> Self {
        Self { bytes }
    }

    /// Parse the canonical [`ENCODED_SECRET_LEN`]-character base64 form.
    ///
    /// # Errors
    ///
    /// [`CryptoError::SecretValidation`] if the encoding is malformed or
    /// the decoded value is not exactly [`SECRET_SIZE`] bytes.
    pub fn decode(encoded: &str) -> Result<Self, CryptoError> {
        let mut decoded = STANDARD.decode(encoded).map_err(|e| CryptoError::SecretValidation {
            reason: format!("malformed base64: {e}"),
        })?;

        let result = <[u8; SECRET_SIZE]>::try_from(decoded.as_slice())
            .map(|bytes| Self { bytes })
            .map_err(|_| CryptoError::SecretValidation {
                reason: format!("expected {SECRET_SIZE} decoded bytes, got {}", decoded.len()),
            });

        decoded.zeroize();
        result
    }

    /// Canonical base64 encoding, always [`ENCODED_SECRET_LEN`] characters.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.bytes)
    }

    /// Raw secret bytes, used as the KDF password.
    pub fn as_bytes(&self) -> &[u8; SECRET_SIZE] {
        &self.bytes
    }
}

impl fmt::Debug for FamilySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material
        f.debug_struct("FamilySecret").finish_non_exhaustive()
    }
}

impl Drop for FamilySecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}
