//! Error types for room key cryptography.

use thiserror::Error;

/// Errors from cryptographic primitives and codecs.
///
/// Decryption is all-or-nothing: a `DecryptionFailed` value means no
/// plaintext was produced, whether the cause was a tag mismatch, a wrong
/// key, or a malformed payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A stored or received family secret failed structural validation.
    ///
    /// Callers treat the value as corrupt: discard it and regenerate.
    #[error("secret validation failed: {reason}")]
    SecretValidation {
        /// What was wrong with the value.
        reason: String,
    },

    /// AEAD encryption rejected its input.
    #[error("encryption failed: {reason}")]
    EncryptionFailed {
        /// What the cipher backend reported.
        reason: String,
    },

    /// Authentication failed or the payload was malformed.
    #[error("decryption failed: {reason}")]
    DecryptionFailed {
        /// Why no plaintext could be produced.
        reason: String,
    },

    /// Key derivation parameters were unsupported.
    ///
    /// Indicates a programming error rather than bad input; normal
    /// operation never produces this.
    #[error("derivation failed: {reason}")]
    Derivation {
        /// Which parameter was rejected.
        reason: String,
    },
}
