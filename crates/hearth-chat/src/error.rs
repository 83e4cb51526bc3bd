//! Error types for the chat encryption core.
//!
//! Single-message decryption failures are not errors at this level: they
//! degrade to placeholder outcomes so one unreadable message never aborts
//! a batch. Errors here are the conditions the caller must surface,
//! namely storage unavailability and cryptographic misuse.

use hearth_crypto::CryptoError;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced to callers of the chat encryption core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Secure storage could not be read or written.
    ///
    /// Fatal to the current operation. The store never fabricates an
    /// unpersisted secret to paper over this, because a secret that only
    /// one device holds desynchronizes the family.
    #[error("secret storage failed: {0}")]
    SecretStorage(#[from] StorageError),

    /// A cryptographic primitive or codec failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_convert_and_display() {
        let err: ChatError = StorageError { reason: "keystore locked".to_string() }.into();
        assert!(err.to_string().contains("keystore locked"));
    }

    #[test]
    fn crypto_errors_pass_through_transparently() {
        let err: ChatError =
            CryptoError::DecryptionFailed { reason: "authentication failed".to_string() }.into();
        assert_eq!(err.to_string(), "decryption failed: authentication failed");
    }
}
