//! Hearth Chat Encryption Core
//!
//! Key lifecycle, caching, and recovery orchestration for Hearth's
//! end-to-end encrypted family chat. Built on the pure primitives in
//! [`hearth_crypto`]; the UI, the transport, and the platform's secure
//! key-value storage remain outside and talk to this crate at its
//! boundaries.
//!
//! # Components
//!
//! - [`FamilySecretStore`]: owns the persisted per-family secret
//!   (lazy creation, validation, forced regeneration)
//! - [`RoomKeyCache`]: memoizes derived room keys so repeated sends and
//!   receives skip the expensive derivation
//! - [`RoomCipher`]: encrypts outgoing text, decrypts incoming batches,
//!   and drives the one-shot secret-regeneration recovery when an entire
//!   batch fails to decrypt
//! - [`SecureStorage`]: boundary trait for the platform keystore, with
//!   [`MemoryStorage`] as the in-process implementation
//!
//! # Architecture
//!
//! The store and cache are constructed once at the composition root and
//! passed explicitly to every [`RoomCipher`]; nothing in this crate is a
//! process-wide global. The cipher backend is likewise injected through
//! [`CipherProvider`], never branched on inside the orchestration logic.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod message;
mod room_cipher;
mod room_key_cache;
mod secret_store;
mod storage;

pub use error::ChatError;
pub use hearth_crypto::{CipherProvider, EncryptedPayload, FamilySecret, RoomKey, SoftwareProvider};
pub use message::{DecryptedMessage, DecryptionOutcome, IncomingMessage, merge_with_live};
pub use room_cipher::{BatchReload, ReloadPhase, RoomCipher};
pub use room_key_cache::RoomKeyCache;
pub use secret_store::FamilySecretStore;
pub use storage::{MemoryStorage, SecureStorage, StorageError};
