//! Hearth Cryptographic Primitives
//!
//! Cryptographic building blocks for Hearth's end-to-end encrypted chat.
//! Pure functions and small value types with no I/O; key lifecycle and
//! storage live in `hearth-chat`.
//!
//! # Key Lifecycle
//!
//! Chat bodies are encrypted on the sending device and decrypted on
//! receiving devices; the backend only ever relays ciphertext. All key
//! material is derived locally:
//!
//! ```text
//! Family Secret (256-bit, shared by every device in one family)
//!        │
//!        ▼
//! PBKDF2-HMAC-SHA256 → Room Key (per room, per family)
//!        │
//!        ▼
//! AES-256-GCM → EncryptedPayload { ciphertext, iv } (both base64)
//! ```
//!
//! There is no key-exchange round trip. Devices converge because every
//! derivation step is deterministic; only the per-message iv is random.
//!
//! # Security
//!
//! Authenticity:
//! - AES-256-GCM is tamper-evident; a failed tag check rejects the whole
//!   message, never returning partially decrypted bytes
//!
//! Nonce hygiene:
//! - A fresh 96-bit iv is drawn from the platform CSPRNG for every
//!   encryption, so iv reuse under one key never happens by construction
//!
//! Determinism:
//! - Identical `(room, family, secret)` inputs yield byte-identical room
//!   keys. This is a correctness requirement, not a weakness: without it,
//!   a family's devices could not read each other's rooms

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod room_keys;

pub use room_keys::{
    CipherProvider, CryptoError, ENCODED_SECRET_LEN, EncryptedPayload, FamilySecret, IV_SIZE,
    KEY_SIZE, PBKDF2_ITERATIONS, RoomKey, SECRET_SIZE, SoftwareProvider, TAG_SIZE,
    decrypt_message, derive_room_key, encrypt_message, room_context,
};
