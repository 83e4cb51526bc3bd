//! Room key subsystem: family secrets, key derivation, message encryption.

mod derivation;
mod encryption;
mod error;
mod provider;
mod secret;

pub use derivation::{PBKDF2_ITERATIONS, RoomKey, derive_room_key, room_context};
pub use encryption::{EncryptedPayload, decrypt_message, encrypt_message};
pub use error::CryptoError;
pub use provider::{CipherProvider, IV_SIZE, KEY_SIZE, SoftwareProvider, TAG_SIZE};
pub use secret::{ENCODED_SECRET_LEN, FamilySecret, SECRET_SIZE};
