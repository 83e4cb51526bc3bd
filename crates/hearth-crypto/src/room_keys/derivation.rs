//! Room key derivation using PBKDF2-HMAC-SHA256.

use core::fmt;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroize;

use super::{provider::KEY_SIZE, secret::FamilySecret};

/// PBKDF2 iteration count for room key derivation.
///
/// Deliberately far below password-hashing guidance: the KDF input is an
/// already-high-entropy 256-bit family secret, not a human password, and
/// the derivation runs on phone hardware on every cold room open. 20 000
/// iterations keeps that latency acceptable without weakening a
/// 256-bit-entropy input.
pub const PBKDF2_ITERATIONS: u32 = 20_000;

/// Symmetric key for one (room, family) pair.
///
/// Never persisted; recomputed from the family secret whenever absent
/// from the in-memory cache.
#[derive(Clone, PartialEq, Eq)]
pub struct RoomKey {
    key: [u8; KEY_SIZE],
}

impl RoomKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }

    /// Raw key bytes for the AEAD backend.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl fmt::Debug for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material
        f.debug_struct("RoomKey").finish_non_exhaustive()
    }
}

impl Drop for RoomKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Context string naming a (room, family) pair.
///
/// Used both as the PBKDF2 salt and as the room key cache key, so the two
/// can never disagree about scope.
pub fn room_context(room_id: u64, family_id: u64) -> String {
    format!("room_{room_id}_family_{family_id}")
}

/// Derive the symmetric key for a room from the family secret.
///
/// Deterministic: identical `(room_id, family_id, secret)` inputs always
/// yield byte-identical key material. Every device relies on this to
/// converge on the same key without a key-exchange round trip.
pub fn derive_room_key(room_id: u64, family_id: u64, secret: &FamilySecret) -> RoomKey {
    let salt = room_context(room_id, family_id);

    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt.as_bytes(), PBKDF2_ITERATIONS, &mut key);

    RoomKey::from_bytes(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_secret() -> FamilySecret {
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = i as u8;
        }
        FamilySecret::from_bytes(bytes)
    }

    #[test]
    fn room_context_has_expected_shape() {
        assert_eq!(room_context(12, 7), "room_12_family_7");
    }

    #[test]
    fn derivation_is_deterministic() {
        let key1 = derive_room_key(12, 7, &test_secret());
        let key2 = derive_room_key(12, 7, &test_secret());

        assert_eq!(key1, key2, "same inputs must produce same key");
    }

    #[test]
    fn different_rooms_produce_different_keys() {
        let key_a = derive_room_key(1, 7, &test_secret());
        let key_b = derive_room_key(2, 7, &test_secret());

        assert_ne!(key_a, key_b);
    }

    #[test]
    fn different_families_produce_different_keys() {
        let key_a = derive_room_key(1, 7, &test_secret());
        let key_b = derive_room_key(1, 8, &test_secret());

        assert_ne!(key_a, key_b);
    }

    #[test]
    fn different_secrets_produce_different_keys() {
        let other = FamilySecret::from_bytes([0xEE; 32]);

        let key_a = derive_room_key(1, 7, &test_secret());
        let key_b = derive_room_key(1, 7, &other);

        assert_ne!(key_a, key_b);
    }

    #[test]
    fn id_boundary_values_derive() {
        let _ = derive_room_key(0, 0, &test_secret());
        let _ = derive_room_key(u64::MAX, u64::MAX, &test_secret());
    }

    #[test]
    fn debug_never_prints_key_material() {
        let rendered = format!("{:?}", derive_room_key(1, 1, &test_secret()));
        assert!(rendered.contains("RoomKey"));
        assert!(!rendered.contains("key:"));
    }
}
