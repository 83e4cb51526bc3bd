//! Room key memoization.
//!
//! PBKDF2 at 20 000 iterations is too expensive to rerun on every send
//! and receive, so derived keys are cached per (room, family). The cache
//! is a derived, in-memory-only view: the persisted family secret stays
//! the single source of truth, and regenerating it invalidates every
//! entry for that family.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use hearth_crypto::{FamilySecret, RoomKey, derive_room_key, room_context};

/// Shared cache of derived room keys, keyed by the room context string.
///
/// Concurrent reads are cheap; a lost insertion race just rewrites the
/// identical deterministically derived key, so no entry can ever hold a
/// value that disagrees with its inputs.
#[derive(Debug, Default)]
pub struct RoomKeyCache {
    keys: RwLock<HashMap<String, RoomKey>>,
}

impl RoomKeyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached key for a room, deriving and caching it on miss.
    ///
    /// A hit performs no cryptographic work. The derivation runs outside
    /// the lock, so a slow miss never blocks concurrent readers.
    pub fn get_or_derive(&self, room_id: u64, family_id: u64, secret: &FamilySecret) -> RoomKey {
        let context = room_context(room_id, family_id);

        if let Some(key) = self.read().get(&context) {
            return key.clone();
        }

        tracing::debug!(room_id, family_id, "room key cache miss, deriving");
        let key = derive_room_key(room_id, family_id, secret);
        self.write().insert(context, key.clone());

        key
    }

    /// Drop every entry derived for `family_id`.
    ///
    /// Must be called after the family's secret is regenerated: the old
    /// entries no longer correspond to the persisted secret and must not
    /// be served.
    pub fn invalidate_family(&self, family_id: u64) {
        let suffix = format!("_family_{family_id}");
        self.write().retain(|context, _| !context.ends_with(&suffix));
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the cache holds no keys.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, RoomKey>> {
        // A poisoned lock only means a reader panicked; the map is intact
        self.keys.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, RoomKey>> {
        self.keys.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_secret() -> FamilySecret {
        FamilySecret::from_bytes([0x21; 32])
    }

    #[test]
    fn hit_returns_the_cached_key() {
        let cache = RoomKeyCache::new();

        let first = cache.get_or_derive(12, 7, &test_secret());
        let second = cache.get_or_derive(12, 7, &test_secret());

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_matches_direct_derivation() {
        let cache = RoomKeyCache::new();

        let cached = cache.get_or_derive(12, 7, &test_secret());
        let direct = derive_room_key(12, 7, &test_secret());

        assert_eq!(cached, direct);
    }

    #[test]
    fn distinct_rooms_get_distinct_entries() {
        let cache = RoomKeyCache::new();

        let key_a = cache.get_or_derive(1, 7, &test_secret());
        let key_b = cache.get_or_derive(2, 7, &test_secret());

        assert_ne!(key_a, key_b);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn invalidate_family_evicts_only_that_family() {
        let cache = RoomKeyCache::new();

        cache.get_or_derive(1, 7, &test_secret());
        cache.get_or_derive(2, 7, &test_secret());
        cache.get_or_derive(1, 8, &test_secret());

        cache.invalidate_family(7);

        assert_eq!(cache.len(), 1);
        // Family 8's entry survives
        let before = cache.len();
        cache.get_or_derive(1, 8, &test_secret());
        assert_eq!(cache.len(), before);
    }

    #[test]
    fn invalidate_does_not_match_families_sharing_digit_suffix() {
        let cache = RoomKeyCache::new();

        cache.get_or_derive(1, 7, &test_secret());
        cache.get_or_derive(1, 17, &test_secret());

        cache.invalidate_family(7);

        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn rederivation_after_invalidation_uses_the_new_secret() {
        let cache = RoomKeyCache::new();
        let old_key = cache.get_or_derive(1, 7, &test_secret());

        cache.invalidate_family(7);
        let new_secret = FamilySecret::from_bytes([0x99; 32]);
        let new_key = cache.get_or_derive(1, 7, &new_secret);

        assert_ne!(old_key, new_key);
    }
}
