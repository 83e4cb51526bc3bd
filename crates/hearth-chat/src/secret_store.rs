//! Family secret lifecycle: generation, validation, persistence,
//! forced regeneration.

use std::{collections::HashMap, sync::Arc};

use hearth_crypto::{CipherProvider, FamilySecret};
use tokio::sync::Mutex;

use crate::{error::ChatError, storage::SecureStorage};

/// Constant mixed into every derived family secret.
///
/// # Security
///
/// Secrets are derived as `sha256(seed || "_family_" || family_id)`, so
/// anyone who knows this constant and a family id can compute that
/// family's secret without any stored material. This is a known
/// limitation of the closed, trusted-backend threat model: determinism is
/// what lets every device converge on the same secret with no key
/// exchange, and changing the scheme would orphan all existing
/// ciphertext. Do not treat this value as secret.
const SECRET_SEED: &str = "hearth_family_secret_v1";

/// Storage key for one family's secret.
fn storage_key(family_id: u64) -> String {
    format!("family_secret_{family_id}")
}

/// Owns the authoritative persisted secret for each family.
///
/// The store is constructed once at the composition root and shared; the
/// persisted value is the single source of truth, and every in-memory
/// view (such as [`crate::RoomKeyCache`] entries) is derived from it.
///
/// # Invariants
///
/// - A returned secret always decodes to exactly 32 bytes
/// - Concurrent create calls for one family resolve to one persisted
///   value and one storage write
/// - A secret is never returned without having been persisted first
pub struct FamilySecretStore<P> {
    provider: P,
    storage: Arc<dyn SecureStorage>,

    /// Per-family guards serializing create/regenerate cycles.
    inflight: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl<P: CipherProvider> FamilySecretStore<P> {
    /// Create a store over the given cipher backend and secure storage.
    pub fn new(provider: P, storage: Arc<dyn SecureStorage>) -> Self {
        Self { provider, storage, inflight: Mutex::new(HashMap::new()) }
    }

    /// Return the family's secret, creating it on first use.
    ///
    /// With `force_regenerate` the persisted value is discarded and
    /// rebuilt unconditionally; this is a recovery action, not a routine
    /// operation. A persisted value that fails validation is treated the
    /// same way as an absent one, after removal.
    ///
    /// Concurrent calls for the same family are serialized: whoever
    /// arrives while a generation is in flight awaits it and observes the
    /// value it persisted, rather than racing to write a second one.
    ///
    /// # Errors
    ///
    /// [`ChatError::SecretStorage`] when the storage backend fails. The
    /// store never fabricates an unpersisted secret in that case.
    pub async fn get_or_create_secret(
        &self,
        family_id: u64,
        force_regenerate: bool,
    ) -> Result<FamilySecret, ChatError> {
        let guard_slot = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(inflight.entry(family_id).or_default())
        };
        let _guard = guard_slot.lock().await;

        if !force_regenerate {
            if let Some(encoded) = self.storage.get(&storage_key(family_id)).await? {
                match FamilySecret::decode(&encoded) {
                    Ok(secret) => return Ok(secret),
                    Err(err) => {
                        tracing::warn!(family_id, %err, "discarding corrupt stored family secret");
                        self.storage.remove(&storage_key(family_id)).await?;
                    },
                }
            }
        }

        self.generate_and_persist(family_id).await
    }

    /// Deterministically rebuild and persist the family's secret.
    async fn generate_and_persist(&self, family_id: u64) -> Result<FamilySecret, ChatError> {
        self.storage.remove(&storage_key(family_id)).await?;

        let digest = self.provider.sha256(format!("{SECRET_SEED}_family_{family_id}").as_bytes());
        let secret = FamilySecret::from_bytes(digest);

        self.storage.set(&storage_key(family_id), &secret.encode()).await?;
        tracing::info!(family_id, "generated family secret");

        Ok(secret)
    }
}
