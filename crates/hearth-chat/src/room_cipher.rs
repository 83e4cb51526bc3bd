//! Room-level encryption orchestration and decryption recovery.
//!
//! The conversation screen talks to [`RoomCipher`]: prepare a room,
//! encrypt outgoing text, decrypt incoming messages. Bulk reloads run
//! through an explicit phase machine that detects the
//! all-messages-failed signature of a stale family secret and performs
//! exactly one regenerate-and-retry cycle.

use std::sync::Arc;

use hearth_crypto::{
    CipherProvider, EncryptedPayload, RoomKey, decrypt_message, encrypt_message,
};

use crate::{
    error::ChatError,
    message::{DecryptedMessage, DecryptionOutcome, IncomingMessage},
    room_key_cache::RoomKeyCache,
    secret_store::FamilySecretStore,
};

/// Phases of a batch reload.
///
/// The transition function is the whole recovery policy: an all-failed
/// first pass walks `Decrypting -> AllFailed -> Regenerating -> Retrying
/// -> Done`, and `Retrying` transitions to `Done` unconditionally, which
/// is what bounds recovery to a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadPhase {
    /// First decryption pass over the batch.
    Decrypting,
    /// Every message in a non-empty batch failed; a shared-secret
    /// mismatch is suspected rather than per-message corruption.
    AllFailed,
    /// Forcing regeneration of the family secret and dropping the
    /// family's cached room keys.
    Regenerating,
    /// Second and final decryption pass with the regenerated secret.
    Retrying,
    /// Terminal; whatever the last pass produced is the result.
    Done,
}

impl ReloadPhase {
    /// Advance the machine.
    ///
    /// `all_failed` is only consulted when leaving [`Self::Decrypting`];
    /// every later phase has exactly one successor. In particular
    /// [`Self::Retrying`] reaches [`Self::Done`] even if the retry failed
    /// again wholesale, so a persistently corrupt stream cannot loop
    /// regeneration.
    pub fn next(self, all_failed: bool) -> Self {
        match self {
            Self::Decrypting => {
                if all_failed {
                    Self::AllFailed
                } else {
                    Self::Done
                }
            },
            Self::AllFailed => Self::Regenerating,
            Self::Regenerating => Self::Retrying,
            Self::Retrying | Self::Done => Self::Done,
        }
    }
}

/// Result of a batch reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReload {
    /// One entry per input message, input order preserved.
    pub messages: Vec<DecryptedMessage>,
    /// Whether the secret-regeneration recovery cycle ran.
    pub recovery_attempted: bool,
}

/// Encrypts and decrypts one family's room traffic.
///
/// Holds no state of its own: the secret store and key cache are shared,
/// constructed once at the composition root and passed in explicitly.
pub struct RoomCipher<P: CipherProvider> {
    provider: P,
    secrets: Arc<FamilySecretStore<P>>,
    keys: Arc<RoomKeyCache>,
}

impl<P: CipherProvider> RoomCipher<P> {
    /// Create a cipher over shared secret and key state.
    pub fn new(provider: P, secrets: Arc<FamilySecretStore<P>>, keys: Arc<RoomKeyCache>) -> Self {
        Self { provider, secrets, keys }
    }

    /// Resolve the room's key, creating the family secret and deriving
    /// the key on first use.
    ///
    /// # Errors
    ///
    /// [`ChatError::SecretStorage`] when secure storage is unavailable.
    pub async fn prepare_room(&self, room_id: u64, family_id: u64) -> Result<RoomKey, ChatError> {
        let secret = self.secrets.get_or_create_secret(family_id, false).await?;
        Ok(self.keys.get_or_derive(room_id, family_id, &secret))
    }

    /// Encrypt an outgoing message body.
    pub async fn encrypt_outgoing(
        &self,
        room_id: u64,
        family_id: u64,
        plaintext: &str,
    ) -> Result<EncryptedPayload, ChatError> {
        let key = self.prepare_room(room_id, family_id).await?;
        Ok(encrypt_message(&self.provider, &key, plaintext)?)
    }

    /// Decrypt one live incoming message.
    ///
    /// A decryption failure degrades to a placeholder outcome; only
    /// storage unavailability is an error. The live path never triggers
    /// recovery, since a single bad message is not evidence of a stale
    /// secret.
    pub async fn decrypt_incoming(
        &self,
        room_id: u64,
        family_id: u64,
        message: &IncomingMessage,
    ) -> Result<DecryptedMessage, ChatError> {
        let key = self.prepare_room(room_id, family_id).await?;
        Ok(decrypt_one(&self.provider, &key, message))
    }

    /// Decrypt a reloaded batch, recovering once from a stale secret.
    ///
    /// Each message decrypts independently and failures become
    /// placeholders, preserving input order. If a non-empty batch fails
    /// wholesale, the family secret is force-regenerated, the family's
    /// cached keys are dropped, and the batch is retried exactly once;
    /// the retry's result is final either way.
    ///
    /// # Errors
    ///
    /// [`ChatError::SecretStorage`] when reading or rewriting the secret
    /// fails; recovery is then abandoned rather than retried blind.
    pub async fn reload_batch(
        &self,
        room_id: u64,
        family_id: u64,
        messages: &[IncomingMessage],
    ) -> Result<BatchReload, ChatError> {
        let mut secret = self.secrets.get_or_create_secret(family_id, false).await?;
        let mut results = Vec::new();
        let mut recovery_attempted = false;
        let mut phase = ReloadPhase::Decrypting;

        while phase != ReloadPhase::Done {
            match phase {
                ReloadPhase::Decrypting | ReloadPhase::Retrying => {
                    let key = self.keys.get_or_derive(room_id, family_id, &secret);
                    results = messages.iter().map(|m| decrypt_one(&self.provider, &key, m)).collect();

                    let failed = results.iter().filter(|m| !m.outcome.is_readable()).count();
                    let all_failed = !messages.is_empty() && failed == messages.len();

                    if all_failed && phase == ReloadPhase::Decrypting {
                        tracing::warn!(
                            room_id,
                            family_id,
                            batch = messages.len(),
                            "entire batch failed to decrypt, suspecting stale family secret"
                        );
                    }

                    phase = phase.next(all_failed);
                },
                ReloadPhase::AllFailed => {
                    phase = phase.next(false);
                },
                ReloadPhase::Regenerating => {
                    secret = self.secrets.get_or_create_secret(family_id, true).await?;
                    self.keys.invalidate_family(family_id);
                    recovery_attempted = true;
                    tracing::info!(family_id, "family secret regenerated, retrying batch once");
                    phase = phase.next(false);
                },
                ReloadPhase::Done => {},
            }
        }

        Ok(BatchReload { messages: results, recovery_attempted })
    }
}

/// Decrypt one message into a render-ready result.
fn decrypt_one<P: CipherProvider>(
    provider: &P,
    key: &RoomKey,
    message: &IncomingMessage,
) -> DecryptedMessage {
    let outcome = match decrypt_message(provider, key, &message.payload) {
        Ok(text) => DecryptionOutcome::Decrypted(text),
        Err(err) => {
            tracing::debug!(message_id = message.id, %err, "message failed to decrypt");
            DecryptionOutcome::Unreadable { sender: message.sender.clone() }
        },
    };

    DecryptedMessage {
        id: message.id,
        room: message.room,
        sender: message.sender.clone(),
        created_at: message.created_at.clone(),
        outcome,
    }
}
