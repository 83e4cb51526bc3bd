//! Message envelopes and render-ready decryption outcomes.

use std::collections::HashMap;

use hearth_crypto::EncryptedPayload;
use serde::{Deserialize, Serialize};

/// An encrypted message as delivered by the transport.
///
/// Matches the WebSocket/REST wire shape: the encrypted body plus
/// metadata this core passes through without interpreting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Server-assigned message identity.
    pub id: u64,
    /// Room the message belongs to.
    pub room: u64,
    /// Sender's display identity, used verbatim in placeholders.
    pub sender: String,
    /// Server-side creation timestamp, passed through unparsed.
    pub created_at: String,
    /// The encrypted body.
    #[serde(flatten)]
    pub payload: EncryptedPayload,
}

/// What decrypting one message produced.
///
/// A failure is a render-ready placeholder, not an error: the
/// conversation view shows it in place so one bad message never takes
/// down the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptionOutcome {
    /// The recovered plaintext.
    Decrypted(String),
    /// The message could not be decrypted; render a placeholder.
    Unreadable {
        /// Display identity of the sender, for the placeholder text.
        sender: String,
    },
}

impl DecryptionOutcome {
    /// Whether this outcome carries plaintext.
    pub fn is_readable(&self) -> bool {
        matches!(self, Self::Decrypted(_))
    }

    /// Text for the conversation view: the plaintext, or a placeholder
    /// naming the sender.
    pub fn display_text(&self) -> String {
        match self {
            Self::Decrypted(text) => text.clone(),
            Self::Unreadable { sender } => format!("Unable to decrypt message from {sender}"),
        }
    }
}

/// A message after a decryption attempt, metadata preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedMessage {
    /// Server-assigned message identity.
    pub id: u64,
    /// Room the message belongs to.
    pub room: u64,
    /// Sender's display identity.
    pub sender: String,
    /// Server-side creation timestamp, passed through unparsed.
    pub created_at: String,
    /// Plaintext or placeholder.
    pub outcome: DecryptionOutcome,
}

/// Merge a batch reload with messages already decrypted via the live
/// path.
///
/// For each reloaded message that failed, a previously readable copy of
/// the same message identity wins, so a transient reload never regresses
/// a message the user could already read. Output order follows the
/// reloaded batch.
pub fn merge_with_live(
    live: &HashMap<u64, DecryptedMessage>,
    reloaded: Vec<DecryptedMessage>,
) -> Vec<DecryptedMessage> {
    reloaded
        .into_iter()
        .map(|message| {
            if message.outcome.is_readable() {
                return message;
            }
            match live.get(&message.id) {
                Some(previous) if previous.outcome.is_readable() => previous.clone(),
                _ => message,
            }
        })
        .collect()
}
