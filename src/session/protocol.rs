//! Wire messages exchanged between host and guest.
//!
//! Every message is a tagged union: `{"type": "ACTION", "payload": {...}}`.
//! Both ends are assumed to run the same catalog, so nothing is versioned.

use crate::battle::state::{Action, BattleEvent};
use crate::combatant::Combatant;
use crate::errors::{SessionError, SessionResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const ROOM_ID_LEN: usize = 4;
const ROOM_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WireMessage {
    /// The sender's full roster, sent once the channel is up.
    Handshake { roster: Vec<Combatant> },
    /// The sender's choice for the current round.
    Action { action: Action },
    /// The host's authoritative event list for a resolved round.
    TurnResult {
        events: Vec<BattleEvent>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        digest: Option<u64>,
    },
    /// Start over from the rosters exchanged in the handshake.
    Restart,
}

impl WireMessage {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            WireMessage::Handshake { .. } => "HANDSHAKE",
            WireMessage::Action { .. } => "ACTION",
            WireMessage::TurnResult { .. } => "TURN_RESULT",
            WireMessage::Restart => "RESTART",
        }
    }
}

pub fn encode(message: &WireMessage) -> SessionResult<String> {
    serde_json::to_string(message).map_err(|e| SessionError::Codec(e.to_string()))
}

pub fn decode(text: &str) -> SessionResult<WireMessage> {
    serde_json::from_str(text).map_err(|e| SessionError::Codec(e.to_string()))
}

/// A short opaque room identifier used to establish the channel out of band.
pub fn generate_room_id() -> String {
    let mut rng = rand::rng();
    (0..ROOM_ID_LEN)
        .map(|_| ROOM_ID_ALPHABET[rng.random_range(0..ROOM_ID_ALPHABET.len())] as char)
        .collect()
}
