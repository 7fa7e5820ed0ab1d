//! Wire protocol
//!
//! JSON messages tagged as `{"event": ..., "data": ...}`, mirroring the
//! event-name convention the browser client listens for.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::state::{PlayerSlot, WorldState};

/// Session identifier handed out on connect
pub type SessionId = Uuid;

/// Messages from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Begin the game, or restart it mid-flight
    StartGame,
    /// Nudge a paddle horizontally. The delta is caller-supplied and
    /// unvalidated in magnitude; the world clamps, it does not reject.
    #[serde(rename_all = "camelCase")]
    MovePaddle { slot: PlayerSlot, delta_x: f32 },
}

/// Messages from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Full snapshot sent once to a freshly connected session
    #[serde(rename_all = "camelCase")]
    Init {
        session_id: SessionId,
        world: WorldState,
    },
    /// Full snapshot, sent to everyone every tick and after every
    /// state-changing command
    UpdateGameState(WorldState),
    /// Another session joined
    #[serde(rename_all = "camelCase")]
    PlayerConnected { session_id: SessionId, name: String },
    /// A session left
    #[serde(rename_all = "camelCase")]
    PlayerDisconnected { session_id: SessionId, name: String },
    /// The receiving session was granted control of a paddle
    AssignPaddle { slot: PlayerSlot },
}
