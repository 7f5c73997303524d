//! Wire messages. Every message is a JSON object whose `action` field selects the variant.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::store::{Avatar, Player, PlayerId, PlayerUpdate};

/// Messages the client sends.
///
/// `Move` carries the position the client already predicted, not a direction; the server
/// accepts it or corrects it with a later `players_moved`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinGame { username: String },
    Move { x: f32, y: f32 },
    Stop,
}

/// Messages the server sends.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServerMessage {
    JoinGame(JoinResponse),
    PlayerJoined {
        player: Player,
        #[serde(default)]
        avatar: Option<Avatar>,
    },
    PlayersMoved {
        #[serde(default)]
        players: HashMap<PlayerId, PlayerUpdate>,
    },
    PlayerLeft {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    Move(Ack),
    Stop(Ack),
}

const KNOWN_ACTIONS: [&str; 6] = ["join_game", "player_joined", "players_moved", "player_left", "move", "stop"];

/// Reply to `join_game`. On success the full world state comes along with it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub success: bool,
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    #[serde(default)]
    pub players: HashMap<PlayerId, Player>,
    #[serde(default)]
    pub avatars: HashMap<String, Avatar>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Acknowledgement of a `move` or `stop`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ack {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

fn default_success() -> bool {
    true
}

/// Decodes one inbound message.
///
/// Unknown actions are reported separately from malformed payloads so callers can log them
/// differently; both are otherwise ignored.
pub fn decode(text: &str) -> Result<ServerMessage, ProtocolError> {
    let value: Value = serde_json::from_str(text)?;
    let action = value
        .get("action")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingAction)?;

    if !KNOWN_ACTIONS.contains(&action) {
        return Err(ProtocolError::UnknownAction(action.to_string()));
    }

    Ok(serde_json::from_value(value)?)
}

pub fn encode(message: &ClientMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(message)?)
}
