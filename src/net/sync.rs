use glam::Vec2;
use strum_macros::Display;
use tracing::{debug, info, trace, warn};

use crate::error::{ClientError, NetError, ProtocolError};
use crate::events::Intent;
use crate::net::protocol::{self, Ack, ClientMessage, JoinResponse, ServerMessage};
use crate::net::Transport;
use crate::store::EntityStore;

/// Where the session is in its (single, non-retried) lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ConnectionState {
    Connecting,
    /// Channel open, `join_game` sent, no successful reply yet.
    Open,
    Joined,
    /// Channel gone. Nothing reconnects it.
    Closed,
}

/// Owns the message channel: turns intents into wire messages and applies inbound messages to the store.
pub struct NetworkSync<T: Transport> {
    transport: T,
    username: String,
    state: ConnectionState,
}

impl<T: Transport> NetworkSync<T> {
    pub fn new(transport: T, username: impl Into<String>) -> Self {
        Self {
            transport,
            username: username.into(),
            state: ConnectionState::Connecting,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The channel opened: ask to join straight away.
    pub fn on_open(&mut self) {
        info!(username = %self.username, "Connected, joining game");
        self.state = ConnectionState::Open;
        let join = ClientMessage::JoinGame {
            username: self.username.clone(),
        };
        self.send(&join);
    }

    pub fn on_close(&mut self, reason: &str) {
        if self.state != ConnectionState::Closed {
            warn!(reason, "Connection closed; not reconnecting");
        }
        self.state = ConnectionState::Closed;
    }

    /// Reports a locally applied intent upstream. `predicted` is the position after prediction.
    pub fn send_intent(&mut self, intent: Intent, predicted: Vec2) {
        let message = match intent {
            Intent::Move(_) => ClientMessage::Move {
                x: predicted.x,
                y: predicted.y,
            },
            Intent::Stop => ClientMessage::Stop,
        };
        self.send(&message);
    }

    /// Encodes and sends a message. Failures are logged, never retried.
    pub fn send(&mut self, message: &ClientMessage) -> bool {
        if self.state == ConnectionState::Closed {
            debug!(?message, "Dropping message on closed connection");
            return false;
        }

        let result = protocol::encode(message)
            .map_err(ClientError::from)
            .and_then(|text| self.transport.send(text).map_err(Into::into));

        match result {
            Ok(()) => {
                trace!(?message, "Sent");
                true
            }
            Err(e) => {
                warn!(error = %e, ?message, "Failed to send message");
                if matches!(e, ClientError::Net(NetError::Closed)) {
                    self.state = ConnectionState::Closed;
                }
                false
            }
        }
    }

    /// Decodes one inbound message and applies it to `store`. Returns whether anything changed.
    pub fn handle_message(&mut self, store: &mut EntityStore, text: &str) -> bool {
        match protocol::decode(text) {
            Ok(message) => self.apply(store, message),
            Err(ProtocolError::UnknownAction(action)) => {
                warn!(action = %action, "Ignoring message with unknown action");
                false
            }
            Err(e) => {
                warn!(error = %e, "Ignoring malformed message");
                false
            }
        }
    }

    fn apply(&mut self, store: &mut EntityStore, message: ServerMessage) -> bool {
        match message {
            ServerMessage::JoinGame(response) => self.apply_join(store, response),
            ServerMessage::PlayerJoined { player, avatar } => {
                info!(id = %player.id, username = %player.username, "Player joined");
                if let Some(avatar) = avatar {
                    // Players find avatars by the name they reference.
                    let name = if player.avatar.is_empty() {
                        avatar.name.clone()
                    } else {
                        player.avatar.clone()
                    };
                    if store.insert_avatar(name.clone(), avatar) {
                        debug!(avatar = %name, "Learned new avatar");
                    }
                }
                store.insert_player(player);
                true
            }
            ServerMessage::PlayersMoved { players } => {
                let changed = !players.is_empty();
                for (id, update) in players {
                    if store.my_player_id() == Some(id.as_str()) {
                        trace!(?update, "Server overwrote predicted state");
                    }
                    store.apply_update(&id, update);
                }
                changed
            }
            ServerMessage::PlayerLeft { player_id } => match store.remove_player(&player_id) {
                Some(player) => {
                    info!(id = %player_id, username = %player.username, "Player left");
                    true
                }
                None => {
                    debug!(id = %player_id, "Leave for a player we are not tracking");
                    false
                }
            },
            ServerMessage::Move(ack) => {
                Self::log_ack("move", ack);
                false
            }
            ServerMessage::Stop(ack) => {
                Self::log_ack("stop", ack);
                false
            }
        }
    }

    fn apply_join(&mut self, store: &mut EntityStore, response: JoinResponse) -> bool {
        if !response.success {
            warn!(
                error = response.error.as_deref().unwrap_or("no reason given"),
                "Join rejected"
            );
            return false;
        }

        let Some(my_id) = response.player_id else {
            warn!("Join succeeded without a player id");
            return false;
        };

        let player_count = response.players.len();
        if !store.establish(my_id.clone(), response.players, response.avatars) {
            warn!(id = %my_id, "Join response does not contain our own player");
            return false;
        }

        self.state = ConnectionState::Joined;
        info!(id = %my_id, players = player_count, avatars = store.avatar_count(), "Joined game");
        true
    }

    // Rejected moves are not rolled back; the server's next players_moved corrects us.
    fn log_ack(action: &str, ack: Ack) {
        if ack.success {
            trace!(action, "Acknowledged");
        } else {
            warn!(
                action,
                error = ack.error.as_deref().unwrap_or("no reason given"),
                "Server rejected request"
            );
        }
    }
}
