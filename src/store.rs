//! The in-memory view of the shared world: every known player and avatar definition.
//!
//! Local prediction and remote updates both write here. The controlled player is an ordinary
//! entry looked up by id, so whatever prediction writes is exactly what the camera, the renderer
//! and later remote overwrites see.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::direction::Direction;

/// Server-assigned player identifier, stable for the session.
pub type PlayerId = String;

/// Opaque reference to the image data of one animation frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(pub String);

impl FrameId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FrameId {
    fn from(value: &str) -> Self {
        FrameId(value.to_string())
    }
}

/// One participant in the world.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawPlayer")]
pub struct Player {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub facing: Direction,
    pub animation_frame: usize,
    pub username: String,
    pub avatar: String,
    /// Set by local prediction while a direction is held. Never sent or received.
    pub moving: bool,
}

/// Player as it appears on the wire. Facing may arrive as `facing`, `direction` or both;
/// `facing` wins when both are present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlayer {
    #[serde(default)]
    id: PlayerId,
    x: f32,
    y: f32,
    #[serde(default)]
    facing: Option<Direction>,
    #[serde(default)]
    direction: Option<Direction>,
    #[serde(default, deserialize_with = "null_as_default")]
    animation_frame: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    avatar: String,
}

impl From<RawPlayer> for Player {
    fn from(raw: RawPlayer) -> Self {
        Player {
            id: raw.id,
            x: raw.x,
            y: raw.y,
            facing: raw.facing.or(raw.direction).unwrap_or_default(),
            animation_frame: raw.animation_frame,
            username: raw.username,
            avatar: raw.avatar,
            moving: false,
        }
    }
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, position: Vec2, avatar: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x: position.x,
            y: position.y,
            facing: Direction::default(),
            animation_frame: 0,
            username: String::new(),
            avatar: avatar.into(),
            moving: false,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.x = position.x;
        self.y = position.y;
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A remote update for one player. Only the fields present are written.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawPlayerUpdate")]
pub struct PlayerUpdate {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub facing: Option<Direction>,
    pub animation_frame: Option<usize>,
    pub username: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlayerUpdate {
    #[serde(default)]
    x: Option<f32>,
    #[serde(default)]
    y: Option<f32>,
    #[serde(default)]
    facing: Option<Direction>,
    #[serde(default)]
    direction: Option<Direction>,
    #[serde(default)]
    animation_frame: Option<usize>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
}

impl From<RawPlayerUpdate> for PlayerUpdate {
    fn from(raw: RawPlayerUpdate) -> Self {
        PlayerUpdate {
            x: raw.x,
            y: raw.y,
            facing: raw.facing.or(raw.direction),
            animation_frame: raw.animation_frame,
            username: raw.username,
            avatar: raw.avatar,
        }
    }
}

impl PlayerUpdate {
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }
}

/// A visual skin: ordered animation frames per direction.
///
/// West is never stored; it is drawn by mirroring east.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawAvatar")]
pub struct Avatar {
    pub name: String,
    frames: HashMap<Direction, Vec<FrameId>>,
}

/// Avatar as it appears on the wire, with frame tables keyed by direction name.
#[derive(Debug, Deserialize)]
struct RawAvatar {
    #[serde(default)]
    name: String,
    #[serde(default)]
    frames: HashMap<String, Vec<FrameId>>,
}

impl From<RawAvatar> for Avatar {
    fn from(raw: RawAvatar) -> Self {
        let mut frames = HashMap::new();
        for (key, sequence) in raw.frames {
            match Direction::from_str(&key) {
                Ok(Direction::Left) => {
                    debug!(avatar = %raw.name, "Dropping west frames; west is mirrored from east");
                }
                Ok(direction) => {
                    frames.insert(direction, sequence);
                }
                Err(_) => {
                    warn!(avatar = %raw.name, key = %key, "Ignoring frames for unknown direction");
                }
            }
        }
        Avatar { name: raw.name, frames }
    }
}

impl Avatar {
    pub fn new(name: impl Into<String>, frames: impl IntoIterator<Item = (Direction, Vec<FrameId>)>) -> Self {
        Avatar {
            name: name.into(),
            frames: frames.into_iter().filter(|(direction, _)| *direction != Direction::Left).collect(),
        }
    }

    /// The frame sequence stored for `direction`, if any.
    pub fn frames(&self, direction: Direction) -> Option<&[FrameId]> {
        self.frames.get(&direction).map(Vec::as_slice)
    }

    pub fn frame(&self, direction: Direction, index: usize) -> Option<&FrameId> {
        self.frames(direction).and_then(|frames| frames.get(index))
    }

    pub fn directions(&self) -> impl Iterator<Item = Direction> + '_ {
        self.frames.keys().copied()
    }
}

/// The rectangle positions are confined to: `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub size: Vec2,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
        }
    }

    /// Clamps each axis independently into the world.
    pub fn clamp(&self, position: Vec2) -> Vec2 {
        position.clamp(Vec2::ZERO, self.size)
    }

    pub fn contains(&self, position: Vec2) -> bool {
        position.cmpge(Vec2::ZERO).all() && position.cmple(self.size).all()
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            size: crate::constants::WORLD_SIZE.as_vec2(),
        }
    }
}

/// All known players and avatars, plus which player is ours.
#[derive(Debug, Default)]
pub struct EntityStore {
    bounds: WorldBounds,
    players: HashMap<PlayerId, Player>,
    avatars: HashMap<String, Avatar>,
    my_player_id: Option<PlayerId>,
}

impl EntityStore {
    pub fn new(bounds: WorldBounds) -> Self {
        Self {
            bounds,
            ..Default::default()
        }
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Installs the state delivered by a successful join.
    ///
    /// Replaces the known players wholesale and records which one is ours. Returns `false`
    /// (leaving the store untouched) when the mapping does not contain `my_id`.
    pub fn establish(
        &mut self,
        my_id: PlayerId,
        players: HashMap<PlayerId, Player>,
        avatars: HashMap<String, Avatar>,
    ) -> bool {
        if !players.contains_key(&my_id) {
            return false;
        }

        self.players.clear();
        for (id, mut player) in players {
            // The map key is authoritative for identity.
            player.id = id;
            self.insert_player(player);
        }
        for (name, avatar) in avatars {
            self.insert_avatar(name, avatar);
        }
        self.my_player_id = Some(my_id);
        true
    }

    /// Adds or replaces a player, clamping its position into the world.
    pub fn insert_player(&mut self, mut player: Player) {
        let clamped = self.bounds.clamp(player.position());
        if clamped != player.position() {
            debug!(id = %player.id, "Clamped incoming player position into the world");
        }
        player.set_position(clamped);
        self.players.insert(player.id.clone(), player);
    }

    /// Adds an avatar under `name` unless that name is already known. Returns whether it was new.
    ///
    /// `name` is what players reference, so it replaces whatever name the definition carried.
    pub fn insert_avatar(&mut self, name: impl Into<String>, mut avatar: Avatar) -> bool {
        match self.avatars.entry(name.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                if avatar.name != *slot.key() {
                    debug!(key = %slot.key(), embedded = %avatar.name, "Avatar renamed to its map key");
                    avatar.name = slot.key().clone();
                }
                slot.insert(avatar);
                true
            }
        }
    }

    /// Writes every field present in `update` onto the player, creating it if unknown.
    ///
    /// Remote state wins over local prediction: this overwrites the controlled player too.
    pub fn apply_update(&mut self, id: &str, update: PlayerUpdate) {
        let bounds = self.bounds;
        let player = self
            .players
            .entry(id.to_string())
            .or_insert_with(|| Player::new(id, Vec2::ZERO, String::new()));

        if update.x.is_some() || update.y.is_some() {
            let position = Vec2::new(update.x.unwrap_or(player.x), update.y.unwrap_or(player.y));
            player.set_position(bounds.clamp(position));
            player.moving = false;
        }
        if let Some(facing) = update.facing {
            player.facing = facing;
        }
        if let Some(frame) = update.animation_frame {
            player.animation_frame = frame;
        }
        if let Some(username) = update.username {
            player.username = username;
        }
        if let Some(avatar) = update.avatar {
            player.avatar = avatar;
        }
    }

    /// Removes a player. The controlled player is never removed once established.
    pub fn remove_player(&mut self, id: &str) -> Option<Player> {
        if self.my_player_id.as_deref() == Some(id) {
            warn!(id, "Refusing to remove the controlled player");
            return None;
        }
        self.players.remove(id)
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn my_player_id(&self) -> Option<&str> {
        self.my_player_id.as_deref()
    }

    pub fn my_player(&self) -> Option<&Player> {
        self.my_player_id.as_ref().and_then(|id| self.players.get(id))
    }

    pub fn my_player_mut(&mut self) -> Option<&mut Player> {
        self.my_player_id.as_ref().and_then(|id| self.players.get_mut(id))
    }

    pub fn avatar(&self, name: &str) -> Option<&Avatar> {
        self.avatars.get(name)
    }

    pub fn avatar_count(&self) -> usize {
        self.avatars.len()
    }
}
