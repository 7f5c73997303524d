#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{json, Value};
use townsquare::asset::{FrameKey, ImageHandle, ImageLoader};
use townsquare::client::{Client, ClientSettings};
use townsquare::direction::Direction;
use townsquare::error::NetError;
use townsquare::events::ClientEvent;
use townsquare::net::Transport;
use townsquare::store::{Avatar, FrameId, Player};

/// Records everything sent, decoded back into JSON for easy assertions.
#[derive(Debug, Default, Clone)]
pub struct RecordingTransport {
    pub sent: Rc<RefCell<Vec<String>>>,
    pub fail_with_closed: bool,
}

impl RecordingTransport {
    pub fn messages(&self) -> Vec<Value> {
        self.sent
            .borrow()
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect()
    }

    pub fn last(&self) -> Option<Value> {
        self.messages().pop()
    }

    pub fn clear(&self) {
        self.sent.borrow_mut().clear();
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, text: String) -> Result<(), NetError> {
        if self.fail_with_closed {
            return Err(NetError::Closed);
        }
        self.sent.borrow_mut().push(text);
        Ok(())
    }
}

/// Records every load the cache starts without completing any of them.
#[derive(Debug, Default)]
pub struct RecordingLoader {
    pub started: Vec<(FrameKey, FrameId)>,
}

impl ImageLoader for RecordingLoader {
    fn begin(&mut self, key: FrameKey, frame: FrameId) {
        self.started.push((key, frame));
    }
}

pub fn frame_id(avatar: &str, direction: &str, index: usize) -> FrameId {
    FrameId(format!("{avatar}/{direction}/{index}"))
}

/// An avatar with two frames each for north, south and east.
pub fn sample_avatar(name: &str) -> Avatar {
    Avatar::new(
        name,
        [Direction::Up, Direction::Down, Direction::Right].map(|direction| {
            let frames: Vec<FrameId> = (0..2).map(|index| frame_id(name, direction.compass_name(), index)).collect();
            (direction, frames)
        }),
    )
}

pub fn sample_avatar_json(name: &str) -> Value {
    let frames: HashMap<&str, Vec<String>> = ["north", "south", "east"]
        .into_iter()
        .map(|direction| (direction, (0..2).map(|i| format!("{name}/{direction}/{i}")).collect()))
        .collect();
    json!({ "name": name, "frames": frames })
}

pub fn sample_player(id: &str, x: f32, y: f32) -> Player {
    let mut player = Player::new(id, glam::Vec2::new(x, y), "knight");
    player.username = format!("user-{id}");
    player
}

pub fn player_json(x: f32, y: f32) -> Value {
    json!({ "x": x, "y": y, "facing": "south", "animationFrame": 0, "username": "someone", "avatar": "knight" })
}

pub fn join_response(my_id: &str, players: &[(&str, f32, f32)]) -> String {
    let players: serde_json::Map<String, Value> = players
        .iter()
        .map(|(id, x, y)| {
            let mut player = player_json(*x, *y);
            player["id"] = json!(id);
            player["username"] = json!(format!("user-{id}"));
            (id.to_string(), player)
        })
        .collect();

    json!({
        "action": "join_game",
        "success": true,
        "playerId": my_id,
        "players": players,
        "avatars": { "knight": sample_avatar_json("knight") },
    })
    .to_string()
}

pub fn image(source: &FrameId) -> ImageHandle {
    ImageHandle::new(source.clone(), image::RgbaImage::new(32, 64))
}

pub type TestClient = Client<RecordingTransport, RecordingLoader>;

/// A client that has connected and joined as `p1` at (100, 100), with the join message cleared.
pub fn joined_client() -> TestClient {
    joined_client_with(&[("p1", 100.0, 100.0)])
}

pub fn joined_client_with(players: &[(&str, f32, f32)]) -> TestClient {
    let mut client = Client::new(
        ClientSettings::default(),
        RecordingTransport::default(),
        RecordingLoader::default(),
    );
    client.dispatch(ClientEvent::Connected);
    client.dispatch(ClientEvent::Message(join_response("p1", players)));
    client.transport().clear();
    client
}

/// Completes every load the client has started so far, with 32x64 images.
pub fn complete_loads(client: &mut TestClient) {
    let started = std::mem::take(&mut client.loader_mut().started);
    for (key, frame) in started {
        client.dispatch(ClientEvent::AssetLoaded {
            key,
            result: Ok(image(&frame)),
        });
    }
}
