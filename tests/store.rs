mod common;

use std::collections::HashMap;

use glam::Vec2;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;
use townsquare::direction::Direction;
use townsquare::store::{Avatar, EntityStore, FrameId, PlayerUpdate, WorldBounds};

use common::{sample_avatar, sample_player};

fn established() -> EntityStore {
    let mut store = EntityStore::new(WorldBounds::new(1000.0, 800.0));
    let players = HashMap::from([
        ("me".to_string(), sample_player("me", 100.0, 100.0)),
        ("other".to_string(), sample_player("other", 300.0, 300.0)),
    ]);
    let avatars = HashMap::from([("knight".to_string(), sample_avatar("knight"))]);
    assert!(store.establish("me".to_string(), players, avatars));
    store
}

#[test]
fn establish_requires_own_player() {
    let mut store = EntityStore::default();
    let players = HashMap::from([("other".to_string(), sample_player("other", 1.0, 1.0))]);

    assert_that(&store.establish("me".to_string(), players, HashMap::new())).is_false();
    assert_that(&store.my_player()).is_none();
    assert_eq!(store.player_count(), 0);
}

#[test]
fn establish_uses_map_keys_as_ids() {
    let mut store = EntityStore::default();
    let players = HashMap::from([("me".to_string(), sample_player("", 1.0, 1.0))]);

    assert!(store.establish("me".to_string(), players, HashMap::new()));
    assert_eq!(store.my_player().unwrap().id, "me");
}

#[test]
fn incoming_positions_are_clamped() {
    let mut store = established();
    store.insert_player(sample_player("far", 5000.0, -20.0));

    assert_eq!(store.player("far").unwrap().position(), Vec2::new(1000.0, 0.0));
}

#[test]
fn update_overwrites_only_present_fields() {
    let mut store = established();
    let update = PlayerUpdate {
        x: Some(250.0),
        facing: Some(Direction::Left),
        ..Default::default()
    };

    store.apply_update("other", update);

    let other = store.player("other").unwrap();
    assert_eq!(other.position(), Vec2::new(250.0, 300.0));
    assert_eq!(other.facing, Direction::Left);
    assert_eq!(other.username, "user-other");
}

#[test]
fn update_overwrites_prediction_for_own_player() {
    let mut store = established();
    store.my_player_mut().unwrap().moving = true;

    store.apply_update("me", PlayerUpdate::position(90.0, 95.0));

    let me = store.my_player().unwrap();
    assert_eq!(me.position(), Vec2::new(90.0, 95.0));
    assert_that(&me.moving).is_false();
}

#[test]
fn update_for_unknown_player_creates_it() {
    let mut store = established();
    store.apply_update("new", PlayerUpdate::position(2000.0, 10.0));

    assert_eq!(store.player("new").unwrap().position(), Vec2::new(1000.0, 10.0));
    assert_eq!(store.player_count(), 3);
}

#[test]
fn own_player_cannot_be_removed() {
    let mut store = established();

    assert_that(&store.remove_player("me")).is_none();
    assert_that(&store.my_player()).is_some();
    assert_that(&store.remove_player("other")).is_some();
    assert_eq!(store.player_count(), 1);
}

#[test]
fn avatars_are_kept_once_known() {
    let mut store = established();
    let replacement = Avatar::new("knight", Vec::<(Direction, Vec<FrameId>)>::new());

    assert_that(&store.insert_avatar("knight", replacement)).is_false();
    assert_that(&store.avatar("knight").unwrap().frames(Direction::Up)).is_some();

    store.remove_player("other");
    assert_eq!(store.avatar_count(), 1);
}

#[test]
fn avatars_are_named_by_their_map_key() {
    let mut store = EntityStore::default();
    let players = HashMap::from([("me".to_string(), sample_player("me", 1.0, 1.0))]);
    let avatars = HashMap::from([
        ("red".to_string(), Avatar::new("skin", [(Direction::Down, vec![FrameId::from("RED")])])),
        ("blue".to_string(), Avatar::new("skin", [(Direction::Down, vec![FrameId::from("BLUE")])])),
    ]);

    assert!(store.establish("me".to_string(), players, avatars));

    assert_eq!(store.avatar_count(), 2);
    let red = store.avatar("red").unwrap();
    let blue = store.avatar("blue").unwrap();
    assert_eq!(red.name, "red");
    assert_eq!(blue.name, "blue");
    assert_eq!(red.frame(Direction::Down, 0).unwrap().as_str(), "RED");
    assert_eq!(blue.frame(Direction::Down, 0).unwrap().as_str(), "BLUE");
    assert_that(&store.avatar("skin")).is_none();
}

#[test]
fn inserted_avatar_takes_the_given_name() {
    let mut store = established();

    assert_that(&store.insert_avatar("mage", sample_avatar("wizard"))).is_true();

    assert_eq!(store.avatar("mage").unwrap().name, "mage");
    assert_that(&store.avatar("wizard")).is_none();
}

#[test]
fn avatar_drops_west_frames() {
    let avatar: Avatar = serde_json::from_value(serde_json::json!({
        "name": "mage",
        "frames": { "north": ["n0"], "east": ["e0"], "west": ["w0"], "sideways": ["x"] }
    }))
    .unwrap();

    assert_that(&avatar.frames(Direction::Left)).is_none();
    assert_eq!(avatar.frame(Direction::Right, 0).unwrap().as_str(), "e0");
    assert_eq!(avatar.directions().count(), 2);
}

#[test]
fn player_facing_defaults_to_south() {
    let player: townsquare::store::Player =
        serde_json::from_value(serde_json::json!({ "id": "a", "x": 1.0, "y": 2.0, "facing": null })).unwrap();

    assert_eq!(player.facing, Direction::Down);
    assert_eq!(player.animation_frame, 0);
}

#[test]
fn player_reads_direction_when_facing_is_absent() {
    let player: townsquare::store::Player =
        serde_json::from_value(serde_json::json!({ "id": "a", "x": 1.0, "y": 2.0, "direction": "west" })).unwrap();

    assert_eq!(player.facing, Direction::Left);
}

#[test]
fn player_prefers_facing_over_direction() {
    let player: townsquare::store::Player = serde_json::from_value(serde_json::json!({
        "id": "a", "x": 1.0, "y": 2.0, "facing": "north", "direction": "east"
    }))
    .unwrap();

    assert_eq!(player.facing, Direction::Up);
}
