mod common;

use glam::Vec2;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;
use townsquare::asset::{AssetCache, FrameKey};
use townsquare::avatar::AvatarResolver;
use townsquare::direction::Direction;

use common::{frame_id, image, sample_avatar, sample_player, RecordingLoader};

#[test]
fn west_and_left_resolve_to_mirrored_east() {
    let avatar = sample_avatar("knight");
    let resolver = AvatarResolver::default();

    for facing in ["left", "west"] {
        let mut player = sample_player("p", 0.0, 0.0);
        player.facing = serde_json::from_value(serde_json::json!(facing)).unwrap();

        let resolved = resolver.resolve_frame(&player, &avatar).unwrap();
        assert_eq!(resolved.lookup, Direction::Right);
        assert_that(&resolved.mirrored).is_true();
        assert_eq!(resolved.frame, &frame_id("knight", "east", 0));
    }
}

#[test]
fn east_and_west_share_frame_but_not_cache_key() {
    let avatar = sample_avatar("knight");
    let resolver = AvatarResolver::default();
    let mut east = sample_player("a", 0.0, 0.0);
    east.facing = Direction::Right;
    let mut west = sample_player("b", 0.0, 0.0);
    west.facing = Direction::Left;

    let east = resolver.resolve_frame(&east, &avatar).unwrap();
    let west = resolver.resolve_frame(&west, &avatar).unwrap();

    assert_eq!(east.frame, west.frame);
    assert_that(&east.mirrored).is_false();
    assert_eq!(east.key, FrameKey::new("knight", Direction::Right, 0));
    assert_eq!(west.key, FrameKey::new("knight", Direction::Left, 0));
}

#[test]
fn missing_frame_fails_quietly() {
    let avatar = sample_avatar("knight");
    let mut player = sample_player("p", 0.0, 0.0);
    player.animation_frame = 7;

    assert_that(&AvatarResolver::default().resolve_frame(&player, &avatar)).is_none();
}

#[test]
fn resolve_loads_once_then_fits_to_nominal_size() {
    let avatar = sample_avatar("knight");
    let player = sample_player("p", 0.0, 0.0);
    let resolver = AvatarResolver::default();
    let mut cache = AssetCache::default();
    let mut loader = RecordingLoader::default();

    assert_that(&resolver.resolve(&player, &avatar, &mut cache, &mut loader)).is_none();
    assert_that(&resolver.resolve(&player, &avatar, &mut cache, &mut loader)).is_none();
    assert_eq!(loader.started.len(), 1);

    let (key, frame) = loader.started.remove(0);
    cache.complete(key, Ok(image(&frame)));

    let sprite = resolver.resolve(&player, &avatar, &mut cache, &mut loader).unwrap();
    assert_eq!(sprite.size, Vec2::new(32.0, 64.0));
    assert_that(&sprite.mirrored).is_false();
    assert_that(&loader.started).is_empty();
}
