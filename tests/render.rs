mod common;

use std::collections::HashMap;

use glam::Vec2;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;
use townsquare::asset::{AssetCache, ImageHandle};
use townsquare::camera::Camera;
use townsquare::direction::Direction;
use townsquare::render::Renderer;
use townsquare::store::{EntityStore, FrameId, Player, WorldBounds};

use common::{image, sample_avatar, sample_player, RecordingLoader};

const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

fn store_with(players: Vec<Player>) -> EntityStore {
    let mut store = EntityStore::new(WorldBounds::new(2048.0, 2048.0));
    let players: HashMap<_, _> = players.into_iter().map(|p| (p.id.clone(), p)).collect();
    let avatars = HashMap::from([("knight".to_string(), sample_avatar("knight"))]);
    store.establish("me".to_string(), players, avatars);
    store
}

/// Renders twice, completing loads in between, so every resolvable sprite is drawn.
fn render_loaded(store: &EntityStore, camera: Camera, world: Option<&ImageHandle>) -> townsquare::render::Frame {
    let renderer = Renderer::default();
    let mut cache = AssetCache::default();
    let mut loader = RecordingLoader::default();

    renderer.render(store, camera, VIEWPORT, world, &mut cache, &mut loader);
    for (key, frame) in loader.started.drain(..) {
        cache.complete(key, Ok(image(&frame)));
    }
    renderer.render(store, camera, VIEWPORT, world, &mut cache, &mut loader)
}

#[test]
fn first_pass_requests_loads_and_draws_nothing() {
    let store = store_with(vec![sample_player("me", 100.0, 100.0)]);
    let mut cache = AssetCache::default();
    let mut loader = RecordingLoader::default();

    let frame = Renderer::default().render(&store, Camera::default(), VIEWPORT, None, &mut cache, &mut loader);

    assert_that(&frame.sprites).is_empty();
    assert_eq!(frame.unresolved, 1);
    assert_eq!(loader.started.len(), 1);
}

#[test]
fn sprite_anchored_at_bottom_center() {
    let store = store_with(vec![sample_player("me", 100.0, 100.0)]);
    let camera = Camera {
        offset: Vec2::new(20.0, 10.0),
    };

    let frame = render_loaded(&store, camera, None);

    let sprite = frame.sprite("me").unwrap();
    // 32x64 image at screen (80, 90).
    assert_eq!(sprite.size, Vec2::new(32.0, 64.0));
    assert_eq!(sprite.position, Vec2::new(64.0, 26.0));

    let label = &frame.labels[0];
    assert_eq!(label.text, "user-me");
    assert_eq!(label.position, Vec2::new(80.0, 20.0));
}

#[test]
fn culls_beyond_margin() {
    let store = store_with(vec![
        sample_player("me", 100.0, 100.0),
        sample_player("edge", 845.0, 100.0),
        sample_player("far", 900.0, 100.0),
        sample_player("below", 100.0, 700.0),
    ]);

    let frame = render_loaded(&store, Camera::default(), None);

    assert_that(&frame.sprite("me")).is_some();
    assert_that(&frame.sprite("edge")).is_some();
    assert_that(&frame.sprite("far")).is_none();
    assert_that(&frame.sprite("below")).is_none();
    assert_eq!(frame.culled, 2);
}

#[test]
fn west_facing_sprite_is_mirrored() {
    let mut me = sample_player("me", 100.0, 100.0);
    me.facing = Direction::Left;
    let store = store_with(vec![me]);

    let frame = render_loaded(&store, Camera::default(), None);

    let sprite = frame.sprite("me").unwrap();
    assert_that(&sprite.mirrored).is_true();
    assert_eq!(sprite.image.source, common::frame_id("knight", "east", 0));
}

#[test]
fn sprites_sorted_by_y_then_id() {
    let store = store_with(vec![
        sample_player("me", 100.0, 300.0),
        sample_player("b", 200.0, 200.0),
        sample_player("a", 300.0, 200.0),
    ]);

    let frame = render_loaded(&store, Camera::default(), None);

    let order: Vec<&str> = frame.sprites.iter().map(|s| s.player.as_str()).collect();
    assert_eq!(order, vec!["a", "b", "me"]);
}

#[test]
fn unknown_avatar_is_skipped() {
    let mut me = sample_player("me", 100.0, 100.0);
    me.avatar = "nobody".to_string();
    let store = store_with(vec![me]);

    let frame = render_loaded(&store, Camera::default(), None);

    assert_that(&frame.sprites).is_empty();
    assert_eq!(frame.unresolved, 1);
}

#[test]
fn world_image_drawn_at_negative_camera() {
    let store = store_with(vec![sample_player("me", 100.0, 100.0)]);
    let world = ImageHandle::new(FrameId::from("world.png"), image::RgbaImage::new(64, 64));
    let camera = Camera {
        offset: Vec2::new(300.0, 400.0),
    };

    let frame = render_loaded(&store, camera, Some(&world));

    let drawn = frame.world.unwrap();
    assert_eq!(drawn.position, Vec2::new(-300.0, -400.0));
    assert_eq!(drawn.image, world);
}
