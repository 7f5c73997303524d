//! This module contains all the constants used by the client.

use std::time::Duration;

use glam::{UVec2, Vec2};

pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// Distance a single move intent travels, in world units.
///
/// The server validates moves against the same step, so this must not drift from the server's value.
pub const STEP_SIZE: f32 = 16.0;

/// The default size of the world, in world units.
pub const WORLD_SIZE: UVec2 = UVec2::new(2048, 2048);

/// The default size of the viewport, in world units.
pub const VIEWPORT_SIZE: UVec2 = UVec2::new(800, 600);

/// How far outside the viewport an entity's anchor may be before it is culled.
pub const CULL_MARGIN: f32 = 50.0;

/// The box each avatar sprite is fitted into, preserving the frame's aspect ratio.
pub const SPRITE_NOMINAL_SIZE: f32 = 64.0;

/// Vertical gap between the top of a sprite and its username label.
pub const LABEL_OFFSET: Vec2 = Vec2::new(0.0, 6.0);
