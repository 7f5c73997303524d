//! Client-side prediction for the controlled player.

use glam::Vec2;
use tracing::trace;

use crate::constants::STEP_SIZE;
use crate::direction::Direction;
use crate::store::EntityStore;

/// Applies movement intents to the controlled player before the server hears about them.
#[derive(Debug, Clone, Copy)]
pub struct MovementPredictor {
    step: f32,
}

impl Default for MovementPredictor {
    fn default() -> Self {
        Self { step: STEP_SIZE }
    }
}

impl MovementPredictor {
    pub fn with_step(step: f32) -> Self {
        Self { step }
    }

    /// Steps the controlled player one step towards `direction`, clamped to the world, and
    /// turns it to face that way. Returns the predicted position, or `None` before a join.
    pub fn apply_move(&self, store: &mut EntityStore, direction: Direction) -> Option<Vec2> {
        let bounds = store.bounds();
        let player = store.my_player_mut()?;

        let candidate = player.position() + direction.as_vec2() * self.step;
        let position = bounds.clamp(candidate);

        player.set_position(position);
        player.facing = direction;
        player.moving = true;

        trace!(id = %player.id, ?direction, x = position.x, y = position.y, "Predicted move");
        Some(position)
    }

    /// Marks the controlled player as no longer moving. Position is untouched.
    pub fn apply_stop(&self, store: &mut EntityStore) -> Option<Vec2> {
        let player = store.my_player_mut()?;
        player.moving = false;
        Some(player.position())
    }
}
