use glam::Vec2;

use crate::store::{EntityStore, WorldBounds};

/// The world-space offset of the viewport's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera {
    pub offset: Vec2,
}

impl Camera {
    /// Centers `viewport` on `target`, then clamps so the viewport stays inside the world.
    ///
    /// A viewport larger than the world on some axis pins that axis to 0.
    pub fn centered_on(target: Vec2, viewport: Vec2, bounds: WorldBounds) -> Self {
        let max = (bounds.size - viewport).max(Vec2::ZERO);
        Self {
            offset: (target - viewport / 2.0).clamp(Vec2::ZERO, max),
        }
    }

    /// Follows the controlled player. Without one the camera keeps its previous offset.
    ///
    /// Returns whether the offset changed.
    pub fn update(&mut self, store: &EntityStore, viewport: Vec2) -> bool {
        let Some(player) = store.my_player() else {
            return false;
        };

        let next = Self::centered_on(player.position(), viewport, store.bounds());
        let changed = next != *self;
        *self = next;
        changed
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world - self.offset
    }
}
