use std::collections::HashMap;

use bitflags::bitflags;

use crate::direction::Direction;
use crate::events::Intent;

bitflags! {
    /// The directional keys currently held down.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct HeldKeys: u8 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

impl From<Direction> for HeldKeys {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => HeldKeys::UP,
            Direction::Down => HeldKeys::DOWN,
            Direction::Left => HeldKeys::LEFT,
            Direction::Right => HeldKeys::RIGHT,
        }
    }
}

/// Fixed mapping from key names to directions. Lookups ignore case.
#[derive(Debug, Clone)]
pub struct Bindings {
    key_bindings: HashMap<&'static str, Direction>,
}

impl Default for Bindings {
    fn default() -> Self {
        let key_bindings = HashMap::from([
            ("arrowup", Direction::Up),
            ("w", Direction::Up),
            ("arrowdown", Direction::Down),
            ("s", Direction::Down),
            ("arrowleft", Direction::Left),
            ("a", Direction::Left),
            ("arrowright", Direction::Right),
            ("d", Direction::Right),
        ]);

        Self { key_bindings }
    }
}

impl Bindings {
    pub fn direction_for(&self, key: &str) -> Option<Direction> {
        self.key_bindings.get(key.to_ascii_lowercase().as_str()).copied()
    }
}

/// Tracks held directional keys and turns presses and releases into intents.
///
/// While several keys are held, the active direction is the first held one in
/// [`Direction::DIRECTIONS`] order, not the most recently pressed.
#[derive(Debug, Default, Clone)]
pub struct InputController {
    held: HeldKeys,
}

impl InputController {
    /// Returns a move intent for a newly pressed direction, or nothing if it was already held.
    pub fn key_down(&mut self, direction: Direction) -> Option<Intent> {
        let flag = HeldKeys::from(direction);
        if self.held.contains(flag) {
            return None;
        }
        self.held.insert(flag);
        Some(Intent::Move(direction))
    }

    /// Returns a stop intent when the last key is released, otherwise a move intent for the
    /// highest priority direction still held. Releasing a key that was not held is ignored.
    pub fn key_up(&mut self, direction: Direction) -> Option<Intent> {
        let flag = HeldKeys::from(direction);
        if !self.held.contains(flag) {
            return None;
        }
        self.held.remove(flag);

        match self.active_direction() {
            Some(remaining) => Some(Intent::Move(remaining)),
            None => Some(Intent::Stop),
        }
    }

    pub fn held(&self) -> HeldKeys {
        self.held
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        self.held.contains(direction.into())
    }

    pub fn active_direction(&self) -> Option<Direction> {
        Direction::DIRECTIONS
            .into_iter()
            .find(|direction| self.held.contains((*direction).into()))
    }
}
