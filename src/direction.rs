use glam::Vec2;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The four cardinal directions.
///
/// The wire accepts both compass names (`north`, `south`, `east`, `west`) and key names
/// (`up`, `down`, `left`, `right`); the key names are what gets written back out.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AsRefStr, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[strum(to_string = "up", serialize = "north")]
    #[serde(alias = "north", alias = "Up", alias = "North")]
    Up,
    #[default]
    #[strum(to_string = "down", serialize = "south")]
    #[serde(alias = "south", alias = "Down", alias = "South")]
    Down,
    #[strum(to_string = "left", serialize = "west")]
    #[serde(alias = "west", alias = "Left", alias = "West")]
    Left,
    #[strum(to_string = "right", serialize = "east")]
    #[serde(alias = "east", alias = "Right", alias = "East")]
    Right,
}

impl Direction {
    /// The four cardinal directions, in input priority order.
    /// When several directional keys are held, the earliest entry here wins.
    pub const DIRECTIONS: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Returns the direction as a unit vector in screen space (y grows downwards).
    pub fn as_vec2(self) -> Vec2 {
        self.into()
    }

    /// The compass name avatar frame tables are keyed by.
    pub const fn compass_name(self) -> &'static str {
        match self {
            Direction::Up => "north",
            Direction::Down => "south",
            Direction::Left => "west",
            Direction::Right => "east",
        }
    }

    /// Maps a facing onto the direction that actually ships frames.
    ///
    /// Avatars only carry east-facing frames for the horizontal pair, so west is drawn
    /// as a mirrored east. Returns the lookup direction and whether to mirror it.
    pub const fn canonical(self) -> (Direction, bool) {
        match self {
            Direction::Left => (Direction::Right, true),
            other => (other, false),
        }
    }
}

impl From<Direction> for Vec2 {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Up => -Vec2::Y,
            Direction::Down => Vec2::Y,
            Direction::Left => -Vec2::X,
            Direction::Right => Vec2::X,
        }
    }
}
