use crate::asset::{FrameKey, ImageHandle};
use crate::direction::Direction;
use crate::error::AssetError;

/// What the local player wants to do, derived from held keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Move(Direction),
    Stop,
}

/// Everything the client reacts to. Each event is handled to completion before the next.
#[derive(Debug)]
pub enum ClientEvent {
    /// The message channel opened.
    Connected,
    /// The message channel closed or failed. Nothing reconnects it.
    Disconnected { reason: String },
    /// One inbound wire message, still encoded.
    Message(String),
    /// A key was pressed, by key name (`ArrowUp`, `w`, ...).
    KeyDown(String),
    /// A key was released, by key name.
    KeyUp(String),
    /// A frame load requested by the asset cache finished.
    AssetLoaded {
        key: FrameKey,
        result: Result<ImageHandle, AssetError>,
    },
    /// The viewport changed size.
    Resized { width: f32, height: f32 },
}

