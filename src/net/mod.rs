//! Everything between the entity store and the wire.

pub mod protocol;
pub mod sync;
pub mod websocket;

pub use protocol::{ClientMessage, ServerMessage};
pub use sync::{ConnectionState, NetworkSync};

use crate::error::NetError;

/// The outbound half of the message channel.
///
/// Inbound messages are not pulled through this trait; whoever owns the socket turns them into
/// [`crate::events::ClientEvent::Message`] events so they go through the same dispatcher as input.
pub trait Transport {
    fn send(&mut self, text: String) -> Result<(), NetError>;
}
