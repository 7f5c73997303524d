use std::io::ErrorKind;
use std::net::TcpStream;

use tracing::{debug, trace};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Error as WsError, Message, WebSocket};

use crate::error::NetError;
use crate::events::ClientEvent;
use crate::net::Transport;

/// A non-blocking WebSocket channel, polled once per tick by the runtime.
pub struct WebSocketTransport {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
    closed: bool,
}

fn would_block(error: &WsError) -> bool {
    matches!(error, WsError::Io(e) if e.kind() == ErrorKind::WouldBlock)
}

impl WebSocketTransport {
    /// Connects (blocking, for the handshake only) and switches the socket to non-blocking mode.
    pub fn connect(url: &str) -> Result<Self, NetError> {
        let (mut socket, response) = tungstenite::connect(url).map_err(|e| NetError::Transport(e.to_string()))?;
        debug!(url, status = %response.status(), "WebSocket handshake complete");

        #[allow(unreachable_patterns)]
        match socket.get_mut() {
            MaybeTlsStream::Plain(stream) => stream
                .set_nonblocking(true)
                .map_err(|e| NetError::Transport(e.to_string()))?,
            _ => {
                return Err(NetError::Transport(
                    "only plain ws:// connections can be polled".to_string(),
                ))
            }
        }

        Ok(Self { socket, closed: false })
    }

    /// Drains every message that has arrived since the last poll into `events`.
    ///
    /// A close frame or a transport failure becomes a single `Disconnected` event; after that the
    /// transport stays closed and polls return nothing.
    pub fn poll(&mut self, events: &mut Vec<ClientEvent>) {
        if self.closed {
            return;
        }

        if let Err(e) = self.socket.flush() {
            if !would_block(&e) {
                self.close(events, e.to_string());
                return;
            }
        }

        loop {
            match self.socket.read() {
                Ok(Message::Text(text)) => {
                    trace!(bytes = text.len(), "Received message");
                    events.push(ClientEvent::Message(text));
                }
                Ok(Message::Close(frame)) => {
                    let reason = frame.map(|f| f.reason.to_string()).unwrap_or_else(|| "closed by server".to_string());
                    self.close(events, reason);
                    return;
                }
                Ok(_) => {}
                Err(e) if would_block(&e) => return,
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                    self.close(events, "connection closed".to_string());
                    return;
                }
                Err(e) => {
                    self.close(events, e.to_string());
                    return;
                }
            }
        }
    }

    fn close(&mut self, events: &mut Vec<ClientEvent>, reason: String) {
        self.closed = true;
        events.push(ClientEvent::Disconnected { reason });
    }
}

impl Transport for WebSocketTransport {
    fn send(&mut self, text: String) -> Result<(), NetError> {
        if self.closed {
            return Err(NetError::Closed);
        }

        match self.socket.send(Message::Text(text)) {
            Ok(()) => Ok(()),
            // Queued in the write buffer; flushed on the next poll.
            Err(e) if would_block(&e) => Ok(()),
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Err(NetError::Closed),
            Err(e) => Err(NetError::SendFailed(e.to_string())),
        }
    }
}
