use std::io::BufRead;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, TryRecvError};
use smallvec::SmallVec;
use tracing::{debug, info, trace, warn};

use crate::asset::{self, DecodeWorker};
use crate::client::Client;
use crate::config::ClientConfig;
use crate::constants::LOOP_TIME;
use crate::error::ClientResult;
use crate::events::ClientEvent;
use crate::formatter;
use crate::net::websocket::WebSocketTransport;

/// A line typed on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    KeyDown(String),
    KeyUp(String),
    Quit,
}

/// Parses `+key`, `-key` or `quit`. Anything else is `None`.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("quit") {
        return Some(Command::Quit);
    }

    let (pressed, key) = match line.split_at_checked(1)? {
        ("+", key) => (true, key.trim()),
        ("-", key) => (false, key.trim()),
        _ => return None,
    };
    if key.is_empty() {
        return None;
    }

    Some(if pressed {
        Command::KeyDown(key.to_string())
    } else {
        Command::KeyUp(key.to_string())
    })
}

/// Owns the socket, the decode worker and the stdin reader, and feeds them to the client each tick.
pub struct App {
    client: Client<WebSocketTransport, DecodeWorker>,
    loaded: Receiver<ClientEvent>,
    commands: Receiver<Command>,
    last_tick: Instant,
}

impl App {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        info!(url = %config.server_url, username = %config.username, "Connecting");
        let transport = WebSocketTransport::connect(&config.server_url)?;

        let (loaded_tx, loaded) = crossbeam_channel::unbounded();
        let worker = DecodeWorker::spawn(loaded_tx)?;

        let mut client = Client::new(config.settings(), transport, worker);
        if let Some(path) = &config.world_image {
            match asset::load_file(path) {
                Ok(image) => client.set_world_image(image),
                Err(e) => warn!(path = %path.display(), error = %e, "World image unavailable"),
            }
        }

        let commands = spawn_stdin_reader()?;
        client.dispatch(ClientEvent::Connected);

        Ok(Self {
            client,
            loaded,
            commands,
            last_tick: Instant::now(),
        })
    }

    /// Runs ticks until `quit` or stdin closes.
    pub fn run(&mut self) {
        info!(loop_time = ?LOOP_TIME, "Starting client loop");
        while self.tick() {}
        info!("Client loop finished");
    }

    /// One tick: drain every source into the dispatcher, then render if anything changed.
    ///
    /// Returns `false` once the user asked to quit.
    pub fn tick(&mut self) -> bool {
        let start = Instant::now();
        let dt = self.last_tick.elapsed();
        self.last_tick = start;

        let mut events: Vec<ClientEvent> = Vec::new();
        self.client.transport_mut().poll(&mut events);
        events.extend(self.loaded.try_iter());

        let mut keys: SmallVec<[Command; 4]> = SmallVec::new();
        loop {
            match self.commands.try_recv() {
                Ok(command) => keys.push(command),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("stdin closed");
                    keys.push(Command::Quit);
                    break;
                }
            }
        }

        for event in events {
            self.client.dispatch(event);
        }
        for command in keys {
            match command {
                Command::KeyDown(key) => self.client.dispatch(ClientEvent::KeyDown(key)),
                Command::KeyUp(key) => self.client.dispatch(ClientEvent::KeyUp(key)),
                Command::Quit => return false,
            }
        }

        if self.client.take_dirty() {
            formatter::increment_tick();
            let frame = self.client.render();
            trace!(
                dt = ?dt,
                camera = ?frame.camera.offset,
                sprites = frame.sprites.len(),
                labels = frame.labels.len(),
                culled = frame.culled,
                unresolved = frame.unresolved,
                "Rendered frame"
            );
        }

        let elapsed = start.elapsed();
        if elapsed < LOOP_TIME {
            let time = LOOP_TIME.saturating_sub(elapsed);
            if time != Duration::ZERO {
                spin_sleep::sleep(time);
            }
        }
        true
    }
}

fn spawn_stdin_reader() -> std::io::Result<Receiver<Command>> {
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::Builder::new().name("stdin".to_string()).spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Some(command) => {
                    let quit = command == Command::Quit;
                    if tx.send(command).is_err() || quit {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => warn!(line = %line, "Unrecognized command; use +key, -key or quit"),
            }
        }
    })?;
    Ok(rx)
}
