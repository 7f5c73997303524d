//! The client context: every component, owned in one place, driven by one dispatcher.

use glam::Vec2;
use tracing::{debug, info, trace};

use crate::asset::{AssetCache, ImageHandle, ImageLoader};
use crate::camera::Camera;
use crate::constants::{STEP_SIZE, VIEWPORT_SIZE};
use crate::direction::Direction;
use crate::events::{ClientEvent, Intent};
use crate::input::{Bindings, InputController};
use crate::movement::MovementPredictor;
use crate::net::{ConnectionState, NetworkSync, Transport};
use crate::render::{Frame, Renderer};
use crate::store::{EntityStore, WorldBounds};

/// Construction parameters for a [`Client`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub username: String,
    pub world: WorldBounds,
    pub viewport: Vec2,
    pub step: f32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            username: "guest".to_string(),
            world: WorldBounds::default(),
            viewport: VIEWPORT_SIZE.as_vec2(),
            step: STEP_SIZE,
        }
    }
}

pub struct Client<T: Transport, L: ImageLoader> {
    store: EntityStore,
    input: InputController,
    bindings: Bindings,
    predictor: MovementPredictor,
    net: NetworkSync<T>,
    camera: Camera,
    viewport: Vec2,
    cache: AssetCache,
    loader: L,
    renderer: Renderer,
    world_image: Option<ImageHandle>,
    dirty: bool,
}

impl<T: Transport, L: ImageLoader> Client<T, L> {
    pub fn new(settings: ClientSettings, transport: T, loader: L) -> Self {
        Self {
            store: EntityStore::new(settings.world),
            input: InputController::default(),
            bindings: Bindings::default(),
            predictor: MovementPredictor::with_step(settings.step),
            net: NetworkSync::new(transport, settings.username),
            camera: Camera::default(),
            viewport: settings.viewport,
            cache: AssetCache::default(),
            loader,
            renderer: Renderer::default(),
            world_image: None,
            dirty: true,
        }
    }

    /// Handles one event to completion.
    pub fn dispatch(&mut self, event: ClientEvent) {
        let changed = match event {
            ClientEvent::Connected => {
                self.net.on_open();
                false
            }
            ClientEvent::Disconnected { reason } => {
                self.net.on_close(&reason);
                false
            }
            ClientEvent::Message(text) => self.net.handle_message(&mut self.store, &text),
            ClientEvent::KeyDown(key) => match self.bindings.direction_for(&key) {
                Some(direction) => {
                    let intent = self.input.key_down(direction);
                    self.handle_intent(intent)
                }
                None => {
                    trace!(key = %key, "Unbound key");
                    false
                }
            },
            ClientEvent::KeyUp(key) => match self.bindings.direction_for(&key) {
                Some(direction) => {
                    let intent = self.input.key_up(direction);
                    self.handle_intent(intent)
                }
                None => false,
            },
            ClientEvent::AssetLoaded { key, result } => self.cache.complete(key, result),
            ClientEvent::Resized { width, height } => {
                let viewport = Vec2::new(width, height).max(Vec2::ZERO);
                debug!(width = viewport.x, height = viewport.y, "Viewport resized");
                let changed = viewport != self.viewport;
                self.viewport = viewport;
                changed
            }
        };

        self.dirty |= changed;
    }

    /// Predicts locally, then reports upstream. Nothing happens before a join or after a disconnect.
    fn handle_intent(&mut self, intent: Option<Intent>) -> bool {
        let Some(intent) = intent else {
            return false;
        };

        if self.net.state() == ConnectionState::Closed {
            debug!(?intent, "Ignoring intent on closed connection");
            return false;
        }

        let predicted = match intent {
            Intent::Move(direction) => self.predictor.apply_move(&mut self.store, direction),
            Intent::Stop => self.predictor.apply_stop(&mut self.store),
        };
        let Some(predicted) = predicted else {
            trace!(?intent, "No controlled player yet");
            return false;
        };

        self.net.send_intent(intent, predicted);
        matches!(intent, Intent::Move(_))
    }

    /// Composes the current frame. The camera follows the controlled player first.
    pub fn render(&mut self) -> Frame {
        self.camera.update(&self.store, self.viewport);
        self.renderer.render(
            &self.store,
            self.camera,
            self.viewport,
            self.world_image.as_ref(),
            &mut self.cache,
            &mut self.loader,
        )
    }

    pub fn set_world_image(&mut self, image: ImageHandle) {
        info!(width = image.size.x, height = image.size.y, "World image loaded");
        self.world_image = Some(image);
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the dirty flag and clears it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn input(&self) -> &InputController {
        &self.input
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.net.state()
    }

    pub fn active_direction(&self) -> Option<Direction> {
        self.input.active_direction()
    }

    pub fn transport(&self) -> &T {
        self.net.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.net.transport_mut()
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }
}
