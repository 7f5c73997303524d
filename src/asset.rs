//! Frame image loading and caching.
//!
//! Loads are asynchronous: the cache records a key as pending, hands the frame to an
//! [`ImageLoader`], and the result comes back later as a [`ClientEvent::AssetLoaded`]. Until
//! then, anything asking for that key gets `Pending` and no second load is started.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use base64::prelude::{Engine, BASE64_STANDARD};
use crossbeam_channel::{Receiver, Sender};
use glam::{UVec2, Vec2};
use image::RgbaImage;
use tracing::{debug, trace, warn};

use crate::direction::Direction;
use crate::error::AssetError;
use crate::events::ClientEvent;
use crate::store::FrameId;

/// Identifies one on-screen frame state: avatar, facing as the player holds it, and frame index.
///
/// The facing is the original one, before west is swapped for mirrored east, so an east frame
/// and the same frame drawn mirrored for west are separate entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameKey {
    pub avatar: String,
    pub facing: Direction,
    pub frame: usize,
}

impl FrameKey {
    pub fn new(avatar: impl Into<String>, facing: Direction, frame: usize) -> Self {
        Self {
            avatar: avatar.into(),
            facing,
            frame,
        }
    }
}

/// A decoded image: RGBA pixels, their natural size, and where they came from.
///
/// Clones share the pixel buffer.
#[derive(Clone, PartialEq)]
pub struct ImageHandle {
    pub source: FrameId,
    pub size: UVec2,
    pixels: Arc<RgbaImage>,
}

impl ImageHandle {
    pub fn new(source: FrameId, pixels: RgbaImage) -> Self {
        Self {
            source,
            size: UVec2::new(pixels.width(), pixels.height()),
            pixels: Arc::new(pixels),
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Width over height. Degenerate images count as square.
    pub fn aspect_ratio(&self) -> f32 {
        if self.size.x == 0 || self.size.y == 0 {
            return 1.0;
        }
        self.size.x as f32 / self.size.y as f32
    }

    /// The largest size with this image's aspect ratio that fits in a `nominal` square.
    pub fn fit_within(&self, nominal: f32) -> Vec2 {
        let aspect = self.aspect_ratio();
        if aspect >= 1.0 {
            Vec2::new(nominal, nominal / aspect)
        } else {
            Vec2::new(nominal * aspect, nominal)
        }
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self.source.as_str();
        let preview = source.get(..32).unwrap_or(source);
        f.debug_struct("ImageHandle")
            .field("source", &preview)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Starts loading frames. Completion must come back as a [`ClientEvent::AssetLoaded`].
pub trait ImageLoader {
    fn begin(&mut self, key: FrameKey, frame: FrameId);
}

#[derive(Debug, Clone, PartialEq)]
enum CacheEntry {
    Pending,
    Ready(ImageHandle),
    Failed,
}

/// The state of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Ready(&'a ImageHandle),
    /// A load is in flight (possibly started by this very lookup).
    Pending,
    /// The load failed earlier; it is not retried.
    Failed,
}

#[derive(Debug, Default)]
pub struct AssetCache {
    entries: HashMap<FrameKey, CacheEntry>,
}

impl AssetCache {
    /// Looks up `key`, starting a load of `frame` through `loader` if the key has never been seen.
    pub fn request<L: ImageLoader + ?Sized>(&mut self, key: &FrameKey, frame: &FrameId, loader: &mut L) -> Lookup<'_> {
        match self.entries.entry(key.clone()) {
            Entry::Occupied(entry) => match entry.into_mut() {
                CacheEntry::Ready(handle) => Lookup::Ready(handle),
                CacheEntry::Pending => Lookup::Pending,
                CacheEntry::Failed => Lookup::Failed,
            },
            Entry::Vacant(entry) => {
                trace!(?key, "Starting frame load");
                entry.insert(CacheEntry::Pending);
                loader.begin(key.clone(), frame.clone());
                Lookup::Pending
            }
        }
    }

    /// Records the outcome of a load. Returns whether a frame became drawable.
    pub fn complete(&mut self, key: FrameKey, result: Result<ImageHandle, AssetError>) -> bool {
        if !matches!(self.entries.get(&key), Some(CacheEntry::Pending)) {
            debug!(?key, "Load completed for a key that was not pending");
        }

        match result {
            Ok(handle) => {
                self.entries.insert(key, CacheEntry::Ready(handle));
                true
            }
            Err(e) => {
                warn!(?key, error = %e, "Frame failed to load; it will not be drawn");
                self.entries.insert(key, CacheEntry::Failed);
                false
            }
        }
    }

    pub fn get(&self, key: &FrameKey) -> Option<&ImageHandle> {
        match self.entries.get(key) {
            Some(CacheEntry::Ready(handle)) => Some(handle),
            _ => None,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.entries.values().filter(|entry| **entry == CacheEntry::Pending).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Extracts the raw bytes behind a frame identifier.
///
/// Accepts `data:<mime>;base64,<payload>` URLs and bare base64 payloads.
pub fn frame_bytes(frame: &FrameId) -> Result<Vec<u8>, AssetError> {
    let payload = match frame.as_str().strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| AssetError::InvalidDataUrl("missing ',' separator".to_string()))?;
            if !meta.ends_with(";base64") {
                return Err(AssetError::InvalidDataUrl(format!("unsupported encoding '{meta}'")));
            }
            data
        }
        None => frame.as_str(),
    };

    Ok(BASE64_STANDARD.decode(payload.trim())?)
}

/// Decodes a frame identifier into an image handle.
pub fn decode_frame(frame: &FrameId) -> Result<ImageHandle, AssetError> {
    let bytes = frame_bytes(frame)?;
    decode_bytes(frame.clone(), &bytes)
}

/// Loads an image (such as the world raster) from disk.
pub fn load_file(path: &Path) -> Result<ImageHandle, AssetError> {
    if !path.is_file() {
        return Err(AssetError::NotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    decode_bytes(FrameId(path.display().to_string()), &bytes)
}

fn decode_bytes(source: FrameId, bytes: &[u8]) -> Result<ImageHandle, AssetError> {
    let image = image::load_from_memory(bytes)?;
    Ok(ImageHandle::new(source, image.into_rgba8()))
}

/// Decodes frames on a background thread and posts the results back as events.
pub struct DecodeWorker {
    requests: Sender<(FrameKey, FrameId)>,
}

impl DecodeWorker {
    pub fn spawn(events: Sender<ClientEvent>) -> std::io::Result<Self> {
        let (requests, inbox): (Sender<(FrameKey, FrameId)>, Receiver<(FrameKey, FrameId)>) =
            crossbeam_channel::unbounded();

        thread::Builder::new().name("frame-decoder".to_string()).spawn(move || {
            for (key, frame) in inbox {
                let result = decode_frame(&frame);
                if events.send(ClientEvent::AssetLoaded { key, result }).is_err() {
                    break;
                }
            }
            debug!("Frame decoder shutting down");
        })?;

        Ok(Self { requests })
    }
}

impl ImageLoader for DecodeWorker {
    fn begin(&mut self, key: FrameKey, frame: FrameId) {
        if let Err(e) = self.requests.send((key, frame)) {
            let (key, _) = e.into_inner();
            warn!(?key, "Frame decoder is gone; load dropped");
        }
    }
}
