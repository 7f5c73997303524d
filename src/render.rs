//! Turns the store into a list of draw commands for one frame.
//!
//! Nothing here touches a graphics API. A [`Frame`] is a plain description of what would be
//! drawn: the world raster, then sprites back to front, then labels on top.

use glam::Vec2;
use tracing::trace;

use crate::asset::{AssetCache, ImageHandle, ImageLoader};
use crate::avatar::AvatarResolver;
use crate::camera::Camera;
use crate::constants::{CULL_MARGIN, LABEL_OFFSET};
use crate::store::{EntityStore, PlayerId};

/// The world raster placed relative to the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldDraw {
    pub image: ImageHandle,
    pub position: Vec2,
}

/// One avatar frame. `position` is the screen-space top-left corner of the sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDraw {
    pub player: PlayerId,
    pub image: ImageHandle,
    pub position: Vec2,
    pub size: Vec2,
    pub mirrored: bool,
}

/// A username drawn centered above a sprite. `position` is the bottom-center of the text.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDraw {
    pub player: PlayerId,
    pub text: String,
    pub position: Vec2,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub camera: Camera,
    pub viewport: Vec2,
    pub world: Option<WorldDraw>,
    pub sprites: Vec<SpriteDraw>,
    pub labels: Vec<LabelDraw>,
    /// Players skipped for being off screen.
    pub culled: usize,
    /// Players skipped because their frame is missing, loading or failed.
    pub unresolved: usize,
}

impl Frame {
    pub fn sprite(&self, player: &str) -> Option<&SpriteDraw> {
        self.sprites.iter().find(|sprite| sprite.player == player)
    }
}

/// Whether a screen-space anchor lies within `margin` of the viewport on both axes.
pub fn is_visible(screen: Vec2, viewport: Vec2, margin: f32) -> bool {
    let min = Vec2::splat(-margin);
    let max = viewport + Vec2::splat(margin);
    screen.cmpge(min).all() && screen.cmple(max).all()
}

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    resolver: AvatarResolver,
    margin: f32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            resolver: AvatarResolver::default(),
            margin: CULL_MARGIN,
        }
    }
}

impl Renderer {
    /// Composes a frame as seen through `camera`.
    ///
    /// Players whose frames are not cached yet start loading and are left out of this frame.
    pub fn render<L: ImageLoader + ?Sized>(
        &self,
        store: &EntityStore,
        camera: Camera,
        viewport: Vec2,
        world_image: Option<&ImageHandle>,
        cache: &mut AssetCache,
        loader: &mut L,
    ) -> Frame {
        let mut frame = Frame {
            camera,
            viewport,
            world: world_image.map(|image| WorldDraw {
                image: image.clone(),
                position: -camera.offset,
            }),
            ..Default::default()
        };

        let mut visible: Vec<_> = Vec::with_capacity(store.player_count());
        for player in store.players() {
            let screen = camera.world_to_screen(player.position());
            if !is_visible(screen, viewport, self.margin) {
                frame.culled += 1;
                continue;
            }
            visible.push((player, screen));
        }

        // Painter's order: further up the world is drawn first.
        visible.sort_by(|(a, _), (b, _)| a.y.total_cmp(&b.y).then_with(|| a.id.cmp(&b.id)));

        for (player, screen) in visible {
            let sprite = store
                .avatar(&player.avatar)
                .and_then(|avatar| self.resolver.resolve(player, avatar, cache, loader));
            let Some(sprite) = sprite else {
                frame.unresolved += 1;
                continue;
            };

            // Anchor at bottom-center.
            let top_left = screen - Vec2::new(sprite.size.x / 2.0, sprite.size.y);

            if !player.username.is_empty() {
                frame.labels.push(LabelDraw {
                    player: player.id.clone(),
                    text: player.username.clone(),
                    position: Vec2::new(screen.x, top_left.y) - LABEL_OFFSET,
                });
            }
            frame.sprites.push(SpriteDraw {
                player: player.id.clone(),
                image: sprite.image,
                position: top_left,
                size: sprite.size,
                mirrored: sprite.mirrored,
            });
        }

        trace!(
            sprites = frame.sprites.len(),
            culled = frame.culled,
            unresolved = frame.unresolved,
            "Composed frame"
        );
        frame
    }
}
