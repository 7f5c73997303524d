//! Picks which image to draw for a player.

use glam::Vec2;
use tracing::trace;

use crate::asset::{AssetCache, FrameKey, ImageHandle, ImageLoader, Lookup};
use crate::constants::SPRITE_NOMINAL_SIZE;
use crate::direction::Direction;
use crate::store::{Avatar, FrameId, Player};

/// The frame a player resolves to before any image is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFrame<'a> {
    pub key: FrameKey,
    /// The direction the frame table was read with (east for a west-facing player).
    pub lookup: Direction,
    pub frame: &'a FrameId,
    pub mirrored: bool,
}

/// A drawable image for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub image: ImageHandle,
    pub size: Vec2,
    /// Draw flipped horizontally.
    pub mirrored: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct AvatarResolver {
    nominal: f32,
}

impl Default for AvatarResolver {
    fn default() -> Self {
        Self {
            nominal: SPRITE_NOMINAL_SIZE,
        }
    }
}

impl AvatarResolver {
    /// Finds the frame for the player's facing and animation frame.
    ///
    /// West is read from the east table and flagged as mirrored. The cache key keeps the
    /// player's own facing. Returns `None` when the avatar has no such direction or frame.
    pub fn resolve_frame<'a>(&self, player: &Player, avatar: &'a Avatar) -> Option<ResolvedFrame<'a>> {
        let (lookup, mirrored) = player.facing.canonical();
        let frame = avatar.frame(lookup, player.animation_frame)?;

        Some(ResolvedFrame {
            key: FrameKey::new(avatar.name.clone(), player.facing, player.animation_frame),
            lookup,
            frame,
            mirrored,
        })
    }

    /// Resolves the player to a drawable sprite, starting a load if the frame is not cached.
    ///
    /// `None` means the player is skipped this pass: no frame, still loading, or failed.
    pub fn resolve<L: ImageLoader + ?Sized>(
        &self,
        player: &Player,
        avatar: &Avatar,
        cache: &mut AssetCache,
        loader: &mut L,
    ) -> Option<Sprite> {
        let Some(resolved) = self.resolve_frame(player, avatar) else {
            trace!(id = %player.id, avatar = %avatar.name, facing = %player.facing, frame = player.animation_frame, "No frame for player");
            return None;
        };

        match cache.request(&resolved.key, resolved.frame, loader) {
            Lookup::Ready(image) => Some(Sprite {
                size: image.fit_within(self.nominal),
                image: image.clone(),
                mirrored: resolved.mirrored,
            }),
            Lookup::Pending | Lookup::Failed => None,
        }
    }
}
