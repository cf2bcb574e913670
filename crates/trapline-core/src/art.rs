//! Process-scoped art tables.
//!
//! The core never draws. It needs two things from art: how many frames each
//! animation has, and the collision mask of each frame. An [`ArtContext`] is
//! built once at startup (by an asset loader, or [`ArtContext::builtin`]) and
//! passed by reference into everything that picks frames or masks.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::geometry::{Anchor, Mask};
use crate::time::Millis;

/// Well-known sheet names.
pub mod sheets {
    pub const PLAYER_IDLE: &str = "player/idle";
    pub const PLAYER_RUN: &str = "player/run";
    pub const PLAYER_JUMP: &str = "player/jump";
    pub const PLAYER_DOUBLE_JUMP: &str = "player/double_jump";
    pub const PLAYER_FALL: &str = "player/fall";
    pub const PLAYER_HIT: &str = "player/hit";
    pub const TERRAIN: &str = "terrain/block";
    pub const FIRE_ON: &str = "traps/fire_on";
    pub const FIRE_OFF: &str = "traps/fire_off";
    pub const SPIKE: &str = "traps/spike";
    pub const CHECKPOINT_NO_FLAG: &str = "items/checkpoint_no_flag";
    pub const CHECKPOINT_FLAG_OUT: &str = "items/checkpoint_flag_out";
    pub const CHECKPOINT_IDLE: &str = "items/checkpoint_idle";
    pub const END_IDLE: &str = "items/end_idle";
    pub const END_PRESSED: &str = "items/end_pressed";
    pub const BOX_IDLE: &str = "items/box_idle";
    pub const BOX_BREAK: &str = "items/box_break";
}

/// Ordered animation frames of one sheet, as collision masks.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheet {
    frames: Vec<Arc<Mask>>,
}

impl SpriteSheet {
    pub fn new(frames: Vec<Mask>) -> Self {
        Self {
            frames: frames.into_iter().map(Arc::new).collect(),
        }
    }

    /// `count` frames of the same size whose masks come from `f`.
    pub fn uniform(count: usize, width: u32, height: u32, f: impl Fn(u32, u32) -> bool) -> Self {
        let mask = Arc::new(Mask::from_fn(width, height, f));
        Self {
            frames: (0..count).map(|_| Arc::clone(&mask)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame at `index`, wrapping around the sheet length.
    pub fn frame(&self, index: usize) -> Option<&Arc<Mask>> {
        if self.frames.is_empty() {
            return None;
        }
        self.frames.get(index % self.frames.len())
    }
}

/// Loaded art tables, keyed by sheet name.
#[derive(Debug, Clone, Default)]
pub struct ArtContext {
    sheets: HashMap<String, SpriteSheet>,
}

impl ArtContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder art with the frame counts and proportions of the stock
    /// character/trap pack. Used when no asset loader is wired in.
    pub fn builtin() -> Self {
        let mut art = Self::new();

        // Character frames are 32px sprites scaled 2x, with transparent margins.
        let body = |x: u32, y: u32| (14..50).contains(&x) && y >= 8;
        art.insert(sheets::PLAYER_IDLE, SpriteSheet::uniform(11, 64, 64, body));
        art.insert(sheets::PLAYER_RUN, SpriteSheet::uniform(12, 64, 64, body));
        art.insert(sheets::PLAYER_JUMP, SpriteSheet::uniform(1, 64, 64, body));
        art.insert(
            sheets::PLAYER_DOUBLE_JUMP,
            SpriteSheet::uniform(6, 64, 64, body),
        );
        art.insert(sheets::PLAYER_FALL, SpriteSheet::uniform(1, 64, 64, body));
        art.insert(sheets::PLAYER_HIT, SpriteSheet::uniform(7, 64, 64, body));

        art.insert(sheets::TERRAIN, SpriteSheet::uniform(1, 96, 96, |_, _| true));

        art.insert(sheets::FIRE_ON, SpriteSheet::uniform(3, 16, 32, |_, y| y >= 8));
        art.insert(sheets::FIRE_OFF, SpriteSheet::uniform(1, 16, 32, |_, y| y >= 24));

        art.insert(sheets::SPIKE, SpriteSheet::uniform(1, 16, 16, |_, y| y >= 8));

        let pole = |x: u32, _y: u32| (16..32).contains(&x);
        let flag = move |x: u32, y: u32| pole(x, y) || ((32..80).contains(&x) && (8..40).contains(&y));
        art.insert(
            sheets::CHECKPOINT_NO_FLAG,
            SpriteSheet::uniform(1, 128, 128, pole),
        );
        art.insert(
            sheets::CHECKPOINT_FLAG_OUT,
            SpriteSheet::uniform(26, 128, 128, flag),
        );
        art.insert(
            sheets::CHECKPOINT_IDLE,
            SpriteSheet::uniform(10, 128, 128, flag),
        );

        art.insert(sheets::END_IDLE, SpriteSheet::uniform(1, 128, 128, |_, y| y >= 64));
        art.insert(sheets::END_PRESSED, SpriteSheet::uniform(8, 128, 128, |_, y| y >= 80));

        art.insert(sheets::BOX_IDLE, SpriteSheet::uniform(1, 56, 48, |_, _| true));
        art.insert(sheets::BOX_BREAK, SpriteSheet::uniform(4, 56, 48, |_, y| y >= 24));

        art
    }

    pub fn insert(&mut self, name: impl Into<String>, sheet: SpriteSheet) {
        self.sheets.insert(name.into(), sheet);
    }

    pub fn remove(&mut self, name: &str) -> Option<SpriteSheet> {
        self.sheets.remove(name)
    }

    pub fn sheet(&self, name: &str) -> Option<&SpriteSheet> {
        self.sheets.get(name)
    }

    /// Number of frames in `name`, or 0 when the sheet is missing.
    pub fn frame_count(&self, name: &str) -> usize {
        self.sheet(name).map_or(0, SpriteSheet::len)
    }

    pub fn frame_mask(&self, name: &str, index: usize) -> Option<Arc<Mask>> {
        self.sheet(name)?.frame(index).map(Arc::clone)
    }

    /// Frame mask resampled to `width`×`height`.
    pub fn frame_mask_sized(
        &self,
        name: &str,
        index: usize,
        width: u32,
        height: u32,
    ) -> Option<Arc<Mask>> {
        let mask = self.frame_mask(name, index)?;
        if mask.width() == width && mask.height() == height {
            Some(mask)
        } else {
            Some(Arc::new(mask.scaled(width, height)))
        }
    }
}

/// Index of the frame to show `elapsed_ms` into a looping animation.
pub fn looping_frame(elapsed_ms: Millis, frame_period_ms: f32, frame_count: usize) -> usize {
    if frame_count == 0 || frame_period_ms <= 0.0 {
        return 0;
    }
    (elapsed_ms as f32 / frame_period_ms) as usize % frame_count
}

/// Handle to one frame of a sheet, as the renderer should draw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpriteRef {
    pub sheet: &'static str,
    pub frame: usize,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl SpriteRef {
    pub const fn new(sheet: &'static str, frame: usize) -> Self {
        Self {
            sheet,
            frame,
            flip_x: false,
            flip_y: false,
        }
    }
}

/// What the renderer should show for an entity this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visual {
    Hidden,
    Sprite(SpriteRef),
    /// Only `visible_height` rows next to `anchor` are drawn.
    Revealed {
        sprite: SpriteRef,
        visible_height: u32,
        anchor: Anchor,
    },
}

impl Visual {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Visual::Hidden)
    }
}
