use std::sync::Arc;

use serde::{Deserialize, Serialize};

use trapline_core::art::{ArtContext, SpriteRef, Visual, sheets};
use trapline_core::events::DeathCause;
use trapline_core::geometry::{Mask, Rect};

use crate::config::PhysicsConfig;

/// Fallback body size when the art tables have no player frames.
const DEFAULT_BODY_SIZE: u32 = 64;

/// Horizontal facing. Player art faces right; left is drawn mirrored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    #[default]
    Left,
    Right,
}

/// Which animation the player shows, derived from kinematic state each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationState {
    #[default]
    Idle,
    Run,
    Jump,
    DoubleJump,
    Fall,
    Hit,
}

impl AnimationState {
    pub fn sheet(&self) -> &'static str {
        match self {
            AnimationState::Idle => sheets::PLAYER_IDLE,
            AnimationState::Run => sheets::PLAYER_RUN,
            AnimationState::Jump => sheets::PLAYER_JUMP,
            AnimationState::DoubleJump => sheets::PLAYER_DOUBLE_JUMP,
            AnimationState::Fall => sheets::PLAYER_FALL,
            AnimationState::Hit => sheets::PLAYER_HIT,
        }
    }
}

/// Kinematic and animation state of the player.
///
/// Position is the top-left corner in world pixels; `y` grows downward, so a
/// negative `y_vel` is upward motion.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub x_vel: f32,
    pub y_vel: f32,
    pub jump_count: u8,
    /// Ticks since the last landing; drives the gravity ramp.
    pub fall_count: u32,
    pub hit: bool,
    /// Ticks spent hit; only advances while `hit` is set.
    pub hit_count: u32,
    /// Strongest cause passed to `make_hit` since the hit began.
    pub hit_cause: Option<DeathCause>,
    pub direction: Facing,
    pub animation_count: u32,
    pub animation: AnimationState,
    pub respawn_x: f32,
    pub respawn_y: f32,
    sprite: SpriteRef,
    mask: Arc<Mask>,
}

impl PlayerState {
    pub fn new(spawn_x: f32, spawn_y: f32, art: &ArtContext) -> Self {
        let mut player = Self {
            x: spawn_x,
            y: spawn_y,
            width: DEFAULT_BODY_SIZE as f32,
            height: DEFAULT_BODY_SIZE as f32,
            x_vel: 0.0,
            y_vel: 0.0,
            jump_count: 0,
            fall_count: 0,
            hit: false,
            hit_count: 0,
            hit_cause: None,
            direction: Facing::default(),
            animation_count: 0,
            animation: AnimationState::Idle,
            respawn_x: spawn_x,
            respawn_y: spawn_y,
            sprite: SpriteRef::new(sheets::PLAYER_IDLE, 0),
            mask: Arc::new(Mask::filled(DEFAULT_BODY_SIZE, DEFAULT_BODY_SIZE)),
        };
        player.apply_frame(art);
        player
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn sprite(&self) -> SpriteRef {
        self.sprite
    }

    pub fn visual(&self) -> Visual {
        Visual::Sprite(self.sprite)
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn set_bottom(&mut self, bottom: f32) {
        self.y = bottom - self.height;
    }

    pub fn set_top(&mut self, top: f32) {
        self.y = top;
    }

    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    pub fn move_left(&mut self, vel: f32) {
        self.x_vel = -vel;
        if self.direction != Facing::Left {
            self.direction = Facing::Left;
            self.animation_count = 0;
        }
    }

    pub fn move_right(&mut self, vel: f32) {
        self.x_vel = vel;
        if self.direction != Facing::Right {
            self.direction = Facing::Right;
            self.animation_count = 0;
        }
    }

    /// Start a jump. Returns false (and changes nothing) once the air-jump
    /// budget is spent.
    pub fn jump(&mut self, physics: &PhysicsConfig) -> bool {
        if self.jump_count >= physics.max_jumps {
            return false;
        }
        self.y_vel = -physics.gravity * physics.jump_strength;
        self.animation_count = 0;
        self.jump_count += 1;
        if self.jump_count == 1 {
            self.fall_count = 0;
        }
        true
    }

    /// Downward collision with a solid object.
    pub fn landed(&mut self) {
        self.fall_count = 0;
        self.y_vel = 0.0;
        self.jump_count = 0;
    }

    /// Upward collision with a solid object.
    pub fn hit_head(&mut self) {
        self.y_vel = -self.y_vel;
    }

    pub fn make_hit(&mut self, cause: DeathCause) {
        self.hit = true;
        self.hit_cause = Some(DeathCause::strongest(self.hit_cause, cause));
    }

    pub fn set_respawn(&mut self, x: f32, y: f32) {
        self.respawn_x = x;
        self.respawn_y = y;
    }

    /// One tick of gravity, motion, hit timer and animation.
    pub fn integrate(&mut self, physics: &PhysicsConfig, art: &ArtContext) {
        self.fall_count += 1;
        let ramp = self.fall_count as f32 / physics.fps.max(1) as f32 * physics.gravity;
        self.y_vel += ramp.min(1.0);
        self.move_by(self.x_vel, self.y_vel);

        if self.hit {
            self.hit_count += 1;
        }
        if self.hit_count > physics.hit_recovery_frames() {
            self.hit = false;
            self.hit_count = 0;
            self.hit_cause = None;
        }

        self.update_sprite(physics, art);
    }

    /// Hold still in the hit pose (used while a death animation plays out).
    pub fn freeze_in_hit_pose(&mut self, physics: &PhysicsConfig, art: &ArtContext) {
        self.x_vel = 0.0;
        self.y_vel = 0.0;
        self.hit = true;
        self.update_sprite(physics, art);
    }

    /// Stop all motion without touching hit or animation state.
    pub fn freeze(&mut self) {
        self.x_vel = 0.0;
        self.y_vel = 0.0;
    }

    /// Return to the respawn point with all transient state cleared.
    pub fn respawn(&mut self, art: &ArtContext) {
        self.x = self.respawn_x;
        self.y = self.respawn_y;
        self.x_vel = 0.0;
        self.y_vel = 0.0;
        self.jump_count = 0;
        self.fall_count = 0;
        self.hit = false;
        self.hit_count = 0;
        self.hit_cause = None;
        self.animation_count = 0;
        self.animation = AnimationState::Idle;
        self.apply_frame(art);
    }

    pub fn derive_animation(&self, physics: &PhysicsConfig) -> AnimationState {
        if self.hit {
            AnimationState::Hit
        } else if self.y_vel < 0.0 {
            match self.jump_count {
                1 => AnimationState::Jump,
                2 => AnimationState::DoubleJump,
                _ => AnimationState::Idle,
            }
        } else if self.y_vel > physics.gravity * 2.0 {
            AnimationState::Fall
        } else if self.x_vel != 0.0 {
            AnimationState::Run
        } else {
            AnimationState::Idle
        }
    }

    pub fn update_sprite(&mut self, physics: &PhysicsConfig, art: &ArtContext) {
        self.animation = self.derive_animation(physics);
        let frames = art.frame_count(self.animation.sheet()).max(1);
        let frame = (self.animation_count / physics.animation_delay.max(1)) as usize % frames;
        self.set_frame(art, frame);
        self.animation_count += 1;
    }

    fn apply_frame(&mut self, art: &ArtContext) {
        self.set_frame(art, 0);
    }

    /// Point the sprite at `frame` of the current animation and adopt that
    /// frame's size and mask. The top-left corner stays put.
    fn set_frame(&mut self, art: &ArtContext, frame: usize) {
        let sheet = self.animation.sheet();
        self.sprite = SpriteRef {
            sheet,
            frame,
            flip_x: self.direction == Facing::Left,
            flip_y: false,
        };
        if let Some(mask) = art.frame_mask(sheet, frame) {
            self.width = mask.width() as f32;
            self.height = mask.height() as f32;
            self.mask = mask;
        }
    }
}
