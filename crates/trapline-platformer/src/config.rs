use serde::{Deserialize, Serialize};

/// Simulation frames per second.
pub const FPS: u32 = 60;
/// Gravity scale (units/frame²).
pub const GRAVITY: f32 = 1.0;
/// Horizontal run speed (pixels/frame).
pub const PLAYER_VEL: f32 = 5.0;
/// Jump impulse as a multiple of gravity.
pub const JUMP_STRENGTH: f32 = 8.0;
/// Horizontal probe distance as a multiple of `PLAYER_VEL`.
pub const LOOKAHEAD_FACTOR: f32 = 2.0;
/// Ticks each animation frame is shown for.
pub const ANIMATION_DELAY: u32 = 3;
/// Ground jump plus one air jump.
pub const MAX_JUMPS: u8 = 2;

/// Player movement tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub fps: u32,
    pub gravity: f32,
    pub player_vel: f32,
    pub jump_strength: f32,
    pub lookahead_factor: f32,
    pub animation_delay: u32,
    pub max_jumps: u8,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fps: FPS,
            gravity: GRAVITY,
            player_vel: PLAYER_VEL,
            jump_strength: JUMP_STRENGTH,
            lookahead_factor: LOOKAHEAD_FACTOR,
            animation_delay: ANIMATION_DELAY,
            max_jumps: MAX_JUMPS,
        }
    }
}

impl PhysicsConfig {
    /// Distance the horizontal probe looks ahead each tick.
    pub fn lookahead(&self) -> f32 {
        self.player_vel * self.lookahead_factor
    }

    /// Ticks a hit lasts before clearing by itself.
    pub fn hit_recovery_frames(&self) -> u32 {
        self.fps * 2
    }

    /// Milliseconds per tick.
    pub fn frame_ms(&self) -> f32 {
        1000.0 / self.fps.max(1) as f32
    }

    /// Milliseconds each animation frame is shown for.
    pub fn animation_frame_ms(&self) -> f32 {
        1000.0 * self.animation_delay as f32 / self.fps.max(1) as f32
    }
}

/// World and camera geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub view_width: f32,
    pub view_height: f32,
    /// How far below the view the player's top may drop before counting as a fall.
    pub fall_margin: f32,
    /// Width of the band at each view edge that scrolls the camera.
    pub scroll_area_width: f32,
    pub block_size: f32,
    pub default_spawn_x: f32,
    pub default_spawn_y: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            view_width: 1000.0,
            view_height: 800.0,
            fall_margin: 50.0,
            scroll_area_width: 200.0,
            block_size: 96.0,
            default_spawn_x: 100.0,
            default_spawn_y: 100.0,
        }
    }
}

impl WorldConfig {
    /// Player tops below this y are a fall death.
    pub fn fall_limit(&self) -> f32 {
        self.view_height + self.fall_margin
    }
}

/// Durations of the timed state machines, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub spike_death_delay_ms: u64,
    pub completion_delay_ms: u64,
    pub hidden_spike_reveal_ms: u64,
    pub box_break_ms: u64,
    pub end_blink_ms: u64,
    pub end_blink_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            spike_death_delay_ms: 1001,
            completion_delay_ms: 1500,
            hidden_spike_reveal_ms: 250,
            box_break_ms: 250,
            end_blink_ms: 1500,
            end_blink_interval_ms: 150,
        }
    }
}

/// Top-level platformer configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerConfig {
    pub physics: PhysicsConfig,
    pub world: WorldConfig,
    pub timing: TimingConfig,
}

impl PlatformerConfig {
    /// Load config from `TRAPLINE_CONFIG` or `config/trapline.toml`, falling
    /// back to defaults if the file is missing or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("TRAPLINE_CONFIG")
            .unwrap_or_else(|_| "config/trapline.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    Self::default()
                },
            },
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
