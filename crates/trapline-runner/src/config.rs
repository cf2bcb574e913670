use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use trapline_platformer::config::WorldConfig;
use trapline_platformer::course_gen::GeneratedLevels;
use trapline_platformer::level::{BuiltinLevels, LevelSource};

use crate::levels::DirectoryLevels;

/// Slowest tick rate the loops accept.
pub const MIN_TICK_RATE_HZ: f32 = 1.0;
/// Fastest tick rate the loops accept.
pub const MAX_TICK_RATE_HZ: f32 = 1000.0;

/// `hz` limited to `MIN_TICK_RATE_HZ..=MAX_TICK_RATE_HZ`; non-finite or
/// non-positive rates fall back to 60.
pub fn sane_tick_rate(hz: f32) -> f32 {
    if hz.is_finite() && hz > 0.0 {
        hz.clamp(MIN_TICK_RATE_HZ, MAX_TICK_RATE_HZ)
    } else {
        60.0
    }
}

/// Runner configuration, loaded from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub tick_rate_hz: f32,
    /// Stop after this many ticks.
    pub max_ticks: u64,
    /// Pace ticks against the wall clock instead of running flat out.
    pub realtime: bool,
    /// Stop once this many levels have been completed. Zero runs to `max_ticks`.
    pub stop_after_levels: u32,
    /// Directory of `.toml`/`.json` level files, played in file-name order.
    pub level_dir: Option<PathBuf>,
    /// Input script; without one the player stands idle.
    pub script: Option<PathBuf>,
    /// Seed for generated courses when no level directory is set.
    pub seed: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            max_ticks: 60 * 60,
            realtime: false,
            stop_after_levels: 0,
            level_dir: None,
            script: None,
            seed: None,
        }
    }
}

impl RunnerConfig {
    /// Load config from `TRAPLINE_RUNNER_CONFIG` or `config/runner.toml`,
    /// falling back to defaults if the file is missing or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("TRAPLINE_RUNNER_CONFIG")
            .unwrap_or_else(|_| "config/runner.toml".to_string());
        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    Self::default()
                },
            },
            Err(_) => Self::default(),
        };
        config.apply_env_overrides();
        config
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// `TRAPLINE_REALTIME`, `TRAPLINE_MAX_TICKS` and `TRAPLINE_SEED` win over the file.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("TRAPLINE_REALTIME") {
            self.realtime = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = std::env::var("TRAPLINE_MAX_TICKS") {
            match v.parse() {
                Ok(n) => self.max_ticks = n,
                Err(_) => tracing::warn!(value = %v, "ignoring invalid TRAPLINE_MAX_TICKS"),
            }
        }
        if let Ok(v) = std::env::var("TRAPLINE_SEED") {
            match v.parse() {
                Ok(n) => self.seed = Some(n),
                Err(_) => tracing::warn!(value = %v, "ignoring invalid TRAPLINE_SEED"),
            }
        }
    }

    /// Log problems and clamp values the loops cannot run with.
    pub fn validate(&mut self) {
        let rate = sane_tick_rate(self.tick_rate_hz);
        if rate != self.tick_rate_hz {
            tracing::warn!(
                configured = self.tick_rate_hz,
                using = rate,
                "tick_rate_hz out of range"
            );
            self.tick_rate_hz = rate;
        }
        if self.max_ticks == 0 {
            tracing::warn!("max_ticks is 0, nothing will be simulated");
        }
    }

    /// Level directory if configured, else a seeded course, else the builtin level.
    pub fn level_source(&self, world: &WorldConfig) -> Box<dyn LevelSource + Send> {
        if let Some(dir) = &self.level_dir {
            match DirectoryLevels::scan(dir) {
                Ok(levels) => return Box::new(levels),
                Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "level directory unusable"),
            }
        }
        match self.seed {
            Some(seed) => Box::new(GeneratedLevels {
                seed,
                world: world.clone(),
            }),
            None => Box::new(BuiltinLevels {
                world: world.clone(),
            }),
        }
    }
}
