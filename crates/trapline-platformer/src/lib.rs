pub mod camera;
pub mod collision;
pub mod config;
pub mod course_gen;
pub mod level;
pub mod objects;
pub mod physics;
pub mod scoring;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use trapline_core::art::{ArtContext, Visual};
use trapline_core::events::{DeathCause, GameEvent};
use trapline_core::geometry::Rect;
use trapline_core::input::InputIntents;
use trapline_core::time::{Millis, elapsed_since};

use camera::Camera;
use config::PlatformerConfig;
use level::{LevelLayout, LevelSource, layout_or_builtin};
use objects::{ObjectKind, WorldObject};
use physics::PlayerState;
use scoring::CompletionStats;

/// Top-level state of a level session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Dead,
    LevelComplete,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Running,
    Dead {
        cause: DeathCause,
        dead_at: Millis,
        delay_ms: u64,
    },
    Complete {
        stats: CompletionStats,
        completed_at: Millis,
    },
}

/// Everything the renderer and HUD need after one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameResult {
    pub tick: u64,
    pub status: SessionStatus,
    pub level_index: usize,
    pub player_rect: Rect,
    pub player_visual: Visual,
    pub camera_offset_x: f32,
    pub death_cause: Option<DeathCause>,
    /// The death delay has run out and restart input is accepted.
    pub show_restart_prompt: bool,
    /// The completion window has run out and next/restart input is accepted.
    pub show_completion_overlay: bool,
    pub completion: Option<CompletionStats>,
    pub elapsed_ms: Millis,
    pub deaths: u32,
    pub events: Vec<GameEvent>,
}

/// One level being played: the player, the level's objects, and the
/// Running/Dead/LevelComplete state machine around them.
///
/// Restart and next-level requests rebuild the session in place, so a host
/// drives any number of levels from one loop.
pub struct LevelSession {
    config: PlatformerConfig,
    art: Arc<ArtContext>,
    levels: Box<dyn LevelSource + Send>,
    level_index: usize,
    level_name: String,
    player: PlayerState,
    objects: Vec<WorldObject>,
    camera: Camera,
    phase: Phase,
    deaths: u32,
    started_at: Option<Millis>,
    tick: u64,
    pending_events: Vec<GameEvent>,
}

impl LevelSession {
    /// Start at level 0 with no deaths.
    pub fn new(
        config: PlatformerConfig,
        art: Arc<ArtContext>,
        levels: Box<dyn LevelSource + Send>,
    ) -> Self {
        Self::starting_at(config, art, levels, 0, 0)
    }

    /// Start at `level_index`, carrying a death count from earlier play.
    pub fn starting_at(
        config: PlatformerConfig,
        art: Arc<ArtContext>,
        levels: Box<dyn LevelSource + Send>,
        level_index: usize,
        deaths: u32,
    ) -> Self {
        let layout = layout_or_builtin(&*levels, level_index, &config.world);
        let built = layout.build(&art, &config);
        let player = PlayerState::new(built.spawn.0, built.spawn.1, &art);
        tracing::info!(level = level_index, name = %built.name, deaths, "level started");
        Self {
            config,
            art,
            levels,
            level_index,
            level_name: built.name,
            player,
            objects: built.objects,
            camera: Camera::default(),
            phase: Phase::Running,
            deaths,
            started_at: None,
            tick: 0,
            pending_events: vec![GameEvent::LevelStarted { index: level_index }],
        }
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn objects(&self) -> &[WorldObject] {
        &self.objects
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &PlatformerConfig {
        &self.config
    }

    pub fn deaths(&self) -> u32 {
        self.deaths
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level_name(&self) -> &str {
        &self.level_name
    }

    pub fn status(&self) -> SessionStatus {
        match self.phase {
            Phase::Running => SessionStatus::Running,
            Phase::Dead { .. } => SessionStatus::Dead,
            Phase::Complete { .. } => SessionStatus::LevelComplete,
        }
    }

    /// Advance the session by one tick at monotonic time `now`.
    pub fn process_tick(&mut self, input: &InputIntents, now: Millis) -> FrameResult {
        self.tick += 1;
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        let mut events = std::mem::take(&mut self.pending_events);

        match self.phase {
            Phase::Running => {
                self.simulate(input, now, &mut events);
                self.evaluate(now, &mut events);
            },
            Phase::Dead {
                dead_at, delay_ms, ..
            } => {
                if elapsed_since(dead_at, now) < delay_ms {
                    // Restart is not offered yet; let reveals play out.
                    self.update_objects(now);
                    self.player.freeze_in_hit_pose(&self.config.physics, &self.art);
                } else if input.restart {
                    self.respawn(&mut events);
                }
            },
            Phase::Complete { completed_at, .. } => {
                if elapsed_since(completed_at, now) < self.config.timing.completion_delay_ms {
                    self.simulate(input, now, &mut events);
                } else if input.next_level {
                    self.load_level(self.level_index + 1);
                    events.append(&mut self.pending_events);
                } else if input.restart {
                    self.load_level(self.level_index);
                    events.append(&mut self.pending_events);
                } else {
                    self.player.freeze();
                    self.update_objects(now);
                }
            },
        }

        self.frame_result(now, events)
    }

    fn update_objects(&mut self, now: Millis) {
        for obj in &mut self.objects {
            obj.update(now, &self.art, &self.config);
        }
    }

    /// Input, object animation, physics and collision for one live tick.
    fn simulate(&mut self, input: &InputIntents, now: Millis, events: &mut Vec<GameEvent>) {
        let physics = &self.config.physics;
        if input.jump && self.player.jump(physics) {
            events.push(GameEvent::Jumped {
                jump_count: self.player.jump_count,
            });
        }

        for obj in &mut self.objects {
            obj.update(now, &self.art, &self.config);
        }
        self.player.integrate(physics, &self.art);

        let resolution = collision::resolve(&mut self.player, &mut self.objects, input, now, physics);
        events.extend(resolution.events);

        self.camera
            .follow(&self.player.rect(), self.player.x_vel, &self.config.world);
    }

    /// Death and completion checks after a live tick.
    fn evaluate(&mut self, now: Millis, events: &mut Vec<GameEvent>) {
        let fell = self.player.rect().top() > self.config.world.fall_limit();
        if fell || self.player.hit {
            let mut cause = self.player.hit_cause;
            if fell {
                cause = Some(DeathCause::strongest(cause, DeathCause::Fall));
            }
            let cause = cause.unwrap_or(DeathCause::Hazard);
            let delay_ms = if cause == DeathCause::Spike {
                self.config.timing.spike_death_delay_ms
            } else {
                0
            };
            self.deaths += 1;
            self.phase = Phase::Dead {
                cause,
                dead_at: now,
                delay_ms,
            };
            self.player.freeze_in_hit_pose(&self.config.physics, &self.art);
            tracing::info!(%cause, deaths = self.deaths, level = self.level_index, "player died");
            events.push(GameEvent::PlayerDied {
                cause,
                deaths: self.deaths,
            });
            return;
        }

        let reached_end = self
            .objects
            .iter()
            .any(|o| o.kind() == ObjectKind::End && o.is_triggered());
        if reached_end {
            let stats = CompletionStats {
                elapsed_ms: self.elapsed(now),
                deaths: self.deaths,
            };
            self.phase = Phase::Complete {
                stats,
                completed_at: now,
            };
            tracing::info!(
                level = self.level_index,
                elapsed_ms = stats.elapsed_ms,
                deaths = stats.deaths,
                "level complete"
            );
            events.push(GameEvent::LevelCompleted {
                elapsed_ms: stats.elapsed_ms,
                deaths: stats.deaths,
            });
        }
    }

    /// Return to the last respawn point with every object pristine.
    fn respawn(&mut self, events: &mut Vec<GameEvent>) {
        self.player.respawn(&self.art);
        for obj in &mut self.objects {
            obj.reset();
        }
        self.camera.recenter(&self.player.rect(), &self.config.world);
        self.phase = Phase::Running;
        let (x, y) = (self.player.x, self.player.y);
        tracing::info!(x, y, deaths = self.deaths, "player respawned");
        events.push(GameEvent::Respawned { x, y });
    }

    /// Rebuild the session for `index`, keeping the death count.
    fn load_level(&mut self, index: usize) {
        let config = self.config.clone();
        let art = Arc::clone(&self.art);
        let levels = std::mem::replace(&mut self.levels, Box::new(Vec::<LevelLayout>::new()));
        let tick = self.tick;
        *self = Self::starting_at(config, art, levels, index, self.deaths);
        self.tick = tick;
    }

    fn elapsed(&self, now: Millis) -> Millis {
        self.started_at.map_or(0, |start| elapsed_since(start, now))
    }

    fn frame_result(&self, now: Millis, events: Vec<GameEvent>) -> FrameResult {
        let (death_cause, show_restart_prompt) = match self.phase {
            Phase::Dead {
                cause,
                dead_at,
                delay_ms,
            } => (Some(cause), elapsed_since(dead_at, now) >= delay_ms),
            _ => (None, false),
        };
        let (completion, show_completion_overlay) = match self.phase {
            Phase::Complete {
                stats,
                completed_at,
            } => (
                Some(stats),
                elapsed_since(completed_at, now) >= self.config.timing.completion_delay_ms,
            ),
            _ => (None, false),
        };
        FrameResult {
            tick: self.tick,
            status: self.status(),
            level_index: self.level_index,
            player_rect: self.player.rect(),
            player_visual: self.player.visual(),
            camera_offset_x: self.camera.offset_x,
            death_cause,
            show_restart_prompt,
            show_completion_overlay,
            elapsed_ms: completion.map_or_else(|| self.elapsed(now), |s| s.elapsed_ms),
            completion,
            deaths: self.deaths,
            events,
        }
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::sync::Arc;

    use trapline_core::art::ArtContext;
    use trapline_core::input::InputIntents;
    use trapline_core::time::TickClock;

    use crate::config::PlatformerConfig;
    use crate::level::{LevelLayout, Placement, Spawn};
    use crate::objects::ObjectKind;
    use crate::{FrameResult, LevelSession};

    /// Top of the floor in test layouts.
    pub const FLOOR_Y: f32 = 704.0;

    /// A floor of `blocks` blocks from x = 0 with the player standing on it at x = 100.
    pub fn floor_layout(blocks: i32) -> LevelLayout {
        LevelLayout {
            name: "test-floor".to_string(),
            spawn: Some(Spawn {
                x: 100.0,
                y: FLOOR_Y - 64.0,
            }),
            objects: (0..blocks)
                .map(|i| Placement::new(ObjectKind::Block, i as f32 * 96.0, FLOOR_Y))
                .collect(),
        }
    }

    /// `floor_layout` plus extra placements.
    pub fn floor_with(blocks: i32, extra: Vec<Placement>) -> LevelLayout {
        let mut layout = floor_layout(blocks);
        layout.objects.extend(extra);
        layout
    }

    /// A session over `levels` with default config and builtin art.
    pub fn session(levels: Vec<LevelLayout>) -> LevelSession {
        LevelSession::new(
            PlatformerConfig::default(),
            Arc::new(ArtContext::builtin()),
            Box::new(levels),
        )
    }

    /// Session plus a 60 Hz simulated clock.
    pub struct Harness {
        pub session: LevelSession,
        pub clock: TickClock,
    }

    impl Harness {
        pub fn new(levels: Vec<LevelLayout>) -> Self {
            Self {
                session: session(levels),
                clock: TickClock::new(60.0),
            }
        }

        pub fn step(&mut self, input: InputIntents) -> FrameResult {
            let now = self.clock.advance();
            self.session.process_tick(&input, now)
        }

        /// Run `n` ticks with the same input, returning the last result.
        pub fn run(&mut self, input: InputIntents, n: usize) -> Option<FrameResult> {
            (0..n).map(|_| self.step(input)).last()
        }

        /// Step until `pred` holds, giving up after `limit` ticks.
        pub fn run_until(
            &mut self,
            input: InputIntents,
            limit: usize,
            mut pred: impl FnMut(&FrameResult) -> bool,
        ) -> Option<FrameResult> {
            for _ in 0..limit {
                let frame = self.step(input);
                if pred(&frame) {
                    return Some(frame);
                }
            }
            None
        }
    }
}
