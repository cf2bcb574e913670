use std::future::Future;
use std::time::Duration;

use serde::Serialize;

use trapline_core::events::GameEvent;
use trapline_core::time::{Clock, Millis, MonotonicClock, TickClock};
use trapline_platformer::scoring::CompletionStats;
use trapline_platformer::{FrameResult, LevelSession, SessionStatus};

use crate::config::sane_tick_rate;
use crate::script::InputScript;

/// Outcome of a run, printed by the binary when it exits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub final_status: SessionStatus,
    pub level_index: usize,
    pub level_name: String,
    pub deaths: u32,
    pub levels_completed: u32,
    pub last_completion: Option<CompletionStats>,
    pub elapsed_ms: Millis,
}

/// Drives one session from an input script until a stop condition is met.
pub struct Runner {
    session: LevelSession,
    script: InputScript,
    max_ticks: u64,
    stop_after_levels: u32,
    ticks: u64,
    last_status: Option<SessionStatus>,
    levels_completed: u32,
    last_completion: Option<CompletionStats>,
    last_elapsed: Millis,
}

impl Runner {
    pub fn new(session: LevelSession, script: InputScript, max_ticks: u64) -> Self {
        Self {
            session,
            script,
            max_ticks,
            stop_after_levels: 0,
            ticks: 0,
            last_status: None,
            levels_completed: 0,
            last_completion: None,
            last_elapsed: 0,
        }
    }

    /// Stop once `levels` levels have been completed. Zero disables the check.
    pub fn stop_after_levels(mut self, levels: u32) -> Self {
        self.stop_after_levels = levels;
        self
    }

    pub fn session(&self) -> &LevelSession {
        &self.session
    }

    fn finished(&self) -> bool {
        self.ticks >= self.max_ticks
            || (self.stop_after_levels > 0 && self.levels_completed >= self.stop_after_levels)
    }

    /// Run ticks back to back on a simulated clock.
    pub fn run_headless(&mut self, tick_rate_hz: f32) -> RunSummary {
        let tick_rate_hz = sane_tick_rate(tick_rate_hz);
        let mut clock = TickClock::new(tick_rate_hz);
        tracing::info!(max_ticks = self.max_ticks, tick_rate_hz, "headless run starting");
        while !self.finished() {
            let now = clock.advance();
            self.step(now);
        }
        self.summary()
    }

    /// Run ticks paced by a tokio interval until a stop condition or `shutdown` resolves.
    pub async fn run_realtime(
        &mut self,
        tick_rate_hz: f32,
        shutdown: impl Future<Output = ()>,
    ) -> RunSummary {
        let tick_rate_hz = sane_tick_rate(tick_rate_hz);
        let clock = MonotonicClock::new();
        let mut interval = tokio::time::interval(Duration::from_secs_f32(1.0 / tick_rate_hz));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tokio::pin!(shutdown);
        tracing::info!(max_ticks = self.max_ticks, tick_rate_hz, "realtime run starting");

        while !self.finished() {
            tokio::select! {
                _ = interval.tick() => {
                    self.step(clock.now_ms());
                }
                _ = &mut shutdown => {
                    tracing::info!(ticks = self.ticks, "shutdown requested");
                    break;
                }
            }
        }
        self.summary()
    }

    fn step(&mut self, now: Millis) -> FrameResult {
        let input = self.script.intents_at(self.ticks);
        self.ticks += 1;
        let frame = self.session.process_tick(&input, now);
        self.observe(&frame);
        frame
    }

    fn observe(&mut self, frame: &FrameResult) {
        for event in &frame.events {
            match event {
                GameEvent::LevelStarted { index } => {
                    tracing::info!(tick = frame.tick, level = index, "level started");
                },
                other => tracing::debug!(tick = frame.tick, event = ?other, "event"),
            }
        }

        if self.last_status != Some(frame.status) {
            match frame.status {
                SessionStatus::Running => {
                    tracing::info!(tick = frame.tick, level = frame.level_index, "running");
                },
                SessionStatus::Dead => tracing::info!(
                    tick = frame.tick,
                    cause = ?frame.death_cause,
                    deaths = frame.deaths,
                    "player died"
                ),
                SessionStatus::LevelComplete => {
                    self.levels_completed += 1;
                    self.last_completion = frame.completion;
                    tracing::info!(
                        tick = frame.tick,
                        level = frame.level_index,
                        summary = %frame.completion.map(|c| c.summary()).unwrap_or_default(),
                        "level complete"
                    );
                },
            }
            self.last_status = Some(frame.status);
        }

        tracing::trace!(
            tick = frame.tick,
            x = frame.player_rect.x,
            y = frame.player_rect.y,
            camera = frame.camera_offset_x,
            "frame"
        );
        self.last_elapsed = frame.elapsed_ms;
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.ticks,
            final_status: self.session.status(),
            level_index: self.session.level_index(),
            level_name: self.session.level_name().to_string(),
            deaths: self.session.deaths(),
            levels_completed: self.levels_completed,
            last_completion: self.last_completion,
            elapsed_ms: self.last_elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ScriptSegment;
    use trapline_platformer::test_helpers::{floor_layout, session};

    #[test]
    fn idle_run_stops_at_max_ticks() {
        let mut runner = Runner::new(session(vec![floor_layout(5)]), InputScript::default(), 30);
        let summary = runner.run_headless(60.0);
        assert_eq!(summary.ticks, 30);
        assert_eq!(summary.final_status, SessionStatus::Running);
        assert_eq!(summary.deaths, 0);
        assert_eq!(summary.levels_completed, 0);
        assert_eq!(summary.level_name, "test-floor");
    }

    #[tokio::test]
    async fn tiny_tick_rate_is_clamped_not_fatal() {
        let mut runner = Runner::new(session(vec![floor_layout(5)]), InputScript::default(), 1);
        let summary = runner
            .run_realtime(1e-30, std::future::pending::<()>())
            .await;
        assert_eq!(summary.ticks, 1);

        let mut runner = Runner::new(session(vec![floor_layout(5)]), InputScript::default(), 3);
        assert_eq!(runner.run_headless(0.0).ticks, 3);
    }

    #[test]
    fn running_off_the_floor_counts_a_death() {
        let script = InputScript::default().then(ScriptSegment {
            ticks: 600,
            right: true,
            ..Default::default()
        });
        let mut runner = Runner::new(session(vec![floor_layout(3)]), script, 600);
        let summary = runner.run_headless(60.0);
        assert_eq!(summary.final_status, SessionStatus::Dead);
        assert_eq!(summary.deaths, 1);
    }
}
