use std::time::Instant;

/// Milliseconds on a monotonic clock.
pub type Millis = u64;

/// Elapsed milliseconds from `start` to `now`, saturating at zero.
pub fn elapsed_since(start: Millis, now: Millis) -> Millis {
    now.saturating_sub(start)
}

/// Source of monotonic time for the frame loop.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Wall-clock time since construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Simulated clock that advances in whole ticks. Used for headless runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    tick: u64,
    tick_rate_hz: f32,
}

impl TickClock {
    pub fn new(tick_rate_hz: f32) -> Self {
        Self {
            tick: 0,
            tick_rate_hz,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance(&mut self) -> Millis {
        self.tick += 1;
        self.now_ms()
    }

    /// Milliseconds covered by `ticks` ticks at this rate.
    pub fn ticks_to_ms(&self, ticks: u64) -> Millis {
        (ticks as f64 * 1000.0 / self.tick_rate_hz as f64).round() as Millis
    }
}

impl Clock for TickClock {
    fn now_ms(&self) -> Millis {
        self.ticks_to_ms(self.tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_never_underflows() {
        assert_eq!(elapsed_since(100, 40), 0);
        assert_eq!(elapsed_since(40, 100), 60);
    }

    #[test]
    fn tick_clock_tracks_rate() {
        let mut clock = TickClock::new(60.0);
        assert_eq!(clock.now_ms(), 0);
        for _ in 0..60 {
            clock.advance();
        }
        assert_eq!(clock.tick(), 60);
        assert_eq!(clock.now_ms(), 1000);
        assert_eq!(clock.ticks_to_ms(15), 250);
    }

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
