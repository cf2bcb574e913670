use serde::{Deserialize, Serialize};

use trapline_core::time::Millis;

/// Snapshot shown on the completion overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionStats {
    pub elapsed_ms: Millis,
    pub deaths: u32,
}

impl CompletionStats {
    /// Overlay summary line, e.g. `"Time 01:05.250  Deaths 3"`.
    pub fn summary(&self) -> String {
        format!(
            "Time {}  Deaths {}",
            format_elapsed(self.elapsed_ms),
            self.deaths
        )
    }
}

/// Format a duration as `MM:SS.mmm`. Minutes keep growing past 59.
pub fn format_elapsed(ms: Millis) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms / 1000) % 60;
    let millis = ms % 1000;
    format!("{minutes:02}:{seconds:02}.{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(0), "00:00.000");
        assert_eq!(format_elapsed(65_250), "01:05.250");
        assert_eq!(format_elapsed(3_600_000), "60:00.000");
    }

    #[test]
    fn summary_line() {
        let stats = CompletionStats {
            elapsed_ms: 65_250,
            deaths: 3,
        };
        assert_eq!(stats.summary(), "Time 01:05.250  Deaths 3");
    }
}
