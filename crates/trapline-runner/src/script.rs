use std::path::Path;

use serde::{Deserialize, Serialize};

use trapline_core::input::InputIntents;

#[derive(Debug)]
pub enum ScriptError {
    Io(String),
    Parse(String),
    /// Segment at this index lasts zero ticks.
    EmptySegment(usize),
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read input script: {e}"),
            Self::Parse(e) => write!(f, "failed to parse input script: {e}"),
            Self::EmptySegment(i) => write!(f, "script segment {i} has zero ticks"),
        }
    }
}

impl std::error::Error for ScriptError {}

/// A run of ticks with the same held keys.
///
/// `jump`, `restart` and `next_level` are presses: they fire on the first tick
/// of the segment only. `left` and `right` are held for the whole segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSegment {
    pub ticks: u64,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub restart: bool,
    pub next_level: bool,
}

impl ScriptSegment {
    fn intents(&self, offset: u64) -> InputIntents {
        let first = offset == 0;
        InputIntents {
            left: self.left,
            right: self.right,
            jump: self.jump && first,
            restart: self.restart && first,
            next_level: self.next_level && first,
        }
    }
}

/// Scripted input track, written as `[[segment]]` tables in TOML.
/// Ticks past the end of the script are idle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputScript {
    #[serde(default, rename = "segment")]
    pub segments: Vec<ScriptSegment>,
}

impl InputScript {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ScriptError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ScriptError> {
        let script: Self = toml::from_str(content).map_err(|e| ScriptError::Parse(e.to_string()))?;
        if let Some(i) = script.segments.iter().position(|s| s.ticks == 0) {
            return Err(ScriptError::EmptySegment(i));
        }
        Ok(script)
    }

    /// Total scripted ticks.
    pub fn len_ticks(&self) -> u64 {
        self.segments.iter().map(|s| s.ticks).sum()
    }

    /// Intents for zero-based `tick`.
    pub fn intents_at(&self, tick: u64) -> InputIntents {
        let mut start = 0;
        for segment in &self.segments {
            if tick < start + segment.ticks {
                return segment.intents(tick - start);
            }
            start += segment.ticks;
        }
        InputIntents::default()
    }

    /// Append a segment, builder style.
    pub fn then(mut self, segment: ScriptSegment) -> Self {
        self.segments.push(segment);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
        [[segment]]
        ticks = 3
        right = true
        jump = true

        [[segment]]
        ticks = 2

        [[segment]]
        ticks = 1
        restart = true
    "#;

    #[test]
    fn presses_fire_once_per_segment() {
        let script = InputScript::from_toml_str(SCRIPT).unwrap();
        assert_eq!(script.len_ticks(), 6);

        let first = script.intents_at(0);
        assert!(first.right && first.jump);
        let second = script.intents_at(1);
        assert!(second.right && !second.jump);
        assert!(script.intents_at(2).right);
        assert_eq!(script.intents_at(3), InputIntents::default());
        assert!(script.intents_at(5).restart);
    }

    #[test]
    fn past_the_end_is_idle() {
        let script = InputScript::from_toml_str(SCRIPT).unwrap();
        assert_eq!(script.intents_at(6), InputIntents::default());
        assert_eq!(InputScript::default().intents_at(0), InputIntents::default());
    }

    #[test]
    fn zero_tick_segment_is_rejected() {
        let err = InputScript::from_toml_str("[[segment]]\nright = true").unwrap_err();
        assert!(matches!(err, ScriptError::EmptySegment(0)));
        assert_eq!(err.to_string(), "script segment 0 has zero ticks");
    }

    #[test]
    fn malformed_script_is_a_parse_error() {
        assert!(matches!(
            InputScript::from_toml_str("segment = 4"),
            Err(ScriptError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            InputScript::load(Path::new("/nonexistent/script.toml")),
            Err(ScriptError::Io(_))
        ));
    }
}
