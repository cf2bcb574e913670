//! Headless host for Trapline level sessions.
//!
//! Loads configuration, a level set and a scripted input track, then steps a
//! [`trapline_platformer::LevelSession`] at a fixed tick rate, either back to
//! back on a simulated clock or paced in real time on a tokio interval.

pub mod config;
pub mod levels;
pub mod run;
pub mod script;

pub use config::RunnerConfig;
pub use levels::DirectoryLevels;
pub use run::{RunSummary, Runner};
pub use script::{InputScript, ScriptError, ScriptSegment};
