use serde::{Deserialize, Serialize};

use crate::time::Millis;

/// Index of a world object in its level's object list.
pub type ObjectId = usize;

/// Why the player died.
///
/// Variants are declared in ascending precedence, so `Ord` picks the cause to
/// report when several apply on the same tick: spike > fire > fall > hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeathCause {
    Hazard,
    Fall,
    Fire,
    Spike,
}

impl DeathCause {
    /// Keep whichever of `current` and `incoming` has the higher precedence.
    pub fn strongest(current: Option<DeathCause>, incoming: DeathCause) -> DeathCause {
        match current {
            Some(c) => c.max(incoming),
            None => incoming,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeathCause::Hazard => "hazard",
            DeathCause::Fall => "fall",
            DeathCause::Fire => "fire",
            DeathCause::Spike => "spike",
        }
    }
}

impl std::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gameplay events emitted during a tick, for HUD, audio cues and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted {
        index: usize,
    },
    Jumped {
        jump_count: u8,
    },
    TrapTriggered {
        object: ObjectId,
    },
    BlockAppeared {
        object: ObjectId,
    },
    SpikeRevealed {
        object: ObjectId,
    },
    BoxBroken {
        object: ObjectId,
    },
    CheckpointReached {
        object: ObjectId,
        respawn_x: f32,
        respawn_y: f32,
    },
    EndReached {
        object: ObjectId,
    },
    PlayerDied {
        cause: DeathCause,
        deaths: u32,
    },
    Respawned {
        x: f32,
        y: f32,
    },
    LevelCompleted {
        elapsed_ms: Millis,
        deaths: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_order() {
        assert!(DeathCause::Spike > DeathCause::Fire);
        assert!(DeathCause::Fire > DeathCause::Fall);
        assert!(DeathCause::Fall > DeathCause::Hazard);
    }

    #[test]
    fn strongest_keeps_higher_cause() {
        assert_eq!(
            DeathCause::strongest(Some(DeathCause::Spike), DeathCause::Fire),
            DeathCause::Spike
        );
        assert_eq!(
            DeathCause::strongest(Some(DeathCause::Fall), DeathCause::Fire),
            DeathCause::Fire
        );
        assert_eq!(
            DeathCause::strongest(None, DeathCause::Hazard),
            DeathCause::Hazard
        );
    }

    #[test]
    fn cause_serializes_lowercase() {
        let json = serde_json::to_string(&DeathCause::Spike).unwrap();
        assert_eq!(json, "\"spike\"");
    }
}
