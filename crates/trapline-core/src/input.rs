use serde::{Deserialize, Serialize};

/// Directional and action intents active for one tick.
///
/// `left`/`right` are held states. `jump`, `restart` and `next_level` are
/// edges: true only on the tick the action was requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputIntents {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub restart: bool,
    pub next_level: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_false() {
        let intents: InputIntents = serde_json::from_str(r#"{"right": true}"#).unwrap();
        assert!(intents.right);
        assert!(!intents.jump);
    }
}
