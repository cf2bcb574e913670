//! Level layouts: the placed-object description a map loader hands the core.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use trapline_core::art::ArtContext;

use crate::config::{PlatformerConfig, WorldConfig};
use crate::objects::{ObjectKind, SpikeOrientation, WorldObject};

/// Default fire size in pixels.
const FIRE_SIZE: (f32, f32) = (16.0, 32.0);
/// Default checkpoint and end marker size.
const MARKER_SIZE: (f32, f32) = (128.0, 128.0);
/// Default breakable box size.
const BOX_SIZE: (f32, f32) = (56.0, 48.0);
/// Largest explicit width or height a placement may ask for.
pub const MAX_OBJECT_SIZE: f32 = 4096.0;

#[derive(Debug)]
pub enum LevelError {
    Io(String),
    Parse(String),
    UnsupportedFormat(String),
    Empty,
    /// Object at this index has a size that is not positive or exceeds `MAX_OBJECT_SIZE`.
    BadSize { index: usize, width: f32, height: f32 },
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read level: {e}"),
            Self::Parse(e) => write!(f, "failed to parse level: {e}"),
            Self::UnsupportedFormat(ext) => write!(f, "unsupported level format: {ext}"),
            Self::Empty => write!(f, "level has no objects"),
            Self::BadSize {
                index,
                width,
                height,
            } => write!(f, "object {index} has unusable size {width}x{height}"),
        }
    }
}

impl std::error::Error for LevelError {}

/// Loosely typed map property. Map editors write numbers and booleans as
/// either native values or strings, so both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(i) => Some(*i != 0),
            Self::Float(_) => None,
            Self::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Some(true),
                "0" | "false" | "no" | "off" | "" => Some(false),
                _ => None,
            },
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int(i) => u64::try_from(*i).ok(),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(_) | Self::Float(_) => None,
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(x) => x.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// One object in a layout. Coordinates are the top-left corner in world
/// pixels; a missing size takes the kind's default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub kind: ObjectKind,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Placement {
    pub fn new(kind: ObjectKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            width: None,
            height: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_property(mut self, key: &str, value: PropertyValue) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }

    fn size(&self, world: &WorldConfig) -> (f32, f32) {
        let (w, h) = match self.kind {
            ObjectKind::Fire => FIRE_SIZE,
            ObjectKind::Checkpoint | ObjectKind::End => MARKER_SIZE,
            ObjectKind::Box => BOX_SIZE,
            ObjectKind::Block
            | ObjectKind::Trap
            | ObjectKind::Appear
            | ObjectKind::Spike
            | ObjectKind::Tile => (world.block_size, world.block_size),
        };
        (self.width.unwrap_or(w), self.height.unwrap_or(h))
    }

    /// Boolean property, or `default` when absent or unreadable.
    fn flag(&self, key: &str, default: bool) -> bool {
        match self.properties.get(key) {
            None => default,
            Some(value) => value.as_bool().unwrap_or_else(|| {
                tracing::warn!(kind = ?self.kind, key, ?value, "ignoring malformed property");
                default
            }),
        }
    }

    fn millis(&self, key: &str, default: u64) -> u64 {
        match self.properties.get(key) {
            None => default,
            Some(value) => value.as_u64().unwrap_or_else(|| {
                tracing::warn!(kind = ?self.kind, key, ?value, "ignoring malformed property");
                default
            }),
        }
    }

    /// Build the world object this placement describes.
    pub fn build(&self, art: &ArtContext, config: &PlatformerConfig) -> WorldObject {
        let (w, h) = self.size(&config.world);
        let (x, y) = (self.x, self.y);
        match self.kind {
            ObjectKind::Block => WorldObject::block(x, y, w),
            ObjectKind::Tile => WorldObject::tile(x, y, w, h),
            ObjectKind::Trap => WorldObject::disappearing_block(x, y, w, h, self.millis("respawn_ms", 0)),
            ObjectKind::Appear => WorldObject::appearing_block(x, y, w, h),
            ObjectKind::Fire => WorldObject::fire(x, y, w, h, self.flag("on", true), art),
            ObjectKind::Spike => {
                let orientation = self
                    .properties
                    .get("orientation")
                    .map(|v| SpikeOrientation::from_property(&v.as_text()))
                    .unwrap_or_default();
                if self.flag("hidden", false) {
                    let reveal_ms = self.millis("reveal_ms", config.timing.hidden_spike_reveal_ms);
                    WorldObject::hidden_spike(x, y, w, h, orientation, reveal_ms, art)
                } else {
                    WorldObject::spike(x, y, w, h, orientation, art)
                }
            },
            ObjectKind::Checkpoint => WorldObject::checkpoint(x, y, w, h, art),
            ObjectKind::End => WorldObject::end(x, y, w, h, art),
            ObjectKind::Box => WorldObject::breakable_box(x, y, w, h, art),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    pub x: f32,
    pub y: f32,
}

/// A complete level: optional name and spawn plus every placed object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub spawn: Option<Spawn>,
    #[serde(default, rename = "object")]
    pub objects: Vec<Placement>,
}

/// Objects and spawn point ready for a session.
#[derive(Debug, Clone)]
pub struct BuiltLevel {
    pub name: String,
    pub spawn: (f32, f32),
    pub objects: Vec<WorldObject>,
}

impl LevelLayout {
    pub fn from_toml_str(content: &str) -> Result<Self, LevelError> {
        toml::from_str::<Self>(content)
            .map_err(|e| LevelError::Parse(e.to_string()))?
            .validated()
    }

    pub fn from_json_str(content: &str) -> Result<Self, LevelError> {
        serde_json::from_str::<Self>(content)
            .map_err(|e| LevelError::Parse(e.to_string()))?
            .validated()
    }

    /// Read a `.toml` or `.json` layout from disk.
    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LevelError::Io(format!("{}: {e}", path.display())))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(LevelError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    fn validated(self) -> Result<Self, LevelError> {
        if self.objects.is_empty() {
            return Err(LevelError::Empty);
        }
        let usable = |v: Option<f32>| v.is_none_or(|v| v.is_finite() && v > 0.0 && v <= MAX_OBJECT_SIZE);
        if let Some(index) = self
            .objects
            .iter()
            .position(|p| !usable(p.width) || !usable(p.height))
        {
            let p = &self.objects[index];
            return Err(LevelError::BadSize {
                index,
                width: p.width.unwrap_or(0.0),
                height: p.height.unwrap_or(0.0),
            });
        }
        Ok(self)
    }

    /// The hardcoded fallback level: a long floor, two raised blocks, a fire
    /// on the floor, a checkpoint past the fire and an end marker.
    pub fn builtin(world: &WorldConfig) -> Self {
        let bs = world.block_size;
        let floor_y = world.view_height - bs;
        let first = (-world.view_width / bs).floor() as i32;
        let last = (world.view_width * 2.0 / bs).floor() as i32;

        let mut objects: Vec<Placement> = (first..last)
            .map(|i| Placement::new(ObjectKind::Block, i as f32 * bs, floor_y))
            .collect();
        objects.push(Placement::new(ObjectKind::Block, 0.0, world.view_height - bs * 2.0));
        objects.push(Placement::new(ObjectKind::Block, bs * 3.0, world.view_height - bs * 4.0));
        objects.push(Placement::new(
            ObjectKind::Fire,
            bs * 7.0,
            floor_y - FIRE_SIZE.1,
        ));
        objects.push(Placement::new(
            ObjectKind::Checkpoint,
            bs * 9.0,
            floor_y - MARKER_SIZE.1,
        ));
        objects.push(Placement::new(
            ObjectKind::End,
            (last - 2) as f32 * bs,
            floor_y - MARKER_SIZE.1,
        ));

        Self {
            name: "builtin".to_string(),
            spawn: Some(Spawn {
                x: world.default_spawn_x,
                y: world.default_spawn_y,
            }),
            objects,
        }
    }

    pub fn build(&self, art: &ArtContext, config: &PlatformerConfig) -> BuiltLevel {
        let spawn = self.spawn.map_or(
            (config.world.default_spawn_x, config.world.default_spawn_y),
            |s| (s.x, s.y),
        );
        BuiltLevel {
            name: self.name.clone(),
            spawn,
            objects: self.objects.iter().map(|p| p.build(art, config)).collect(),
        }
    }
}

/// Supplies layouts by level index.
pub trait LevelSource {
    /// Layout for `index`, or `None` when there is no such level.
    fn layout(&self, index: usize) -> Option<LevelLayout>;
}

/// Serves the hardcoded layout as level 0 only.
#[derive(Debug, Clone, Default)]
pub struct BuiltinLevels {
    pub world: WorldConfig,
}

impl LevelSource for BuiltinLevels {
    fn layout(&self, index: usize) -> Option<LevelLayout> {
        (index == 0).then(|| LevelLayout::builtin(&self.world))
    }
}

/// Fixed list of layouts, e.g. loaded up front by a host.
impl LevelSource for Vec<LevelLayout> {
    fn layout(&self, index: usize) -> Option<LevelLayout> {
        self.get(index).cloned()
    }
}

/// Layout for `index`, falling back to the builtin layout when the source has none.
pub fn layout_or_builtin(source: &dyn LevelSource, index: usize, world: &WorldConfig) -> LevelLayout {
    source.layout(index).unwrap_or_else(|| {
        tracing::warn!(index, "level unavailable, using builtin layout");
        LevelLayout::builtin(world)
    })
}
