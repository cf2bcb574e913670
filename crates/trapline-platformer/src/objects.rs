use std::sync::Arc;

use serde::{Deserialize, Serialize};

use trapline_core::art::{ArtContext, SpriteRef, Visual, looping_frame, sheets};
use trapline_core::geometry::{Anchor, Mask, Rect};
use trapline_core::time::{Millis, elapsed_since};

use crate::config::PlatformerConfig;

/// Tag naming what a world object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Block,
    Trap,
    Appear,
    Fire,
    Spike,
    Checkpoint,
    End,
    Box,
    Tile,
}

/// How an object interacts with the player this frame. Exactly one holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactClass {
    Solid,
    Hazard,
    Inert,
}

/// Which way a spike points. A downward spike hangs from a ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpikeOrientation {
    #[default]
    Up,
    Down,
}

impl SpikeOrientation {
    /// Parse a map property. Anything unrecognised points up.
    pub fn from_property(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "down" | "top" => SpikeOrientation::Down,
            _ => SpikeOrientation::Up,
        }
    }

    /// The edge a hidden spike grows from.
    fn reveal_anchor(&self) -> Anchor {
        match self {
            SpikeOrientation::Up => Anchor::Bottom,
            SpikeOrientation::Down => Anchor::Top,
        }
    }
}

/// Solid until touched, then gone; optionally comes back after `respawn_ms`.
#[derive(Debug, Clone, PartialEq)]
pub struct DisappearingBlock {
    pub triggered: bool,
    pub trigger_time: Option<Millis>,
    /// 0 means the block never comes back.
    pub respawn_ms: u64,
}

/// Invisible and non-solid until the player's rect overlaps it.
#[derive(Debug, Clone, PartialEq)]
pub struct AppearingBlock {
    pub triggered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fire {
    pub burning: bool,
    initially_burning: bool,
}

impl Fire {
    pub fn animation_name(&self) -> &'static str {
        if self.burning { "on" } else { "off" }
    }

    fn sheet(&self) -> &'static str {
        if self.burning {
            sheets::FIRE_ON
        } else {
            sheets::FIRE_OFF
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spike {
    pub orientation: SpikeOrientation,
}

/// Spike that rises out of its hidden edge when first touched.
#[derive(Debug, Clone, PartialEq)]
pub struct HiddenSpike {
    pub orientation: SpikeOrientation,
    pub triggered: bool,
    pub start_time: Option<Millis>,
    /// Set once the reveal has fully played out.
    pub active_hazard: bool,
    pub reveal_ms: u64,
    base_mask: Arc<Mask>,
    sprite: SpriteRef,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointState {
    #[default]
    NoFlag,
    FlagOut,
    Idle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub state: CheckpointState,
    pub activated: bool,
    pub activated_at: Option<Millis>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndMarker {
    pub activated: bool,
    pub activated_at: Option<Millis>,
}

/// Solid crate that shatters when landed on from above.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakableBox {
    pub broken: bool,
    pub broken_at: Option<Millis>,
    has_break_art: bool,
}

/// Kind-specific state.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectBody {
    Block,
    Tile,
    Trap(DisappearingBlock),
    Appear(AppearingBlock),
    Fire(Fire),
    Spike(Spike),
    HiddenSpike(HiddenSpike),
    Checkpoint(Checkpoint),
    End(EndMarker),
    Box(BreakableBox),
}

/// Current collision mask and visual of an object.
#[derive(Debug, Clone, PartialEq)]
struct Look {
    mask: Arc<Mask>,
    visual: Visual,
}

impl Look {
    fn hidden(rect: &Rect) -> Self {
        Self {
            mask: Arc::new(empty_mask(rect)),
            visual: Visual::Hidden,
        }
    }
}

fn mask_size(rect: &Rect) -> (u32, u32) {
    (rect.w.max(0.0) as u32, rect.h.max(0.0) as u32)
}

fn empty_mask(rect: &Rect) -> Mask {
    let (w, h) = mask_size(rect);
    Mask::empty(w, h)
}

fn filled_mask(rect: &Rect) -> Mask {
    let (w, h) = mask_size(rect);
    Mask::filled(w, h)
}

/// Frame mask from `art` sized to `rect`, or `fallback` when the sheet is missing.
fn art_mask(art: &ArtContext, sheet: &str, frame: usize, rect: &Rect, fallback: Mask) -> Arc<Mask> {
    let (w, h) = mask_size(rect);
    art.frame_mask_sized(sheet, frame, w, h)
        .unwrap_or_else(|| Arc::new(fallback))
}

/// A placed level object: geometry, current look, and kind-specific state.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldObject {
    rect: Rect,
    look: Look,
    initial_look: Look,
    body: ObjectBody,
}

impl WorldObject {
    fn with_look(rect: Rect, look: Look, body: ObjectBody) -> Self {
        Self {
            rect,
            initial_look: look.clone(),
            look,
            body,
        }
    }

    /// Square terrain block.
    pub fn block(x: f32, y: f32, size: f32) -> Self {
        let rect = Rect::new(x, y, size, size);
        let look = Look {
            mask: Arc::new(filled_mask(&rect)),
            visual: Visual::Sprite(SpriteRef::new(sheets::TERRAIN, 0)),
        };
        Self::with_look(rect, look, ObjectBody::Block)
    }

    /// Solid map tile.
    pub fn tile(x: f32, y: f32, width: f32, height: f32) -> Self {
        let rect = Rect::new(x, y, width, height);
        let look = Look {
            mask: Arc::new(filled_mask(&rect)),
            visual: Visual::Sprite(SpriteRef::new(sheets::TERRAIN, 0)),
        };
        Self::with_look(rect, look, ObjectBody::Tile)
    }

    pub fn disappearing_block(x: f32, y: f32, width: f32, height: f32, respawn_ms: u64) -> Self {
        let rect = Rect::new(x, y, width, height);
        let look = Look {
            mask: Arc::new(filled_mask(&rect)),
            visual: Visual::Sprite(SpriteRef::new(sheets::TERRAIN, 0)),
        };
        Self::with_look(
            rect,
            look,
            ObjectBody::Trap(DisappearingBlock {
                triggered: false,
                trigger_time: None,
                respawn_ms,
            }),
        )
    }

    pub fn appearing_block(x: f32, y: f32, width: f32, height: f32) -> Self {
        let rect = Rect::new(x, y, width, height);
        Self::with_look(
            rect,
            Look::hidden(&rect),
            ObjectBody::Appear(AppearingBlock { triggered: false }),
        )
    }

    pub fn fire(x: f32, y: f32, width: f32, height: f32, burning: bool, art: &ArtContext) -> Self {
        let rect = Rect::new(x, y, width, height);
        let fire = Fire {
            burning,
            initially_burning: burning,
        };
        let look = Look {
            mask: art_mask(art, fire.sheet(), 0, &rect, filled_mask(&rect)),
            visual: Visual::Sprite(SpriteRef::new(fire.sheet(), 0)),
        };
        Self::with_look(rect, look, ObjectBody::Fire(fire))
    }

    pub fn spike(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        orientation: SpikeOrientation,
        art: &ArtContext,
    ) -> Self {
        let rect = Rect::new(x, y, width, height);
        let (mask, sprite) = spike_art(art, &rect, orientation);
        let look = Look {
            mask,
            visual: Visual::Sprite(sprite),
        };
        Self::with_look(rect, look, ObjectBody::Spike(Spike { orientation }))
    }

    pub fn hidden_spike(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        orientation: SpikeOrientation,
        reveal_ms: u64,
        art: &ArtContext,
    ) -> Self {
        let rect = Rect::new(x, y, width, height);
        let (base_mask, sprite) = spike_art(art, &rect, orientation);
        Self::with_look(
            rect,
            Look::hidden(&rect),
            ObjectBody::HiddenSpike(HiddenSpike {
                orientation,
                triggered: false,
                start_time: None,
                active_hazard: false,
                reveal_ms,
                base_mask,
                sprite,
            }),
        )
    }

    pub fn checkpoint(x: f32, y: f32, width: f32, height: f32, art: &ArtContext) -> Self {
        let rect = Rect::new(x, y, width, height);
        let look = Look {
            mask: art_mask(art, sheets::CHECKPOINT_NO_FLAG, 0, &rect, filled_mask(&rect)),
            visual: Visual::Sprite(SpriteRef::new(sheets::CHECKPOINT_NO_FLAG, 0)),
        };
        Self::with_look(
            rect,
            look,
            ObjectBody::Checkpoint(Checkpoint {
                state: CheckpointState::NoFlag,
                activated: false,
                activated_at: None,
            }),
        )
    }

    pub fn end(x: f32, y: f32, width: f32, height: f32, art: &ArtContext) -> Self {
        let rect = Rect::new(x, y, width, height);
        let look = Look {
            mask: art_mask(art, sheets::END_IDLE, 0, &rect, filled_mask(&rect)),
            visual: Visual::Sprite(SpriteRef::new(sheets::END_IDLE, 0)),
        };
        Self::with_look(
            rect,
            look,
            ObjectBody::End(EndMarker {
                activated: false,
                activated_at: None,
            }),
        )
    }

    pub fn breakable_box(x: f32, y: f32, width: f32, height: f32, art: &ArtContext) -> Self {
        let rect = Rect::new(x, y, width, height);
        let look = Look {
            mask: Arc::new(filled_mask(&rect)),
            visual: Visual::Sprite(SpriteRef::new(sheets::BOX_IDLE, 0)),
        };
        Self::with_look(
            rect,
            look,
            ObjectBody::Box(BreakableBox {
                broken: false,
                broken_at: None,
                has_break_art: art.frame_count(sheets::BOX_BREAK) > 0,
            }),
        )
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn mask(&self) -> &Mask {
        &self.look.mask
    }

    pub fn visual(&self) -> Visual {
        self.look.visual
    }

    pub fn body(&self) -> &ObjectBody {
        &self.body
    }

    pub fn kind(&self) -> ObjectKind {
        match &self.body {
            ObjectBody::Block => ObjectKind::Block,
            ObjectBody::Tile => ObjectKind::Tile,
            ObjectBody::Trap(_) => ObjectKind::Trap,
            ObjectBody::Appear(_) => ObjectKind::Appear,
            ObjectBody::Fire(_) => ObjectKind::Fire,
            ObjectBody::Spike(_) | ObjectBody::HiddenSpike(_) => ObjectKind::Spike,
            ObjectBody::Checkpoint(_) => ObjectKind::Checkpoint,
            ObjectBody::End(_) => ObjectKind::End,
            ObjectBody::Box(_) => ObjectKind::Box,
        }
    }

    pub fn is_solid(&self) -> bool {
        match &self.body {
            ObjectBody::Block | ObjectBody::Tile => true,
            ObjectBody::Trap(t) => !t.triggered,
            ObjectBody::Appear(a) => a.triggered,
            ObjectBody::Box(b) => !b.broken,
            ObjectBody::Fire(_)
            | ObjectBody::Spike(_)
            | ObjectBody::HiddenSpike(_)
            | ObjectBody::Checkpoint(_)
            | ObjectBody::End(_) => false,
        }
    }

    /// Whether touching this object hurts the player.
    pub fn is_hazard(&self) -> bool {
        match &self.body {
            ObjectBody::Spike(_) | ObjectBody::HiddenSpike(_) => true,
            ObjectBody::Fire(f) => f.burning,
            _ => false,
        }
    }

    pub fn contact_class(&self) -> ContactClass {
        if self.is_solid() {
            ContactClass::Solid
        } else if self.is_hazard() {
            ContactClass::Hazard
        } else {
            ContactClass::Inert
        }
    }

    /// Non-solid objects whose contact still matters and must be re-scanned
    /// every tick: spikes, burning fire, checkpoints and end markers.
    pub fn reacts_to_overlap(&self) -> bool {
        match &self.body {
            ObjectBody::Spike(_)
            | ObjectBody::HiddenSpike(_)
            | ObjectBody::Checkpoint(_)
            | ObjectBody::End(_) => true,
            ObjectBody::Fire(f) => f.burning,
            _ => false,
        }
    }

    /// Whether the object has been triggered (or broken, or activated).
    pub fn is_triggered(&self) -> bool {
        match &self.body {
            ObjectBody::Trap(t) => t.triggered,
            ObjectBody::Appear(a) => a.triggered,
            ObjectBody::HiddenSpike(s) => s.triggered,
            ObjectBody::Checkpoint(c) => c.activated,
            ObjectBody::End(e) => e.activated,
            ObjectBody::Box(b) => b.broken,
            _ => false,
        }
    }

    /// Activate the object's reactive behaviour. Returns true only when this
    /// call changed state; re-triggering is a no-op.
    pub fn trigger(&mut self, now: Millis) -> bool {
        match &mut self.body {
            ObjectBody::Trap(trap) => {
                if trap.triggered {
                    return false;
                }
                trap.triggered = true;
                trap.trigger_time = Some(now);
                self.look = Look::hidden(&self.rect);
                true
            },
            ObjectBody::Appear(appear) => {
                if appear.triggered {
                    return false;
                }
                appear.triggered = true;
                self.look = Look {
                    mask: Arc::new(filled_mask(&self.rect)),
                    visual: Visual::Sprite(SpriteRef::new(sheets::TERRAIN, 0)),
                };
                true
            },
            ObjectBody::HiddenSpike(spike) => {
                if spike.triggered {
                    return false;
                }
                spike.triggered = true;
                spike.start_time = Some(now);
                true
            },
            ObjectBody::Checkpoint(cp) => {
                if cp.activated {
                    return false;
                }
                cp.activated = true;
                cp.activated_at = Some(now);
                cp.state = CheckpointState::FlagOut;
                self.look.visual = Visual::Sprite(SpriteRef::new(sheets::CHECKPOINT_FLAG_OUT, 0));
                true
            },
            ObjectBody::End(end) => {
                if end.activated {
                    return false;
                }
                end.activated = true;
                end.activated_at = Some(now);
                self.look.visual = Visual::Sprite(SpriteRef::new(sheets::END_PRESSED, 0));
                true
            },
            ObjectBody::Box(crate_) => {
                if crate_.broken {
                    return false;
                }
                crate_.broken = true;
                crate_.broken_at = Some(now);
                self.look = if crate_.has_break_art {
                    Look {
                        mask: Arc::new(empty_mask(&self.rect)),
                        visual: Visual::Sprite(SpriteRef::new(sheets::BOX_BREAK, 0)),
                    }
                } else {
                    Look::hidden(&self.rect)
                };
                true
            },
            ObjectBody::Block
            | ObjectBody::Tile
            | ObjectBody::Fire(_)
            | ObjectBody::Spike(_) => false,
        }
    }

    /// Turn a fire on or off. No effect on other kinds.
    pub fn set_burning(&mut self, burning: bool) {
        if let ObjectBody::Fire(fire) = &mut self.body {
            fire.burning = burning;
        }
    }

    /// Advance time-driven animation and solidity.
    pub fn update(&mut self, now: Millis, art: &ArtContext, config: &PlatformerConfig) {
        let frame_ms = config.physics.animation_frame_ms();
        let timing = &config.timing;
        let rect = self.rect;

        match &mut self.body {
            ObjectBody::Trap(trap) => {
                let Some(at) = trap.trigger_time else {
                    return;
                };
                if trap.respawn_ms > 0 && elapsed_since(at, now) >= trap.respawn_ms {
                    trap.triggered = false;
                    trap.trigger_time = None;
                    self.look = self.initial_look.clone();
                }
            },
            ObjectBody::Fire(fire) => {
                let sheet = fire.sheet();
                let frame = looping_frame(now, frame_ms, art.frame_count(sheet));
                self.look.visual = Visual::Sprite(SpriteRef::new(sheet, frame));
                if let Some(mask) = art.frame_mask_sized(sheet, frame, rect.w as u32, rect.h as u32) {
                    self.look.mask = mask;
                }
            },
            ObjectBody::HiddenSpike(spike) => {
                let Some(start) = spike.start_time else {
                    return;
                };
                let t = if spike.reveal_ms == 0 {
                    1.0
                } else {
                    (elapsed_since(start, now) as f32 / spike.reveal_ms as f32).clamp(0.0, 1.0)
                };
                let visible = ((rect.h * t) as u32).max(1);
                let anchor = spike.orientation.reveal_anchor();
                self.look = Look {
                    mask: Arc::new(spike.base_mask.revealed(visible, anchor)),
                    visual: Visual::Revealed {
                        sprite: spike.sprite,
                        visible_height: visible,
                        anchor,
                    },
                };
                if t >= 1.0 {
                    spike.active_hazard = true;
                }
            },
            ObjectBody::Checkpoint(cp) => {
                let Some(at) = cp.activated_at else {
                    return;
                };
                let elapsed = elapsed_since(at, now);
                let flag_out_frames = art.frame_count(sheets::CHECKPOINT_FLAG_OUT);
                let flag_out_ms = (flag_out_frames as f32 * frame_ms) as Millis;
                let (sheet, frame) = if elapsed < flag_out_ms {
                    cp.state = CheckpointState::FlagOut;
                    (
                        sheets::CHECKPOINT_FLAG_OUT,
                        (elapsed as f32 / frame_ms) as usize,
                    )
                } else {
                    cp.state = CheckpointState::Idle;
                    let frames = art.frame_count(sheets::CHECKPOINT_IDLE);
                    (
                        sheets::CHECKPOINT_IDLE,
                        looping_frame(elapsed - flag_out_ms, frame_ms, frames),
                    )
                };
                self.look.visual = Visual::Sprite(SpriteRef::new(sheet, frame));
                if let Some(mask) = art.frame_mask_sized(sheet, frame, rect.w as u32, rect.h as u32) {
                    self.look.mask = mask;
                }
            },
            ObjectBody::End(end) => {
                let Some(at) = end.activated_at else {
                    return;
                };
                let elapsed = elapsed_since(at, now);
                let interval = timing.end_blink_interval_ms.max(1);
                let pressed = elapsed < timing.end_blink_ms && (elapsed / interval) % 2 == 0;
                let (sheet, frame) = if pressed {
                    let frames = art.frame_count(sheets::END_PRESSED);
                    (sheets::END_PRESSED, looping_frame(elapsed, frame_ms, frames))
                } else {
                    (sheets::END_IDLE, 0)
                };
                self.look.visual = Visual::Sprite(SpriteRef::new(sheet, frame));
            },
            ObjectBody::Box(crate_) => {
                let Some(at) = crate_.broken_at else {
                    return;
                };
                let elapsed = elapsed_since(at, now);
                if !crate_.has_break_art || elapsed >= timing.box_break_ms {
                    self.look.visual = Visual::Hidden;
                } else {
                    let frames = art.frame_count(sheets::BOX_BREAK);
                    let frame = (elapsed as usize * frames) / timing.box_break_ms.max(1) as usize;
                    self.look.visual = Visual::Sprite(SpriteRef::new(sheets::BOX_BREAK, frame));
                }
            },
            ObjectBody::Block | ObjectBody::Tile | ObjectBody::Appear(_) | ObjectBody::Spike(_) => {},
        }
    }

    /// Restore the pristine, pre-trigger state.
    pub fn reset(&mut self) {
        match &mut self.body {
            ObjectBody::Trap(trap) => {
                trap.triggered = false;
                trap.trigger_time = None;
            },
            ObjectBody::Appear(appear) => appear.triggered = false,
            ObjectBody::Fire(fire) => fire.burning = fire.initially_burning,
            ObjectBody::HiddenSpike(spike) => {
                spike.triggered = false;
                spike.start_time = None;
                spike.active_hazard = false;
            },
            ObjectBody::Checkpoint(cp) => {
                cp.state = CheckpointState::NoFlag;
                cp.activated = false;
                cp.activated_at = None;
            },
            ObjectBody::End(end) => {
                end.activated = false;
                end.activated_at = None;
            },
            ObjectBody::Box(crate_) => {
                crate_.broken = false;
                crate_.broken_at = None;
            },
            ObjectBody::Block | ObjectBody::Tile | ObjectBody::Spike(_) => {},
        }
        self.look = self.initial_look.clone();
    }

    /// Where the player should stand when respawning at this object:
    /// horizontally centred, feet on the object's base.
    pub fn respawn_point(&self, player_width: f32, player_height: f32) -> (f32, f32) {
        (
            self.rect.center_x() - player_width / 2.0,
            self.rect.bottom() - player_height,
        )
    }
}

fn spike_art(art: &ArtContext, rect: &Rect, orientation: SpikeOrientation) -> (Arc<Mask>, SpriteRef) {
    let (w, h) = mask_size(rect);
    let upright = art
        .frame_mask_sized(sheets::SPIKE, 0, w, h)
        .map(|m| (*m).clone())
        .unwrap_or_else(|| Mask::from_fn(w, h, |_, y| y >= h / 2));
    let flipped = orientation == SpikeOrientation::Down;
    let mask = if flipped {
        upright.flipped_vertical()
    } else {
        upright
    };
    let sprite = SpriteRef {
        sheet: sheets::SPIKE,
        frame: 0,
        flip_x: false,
        flip_y: flipped,
    };
    (Arc::new(mask), sprite)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art() -> ArtContext {
        ArtContext::builtin()
    }

    fn config() -> PlatformerConfig {
        PlatformerConfig::default()
    }

    /// One of every stateful kind.
    fn stateful_objects(art: &ArtContext) -> Vec<WorldObject> {
        vec![
            WorldObject::disappearing_block(0.0, 0.0, 96.0, 96.0, 0),
            WorldObject::disappearing_block(0.0, 0.0, 96.0, 96.0, 2000),
            WorldObject::appearing_block(0.0, 0.0, 96.0, 96.0),
            WorldObject::hidden_spike(0.0, 0.0, 96.0, 48.0, SpikeOrientation::Up, 250, art),
            WorldObject::hidden_spike(0.0, 0.0, 96.0, 48.0, SpikeOrientation::Down, 250, art),
            WorldObject::checkpoint(0.0, 0.0, 128.0, 128.0, art),
            WorldObject::end(0.0, 0.0, 128.0, 128.0, art),
            WorldObject::breakable_box(0.0, 0.0, 56.0, 48.0, art),
        ]
    }

    #[test]
    fn kinds_are_tagged() {
        let art = art();
        assert_eq!(WorldObject::block(0.0, 0.0, 96.0).kind(), ObjectKind::Block);
        assert_eq!(WorldObject::tile(0.0, 0.0, 32.0, 32.0).kind(), ObjectKind::Tile);
        assert_eq!(
            WorldObject::hidden_spike(0.0, 0.0, 32.0, 32.0, SpikeOrientation::Up, 250, &art)
                .kind(),
            ObjectKind::Spike
        );
        assert_eq!(
            WorldObject::fire(0.0, 0.0, 16.0, 32.0, true, &art).kind(),
            ObjectKind::Fire
        );
    }

    #[test]
    fn contact_class_is_exclusive() {
        let art = art();
        let mut objects = stateful_objects(&art);
        objects.push(WorldObject::block(0.0, 0.0, 96.0));
        objects.push(WorldObject::spike(0.0, 0.0, 32.0, 32.0, SpikeOrientation::Up, &art));
        objects.push(WorldObject::fire(0.0, 0.0, 16.0, 32.0, true, &art));
        objects.push(WorldObject::fire(0.0, 0.0, 16.0, 32.0, false, &art));

        let check = |obj: &WorldObject| {
            let expected = match (obj.is_solid(), obj.is_hazard()) {
                (true, false) => ContactClass::Solid,
                (false, true) => ContactClass::Hazard,
                (false, false) => ContactClass::Inert,
                (true, true) => panic!("{:?} is both solid and a hazard", obj.kind()),
            };
            assert_eq!(obj.contact_class(), expected, "{:?}", obj.kind());
        };

        for mut obj in objects {
            check(&obj);
            for now in [0, 100, 5000] {
                obj.trigger(now);
                check(&obj);
                obj.update(now, &art, &config());
                check(&obj);
            }
            obj.reset();
            check(&obj);
        }
    }

    #[test]
    fn contact_class_follows_state() {
        let art = art();
        let mut trap = WorldObject::disappearing_block(0.0, 0.0, 96.0, 96.0, 2000);
        let mut appear = WorldObject::appearing_block(0.0, 0.0, 96.0, 96.0);
        let mut fire = WorldObject::fire(0.0, 0.0, 16.0, 32.0, true, &art);
        assert_eq!(trap.contact_class(), ContactClass::Solid);
        assert_eq!(appear.contact_class(), ContactClass::Inert);
        assert_eq!(fire.contact_class(), ContactClass::Hazard);

        trap.trigger(0);
        appear.trigger(0);
        fire.set_burning(false);
        assert_eq!(trap.contact_class(), ContactClass::Inert);
        assert_eq!(appear.contact_class(), ContactClass::Solid);
        assert_eq!(fire.contact_class(), ContactClass::Inert);
        assert_eq!(
            WorldObject::checkpoint(0.0, 0.0, 128.0, 128.0, &art).contact_class(),
            ContactClass::Inert
        );
    }

    #[test]
    fn trigger_is_idempotent() {
        let art = art();
        for mut obj in stateful_objects(&art) {
            assert!(obj.trigger(100), "{:?} should trigger", obj.kind());
            let once = obj.clone();
            assert!(!obj.trigger(400));
            assert_eq!(obj, once, "{:?} changed on re-trigger", obj.kind());
        }
    }

    #[test]
    fn static_objects_ignore_triggers() {
        let art = art();
        let mut block = WorldObject::block(0.0, 0.0, 96.0);
        let mut spike = WorldObject::spike(0.0, 0.0, 32.0, 32.0, SpikeOrientation::Up, &art);
        assert!(!block.trigger(0));
        assert!(!spike.trigger(0));
        assert!(block.is_solid());
        assert!(spike.is_hazard());
    }

    #[test]
    fn reset_restores_pristine_state() {
        let art = art();
        let cfg = config();
        for mut obj in stateful_objects(&art) {
            let pristine = obj.clone();
            obj.trigger(1000);
            for now in [1000, 1100, 1300, 2600, 4000] {
                obj.update(now, &art, &cfg);
            }
            obj.reset();
            assert_eq!(obj, pristine, "{:?} not restored", obj.kind());
        }
    }

    #[test]
    fn fire_reset_restores_initial_flame() {
        let art = art();
        let cfg = config();
        let mut fire = WorldObject::fire(0.0, 0.0, 16.0, 32.0, true, &art);
        let pristine = fire.clone();
        fire.set_burning(false);
        fire.update(130, &art, &cfg);
        assert!(!fire.is_hazard());
        fire.reset();
        assert_eq!(fire, pristine);
        assert!(fire.is_hazard());
    }

    #[test]
    fn fire_animation_is_time_driven() {
        let art = art();
        let cfg = config();
        let mut fire = WorldObject::fire(0.0, 0.0, 16.0, 32.0, true, &art);
        fire.update(0, &art, &cfg);
        assert_eq!(fire.visual(), Visual::Sprite(SpriteRef::new(sheets::FIRE_ON, 0)));
        fire.update(60, &art, &cfg);
        assert_eq!(fire.visual(), Visual::Sprite(SpriteRef::new(sheets::FIRE_ON, 1)));
        if let ObjectBody::Fire(f) = fire.body() {
            assert_eq!(f.animation_name(), "on");
        }
    }

    #[test]
    fn disappearing_block_vanishes_immediately() {
        let mut trap = WorldObject::disappearing_block(0.0, 0.0, 96.0, 96.0, 0);
        assert!(trap.is_solid());
        trap.trigger(10);
        assert!(!trap.is_solid());
        assert!(trap.mask().is_empty());
        assert_eq!(trap.visual(), Visual::Hidden);
    }

    #[test]
    fn disappearing_block_respawns_after_delay() {
        let art = art();
        let cfg = config();
        let mut trap = WorldObject::disappearing_block(0.0, 0.0, 96.0, 96.0, 2000);
        trap.trigger(1000);
        trap.update(2999, &art, &cfg);
        assert!(!trap.is_solid());
        trap.update(3000, &art, &cfg);
        assert!(trap.is_solid());
        assert!(!trap.mask().is_empty());
        assert!(trap.visual().is_visible());
    }

    #[test]
    fn disappearing_block_without_respawn_stays_gone() {
        let art = art();
        let cfg = config();
        let mut trap = WorldObject::disappearing_block(0.0, 0.0, 96.0, 96.0, 0);
        trap.trigger(0);
        trap.update(1_000_000, &art, &cfg);
        assert!(!trap.is_solid());
    }

    #[test]
    fn appearing_block_becomes_solid_and_stays() {
        let art = art();
        let cfg = config();
        let mut block = WorldObject::appearing_block(0.0, 0.0, 96.0, 96.0);
        assert!(!block.is_solid());
        assert!(!block.visual().is_visible());
        block.trigger(0);
        block.update(100_000, &art, &cfg);
        assert!(block.is_solid());
        assert_eq!(block.mask().count(), 96 * 96);
    }

    #[test]
    fn hidden_spike_reveals_over_250ms() {
        let art = art();
        let cfg = config();
        let mut spike =
            WorldObject::hidden_spike(0.0, 0.0, 32.0, 40.0, SpikeOrientation::Up, 250, &art);
        assert!(spike.mask().is_empty());
        assert!(spike.trigger(1000));

        let hidden = |o: &WorldObject| match o.body() {
            ObjectBody::HiddenSpike(s) => s.clone(),
            _ => unreachable!(),
        };
        assert!(hidden(&spike).triggered);
        assert!(!hidden(&spike).active_hazard);

        spike.update(1000, &art, &cfg);
        match spike.visual() {
            Visual::Revealed {
                visible_height,
                anchor,
                ..
            } => {
                assert_eq!(visible_height, 1);
                assert_eq!(anchor, Anchor::Bottom);
            },
            other => panic!("expected partial reveal, got {other:?}"),
        }

        spike.update(1125, &art, &cfg);
        assert!(matches!(
            spike.visual(),
            Visual::Revealed {
                visible_height: 20,
                ..
            }
        ));
        assert!(!hidden(&spike).active_hazard);

        spike.update(1249, &art, &cfg);
        assert!(!hidden(&spike).active_hazard);

        spike.update(1250, &art, &cfg);
        assert!(hidden(&spike).active_hazard);
        assert!(!spike.is_solid(), "spikes never block movement");
    }

    #[test]
    fn downward_hidden_spike_grows_from_top() {
        let art = art();
        let cfg = config();
        let mut spike =
            WorldObject::hidden_spike(0.0, 0.0, 32.0, 40.0, SpikeOrientation::Down, 250, &art);
        spike.trigger(0);
        spike.update(125, &art, &cfg);
        assert!(spike.mask().get(0, 0));
        assert!(!spike.mask().get(0, 39));
    }

    #[test]
    fn orientation_property_parsing() {
        assert_eq!(SpikeOrientation::from_property("Down"), SpikeOrientation::Down);
        assert_eq!(SpikeOrientation::from_property("top"), SpikeOrientation::Down);
        assert_eq!(SpikeOrientation::from_property("sideways"), SpikeOrientation::Up);
    }

    #[test]
    fn checkpoint_plays_flag_out_then_idles() {
        let art = art();
        let cfg = config();
        let mut cp = WorldObject::checkpoint(0.0, 0.0, 128.0, 128.0, &art);
        cp.trigger(0);

        let state = |o: &WorldObject| match o.body() {
            ObjectBody::Checkpoint(c) => c.state,
            _ => unreachable!(),
        };
        assert_eq!(state(&cp), CheckpointState::FlagOut);

        // 26 frames at 50ms each.
        cp.update(1299, &art, &cfg);
        assert_eq!(state(&cp), CheckpointState::FlagOut);
        cp.update(1300, &art, &cfg);
        assert_eq!(state(&cp), CheckpointState::Idle);
        assert_eq!(
            cp.visual(),
            Visual::Sprite(SpriteRef::new(sheets::CHECKPOINT_IDLE, 0))
        );
    }

    #[test]
    fn end_blinks_then_idles() {
        let art = art();
        let cfg = config();
        let mut end = WorldObject::end(0.0, 0.0, 128.0, 128.0, &art);
        end.trigger(0);

        let sheet = |o: &WorldObject| match o.visual() {
            Visual::Sprite(s) => s.sheet,
            _ => "",
        };
        end.update(10, &art, &cfg);
        assert_eq!(sheet(&end), sheets::END_PRESSED);
        end.update(160, &art, &cfg);
        assert_eq!(sheet(&end), sheets::END_IDLE);
        end.update(310, &art, &cfg);
        assert_eq!(sheet(&end), sheets::END_PRESSED);
        end.update(1500, &art, &cfg);
        assert_eq!(sheet(&end), sheets::END_IDLE);
        end.update(1650, &art, &cfg);
        assert_eq!(sheet(&end), sheets::END_IDLE);
    }

    #[test]
    fn box_breaks_then_hides_after_250ms() {
        let art = art();
        let cfg = config();
        let mut crate_ = WorldObject::breakable_box(0.0, 0.0, 56.0, 48.0, &art);
        assert!(crate_.is_solid());
        crate_.trigger(500);
        assert!(!crate_.is_solid());
        assert!(crate_.visual().is_visible());

        crate_.update(749, &art, &cfg);
        assert!(crate_.visual().is_visible());
        crate_.update(750, &art, &cfg);
        assert_eq!(crate_.visual(), Visual::Hidden);
    }

    #[test]
    fn box_without_break_art_hides_instantly() {
        let mut art = art();
        art.remove(sheets::BOX_BREAK);
        let mut crate_ = WorldObject::breakable_box(0.0, 0.0, 56.0, 48.0, &art);
        crate_.trigger(0);
        assert_eq!(crate_.visual(), Visual::Hidden);
    }

    #[test]
    fn overlap_sensitivity() {
        let art = art();
        assert!(WorldObject::spike(0.0, 0.0, 32.0, 32.0, SpikeOrientation::Up, &art).reacts_to_overlap());
        assert!(WorldObject::checkpoint(0.0, 0.0, 128.0, 128.0, &art).reacts_to_overlap());
        assert!(WorldObject::end(0.0, 0.0, 128.0, 128.0, &art).reacts_to_overlap());
        assert!(WorldObject::fire(0.0, 0.0, 16.0, 32.0, true, &art).reacts_to_overlap());
        assert!(!WorldObject::fire(0.0, 0.0, 16.0, 32.0, false, &art).reacts_to_overlap());
        assert!(!WorldObject::block(0.0, 0.0, 96.0).reacts_to_overlap());
    }

    #[test]
    fn respawn_point_stands_on_base() {
        let art = art();
        let cp = WorldObject::checkpoint(1000.0, 576.0, 128.0, 128.0, &art);
        assert_eq!(cp.respawn_point(64.0, 64.0), (1032.0, 640.0));
    }
}
