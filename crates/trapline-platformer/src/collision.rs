use trapline_core::events::{DeathCause, GameEvent, ObjectId};
use trapline_core::geometry::{Rect, masks_collide};
use trapline_core::input::InputIntents;
use trapline_core::time::Millis;

use crate::config::PhysicsConfig;
use crate::objects::{ContactClass, ObjectBody, ObjectKind, WorldObject};
use crate::physics::PlayerState;

/// Objects the player touched during one resolution pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contacts {
    /// First solid object hit by the left probe, after trap blockers are cleared.
    pub blocked_left: Option<ObjectId>,
    pub blocked_right: Option<ObjectId>,
    /// Solid objects the player was snapped against vertically, in list order.
    pub vertical: Vec<ObjectId>,
    /// Non-solid contact objects found by the overlap re-scan.
    pub overlapping: Vec<ObjectId>,
}

/// Result of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub contacts: Contacts,
    pub events: Vec<GameEvent>,
}

fn mask_hit(player: &PlayerState, rect: &Rect, obj: &WorldObject) -> bool {
    masks_collide(rect, player.mask(), obj.rect(), obj.mask())
}

/// First solid object the player's mask would overlap after shifting by `dx`.
pub fn probe_horizontal(player: &PlayerState, objects: &[WorldObject], dx: f32) -> Option<ObjectId> {
    let shifted = player.rect().translated(dx, 0.0);
    objects
        .iter()
        .position(|obj| obj.is_solid() && mask_hit(player, &shifted, obj))
}

/// Trigger `objects[id]` and record the matching event if its state changed.
fn activate(objects: &mut [WorldObject], id: ObjectId, now: Millis, events: &mut Vec<GameEvent>) -> bool {
    let Some(obj) = objects.get_mut(id) else {
        return false;
    };
    if !obj.trigger(now) {
        return false;
    }
    let event = match obj.body() {
        ObjectBody::Trap(_) => GameEvent::TrapTriggered { object: id },
        ObjectBody::Appear(_) => GameEvent::BlockAppeared { object: id },
        ObjectBody::HiddenSpike(_) => GameEvent::SpikeRevealed { object: id },
        ObjectBody::Box(_) => GameEvent::BoxBroken { object: id },
        ObjectBody::End(_) => GameEvent::EndReached { object: id },
        // Checkpoints report from `dispatch`, which knows the respawn point.
        _ => return true,
    };
    tracing::debug!(object = id, kind = ?obj.kind(), "object triggered");
    events.push(event);
    true
}

/// Apply the kind-specific effect of touching `objects[id]`.
fn dispatch(
    player: &mut PlayerState,
    objects: &mut [WorldObject],
    id: ObjectId,
    now: Millis,
    events: &mut Vec<GameEvent>,
) {
    let Some(obj) = objects.get(id) else {
        return;
    };
    match obj.body() {
        ObjectBody::Fire(fire) if fire.burning => player.make_hit(DeathCause::Fire),
        ObjectBody::Spike(_) => player.make_hit(DeathCause::Spike),
        ObjectBody::HiddenSpike(_) => {
            activate(objects, id, now, events);
            player.make_hit(DeathCause::Spike);
        },
        ObjectBody::Checkpoint(_) => {
            let (x, y) = obj.respawn_point(player.width, player.height);
            if activate(objects, id, now, events) {
                player.set_respawn(x, y);
                tracing::debug!(object = id, x, y, "checkpoint reached");
                events.push(GameEvent::CheckpointReached {
                    object: id,
                    respawn_x: x,
                    respawn_y: y,
                });
            }
        },
        ObjectBody::Trap(_) | ObjectBody::Appear(_) | ObjectBody::End(_) => {
            activate(objects, id, now, events);
        },
        _ => {},
    }
}

/// Resolve one tick of player movement against the level.
///
/// Order: horizontal probes, intent application, vertical snapping, dispatch
/// of everything touched, then the overlap re-scan of non-solid contact
/// objects. Horizontal intents set `x_vel`; the move itself happens in the
/// next `integrate`, which the probe distance has already cleared.
pub fn resolve(
    player: &mut PlayerState,
    objects: &mut [WorldObject],
    intents: &InputIntents,
    now: Millis,
    physics: &PhysicsConfig,
) -> Resolution {
    let mut events = Vec::new();
    let lookahead = physics.lookahead();

    player.x_vel = 0.0;
    let mut blocked_left = probe_horizontal(player, objects, -lookahead);
    let mut blocked_right = probe_horizontal(player, objects, lookahead);

    // A trap touched from the side gives way instead of blocking.
    for blocker in [&mut blocked_left, &mut blocked_right] {
        if let Some(id) = *blocker {
            if objects[id].kind() == ObjectKind::Trap {
                activate(objects, id, now, &mut events);
                *blocker = None;
            }
        }
    }

    if intents.left && blocked_left.is_none() {
        player.move_left(physics.player_vel);
    }
    if intents.right && blocked_right.is_none() {
        player.move_right(physics.player_vel);
    }

    let vertical = resolve_vertical(player, objects, now, &mut events);

    let touched: Vec<ObjectId> = blocked_left
        .into_iter()
        .chain(blocked_right)
        .chain(vertical.iter().copied())
        .collect();
    for id in touched {
        dispatch(player, objects, id, now, &mut events);
    }

    let overlapping = rescan_overlaps(player, objects, now, &mut events);

    Resolution {
        contacts: Contacts {
            blocked_left,
            blocked_right,
            vertical,
            overlapping,
        },
        events,
    }
}

/// Snap the player out of every solid object it overlaps, in list order.
fn resolve_vertical(
    player: &mut PlayerState,
    objects: &mut [WorldObject],
    now: Millis,
    events: &mut Vec<GameEvent>,
) -> Vec<ObjectId> {
    let dy = player.y_vel;
    let mut collided = Vec::new();

    for id in 0..objects.len() {
        if objects[id].kind() == ObjectKind::Appear && player.rect().intersects(objects[id].rect()) {
            activate(objects, id, now, events);
        }

        let obj = &objects[id];
        if !obj.is_solid() || !mask_hit(player, &player.rect(), obj) {
            continue;
        }

        // The player falls through the tick a trap vanishes.
        if obj.kind() == ObjectKind::Trap {
            activate(objects, id, now, events);
            continue;
        }

        if dy > 0.0 {
            player.set_bottom(obj.rect().top());
            player.landed();
            if obj.kind() == ObjectKind::Box {
                activate(objects, id, now, events);
            }
        } else if dy < 0.0 {
            player.set_top(obj.rect().bottom());
            player.hit_head();
        }
        collided.push(id);
    }

    collided
}

/// Contact test for non-solid objects. Burning fire needs a pixel overlap;
/// everything else also counts a bounding-box touch, so hidden spikes with an
/// empty mask still trigger.
fn overlap_contact(player: &PlayerState, obj: &WorldObject) -> bool {
    let rect = player.rect();
    if mask_hit(player, &rect, obj) {
        return true;
    }
    obj.kind() != ObjectKind::Fire && rect.intersects(obj.rect())
}

fn rescan_overlaps(
    player: &mut PlayerState,
    objects: &mut [WorldObject],
    now: Millis,
    events: &mut Vec<GameEvent>,
) -> Vec<ObjectId> {
    let hits: Vec<ObjectId> = objects
        .iter()
        .enumerate()
        .filter(|(_, obj)| {
            obj.contact_class() != ContactClass::Solid
                && obj.reacts_to_overlap()
                && overlap_contact(player, obj)
        })
        .map(|(id, _)| id)
        .collect();
    for &id in &hits {
        dispatch(player, objects, id, now, events);
    }
    hits
}
