//! Per-entity movement and platform collision.
//!
//! `delta` is measured in reference frames (1.0 == 1/60 s), the unit all
//! tunables are expressed in. Screen-space y grows downward while
//! `velocity.y > 0` means upward intent, so integration subtracts on y.

use crate::entity::{Entity, Rect, Vec2, ENTITY_WIDTH};
use crate::map::Map;
use log::info;

/// Vertical velocity lost per frame while below the fall cap.
pub const GRAVITY: f64 = 0.2;
/// Vertical velocity set by a jump.
pub const JUMP_VELOCITY: f64 = 3.0;
/// Horizontal velocity added per tick of held direction.
pub const MOVE_IMPULSE: f64 = 0.8;
/// Horizontal slowdown rate without input, on the ground.
pub const GROUND_FRICTION: f64 = 0.4;
/// Horizontal slowdown rate without input, in the air.
pub const AIR_FRICTION: f64 = 0.05;
/// Entities below this y have fallen out of the world.
pub const RESPAWN_THRESHOLD_Y: f64 = 1000.0;
/// Respawn height above the map origin.
pub const RESPAWN_HEIGHT: f64 = 200.0;

const VELOCITY_EPSILON: f64 = 1e-10;
const LARGE_DELTA: f64 = 0.5;

/// Which face of a platform an entity was pushed out through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub fn is_vertical(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }
}

/// A resolved overlap with one platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Index into the platform slice.
    pub platform: usize,
    pub side: Side,
    pub depth: f64,
}

/// What happened to an entity during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub jumped: bool,
    pub respawned: bool,
    pub contacts: Vec<Contact>,
}

/// Applies the entity's pending input to its velocity.
///
/// Held direction adds a fixed impulse; without direction the entity slows
/// down, faster on the ground than in the air. A jump is only granted while
/// jumps remain. Returns true when a jump was performed.
pub fn apply_input(entity: &mut Entity, delta: f64) -> bool {
    match entity.input.horizontal.axis() {
        -1 => entity.velocity.x -= MOVE_IMPULSE,
        1 => entity.velocity.x += MOVE_IMPULSE,
        _ => {
            let friction = if entity.grounded {
                GROUND_FRICTION
            } else {
                AIR_FRICTION
            };
            entity.velocity.x /= 1.0 + delta * friction;
        }
    }

    if entity.input.jump && entity.jumps_remaining > 0 {
        entity.velocity.y = JUMP_VELOCITY;
        entity.jumps_remaining -= 1;
        return true;
    }
    false
}

/// Advances one entity by one tick against a static platform set.
pub fn advance(entity: &mut Entity, delta: f64, platforms: &[Rect], origin: Vec2) -> StepReport {
    let mut report = StepReport::default();
    let tunables = entity.tunables;

    damp_to_max_speed(&mut entity.velocity, tunables.max_speed, delta);

    entity.grounded = false;

    if entity.velocity.y < tunables.acceleration * 2.0 {
        entity.velocity.y -= GRAVITY * delta;
    }

    entity.position.x += delta * tunables.acceleration * entity.velocity.x;
    entity.position.y -= delta * tunables.acceleration * entity.velocity.y;

    if entity.position.y > RESPAWN_THRESHOLD_Y {
        entity.position.y = origin.y - RESPAWN_HEIGHT;
        entity.position.x = origin.x - ENTITY_WIDTH / 2.0;
        entity.velocity.y = 0.0;
        report.respawned = true;
        info!(
            "Respawned {} at ({:.1}, {:.1})",
            entity.id, entity.position.x, entity.position.y
        );
    }

    for (index, platform) in platforms.iter().enumerate() {
        if !entity.bounds().overlaps(platform) {
            continue;
        }

        entity.grounded = true;
        entity.jumps_remaining = tunables.max_jumps;

        let (side, depth) = resolve_overlap(entity, platform, delta);
        report.contacts.push(Contact {
            platform: index,
            side,
            depth,
        });
    }

    report
}

/// Input, movement and collision for one entity, consuming its jump request.
pub fn step(entity: &mut Entity, delta: f64, map: &Map) -> StepReport {
    let jumped = apply_input(entity, delta);
    entity.input.jump = false;

    let mut report = advance(entity, delta, &map.platforms, map.origin);
    report.jumped = jumped;
    report
}

/// Decays horizontal speed above the cap toward it instead of clamping.
fn damp_to_max_speed(velocity: &mut Vec2, max_speed: f64, delta: f64) {
    let mut diff = (velocity.x.abs() - max_speed).abs() * 2.0 * delta;
    if delta > LARGE_DELTA {
        diff /= 2.0 * delta;
    }

    if velocity.x > max_speed {
        velocity.x = (velocity.x - diff).max(max_speed);
    } else if velocity.x < -max_speed {
        velocity.x = (velocity.x + diff).min(-max_speed);
    }

    if velocity.x.abs() < VELOCITY_EPSILON {
        velocity.x = 0.0;
    }
    if velocity.y.abs() < VELOCITY_EPSILON {
        velocity.y = 0.0;
    }
}

/// Pushes the entity out of one platform along the shallower axis.
///
/// The approach side comes from comparing anchors (top-left corners), not
/// from penetration geometry, so a fast or deeply sunk entity can be pushed
/// out through the wrong face.
fn resolve_overlap(entity: &mut Entity, platform: &Rect, delta: f64) -> (Side, f64) {
    let body = entity.bounds();

    let from_right = entity.position.x > platform.x;
    let x_depth = if from_right {
        (platform.max_x() - body.min_x()).abs()
    } else {
        (body.max_x() - platform.min_x()).abs()
    };

    let from_below = entity.position.y > platform.y;
    let y_depth = if from_below {
        (platform.max_y() - body.min_y()).abs()
    } else {
        (body.max_y() - platform.min_y()).abs()
    };

    if x_depth > y_depth {
        if from_below {
            entity.position.y += y_depth;
            entity.jumps_remaining = 0;
            if entity.velocity.y > 0.0 {
                entity.velocity.y = 0.0;
            }
            (Side::Bottom, y_depth)
        } else {
            entity.position.y -= y_depth;
            if entity.velocity.y < 0.0 {
                entity.velocity.y = 0.0;
            }
            (Side::Top, y_depth)
        }
    } else {
        let side = if from_right {
            entity.position.x += x_depth;
            Side::Right
        } else {
            entity.position.x -= x_depth;
            Side::Left
        };
        entity.velocity.x = 0.0;
        // Wall contact slows a fall rather than stopping it.
        if entity.velocity.y < 0.0 {
            entity.velocity.y /= 1.0 + delta;
        }
        (side, x_depth)
    }
}
