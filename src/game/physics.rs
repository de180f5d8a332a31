//! Arena Physics
//!
//! Straight-line motion, wall bounces and equal-mass elastic collisions
//! between circular fighters. Velocities are in pixels per frame, so one
//! call to [`move_fighter`] is one frame of motion.

use crate::core::vec2::Vec2;
use crate::game::state::{Arena, FighterState};

/// Stand-in separation for fighters whose centers coincide exactly.
pub const COINCIDENT_DISTANCE: f64 = 0.1;

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f64 {
    a.distance(b)
}

/// Check if two circles overlap.
///
/// Touching circles (distance exactly equal to the radius sum) do not.
#[inline]
pub fn circles_overlap(pos_a: Vec2, radius_a: f64, pos_b: Vec2, radius_b: f64) -> bool {
    distance(pos_a, pos_b) < radius_a + radius_b
}

/// Check if two fighters overlap.
#[inline]
pub fn collide(a: &FighterState, b: &FighterState) -> bool {
    circles_overlap(a.position, a.radius, b.position, b.radius)
}

/// Resolve an overlap between two equal-mass fighters.
///
/// The normal points from `b` toward `a`. If the pair is already moving
/// apart along the normal nothing changes, not even positions. Otherwise
/// the normal components of the velocities are exchanged and each body is
/// pushed out by half the overlap.
///
/// Returns `true` if the impulse was applied.
pub fn resolve_elastic_collision(a: &mut FighterState, b: &mut FighterState) -> bool {
    let delta = a.position - b.position;
    let mut dist = delta.length();
    let normal = if dist == 0.0 {
        dist = COINCIDENT_DISTANCE;
        Vec2::RIGHT
    } else {
        delta.scale(1.0 / dist)
    };

    let relative = a.velocity - b.velocity;
    let vn = relative.dot(normal);
    if vn > 0.0 {
        return false;
    }

    a.velocity -= normal * vn;
    b.velocity += normal * vn;

    let overlap = (a.radius + b.radius) - dist;
    let push = normal * (overlap / 2.0);
    a.position += push;
    b.position -= push;

    true
}

/// Advance a fighter by one frame and bounce it off the arena walls.
///
/// On contact with a wall the position is set to the boundary and the
/// matching velocity component changes sign. A hidden Herobrine sheds
/// poison and fire while it moves.
pub fn move_fighter(fighter: &mut FighterState, arena: &Arena) {
    fighter.position += fighter.velocity;

    let r = fighter.radius;

    if fighter.position.x - r < 0.0 {
        fighter.position.x = r;
        fighter.velocity.x = -fighter.velocity.x;
    } else if fighter.position.x + r > arena.width {
        fighter.position.x = arena.width - r;
        fighter.velocity.x = -fighter.velocity.x;
    }

    if fighter.position.y - r < 0.0 {
        fighter.position.y = r;
        fighter.velocity.y = -fighter.velocity.y;
    } else if fighter.position.y + r > arena.height {
        fighter.position.y = arena.height - r;
        fighter.velocity.y = -fighter.velocity.y;
    }

    if fighter.is_hidden() {
        fighter.poison.clear();
        fighter.fire.clear();
    }
}

/// Pull a fighter back inside the arena without touching its velocity.
///
/// Collision separation and knockback can push a body past a wall after
/// the frame's movement step; this restores the bounds before the frame
/// is published. The next [`move_fighter`] call does the bounce.
pub fn clamp_to_arena(fighter: &mut FighterState, arena: &Arena) {
    fighter.position = arena.clamp_center(fighter.position, fighter.radius);
}

/// Borrow two distinct elements of a slice mutably.
///
/// # Panics
///
/// Panics if `i == j` or either index is out of bounds.
pub fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert_ne!(i, j, "pair_mut needs two distinct indices");
    if i < j {
        let (left, right) = items.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}
