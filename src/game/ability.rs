//! Character Abilities
//!
//! Special-case damage for a fighter collision. Rules live in a table
//! checked in priority order (Creeper, Herobrine, Steve); the first rule
//! whose kind is present in the pair resolves the whole contact, so a
//! pair never takes damage from two abilities at once. Pairs with no
//! ability kind fall back to plain contact damage.

use serde::{Serialize, Deserialize};

use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vec2;
use crate::game::events::AbilityUsed;
use crate::game::state::{CharacterKind, FighterId, FighterState, SimTime};

/// Ability magnitudes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AbilityConfig {
    /// Damage each fighter takes from a plain contact
    pub contact_damage: i32,

    /// Damage the creeper deals to itself
    pub creeper_self_damage: i32,
    /// Damage the creeper deals to its opponent
    pub creeper_target_damage: i32,
    /// Outward impulse applied to both bodies
    pub creeper_push: f64,

    /// Seconds Herobrine stays revealed after a contact
    pub herobrine_reveal: f64,
    /// Damage a revealed Herobrine takes per contact
    pub herobrine_self_damage: i32,
    /// Damage dealt to the opponent on a vertical hit
    pub herobrine_strike_damage: i32,

    /// Damage Steve takes per contact
    pub steve_self_damage: i32,
    /// Knockback impulse applied to Steve's opponent
    pub steve_knockback: f64,
    /// Speed above which Steve's opponent takes bonus damage
    pub steve_speed_threshold: f64,
    /// Multiplier on the excess speed
    pub steve_speed_factor: f64,
    /// Divisor turning the multiplier into whole damage points
    pub steve_damage_divisor: f64,
}

impl Default for AbilityConfig {
    fn default() -> Self {
        Self {
            contact_damage: 1,
            creeper_self_damage: 2,
            creeper_target_damage: 4,
            creeper_push: 4.0,
            herobrine_reveal: 3.0,
            herobrine_self_damage: 2,
            herobrine_strike_damage: 4,
            steve_self_damage: 1,
            steve_knockback: 5.0,
            steve_speed_threshold: 14.0,
            steve_speed_factor: 2.0,
            steve_damage_divisor: 8.0,
        }
    }
}

/// Two colliding fighters plus everything an ability may touch.
///
/// `first` and `second` keep the pair's list order; rules that pick "the
/// first X" scan them in that order.
pub struct Contact<'a> {
    /// Earlier fighter in list order
    pub first: &'a mut FighterState,
    /// Later fighter in list order
    pub second: &'a mut FighterState,
    /// Simulation time of the frame
    pub now: SimTime,
    /// Match RNG, for degenerate push directions
    pub rng: &'a mut DeterministicRng,
    /// Magnitudes
    pub config: &'a AbilityConfig,
}

/// What an ability did beyond damage and impulses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactResolution {
    /// Rule that resolved the contact
    pub ability: AbilityUsed,
    /// Creeper and blast center, if something exploded
    pub explosion: Option<(FighterId, Vec2)>,
}

/// Resolver signature. Only called when the rule's kind is in the pair.
pub type AbilityFn = fn(&mut Contact<'_>) -> ContactResolution;

/// One row of the priority table.
pub struct AbilityRule {
    /// Kind that triggers the rule
    pub kind: CharacterKind,
    /// Resolver
    pub resolve: AbilityFn,
}

/// Ability rules, highest priority first.
pub const ABILITY_TABLE: [AbilityRule; 3] = [
    AbilityRule { kind: CharacterKind::Creeper, resolve: creeper_explosion },
    AbilityRule { kind: CharacterKind::Herobrine, resolve: herobrine_contact },
    AbilityRule { kind: CharacterKind::Steve, resolve: steve_knockback },
];

/// Resolve the ability damage for one collision.
pub fn resolve_contact(contact: &mut Contact<'_>) -> ContactResolution {
    for rule in &ABILITY_TABLE {
        if contact.first.kind == rule.kind || contact.second.kind == rule.kind {
            return (rule.resolve)(contact);
        }
    }

    let damage = contact.config.contact_damage;
    contact.first.take_damage(damage);
    contact.second.take_damage(damage);

    ContactResolution {
        ability: AbilityUsed::None,
        explosion: None,
    }
}

/// Unit vector from `from` to `to`, random when the points coincide.
fn push_direction(from: Vec2, to: Vec2, rng: &mut DeterministicRng) -> Vec2 {
    let delta = to - from;
    if delta.length() == 0.0 {
        return rng.random_direction();
    }
    delta.normalize()
}

// =============================================================================
// CREEPER
// =============================================================================

/// Creeper explodes at the midpoint, hurting both and blowing them apart.
fn creeper_explosion(contact: &mut Contact<'_>) -> ContactResolution {
    let config = contact.config;
    let (creeper, enemy) = if contact.first.kind == CharacterKind::Creeper {
        (&mut *contact.first, &mut *contact.second)
    } else {
        (&mut *contact.second, &mut *contact.first)
    };

    let center = creeper.position.midpoint(enemy.position);

    enemy.take_damage(config.creeper_target_damage);
    creeper.take_damage(config.creeper_self_damage);

    for body in [&mut *creeper, &mut *enemy] {
        let dir = push_direction(center, body.position, contact.rng);
        body.velocity += dir * config.creeper_push;
    }

    ContactResolution {
        ability: AbilityUsed::Explosion,
        explosion: Some((creeper.id, center)),
    }
}

// =============================================================================
// HEROBRINE
// =============================================================================

/// Every Herobrine in the pair is revealed.
///
/// One that was hidden when the contact began takes no damage. One that
/// was already revealed pays a self-damage penalty and strikes back on a
/// predominantly vertical hit.
fn herobrine_contact(contact: &mut Contact<'_>) -> ContactResolution {
    let now = contact.now;
    let config = contact.config;

    // Immunity is fixed before either side is revealed
    let first_hidden = contact.first.is_hidden();
    let second_hidden = contact.second.is_hidden();

    if contact.first.kind == CharacterKind::Herobrine {
        herobrine_side(contact.first, contact.second, second_hidden, now, config);
    }
    if contact.second.kind == CharacterKind::Herobrine {
        herobrine_side(contact.second, contact.first, first_hidden, now, config);
    }

    ContactResolution {
        ability: AbilityUsed::Herobrine,
        explosion: None,
    }
}

fn herobrine_side(
    hero: &mut FighterState,
    other: &mut FighterState,
    other_hidden: bool,
    now: SimTime,
    config: &AbilityConfig,
) {
    let was_visible = hero.visible;
    hero.visible = true;
    hero.visible_until = now + config.herobrine_reveal;

    if !was_visible {
        return;
    }

    hero.take_damage(config.herobrine_self_damage);

    let dx = other.position.x - hero.position.x;
    let dy = other.position.y - hero.position.y;
    if dy.abs() > dx.abs() && !other_hidden {
        other.take_damage(config.herobrine_strike_damage);
    }
}

// =============================================================================
// STEVE
// =============================================================================

/// Bonus damage Steve deals to an opponent moving at `speed`.
///
/// Zero at or below the threshold; above it the scaled excess is
/// truncated to whole points.
pub fn steve_bonus_damage(speed: f64, config: &AbilityConfig) -> i32 {
    if speed <= config.steve_speed_threshold {
        return 0;
    }
    let multiplier = (speed - config.steve_speed_threshold) * config.steve_speed_factor;
    (multiplier / config.steve_damage_divisor) as i32
}

/// The first Steve in list order knocks the other fighter back.
fn steve_knockback(contact: &mut Contact<'_>) -> ContactResolution {
    let config = contact.config;
    let (steve, enemy) = if contact.first.kind == CharacterKind::Steve {
        (&mut *contact.first, &mut *contact.second)
    } else {
        (&mut *contact.second, &mut *contact.first)
    };

    // Measured after the elastic exchange, before the knockback
    let enemy_speed = enemy.speed();

    let dir = push_direction(steve.position, enemy.position, contact.rng);
    enemy.velocity += dir * config.steve_knockback;

    steve.take_damage(config.steve_self_damage);
    enemy.take_damage(steve_bonus_damage(enemy_speed, config));

    ContactResolution {
        ability: AbilityUsed::Knockback,
        explosion: None,
    }
}
