//! Fighter Collisions
//!
//! Pairwise collision pass over the live fighters. Each overlapping pair
//! gets the elastic response, a hit spark at its midpoint and exactly one
//! ability resolution.

use std::collections::BTreeSet;

use crate::game::ability::{resolve_contact, AbilityConfig, Contact};
use crate::game::effect::{spawn_explosion, spawn_hit_spark, EffectConfig};
use crate::game::events::{AbilityUsed, GameEvent};
use crate::game::physics::{collide, pair_mut, resolve_elastic_collision};
use crate::game::state::{FighterId, MatchState, SimTime};

/// Unordered fighter pairs already resolved this frame.
#[derive(Debug, Default)]
pub struct ResolvedPairs {
    pairs: BTreeSet<(FighterId, FighterId)>,
}

impl ResolvedPairs {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: FighterId, b: FighterId) -> (FighterId, FighterId) {
        if a <= b { (a, b) } else { (b, a) }
    }

    /// Whether the pair has been resolved, in either order.
    pub fn contains(&self, a: FighterId, b: FighterId) -> bool {
        self.pairs.contains(&Self::key(a, b))
    }

    /// Record a pair. Returns `false` if it was already present.
    pub fn insert(&mut self, a: FighterId, b: FighterId) -> bool {
        self.pairs.insert(Self::key(a, b))
    }

    /// Number of pairs resolved.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// No pair resolved yet.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// A fighter contact handled this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FighterCollision {
    /// Earlier fighter in list order
    pub first: FighterId,
    /// Later fighter in list order
    pub second: FighterId,
    /// Rule that resolved it
    pub ability: AbilityUsed,
}

/// Resolve every overlapping fighter pair once.
///
/// Overlap is tested against current positions, so separation from an
/// earlier pair can clear a later one.
pub fn resolve_fighter_collisions(
    state: &mut MatchState,
    now: SimTime,
    abilities: &AbilityConfig,
    effects: &EffectConfig,
) -> Vec<FighterCollision> {
    let mut resolved = ResolvedPairs::new();
    let mut collisions = Vec::new();
    let count = state.fighters.len();

    for i in 0..count {
        for j in (i + 1)..count {
            if !collide(&state.fighters[i], &state.fighters[j]) {
                continue;
            }

            let (id_i, id_j) = (state.fighters[i].id, state.fighters[j].id);
            if resolved.contains(id_i, id_j) {
                continue;
            }

            let (a, b) = pair_mut(&mut state.fighters, i, j);
            resolve_elastic_collision(a, b);
            let midpoint = a.position.midpoint(b.position);

            let resolution = {
                let mut contact = Contact {
                    first: a,
                    second: b,
                    now,
                    rng: &mut state.rng,
                    config: abilities,
                };
                resolve_contact(&mut contact)
            };

            spawn_hit_spark(state, midpoint, now, effects);

            if let Some((creeper, center)) = resolution.explosion {
                spawn_explosion(state, center, now, effects);
                tracing::debug!(%creeper, "creeper exploded");
                let event = GameEvent::exploded(state.frame, now, creeper, center);
                state.push_event(event);
            }

            #[cfg(feature = "debug-tracing")]
            tracing::trace!(first = %id_i, second = %id_j, ability = ?resolution.ability, "fighters collided");

            let event = GameEvent::fighters_collided(state.frame, now, id_i, id_j, resolution.ability);
            state.push_event(event);

            resolved.insert(id_i, id_j);
            collisions.push(FighterCollision {
                first: id_i,
                second: id_j,
                ability: resolution.ability,
            });
        }
    }

    collisions
}
