//! Blaze Projectiles
//!
//! A blaze fires one projectile per cooldown period at its opponent.
//! Projectiles fly in a straight line, burn the first fighter they touch
//! (never their owner) and vanish as soon as their center leaves the arena.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::events::GameEvent;
use crate::game::physics::circles_overlap;
use crate::game::state::{CharacterKind, FighterId, MatchState, SimTime};

/// Projectile tuning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectileConfig {
    /// Launch speed in pixels per frame
    pub speed: f64,
    /// Collision radius
    pub radius: f64,
    /// Seconds between shots
    pub cooldown: f64,
    /// Damage on impact
    pub hit_damage: i32,
    /// Fire ticks applied on impact (refreshes, never stacks)
    pub burn_ticks: u32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 18.0,
            radius: 20.0,
            cooldown: 1.0,
            hit_damage: 1,
            burn_ticks: 5,
        }
    }
}

/// Fire from every blaze whose cooldown has elapsed.
///
/// With exactly one opponent the shot is aimed at its current center;
/// otherwise (free-for-all rosters) the direction is random.
pub fn spawn_blaze_projectiles(state: &mut MatchState, now: SimTime, config: &ProjectileConfig) {
    let ready: Vec<usize> = state
        .fighters
        .iter()
        .enumerate()
        .filter(|(_, f)| f.kind == CharacterKind::Blaze && now - f.last_projectile_time >= config.cooldown)
        .map(|(idx, _)| idx)
        .collect();

    for idx in ready {
        let origin = state.fighters[idx].position;
        let owner = state.fighters[idx].id;

        let direction = if state.fighters.len() == 2 {
            let target = state.fighters[1 - idx].position;
            aim_direction(origin, target)
        } else {
            state.rng.random_direction()
        };

        let projectile = state.spawn_projectile(owner, origin, direction * config.speed, config.radius);
        state.fighters[idx].last_projectile_time = now;

        tracing::debug!(fighter = %owner, projectile = projectile.0, "blaze fired");
        let event = GameEvent::projectile_fired(state.frame, now, owner, projectile);
        state.push_event(event);
    }
}

/// Unit vector from `origin` to `target`.
///
/// Coincident points use a distance of 1, which yields a zero vector.
pub fn aim_direction(origin: Vec2, target: Vec2) -> Vec2 {
    let delta = target - origin;
    let mut dist = delta.length();
    if dist == 0.0 {
        dist = 1.0;
    }
    delta.scale(1.0 / dist)
}

/// Move projectiles one frame and deactivate any whose center left the arena.
pub fn update_projectiles(state: &mut MatchState) {
    let arena = state.arena;
    for projectile in state.projectiles.iter_mut().filter(|p| p.active) {
        projectile.position += projectile.velocity;
        if !arena.contains(projectile.position) {
            projectile.active = false;
        }
    }
}

/// Apply projectile impacts.
///
/// Each projectile damages at most one fighter, once, and never its owner.
pub fn resolve_projectile_hits(state: &mut MatchState, now: SimTime, config: &ProjectileConfig) {
    let mut hits: Vec<(usize, FighterId, FighterId)> = Vec::new();

    for (p_idx, projectile) in state.projectiles.iter_mut().enumerate() {
        for fighter in state.fighters.iter_mut() {
            if !projectile.active || fighter.id == projectile.owner {
                continue;
            }
            if circles_overlap(fighter.position, fighter.radius, projectile.position, projectile.radius) {
                fighter.take_damage(config.hit_damage);
                fighter.ignite(config.burn_ticks, now);
                projectile.active = false;
                hits.push((p_idx, projectile.owner, fighter.id));
            }
        }
    }

    for (p_idx, owner, target) in hits {
        let projectile = state.projectiles[p_idx].id;
        #[cfg(feature = "debug-tracing")]
        tracing::trace!(projectile = projectile.0, %owner, %target, "projectile hit");
        let event = GameEvent::projectile_hit(state.frame, now, projectile, owner, target);
        state.push_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Arena, FighterState};

    fn arena_with(kinds: &[(CharacterKind, Vec2)]) -> MatchState {
        let mut state = MatchState::new([0; 16], 42, Arena::default());
        for (slot, (kind, pos)) in kinds.iter().enumerate() {
            state.insert_fighter(FighterState::new(
                FighterId(0), slot, *kind, *pos, Vec2::ZERO, 48.0, 100,
            ));
        }
        state
    }

    #[test]
    fn test_blaze_fires_once_at_opponent() {
        let config = ProjectileConfig::default();
        let mut state = arena_with(&[
            (CharacterKind::Blaze, Vec2::new(100.0, 100.0)),
            (CharacterKind::Plain, Vec2::new(400.0, 500.0)),
        ]);

        spawn_blaze_projectiles(&mut state, 1.0, &config);
        assert_eq!(state.projectiles.len(), 1);

        let p = &state.projectiles[0];
        assert_eq!(p.owner, FighterId(0));
        assert_eq!(p.position, Vec2::new(100.0, 100.0));
        // 300-400-500 triangle, scaled to speed 18
        assert!((p.velocity.x - 10.8).abs() < 1e-9);
        assert!((p.velocity.y - 14.4).abs() < 1e-9);
        assert_eq!(p.radius, 20.0);
        assert_eq!(state.fighters[0].last_projectile_time, 1.0);

        // Same instant: cooldown not elapsed
        spawn_blaze_projectiles(&mut state, 1.5, &config);
        assert_eq!(state.projectiles.len(), 1);

        spawn_blaze_projectiles(&mut state, 2.0, &config);
        assert_eq!(state.projectiles.len(), 2);

        let events = state.take_events();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_blaze_waits_for_first_second() {
        let config = ProjectileConfig::default();
        let mut state = arena_with(&[
            (CharacterKind::Blaze, Vec2::new(100.0, 100.0)),
            (CharacterKind::Steve, Vec2::new(400.0, 500.0)),
        ]);

        spawn_blaze_projectiles(&mut state, 0.99, &config);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_blaze_random_aim_without_single_opponent() {
        let config = ProjectileConfig::default();
        let mut state = arena_with(&[(CharacterKind::Blaze, Vec2::new(300.0, 300.0))]);

        spawn_blaze_projectiles(&mut state, 1.0, &config);
        assert_eq!(state.projectiles.len(), 1);
        assert!((state.projectiles[0].velocity.length() - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_aim_direction_coincident() {
        let p = Vec2::new(5.0, 5.0);
        assert_eq!(aim_direction(p, p), Vec2::ZERO);
        assert_eq!(aim_direction(p, Vec2::new(8.0, 5.0)), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_projectile_culled_by_center() {
        let mut state = arena_with(&[]);
        // Center inside while the radius pokes out: stays alive
        state.spawn_projectile(FighterId(9), Vec2::new(660.0, 300.0), Vec2::new(10.0, 0.0), 20.0);
        update_projectiles(&mut state);
        assert!(state.projectiles[0].active);
        assert_eq!(state.projectiles[0].position, Vec2::new(670.0, 300.0));

        update_projectiles(&mut state);
        assert!(!state.projectiles[0].active);

        state.prune_inactive();
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_projectile_hit_burns_and_refreshes() {
        let config = ProjectileConfig::default();
        let mut state = arena_with(&[
            (CharacterKind::Blaze, Vec2::new(100.0, 100.0)),
            (CharacterKind::Plain, Vec2::new(300.0, 300.0)),
        ]);
        state.fighters[1].ignite(5, 0.0);
        state.fighters[1].fire.remaining = 2;

        state.spawn_projectile(FighterId(0), Vec2::new(310.0, 300.0), Vec2::ZERO, 20.0);
        resolve_projectile_hits(&mut state, 3.0, &config);

        let target = &state.fighters[1];
        assert_eq!(target.health, 99);
        assert!(target.is_on_fire());
        assert_eq!(target.fire.remaining, 5);
        assert_eq!(target.fire.last_tick, 3.0);
        assert!(!state.projectiles[0].active);

        // Spent projectile never hits again
        resolve_projectile_hits(&mut state, 3.1, &config);
        assert_eq!(state.fighters[1].health, 99);
    }

    #[test]
    fn test_projectile_ignores_owner() {
        let config = ProjectileConfig::default();
        let mut state = arena_with(&[
            (CharacterKind::Blaze, Vec2::new(100.0, 100.0)),
            (CharacterKind::Plain, Vec2::new(500.0, 500.0)),
        ]);
        state.spawn_projectile(FighterId(0), Vec2::new(100.0, 100.0), Vec2::ZERO, 20.0);

        resolve_projectile_hits(&mut state, 1.0, &config);
        assert_eq!(state.fighters[0].health, 100);
        assert!(state.projectiles[0].active);
    }

    #[test]
    fn test_projectile_hits_only_one_of_overlapping_fighters() {
        let config = ProjectileConfig::default();
        let mut state = arena_with(&[
            (CharacterKind::Blaze, Vec2::new(600.0, 600.0)),
            (CharacterKind::Plain, Vec2::new(200.0, 200.0)),
            (CharacterKind::Plain, Vec2::new(260.0, 200.0)),
        ]);
        state.spawn_projectile(FighterId(0), Vec2::new(230.0, 200.0), Vec2::ZERO, 20.0);

        resolve_projectile_hits(&mut state, 1.0, &config);
        assert_eq!(state.fighters[1].health, 99);
        assert_eq!(state.fighters[2].health, 100);
    }
}
