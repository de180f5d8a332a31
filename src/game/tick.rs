//! Simulation Tick
//!
//! One call to [`tick`] is one complete frame of combat. The order of the
//! steps is fixed; changing it changes the outcome of matches.

use serde::{Serialize, Deserialize};

use crate::game::ability::AbilityConfig;
use crate::game::collision::resolve_fighter_collisions;
use crate::game::effect::{update_effects, EffectConfig};
use crate::game::events::GameEvent;
use crate::game::physics::{clamp_to_arena, move_fighter};
use crate::game::projectile::{
    resolve_projectile_hits, spawn_blaze_projectiles, update_projectiles, ProjectileConfig,
};
use crate::game::state::{Arena, FighterConfig, FighterState, MatchOutcome, MatchPhase, MatchState, SimTime};
use crate::game::status::{process_status_effects, StatusConfig};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this frame, in emission order
    pub events: Vec<GameEvent>,
    /// Fighters removed this frame
    pub eliminated: Vec<FighterState>,
    /// Whether the match is over
    pub match_ended: bool,
    /// Outcome (Undecided while running)
    pub outcome: MatchOutcome,
}

/// Configuration for match simulation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Arena size
    pub arena: Arena,
    /// Spawn parameters
    pub fighter: FighterConfig,
    /// Blaze projectiles
    pub projectile: ProjectileConfig,
    /// Damage over time
    pub status: StatusConfig,
    /// Collision abilities
    pub abilities: AbilityConfig,
    /// Visual effects
    pub effects: EffectConfig,
    /// Round-end presentation timing
    pub round_end: RoundEndConfig,
    /// Pin the match seed instead of deriving it
    pub seed: Option<u64>,
}

/// Winner celebration timing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundEndConfig {
    /// Seconds the winner grows to fill the arena
    pub grow_seconds: f64,
    /// Seconds the winner is held on screen afterwards
    pub hold_seconds: f64,
}

impl Default for RoundEndConfig {
    fn default() -> Self {
        Self {
            grow_seconds: 1.0,
            hold_seconds: 3.0,
        }
    }
}

impl RoundEndConfig {
    /// Total time before returning to selection.
    pub fn total(&self) -> f64 {
        self.grow_seconds + self.hold_seconds
    }
}

/// Run one simulation frame at simulation time `now`.
///
/// Steps, in order:
///
/// 1. move fighters (wall bounces)
/// 2. blaze shots
/// 3. move and cull projectiles
/// 4. projectile impacts
/// 5. fighter collisions and abilities
/// 6. clamp fighters back inside the arena
/// 7. status decay
/// 8. remove fighters at or below zero health
/// 9. expire effects, drop spent projectiles
/// 10. end check
///
/// Ticking an ended match does nothing.
pub fn tick(state: &mut MatchState, now: SimTime, config: &MatchConfig) -> TickResult {
    let mut result = TickResult::default();

    if let MatchPhase::Ended(outcome) = state.phase {
        result.match_ended = true;
        result.outcome = outcome;
        return result;
    }

    state.frame += 1;
    state.time = now;

    // 1. Move fighters
    let arena = state.arena;
    for fighter in state.fighters.iter_mut() {
        move_fighter(fighter, &arena);
    }

    // 2. Blaze shots
    spawn_blaze_projectiles(state, now, &config.projectile);

    // 3. Projectile motion
    update_projectiles(state);

    // 4. Projectile impacts
    resolve_projectile_hits(state, now, &config.projectile);

    // 5. Fighter collisions
    resolve_fighter_collisions(state, now, &config.abilities, &config.effects);

    // 6. Collision pushes may cross a wall
    for fighter in state.fighters.iter_mut() {
        clamp_to_arena(fighter, &arena);
    }

    // 7. Status decay
    for fighter in state.fighters.iter_mut() {
        process_status_effects(fighter, now, &config.status);
    }

    // 8. Remove the dead
    result.eliminated = state.prune_dead();
    for dead in &result.eliminated {
        tracing::debug!(fighter = %dead.id, kind = %dead.kind, health = dead.health, "fighter eliminated");
        let event = GameEvent::fighter_eliminated(state.frame, now, dead.id, dead.kind, dead.health);
        state.push_event(event);
    }

    // 9. Expire effects and spent projectiles
    update_effects(&mut state.effects, now);
    state.prune_inactive();

    // 10. End check
    check_end_conditions(state, now, &mut result);

    result.events = state.take_events();
    // Stable: same-priority events keep the order they happened in
    result.events.sort_by_key(|event| event.priority);
    result
}

/// End the match once at most one fighter is left.
fn check_end_conditions(state: &mut MatchState, now: SimTime, result: &mut TickResult) {
    let outcome = match state.fighters.as_slice() {
        [] => MatchOutcome::NoSurvivors,
        [winner] => MatchOutcome::Winner {
            fighter: winner.id,
            slot: winner.slot,
            kind: winner.kind,
            health: winner.health,
        },
        _ => return,
    };

    state.phase = MatchPhase::Ended(outcome);
    result.match_ended = true;
    result.outcome = outcome;

    tracing::info!(frame = state.frame, ?outcome, "match decided");
    state.push_event(GameEvent::match_ended(state.frame, now, outcome));
}

/// Run up to `max_frames` frames of `dt` seconds, stopping early when
/// the match ends.
///
/// Frame `n` (1-based) is simulated at `start + n * dt`. Returns every
/// event generated.
pub fn run_frames(
    state: &mut MatchState,
    start: SimTime,
    dt: f64,
    max_frames: u64,
    config: &MatchConfig,
) -> Vec<GameEvent> {
    let mut all_events = Vec::new();

    for n in 1..=max_frames {
        let result = tick(state, start + n as f64 * dt, config);
        all_events.extend(result.events);

        if result.match_ended {
            break;
        }
    }

    all_events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vec2;
    use crate::game::events::GameEventData;
    use crate::game::state::{CharacterKind, FighterId};
    use crate::FRAME_DT;

    fn spawned(seed: u64, kinds: [CharacterKind; 2], config: &MatchConfig) -> MatchState {
        let mut state = MatchState::new([7; 16], seed, config.arena);
        for (slot, kind) in kinds.into_iter().enumerate() {
            state.spawn_fighter(slot, kind, &config.fighter).unwrap();
        }
        state
    }

    fn placed(fighters: &[(CharacterKind, Vec2, Vec2, i32)]) -> MatchState {
        let mut state = MatchState::new([0; 16], 1, Arena::default());
        for (slot, (kind, pos, vel, health)) in fighters.iter().enumerate() {
            state.insert_fighter(FighterState::new(FighterId(0), slot, *kind, *pos, *vel, 48.0, *health));
        }
        state
    }

    #[test]
    fn test_tick_determinism() {
        let config = MatchConfig::default();
        let kinds = [CharacterKind::Blaze, CharacterKind::Creeper];

        let mut state1 = spawned(12345, kinds, &config);
        let mut state2 = spawned(12345, kinds, &config);

        let events1 = run_frames(&mut state1, 0.0, FRAME_DT, 600, &config);
        let events2 = run_frames(&mut state2, 0.0, FRAME_DT, 600, &config);

        assert_eq!(state1.frame, state2.frame);
        assert_eq!(state1.compute_hash(), state2.compute_hash());
        assert_eq!(events1, events2);
    }

    #[test]
    fn test_blaze_fires_exactly_once_at_one_second() {
        let config = MatchConfig::default();
        let mut state = placed(&[
            (CharacterKind::Blaze, Vec2::new(100.0, 100.0), Vec2::ZERO, 100),
            (CharacterKind::Plain, Vec2::new(500.0, 600.0), Vec2::ZERO, 100),
        ]);

        let result = tick(&mut state, 1.0, &config);
        assert_eq!(state.projectiles.len(), 1);

        let fired: Vec<_> = result
            .events
            .iter()
            .filter(|e| matches!(e.data, GameEventData::ProjectileFired { .. }))
            .collect();
        assert_eq!(fired.len(), 1);

        // Aimed at the opponent's center at spawn time
        let dir = state.projectiles[0].velocity.normalize();
        let expected = (Vec2::new(500.0, 600.0) - Vec2::new(100.0, 100.0)).normalize();
        assert!((dir.x - expected.x).abs() < 1e-9);
        assert!((dir.y - expected.y).abs() < 1e-9);
    }

    #[test]
    fn test_plain_collision_through_tick() {
        let config = MatchConfig::default();
        // Already overlapping, closing at 10 px/frame
        let mut state = placed(&[
            (CharacterKind::Plain, Vec2::new(100.0, 300.0), Vec2::new(5.0, 0.0), 20),
            (CharacterKind::Plain, Vec2::new(190.0, 300.0), Vec2::new(-5.0, 0.0), 20),
        ]);

        let result = tick(&mut state, FRAME_DT, &config);
        assert!(!result.match_ended);

        let (a, b) = (&state.fighters[0], &state.fighters[1]);
        assert_eq!((a.health, b.health), (19, 19));
        assert_eq!(a.velocity.x, -5.0);
        assert_eq!(b.velocity.x, 5.0);
        assert!(a.position.distance(b.position) >= 96.0 - 1e-9);
    }

    #[test]
    fn test_head_on_plains_end_with_no_survivors() {
        let config = MatchConfig::default();
        let mut state = placed(&[
            (CharacterKind::Plain, Vec2::new(100.0, 350.0), Vec2::new(6.0, 0.0), 5),
            (CharacterKind::Plain, Vec2::new(500.0, 350.0), Vec2::new(-6.0, 0.0), 5),
        ]);

        run_frames(&mut state, 0.0, FRAME_DT, 100_000, &config);
        assert!(state.is_ended());
        assert_eq!(state.outcome(), MatchOutcome::NoSurvivors);
        assert!(state.fighters.is_empty());
    }

    #[test]
    fn test_frame_events_reported_by_priority() {
        let config = MatchConfig::default();
        let mut state = placed(&[
            (CharacterKind::Plain, Vec2::new(100.0, 300.0), Vec2::new(5.0, 0.0), 1),
            (CharacterKind::Plain, Vec2::new(190.0, 300.0), Vec2::new(-5.0, 0.0), 1),
        ]);

        let result = tick(&mut state, FRAME_DT, &config);
        assert!(result.match_ended);

        // Collision happened first, but deaths are reported first
        let kinds: Vec<_> = result.events.iter().map(|e| &e.data).collect();
        assert_eq!(kinds.len(), 4);
        assert!(matches!(kinds[0], GameEventData::FighterEliminated { fighter: FighterId(0), .. }));
        assert!(matches!(kinds[1], GameEventData::FighterEliminated { fighter: FighterId(1), .. }));
        assert!(matches!(kinds[2], GameEventData::FightersCollided { .. }));
        assert!(matches!(kinds[3], GameEventData::MatchEnded { outcome: MatchOutcome::NoSurvivors, .. }));

        assert!(result.events.windows(2).all(|w| w[0].priority <= w[1].priority));
    }

    #[test]
    fn test_blaze_outlasts_plain() {
        let config = MatchConfig::default();
        let mut state = placed(&[
            (CharacterKind::Blaze, Vec2::new(100.0, 350.0), Vec2::new(6.0, 0.0), 5),
            (CharacterKind::Plain, Vec2::new(500.0, 350.0), Vec2::new(-6.0, 0.0), 5),
        ]);

        let events = run_frames(&mut state, 0.0, FRAME_DT, 100_000, &config);
        match state.outcome() {
            MatchOutcome::Winner { fighter, slot, kind, health } => {
                assert_eq!(fighter, FighterId(0));
                assert_eq!(slot, 0);
                assert_eq!(kind, CharacterKind::Blaze);
                assert!(health > 0);
            }
            other => panic!("expected a winner, got {other:?}"),
        }

        assert!(events.iter().any(|e| matches!(e.data, GameEventData::ProjectileHit { .. })));
        assert!(matches!(events.last().map(|e| &e.data), Some(GameEventData::MatchEnded { .. })));
    }

    #[test]
    fn test_bounds_hold_every_frame() {
        let config = MatchConfig::default();

        for seed in 0..20 {
            let a = CharacterKind::ALL[seed as usize % 5];
            let b = CharacterKind::ALL[(seed as usize / 5) % 5];
            let mut state = spawned(seed, [a, b], &config);

            for n in 1..=1500u64 {
                let result = tick(&mut state, n as f64 * FRAME_DT, &config);
                for f in &state.fighters {
                    assert!(f.position.x >= f.radius && f.position.x <= config.arena.width - f.radius);
                    assert!(f.position.y >= f.radius && f.position.y <= config.arena.height - f.radius);
                    assert!(f.position.is_finite() && f.velocity.is_finite());
                }
                if result.match_ended {
                    break;
                }
            }
        }
    }

    #[test]
    fn test_termination_leaves_at_most_one() {
        let mut config = MatchConfig::default();
        config.fighter.health = 6;

        for seed in 0..25 {
            let kinds = [CharacterKind::ALL[seed as usize % 5], CharacterKind::ALL[(seed as usize + 2) % 5]];
            let mut state = spawned(seed, kinds, &config);
            run_frames(&mut state, 0.0, FRAME_DT, 60 * 600, &config);

            assert!(state.fighters.len() <= 2);
            match state.outcome() {
                MatchOutcome::Winner { slot, kind, health, .. } => {
                    assert_eq!(state.fighters.len(), 1);
                    assert_eq!(kind, kinds[slot]);
                    assert!(health > 0);
                }
                MatchOutcome::NoSurvivors => assert!(state.fighters.is_empty()),
                MatchOutcome::Undecided => assert_eq!(state.fighters.len(), 2),
            }
        }
    }

    #[test]
    fn test_ended_match_ignores_ticks() {
        let config = MatchConfig::default();
        let mut state = placed(&[(CharacterKind::Steve, Vec2::new(300.0, 300.0), Vec2::new(3.0, 3.0), 10)]);

        let first = tick(&mut state, FRAME_DT, &config);
        assert!(first.match_ended);
        assert!(matches!(first.outcome, MatchOutcome::Winner { kind: CharacterKind::Steve, .. }));

        let frame = state.frame;
        let hash = state.compute_hash();
        let again = tick(&mut state, 2.0 * FRAME_DT, &config);
        assert!(again.match_ended);
        assert!(again.events.is_empty());
        assert_eq!(state.frame, frame);
        assert_eq!(state.compute_hash(), hash);
    }

    #[test]
    fn test_status_damage_can_kill() {
        let config = MatchConfig::default();
        let mut state = placed(&[
            (CharacterKind::Plain, Vec2::new(100.0, 100.0), Vec2::ZERO, 1),
            (CharacterKind::Plain, Vec2::new(500.0, 500.0), Vec2::ZERO, 10),
        ]);
        state.fighters[0].apply_poison(3, 0.0);

        let result = tick(&mut state, 1.0, &config);
        assert_eq!(result.eliminated.len(), 1);
        assert_eq!(result.eliminated[0].id, FighterId(0));
        assert!(matches!(result.outcome, MatchOutcome::Winner { slot: 1, health: 10, .. }));
    }
}
