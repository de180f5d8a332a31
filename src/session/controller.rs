//! Match Controller
//!
//! Owns the simulation clock and the lifecycle of matches:
//!
//! ```text
//! SELECTING --start--> RUNNING --one survivor--> ROUND_END --timeout/restart--> SELECTING
//!                         |
//!                         +--no survivors--> SELECTING
//! ```
//!
//! The controller is a plain state machine driven by [`MatchController::advance`];
//! starting any number of consecutive matches never grows the call stack.

use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::hash::StateHash;
use crate::core::rng::derive_match_seed;
use crate::game::events::GameEvent;
use crate::game::input::{parse_roster, InputEvent};
use crate::game::snapshot::MatchSnapshot;
use crate::game::state::{
    CharacterKind, FighterId, MatchOutcome, MatchState, SimTime, SpawnError, UnknownCharacter,
};
use crate::game::tick::{tick, MatchConfig};

/// Fighters per match.
pub const ROSTER_SIZE: usize = 2;

// =============================================================================
// STATE
// =============================================================================

/// The winner as shown on the round-end screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinnerInfo {
    /// Winning fighter
    pub fighter: FighterId,
    /// Its roster slot
    pub slot: usize,
    /// Its kind (portrait and banner text)
    pub kind: CharacterKind,
    /// Its body color
    pub color: [u8; 3],
    /// Health it finished with
    pub health: i32,
}

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ControllerState {
    /// Waiting for a roster.
    Selecting,
    /// Combat frames are being simulated.
    Running,
    /// Winner celebration.
    RoundEnd {
        /// Who won
        winner: WinnerInfo,
        /// Clock value when the round ended
        started_at: SimTime,
    },
}

impl ControllerState {
    /// Short lowercase name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            ControllerState::Selecting => "selecting",
            ControllerState::Running => "running",
            ControllerState::RoundEnd { .. } => "round_end",
        }
    }
}

/// Controller errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchError {
    /// Operation not allowed in the current state.
    #[error("cannot {action} while {state}")]
    InvalidState {
        /// What was attempted
        action: &'static str,
        /// Controller state at the time
        state: &'static str,
    },

    /// Roster does not have exactly two entries.
    #[error("roster must have exactly {expected} fighters, got {actual}")]
    RosterSize {
        /// Required roster size
        expected: usize,
        /// Supplied roster size
        actual: usize,
    },

    /// Time step is negative, NaN or infinite.
    #[error("time step must be finite and non-negative, got {0}")]
    InvalidTimeStep(f64),

    /// Roster name did not parse.
    #[error(transparent)]
    UnknownCharacter(#[from] UnknownCharacter),

    /// Fighters could not be placed.
    #[error("spawn failed: {0}")]
    SpawnFailed(#[from] SpawnError),
}

/// Identity of a finished match, for logs and summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Match id
    pub match_id: Uuid,
    /// RNG seed used
    pub seed: u64,
    /// Roster in slot order
    pub roster: Vec<CharacterKind>,
    /// Frames simulated
    pub frames: u64,
    /// Terminal outcome
    pub outcome: MatchOutcome,
    /// Final state hash, hex encoded
    pub state_hash: String,
}

/// What one call to [`MatchController::advance`] did.
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Whether a combat frame was simulated
    pub simulated: bool,
    /// Events from that frame
    pub events: Vec<GameEvent>,
    /// Set on the frame a match ends
    pub finished: Option<MatchSummary>,
}

/// Render view of the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    /// Controller state
    pub state: ControllerState,
    /// Current clock value
    pub clock: SimTime,
    /// Match view while running (and frozen during round end)
    pub arena: Option<MatchSnapshot>,
    /// Winner growth progress in `[0, 1]` during round end
    pub celebration_progress: Option<f64>,
    /// Outcome of the most recent match
    pub last_outcome: Option<MatchOutcome>,
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Everything input handling may touch, for rolling back a rejected batch.
struct Checkpoint {
    state: ControllerState,
    current: Option<MatchState>,
    roster: Vec<CharacterKind>,
    matches_started: u64,
}

/// Drives matches from roster selection to the round-end screen.
pub struct MatchController {
    config: MatchConfig,
    state: ControllerState,
    clock: SimTime,
    current: Option<MatchState>,
    roster: Vec<CharacterKind>,
    matches_started: u64,
    last_outcome: Option<MatchOutcome>,
}

impl MatchController {
    /// Create a controller in the selection state with the clock at zero.
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            state: ControllerState::Selecting,
            clock: 0.0,
            current: None,
            roster: Vec::new(),
            matches_started: 0,
            last_outcome: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Simulation clock (seconds).
    pub fn clock(&self) -> SimTime {
        self.clock
    }

    /// Configuration in use.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Match being simulated (or celebrated), if any.
    pub fn current_match(&self) -> Option<&MatchState> {
        self.current.as_ref()
    }

    /// Outcome of the most recent finished match.
    pub fn last_outcome(&self) -> Option<MatchOutcome> {
        self.last_outcome
    }

    /// Matches started so far.
    pub fn matches_started(&self) -> u64 {
        self.matches_started
    }

    /// Start a match from two character kinds.
    ///
    /// Only valid while selecting. Uses the configured seed if pinned,
    /// otherwise derives one from a fresh match id and the roster.
    pub fn start_match(&mut self, roster: &[CharacterKind]) -> Result<Uuid, MatchError> {
        if self.state != ControllerState::Selecting {
            return Err(MatchError::InvalidState {
                action: "start a match",
                state: self.state.name(),
            });
        }
        if roster.len() != ROSTER_SIZE {
            return Err(MatchError::RosterSize {
                expected: ROSTER_SIZE,
                actual: roster.len(),
            });
        }

        let names: Vec<&str> = roster.iter().map(|kind| kind.name()).collect();
        let (match_id, seed) = match self.config.seed {
            Some(seed) => {
                let mut bytes = [0u8; 16];
                bytes[..8].copy_from_slice(&seed.to_le_bytes());
                bytes[8..].copy_from_slice(&self.matches_started.to_le_bytes());
                (Uuid::from_bytes(bytes), seed)
            }
            None => {
                let match_id = Uuid::new_v4();
                let seed = derive_match_seed(match_id.as_bytes(), &names);
                (match_id, seed)
            }
        };

        let mut state = MatchState::new(*match_id.as_bytes(), seed, self.config.arena);
        for (slot, kind) in roster.iter().enumerate() {
            state.spawn_fighter(slot, *kind, &self.config.fighter)?;
        }
        state.time = self.clock;

        info!("Match {} started: {} (seed {})", match_id, names.join(" vs "), seed);
        for fighter in &state.fighters {
            debug!("  {} {} at {} moving {}", fighter.id, fighter.kind, fighter.position, fighter.velocity);
        }

        self.current = Some(state);
        self.roster = roster.to_vec();
        self.state = ControllerState::Running;
        self.matches_started += 1;

        Ok(match_id)
    }

    /// Start a match from roster names (case-insensitive).
    pub fn start_match_named<S: AsRef<str>>(&mut self, names: &[S]) -> Result<Uuid, MatchError> {
        let roster = parse_roster(names)?;
        self.start_match(&roster)
    }

    /// Abandon the running match and return to selection.
    pub fn abort_match(&mut self) -> Result<(), MatchError> {
        if self.state != ControllerState::Running {
            return Err(MatchError::InvalidState {
                action: "abort a match",
                state: self.state.name(),
            });
        }
        warn!("Match aborted at clock {:.3}", self.clock);
        self.return_to_selection();
        Ok(())
    }

    /// Advance the clock by `dt` seconds, apply `inputs`, and simulate one
    /// frame if a match is running.
    ///
    /// Inputs are applied before the frame, so a start event's first frame
    /// runs in the same call. The call is all or nothing: a rejected time
    /// step or any rejected input leaves the controller exactly as it was,
    /// including inputs earlier in the same batch.
    pub fn advance(&mut self, dt: f64, inputs: &[InputEvent]) -> Result<FrameReport, MatchError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(MatchError::InvalidTimeStep(dt));
        }

        if !inputs.is_empty() {
            let checkpoint = self.checkpoint();
            if let Err(err) = self.apply_inputs(inputs) {
                self.restore(checkpoint);
                return Err(err);
            }
        }

        self.clock += dt;
        let mut report = FrameReport::default();

        match self.state {
            ControllerState::Selecting => {}
            ControllerState::Running => self.run_frame(&mut report),
            ControllerState::RoundEnd { started_at, .. } => {
                if self.clock - started_at >= self.config.round_end.total() {
                    debug!("Round end finished, back to selection");
                    self.return_to_selection();
                }
            }
        }

        Ok(report)
    }

    /// Render view of the controller.
    pub fn snapshot(&self) -> ControllerSnapshot {
        let celebration_progress = match self.state {
            ControllerState::RoundEnd { started_at, .. } => {
                let grow = self.config.round_end.grow_seconds;
                let elapsed = self.clock - started_at;
                Some(if grow <= 0.0 { 1.0 } else { (elapsed / grow).clamp(0.0, 1.0) })
            }
            _ => None,
        };

        ControllerSnapshot {
            state: self.state,
            clock: self.clock,
            arena: self.current.as_ref().map(MatchSnapshot::capture),
            celebration_progress,
            last_outcome: self.last_outcome,
        }
    }

    fn apply_inputs(&mut self, inputs: &[InputEvent]) -> Result<(), MatchError> {
        for input in inputs {
            match input {
                InputEvent::StartMatch(roster) => {
                    self.start_match(roster)?;
                }
                InputEvent::Restart => self.restart(),
            }
        }
        Ok(())
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            state: self.state,
            current: self.current.clone(),
            roster: self.roster.clone(),
            matches_started: self.matches_started,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.state = checkpoint.state;
        self.current = checkpoint.current;
        self.roster = checkpoint.roster;
        self.matches_started = checkpoint.matches_started;
    }

    fn restart(&mut self) {
        match self.state {
            ControllerState::RoundEnd { .. } => {
                debug!("Restart requested, skipping round end");
                self.return_to_selection();
            }
            other => debug!("Restart ignored while {}", other.name()),
        }
    }

    fn run_frame(&mut self, report: &mut FrameReport) {
        let Some(state) = self.current.as_mut() else {
            self.state = ControllerState::Selecting;
            return;
        };

        let result = tick(state, self.clock, &self.config);
        report.simulated = true;
        report.events = result.events;

        #[cfg(feature = "debug-tracing")]
        tracing::trace!(frame = state.frame, fighters = state.fighters.len(), "frame");

        if !result.match_ended {
            return;
        }

        let hash: StateHash = state.compute_hash();
        let summary = MatchSummary {
            match_id: Uuid::from_bytes(state.match_id),
            seed: state.rng_seed,
            roster: self.roster.clone(),
            frames: state.frame,
            outcome: result.outcome,
            state_hash: hex::encode(hash),
        };
        self.last_outcome = Some(result.outcome);

        match result.outcome {
            MatchOutcome::Winner { fighter, slot, kind, health } => {
                let color = state
                    .get_fighter(fighter)
                    .map(|f| f.color)
                    .unwrap_or_else(|| self.config.fighter.color_for_slot(slot));
                info!("{} wins with {} health after {} frames", kind.display_name(), health, state.frame);
                self.state = ControllerState::RoundEnd {
                    winner: WinnerInfo { fighter, slot, kind, color, health },
                    started_at: self.clock,
                };
            }
            MatchOutcome::NoSurvivors => {
                info!("No survivors after {} frames", state.frame);
                self.return_to_selection();
            }
            MatchOutcome::Undecided => {}
        }

        report.finished = Some(summary);
    }

    fn return_to_selection(&mut self) {
        self.current = None;
        self.state = ControllerState::Selecting;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vec2;
    use crate::game::state::FighterState;
    use crate::FRAME_DT;

    fn pinned(seed: u64) -> MatchConfig {
        MatchConfig {
            seed: Some(seed),
            ..MatchConfig::default()
        }
    }

    /// Replace the spawned fighters with hand-placed ones.
    fn place(controller: &mut MatchController, fighters: &[(CharacterKind, Vec2, Vec2, i32)]) {
        let state = controller.current.as_mut().unwrap();
        state.fighters.clear();
        for (slot, (kind, pos, vel, health)) in fighters.iter().enumerate() {
            let mut f = FighterState::new(FighterId(0), slot, *kind, *pos, *vel, 48.0, *health);
            f.color = [1, 2, 3];
            state.insert_fighter(f);
        }
    }

    #[test]
    fn test_roster_must_have_two() {
        let mut c = MatchController::new(MatchConfig::default());
        assert_eq!(
            c.start_match(&[CharacterKind::Blaze]),
            Err(MatchError::RosterSize { expected: 2, actual: 1 })
        );
        assert_eq!(
            c.start_match(&[CharacterKind::Blaze; 3]),
            Err(MatchError::RosterSize { expected: 2, actual: 3 })
        );
        assert_eq!(c.state(), ControllerState::Selecting);
    }

    #[test]
    fn test_unknown_character_name() {
        let mut c = MatchController::new(MatchConfig::default());
        let err = c.start_match_named(&["blaze", "ghast"]).unwrap_err();
        assert_eq!(err, MatchError::UnknownCharacter(UnknownCharacter("ghast".into())));
    }

    #[test]
    fn test_start_twice_is_invalid() {
        let mut c = MatchController::new(MatchConfig::default());
        c.start_match_named(&["blaze", "steve"]).unwrap();
        assert_eq!(c.state(), ControllerState::Running);
        assert!(matches!(
            c.start_match_named(&["plain", "plain"]),
            Err(MatchError::InvalidState { state: "running", .. })
        ));
    }

    #[test]
    fn test_invalid_time_step_changes_nothing() {
        let mut c = MatchController::new(MatchConfig::default());
        c.start_match_named(&["creeper", "steve"]).unwrap();
        c.advance(FRAME_DT, &[]).unwrap();
        let frame = c.current_match().unwrap().frame;
        let clock = c.clock();

        for dt in [-0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(c.advance(dt, &[]), Err(MatchError::InvalidTimeStep(_))));
        }
        assert_eq!(c.clock(), clock);
        assert_eq!(c.current_match().unwrap().frame, frame);
    }

    #[test]
    fn test_rejected_input_batch_rolls_back() {
        let mut c = MatchController::new(pinned(8));
        let roster = vec![CharacterKind::Plain, CharacterKind::Blaze];
        let batch = [InputEvent::StartMatch(roster.clone()), InputEvent::StartMatch(roster)];

        assert!(matches!(
            c.advance(FRAME_DT, &batch),
            Err(MatchError::InvalidState { state: "running", .. })
        ));
        assert_eq!(c.state(), ControllerState::Selecting);
        assert!(c.current_match().is_none());
        assert_eq!(c.matches_started(), 0);
        assert_eq!(c.clock(), 0.0);

        // Rolled back from a running match too
        c.start_match_named(&["steve", "creeper"]).unwrap();
        c.advance(FRAME_DT, &[]).unwrap();
        let frame = c.current_match().unwrap().frame;
        let hash = c.current_match().unwrap().compute_hash();
        let bad = [InputEvent::Restart, InputEvent::StartMatch(vec![CharacterKind::Steve])];
        assert!(c.advance(FRAME_DT, &bad).is_err());
        assert_eq!(c.state(), ControllerState::Running);
        assert_eq!(c.current_match().unwrap().frame, frame);
        assert_eq!(c.current_match().unwrap().compute_hash(), hash);
        assert_eq!(c.matches_started(), 1);
    }

    #[test]
    fn test_start_via_input_runs_first_frame() {
        let mut c = MatchController::new(MatchConfig::default());
        let report = c
            .advance(FRAME_DT, &[InputEvent::StartMatch(vec![CharacterKind::Plain, CharacterKind::Blaze])])
            .unwrap();
        assert!(report.simulated);
        assert_eq!(c.current_match().unwrap().frame, 1);
        assert_eq!(c.matches_started(), 1);
    }

    #[test]
    fn test_selecting_does_not_simulate() {
        let mut c = MatchController::new(MatchConfig::default());
        let report = c.advance(1.0, &[]).unwrap();
        assert!(!report.simulated);
        assert_eq!(c.clock(), 1.0);
        assert!(c.current_match().is_none());
    }

    #[test]
    fn test_winner_round_end_then_auto_restart() {
        let mut c = MatchController::new(pinned(3));
        c.start_match(&[CharacterKind::Steve, CharacterKind::Plain]).unwrap();
        place(&mut c, &[
            (CharacterKind::Steve, Vec2::new(300.0, 300.0), Vec2::ZERO, 10),
            (CharacterKind::Plain, Vec2::new(600.0, 600.0), Vec2::ZERO, 0),
        ]);

        let report = c.advance(FRAME_DT, &[]).unwrap();
        let summary = report.finished.expect("match should finish");
        assert_eq!(summary.roster, vec![CharacterKind::Steve, CharacterKind::Plain]);
        assert_eq!(summary.state_hash.len(), 64);

        match c.state() {
            ControllerState::RoundEnd { winner, .. } => {
                assert_eq!(winner.kind, CharacterKind::Steve);
                assert_eq!(winner.health, 10);
                assert_eq!(winner.color, [1, 2, 3]);
                assert_eq!(winner.slot, 0);
            }
            other => panic!("expected round end, got {other:?}"),
        }

        // Half-way through the growth animation
        c.advance(0.5, &[]).unwrap();
        let progress = c.snapshot().celebration_progress.unwrap();
        assert!((progress - 0.5).abs() < 1e-9);

        // Growth done, still holding
        c.advance(2.0, &[]).unwrap();
        assert_eq!(c.snapshot().celebration_progress, Some(1.0));
        assert!(matches!(c.state(), ControllerState::RoundEnd { .. }));

        // Past 1 + 3 seconds: back to selection without any input
        c.advance(1.6, &[]).unwrap();
        assert_eq!(c.state(), ControllerState::Selecting);
        assert!(c.current_match().is_none());
        assert!(matches!(c.last_outcome(), Some(MatchOutcome::Winner { .. })));
    }

    #[test]
    fn test_restart_skips_round_end() {
        let mut c = MatchController::new(pinned(4));
        c.start_match(&[CharacterKind::Blaze, CharacterKind::Creeper]).unwrap();
        place(&mut c, &[
            (CharacterKind::Blaze, Vec2::new(300.0, 300.0), Vec2::ZERO, 0),
            (CharacterKind::Creeper, Vec2::new(600.0, 600.0), Vec2::ZERO, 5),
        ]);
        c.advance(FRAME_DT, &[]).unwrap();
        assert!(matches!(c.state(), ControllerState::RoundEnd { .. }));

        c.advance(FRAME_DT, &[InputEvent::Restart]).unwrap();
        assert_eq!(c.state(), ControllerState::Selecting);
    }

    #[test]
    fn test_restart_ignored_while_running() {
        let mut c = MatchController::new(pinned(5));
        c.start_match(&[CharacterKind::Blaze, CharacterKind::Creeper]).unwrap();
        c.advance(FRAME_DT, &[InputEvent::Restart]).unwrap();
        assert_eq!(c.state(), ControllerState::Running);
    }

    #[test]
    fn test_no_survivors_skips_round_end() {
        let mut c = MatchController::new(pinned(6));
        c.start_match(&[CharacterKind::Plain, CharacterKind::Plain]).unwrap();
        place(&mut c, &[
            (CharacterKind::Plain, Vec2::new(300.0, 300.0), Vec2::new(2.0, 0.0), 1),
            (CharacterKind::Plain, Vec2::new(380.0, 300.0), Vec2::new(-2.0, 0.0), 1),
        ]);

        let report = c.advance(FRAME_DT, &[]).unwrap();
        assert_eq!(report.finished.map(|s| s.outcome), Some(MatchOutcome::NoSurvivors));
        assert_eq!(c.state(), ControllerState::Selecting);
        assert_eq!(c.last_outcome(), Some(MatchOutcome::NoSurvivors));
    }

    #[test]
    fn test_abort_match() {
        let mut c = MatchController::new(MatchConfig::default());
        assert!(c.abort_match().is_err());
        c.start_match_named(&["herobrine", "steve"]).unwrap();
        c.abort_match().unwrap();
        assert_eq!(c.state(), ControllerState::Selecting);
        // A new match can start straight away
        c.start_match_named(&["herobrine", "steve"]).unwrap();
    }

    #[test]
    fn test_pinned_seed_is_reproducible() {
        let run = || {
            let mut c = MatchController::new(pinned(2024));
            c.start_match(&[CharacterKind::Blaze, CharacterKind::Herobrine]).unwrap();
            for _ in 0..300 {
                c.advance(FRAME_DT, &[]).unwrap();
            }
            c.snapshot()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_many_consecutive_matches() {
        let mut config = pinned(77);
        config.fighter.health = 3;
        let mut c = MatchController::new(config);

        let mut finished = 0;
        for _ in 0..20 {
            c.start_match(&[CharacterKind::Creeper, CharacterKind::Steve]).unwrap();
            for _ in 0..100_000 {
                let report = c.advance(FRAME_DT, &[]).unwrap();
                if report.finished.is_some() {
                    finished += 1;
                    break;
                }
            }
            match c.state() {
                ControllerState::Running => c.abort_match().unwrap(),
                ControllerState::RoundEnd { .. } => {
                    c.advance(0.0, &[InputEvent::Restart]).unwrap();
                }
                ControllerState::Selecting => {}
            }
            assert_eq!(c.state(), ControllerState::Selecting);
        }

        assert_eq!(c.matches_started(), 20);
        assert!(finished > 0);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut c = MatchController::new(pinned(1));
        c.start_match_named(&["steve", "blaze"]).unwrap();
        c.advance(FRAME_DT, &[]).unwrap();

        let json = serde_json::to_value(c.snapshot()).unwrap();
        assert_eq!(json["state"]["state"], "running");
        assert_eq!(json["arena"]["fighters"].as_array().map(|a| a.len()), Some(2));
    }
}
