//! Render Snapshots
//!
//! Read-only view of a match for the renderer. Everything here is plain
//! data; nothing in a snapshot can be used to mutate the simulation.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::state::{
    Arena, CharacterKind, EffectKind, FighterId, MatchOutcome, MatchState, SimTime,
};

/// One fighter as the renderer sees it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FighterSnapshot {
    /// Stable id
    pub id: FighterId,
    /// Roster slot (sidebar side)
    pub slot: usize,
    /// Character kind, selects the portrait
    pub kind: CharacterKind,
    /// Body color
    pub color: [u8; 3],
    /// Center
    pub position: Vec2,
    /// Body radius
    pub radius: f64,
    /// Current health
    pub health: i32,
    /// Health bar maximum
    pub max_health: i32,
    /// Fire outline
    pub on_fire: bool,
    /// Poison outline
    pub poisoned: bool,
    /// False only for a hidden Herobrine (drawn mostly transparent)
    pub visible: bool,
}

/// One projectile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    /// Center
    pub position: Vec2,
    /// Sprite radius
    pub radius: f64,
}

/// One visual effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectSnapshot {
    /// Effect type
    pub kind: EffectKind,
    /// Center
    pub position: Vec2,
    /// Remaining life in `[0, 1]`, used as alpha
    pub life: f64,
    /// Current drawn radius
    pub radius: f64,
}

/// Complete render view of a match at one instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Frames simulated
    pub frame: u64,
    /// Simulation time of the frame
    pub time: SimTime,
    /// Arena bounds
    pub arena: Arena,
    /// Live fighters in roster order
    pub fighters: Vec<FighterSnapshot>,
    /// Projectiles in flight
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Effects still playing
    pub effects: Vec<EffectSnapshot>,
    /// Terminal signal
    pub outcome: MatchOutcome,
}

impl MatchSnapshot {
    /// Capture the match as of its latest frame.
    pub fn capture(state: &MatchState) -> Self {
        let now = state.time;

        let fighters = state
            .fighters
            .iter()
            .map(|f| FighterSnapshot {
                id: f.id,
                slot: f.slot,
                kind: f.kind,
                color: f.color,
                position: f.position,
                radius: f.radius,
                health: f.health,
                max_health: f.max_health,
                on_fire: f.is_on_fire(),
                poisoned: f.is_poisoned(),
                visible: !f.is_hidden(),
            })
            .collect();

        let projectiles = state
            .projectiles
            .iter()
            .filter(|p| p.active)
            .map(|p| ProjectileSnapshot {
                position: p.position,
                radius: p.radius,
            })
            .collect();

        let effects = state
            .effects
            .iter()
            .filter(|e| e.active)
            .map(|e| EffectSnapshot {
                kind: e.kind,
                position: e.position,
                life: e.life_fraction(now),
                radius: e.current_radius(now),
            })
            .collect();

        Self {
            frame: state.frame,
            time: now,
            arena: state.arena,
            fighters,
            projectiles,
            effects,
            outcome: state.outcome(),
        }
    }

    /// Fighter shown in a sidebar slot (0 = left, 1 = right), if alive.
    pub fn sidebar(&self, slot: usize) -> Option<&FighterSnapshot> {
        self.fighters.iter().find(|f| f.slot == slot)
    }
}
