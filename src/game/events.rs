//! Game Events
//!
//! Events generated during simulation. The driver logs them and the
//! renderer may use them for sounds or banners; they never feed back
//! into the simulation.

use serde::{Serialize, Deserialize};
use crate::core::vec2::Vec2;
use crate::game::state::{CharacterKind, FighterId, MatchOutcome, ProjectileId, SimTime};

/// Priority for ordering events within one frame.
///
/// Lower value = reported first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Deaths first
    Elimination = 0,
    /// Then damage from contact and abilities
    Combat = 1,
    /// Then projectile traffic
    Projectile = 2,
    /// Lowest priority
    Other = 255,
}

/// Which ability (if any) resolved a fighter collision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityUsed {
    /// Creeper explosion
    Explosion,
    /// Herobrine reveal or strike
    Herobrine,
    /// Steve knockback
    Knockback,
    /// Plain contact damage
    None,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEventData {
    /// Blaze launched a projectile
    ProjectileFired {
        /// Firing blaze
        owner: FighterId,
        /// New projectile
        projectile: ProjectileId,
    },

    /// Projectile struck a fighter and set it on fire
    ProjectileHit {
        /// Projectile that hit
        projectile: ProjectileId,
        /// Fighter that fired it
        owner: FighterId,
        /// Fighter struck
        target: FighterId,
    },

    /// Two fighters collided
    FightersCollided {
        /// First fighter in list order
        first: FighterId,
        /// Second fighter in list order
        second: FighterId,
        /// Rule that resolved the contact
        ability: AbilityUsed,
    },

    /// Creeper exploded
    Exploded {
        /// Exploding creeper
        creeper: FighterId,
        /// Blast center
        position: Vec2,
    },

    /// Fighter removed at health <= 0
    FighterEliminated {
        /// Removed fighter
        fighter: FighterId,
        /// Its kind
        kind: CharacterKind,
        /// Final (non-positive) health
        health: i32,
    },

    /// Match reached a terminal outcome
    MatchEnded {
        /// Terminal outcome
        outcome: MatchOutcome,
        /// Frames simulated
        frames: u64,
    },
}

/// A game event with timing and priority.
///
/// Events of one frame are reported in priority order; within a priority
/// they keep the order they happened in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Frame the event occurred on
    pub frame: u64,

    /// Simulation time of that frame
    pub time: SimTime,

    /// Ordering priority
    pub priority: EventPriority,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(frame: u64, time: SimTime, priority: EventPriority, data: GameEventData) -> Self {
        Self { frame, time, priority, data }
    }

    /// Create projectile fired event.
    pub fn projectile_fired(frame: u64, time: SimTime, owner: FighterId, projectile: ProjectileId) -> Self {
        Self::new(
            frame,
            time,
            EventPriority::Projectile,
            GameEventData::ProjectileFired { owner, projectile },
        )
    }

    /// Create projectile hit event.
    pub fn projectile_hit(
        frame: u64,
        time: SimTime,
        projectile: ProjectileId,
        owner: FighterId,
        target: FighterId,
    ) -> Self {
        Self::new(
            frame,
            time,
            EventPriority::Combat,
            GameEventData::ProjectileHit { projectile, owner, target },
        )
    }

    /// Create fighters collided event.
    pub fn fighters_collided(
        frame: u64,
        time: SimTime,
        first: FighterId,
        second: FighterId,
        ability: AbilityUsed,
    ) -> Self {
        Self::new(
            frame,
            time,
            EventPriority::Combat,
            GameEventData::FightersCollided { first, second, ability },
        )
    }

    /// Create explosion event.
    pub fn exploded(frame: u64, time: SimTime, creeper: FighterId, position: Vec2) -> Self {
        Self::new(
            frame,
            time,
            EventPriority::Combat,
            GameEventData::Exploded { creeper, position },
        )
    }

    /// Create fighter eliminated event.
    pub fn fighter_eliminated(
        frame: u64,
        time: SimTime,
        fighter: FighterId,
        kind: CharacterKind,
        health: i32,
    ) -> Self {
        Self::new(
            frame,
            time,
            EventPriority::Elimination,
            GameEventData::FighterEliminated { fighter, kind, health },
        )
    }

    /// Create match ended event.
    pub fn match_ended(frame: u64, time: SimTime, outcome: MatchOutcome) -> Self {
        Self::new(
            frame,
            time,
            EventPriority::Other,
            GameEventData::MatchEnded { outcome, frames: frame },
        )
    }
}
