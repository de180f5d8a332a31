//! Game State Definitions
//!
//! All state types for a single match: fighters, projectiles,
//! transient effects, the arena bounds and the match itself.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::core::rng::DeterministicRng;
use crate::core::hash::{StateHash, StateHasher, compute_state_hash};
use crate::game::events::GameEvent;
use crate::game::status::StatusEffect;

/// Simulation clock value in seconds, supplied by the caller.
pub type SimTime = f64;

// =============================================================================
// FIGHTER ID
// =============================================================================

/// Stable fighter identifier.
///
/// Assigned once at spawn and never reused within a match, so projectile
/// ownership stays valid after the fighter list is compacted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FighterId(pub u32);

impl fmt::Display for FighterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// Projectile identifier (monotonic per match).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectileId(pub u32);

// =============================================================================
// CHARACTER KIND
// =============================================================================

/// Ability archetype of a fighter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterKind {
    /// No special ability, generic collision damage only
    Plain,
    /// Fires burning projectiles at the opponent once per second
    Blaze,
    /// Explodes on contact
    Creeper,
    /// Knocks opponents back, punishes fast movers
    Steve,
    /// Invisible between hits, immune to damage over time while hidden
    Herobrine,
}

impl CharacterKind {
    /// Every selectable kind, in roster-screen order.
    pub const ALL: [CharacterKind; 5] = [
        CharacterKind::Plain,
        CharacterKind::Blaze,
        CharacterKind::Creeper,
        CharacterKind::Steve,
        CharacterKind::Herobrine,
    ];

    /// Lowercase identifier, as used by asset names and configuration.
    pub fn name(self) -> &'static str {
        match self {
            CharacterKind::Plain => "plain",
            CharacterKind::Blaze => "blaze",
            CharacterKind::Creeper => "creeper",
            CharacterKind::Steve => "steve",
            CharacterKind::Herobrine => "herobrine",
        }
    }

    /// Capitalized name for sidebars and the winner banner.
    pub fn display_name(self) -> &'static str {
        match self {
            CharacterKind::Plain => "Plain",
            CharacterKind::Blaze => "Blaze",
            CharacterKind::Creeper => "Creeper",
            CharacterKind::Steve => "Steve",
            CharacterKind::Herobrine => "Herobrine",
        }
    }
}

impl fmt::Display for CharacterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A roster entry that names no known character.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown character kind: {0:?}")]
pub struct UnknownCharacter(pub String);

impl FromStr for CharacterKind {
    type Err = UnknownCharacter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CharacterKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCharacter(s.to_string()))
    }
}

// =============================================================================
// ARENA
// =============================================================================

/// Axis-aligned arena rectangle with its origin at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: 675.0,
            height: 700.0,
        }
    }
}

impl Arena {
    /// Create an arena of the given size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether a point lies inside the rectangle (edges inclusive).
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }

    /// Whether a circle of this radius fits inside the arena at all.
    #[inline]
    pub fn fits(&self, radius: f64) -> bool {
        2.0 * radius <= self.width && 2.0 * radius <= self.height
    }

    /// Clamp a circle's center so the whole circle is inside.
    #[inline]
    pub fn clamp_center(&self, center: Vec2, radius: f64) -> Vec2 {
        Vec2::new(
            center.x.max(radius).min(self.width - radius),
            center.y.max(radius).min(self.height - radius),
        )
    }
}

// =============================================================================
// FIGHTER STATE
// =============================================================================

/// Spawn parameters shared by every fighter in a match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FighterConfig {
    /// Body radius
    pub radius: f64,
    /// Starting (and maximum) health
    pub health: i32,
    /// Minimum magnitude of each spawn velocity component
    pub min_speed: f64,
    /// Maximum magnitude of each spawn velocity component; also the
    /// nominal max speed Steve's ability compares against
    pub max_speed: f64,
    /// Placement attempts per fighter before spawning gives up
    pub spawn_attempts: u32,
    /// Display color per roster slot
    pub slot_colors: Vec<[u8; 3]>,
}

impl Default for FighterConfig {
    fn default() -> Self {
        Self {
            radius: 48.0,
            health: 100,
            min_speed: 5.0,
            max_speed: 14.0,
            spawn_attempts: 1000,
            slot_colors: vec![[100, 200, 100], [60, 120, 60]],
        }
    }
}

impl FighterConfig {
    /// Display color for a roster slot (cycles if the palette is short).
    pub fn color_for_slot(&self, slot: usize) -> [u8; 3] {
        if self.slot_colors.is_empty() {
            return [255, 255, 255];
        }
        self.slot_colors[slot % self.slot_colors.len()]
    }
}

/// State of a single fighter in the match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FighterState {
    /// Stable identifier
    pub id: FighterId,

    /// Roster slot this fighter was created from (0 = left sidebar)
    pub slot: usize,

    /// Ability archetype (immutable)
    pub kind: CharacterKind,

    /// Display color
    pub color: [u8; 3],

    /// Center position
    pub position: Vec2,

    /// Velocity in pixels per frame
    pub velocity: Vec2,

    /// Body radius (immutable)
    pub radius: f64,

    /// Current health; at or below zero the fighter is pruned
    pub health: i32,

    /// Health at spawn
    pub max_health: i32,

    /// Poison damage over time
    pub poison: StatusEffect,

    /// Fire damage over time
    pub fire: StatusEffect,

    /// Herobrine only: currently revealed
    pub visible: bool,

    /// Herobrine only: when the current reveal ends
    pub visible_until: SimTime,

    /// Blaze only: when the last projectile was fired
    pub last_projectile_time: SimTime,
}

impl FighterState {
    /// Create a fighter with full health and no active statuses.
    pub fn new(
        id: FighterId,
        slot: usize,
        kind: CharacterKind,
        position: Vec2,
        velocity: Vec2,
        radius: f64,
        health: i32,
    ) -> Self {
        Self {
            id,
            slot,
            kind,
            color: [255, 255, 255],
            position,
            velocity,
            radius,
            health,
            max_health: health,
            poison: StatusEffect::default(),
            fire: StatusEffect::default(),
            // Revealed until the first visibility update hides it
            visible: true,
            visible_until: 0.0,
            last_projectile_time: 0.0,
        }
    }

    /// Still in the fight?
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Subtract health. Health may go negative; pruning handles it.
    #[inline]
    pub fn take_damage(&mut self, amount: i32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Current speed magnitude.
    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    /// Poison is ticking.
    #[inline]
    pub fn is_poisoned(&self) -> bool {
        self.poison.active
    }

    /// Fire is ticking.
    #[inline]
    pub fn is_on_fire(&self) -> bool {
        self.fire.active
    }

    /// Set on fire for `ticks` seconds, replacing any current burn.
    pub fn ignite(&mut self, ticks: u32, now: SimTime) {
        self.fire.apply(ticks, now);
    }

    /// Poison for `ticks` seconds, replacing any current poison.
    pub fn apply_poison(&mut self, ticks: u32, now: SimTime) {
        self.poison.apply(ticks, now);
    }

    /// Herobrine in its hidden state.
    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.kind == CharacterKind::Herobrine && !self.visible
    }

    /// Hash this fighter's state.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id.0);
        hasher.update_u8(self.kind as u8);
        hasher.update_vec2(self.position);
        hasher.update_vec2(self.velocity);
        hasher.update_i32(self.health);
        self.poison.hash_into(hasher);
        self.fire.hash_into(hasher);
        hasher.update_bool(self.visible);
        hasher.update_f64(self.visible_until);
        hasher.update_f64(self.last_projectile_time);
    }
}

// =============================================================================
// PROJECTILE STATE
// =============================================================================

/// A ranged attack in flight.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectileState {
    /// Unique projectile ID
    pub id: ProjectileId,

    /// Fighter that fired it; never damaged by it
    pub owner: FighterId,

    /// Center position
    pub position: Vec2,

    /// Velocity in pixels per frame
    pub velocity: Vec2,

    /// Collision radius
    pub radius: f64,

    /// Cleared on impact or when leaving the arena
    pub active: bool,
}

// =============================================================================
// TRANSIENT EFFECTS
// =============================================================================

/// Visual-only effect type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Small white spark at every fighter collision
    HitSpark,
    /// Creeper blast
    Explosion,
}

/// Time-bounded visual effect.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransientEffect {
    /// Effect type
    pub kind: EffectKind,
    /// Spawn point
    pub position: Vec2,
    /// Simulation time at spawn
    pub start_time: SimTime,
    /// Lifetime in seconds
    pub duration: f64,
    /// Radius reached at the end of the lifetime
    pub max_radius: f64,
    /// Cleared once the lifetime has elapsed
    pub active: bool,
}

impl TransientEffect {
    /// Fraction of the lifetime elapsed, clamped to `[0, 1]`.
    pub fn progress(&self, now: SimTime) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start_time) / self.duration).clamp(0.0, 1.0)
    }

    /// Remaining life fraction, used by the renderer as alpha.
    pub fn life_fraction(&self, now: SimTime) -> f64 {
        1.0 - self.progress(now)
    }

    /// Current drawn radius.
    pub fn current_radius(&self, now: SimTime) -> f64 {
        self.max_radius * self.progress(now)
    }

    /// Deactivate once more than `duration` seconds have passed.
    pub fn update(&mut self, now: SimTime) {
        if now - self.start_time > self.duration {
            self.active = false;
        }
    }
}

// =============================================================================
// MATCH OUTCOME / PHASE
// =============================================================================

/// Terminal signal reported to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Fight still in progress
    #[default]
    Undecided,
    /// Exactly one fighter left
    Winner {
        /// Surviving fighter
        fighter: FighterId,
        /// Its roster slot
        slot: usize,
        /// Its kind
        kind: CharacterKind,
        /// Health it finished with
        health: i32,
    },
    /// Everyone died in the same frame
    NoSurvivors,
}

impl MatchOutcome {
    /// Whether the match is over.
    pub fn is_decided(&self) -> bool {
        !matches!(self, MatchOutcome::Undecided)
    }
}

/// Current phase of the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Frames are being simulated
    #[default]
    Playing,
    /// Match over; further ticks are no-ops
    Ended(MatchOutcome),
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// Fighter placement failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpawnError {
    /// The fighter radius does not fit inside the arena.
    #[error("radius {radius} does not fit in a {width}x{height} arena")]
    ArenaTooSmall {
        /// Fighter radius
        radius: f64,
        /// Arena width
        width: f64,
        /// Arena height
        height: f64,
    },

    /// No non-overlapping spot was found.
    #[error("no free spawn position for slot {slot} after {attempts} attempts")]
    NoFreePosition {
        /// Roster slot being placed
        slot: usize,
        /// Attempts made
        attempts: u32,
    },
}

/// Complete state of a match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchState {
    /// Match identifier
    pub match_id: [u8; 16],

    /// Frames simulated so far
    pub frame: u64,

    /// Simulation time of the latest frame
    pub time: SimTime,

    /// Current match phase
    pub phase: MatchPhase,

    /// RNG seed (for logs and hashing)
    pub rng_seed: u64,

    /// Per-match RNG state
    #[serde(skip)]
    pub rng: DeterministicRng,

    /// Arena bounds
    pub arena: Arena,

    /// Live fighters, in roster order
    pub fighters: Vec<FighterState>,

    /// Projectiles in flight
    pub projectiles: Vec<ProjectileState>,

    /// Visual effects still playing
    pub effects: Vec<TransientEffect>,

    /// Next fighter ID (monotonic counter)
    pub next_fighter_id: u32,

    /// Next projectile ID (monotonic counter)
    pub next_projectile_id: u32,

    /// Events generated this frame (cleared each frame)
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl MatchState {
    /// Create an empty match.
    pub fn new(match_id: [u8; 16], rng_seed: u64, arena: Arena) -> Self {
        Self {
            match_id,
            frame: 0,
            time: 0.0,
            phase: MatchPhase::Playing,
            rng_seed,
            rng: DeterministicRng::new(rng_seed),
            arena,
            fighters: Vec::new(),
            projectiles: Vec::new(),
            effects: Vec::new(),
            next_fighter_id: 0,
            next_projectile_id: 0,
            pending_events: Vec::new(),
        }
    }

    /// Insert a fighter exactly as given, assigning it a fresh id.
    pub fn insert_fighter(&mut self, mut fighter: FighterState) -> FighterId {
        let id = FighterId(self.next_fighter_id);
        self.next_fighter_id += 1;
        fighter.id = id;
        self.fighters.push(fighter);
        id
    }

    /// Spawn a fighter at a random spot that overlaps nobody.
    pub fn spawn_fighter(
        &mut self,
        slot: usize,
        kind: CharacterKind,
        config: &FighterConfig,
    ) -> Result<FighterId, SpawnError> {
        let radius = config.radius;
        if !self.arena.fits(radius) {
            return Err(SpawnError::ArenaTooSmall {
                radius,
                width: self.arena.width,
                height: self.arena.height,
            });
        }

        let min = Vec2::new(radius, radius);
        let max = Vec2::new(self.arena.width - radius, self.arena.height - radius);

        for _ in 0..config.spawn_attempts {
            let position = self.rng.random_point(min, max);
            let velocity = Vec2::new(
                self.rng.signed_speed(config.min_speed, config.max_speed),
                self.rng.signed_speed(config.min_speed, config.max_speed),
            );

            let blocked = self
                .fighters
                .iter()
                .any(|other| position.distance(other.position) < radius + other.radius);
            if blocked {
                continue;
            }

            let mut fighter = FighterState::new(
                FighterId(0),
                slot,
                kind,
                position,
                velocity,
                radius,
                config.health,
            );
            fighter.color = config.color_for_slot(slot);
            return Ok(self.insert_fighter(fighter));
        }

        Err(SpawnError::NoFreePosition {
            slot,
            attempts: config.spawn_attempts,
        })
    }

    /// Get a fighter by ID.
    pub fn get_fighter(&self, id: FighterId) -> Option<&FighterState> {
        self.fighters.iter().find(|f| f.id == id)
    }

    /// Add a projectile and return its id.
    pub fn spawn_projectile(
        &mut self,
        owner: FighterId,
        position: Vec2,
        velocity: Vec2,
        radius: f64,
    ) -> ProjectileId {
        let id = ProjectileId(self.next_projectile_id);
        self.next_projectile_id += 1;
        self.projectiles.push(ProjectileState {
            id,
            owner,
            position,
            velocity,
            radius,
            active: true,
        });
        id
    }

    /// Remove fighters with health at or below zero, returning them.
    pub fn prune_dead(&mut self) -> Vec<FighterState> {
        let (alive, dead): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.fighters).into_iter().partition(|f| f.is_alive());
        self.fighters = alive;
        dead
    }

    /// Drop inactive projectiles and effects.
    pub fn prune_inactive(&mut self) {
        self.projectiles.retain(|p| p.active);
        self.effects.retain(|e| e.active);
    }

    /// Check if match has ended.
    pub fn is_ended(&self) -> bool {
        matches!(self.phase, MatchPhase::Ended(_))
    }

    /// Outcome so far.
    pub fn outcome(&self) -> MatchOutcome {
        match self.phase {
            MatchPhase::Playing => MatchOutcome::Undecided,
            MatchPhase::Ended(outcome) => outcome,
        }
    }

    /// Compute hash of current state.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.frame, self.rng_seed, |hasher| {
            hasher.update_uuid(&self.match_id);
            hasher.update_f64(self.time);

            for fighter in &self.fighters {
                fighter.hash_into(hasher);
            }

            for projectile in &self.projectiles {
                hasher.update_u32(projectile.id.0);
                hasher.update_u32(projectile.owner.0);
                hasher.update_vec2(projectile.position);
                hasher.update_vec2(projectile.velocity);
                hasher.update_bool(projectile.active);
            }

            for effect in &self.effects {
                hasher.update_u8(effect.kind as u8);
                hasher.update_vec2(effect.position);
                hasher.update_f64(effect.start_time);
            }
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================
