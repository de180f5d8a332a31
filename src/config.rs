//! Driver configuration - environment variable parsing

use std::env;
use std::str::FromStr;

use crate::game::input::parse_roster;
use crate::game::state::{Arena, CharacterKind, UnknownCharacter};
use crate::game::tick::MatchConfig;

/// Headless driver configuration loaded from environment variables.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Roster for every match (`ARENA_ROSTER`, comma separated)
    pub roster: Vec<CharacterKind>,
    /// Matches to run back to back (`ARENA_MATCHES`)
    pub matches: u32,
    /// Pinned RNG seed (`ARENA_SEED`), random per match when unset
    pub seed: Option<u64>,
    /// Pace frames at 60 Hz instead of running flat out (`ARENA_REALTIME`)
    pub realtime: bool,
    /// Frame cap per match before it is aborted (`ARENA_MAX_FRAMES`)
    pub max_frames: u64,
    /// Log filter (`ARENA_LOG`, then `RUST_LOG`)
    pub log_level: String,
    /// Arena width in pixels (`ARENA_WIDTH`)
    pub arena_width: f64,
    /// Arena height in pixels (`ARENA_HEIGHT`)
    pub arena_height: f64,
    /// Starting health (`ARENA_FIGHTER_HEALTH`)
    pub fighter_health: i32,
}

impl Default for AppConfig {
    fn default() -> Self {
        let match_config = MatchConfig::default();
        Self {
            roster: vec![CharacterKind::Blaze, CharacterKind::Creeper],
            matches: 1,
            seed: None,
            realtime: false,
            // Ten minutes at 60 Hz
            max_frames: 36_000,
            log_level: "info".to_string(),
            arena_width: match_config.arena.width,
            arena_height: match_config.arena.height,
            fighter_health: match_config.fighter.health,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let roster = match lookup("ARENA_ROSTER") {
            Some(raw) => {
                let names: Vec<&str> = raw.split(',').collect();
                parse_roster(&names)?
            }
            None => defaults.roster,
        };

        let seed = lookup("ARENA_SEED")
            .map(|raw| parse_var("ARENA_SEED", &raw))
            .transpose()?;

        let log_level = lookup("ARENA_LOG")
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or(defaults.log_level);

        let config = Self {
            roster,
            matches: parse_or(&lookup, "ARENA_MATCHES", defaults.matches)?,
            seed,
            realtime: parse_flag(&lookup, "ARENA_REALTIME", defaults.realtime)?,
            max_frames: parse_or(&lookup, "ARENA_MAX_FRAMES", defaults.max_frames)?,
            log_level,
            arena_width: parse_or(&lookup, "ARENA_WIDTH", defaults.arena_width)?,
            arena_height: parse_or(&lookup, "ARENA_HEIGHT", defaults.arena_height)?,
            fighter_health: parse_or(&lookup, "ARENA_FIGHTER_HEALTH", defaults.fighter_health)?,
        };

        if !(config.arena_width > 0.0 && config.arena_width.is_finite()) {
            return Err(ConfigError::OutOfRange("ARENA_WIDTH"));
        }
        if !(config.arena_height > 0.0 && config.arena_height.is_finite()) {
            return Err(ConfigError::OutOfRange("ARENA_HEIGHT"));
        }
        if config.fighter_health <= 0 {
            return Err(ConfigError::OutOfRange("ARENA_FIGHTER_HEALTH"));
        }

        Ok(config)
    }

    /// Simulation config for the controller.
    pub fn match_config(&self) -> MatchConfig {
        let mut config = MatchConfig {
            arena: Arena::new(self.arena_width, self.arena_height),
            seed: self.seed,
            ..MatchConfig::default()
        };
        config.fighter.health = self.fighter_health;
        config
    }
}

fn parse_var<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}

fn parse_or<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => parse_var(name, &raw),
        None => Ok(default),
    }
}

fn parse_flag<F>(lookup: &F, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid { name, value: raw }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Variable present but unparseable.
    #[error("Invalid value for {name}: {value:?}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },

    /// Variable parsed but outside its allowed range.
    #[error("Value out of range for {0}")]
    OutOfRange(&'static str),

    /// Roster names a character that does not exist.
    #[error("Invalid ARENA_ROSTER: {0}")]
    Roster(#[from] UnknownCharacter),
}
