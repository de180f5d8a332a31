//! Seeded Random Number Generator
//!
//! Uses Xorshift128+ for fast, reproducible randomness.
//! Every random decision in a match (spawn placement, spawn velocity,
//! degenerate push directions) is drawn from the match's own generator.

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

use super::vec2::Vec2;

/// Seeded PRNG using the Xorshift128+ algorithm.
///
/// Given the same seed, this RNG produces the exact same sequence.
///
/// # Example
///
/// ```
/// use ball_arena::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.next_u64(), b.next_u64());
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Ensure state is never all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a float in `[0, 1)` from the top 53 bits.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Generate a float in `[min, max)`.
    ///
    /// Returns `min` when the range is empty.
    #[inline]
    pub fn next_f64_range(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        min + (max - min) * self.next_f64()
    }

    /// Either `1.0` or `-1.0` with equal probability.
    #[inline]
    pub fn next_sign(&mut self) -> f64 {
        if self.next_u64() >> 63 == 0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Generate a random point in the rectangle `[min, max)`.
    pub fn random_point(&mut self, min: Vec2, max: Vec2) -> Vec2 {
        let x = self.next_f64_range(min.x, max.x);
        let y = self.next_f64_range(min.y, max.y);
        Vec2::new(x, y)
    }

    /// Generate a random unit direction.
    ///
    /// Draws both components from `[-1, 1)` and rejects the zero vector.
    pub fn random_direction(&mut self) -> Vec2 {
        loop {
            let x = self.next_f64_range(-1.0, 1.0);
            let y = self.next_f64_range(-1.0, 1.0);
            let vec = Vec2::new(x, y);

            if vec.length_squared() > 0.0 {
                return vec.normalize();
            }
        }
    }

    /// Generate a random speed component `±uniform(min, max)`.
    pub fn signed_speed(&mut self, min: f64, max: f64) -> f64 {
        self.next_sign() * self.next_f64_range(min, max)
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a match seed from the match id and the selected roster.
///
/// Used when the caller does not pin a seed in the configuration.
pub fn derive_match_seed(match_id: &[u8; 16], roster: &[&str]) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"BALL_ARENA_SEED_V1");
    hasher.update(match_id);

    for name in roster {
        hasher.update(name.as_bytes());
        // Separator so ["ab", "c"] and ["a", "bc"] differ
        hasher.update([0u8]);
    }

    let hash = hasher.finalize();

    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[0..8]);
    u64::from_le_bytes(seed)
}

// =============================================================================
// TESTS
// =============================================================================
