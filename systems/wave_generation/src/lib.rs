#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic power-budget wave generation system.
//!
//! A wave is described by a total power budget. The generator keeps drawing
//! enemies until the budget is spent: each enemy receives a strength within
//! the configured bounds and a random lane, and after each draw a standard
//! normal sample decides whether the next enemy arrives one tick later or in
//! the same tick.

use std::num::NonZeroU32;

use lane_defence_core::{WaveEntry, WavePlan};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

const RNG_STREAM_WAVE: &str = "lane-defence/wave";

const DEFAULT_MIN_POWER: NonZeroU32 = match NonZeroU32::new(1) {
    Some(power) => power,
    None => panic!("default minimum power must be non-zero"),
};
const DEFAULT_MAX_POWER: NonZeroU32 = match NonZeroU32::new(10) {
    Some(power) => power,
    None => panic!("default maximum power must be non-zero"),
};
const DEFAULT_BURST_THRESHOLD: f64 = 0.1;

/// Errors raised while validating a generator [`Config`].
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Enemies must have a strength of at least one.
    #[error("minimum enemy power must be at least 1")]
    ZeroMinimum,
    /// The strength bounds are inverted.
    #[error("minimum enemy power {min} exceeds maximum {max}")]
    InvertedRange {
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },
    /// The burst threshold must be a finite number.
    #[error("burst threshold {0} is not finite")]
    NonFiniteThreshold(f64),
}

/// Configuration parameters required to construct the wave generator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    min_power: NonZeroU32,
    max_power: NonZeroU32,
    burst_threshold: f64,
    rng_seed: u64,
}

impl Config {
    /// Creates a validated configuration.
    ///
    /// `burst_threshold` is compared against a standard normal sample after
    /// every enemy; larger values keep more enemies within the same tick.
    pub fn new(
        min_power: u32,
        max_power: u32,
        burst_threshold: f64,
        rng_seed: u64,
    ) -> Result<Self, ConfigError> {
        let min = NonZeroU32::new(min_power).ok_or(ConfigError::ZeroMinimum)?;
        let max = NonZeroU32::new(max_power).ok_or(ConfigError::InvertedRange {
            min: min_power,
            max: max_power,
        })?;
        if min > max {
            return Err(ConfigError::InvertedRange {
                min: min_power,
                max: max_power,
            });
        }
        if !burst_threshold.is_finite() {
            return Err(ConfigError::NonFiniteThreshold(burst_threshold));
        }

        Ok(Self {
            min_power: min,
            max_power: max,
            burst_threshold,
            rng_seed,
        })
    }

    /// Returns the configuration with a different seed.
    #[must_use]
    pub const fn with_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }

    /// Smallest strength a generated enemy can have.
    #[must_use]
    pub const fn min_power(&self) -> NonZeroU32 {
        self.min_power
    }

    /// Largest strength a generated enemy can have.
    #[must_use]
    pub const fn max_power(&self) -> NonZeroU32 {
        self.max_power
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_power: DEFAULT_MIN_POWER,
            max_power: DEFAULT_MAX_POWER,
            burst_threshold: DEFAULT_BURST_THRESHOLD,
            rng_seed: 0,
        }
    }
}

/// Pure system that generates deterministic [`WavePlan`] values.
#[derive(Debug, Default)]
pub struct WaveGeneration {
    config: Config,
}

impl WaveGeneration {
    /// Creates a new generator using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Generates the plan for `wave` spending exactly `power` strength.
    ///
    /// Lanes are drawn from `0..=max_lane`. The same seed, wave and inputs
    /// always produce the same plan.
    #[must_use]
    pub fn generate(&self, wave: u32, power: u32, max_lane: u32) -> WavePlan {
        let mut rng = ChaCha8Rng::seed_from_u64(derive_wave_seed(self.config.rng_seed, wave));
        let mut entries = Vec::new();
        let mut remaining = power;
        let mut arrival_tick = 0_u64;

        while let Some(upper) = NonZeroU32::new(remaining) {
            let upper = upper.min(self.config.max_power);
            let lower = self.config.min_power.min(upper);
            let strength = rng.gen_range(lower.get()..=upper.get());
            let Some(strength) = NonZeroU32::new(strength) else {
                break;
            };
            let lane = rng.gen_range(0..=max_lane);

            entries.push(WaveEntry::new(arrival_tick, lane, strength));
            remaining -= strength.get();

            let sample: f64 = rng.sample(StandardNormal);
            if sample > self.config.burst_threshold {
                arrival_tick += 1;
            }
        }

        debug!(
            wave,
            power,
            enemies = entries.len(),
            last_arrival = arrival_tick,
            "wave plan generated"
        );
        WavePlan::new(entries)
    }
}

fn derive_wave_seed(global_seed: u64, wave: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(RNG_STREAM_WAVE.as_bytes());
    hasher.update(wave.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
