//! Configuration for reduction and preset pairing

use serde::{Deserialize, Serialize};

use crate::error::{SignatureError, SignatureResult};

/// Signatures closer than this to an earlier survivor are culled
pub const MIN_VIABLE_DIFFERENCE: f32 = 0.02;

/// Maximum number of signatures kept for one preset
pub const MAX_SIGNATURES_PER_PRESET: usize = 5;

/// Closest match at or below this difference counts as a tight fit
pub const TIGHT_MATCH_DIFFERENCE: f32 = 0.05;

/// Second match below this difference is close enough to blend in
pub const CLOSE_SECOND_DIFFERENCE: f32 = 0.4;

/// Configuration for signature reduction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReductionConfig {
    /// Pairwise difference threshold for deduplication
    pub min_viable_difference: f32,

    /// Per-preset cap applied after deduplication
    pub max_signatures_per_preset: usize,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            min_viable_difference: MIN_VIABLE_DIFFERENCE,
            max_signatures_per_preset: MAX_SIGNATURES_PER_PRESET,
        }
    }
}

impl ReductionConfig {
    /// Builder pattern: set dedup threshold
    pub fn with_min_viable_difference(mut self, difference: f32) -> Self {
        self.min_viable_difference = difference;
        self
    }

    /// Builder pattern: set per-preset cap
    pub fn with_max_signatures_per_preset(mut self, count: usize) -> Self {
        self.max_signatures_per_preset = count;
        self
    }

    /// Check values are usable
    pub fn validate(&self) -> SignatureResult<()> {
        if !(0.0..=1.0).contains(&self.min_viable_difference) {
            return Err(SignatureError::InvalidConfig(format!(
                "min_viable_difference must be within [0, 1], got {}",
                self.min_viable_difference
            )));
        }
        if self.max_signatures_per_preset == 0 {
            return Err(SignatureError::InvalidConfig(
                "max_signatures_per_preset must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Gates deciding when a second preset is blended in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingConfig {
    /// Closest difference above this always blends
    pub tight_match_difference: f32,

    /// Second difference below this always blends
    pub close_second_difference: f32,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            tight_match_difference: TIGHT_MATCH_DIFFERENCE,
            close_second_difference: CLOSE_SECOND_DIFFERENCE,
        }
    }
}

impl PairingConfig {
    /// Never report a second preset
    pub fn single_only() -> Self {
        Self {
            tight_match_difference: f32::INFINITY,
            close_second_difference: f32::NEG_INFINITY,
        }
    }

    /// Builder pattern: set tight match gate
    pub fn with_tight_match(mut self, difference: f32) -> Self {
        self.tight_match_difference = difference;
        self
    }

    /// Builder pattern: set close second gate
    pub fn with_close_second(mut self, difference: f32) -> Self {
        self.close_second_difference = difference;
        self
    }
}
