//! Acoustic signatures and the metric between them

use serde::{Deserialize, Serialize};

use crate::error::SignatureResult;
use crate::histogram::{
    ABSORPTION_BIN_COUNT, AbsorptionHistogram, DISTANCE_BIN_COUNT, DistanceHistogram, normalize,
    transport_cost,
};

/// Preset index marking a signature as not belonging to any preset
pub const INVALID_PRESET: usize = usize::MAX;

/// Statistical fingerprint of a sampled acoustic space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    /// Index into the host's preset table, or `INVALID_PRESET`
    pub preset_index: usize,
    /// Normalized reflection distance distribution
    pub distances: DistanceHistogram,
    /// Normalized absorption coefficient distribution
    pub absorb_coeffs: AbsorptionHistogram,
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            preset_index: INVALID_PRESET,
            distances: [0.0; DISTANCE_BIN_COUNT],
            absorb_coeffs: [0.0; ABSORPTION_BIN_COUNT],
        }
    }
}

impl Signature {
    /// Create from already normalized histograms
    pub fn new(
        preset_index: usize,
        distances: DistanceHistogram,
        absorb_coeffs: AbsorptionHistogram,
    ) -> Self {
        Self {
            preset_index,
            distances,
            absorb_coeffs,
        }
    }

    /// Create from raw bin counts, normalizing both histograms
    pub fn from_raw(
        preset_index: usize,
        mut distances: DistanceHistogram,
        mut absorb_coeffs: AbsorptionHistogram,
    ) -> SignatureResult<Self> {
        normalize(&mut distances)?;
        normalize(&mut absorb_coeffs)?;
        Ok(Self::new(preset_index, distances, absorb_coeffs))
    }

    /// Whether this signature refers to a preset
    pub fn is_valid(&self) -> bool {
        self.preset_index != INVALID_PRESET
    }

    /// Dissimilarity to another signature, see [`signature_difference`]
    pub fn difference(&self, other: &Signature) -> f32 {
        signature_difference(self, other)
    }
}

/// Equal-weight mean of the distance and absorption histogram distances
///
/// Symmetric and bounded in `[0, 1]`; zero only when both histograms match.
pub fn signature_difference(a: &Signature, b: &Signature) -> f32 {
    let dist_diff = transport_cost(&a.distances, &b.distances);
    let absorb_diff = transport_cost(&a.absorb_coeffs, &b.absorb_coeffs);
    (dist_diff + absorb_diff) / 2.0
}
