//! Reproducible synthetic signature corpora
//!
//! Each preset gets a random baseline signature plus jittered variations of
//! it, which gives the reduction pipeline tight clusters to work on.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::histogram::{
    ABSORPTION_BIN_COUNT, AbsorptionHistogram, DISTANCE_BIN_COUNT, DistanceHistogram,
};
use crate::signature::Signature;

/// Default standard deviation of per-bin jitter for derived signatures
pub const DEFAULT_JITTER: f32 = 0.05;

/// Seeded signature generator
pub struct SignatureGenerator {
    rng: ChaCha8Rng,
    jitter: f32,
}

impl SignatureGenerator {
    /// Create a new generator with optional seed
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };

        Self {
            rng,
            jitter: DEFAULT_JITTER,
        }
    }

    /// Set per-bin jitter of derived signatures
    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter.abs();
        self
    }

    /// Random signature with uniformly drawn bins
    pub fn baseline(&mut self, preset_index: usize) -> Signature {
        let mut distances: DistanceHistogram = [0.0; DISTANCE_BIN_COUNT];
        let mut absorb_coeffs: AbsorptionHistogram = [0.0; ABSORPTION_BIN_COUNT];

        // (0, 1] keeps every sum positive
        for v in distances.iter_mut().chain(absorb_coeffs.iter_mut()) {
            *v = 1.0 - self.rng.random::<f32>();
        }
        let total: f32 = distances.iter().sum();
        distances.iter_mut().for_each(|v| *v /= total);
        let total: f32 = absorb_coeffs.iter().sum();
        absorb_coeffs.iter_mut().for_each(|v| *v /= total);

        Signature::new(preset_index, distances, absorb_coeffs)
    }

    /// Variation of a baseline with Gaussian jitter on every bin
    ///
    /// Falls back to a copy of the baseline in the unlikely case that every
    /// jittered bin clamps to zero.
    pub fn derived(&mut self, baseline: &Signature) -> Signature {
        let mut distances = baseline.distances;
        let mut absorb_coeffs = baseline.absorb_coeffs;
        for v in distances.iter_mut().chain(absorb_coeffs.iter_mut()) {
            let z: f32 = self.rng.sample(StandardNormal);
            *v = (*v + self.jitter * z).clamp(0.0, 1.0);
        }

        Signature::from_raw(baseline.preset_index, distances, absorb_coeffs)
            .unwrap_or_else(|_| baseline.clone())
    }

    /// Corpus of `num_presets` clusters of `variations` signatures each
    ///
    /// Each cluster is a baseline followed by `variations - 1` derived
    /// signatures. Zero variations yields an empty corpus.
    pub fn corpus(&mut self, num_presets: usize, variations: usize) -> Vec<Signature> {
        if variations == 0 {
            return Vec::new();
        }

        let mut signatures = Vec::with_capacity(num_presets.saturating_mul(variations));
        for preset in 0..num_presets {
            let baseline = self.baseline(preset);
            signatures.push(baseline.clone());
            for _ in 1..variations {
                signatures.push(self.derived(&baseline));
            }
        }
        signatures
    }
}
