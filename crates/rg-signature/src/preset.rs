//! Preset pairing and distance weighting
//!
//! A query signature is matched to the closest preset, optionally blended
//! with the runner-up when the fit is loose or the runner-up is also close.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::PairingConfig;
use crate::error::{SignatureError, SignatureResult};
use crate::signature::{Signature, signature_difference};

/// Exponent applied to the log distance in [`distance_weight`]
pub const DISTANCE_WEIGHT_EXPONENT: f32 = 1.6;

/// Per-unit decay base of [`reverse_distance_weight`]
pub const REVERSE_DISTANCE_DECAY: f32 = 0.9;

/// Closest preset plus an optional runner-up to blend with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresetPair {
    /// Closest preset
    pub primary: usize,
    /// Runner-up preset, when blending is warranted
    pub secondary: Option<usize>,
    /// Share of the primary preset (1.0 = primary only)
    pub ratio: f32,
}

impl PresetPair {
    /// Single preset, no blend
    pub fn single(primary: usize) -> Self {
        Self {
            primary,
            secondary: None,
            ratio: 1.0,
        }
    }

    /// Whether a second preset is blended in
    pub fn is_blend(&self) -> bool {
        self.secondary.is_some()
    }
}

/// Pair two preset candidates with the default gates
pub fn calculate_preset_pair(
    index_a: usize,
    diff_a: f32,
    index_b: usize,
    diff_b: f32,
) -> PresetPair {
    calculate_preset_pair_with(index_a, diff_a, index_b, diff_b, &PairingConfig::default())
}

/// Pair two preset candidates
///
/// The candidate with the smaller difference becomes primary. The other one is
/// blended in when the primary is not a tight fit, or when it is itself close.
/// The primary's share is `diff_b / (diff_a + diff_b)`.
pub fn calculate_preset_pair_with(
    mut index_a: usize,
    mut diff_a: f32,
    mut index_b: usize,
    mut diff_b: f32,
    config: &PairingConfig,
) -> PresetPair {
    if diff_b < diff_a {
        std::mem::swap(&mut diff_a, &mut diff_b);
        std::mem::swap(&mut index_a, &mut index_b);
    }

    let mut pair = PresetPair::single(index_a);
    if diff_a > config.tight_match_difference || diff_b < config.close_second_difference {
        let total = diff_a + diff_b;
        pair.secondary = Some(index_b);
        // Two exact matches split evenly; NaN differences stay NaN
        pair.ratio = if total == 0.0 { 0.5 } else { (total - diff_a) / total };
    }
    pair
}

/// Match a query against a library of preset signatures
///
/// Each preset scores its closest library signature; the two best presets are
/// paired. Ties go to the lower preset index.
pub fn match_signature(query: &Signature, library: &[Signature]) -> SignatureResult<PresetPair> {
    match_signature_with(query, library, &PairingConfig::default())
}

/// Match a query against a library with custom pairing gates
pub fn match_signature_with(
    query: &Signature,
    library: &[Signature],
    config: &PairingConfig,
) -> SignatureResult<PresetPair> {
    let mut best: BTreeMap<usize, f32> = BTreeMap::new();
    for sig in library.iter().filter(|s| s.is_valid()) {
        let diff = signature_difference(query, sig);
        best.entry(sig.preset_index)
            .and_modify(|d| *d = d.min(diff))
            .or_insert(diff);
    }

    let mut ranked: Vec<(usize, f32)> = best.into_iter().collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    match ranked.as_slice() {
        [] => Err(SignatureError::EmptyLibrary),
        [(only, _)] => Ok(PresetPair::single(*only)),
        [(index_a, diff_a), (index_b, diff_b), ..] => {
            log::trace!(
                "Closest presets {} ({:.4}) and {} ({:.4})",
                index_a,
                diff_a,
                index_b,
                diff_b
            );
            Ok(calculate_preset_pair_with(*index_a, *diff_a, *index_b, *diff_b, config))
        }
    }
}

/// Weight growing with the log of distance, clamped to `[2, 1024]`
pub fn distance_weight(distance: f32) -> f32 {
    distance.clamp(2.0, 1024.0).ln().powf(DISTANCE_WEIGHT_EXPONENT)
}

/// Weight decaying exponentially with distance, 100 at distance zero
pub fn reverse_distance_weight(distance: f32) -> f32 {
    100.0 * REVERSE_DISTANCE_DECAY.powf(distance)
}
