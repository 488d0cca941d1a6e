//! Histogram engine
//!
//! Ordered-bin probability distributions and the transport distance between them:
//! - Normalization to unit mass
//! - Earth-mover style distance on a 1D ordered axis
//! - Binning of raw reflection distances

use crate::error::{SignatureError, SignatureResult};

/// Upper bound (inclusive) of each distance bin, in world units
pub const DISTANCE_BIN_BOUNDS: [f32; DISTANCE_BIN_COUNT] = [
    2.0,
    4.0,
    8.0,
    16.0,
    32.0,
    64.0,
    128.0,
    256.0,
    512.0,
    1024.0,
    f32::INFINITY,
];

/// Number of bins in a distance histogram
pub const DISTANCE_BIN_COUNT: usize = 11;

/// Number of bins in an absorption coefficient histogram
pub const ABSORPTION_BIN_COUNT: usize = 10;

/// Distance histogram (reflection path lengths)
pub type DistanceHistogram = [f32; DISTANCE_BIN_COUNT];

/// Absorption coefficient histogram
pub type AbsorptionHistogram = [f32; ABSORPTION_BIN_COUNT];

/// Normalize bins in place so they sum to 1.0
///
/// Fails without touching the bins if the sum is zero, negative or not finite.
pub fn normalize(bins: &mut [f32]) -> SignatureResult<()> {
    let total: f32 = bins.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(SignatureError::DegenerateInput(format!(
            "histogram sum is {total}"
        )));
    }
    for v in bins.iter_mut() {
        *v /= total;
    }
    Ok(())
}

/// Transport distance between two ordered-bin histograms
///
/// Moving a full unit of mass across the whole axis costs 1.0, so the result
/// lies in `[0, 1]`. Both histograms must have the same length of at least 2.
pub fn histogram_distance(a: &[f32], b: &[f32]) -> SignatureResult<f32> {
    if a.len() != b.len() {
        return Err(SignatureError::LengthMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    if a.len() < 2 {
        return Err(SignatureError::TooFewBins(a.len()));
    }
    Ok(transport_cost(a, b))
}

/// Unchecked transport distance; callers guarantee equal lengths >= 2
pub(crate) fn transport_cost(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    // Cost of carrying one unit of mass to the adjacent bin
    let work_scale = 1.0 / (a.len() - 1) as f32;

    let mut accumulation = 0.0f32;
    let mut distance = 0.0f32;
    for (&x, &y) in a.iter().zip(b) {
        let mut delta = (x - y).abs();

        // Excess carried from earlier bins cancels against this bin first
        let reduction = delta.min(accumulation);
        accumulation -= reduction;
        delta -= reduction;

        accumulation += delta;
        distance += accumulation * work_scale;
    }
    distance.min(1.0)
}

/// Build a normalized distance histogram from raw reflection distances
///
/// Bins are cumulative: a sample increments every bin whose upper bound it
/// does not exceed, so short paths weigh on all longer bins too.
pub fn histogram_from_distances(distances: &[f32]) -> SignatureResult<DistanceHistogram> {
    if distances.is_empty() {
        return Err(SignatureError::DegenerateInput(
            "no distance samples".into(),
        ));
    }

    let mut histogram = [0.0f32; DISTANCE_BIN_COUNT];
    for &d in distances {
        for (bin, &bound) in histogram.iter_mut().zip(DISTANCE_BIN_BOUNDS.iter()) {
            if d <= bound {
                *bin += 1.0;
            }
        }
    }
    normalize(&mut histogram)?;
    Ok(histogram)
}
