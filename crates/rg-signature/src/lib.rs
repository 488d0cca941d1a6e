//! ReverbGen Signature Engine
//!
//! Matches acoustic-environment signatures against reverb presets and culls
//! large signature corpora down to a few representatives per preset.
//!
//! ## Histograms
//! - 11-bin reflection distance distribution
//! - 10-bin absorption coefficient distribution
//! - Ordered-bin transport (earth-mover) distance
//!
//! ## Reduction
//! - Threshold dedup, earliest member of each cluster survives
//! - Per-preset cap keeping the most dissimilar signatures
//!
//! ## Presets
//! - Closest-preset matching with optional runner-up blend
//! - Distance weighting curves
//!
//! ## Scan Directions
//! - Most opposing direction lookup
//!
//! ## Example
//!
//! ```rust,ignore
//! use rg_signature::{match_signature, reduce_signatures};
//!
//! let library = reduce_signatures(&scanned);
//! let pair = match_signature(&query, &library)?;
//! println!("preset {} ({:.0}%)", pair.primary, pair.ratio * 100.0);
//! ```

pub mod config;
pub mod direction;
#[cfg(feature = "generators")]
pub mod generators;
pub mod histogram;
pub mod preset;
pub mod reduction;
pub mod signature;

mod error;

pub use config::{PairingConfig, ReductionConfig};
pub use direction::{Direction, reciprocal_indices, reciprocals};
pub use error::{SignatureError, SignatureResult};
pub use histogram::{
    ABSORPTION_BIN_COUNT, AbsorptionHistogram, DISTANCE_BIN_BOUNDS, DISTANCE_BIN_COUNT,
    DistanceHistogram, histogram_distance, histogram_from_distances, normalize,
};
pub use preset::{
    PresetPair, calculate_preset_pair, calculate_preset_pair_with, distance_weight,
    match_signature, match_signature_with, reverse_distance_weight,
};
pub use reduction::{
    ReductionReport, reduce_by_difference, reduce_by_size, reduce_signatures,
    reduce_signatures_report, reduce_signatures_with,
};
pub use signature::{INVALID_PRESET, Signature, signature_difference};
