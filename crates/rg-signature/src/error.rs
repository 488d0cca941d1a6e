//! Error types for signature matching and reduction

use thiserror::Error;

/// Signature processing error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignatureError {
    /// Histogram or sample set that cannot be normalized
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// Histograms of different lengths
    #[error("Histogram length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// Histogram too short to define a transport cost
    #[error("Histogram needs at least 2 bins, got {0}")]
    TooFewBins(usize),

    /// Size reduction asked for more signatures than it can select
    #[error("Cannot keep {requested} signatures out of {available}")]
    UndersizedCorpus { requested: usize, available: usize },

    /// Reciprocity needs another direction to compare against
    #[error("Need at least 2 directions, got {0}")]
    TooFewDirections(usize),

    /// No valid signatures to match against
    #[error("Signature library is empty")]
    EmptyLibrary,

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for signature operations
pub type SignatureResult<T> = Result<T, SignatureError>;
