//! Error types for rustfei4.

use thiserror::Error;

/// Fatal errors during clustering.
///
/// These indicate inputs or output buffer sizes inconsistent with the
/// configured bounds; outputs may be partially written when one
/// surfaces. Recoverable conditions (duplicate hits, undersized
/// clusters, misaligned input) are logged warnings instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// Cluster size does not fit into the cluster size histogram.
    #[error("cluster size {size} does not fit into the cluster size histogram (0..{bins})")]
    SizeHistogramOverflow {
        /// Offending cluster size.
        size: usize,
        /// Number of size bins.
        bins: usize,
    },

    /// Cluster ToT does not fit into the cluster ToT histogram.
    #[error("cluster tot {tot} with cluster size {size} does not fit into the cluster tot histogram")]
    TotHistogramOverflow {
        /// Summed cluster ToT.
        tot: u32,
        /// Cluster size.
        size: usize,
    },

    /// Cluster charge does not fit into the cluster charge histogram.
    #[error("cluster charge {charge} with cluster size {size} does not fit into the cluster charge histogram")]
    ChargeHistogramOverflow {
        /// Summed cluster charge.
        charge: f32,
        /// Cluster size.
        size: usize,
    },

    /// The caller-provided cluster output array is full.
    #[error("too many clusters for the cluster output array ({capacity} entries)")]
    ClusterBufferFull {
        /// Length of the output array.
        capacity: usize,
    },

    /// A hit index lies outside the cluster-hit output array.
    #[error("hit index {index} is out of range of the cluster hit output array (0..{size})")]
    HitIndexOutOfRange {
        /// Offending hit index.
        index: usize,
        /// Length of the output array.
        size: usize,
    },
}

/// Errors while loading a charge calibration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalibrationError {
    /// The calibration table length does not match the detector geometry.
    #[error("charge calibration table has {got} entries, expected {expected}")]
    WrongSize {
        /// Provided table length.
        got: usize,
        /// Required table length.
        expected: usize,
    },
}

/// Combined error type for the library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Error from the cluster engine.
    #[error("clustering error: {0}")]
    Cluster(#[from] ClusterError),

    /// Error while loading a charge calibration.
    #[error("calibration error: {0}")]
    Calibration(#[from] CalibrationError),
}

/// Result type alias using the combined [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
