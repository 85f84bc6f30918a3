//! FE-I4 detector geometry and histogram binning constants.
//!
//! A single FE-I4 chip has 80 columns and 336 rows of 250 µm x 50 µm
//! pixels; hits arrive within a 16-frame trigger window. These values
//! size the dense occupancy grid and the result histograms.

/// Number of pixel columns. Public hit records use 1-based columns.
pub const MAX_COLUMN: usize = 80;

/// Number of pixel rows. Public hit records use 1-based rows.
pub const MAX_ROW: usize = 336;

/// Number of relative BCID frames per trigger window.
pub const MAX_BCID: usize = 16;

/// Depth of the charge calibration lookup in ToT (valid ToT codes are
/// `0..MAX_TOT_LOOKUP`).
pub const MAX_TOT_LOOKUP: usize = 14;

/// Bins of the cluster-ToT histogram.
pub const MAX_TOT_BINS: usize = 128;

/// Bins of the cluster-charge histogram.
pub const MAX_CHARGE_BINS: usize = 4096;

/// Bins of the cluster-size histogram; also the size axis of the
/// per-size ToT and charge histograms.
pub const MAX_CLUSTER_HITS_BINS: usize = 1024;

/// X bins of the cluster-position histogram.
pub const MAX_POS_X_BINS: usize = 1000;

/// Y bins of the cluster-position histogram.
pub const MAX_POS_Y_BINS: usize = 1000;

/// Pixel pitch along the column direction, in µm.
pub const PIXEL_PITCH_X: f32 = 250.0;

/// Pixel pitch along the row direction, in µm.
pub const PIXEL_PITCH_Y: f32 = 50.0;
