//! Dense result histograms filled at cluster commit.

use rustfei4_core::error::ClusterError;
use rustfei4_core::geometry::{
    MAX_CHARGE_BINS, MAX_CLUSTER_HITS_BINS, MAX_COLUMN, MAX_POS_X_BINS, MAX_POS_Y_BINS, MAX_ROW,
    MAX_TOT_BINS, PIXEL_PITCH_X, PIXEL_PITCH_Y,
};

/// Aggregate cluster distributions.
///
/// The ToT and charge histograms are 2D with the cluster size as the
/// outer (row) axis; row 0 holds the marginal over all sizes. The
/// position histogram is 2D over the detector surface, Y-outer.
pub struct ClusterHistograms {
    /// Cluster count per size, `MAX_CLUSTER_HITS_BINS` bins.
    sizes: Vec<u32>,
    /// Cluster count per (size, summed ToT), row-major.
    tots: Vec<u32>,
    /// Cluster count per (size, summed charge), row-major.
    charges: Vec<u32>,
    /// Cluster count per (y, x) position bin, row-major.
    positions: Vec<u32>,
}

impl ClusterHistograms {
    /// Allocates zeroed histograms.
    pub fn new() -> Self {
        Self {
            sizes: vec![0; MAX_CLUSTER_HITS_BINS],
            tots: vec![0; MAX_CLUSTER_HITS_BINS * MAX_TOT_BINS],
            charges: vec![0; MAX_CLUSTER_HITS_BINS * MAX_CHARGE_BINS],
            positions: vec![0; MAX_POS_Y_BINS * MAX_POS_X_BINS],
        }
    }

    /// Zeroes all four histograms.
    pub fn reset(&mut self) {
        self.sizes.fill(0);
        self.tots.fill(0);
        self.charges.fill(0);
        self.positions.fill(0);
    }

    /// Counts a cluster of the given size.
    pub fn record_size(&mut self, size: usize) -> Result<(), ClusterError> {
        if size >= MAX_CLUSTER_HITS_BINS {
            return Err(ClusterError::SizeHistogramOverflow {
                size,
                bins: MAX_CLUSTER_HITS_BINS,
            });
        }
        self.sizes[size] += 1;
        Ok(())
    }

    /// Counts a cluster's summed ToT, per size and in the marginal row.
    pub fn record_tot(&mut self, size: usize, tot_sum: u32) -> Result<(), ClusterError> {
        let tot = tot_sum as usize;
        if tot >= MAX_TOT_BINS || size >= MAX_CLUSTER_HITS_BINS {
            return Err(ClusterError::TotHistogramOverflow { tot: tot_sum, size });
        }
        self.tots[size * MAX_TOT_BINS + tot] += 1;
        // Row 0 holds the marginal over all cluster sizes.
        self.tots[tot] += 1;
        Ok(())
    }

    /// Counts a cluster's summed charge, per size and in the marginal
    /// row. One charge bin is one charge unit, truncated.
    pub fn record_charge(&mut self, size: usize, charge: f32) -> Result<(), ClusterError> {
        let bin = charge as usize;
        if bin >= MAX_CHARGE_BINS || size >= MAX_CLUSTER_HITS_BINS {
            return Err(ClusterError::ChargeHistogramOverflow { charge, size });
        }
        self.charges[size * MAX_CHARGE_BINS + bin] += 1;
        self.charges[bin] += 1;
        Ok(())
    }

    /// Counts a charge-weighted cluster position, given in µm.
    ///
    /// Positions binning the detector surface; out-of-range positions
    /// are skipped.
    pub fn record_position(&mut self, x_um: f32, y_um: f32) {
        let x_bin = (x_um / (PIXEL_PITCH_X * MAX_COLUMN as f32) * MAX_POS_X_BINS as f32) as usize;
        let y_bin = (y_um / (PIXEL_PITCH_Y * MAX_ROW as f32) * MAX_POS_Y_BINS as f32) as usize;
        if x_bin < MAX_POS_X_BINS && y_bin < MAX_POS_Y_BINS {
            self.positions[y_bin * MAX_POS_X_BINS + x_bin] += 1;
        }
    }

    /// Cluster-size histogram.
    pub fn size_hist(&self) -> &[u32] {
        &self.sizes
    }

    /// Cluster-ToT-vs-size histogram, row-major with size outer.
    pub fn tot_hist(&self) -> &[u32] {
        &self.tots
    }

    /// Cluster-charge-vs-size histogram, row-major with size outer.
    pub fn charge_hist(&self) -> &[u32] {
        &self.charges
    }

    /// Cluster-position histogram, row-major with Y outer.
    pub fn position_hist(&self) -> &[u32] {
        &self.positions
    }
}

impl Default for ClusterHistograms {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_size() {
        let mut h = ClusterHistograms::new();
        h.record_size(1).unwrap();
        h.record_size(1).unwrap();
        h.record_size(3).unwrap();
        assert_eq!(h.size_hist()[1], 2);
        assert_eq!(h.size_hist()[3], 1);
        assert!(matches!(
            h.record_size(MAX_CLUSTER_HITS_BINS),
            Err(ClusterError::SizeHistogramOverflow { .. })
        ));
    }

    #[test]
    fn test_record_tot_fills_marginal() {
        let mut h = ClusterHistograms::new();
        h.record_tot(2, 11).unwrap();
        h.record_tot(3, 11).unwrap();
        assert_eq!(h.tot_hist()[2 * MAX_TOT_BINS + 11], 1);
        assert_eq!(h.tot_hist()[3 * MAX_TOT_BINS + 11], 1);
        assert_eq!(h.tot_hist()[11], 2);
        assert!(matches!(
            h.record_tot(1, MAX_TOT_BINS as u32),
            Err(ClusterError::TotHistogramOverflow { .. })
        ));
    }

    #[test]
    fn test_record_charge() {
        let mut h = ClusterHistograms::new();
        h.record_charge(2, 99.7).unwrap();
        assert_eq!(h.charge_hist()[2 * MAX_CHARGE_BINS + 99], 1);
        assert_eq!(h.charge_hist()[99], 1);
        assert!(matches!(
            h.record_charge(1, MAX_CHARGE_BINS as f32),
            Err(ClusterError::ChargeHistogramOverflow { .. })
        ));
    }

    #[test]
    fn test_record_position_skips_out_of_range() {
        let mut h = ClusterHistograms::new();
        h.record_position(125.0, 25.0);
        assert_eq!(h.position_hist().iter().sum::<u32>(), 1);
        h.record_position(1.0e9, 25.0);
        assert_eq!(h.position_hist().iter().sum::<u32>(), 1);
    }

    #[test]
    fn test_reset() {
        let mut h = ClusterHistograms::new();
        h.record_size(1).unwrap();
        h.record_tot(1, 5).unwrap();
        h.reset();
        assert!(h.size_hist().iter().all(|&c| c == 0));
        assert!(h.tot_hist().iter().all(|&c| c == 0));
    }
}
