//! Clusterizer configuration.

use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{MAX_BCID, MAX_COLUMN, MAX_ROW};

/// Validated clusterizer parameters.
///
/// Setters reject out-of-range values and keep the previous setting,
/// logging the rejection at debug level. Note the strict lower bound on
/// the spatial distances: a value of 1 is rejected and leaves the
/// stored value unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterConfig {
    dx: u16,
    dy: u16,
    d_bcid: u8,
    min_cluster_hits: u16,
    max_cluster_hits: u16,
    max_hit_tot: u8,
    max_cluster_hit_tot: u8,
    create_cluster_info: bool,
    create_cluster_hit_info: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            dx: 1,
            dy: 2,
            d_bcid: 4,
            min_cluster_hits: 1,
            max_cluster_hits: 9,
            max_hit_tot: 13,
            max_cluster_hit_tot: 13,
            create_cluster_info: true,
            create_cluster_hit_info: false,
        }
    }
}

impl ClusterConfig {
    /// Column neighborhood distance.
    pub fn dx(&self) -> u16 {
        self.dx
    }

    /// Row neighborhood distance.
    pub fn dy(&self) -> u16 {
        self.dy
    }

    /// BCID window width relative to the cluster's first frame.
    pub fn d_bcid(&self) -> u8 {
        self.d_bcid
    }

    /// Minimum hits for a cluster to be kept.
    pub fn min_cluster_hits(&self) -> u16 {
        self.min_cluster_hits
    }

    /// Maximum hits before a cluster is marked aborted.
    pub fn max_cluster_hits(&self) -> u16 {
        self.max_cluster_hits
    }

    /// ToT above which a hit is dropped at admission.
    pub fn max_hit_tot(&self) -> u8 {
        self.max_hit_tot
    }

    /// ToT above which a hit marks its whole cluster aborted.
    pub fn max_cluster_hit_tot(&self) -> u8 {
        self.max_cluster_hit_tot
    }

    /// Whether cluster records are written to the output array.
    pub fn create_cluster_info(&self) -> bool {
        self.create_cluster_info
    }

    /// Whether per-hit annotation records are written.
    pub fn create_cluster_hit_info(&self) -> bool {
        self.create_cluster_hit_info
    }

    /// Sets the column neighborhood distance; accepted only for
    /// `1 < dx < MAX_COLUMN - 1`.
    pub fn set_dx(&mut self, dx: u16) {
        if dx > 1 && (dx as usize) < MAX_COLUMN - 1 {
            self.dx = dx;
        } else {
            debug!("set_dx: {} out of range, keeping {}", dx, self.dx);
        }
    }

    /// Sets the row neighborhood distance; accepted only for
    /// `1 < dy < MAX_ROW - 1`.
    pub fn set_dy(&mut self, dy: u16) {
        if dy > 1 && (dy as usize) < MAX_ROW - 1 {
            self.dy = dy;
        } else {
            debug!("set_dy: {} out of range, keeping {}", dy, self.dy);
        }
    }

    /// Sets the BCID window width; accepted only for
    /// `d_bcid < MAX_BCID - 1`.
    pub fn set_d_bcid(&mut self, d_bcid: u8) {
        if (d_bcid as usize) < MAX_BCID - 1 {
            self.d_bcid = d_bcid;
        } else {
            debug!("set_d_bcid: {} out of range, keeping {}", d_bcid, self.d_bcid);
        }
    }

    /// Sets the minimum cluster size.
    pub fn set_min_cluster_hits(&mut self, min: u16) {
        self.min_cluster_hits = min;
    }

    /// Sets the maximum cluster size.
    pub fn set_max_cluster_hits(&mut self, max: u16) {
        self.max_cluster_hits = max;
    }

    /// Sets the admission ToT cap.
    pub fn set_max_hit_tot(&mut self, tot: u8) {
        self.max_hit_tot = tot;
    }

    /// Sets the per-cluster-hit ToT cap.
    pub fn set_max_cluster_hit_tot(&mut self, tot: u8) {
        self.max_cluster_hit_tot = tot;
    }

    /// Enables or disables the cluster output array.
    pub fn set_create_cluster_info(&mut self, enabled: bool) {
        self.create_cluster_info = enabled;
    }

    /// Enables or disables the per-hit annotation array.
    pub fn set_create_cluster_hit_info(&mut self, enabled: bool) {
        self.create_cluster_hit_info = enabled;
    }
}
