//! Cluster output record type.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One reconstructed cluster.
///
/// `id` is 0-based and dense within each event; `seed_column` and
/// `seed_row` are 1-based like the input hit coordinates. `charge`
/// stays zero until a charge calibration has been loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(C)]
pub struct ClusterInfo {
    /// Event the cluster belongs to.
    pub event_number: u64,
    /// 0-based cluster ID within the event.
    pub id: u16,
    /// Number of hits in the cluster.
    pub size: u16,
    /// Summed time over threshold.
    pub tot: u16,
    /// Summed calibrated charge.
    pub charge: f32,
    /// Seed pixel column, 1-based.
    pub seed_column: u8,
    /// Seed pixel row, 1-based.
    pub seed_row: u16,
    /// Event error flags OR-folded over the event's hits.
    pub event_status: u8,
}
