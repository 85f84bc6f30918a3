//! Hit record types for FE-I4 raw-data analysis.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One interpreted pixel hit, as produced by the raw-data interpreter.
///
/// Records are sorted by `event_number` and an event's hits are
/// contiguous. `column` and `row` are 1-based detector coordinates;
/// `relative_bcid` is the frame offset within the trigger window.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(C)]
pub struct HitInfo {
    /// Trigger-delivered event number, non-decreasing over a run.
    pub event_number: u64,
    /// Trigger counter value.
    pub trigger_number: u32,
    /// Frame offset within the trigger window.
    pub relative_bcid: u8,
    /// Level-1 trigger ID.
    pub lvl_id: u16,
    /// Pixel column, 1-based.
    pub column: u8,
    /// Pixel row, 1-based.
    pub row: u16,
    /// Time over threshold.
    pub tot: u8,
    /// TDC counter value.
    pub tdc: u16,
    /// Absolute bunch-crossing ID.
    pub bcid: u16,
    /// Trigger error flags.
    pub trigger_status: u8,
    /// Service record word.
    pub service_record: u32,
    /// Event error flags, OR-folded into the cluster output.
    pub event_status: u8,
}

/// Per-hit cluster annotation, one record per input hit.
///
/// Carries all [`HitInfo`] fields plus the cluster membership of the
/// hit within its event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(C)]
pub struct ClusterHitInfo {
    /// Trigger-delivered event number.
    pub event_number: u64,
    /// Trigger counter value.
    pub trigger_number: u32,
    /// Frame offset within the trigger window.
    pub relative_bcid: u8,
    /// Level-1 trigger ID.
    pub lvl_id: u16,
    /// Pixel column, 1-based.
    pub column: u8,
    /// Pixel row, 1-based.
    pub row: u16,
    /// Time over threshold.
    pub tot: u8,
    /// TDC counter value.
    pub tdc: u16,
    /// Absolute bunch-crossing ID.
    pub bcid: u16,
    /// Trigger error flags.
    pub trigger_status: u8,
    /// Service record word.
    pub service_record: u32,
    /// Event error flags.
    pub event_status: u8,
    /// 0-based cluster ID within the event.
    pub cluster_id: u16,
    /// 1 when this hit is the cluster seed, 0 otherwise.
    pub is_seed: u8,
    /// Number of hits in the containing cluster.
    pub cluster_size: u16,
    /// Number of clusters in the containing event.
    pub n_cluster: u16,
}

impl ClusterHitInfo {
    /// Pre-populates an annotation record from its hit.
    ///
    /// Cluster membership fields start at zero and are filled in when
    /// the containing event is clustered.
    pub fn from_hit(hit: &HitInfo) -> Self {
        Self {
            event_number: hit.event_number,
            trigger_number: hit.trigger_number,
            relative_bcid: hit.relative_bcid,
            lvl_id: hit.lvl_id,
            column: hit.column,
            row: hit.row,
            tot: hit.tot,
            tdc: hit.tdc,
            bcid: hit.bcid,
            trigger_status: hit.trigger_status,
            service_record: hit.service_record,
            event_status: hit.event_status,
            cluster_id: 0,
            is_seed: 0,
            cluster_size: 0,
            n_cluster: 0,
        }
    }
}
