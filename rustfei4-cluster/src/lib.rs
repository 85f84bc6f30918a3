//! rustfei4-cluster: Event-wise hit clusterizer for FE-I4 data.
//!
//! The [`Clusterizer`] consumes an event-sorted stream of interpreted
//! hits and groups spatially and temporally adjacent hits of the same
//! event into clusters via a flood fill over a dense occupancy grid.
//! Per cluster it reports position, size, summed ToT/charge and the
//! seed pixel; aggregate distributions are kept in dense histograms.

pub mod engine;
pub mod grid;
pub mod histogram;

pub use engine::Clusterizer;
pub use grid::{ActiveRegion, Cell, ChargeMap, OccupancyGrid};
pub use histogram::ClusterHistograms;
