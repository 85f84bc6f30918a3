//! The event-wise cluster engine.
//!
//! [`Clusterizer::add_hits`] frames the incoming hit stream into events
//! on the monotonic event number, admits each event's hits into the
//! occupancy grid and, at every event boundary, runs a flood fill that
//! drains connected hits into clusters. Hits are connected when they
//! are within the configured column/row distances and within the BCID
//! window opened by the cluster's first cell.

use log::{debug, warn};

use rustfei4_core::config::ClusterConfig;
use rustfei4_core::error::{ClusterError, Result};
use rustfei4_core::geometry::{MAX_BCID, MAX_COLUMN, MAX_ROW, PIXEL_PITCH_X, PIXEL_PITCH_Y};
use rustfei4_core::{ClusterHitInfo, ClusterInfo, HitInfo};

use crate::grid::{ChargeMap, OccupancyGrid};
use crate::histogram::ClusterHistograms;

/// Compass directions of the neighborhood scan as `(column, row)`
/// signs, in probe order: up, up-right, right, down-right, down,
/// down-left, left, up-left.
const DIRECTIONS: [(i32, i32); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Accumulators for the cluster currently being grown.
struct ClusterState {
    size: u32,
    tot_sum: u32,
    charge_sum: f32,
    x_weighted: f32,
    y_weighted: f32,
    max_tot: u8,
    seed_col: usize,
    seed_row: usize,
    seed_hit_index: u32,
    /// Relative BCID of the cluster's originating cell; opens the
    /// temporal window all member cells must fall into.
    anchor_bcid: u8,
    abort: bool,
    /// Input indices of the member hits, tracked only when per-hit
    /// output is enabled.
    members: Vec<u32>,
}

impl ClusterState {
    fn new(anchor_bcid: u8) -> Self {
        Self {
            size: 0,
            tot_sum: 0,
            charge_sum: 0.0,
            x_weighted: 0.0,
            y_weighted: 0.0,
            max_tot: 0,
            seed_col: 0,
            seed_row: 0,
            seed_hit_index: 0,
            anchor_bcid,
            abort: false,
            members: Vec::new(),
        }
    }
}

/// A committed cluster's membership, kept until the event is closed.
struct CommittedCluster {
    size: u16,
    members: Vec<u32>,
}

/// Per-event bookkeeping, reset at event boundaries.
#[derive(Default)]
struct EventScope {
    event_number: u64,
    event_status: u8,
    next_cluster_id: u32,
    committed: Vec<CommittedCluster>,
    /// Indices of hits with a pre-populated annotation record.
    annotated: Vec<u32>,
}

impl EventScope {
    fn reset(&mut self) {
        self.event_number = 0;
        self.event_status = 0;
        self.next_cluster_id = 0;
        self.committed.clear();
        self.annotated.clear();
    }
}

/// Event-wise hit clusterizer.
///
/// The grids and histograms are allocated once and reused across
/// events; input and output arrays are borrowed per call and never
/// retained. A single instance must not be shared between threads
/// without external serialization.
///
/// # Example
/// ```
/// use rustfei4_cluster::Clusterizer;
/// use rustfei4_core::{ClusterInfo, HitInfo};
///
/// let mut clusterizer = Clusterizer::new();
/// let hits = vec![HitInfo {
///     event_number: 1,
///     column: 5,
///     row: 5,
///     tot: 3,
///     ..Default::default()
/// }];
/// let mut clusters = vec![ClusterInfo::default(); 8];
/// let n = clusterizer.add_hits(&hits, &mut clusters, &mut []).unwrap();
/// assert_eq!(n, 1);
/// assert_eq!(clusters[0].size, 1);
/// ```
pub struct Clusterizer {
    config: ClusterConfig,
    grid: OccupancyGrid,
    charge_map: ChargeMap,
    histograms: ClusterHistograms,
    event: EventScope,
    /// Clusters written to the output array during the current call.
    n_clusters: usize,
    /// Scratch stack for the depth-first grow loop.
    stack: Vec<(i32, i32, i32)>,
}

impl Clusterizer {
    /// Creates a clusterizer with default settings.
    pub fn new() -> Self {
        Self::with_config(ClusterConfig::default())
    }

    /// Creates a clusterizer with the given settings.
    pub fn with_config(config: ClusterConfig) -> Self {
        Self {
            config,
            grid: OccupancyGrid::new(),
            charge_map: ChargeMap::new(),
            histograms: ClusterHistograms::new(),
            event: EventScope::default(),
            n_clusters: 0,
            stack: Vec::new(),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut ClusterConfig {
        &mut self.config
    }

    /// The aggregate cluster histograms.
    pub fn histograms(&self) -> &ClusterHistograms {
        &self.histograms
    }

    /// Clusters written during the last `add_hits` call.
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Loads a `(column, row, tot) -> charge` calibration table.
    ///
    /// Charge sums, the charge and position histograms and the
    /// charge-weighted centroid stay disabled until this succeeds.
    pub fn set_charge_calibration(&mut self, table: &[f32]) -> Result<()> {
        self.charge_map.load(table)?;
        Ok(())
    }

    /// Restores the engine to its post-construction state.
    ///
    /// Empties the grid, zeroes the histograms and clears the event
    /// scope. A loaded charge calibration is kept.
    pub fn reset(&mut self) {
        self.grid.clear_all();
        self.histograms.reset();
        self.event.reset();
        self.n_clusters = 0;
    }

    /// Clusters a batch of event-sorted hits.
    ///
    /// `clusters` receives one record per committed cluster when
    /// enabled; `cluster_hits`, indexed by input hit index, receives
    /// one annotation record per admitted hit when enabled. Returns
    /// the number of clusters committed during this call.
    ///
    /// An event split across calls is flushed at the call boundary; a
    /// batch starting with the already-flushed event number is logged
    /// as misaligned and processed anyway.
    pub fn add_hits(
        &mut self,
        hits: &[HitInfo],
        clusters: &mut [ClusterInfo],
        cluster_hits: &mut [ClusterHitInfo],
    ) -> Result<usize> {
        self.n_clusters = 0;

        if let Some(first) = hits.first() {
            if self.event.event_number != 0 && first.event_number == self.event.event_number {
                warn!("add_hits: hits not aligned at events, clusterizer will not work properly");
            }
        }

        for (i, hit) in hits.iter().enumerate() {
            // On the very first hit this flushes an empty grid, which
            // is a no-op; a plain inequality keeps event number 0 valid.
            if hit.event_number != self.event.event_number {
                self.finalize_event(clusters, cluster_hits)?;
                self.event.reset();
            }
            self.event.event_number = hit.event_number;
            self.admit(hit, i as u32, cluster_hits)?;
        }
        // The last event has no boundary behind it.
        self.finalize_event(clusters, cluster_hits)?;

        Ok(self.n_clusters)
    }

    /// Admits one hit into the occupancy grid.
    fn admit(
        &mut self,
        hit: &HitInfo,
        hit_index: u32,
        cluster_hits: &mut [ClusterHitInfo],
    ) -> Result<()> {
        if hit.tot > self.config.max_hit_tot() {
            return Ok(());
        }
        if hit.column == 0
            || hit.column as usize > MAX_COLUMN
            || hit.row == 0
            || hit.row as usize > MAX_ROW
            || hit.relative_bcid as usize >= MAX_BCID
        {
            warn!(
                "admit: event {}: hit at col/row/rel.bcid={}/{}/{} outside the detector, ignored",
                hit.event_number, hit.column, hit.row, hit.relative_bcid
            );
            return Ok(());
        }

        self.event.event_status |= hit.event_status;

        let col = hit.column as usize - 1;
        let row = hit.row as usize - 1;
        if !self.grid.insert(col, row, hit.relative_bcid, hit.tot, hit_index) {
            warn!(
                "admit: event {}: attempt to add the same hit col/row/rel.bcid={}/{}/{} again, ignored",
                hit.event_number, hit.column, hit.row, hit.relative_bcid
            );
        }

        if self.config.create_cluster_hit_info() {
            let index = hit_index as usize;
            let len = cluster_hits.len();
            let slot = cluster_hits
                .get_mut(index)
                .ok_or(ClusterError::HitIndexOutOfRange { index, size: len })?;
            *slot = ClusterHitInfo::from_hit(hit);
            self.event.annotated.push(hit_index);
        }
        Ok(())
    }

    /// Clusters the current event and writes the per-hit annotations.
    fn finalize_event(
        &mut self,
        clusters: &mut [ClusterInfo],
        cluster_hits: &mut [ClusterHitInfo],
    ) -> Result<()> {
        self.scan_event(clusters, cluster_hits)?;
        self.annotate_event(cluster_hits);
        Ok(())
    }

    /// Sweeps the active region and grows a cluster from every
    /// resident cell encountered.
    fn scan_event(
        &mut self,
        clusters: &mut [ClusterInfo],
        cluster_hits: &mut [ClusterHitInfo],
    ) -> Result<()> {
        let Some(region) = self.grid.region() else {
            return Ok(());
        };
        debug!(
            "scan_event: event {}: {} hits, cols {}..={}, rows {}..={}, bcids {}..={}",
            self.event.event_number,
            self.grid.n_hits(),
            region.min_col,
            region.max_col,
            region.min_row,
            region.max_row,
            region.first_bcid,
            region.last_bcid
        );

        let min_cluster_hits = u32::from(self.config.min_cluster_hits());

        'scan: for bcid in region.first_bcid..=region.last_bcid {
            for col in region.min_col..=region.max_col {
                for row in region.min_row..=region.max_row {
                    if self
                        .grid
                        .probe(col as i32, row as i32, i32::from(bcid))
                        .is_some()
                    {
                        let cluster = self.grow(col, row, bcid, cluster_hits)?;
                        if cluster.size >= min_cluster_hits && !cluster.abort {
                            self.commit(cluster, clusters, cluster_hits)?;
                        } else if cluster.abort {
                            warn!(
                                "scan_event: event {}: cluster of {} hits aborted, hits dropped",
                                self.event.event_number, cluster.size
                            );
                        } else {
                            warn!(
                                "scan_event: event {}: cluster of {} hits below minimum of {}, discarded",
                                self.event.event_number, cluster.size, min_cluster_hits
                            );
                        }
                    }
                    // Once every hit is in a cluster the sweep is done.
                    if self.grid.is_empty() {
                        break 'scan;
                    }
                }
            }
        }

        if !self.grid.is_empty() {
            warn!(
                "scan_event: event {}: not all hits clustered, {} left in the grid",
                self.event.event_number,
                self.grid.n_hits()
            );
            self.dump_residual();
            let cleared = self.grid.clear_if_nonempty();
            debug!("scan_event: cleared {} residual cells", cleared);
        }
        Ok(())
    }

    /// Grows one cluster from `(col, row, bcid)`, draining every
    /// connected cell from the grid.
    ///
    /// Depth-first over an explicit work stack; a popped cell is
    /// re-probed because it may already have been drained via another
    /// path. Per popped cell, at most one expansion is taken along
    /// each compass direction across the whole BCID window; the found
    /// neighbors are pushed in reverse discovery order so the stack
    /// visits the first-discovered neighbor's whole subtree first,
    /// which keeps the last-visited seed tie rule deterministic.
    fn grow(
        &mut self,
        col: usize,
        row: usize,
        bcid: u8,
        cluster_hits: &mut [ClusterHitInfo],
    ) -> Result<ClusterState> {
        let dx = i32::from(self.config.dx());
        let dy = i32::from(self.config.dy());
        let d_bcid = self.config.d_bcid();
        let max_hit_tot = self.config.max_hit_tot();
        let max_cluster_hit_tot = self.config.max_cluster_hit_tot();
        let max_cluster_hits = u32::from(self.config.max_cluster_hits());
        let annotate = self.config.create_cluster_hit_info();

        let mut cluster = ClusterState::new(bcid);
        self.stack.clear();
        self.stack.push((col as i32, row as i32, i32::from(bcid)));

        while let Some((c, r, b)) = self.stack.pop() {
            let Some(cell) = self.grid.probe(c, r, b) else {
                continue;
            };
            cluster.size += 1;

            // Equal ToT supersedes, so the seed ends up on the
            // last-visited max-ToT cell.
            if cell.tot >= cluster.max_tot && cell.tot <= max_hit_tot {
                cluster.max_tot = cell.tot;
                cluster.seed_col = c as usize;
                cluster.seed_row = r as usize;
                cluster.seed_hit_index = cell.hit_index;
            }

            if annotate {
                let index = cell.hit_index as usize;
                let len = cluster_hits.len();
                let slot = cluster_hits
                    .get_mut(index)
                    .ok_or(ClusterError::HitIndexOutOfRange { index, size: len })?;
                slot.cluster_id = self.event.next_cluster_id as u16;
                cluster.members.push(cell.hit_index);
            }

            // An oversized or over-ToT cluster is aborted but still
            // drained, so its cells cannot leak into the next sweep.
            if cell.tot > max_cluster_hit_tot {
                cluster.abort = true;
            }
            if cluster.size > max_cluster_hits {
                cluster.abort = true;
            }

            cluster.tot_sum += u32::from(cell.tot);
            let charge = self
                .charge_map
                .charge(c as usize, r as usize, cell.tot);
            cluster.charge_sum += charge;
            cluster.x_weighted += (c as f32 + 0.5) * PIXEL_PITCH_X * charge;
            cluster.y_weighted += (r as f32 + 0.5) * PIXEL_PITCH_Y * charge;

            self.grid.remove(c as usize, r as usize, b as u8);
            let Some(region) = self.grid.region() else {
                continue;
            };

            let window_end = (cluster.anchor_bcid + d_bcid).min(region.last_bcid);
            let mut taken = [false; 8];
            // At most one neighbor per direction; pushed in reverse
            // below so the stack pops them in discovery order.
            let mut found = [(0i32, 0i32, 0i32); 8];
            let mut n_found = 0;
            for wb in cluster.anchor_bcid..=window_end {
                for ix in 1..=dx {
                    for iy in 1..=dy {
                        for (dir, &(sx, sy)) in DIRECTIONS.iter().enumerate() {
                            if taken[dir] {
                                continue;
                            }
                            let nc = c + sx * ix;
                            let nr = r + sy * iy;
                            if self.grid.probe(nc, nr, i32::from(wb)).is_some() {
                                taken[dir] = true;
                                found[n_found] = (nc, nr, i32::from(wb));
                                n_found += 1;
                            }
                        }
                    }
                }
            }
            for &next in found[..n_found].iter().rev() {
                self.stack.push(next);
            }
        }
        Ok(cluster)
    }

    /// Commits a grown cluster to the histograms and output arrays.
    fn commit(
        &mut self,
        cluster: ClusterState,
        clusters: &mut [ClusterInfo],
        cluster_hits: &mut [ClusterHitInfo],
    ) -> Result<()> {
        let size = cluster.size as usize;
        self.histograms.record_size(size)?;
        self.histograms.record_tot(size, cluster.tot_sum)?;
        if self.charge_map.is_calibrated() {
            self.histograms.record_charge(size, cluster.charge_sum)?;
            if cluster.charge_sum > 0.0 {
                self.histograms.record_position(
                    cluster.x_weighted / cluster.charge_sum,
                    cluster.y_weighted / cluster.charge_sum,
                );
            }
        }

        if self.config.create_cluster_info() {
            let capacity = clusters.len();
            let slot = clusters
                .get_mut(self.n_clusters)
                .ok_or(ClusterError::ClusterBufferFull { capacity })?;
            *slot = ClusterInfo {
                event_number: self.event.event_number,
                id: self.event.next_cluster_id as u16,
                size: cluster.size as u16,
                tot: cluster.tot_sum as u16,
                charge: cluster.charge_sum,
                seed_column: (cluster.seed_col + 1) as u8,
                seed_row: (cluster.seed_row + 1) as u16,
                event_status: self.event.event_status,
            };
        }
        self.n_clusters += 1;

        if self.config.create_cluster_hit_info() {
            let index = cluster.seed_hit_index as usize;
            let len = cluster_hits.len();
            let slot = cluster_hits
                .get_mut(index)
                .ok_or(ClusterError::HitIndexOutOfRange { index, size: len })?;
            slot.is_seed = 1;
            self.event.committed.push(CommittedCluster {
                size: cluster.size as u16,
                members: cluster.members,
            });
        }

        self.event.next_cluster_id += 1;
        Ok(())
    }

    /// Fills the per-hit `cluster_size` and `n_cluster` fields once
    /// the event's clusters are known.
    fn annotate_event(&mut self, cluster_hits: &mut [ClusterHitInfo]) {
        if !self.config.create_cluster_hit_info() {
            return;
        }
        let n_cluster = self.event.next_cluster_id as u16;
        for &index in &self.event.annotated {
            if let Some(slot) = cluster_hits.get_mut(index as usize) {
                slot.n_cluster = n_cluster;
            }
        }
        self.event.annotated.clear();
        for committed in self.event.committed.drain(..) {
            for &index in &committed.members {
                if let Some(slot) = cluster_hits.get_mut(index as usize) {
                    slot.cluster_size = committed.size;
                }
            }
        }
    }

    fn dump_residual(&self) {
        const MAX_DUMP: usize = 100;
        if self.grid.n_hits() > MAX_DUMP {
            debug!("dump_residual: {} residual hits, not shown", self.grid.n_hits());
            return;
        }
        for (col, row, bcid, cell) in self.grid.resident_cells() {
            debug!(
                "dump_residual: col/row/rel.bcid/tot = {}/{}/{}/{}",
                col + 1,
                row + 1,
                bcid,
                cell.tot
            );
        }
    }
}

impl Default for Clusterizer {
    fn default() -> Self {
        Self::new()
    }
}
