use rustfei4_cluster::Clusterizer;
use rustfei4_core::{ClusterInfo, HitInfo};

fn hit(event: u64, column: u8, row: u16, relative_bcid: u8, tot: u8) -> HitInfo {
    HitInfo {
        event_number: event,
        column,
        row,
        relative_bcid,
        tot,
        ..Default::default()
    }
}

fn cluster(clusterizer: &mut Clusterizer, hits: &[HitInfo]) -> Vec<ClusterInfo> {
    let mut clusters = vec![ClusterInfo::default(); 64];
    let n = clusterizer.add_hits(hits, &mut clusters, &mut []).unwrap();
    clusters.truncate(n);
    clusters
}

#[test]
fn test_single_hit() {
    let mut clusterizer = Clusterizer::new();
    let clusters = cluster(&mut clusterizer, &[hit(1, 5, 5, 0, 3)]);

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].event_number, 1);
    assert_eq!(clusters[0].id, 0);
    assert_eq!(clusters[0].size, 1);
    assert_eq!(clusters[0].tot, 3);
    assert_eq!(clusters[0].seed_column, 5);
    assert_eq!(clusters[0].seed_row, 5);
    assert_eq!(clusterizer.histograms().size_hist()[1], 1);
}

#[test]
fn test_adjacent_column_pair() {
    let mut clusterizer = Clusterizer::new();
    clusterizer.config_mut().set_dx(2);
    let clusters = cluster(&mut clusterizer, &[hit(1, 5, 5, 0, 3), hit(1, 6, 5, 0, 5)]);

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].size, 2);
    assert_eq!(clusters[0].tot, 8);
    // The higher-ToT hit seeds the cluster.
    assert_eq!(clusters[0].seed_column, 6);
    assert_eq!(clusters[0].seed_row, 5);
}

#[test]
fn test_adjacent_columns_join_at_default_dx() {
    let mut clusterizer = Clusterizer::new();
    // Rejected, the stored distance stays at the default of 1, which
    // still reaches the directly neighboring column.
    clusterizer.config_mut().set_dx(1);
    assert_eq!(clusterizer.config().dx(), 1);
    let clusters = cluster(&mut clusterizer, &[hit(1, 5, 5, 0, 3), hit(1, 6, 5, 0, 5)]);

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].size, 2);
    assert_eq!(clusters[0].tot, 8);
}

#[test]
fn test_columns_two_apart_need_wider_distance() {
    let mut clusterizer = Clusterizer::new();
    let clusters = cluster(&mut clusterizer, &[hit(1, 5, 5, 0, 3), hit(1, 7, 5, 0, 5)]);
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].size, 1);
    assert_eq!(clusters[1].size, 1);

    let mut clusterizer = Clusterizer::new();
    clusterizer.config_mut().set_dx(2);
    let clusters = cluster(&mut clusterizer, &[hit(1, 5, 5, 0, 3), hit(1, 7, 5, 0, 5)]);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].size, 2);
}

#[test]
fn test_bcid_window_boundary() {
    // dBCID = 4: a hit 4 frames after the cluster's first cell still
    // joins, 5 frames does not.
    let mut clusterizer = Clusterizer::new();
    let clusters = cluster(&mut clusterizer, &[hit(1, 5, 5, 0, 3), hit(1, 5, 6, 4, 4)]);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].size, 2);
    assert_eq!(clusters[0].seed_column, 5);
    assert_eq!(clusters[0].seed_row, 6);

    let mut clusterizer = Clusterizer::new();
    let clusters = cluster(&mut clusterizer, &[hit(1, 5, 5, 0, 3), hit(1, 5, 6, 5, 4)]);
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].size, 1);
    assert_eq!(clusters[1].size, 1);
}

#[test]
fn test_hit_above_tot_cap_is_dropped() {
    let mut clusterizer = Clusterizer::new();
    let clusters = cluster(&mut clusterizer, &[hit(1, 5, 5, 0, 3), hit(1, 5, 6, 0, 14)]);

    // The 14-ToT hit never enters the grid.
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].size, 1);
    assert_eq!(clusters[0].tot, 3);
    assert_eq!(clusterizer.histograms().size_hist()[1], 1);
    assert_eq!(clusterizer.histograms().size_hist().iter().sum::<u32>(), 1);
}

#[test]
fn test_cluster_with_over_tot_hit_is_aborted_and_drained() {
    let mut clusterizer = Clusterizer::new();
    // Let the 14-ToT hit into the grid, but keep the per-cluster cap.
    clusterizer.config_mut().set_max_hit_tot(14);
    assert_eq!(clusterizer.config().max_cluster_hit_tot(), 13);

    let event1 = [hit(1, 5, 5, 0, 3), hit(1, 5, 6, 0, 14), hit(1, 5, 7, 0, 3)];
    let clusters = cluster(&mut clusterizer, &event1);
    assert!(clusters.is_empty());
    assert_eq!(clusterizer.histograms().size_hist().iter().sum::<u32>(), 0);

    // All three cells were drained: the next event can fill them again.
    let event2 = [hit(2, 5, 5, 0, 3), hit(2, 5, 6, 0, 5), hit(2, 5, 7, 0, 3)];
    let clusters = cluster(&mut clusterizer, &event2);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].size, 3);
    assert_eq!(clusters[0].tot, 11);
}

#[test]
fn test_oversized_cluster_is_aborted() {
    let mut clusterizer = Clusterizer::new();
    // 11 hits in one column chain into a single cluster, above the
    // default maximum of 9.
    let hits: Vec<HitInfo> = (1..=11).map(|row| hit(1, 5, row, 0, 3)).collect();
    let clusters = cluster(&mut clusterizer, &hits);
    assert!(clusters.is_empty());

    // The grid drained regardless.
    let clusters = cluster(&mut clusterizer, &[hit(2, 5, 5, 0, 3)]);
    assert_eq!(clusters.len(), 1);
}

#[test]
fn test_cluster_below_minimum_size_is_discarded() {
    let mut clusterizer = Clusterizer::new();
    clusterizer.config_mut().set_min_cluster_hits(2);
    let clusters = cluster(
        &mut clusterizer,
        &[hit(1, 5, 5, 0, 3), hit(1, 40, 100, 0, 4), hit(1, 40, 101, 0, 4)],
    );
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].size, 2);
    // The surviving cluster still gets the dense ID 0.
    assert_eq!(clusters[0].id, 0);
}

#[test]
fn test_two_events_are_framed() {
    let mut clusterizer = Clusterizer::new();
    let clusters = cluster(&mut clusterizer, &[hit(1, 5, 5, 0, 3), hit(2, 5, 5, 0, 3)]);

    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].event_number, 1);
    assert_eq!(clusters[1].event_number, 2);
    // The cluster ID restarts at every event boundary.
    assert_eq!(clusters[0].id, 0);
    assert_eq!(clusters[1].id, 0);
}

#[test]
fn test_event_split_across_calls_continues() {
    let mut clusterizer = Clusterizer::new();
    let first = cluster(&mut clusterizer, &[hit(1, 5, 5, 0, 3)]);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].id, 0);

    // Same event number again: logged as misaligned, processed anyway
    // with the event's cluster counter carried over.
    let second = cluster(&mut clusterizer, &[hit(1, 40, 100, 0, 5)]);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].event_number, 1);
    assert_eq!(second[0].id, 1);
}

#[test]
fn test_diagonal_neighbors_join() {
    let mut clusterizer = Clusterizer::new();
    let clusters = cluster(&mut clusterizer, &[hit(1, 5, 5, 0, 3), hit(1, 6, 6, 0, 5)]);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].size, 2);
}

#[test]
fn test_row_distance_two_joins() {
    // dy = 2 by default, so a one-row gap still connects.
    let mut clusterizer = Clusterizer::new();
    let clusters = cluster(&mut clusterizer, &[hit(1, 5, 5, 0, 3), hit(1, 5, 7, 0, 5)]);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].size, 2);

    let mut clusterizer = Clusterizer::new();
    let clusters = cluster(&mut clusterizer, &[hit(1, 5, 5, 0, 3), hit(1, 5, 8, 0, 5)]);
    assert_eq!(clusters.len(), 2);
}

#[test]
fn test_detector_edge_neighborhood() {
    // Probes beyond column/row 1 underflow into misses, not panics.
    let mut clusterizer = Clusterizer::new();
    let clusters = cluster(&mut clusterizer, &[hit(1, 1, 1, 0, 3), hit(1, 2, 1, 0, 5)]);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].size, 2);
}

#[test]
fn test_cluster_info_disabled_still_counts() {
    let mut clusterizer = Clusterizer::new();
    clusterizer.config_mut().set_create_cluster_info(false);
    let hits = [hit(1, 5, 5, 0, 3), hit(2, 5, 5, 0, 3)];
    let n = clusterizer.add_hits(&hits, &mut [], &mut []).unwrap();
    assert_eq!(n, 2);
    assert_eq!(clusterizer.n_clusters(), 2);
    assert_eq!(clusterizer.histograms().size_hist()[1], 2);
}
