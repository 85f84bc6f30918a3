//! Dense 3D occupancy grid over (column, row, relative BCID).
//!
//! The grid gives O(1) presence tests, inserts and deletes for the
//! flood fill. Cells are backed by a contiguous ToT array with `-1` as
//! the empty sentinel; reads and writes go through helpers that expose
//! an [`Option`] instead of the raw sentinel. A parallel array keeps
//! the input index of the resident hit.

use rustfei4_core::error::CalibrationError;
use rustfei4_core::geometry::{MAX_BCID, MAX_COLUMN, MAX_ROW, MAX_TOT_LOOKUP};

const EMPTY: i16 = -1;

/// A resident hit in the occupancy grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Time over threshold of the resident hit.
    pub tot: u8,
    /// Index of the hit in the input array of the current call.
    pub hit_index: u32,
}

/// The minimal axis-aligned box enclosing all resident hits.
///
/// `first_bcid` is pinned by the first hit admitted into the empty
/// grid, not a running minimum; `last_bcid` is the maximum seen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveRegion {
    /// Smallest occupied column, 0-based.
    pub min_col: usize,
    /// Largest occupied column, 0-based.
    pub max_col: usize,
    /// Smallest occupied row, 0-based.
    pub min_row: usize,
    /// Largest occupied row, 0-based.
    pub max_row: usize,
    /// Relative BCID of the first hit admitted into the empty grid.
    pub first_bcid: u8,
    /// Largest relative BCID seen.
    pub last_bcid: u8,
}

/// Dense per-event hit occupancy, reused across events.
pub struct OccupancyGrid {
    /// ToT per cell, `EMPTY` marks a free cell.
    tot: Vec<i16>,
    /// Input-array index of the resident hit, parallel to `tot`.
    ///
    /// Only meaningful where `tot` is non-empty; stale entries are
    /// never read back.
    hit_index: Vec<u32>,
    n_hits: usize,
    region: Option<ActiveRegion>,
}

impl OccupancyGrid {
    /// Allocates an empty grid covering the full detector.
    pub fn new() -> Self {
        let cells = MAX_COLUMN * MAX_ROW * MAX_BCID;
        Self {
            tot: vec![EMPTY; cells],
            hit_index: vec![0; cells],
            n_hits: 0,
            region: None,
        }
    }

    #[inline]
    fn index(col: usize, row: usize, bcid: usize) -> usize {
        bcid * MAX_ROW * MAX_COLUMN + row * MAX_COLUMN + col
    }

    /// Number of resident hits.
    pub fn n_hits(&self) -> usize {
        self.n_hits
    }

    /// True when no hit is resident.
    pub fn is_empty(&self) -> bool {
        self.n_hits == 0
    }

    /// The active bounding box, or `None` when the grid is empty.
    pub fn region(&self) -> Option<ActiveRegion> {
        self.region
    }

    /// Inserts a hit at `(col, row, bcid)`.
    ///
    /// Returns `false` without mutating anything when the cell is
    /// already occupied (a duplicate hit within the event).
    pub fn insert(&mut self, col: usize, row: usize, bcid: u8, tot: u8, hit_index: u32) -> bool {
        let idx = Self::index(col, row, bcid as usize);
        if self.tot[idx] != EMPTY {
            return false;
        }
        self.tot[idx] = tot as i16;
        self.hit_index[idx] = hit_index;
        self.n_hits += 1;
        self.region = Some(match self.region.take() {
            None => ActiveRegion {
                min_col: col,
                max_col: col,
                min_row: row,
                max_row: row,
                first_bcid: bcid,
                last_bcid: bcid,
            },
            Some(mut r) => {
                r.min_col = r.min_col.min(col);
                r.max_col = r.max_col.max(col);
                r.min_row = r.min_row.min(row);
                r.max_row = r.max_row.max(row);
                r.last_bcid = r.last_bcid.max(bcid);
                r
            }
        });
        true
    }

    /// Bounds-checked presence query.
    ///
    /// Out-of-range coordinates (including negative ones from neighbor
    /// arithmetic at the detector edge) are an ordinary miss.
    #[inline]
    pub fn probe(&self, col: i32, row: i32, bcid: i32) -> Option<Cell> {
        if col < 0
            || col >= MAX_COLUMN as i32
            || row < 0
            || row >= MAX_ROW as i32
            || bcid < 0
            || bcid >= MAX_BCID as i32
        {
            return None;
        }
        let idx = Self::index(col as usize, row as usize, bcid as usize);
        match self.tot[idx] {
            EMPTY => None,
            tot => Some(Cell {
                tot: tot as u8,
                hit_index: self.hit_index[idx],
            }),
        }
    }

    /// Clears the cell at `(col, row, bcid)`.
    ///
    /// Returns `true` when the grid became empty; the active region is
    /// reset in that case.
    pub fn remove(&mut self, col: usize, row: usize, bcid: u8) -> bool {
        let idx = Self::index(col, row, bcid as usize);
        debug_assert_ne!(self.tot[idx], EMPTY, "remove on an empty cell");
        self.tot[idx] = EMPTY;
        self.n_hits -= 1;
        if self.n_hits == 0 {
            self.region = None;
            true
        } else {
            false
        }
    }

    /// Clears any residual cells left from the previous event.
    ///
    /// Sweeps the active column/row box over BCID `0..=last_bcid`; the
    /// sweep cannot start at `first_bcid` because that mark is pinned
    /// by the first hit and may lie above resident cells. Returns the
    /// number of cells cleared.
    pub fn clear_if_nonempty(&mut self) -> usize {
        let Some(r) = self.region else {
            return 0;
        };
        let mut cleared = 0;
        for bcid in 0..=r.last_bcid as usize {
            for row in r.min_row..=r.max_row {
                for col in r.min_col..=r.max_col {
                    let idx = Self::index(col, row, bcid);
                    if self.tot[idx] != EMPTY {
                        self.tot[idx] = EMPTY;
                        cleared += 1;
                    }
                }
            }
        }
        self.n_hits = 0;
        self.region = None;
        cleared
    }

    /// Empties the whole grid, bypassing the active region.
    pub fn clear_all(&mut self) {
        self.tot.fill(EMPTY);
        self.n_hits = 0;
        self.region = None;
    }

    /// Collects the resident cells within the active region, in
    /// `(bcid, col, row)` scan order. Diagnostic use.
    pub fn resident_cells(&self) -> Vec<(usize, usize, u8, Cell)> {
        let Some(r) = self.region else {
            return Vec::new();
        };
        let mut cells = Vec::with_capacity(self.n_hits);
        for bcid in 0..=r.last_bcid {
            for col in r.min_col..=r.max_col {
                for row in r.min_row..=r.max_row {
                    if let Some(cell) = self.probe(col as i32, row as i32, bcid as i32) {
                        cells.push((col, row, bcid, cell));
                    }
                }
            }
        }
        cells
    }
}

impl Default for OccupancyGrid {
    fn default() -> Self {
        Self::new()
    }
}

/// Charge calibration lookup over `(column, row, tot)`.
///
/// Starts out zeroed and unloaded; charge-dependent results stay
/// disabled until a calibration table is loaded.
pub struct ChargeMap {
    charge: Vec<f32>,
    calibrated: bool,
}

impl ChargeMap {
    /// Allocates a zeroed, unloaded calibration map.
    pub fn new() -> Self {
        Self {
            charge: vec![0.0; MAX_COLUMN * MAX_ROW * MAX_TOT_LOOKUP],
            calibrated: false,
        }
    }

    /// Loads a calibration table of `(col, row, tot) -> charge` values.
    ///
    /// The table is laid out tot-major like the internal map and must
    /// have exactly `MAX_COLUMN * MAX_ROW * MAX_TOT_LOOKUP` entries.
    pub fn load(&mut self, table: &[f32]) -> Result<(), CalibrationError> {
        if table.len() != self.charge.len() {
            return Err(CalibrationError::WrongSize {
                got: table.len(),
                expected: self.charge.len(),
            });
        }
        self.charge.copy_from_slice(table);
        self.calibrated = true;
        Ok(())
    }

    /// True once a calibration table has been loaded.
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Charge of a hit at `(col, row)` with the given ToT.
    ///
    /// ToT codes outside the lookup depth read as zero charge.
    #[inline]
    pub fn charge(&self, col: usize, row: usize, tot: u8) -> f32 {
        let tot = tot as usize;
        if tot >= MAX_TOT_LOOKUP {
            return 0.0;
        }
        self.charge[tot * MAX_ROW * MAX_COLUMN + row * MAX_COLUMN + col]
    }
}

impl Default for ChargeMap {
    fn default() -> Self {
        Self::new()
    }
}
