//! Reel grid and weighted symbol generation

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::symbols::{SymbolCatalog, SymbolId};

/// Visible symbols after a spin, indexed `[reel][row]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    reels: Vec<Vec<SymbolId>>,
}

impl Grid {
    /// Build from columns (one `Vec` per reel, top to bottom)
    ///
    /// All reels must have the same, non-zero height.
    pub fn from_reels(reels: Vec<Vec<SymbolId>>) -> SlotResult<Self> {
        let rows = reels.first().map(Vec::len).unwrap_or(0);
        if rows == 0 {
            return Err(SlotError::InvalidArgument("grid has no cells".into()));
        }
        if let Some(bad) = reels.iter().position(|r| r.len() != rows) {
            return Err(SlotError::InvalidArgument(format!(
                "reel {} has {} rows, expected {}",
                bad,
                reels[bad].len(),
                rows
            )));
        }
        Ok(Self { reels })
    }

    /// Build from rows (one `Vec` per row, left to right)
    pub fn from_rows(rows: Vec<Vec<SymbolId>>) -> SlotResult<Self> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|r| r.len() != width) {
            return Err(SlotError::InvalidArgument("ragged grid rows".into()));
        }
        let reels: Vec<Vec<SymbolId>> = (0..width)
            .map(|reel| rows.iter().map(|row| row[reel]).collect())
            .collect();
        Self::from_reels(reels)
    }

    pub fn reel_count(&self) -> usize {
        self.reels.len()
    }

    pub fn row_count(&self) -> usize {
        self.reels.first().map(Vec::len).unwrap_or(0)
    }

    /// Symbol at (reel, row)
    pub fn get(&self, reel: usize, row: usize) -> Option<SymbolId> {
        self.reels.get(reel).and_then(|r| r.get(row)).copied()
    }

    /// One reel, top to bottom
    pub fn reel(&self, reel: usize) -> Option<&[SymbolId]> {
        self.reels.get(reel).map(Vec::as_slice)
    }

    /// All reels
    pub fn reels(&self) -> &[Vec<SymbolId>] {
        &self.reels
    }

    /// One row, left to right
    pub fn row(&self, row: usize) -> Vec<SymbolId> {
        self.reels.iter().filter_map(|r| r.get(row).copied()).collect()
    }

    /// Iterate every cell as (reel, row, symbol)
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, SymbolId)> + '_ {
        self.reels.iter().enumerate().flat_map(|(reel, column)| {
            column
                .iter()
                .enumerate()
                .map(move |(row, &symbol)| (reel, row, symbol))
        })
    }
}

/// Weighted random grid generator
///
/// Holds the cumulative weight table of a catalog. Cells are drawn
/// independently; there are no reel strips and no repeat constraints.
#[derive(Debug, Clone)]
pub struct ReelGenerator {
    /// (symbol, cumulative weight) in catalog order
    cumulative: Vec<(SymbolId, u64)>,
    total_weight: u64,
}

impl ReelGenerator {
    /// Build the cumulative table for a catalog
    pub fn new(catalog: &SymbolCatalog) -> SlotResult<Self> {
        let mut running = 0u64;
        let cumulative: Vec<(SymbolId, u64)> = catalog
            .symbols()
            .iter()
            .map(|s| {
                running += s.weight as u64;
                (s.id, running)
            })
            .collect();

        if cumulative.is_empty() {
            return Err(SlotError::config("cannot generate reels from an empty catalog"));
        }
        if running == 0 {
            return Err(SlotError::config("cannot generate reels with zero total weight"));
        }

        Ok(Self {
            cumulative,
            total_weight: running,
        })
    }

    /// Draw one symbol
    pub fn draw<R: Rng>(&self, rng: &mut R) -> SymbolId {
        let value = rng.random_range(0..self.total_weight);
        self.pick(value)
    }

    /// First symbol whose cumulative weight exceeds `value`
    fn pick(&self, value: u64) -> SymbolId {
        let idx = self.cumulative.partition_point(|&(_, cum)| cum <= value);
        // value < total_weight, so idx is always in range
        self.cumulative[idx.min(self.cumulative.len() - 1)].0
    }

    /// Draw a full `reels × rows` grid
    pub fn generate_grid<R: Rng>(&self, reels: usize, rows: usize, rng: &mut R) -> Grid {
        let columns: Vec<Vec<SymbolId>> = (0..reels)
            .map(|_| (0..rows).map(|_| self.draw(rng)).collect())
            .collect();
        Grid { reels: columns }
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }
}

/// One-shot grid generation from a catalog
pub fn generate<R: Rng>(
    catalog: &SymbolCatalog,
    rows: usize,
    reels: usize,
    rng: &mut R,
) -> SlotResult<Grid> {
    if rows == 0 || reels == 0 {
        return Err(SlotError::config(format!("grid {reels}x{rows} has no cells")));
    }
    Ok(ReelGenerator::new(catalog)?.generate_grid(reels, rows, rng))
}
