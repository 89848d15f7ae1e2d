//! Paytable, paylines and win calculation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::reels::Grid;
use crate::symbols::{SymbolCatalog, SymbolId};

/// Smallest run that pays
pub const MIN_MATCH: usize = 3;
/// Largest run with its own paytable column; longer runs pay at this count
pub const MAX_MATCH: usize = 5;

const PAY_COLUMNS: usize = MAX_MATCH - MIN_MATCH + 1;

/// Multipliers per symbol for 3, 4 and 5 of a kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayTable {
    entries: BTreeMap<SymbolId, [f64; PAY_COLUMNS]>,
}

impl PayTable {
    /// Validate paytable entries against a catalog
    ///
    /// Every regular symbol needs all three columns, finite and non-negative,
    /// non-decreasing with the match count. The wild carries no entries.
    pub fn new(
        entries: BTreeMap<SymbolId, [f64; PAY_COLUMNS]>,
        catalog: &SymbolCatalog,
    ) -> SlotResult<Self> {
        for (&id, pays) in &entries {
            let symbol = catalog
                .get(id)
                .ok_or_else(|| SlotError::config(format!("paytable entry for unknown symbol {id}")))?;
            if symbol.is_wild() {
                return Err(SlotError::config(format!(
                    "wild symbol '{}' cannot have paytable entries",
                    symbol.name
                )));
            }
            if let Some(bad) = pays.iter().find(|m| !m.is_finite() || **m < 0.0) {
                return Err(SlotError::config(format!(
                    "symbol '{}' has invalid multiplier {}",
                    symbol.name, bad
                )));
            }
            if pays.windows(2).any(|w| w[1] < w[0]) {
                return Err(SlotError::config(format!(
                    "symbol '{}' multipliers must not decrease with match count: {:?}",
                    symbol.name, pays
                )));
            }
        }

        if let Some(missing) = catalog
            .symbols()
            .iter()
            .find(|s| !s.is_wild() && !entries.contains_key(&s.id))
        {
            return Err(SlotError::config(format!(
                "symbol '{}' has no paytable entry",
                missing.name
            )));
        }

        Ok(Self { entries })
    }

    /// Multiplier for `count` in a row of `symbol`
    ///
    /// `None` below three; counts above five use the five column.
    pub fn multiplier(&self, symbol: SymbolId, count: usize) -> Option<f64> {
        if count < MIN_MATCH {
            return None;
        }
        let column = count.min(MAX_MATCH) - MIN_MATCH;
        self.entries.get(&symbol).map(|pays| pays[column])
    }

    /// All three columns for a symbol
    pub fn pays(&self, symbol: SymbolId) -> Option<&[f64; PAY_COLUMNS]> {
        self.entries.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A payline: one (reel, row) cell per reel, left to right
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payline {
    /// Payline index (0-based)
    pub index: usize,
    /// Display name (e.g., "Middle", "V-Shape")
    #[serde(default)]
    pub name: Option<String>,
    /// (reel, row) coordinates
    pub cells: Vec<(usize, usize)>,
}

impl Payline {
    /// Build from one row index per reel
    pub fn from_rows(index: usize, rows: &[usize]) -> Self {
        Self {
            index,
            name: None,
            cells: rows.iter().copied().enumerate().collect(),
        }
    }

    /// Create a straight line (same row across all reels)
    pub fn straight(index: usize, row: usize, reel_count: usize) -> Self {
        Self::from_rows(index, &vec![row; reel_count])
    }

    /// Create a V-shaped line (top, down to the bottom, back to the top)
    ///
    /// Mirrored around the centre, so even reel counts get a flat bottom.
    pub fn v_shape(index: usize, rows: usize, reel_count: usize) -> Self {
        let positions: Vec<usize> = (0..reel_count)
            .map(|i| i.min(reel_count - 1 - i).min(rows.saturating_sub(1)))
            .collect();
        Self::from_rows(index, &positions)
    }

    /// Create an inverted V
    pub fn inverted_v(index: usize, rows: usize, reel_count: usize) -> Self {
        let bottom = rows.saturating_sub(1);
        let v = Self::v_shape(index, rows, reel_count);
        let positions: Vec<usize> = v.cells.iter().map(|&(_, row)| bottom - row).collect();
        Self::from_rows(index, &positions)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Row index per reel
    pub fn rows(&self) -> Vec<usize> {
        self.cells.iter().map(|&(_, row)| row).collect()
    }

    /// Display label ("Line 3" when unnamed)
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Line {}", self.index + 1),
        }
    }
}

/// Ordered payline set; the first N lines are the active ones
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaylineSet {
    lines: Vec<Payline>,
}

impl PaylineSet {
    /// Validate paylines for a `reels × rows` grid
    ///
    /// Each line needs exactly one cell per reel, reels in order 0..R-1,
    /// rows inside the grid. Lines are re-indexed by position.
    pub fn new(lines: Vec<Payline>, reels: usize, rows: usize) -> SlotResult<Self> {
        if lines.is_empty() {
            return Err(SlotError::config("payline set is empty"));
        }

        let mut validated = Vec::with_capacity(lines.len());
        for (index, mut line) in lines.into_iter().enumerate() {
            if line.cells.len() != reels {
                return Err(SlotError::config(format!(
                    "payline {} has {} cells, expected {}",
                    index,
                    line.cells.len(),
                    reels
                )));
            }
            for (expected_reel, &(reel, row)) in line.cells.iter().enumerate() {
                if reel != expected_reel {
                    return Err(SlotError::config(format!(
                        "payline {index} visits reel {reel} where reel {expected_reel} was expected"
                    )));
                }
                if row >= rows {
                    return Err(SlotError::config(format!(
                        "payline {index} uses row {row} on a {rows}-row grid"
                    )));
                }
            }
            line.index = index;
            validated.push(line);
        }

        Ok(Self { lines: validated })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Payline> {
        self.lines.get(index)
    }

    pub fn lines(&self) -> &[Payline] {
        &self.lines
    }

    /// Every line has one cell per reel, all inside a `reels × rows` grid
    pub fn fits(&self, reels: usize, rows: usize) -> bool {
        self.lines.iter().all(|line| {
            line.cells.len() == reels
                && line
                    .cells
                    .iter()
                    .enumerate()
                    .all(|(expected_reel, &(reel, row))| reel == expected_reel && row < rows)
        })
    }

    /// The first `count` lines
    pub fn active(&self, count: usize) -> SlotResult<&[Payline]> {
        if count == 0 || count > self.lines.len() {
            return Err(SlotError::config(format!(
                "active payline count {} outside 1..={}",
                count,
                self.lines.len()
            )));
        }
        Ok(&self.lines[..count])
    }
}

/// Result of one evaluated payline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineResult {
    /// Payline index
    pub payline_index: usize,
    /// Target symbol of the line
    pub symbol: SymbolId,
    /// Left-anchored run length (0 when shorter than three)
    pub match_length: usize,
    /// Paytable multiplier (0 for a miss)
    pub multiplier: f64,
    /// Multiplier × bet per line
    pub payout: u64,
    /// Cells of the winning run (empty for a miss)
    pub positions: Vec<(usize, usize)>,
    /// How many cells of the run were wild
    pub wild_count: usize,
}

impl LineResult {
    fn miss(payline_index: usize, symbol: SymbolId) -> Self {
        Self {
            payline_index,
            symbol,
            match_length: 0,
            multiplier: 0.0,
            payout: 0,
            positions: Vec::new(),
            wild_count: 0,
        }
    }

    pub fn is_win(&self) -> bool {
        self.payout > 0
    }
}

/// Result of evaluating a grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// One entry per active payline, in payline order
    pub line_results: Vec<LineResult>,
    /// Sum of line payouts
    pub total_payout: u64,
}

impl Evaluation {
    pub fn is_win(&self) -> bool {
        self.total_payout > 0
    }

    /// Lines that paid
    pub fn winning_lines(&self) -> impl Iterator<Item = &LineResult> {
        self.line_results.iter().filter(|l| l.is_win())
    }

    pub fn win_count(&self) -> usize {
        self.winning_lines().count()
    }
}

/// Credits for a multiplier at a bet per line, rounded to the nearest credit
///
/// Fails when the payout does not fit in a `u64`.
pub fn line_payout(multiplier: f64, bet_per_line: u64) -> SlotResult<u64> {
    let credits = (multiplier * bet_per_line as f64).round();
    // u64::MAX as f64 rounds up to 2^64, which is already out of range
    if !credits.is_finite() || credits < 0.0 || credits >= u64::MAX as f64 {
        return Err(SlotError::config(format!(
            "payout of {multiplier} x {bet_per_line} overflows the credit range"
        )));
    }
    Ok(credits as u64)
}

/// Payline evaluator over a catalog and paytable
#[derive(Debug, Clone, Copy)]
pub struct PayoutCalculator<'a> {
    catalog: &'a SymbolCatalog,
    paytable: &'a PayTable,
}

impl<'a> PayoutCalculator<'a> {
    pub fn new(catalog: &'a SymbolCatalog, paytable: &'a PayTable) -> Self {
        Self { catalog, paytable }
    }

    /// Evaluate the first `active_count` paylines of a grid
    ///
    /// Pure: identical inputs always give identical results.
    pub fn evaluate(
        &self,
        grid: &Grid,
        paylines: &PaylineSet,
        active_count: usize,
        bet_per_line: u64,
    ) -> SlotResult<Evaluation> {
        let active = paylines.active(active_count)?;

        let line_results = active
            .iter()
            .map(|line| self.evaluate_line(grid, line, bet_per_line))
            .collect::<SlotResult<Vec<_>>>()?;

        let total_payout = line_results
            .iter()
            .try_fold(0u64, |total, line| total.checked_add(line.payout))
            .ok_or_else(|| SlotError::config("total payout overflows the credit range"))?;

        Ok(Evaluation {
            line_results,
            total_payout,
        })
    }

    /// Evaluate a single payline
    pub fn evaluate_line(
        &self,
        grid: &Grid,
        payline: &Payline,
        bet_per_line: u64,
    ) -> SlotResult<LineResult> {
        // Symbols on this line, left to right
        let line_symbols = payline
            .cells
            .iter()
            .map(|&(reel, row)| {
                grid.get(reel, row).ok_or_else(|| {
                    SlotError::InvalidArgument(format!(
                        "payline {} cell ({}, {}) is outside the {}x{} grid",
                        payline.index,
                        reel,
                        row,
                        grid.reel_count(),
                        grid.row_count()
                    ))
                })
            })
            .collect::<SlotResult<Vec<SymbolId>>>()?;

        let wild = self.catalog.wild_id();

        // First non-wild symbol; an all-wild line plays as the best symbol
        let target = line_symbols
            .iter()
            .copied()
            .find(|&s| s != wild)
            .unwrap_or_else(|| self.catalog.best_id());

        // Count consecutive matches from the left
        let run = line_symbols
            .iter()
            .take_while(|&&s| s == target || s == wild)
            .count();

        if run < MIN_MATCH {
            return Ok(LineResult::miss(payline.index, target));
        }

        let multiplier = self.paytable.multiplier(target, run).unwrap_or(0.0);
        let wild_count = line_symbols[..run].iter().filter(|&&s| s == wild).count();

        Ok(LineResult {
            payline_index: payline.index,
            symbol: target,
            match_length: run,
            multiplier,
            payout: line_payout(multiplier, bet_per_line)?,
            positions: payline.cells[..run].to_vec(),
            wild_count,
        })
    }
}

/// Evaluate a grid in one call
pub fn evaluate(
    grid: &Grid,
    paylines: &PaylineSet,
    active_count: usize,
    paytable: &PayTable,
    catalog: &SymbolCatalog,
    bet_per_line: u64,
) -> SlotResult<Evaluation> {
    PayoutCalculator::new(catalog, paytable).evaluate(grid, paylines, active_count, bet_per_line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Symbol;

    const WILD: SymbolId = 0;
    const SEVEN: SymbolId = 1;
    const BAR: SymbolId = 2;

    fn catalog() -> SymbolCatalog {
        SymbolCatalog::new(vec![
            Symbol::wild(WILD, "wild", "W", 1),
            Symbol::regular(SEVEN, "seven", "7", 2, 10),
            Symbol::regular(BAR, "bar", "B", 7, 5),
        ])
        .unwrap()
    }

    fn paytable(catalog: &SymbolCatalog) -> PayTable {
        let mut entries = BTreeMap::new();
        entries.insert(SEVEN, [5.0, 20.0, 50.0]);
        entries.insert(BAR, [2.0, 4.0, 10.0]);
        PayTable::new(entries, catalog).unwrap()
    }

    fn middle_line() -> PaylineSet {
        PaylineSet::new(vec![Payline::straight(0, 1, 5)], 5, 3).unwrap()
    }

    fn grid_with_middle(middle: [SymbolId; 5]) -> Grid {
        Grid::from_rows(vec![
            vec![BAR, SEVEN, BAR, SEVEN, BAR],
            middle.to_vec(),
            vec![SEVEN, BAR, SEVEN, BAR, SEVEN],
        ])
        .unwrap()
    }

    fn eval(middle: [SymbolId; 5], bet: u64) -> LineResult {
        let catalog = catalog();
        let paytable = paytable(&catalog);
        let result = evaluate(
            &grid_with_middle(middle),
            &middle_line(),
            1,
            &paytable,
            &catalog,
            bet,
        )
        .unwrap();
        result.line_results.into_iter().next().unwrap()
    }

    #[test]
    fn test_wild_leads_into_seven_run() {
        let line = eval([WILD, SEVEN, SEVEN, BAR, BAR], 10);
        assert_eq!(line.symbol, SEVEN);
        assert_eq!(line.match_length, 3);
        assert_eq!(line.multiplier, 5.0);
        assert_eq!(line.payout, 50);
        assert_eq!(line.wild_count, 1);
        assert_eq!(line.positions, vec![(0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn test_all_wild_pays_best_symbol() {
        let line = eval([WILD; 5], 10);
        assert_eq!(line.symbol, SEVEN);
        assert_eq!(line.match_length, 5);
        assert_eq!(line.payout, 500);
    }

    #[test]
    fn test_break_stops_run() {
        // Seven run broken at reel 2; later sevens do not count
        let line = eval([SEVEN, SEVEN, BAR, SEVEN, SEVEN], 10);
        assert_eq!(line.match_length, 0);
        assert_eq!(line.payout, 0);
        assert!(line.positions.is_empty());
    }

    #[test]
    fn test_run_must_start_at_reel_zero() {
        let line = eval([BAR, SEVEN, SEVEN, SEVEN, SEVEN], 10);
        assert_eq!(line.symbol, BAR);
        assert_eq!(line.match_length, 0);
    }

    #[test]
    fn test_trailing_wilds_extend_run() {
        let line = eval([BAR, BAR, WILD, WILD, SEVEN], 3);
        assert_eq!(line.symbol, BAR);
        assert_eq!(line.match_length, 4);
        assert_eq!(line.payout, 12);
    }

    #[test]
    fn test_decimal_multiplier_rounds() {
        assert_eq!(line_payout(2.5, 3).unwrap(), 8);
        assert_eq!(line_payout(0.5, 1).unwrap(), 1);
        assert_eq!(line_payout(0.0, 100).unwrap(), 0);
    }

    #[test]
    fn test_multiplier_clamps_long_runs() {
        let catalog = catalog();
        let table = paytable(&catalog);
        assert_eq!(table.multiplier(SEVEN, 2), None);
        assert_eq!(table.multiplier(SEVEN, 4), Some(20.0));
        assert_eq!(table.multiplier(SEVEN, 6), Some(50.0));
        assert_eq!(table.multiplier(WILD, 5), None);
    }

    #[test]
    fn test_active_count_bounds() {
        let catalog = catalog();
        let table = paytable(&catalog);
        let grid = grid_with_middle([WILD; 5]);
        let lines = middle_line();
        assert!(matches!(
            evaluate(&grid, &lines, 0, &table, &catalog, 1),
            Err(SlotError::Configuration(_))
        ));
        assert!(matches!(
            evaluate(&grid, &lines, 2, &table, &catalog, 1),
            Err(SlotError::Configuration(_))
        ));
    }

    #[test]
    fn test_out_of_bounds_payline() {
        let catalog = catalog();
        let table = paytable(&catalog);
        // Lines validated for 5x3, grid only 5x1
        let lines = PaylineSet::new(vec![Payline::straight(0, 2, 5)], 5, 3).unwrap();
        let grid = Grid::from_rows(vec![vec![SEVEN; 5]]).unwrap();
        assert!(matches!(
            evaluate(&grid, &lines, 1, &table, &catalog, 1),
            Err(SlotError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_evaluate_is_pure() {
        let catalog = catalog();
        let table = paytable(&catalog);
        let lines = PaylineSet::new(
            vec![
                Payline::straight(0, 1, 5),
                Payline::straight(1, 0, 5),
                Payline::v_shape(2, 3, 5),
            ],
            5,
            3,
        )
        .unwrap();
        let grid = grid_with_middle([WILD, SEVEN, WILD, SEVEN, BAR]);
        let first = evaluate(&grid, &lines, 3, &table, &catalog, 7).unwrap();
        let second = evaluate(&grid, &lines, 3, &table, &catalog, 7).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.line_results.len(), 3);
        assert_eq!(
            first.total_payout,
            first.line_results.iter().map(|l| l.payout).sum::<u64>()
        );
    }

    #[test]
    fn test_oversized_line_payout_rejected() {
        assert!(matches!(line_payout(2e19, 1), Err(SlotError::Configuration(_))));
        assert!(matches!(line_payout(1e19, 2), Err(SlotError::Configuration(_))));
        assert_eq!(line_payout(1e19, 1).unwrap(), 10_000_000_000_000_000_000);
    }

    #[test]
    fn test_total_payout_overflow_rejected() {
        let catalog = catalog();
        let mut entries = BTreeMap::new();
        entries.insert(SEVEN, [1e19, 1e19, 1e19]);
        entries.insert(BAR, [2.0, 4.0, 10.0]);
        let table = PayTable::new(entries, &catalog).unwrap();

        // Two lines over the same cells, each paying 1e19
        let lines = PaylineSet::new(
            vec![Payline::straight(0, 0, 3), Payline::straight(1, 0, 3)],
            3,
            1,
        )
        .unwrap();
        let grid = Grid::from_rows(vec![vec![SEVEN; 3]]).unwrap();

        assert_eq!(
            evaluate(&grid, &lines, 1, &table, &catalog, 1).unwrap().total_payout,
            10_000_000_000_000_000_000
        );
        assert!(matches!(
            evaluate(&grid, &lines, 2, &table, &catalog, 1),
            Err(SlotError::Configuration(_))
        ));
    }

    #[test]
    fn test_payline_set_fits_grid() {
        let lines = PaylineSet::new(vec![Payline::v_shape(0, 3, 5)], 5, 3).unwrap();
        assert!(lines.fits(5, 3));
        assert!(lines.fits(5, 4));
        assert!(!lines.fits(5, 2));
        assert!(!lines.fits(4, 3));
        assert!(!lines.fits(6, 3));
    }

    #[test]
    fn test_payline_shapes() {
        assert_eq!(Payline::straight(0, 1, 5).rows(), vec![1, 1, 1, 1, 1]);
        assert_eq!(Payline::v_shape(3, 3, 5).rows(), vec![0, 1, 2, 1, 0]);
        assert_eq!(Payline::inverted_v(4, 3, 5).rows(), vec![2, 1, 0, 1, 2]);
        assert_eq!(Payline::v_shape(0, 3, 4).rows(), vec![0, 1, 1, 0]);
        assert_eq!(Payline::v_shape(0, 3, 6).rows(), vec![0, 1, 2, 2, 1, 0]);
        assert_eq!(Payline::inverted_v(0, 3, 4).rows(), vec![2, 1, 1, 2]);
        assert_eq!(Payline::v_shape(0, 2, 7).rows(), vec![0, 1, 1, 1, 1, 1, 0]);
        assert_eq!(Payline::straight(2, 0, 5).label(), "Line 3");
        assert_eq!(Payline::straight(0, 1, 5).with_name("Middle").label(), "Middle");
    }

    #[test]
    fn test_payline_validation() {
        assert!(PaylineSet::new(Vec::new(), 5, 3).is_err());
        assert!(PaylineSet::new(vec![Payline::straight(0, 1, 4)], 5, 3).is_err());
        assert!(PaylineSet::new(vec![Payline::straight(0, 3, 5)], 5, 3).is_err());

        let shuffled = Payline {
            index: 0,
            name: None,
            cells: vec![(1, 0), (0, 0), (2, 0), (3, 0), (4, 0)],
        };
        assert!(PaylineSet::new(vec![shuffled], 5, 3).is_err());
    }

    #[test]
    fn test_paytable_validation() {
        let catalog = catalog();

        let mut missing = BTreeMap::new();
        missing.insert(SEVEN, [5.0, 20.0, 50.0]);
        assert!(PayTable::new(missing, &catalog).is_err());

        let mut decreasing = BTreeMap::new();
        decreasing.insert(SEVEN, [5.0, 20.0, 10.0]);
        decreasing.insert(BAR, [1.0, 1.0, 1.0]);
        assert!(PayTable::new(decreasing, &catalog).is_err());

        let mut negative = BTreeMap::new();
        negative.insert(SEVEN, [-1.0, 20.0, 50.0]);
        negative.insert(BAR, [1.0, 1.0, 1.0]);
        assert!(PayTable::new(negative, &catalog).is_err());

        let mut wild_pays = BTreeMap::new();
        wild_pays.insert(SEVEN, [5.0, 20.0, 50.0]);
        wild_pays.insert(BAR, [1.0, 1.0, 1.0]);
        wild_pays.insert(WILD, [100.0, 500.0, 2000.0]);
        assert!(PayTable::new(wild_pays, &catalog).is_err());

        let mut unknown = BTreeMap::new();
        unknown.insert(SEVEN, [5.0, 20.0, 50.0]);
        unknown.insert(BAR, [1.0, 1.0, 1.0]);
        unknown.insert(42, [1.0, 1.0, 1.0]);
        assert!(PayTable::new(unknown, &catalog).is_err());
    }
}
