//! Spin result and stage event generation

use serde::{Deserialize, Serialize};

use sf_stage::Stage;

use crate::paytable::LineResult;
use crate::reels::Grid;

/// Complete outcome of one accepted spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    /// Spin sequence number within the session (starts at 1)
    pub spin_id: u64,
    /// Final grid
    pub grid: Grid,
    /// One result per active payline, in payline order
    pub line_results: Vec<LineResult>,
    /// Bet per line
    pub bet_per_line: u64,
    /// Active payline count
    pub active_paylines: usize,
    /// bet_per_line × active_paylines
    pub wager: u64,
    /// Sum of line payouts
    pub total_payout: u64,
    /// total_payout − wager
    pub net_change: i64,
    /// Player balance once the spin settled
    pub balance_after: u64,
}

impl SpinResult {
    /// Did this spin pay anything?
    pub fn is_win(&self) -> bool {
        self.total_payout > 0
    }

    /// Lines that paid
    pub fn winning_lines(&self) -> impl Iterator<Item = &LineResult> {
        self.line_results.iter().filter(|l| l.is_win())
    }

    /// Payout divided by wager
    pub fn win_ratio(&self) -> f64 {
        if self.wager > 0 {
            self.total_payout as f64 / self.wager as f64
        } else {
            0.0
        }
    }

    /// Is the payout at least `big_win_ratio` times the wager?
    pub fn is_big_win(&self, big_win_ratio: f64) -> bool {
        self.is_win() && self.total_payout as f64 >= self.wager as f64 * big_win_ratio
    }

    /// Stage events for this spin, in playback order
    ///
    /// `spin-started`, one `reel-stopped` per reel, then exactly one outcome:
    /// `big-win`, `win` or `lose`.
    pub fn stages(&self, big_win_ratio: f64) -> Vec<Stage> {
        let mut stages = Vec::with_capacity(self.grid.reel_count() + 2);

        stages.push(Stage::SpinStarted { wager: self.wager });

        for (reel_index, symbols) in self.grid.reels().iter().enumerate() {
            stages.push(Stage::ReelStopped {
                reel_index: reel_index as u8,
                symbols: symbols.clone(),
            });
        }

        if self.is_big_win(big_win_ratio) {
            stages.push(Stage::BigWin {
                amount: self.total_payout,
                ratio: self.win_ratio(),
            });
        } else if self.is_win() {
            stages.push(Stage::Win {
                amount: self.total_payout,
                line_count: self.winning_lines().count().min(u8::MAX as usize) as u8,
            });
        } else {
            stages.push(Stage::Lose);
        }

        stages
    }
}
