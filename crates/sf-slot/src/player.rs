//! Player state

use serde::{Deserialize, Serialize};

/// The live player of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player identifier
    pub id: String,
    /// Credits available
    pub balance: u64,
    /// Bet per line of the last accepted spin
    pub last_bet_per_line: u64,
    /// Active payline count of the last accepted spin
    pub last_active_paylines: usize,
    /// Spins played
    #[serde(default)]
    pub total_spins: u64,
    /// Spins that paid something
    #[serde(default)]
    pub total_wins: u64,
    /// Largest single-spin payout
    #[serde(default)]
    pub biggest_win: u64,
}

impl Player {
    pub fn new(id: impl Into<String>, balance: u64) -> Self {
        Self {
            id: id.into(),
            balance,
            last_bet_per_line: 0,
            last_active_paylines: 0,
            total_spins: 0,
            total_wins: 0,
            biggest_win: 0,
        }
    }

    /// Can the player cover this wager?
    pub fn can_afford(&self, wager: u64) -> bool {
        wager <= self.balance
    }

    /// Share of spins that paid, in percent
    pub fn win_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.total_wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }

    pub(crate) fn record_spin(&mut self, bet_per_line: u64, active_paylines: usize, payout: u64) {
        self.last_bet_per_line = bet_per_line;
        self.last_active_paylines = active_paylines;
        self.total_spins += 1;
        if payout > 0 {
            self.total_wins += 1;
            self.biggest_win = self.biggest_win.max(payout);
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new("player", 0)
    }
}
