//! Stage: the named moments of a spin
//!
//! A Stage is NOT an animation and NOT a sound file.
//! It is the semantic meaning of a moment in the spin flow.

use serde::{Deserialize, Serialize};

/// Canonical spin stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    /// Wager taken, reels set in motion
    SpinStarted {
        /// Total credits wagered on this spin
        wager: u64,
    },

    /// A reel came to rest
    ReelStopped {
        /// Which reel (0-indexed, left to right)
        reel_index: u8,
        /// Symbol ids on this reel, top to bottom
        #[serde(default)]
        symbols: Vec<u32>,
    },

    /// Spin paid something
    Win {
        /// Total payout
        amount: u64,
        /// Number of paying lines
        line_count: u8,
    },

    /// Spin paid at or above the big-win ratio
    BigWin {
        /// Total payout
        amount: u64,
        /// Payout divided by wager
        ratio: f64,
    },

    /// Spin paid nothing
    Lose,
}

impl Stage {
    /// Stable event name used by sound gateways
    pub fn event_name(&self) -> &'static str {
        match self {
            Stage::SpinStarted { .. } => "spin-started",
            Stage::ReelStopped { .. } => "reel-stopped",
            Stage::Win { .. } => "win",
            Stage::BigWin { .. } => "big-win",
            Stage::Lose => "lose",
        }
    }

    /// Is this one of the outcome stages (win, big win, lose)?
    pub fn is_outcome(&self) -> bool {
        matches!(self, Stage::Win { .. } | Stage::BigWin { .. } | Stage::Lose)
    }

    /// Does this stage celebrate a payout?
    pub fn is_win(&self) -> bool {
        matches!(self, Stage::Win { .. } | Stage::BigWin { .. })
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::SpinStarted { wager } => write!(f, "spin-started (wager {wager})"),
            Stage::ReelStopped { reel_index, .. } => write!(f, "reel-stopped #{reel_index}"),
            Stage::Win { amount, line_count } => {
                write!(f, "win {amount} on {line_count} line(s)")
            }
            Stage::BigWin { amount, ratio } => write!(f, "big-win {amount} ({ratio:.1}x)"),
            Stage::Lose => f.write_str("lose"),
        }
    }
}
