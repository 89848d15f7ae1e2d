//! Error types for the game core

use thiserror::Error;

/// Game core error type
#[derive(Error, Debug)]
pub enum SlotError {
    /// Malformed catalog, paytable, paylines or limits. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Bet per line is zero or outside the configured range
    #[error("Invalid bet: {bet} (allowed {min}..={max})")]
    InvalidBet { bet: u64, min: u64, max: u64 },

    /// Active payline count outside 1..=max
    #[error("Invalid payline count: {count} (allowed 1..={max})")]
    InvalidPaylineCount { count: usize, max: usize },

    /// Wager exceeds the player's balance
    #[error("Insufficient balance: wager {wager} exceeds balance {balance}")]
    InsufficientBalance { wager: u64, balance: u64 },

    /// A payline points outside the grid
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl SlotError {
    /// Rejections of a single spin request; the session can continue
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SlotError::InvalidBet { .. }
                | SlotError::InvalidPaylineCount { .. }
                | SlotError::InsufficientBalance { .. }
        )
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SlotError::Configuration(msg.into())
    }
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
