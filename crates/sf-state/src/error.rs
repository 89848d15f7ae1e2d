//! Persistence errors

/// Balance store error
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store exists but holds no balance
    #[error("No saved balance")]
    MissingBalance,
}

pub type StateResult<T> = Result<T, StateError>;
