//! # sf-slot: Slot machine game core
//!
//! Weighted reel generation, payline evaluation with a substituting wild,
//! and the bet/balance state machine that ties them together.
//!
//! ## Features
//!
//! - **Symbol Catalog**: weighted symbols with a payout rank and exactly one wild
//! - **Paytable & Paylines**: 3/4/5-of-a-kind multipliers over fixed line patterns
//! - **Payout Calculator**: pure, left-anchored line evaluation
//! - **Game Engine**: atomic spins that either settle completely or are rejected
//! - **Stage Generation**: sound events derived from each settled spin
//!
//! ## Architecture
//!
//! ```text
//! GameEngine
//!     │
//!     ├── GameConfig (grid, bet limits, big-win ratio)
//!     │     ├── SymbolCatalog (weights, ranks, wild)
//!     │     ├── PayTable (symbol × 3..5 → multiplier)
//!     │     └── PaylineSet (cells per line)
//!     ├── ReelGenerator → Grid
//!     ├── PayoutCalculator → LineResult[]
//!     └── Player (balance, last bet, counters)
//!           │
//!           v
//!     SpinResult → Vec<Stage>
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod paytable;
pub mod player;
pub mod reels;
pub mod spin;
pub mod symbols;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use paytable::*;
pub use player::*;
pub use reels::*;
pub use spin::*;
pub use symbols::*;
