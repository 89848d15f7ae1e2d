//! sf-state: Balance persistence
//!
//! The only state that outlives a session is the player's balance.
//! Stores load and save that one number; callers decide what a failure means.

mod error;
mod store;

pub use error::*;
pub use store::*;
