//! # sf-stage: SlotForge stage events
//!
//! A spin passes through a handful of named moments. The game core describes them as
//! [`Stage`] values; whatever plays sound subscribes through [`SoundGateway`].
//!
//! ## Philosophy
//!
//! - Spin starts → Reels stop → Win (or loss) announced
//! - The core never waits on audio. Gateways are fire-and-forget.

pub mod gateway;
pub mod stage;

pub use gateway::*;
pub use stage::*;
