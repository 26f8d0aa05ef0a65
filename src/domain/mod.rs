//! Domain layer - Core settlement entities and math.
//!
//! This module contains the pure domain logic for the settlement engine.
//! No external dependencies allowed here (hexagonal architecture inner ring).
//! All types are serializable and testable in isolation; time always
//! enters as a parameter, never read from the ambient clock.

pub mod error;
pub mod lifecycle;
pub mod market;
pub mod payout;

// Re-export core types for convenience
pub use error::EngineError;
pub use lifecycle::ArbitrationVerdict;
pub use market::{
    AccountId, AssetId, Bet, Market, MarketId, MarketOption, MarketStatus,
    StatusKind,
};
