//! Use Cases Layer - Settlement Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! engine's core workflows. One desk per settlement concern, all
//! sharing the market book's per-market single-writer locks.
//!
//! Desks:
//! - `MarketRegistry`: market creation and snapshot reads
//! - `BetDesk`: stake placement against Active markets
//! - `SettlementDesk`: close / declare / auto-confirm / cancel / arbitrate
//! - `DisputeDesk`: fraud reports during the challenge window
//! - `ClaimDesk`: winner payouts from Confirmed markets

pub mod audit;
pub mod bets;
pub mod book;
pub mod claims;
pub mod disputes;
pub mod registry;
pub mod settlement;

pub use audit::AuditLog;
pub use bets::BetDesk;
pub use book::MarketBook;
pub use claims::ClaimDesk;
pub use disputes::DisputeDesk;
pub use registry::{CreateMarket, MarketRegistry, MarketSummary};
pub use settlement::{RefundSummary, SettlementDesk};
