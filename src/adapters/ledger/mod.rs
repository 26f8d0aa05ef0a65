//! Ledger Adapters - Implementations of the Ledger Port
//!
//! Production deployments wire the token service client here; the crate
//! ships the in-memory implementation used by tests and local runs.

pub mod memory;

pub use memory::InMemoryLedger;
