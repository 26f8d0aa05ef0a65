//! Adapters Layer - Concrete Implementations of the Ports
//!
//! Everything that touches the outside world lives here: the in-memory
//! ledger used by tests and local runs, the JSONL audit log, the
//! Prometheus metrics registry, and the system clock.

pub mod clock;
pub mod ledger;
pub mod metrics;
pub mod persistence;
