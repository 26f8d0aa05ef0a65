//! Persistence Adapters - Audit-Trail Storage
//!
//! JSONL-based implementation of the `EventRepository` port. The
//! in-memory market book stays authoritative at runtime; this layer is
//! the durable record behind it.

pub mod events;

pub use events::EventLog;
