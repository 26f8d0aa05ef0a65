//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the domain/usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `LedgerAdapter`: the external fungible-balance store stakes live on
//! - `Clock`: injected time (all deadlines are evaluated lazily)
//! - `ProfileDirectory`: presentation metadata, read-only
//! - `EventRepository`: audit-trail persistence (JSONL-based)

pub mod clock;
pub mod ledger;
pub mod profiles;
pub mod repository;
