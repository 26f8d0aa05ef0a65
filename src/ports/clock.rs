//! Clock Port - Injected Wall-Clock Time
//!
//! Every deadline in the engine is evaluated lazily against a `now` that
//! comes through this trait, never from `Utc::now()` inside a call site.
//! Tests drive virtual time by swapping the implementation.

use chrono::{DateTime, Utc};

/// Source of the current instant.
pub trait Clock: Send + Sync + 'static {
  /// The current UTC time.
  fn now(&self) -> DateTime<Utc>;
}
