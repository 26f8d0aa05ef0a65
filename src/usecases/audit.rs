//! Audit Plumbing - Event Emission Shared by the Desks
//!
//! Wraps the optional `EventRepository` and metrics observers behind one
//! best-effort `emit`: a failed append degrades the audit trail and is
//! logged, but never fails the settlement operation that produced the
//! event. Also hosts the lazy-expiry helper every mutating entry point
//! runs before its own logic.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::SettlementParams;
use crate::domain::lifecycle;
use crate::domain::market::{Market, MarketId, StatusKind};
use crate::ports::repository::{EventKind, EventObserver, EventRepository, SettlementEvent};

/// Best-effort audit fan-out: persistence plus metrics observers.
#[derive(Clone, Default)]
pub struct AuditLog {
  repo: Option<Arc<dyn EventRepository>>,
  observers: Vec<Arc<dyn EventObserver>>,
}

impl AuditLog {
  /// Audit trail that records nothing (unit tests, ephemeral runs).
  pub fn disabled() -> Self {
    Self::default()
  }

  /// Audit trail backed by a repository.
  pub fn new(repo: Arc<dyn EventRepository>) -> Self {
    Self {
      repo: Some(repo),
      observers: Vec::new(),
    }
  }

  /// Attach a metrics observer.
  #[must_use]
  pub fn with_observer(mut self, observer: Arc<dyn EventObserver>) -> Self {
    self.observers.push(observer);
    self
  }

  /// Record one settlement effect.
  pub async fn emit(&self, market_id: MarketId, at: DateTime<Utc>, kind: EventKind) {
    let event = SettlementEvent::new(market_id, at, kind);
    for observer in &self.observers {
      observer.observe(&event);
    }
    if let Some(repo) = &self.repo {
      if let Err(e) = repo.append(&event).await {
        warn!(
          market_id = event.market_id,
          event_id = %event.id,
          error = %e,
          "Failed to append audit event"
        );
      }
    }
  }
}

/// Apply the deadline-driven transition due at `now`, if any, and record
/// it. Every mutating desk entry point calls this first, while holding
/// the market's lock, so racing callers see at most one application.
pub(crate) async fn run_due_transition(
  market: &mut Market,
  now: DateTime<Utc>,
  params: &SettlementParams,
  audit: &AuditLog,
) -> Option<(StatusKind, StatusKind)> {
  let changed = lifecycle::apply_due(market, now, params.dispute_threshold)?;
  let (from, to) = changed;
  info!(
    market_id = market.id,
    from = %from,
    to = %to,
    "Deadline transition applied"
  );
  audit
    .emit(market.id, now, EventKind::StatusChanged { from, to })
    .await;
  Some(changed)
}
