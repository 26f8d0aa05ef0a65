//! Dispute Desk - Fraud Reports During the Challenge Window
//!
//! Counts reports against a declared outcome while the market sits in
//! Cooldown. One report per account; reaching the configured threshold
//! escalates the market to UnderReview on the spot, closing the window
//! early. A report that arrives after the window has effectively
//! elapsed fails with `WindowClosed` even when no other caller has
//! triggered the auto-confirm yet.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::SettlementParams;
use crate::domain::lifecycle;
use crate::domain::market::{AccountId, MarketId, StatusKind};
use crate::domain::EngineError;
use crate::ports::clock::Clock;
use crate::ports::repository::EventKind;

use super::audit::{run_due_transition, AuditLog};
use super::book::MarketBook;

/// Dispute tracking desk over the shared book.
pub struct DisputeDesk {
  book: Arc<MarketBook>,
  clock: Arc<dyn Clock>,
  audit: AuditLog,
  params: SettlementParams,
}

impl DisputeDesk {
  /// Create a new dispute desk.
  pub fn new(
    book: Arc<MarketBook>,
    clock: Arc<dyn Clock>,
    audit: AuditLog,
    params: SettlementParams,
  ) -> Self {
    Self {
      book,
      clock,
      audit,
      params,
    }
  }

  /// File a fraud report against the declared outcome.
  ///
  /// Returns the report count after this report. Reporters are not
  /// required to hold a stake in the market.
  pub async fn report_fraud(
    &self,
    market_id: MarketId,
    reporter: &AccountId,
  ) -> Result<u32, EngineError> {
    let entry = self.book.entry(market_id).await?;
    let mut entry = entry.lock().await;
    let now = self.clock.now();
    run_due_transition(&mut entry.market, now, &self.params, &self.audit).await;

    let count = lifecycle::record_report(
      &mut entry.market,
      reporter,
      now,
      self.params.dispute_threshold,
    )?;

    info!(
      market_id,
      reporter = %reporter,
      report_count = count,
      threshold = self.params.dispute_threshold,
      "Fraud report filed"
    );
    self
      .audit
      .emit(
        market_id,
        now,
        EventKind::FraudReported {
          reporter: reporter.clone(),
          report_count: count,
        },
      )
      .await;

    if entry.market.status_kind() == StatusKind::UnderReview {
      warn!(
        market_id,
        report_count = count,
        "Report threshold reached, market escalated to review"
      );
      self
        .audit
        .emit(
          market_id,
          now,
          EventKind::StatusChanged {
            from: StatusKind::Cooldown,
            to: StatusKind::UnderReview,
          },
        )
        .await;
    }

    Ok(count)
  }
}
