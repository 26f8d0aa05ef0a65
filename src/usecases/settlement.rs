//! Settlement Desk - Market Status Lifecycle Orchestration
//!
//! Drives markets through close, outcome declaration, the challenge
//! window, auto-confirmation, administrative cancellation, and
//! arbitration of reviews. Every entry point runs the lazy-expiry check
//! first, under the market's lock, so deadline-driven transitions apply
//! exactly once no matter how many callers race for them.
//!
//! Refund policy: a Cancelled or Disputed market refunds every bet in
//! full. Each refunded bet latches `claimed` before its escrow transfer;
//! a ledger failure rolls that one latch back and aborts, and re-running
//! the refund pass picks up only the unpaid remainder.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::SettlementParams;
use crate::domain::lifecycle::{self, ArbitrationVerdict};
use crate::domain::market::{AccountId, MarketId, MarketStatus, StatusKind};
use crate::domain::EngineError;
use crate::ports::clock::Clock;
use crate::ports::ledger::LedgerAdapter;
use crate::ports::repository::EventKind;

use super::audit::{run_due_transition, AuditLog};
use super::book::{MarketBook, MarketEntry};

/// Summary of a refund pass over a cancelled or disputed market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundSummary {
  /// Bets refunded by this pass.
  pub bets_refunded: usize,
  /// Total amount returned to bettors by this pass.
  pub amount_refunded: Decimal,
}

/// Settlement desk over the shared book and the external ledger.
pub struct SettlementDesk<L: LedgerAdapter> {
  book: Arc<MarketBook>,
  ledger: Arc<L>,
  clock: Arc<dyn Clock>,
  audit: AuditLog,
  params: SettlementParams,
  admin: AccountId,
}

impl<L: LedgerAdapter> SettlementDesk<L> {
  /// Create a new settlement desk. `admin` is the only account allowed
  /// to cancel markets and arbitrate reviews.
  pub fn new(
    book: Arc<MarketBook>,
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
    audit: AuditLog,
    params: SettlementParams,
    admin: AccountId,
  ) -> Self {
    Self {
      book,
      ledger,
      clock,
      audit,
      params,
      admin,
    }
  }

  /// Manually end the betting window. Creator-only.
  pub async fn close_market(
    &self,
    market_id: MarketId,
    caller: &AccountId,
  ) -> Result<(), EngineError> {
    let entry = self.book.entry(market_id).await?;
    let mut entry = entry.lock().await;
    let now = self.clock.now();
    run_due_transition(&mut entry.market, now, &self.params, &self.audit).await;

    lifecycle::close(&mut entry.market, caller)?;
    info!(market_id, caller = %caller, "Market closed manually");
    self
      .audit
      .emit(
        market_id,
        now,
        EventKind::StatusChanged { from: StatusKind::Active, to: StatusKind::Closed },
      )
      .await;
    Ok(())
  }

  /// Declare the winning option and open the challenge window.
  /// Creator-only, valid only from Closed. Returns when the window ends.
  pub async fn declare_winner(
    &self,
    market_id: MarketId,
    caller: &AccountId,
    option_index: usize,
  ) -> Result<DateTime<Utc>, EngineError> {
    let entry = self.book.entry(market_id).await?;
    let mut entry = entry.lock().await;
    let now = self.clock.now();
    run_due_transition(&mut entry.market, now, &self.params, &self.audit).await;

    let ends_at = lifecycle::declare_winner(
      &mut entry.market,
      caller,
      option_index,
      now,
      self.params.cooldown,
    )?;
    info!(
      market_id,
      winning_option = option_index,
      cooldown_ends_at = %ends_at,
      "Winner declared, challenge window open"
    );
    self
      .audit
      .emit(
        market_id,
        now,
        EventKind::StatusChanged { from: StatusKind::Closed, to: StatusKind::Cooldown },
      )
      .await;
    Ok(ends_at)
  }

  /// Apply any deadline-driven transition that is due, and report the
  /// resulting status. Idempotent; callable by anyone.
  pub async fn settle_if_due(&self, market_id: MarketId) -> Result<StatusKind, EngineError> {
    let entry = self.book.entry(market_id).await?;
    let mut entry = entry.lock().await;
    let now = self.clock.now();
    run_due_transition(&mut entry.market, now, &self.params, &self.audit).await;
    Ok(entry.market.status_kind())
  }

  /// Administrative cancellation with full refunds. Admin-only.
  ///
  /// Valid from Active or Closed. Re-invoking on an already-Cancelled
  /// market does not fail: it re-runs the refund pass, which pays only
  /// bets a previous pass could not settle with the ledger.
  pub async fn cancel_market(
    &self,
    market_id: MarketId,
    caller: &AccountId,
  ) -> Result<RefundSummary, EngineError> {
    if *caller != self.admin {
      return Err(EngineError::Unauthorized);
    }

    let entry = self.book.entry(market_id).await?;
    let mut entry = entry.lock().await;
    let now = self.clock.now();
    run_due_transition(&mut entry.market, now, &self.params, &self.audit).await;

    if entry.market.status != MarketStatus::Cancelled {
      let from = entry.market.status_kind();
      lifecycle::cancel(&mut entry.market)?;
      info!(market_id, from = %from, "Market cancelled administratively");
      self
        .audit
        .emit(
          market_id,
          now,
          EventKind::StatusChanged { from, to: StatusKind::Cancelled },
        )
        .await;
    }

    self.refund_all(market_id, &mut entry, now).await
  }

  /// Resolve a market under review with an arbitration verdict.
  /// Admin-only. Overturn and Void refund all stakes.
  pub async fn arbitrate(
    &self,
    market_id: MarketId,
    caller: &AccountId,
    verdict: ArbitrationVerdict,
  ) -> Result<StatusKind, EngineError> {
    if *caller != self.admin {
      return Err(EngineError::Unauthorized);
    }

    let entry = self.book.entry(market_id).await?;
    let mut entry = entry.lock().await;
    let now = self.clock.now();
    run_due_transition(&mut entry.market, now, &self.params, &self.audit).await;

    let from = entry.market.status_kind();
    let to = lifecycle::arbitrate(&mut entry.market, verdict, now)?;
    info!(market_id, verdict = ?verdict, outcome = %to, "Arbitration verdict applied");
    self
      .audit
      .emit(market_id, now, EventKind::StatusChanged { from, to })
      .await;

    if matches!(to, StatusKind::Disputed | StatusKind::Cancelled) {
      let summary = self.refund_all(market_id, &mut entry, now).await?;
      info!(
        market_id,
        bets_refunded = summary.bets_refunded,
        amount_refunded = %summary.amount_refunded,
        "Stakes refunded after arbitration"
      );
    }

    Ok(to)
  }

  /// Refund every unpaid bet out of escrow.
  async fn refund_all(
    &self,
    market_id: MarketId,
    entry: &mut MarketEntry,
    now: DateTime<Utc>,
  ) -> Result<RefundSummary, EngineError> {
    let asset = entry.market.stake_asset.clone();
    let escrow = entry.market.escrow_account();

    let mut summary = RefundSummary {
      bets_refunded: 0,
      amount_refunded: Decimal::ZERO,
    };

    for bet in entry.bets.values_mut() {
      if bet.claimed || bet.amount <= Decimal::ZERO {
        continue;
      }

      // Latch before the transfer; roll back if the ledger rejects it
      // so a retry pass still sees the bet as unpaid.
      bet.claimed = true;
      if let Err(e) = self
        .ledger
        .transfer(&asset, &escrow, &bet.bettor, bet.amount)
        .await
      {
        bet.claimed = false;
        warn!(
          market_id,
          bettor = %bet.bettor,
          amount = %bet.amount,
          error = %e,
          "Refund transfer rejected, aborting pass"
        );
        return Err(e.into());
      }

      summary.bets_refunded += 1;
      summary.amount_refunded += bet.amount;
      self
        .audit
        .emit(
          market_id,
          now,
          EventKind::StakeRefunded {
            bettor: bet.bettor.clone(),
            asset: asset.clone(),
            amount: bet.amount,
          },
        )
        .await;
    }

    Ok(summary)
  }
}
