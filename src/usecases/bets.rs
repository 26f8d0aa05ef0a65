//! Bet Desk - Stake Placement Against Active Markets
//!
//! The primary contended write path. Placement runs entirely under the
//! market's lock: lazy-expiry check, status and option validation,
//! ledger pull into escrow, then the pool bookkeeping. Two bettors
//! racing on the same market serialize and both land in the totals.
//! A ledger rejection aborts before any bookkeeping mutates.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::config::SettlementParams;
use crate::domain::market::{AccountId, Bet, MarketId, MarketStatus};
use crate::domain::EngineError;
use crate::ports::clock::Clock;
use crate::ports::ledger::LedgerAdapter;
use crate::ports::repository::EventKind;

use super::audit::{run_due_transition, AuditLog};
use super::book::MarketBook;

/// Bet placement desk over the shared book and the external ledger.
pub struct BetDesk<L: LedgerAdapter> {
  book: Arc<MarketBook>,
  ledger: Arc<L>,
  clock: Arc<dyn Clock>,
  audit: AuditLog,
  params: SettlementParams,
}

impl<L: LedgerAdapter> BetDesk<L> {
  /// Create a new bet desk.
  pub fn new(
    book: Arc<MarketBook>,
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
    audit: AuditLog,
    params: SettlementParams,
  ) -> Self {
    Self {
      book,
      ledger,
      clock,
      audit,
      params,
    }
  }

  /// Place (or top up) a stake on one option of an Active market.
  ///
  /// Returns the bettor's merged bet record for that option. Fails with
  /// `MarketClosed` when the betting window has ended, including the
  /// case where this very call is what lazily applies the time-based
  /// close, and `MarketInactive` once the market is cancelled.
  pub async fn place_bet(
    &self,
    market_id: MarketId,
    bettor: &AccountId,
    option_index: usize,
    amount: Decimal,
  ) -> Result<Bet, EngineError> {
    if amount <= Decimal::ZERO {
      return Err(EngineError::InvalidAmount);
    }

    let entry = self.book.entry(market_id).await?;
    let mut entry = entry.lock().await;
    let now = self.clock.now();

    run_due_transition(&mut entry.market, now, &self.params, &self.audit).await;

    match entry.market.status {
      MarketStatus::Active => {}
      MarketStatus::Cancelled => return Err(EngineError::MarketInactive),
      _ => return Err(EngineError::MarketClosed),
    }
    entry.market.option(option_index)?;

    let asset = entry.market.stake_asset.clone();
    let escrow = entry.market.escrow_account();

    // Preflight, then the authoritative pull into escrow. Nothing in the
    // book mutates until the ledger has accepted the transfer.
    let allowance = self.ledger.allowance(&asset, bettor, &escrow).await?;
    if allowance < amount {
      return Err(EngineError::InsufficientAllowance);
    }
    let balance = self.ledger.balance_of(&asset, bettor).await?;
    if balance < amount {
      return Err(EngineError::InsufficientBalance);
    }
    self
      .ledger
      .transfer_from(&asset, bettor, &escrow, amount)
      .await?;

    let option = &mut entry.market.options[option_index];
    option.total_amount += amount;
    entry.market.total_pool += amount;

    let bet = entry
      .bets
      .entry((bettor.clone(), option_index))
      .and_modify(|bet| bet.amount += amount)
      .or_insert_with(|| Bet {
        bettor: bettor.clone(),
        option_index,
        amount,
        claimed: false,
      });
    let merged_amount = bet.amount;
    if merged_amount == amount {
      // First stake by this bettor on this option.
      entry.market.options[option_index].total_bettors += 1;
    }
    debug_assert!(entry.market.pool_balanced());

    info!(
      market_id,
      bettor = %bettor,
      option_index,
      amount = %amount,
      total_pool = %entry.market.total_pool,
      "Bet placed"
    );
    self
      .audit
      .emit(
        market_id,
        now,
        EventKind::BetPlaced {
          bettor: bettor.clone(),
          asset,
          option_index,
          amount,
        },
      )
      .await;

    Ok(entry.bets[&(bettor.clone(), option_index)].clone())
  }

  /// All of a bettor's bets on one market, in option order.
  pub async fn user_bets(
    &self,
    market_id: MarketId,
    bettor: &AccountId,
  ) -> Result<Vec<Bet>, EngineError> {
    let entry = self.book.entry(market_id).await?;
    let guard = entry.lock().await;
    Ok(guard.user_bets(bettor))
  }
}
