//! Claim Desk - Winner Payouts From Confirmed Markets
//!
//! Computes each winner's share of the pool and pays it out of market
//! escrow. Claiming is claim-then-credit in one atomic step under the
//! market's lock: the bet's `claimed` flag latches before the ledger
//! credit and rolls back if the credit is rejected, so a bettor is
//! never marked paid without the funds moving, and never paid twice.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::config::SettlementParams;
use crate::domain::market::{AccountId, MarketId, MarketStatus};
use crate::domain::{payout, EngineError};
use crate::ports::clock::Clock;
use crate::ports::ledger::LedgerAdapter;
use crate::ports::repository::EventKind;

use super::audit::{run_due_transition, AuditLog};
use super::book::MarketBook;

/// Payout desk over the shared book and the external ledger.
pub struct ClaimDesk<L: LedgerAdapter> {
  book: Arc<MarketBook>,
  ledger: Arc<L>,
  clock: Arc<dyn Clock>,
  audit: AuditLog,
  params: SettlementParams,
}

impl<L: LedgerAdapter> ClaimDesk<L> {
  /// Create a new claim desk.
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

  /// The amount the bettor could claim from this market.
  ///
  /// Applies the lazy-expiry check first, so a claim query against a
  /// Cooldown market whose window has elapsed auto-confirms it and then
  /// answers. Pure math over the recorded stakes; the `claimed` flag is
  /// checked by [`Self::claim_winnings`], not here.
  pub async fn claimable(
    &self,
    market_id: MarketId,
    bettor: &AccountId,
  ) -> Result<Decimal, EngineError> {
    let entry = self.book.entry(market_id).await?;
    let mut entry = entry.lock().await;
    let now = self.clock.now();
    run_due_transition(&mut entry.market, now, &self.params, &self.audit).await;

    let winning_option = match entry.market.status {
      MarketStatus::Confirmed { winning_option, .. } => winning_option,
      MarketStatus::Cancelled => return Err(EngineError::MarketInactive),
      _ => {
        return Err(EngineError::InvalidTransition {
          from: entry.market.status_kind(),
          action: "claim from",
        })
      }
    };

    let winning_stake = entry
      .bet(bettor, winning_option)
      .map(|bet| bet.amount)
      .unwrap_or(Decimal::ZERO);
    let winning_total = entry.market.options[winning_option].total_amount;
    let scale = self.ledger.decimals(&entry.market.stake_asset).await?;

    Ok(payout::claimable(
      winning_stake,
      winning_total,
      entry.market.total_pool,
      scale,
    ))
  }

  /// Pay the bettor's winnings out of market escrow.
  ///
  /// Fails with `NothingToClaim` when the bettor holds no winning stake
  /// and `AlreadyClaimed` after a successful claim.
  pub async fn claim_winnings(
    &self,
    market_id: MarketId,
    bettor: &AccountId,
  ) -> Result<Decimal, EngineError> {
    let entry = self.book.entry(market_id).await?;
    let mut entry = entry.lock().await;
    let now = self.clock.now();
    run_due_transition(&mut entry.market, now, &self.params, &self.audit).await;

    let winning_option = match entry.market.status {
      MarketStatus::Confirmed { winning_option, .. } => winning_option,
      MarketStatus::Cancelled => return Err(EngineError::MarketInactive),
      _ => {
        return Err(EngineError::InvalidTransition {
          from: entry.market.status_kind(),
          action: "claim from",
        })
      }
    };

    let winning_total = entry.market.options[winning_option].total_amount;
    let total_pool = entry.market.total_pool;
    let asset = entry.market.stake_asset.clone();
    let escrow = entry.market.escrow_account();
    let scale = self.ledger.decimals(&asset).await?;

    let Some(bet) = entry.bets.get_mut(&(bettor.clone(), winning_option)) else {
      return Err(EngineError::NothingToClaim);
    };
    if bet.claimed {
      return Err(EngineError::AlreadyClaimed);
    }

    let amount = payout::claimable(bet.amount, winning_total, total_pool, scale);
    if amount <= Decimal::ZERO {
      return Err(EngineError::NothingToClaim);
    }

    // Claim-then-credit: latch first, roll back on a rejected credit.
    bet.claimed = true;
    if let Err(e) = self.ledger.transfer(&asset, &escrow, bettor, amount).await {
      if let Some(bet) = entry.bets.get_mut(&(bettor.clone(), winning_option)) {
        bet.claimed = false;
      }
      return Err(e.into());
    }

    info!(
      market_id,
      bettor = %bettor,
      amount = %amount,
      "Winnings claimed"
    );
    self
      .audit
      .emit(
        market_id,
        now,
        EventKind::WinningsClaimed {
          bettor: bettor.clone(),
          asset,
          amount,
        },
      )
      .await;

    Ok(amount)
  }
}
