//! Ledger Port - External Fungible-Balance Store Interface
//!
//! The creator token that bets are denominated in lives outside this
//! engine. This trait is the narrow consumed interface: balances,
//! allowances, and the two transfer directions (pull stake into a
//! market's escrow, pay claims back out of it). Implementations must
//! re-verify balance and allowance inside `transfer_from`: the desk's
//! preflight checks are advisory, the transfer is authoritative.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::market::{AccountId, AssetId};
use crate::domain::EngineError;

/// Failures surfaced by the external ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
  /// The source account's balance does not cover the transfer.
  #[error("insufficient balance")]
  InsufficientBalance,

  /// The owner has not approved a large enough allowance for the spender.
  #[error("insufficient allowance")]
  InsufficientAllowance,

  /// The asset is not known to the ledger.
  #[error("unknown asset {0}")]
  UnknownAsset(AssetId),

  /// Any other rejection, with the ledger's own message.
  #[error("transfer rejected: {0}")]
  Rejected(String),
}

impl From<LedgerError> for EngineError {
  fn from(err: LedgerError) -> Self {
    match err {
      LedgerError::InsufficientBalance => Self::InsufficientBalance,
      LedgerError::InsufficientAllowance => Self::InsufficientAllowance,
      other => Self::LedgerRejected(other.to_string()),
    }
  }
}

/// Trait for the external fungible-balance store.
///
/// One implementation per deployment: the production token service, or
/// [`crate::adapters::ledger::InMemoryLedger`] for tests and local runs.
#[async_trait]
pub trait LedgerAdapter: Send + Sync + 'static {
  /// Current balance of `account` in `asset`.
  async fn balance_of(
    &self,
    asset: &AssetId,
    account: &AccountId,
  ) -> Result<Decimal, LedgerError>;

  /// Remaining transfer allowance `owner` has granted to `spender`.
  async fn allowance(
    &self,
    asset: &AssetId,
    owner: &AccountId,
    spender: &AccountId,
  ) -> Result<Decimal, LedgerError>;

  /// Pull `amount` from `from` into `to` under `from`'s allowance to `to`.
  /// Used to move stake into market escrow.
  async fn transfer_from(
    &self,
    asset: &AssetId,
    from: &AccountId,
    to: &AccountId,
    amount: Decimal,
  ) -> Result<(), LedgerError>;

  /// Move `amount` from `from` to `to` on `from`'s own authority.
  /// Used to pay claims and refunds out of market escrow.
  async fn transfer(
    &self,
    asset: &AssetId,
    from: &AccountId,
    to: &AccountId,
    amount: Decimal,
  ) -> Result<(), LedgerError>;

  /// Decimal precision of `asset`. Payout rounding floors to this scale.
  async fn decimals(&self, asset: &AssetId) -> Result<u32, LedgerError>;
}
