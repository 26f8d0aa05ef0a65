//! Settlement error taxonomy.
//!
//! Every variant here is an expected, recoverable caller error and is
//! returned as a typed `Result`, never logged-and-swallowed, never a
//! panic. Internal invariant violations (pool mismatch) are programming
//! defects and are checked with `debug_assert!` at the mutation sites
//! instead of appearing in this enum.

use thiserror::Error;

use super::market::{MarketId, StatusKind};

/// Errors returned by the settlement engine's public operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// No market exists under the given id.
    #[error("market {0} not found")]
    MarketNotFound(MarketId),

    /// The requested action is not valid in the market's current status.
    #[error("cannot {action} while market is {from}")]
    InvalidTransition {
        /// Status the market was in when the action was attempted.
        from: StatusKind,
        /// Human-readable name of the attempted action.
        action: &'static str,
    },

    /// A creator-only or admin-only action was attempted by someone else.
    #[error("caller is not authorized for this action")]
    Unauthorized,

    /// The option index does not exist on this market.
    #[error("option index {index} out of range (market has {count} options)")]
    OptionOutOfRange { index: usize, count: usize },

    /// Bet placement after the market's betting window ended.
    #[error("market is closed for betting")]
    MarketClosed,

    /// The market was cancelled; no further bets, reports, or claims.
    #[error("market is cancelled")]
    MarketInactive,

    /// Fraud report submitted after the cooldown window elapsed.
    #[error("the dispute window has closed")]
    WindowClosed,

    /// The account already filed a report for this market.
    #[error("account has already reported this market")]
    DuplicateReport,

    /// Stake amount must be strictly positive.
    #[error("stake amount must be greater than zero")]
    InvalidAmount,

    /// Markets carry between 2 and 10 options.
    #[error("invalid option count {0}: a market needs 2 to 10 options")]
    InvalidOptionCount(usize),

    /// The bettor's ledger balance does not cover the stake.
    #[error("insufficient balance on the stake asset")]
    InsufficientBalance,

    /// The bettor has not granted a large enough transfer allowance.
    #[error("insufficient transfer allowance on the stake asset")]
    InsufficientAllowance,

    /// The bettor holds no winning stake (or the computed payout is zero).
    #[error("nothing to claim")]
    NothingToClaim,

    /// The bettor's winnings were already paid out.
    #[error("winnings already claimed")]
    AlreadyClaimed,

    /// Any other ledger-adapter failure, surfaced verbatim.
    #[error("ledger rejected the operation: {0}")]
    LedgerRejected(String),
}
