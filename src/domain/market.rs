//! Core settlement domain types.
//!
//! Defines the entities the engine settles over: markets, their options,
//! and the per-bettor stakes recorded against them. Status is a sum type
//! that carries each phase's fields inside the matching variant, so a
//! winning option or cooldown deadline cannot exist outside the phase
//! that defines it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::EngineError;

// ────────────────────────────────────────────
// Identifier aliases shared with ports
// ────────────────────────────────────────────

/// Account identity on the external ledger (bettors, creators, escrow).
pub type AccountId = String;

/// External fungible asset a market's stakes are denominated in.
pub type AssetId = String;

/// Monotonically assigned market identifier.
pub type MarketId = u64;

/// Minimum number of options a market may carry.
pub const MIN_OPTIONS: usize = 2;

/// Maximum number of options a market may carry.
pub const MAX_OPTIONS: usize = 10;

// ────────────────────────────────────────────
// Status
// ────────────────────────────────────────────

/// Lifecycle phase of a market, with the fields that only exist in that
/// phase stored inside the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketStatus {
    /// Accepting bets.
    Active,
    /// Betting window ended; awaiting the creator's outcome declaration.
    Closed,
    /// Outcome declared; challenge window open until `ends_at`.
    Cooldown {
        /// Index of the declared winning option.
        winning_option: usize,
        /// When the challenge window elapses. Set once, never moved back.
        ends_at: DateTime<Utc>,
        /// Accounts that reported the outcome as fraudulent, in order.
        reporters: Vec<AccountId>,
    },
    /// Report threshold reached; awaiting an arbitration verdict.
    UnderReview {
        /// Index of the declared winning option.
        winning_option: usize,
        /// Reports accumulated before escalation.
        report_count: u32,
    },
    /// Outcome final; winners may claim. Terminal.
    Confirmed {
        /// Index of the winning option.
        winning_option: usize,
        /// When the outcome became final.
        resolved_at: DateTime<Utc>,
    },
    /// Arbitration overturned the declared outcome. Terminal; stakes refunded.
    Disputed {
        /// The overturned declaration, kept for the record.
        winning_option: usize,
    },
    /// Administrative cancellation. Terminal; stakes refunded.
    Cancelled,
}

impl MarketStatus {
    /// The data-free tag for this status, used in errors and filters.
    pub fn kind(&self) -> StatusKind {
        match self {
            Self::Active => StatusKind::Active,
            Self::Closed => StatusKind::Closed,
            Self::Cooldown { .. } => StatusKind::Cooldown,
            Self::UnderReview { .. } => StatusKind::UnderReview,
            Self::Confirmed { .. } => StatusKind::Confirmed,
            Self::Disputed { .. } => StatusKind::Disputed,
            Self::Cancelled => StatusKind::Cancelled,
        }
    }

    /// The declared winning option, available from Cooldown onward.
    pub fn winning_option(&self) -> Option<usize> {
        match self {
            Self::Cooldown { winning_option, .. }
            | Self::UnderReview { winning_option, .. }
            | Self::Confirmed { winning_option, .. }
            | Self::Disputed { winning_option } => Some(*winning_option),
            _ => None,
        }
    }

    /// Whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Confirmed { .. } | Self::Disputed { .. } | Self::Cancelled
        )
    }
}

/// Field-free status tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    Active,
    Closed,
    Cooldown,
    UnderReview,
    Confirmed,
    Disputed,
    Cancelled,
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Closed => write!(f, "closed"),
            Self::Cooldown => write!(f, "cooldown"),
            Self::UnderReview => write!(f, "under-review"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Disputed => write!(f, "disputed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ────────────────────────────────────────────
// Entities
// ────────────────────────────────────────────

/// One outcome a market offers. Fixed at creation; only totals mutate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketOption {
    /// Display text for the outcome.
    pub description: String,
    /// Sum of all stakes placed on this option.
    pub total_amount: Decimal,
    /// Count of distinct bettors holding a stake on this option.
    pub total_bettors: u32,
}

impl MarketOption {
    fn new(description: String) -> Self {
        Self {
            description,
            total_amount: Decimal::ZERO,
            total_bettors: 0,
        }
    }
}

/// A bettor's accumulated stake on one option of one market.
///
/// Repeat stakes on the same option merge into this single record.
/// `amount` is immutable once the betting window ends; `claimed` latches
/// true when the stake is paid out (as winnings or as a refund).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    /// Account that placed the stake.
    pub bettor: AccountId,
    /// Option the stake rides on.
    pub option_index: usize,
    /// Accumulated stake amount.
    pub amount: Decimal,
    /// Whether this stake has been paid out.
    pub claimed: bool,
}

/// A prediction market and its settlement bookkeeping.
///
/// Created once; afterwards only `status`, per-option totals and
/// `total_pool` change. Markets are permanent ledger history; nothing
/// is ever deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Unique monotonic id.
    pub id: MarketId,
    /// Account that created the market. Never changes.
    pub creator: AccountId,
    /// External ledger asset bets are denominated in. Fixed at creation.
    pub stake_asset: AssetId,
    /// Immutable title text.
    pub title: String,
    /// Immutable description text.
    pub description: String,
    /// Ordered outcome list, 2–10 entries, fixed at creation.
    pub options: Vec<MarketOption>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Betting deadline; `None` means no time limit.
    pub closes_at: Option<DateTime<Utc>>,
    /// Current lifecycle phase.
    pub status: MarketStatus,
    /// Sum of all stakes across all options.
    pub total_pool: Decimal,
}

impl Market {
    /// Build a new Active market, validating the option count.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: MarketId,
        creator: AccountId,
        stake_asset: AssetId,
        title: String,
        description: String,
        option_descriptions: Vec<String>,
        closes_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        let count = option_descriptions.len();
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&count) {
            return Err(EngineError::InvalidOptionCount(count));
        }

        Ok(Self {
            id,
            creator,
            stake_asset,
            title,
            description,
            options: option_descriptions.into_iter().map(MarketOption::new).collect(),
            created_at,
            closes_at,
            status: MarketStatus::Active,
            total_pool: Decimal::ZERO,
        })
    }

    /// Ledger account that custodies this market's staked funds.
    pub fn escrow_account(&self) -> AccountId {
        format!("escrow:market:{}", self.id)
    }

    /// Field-free tag of the current status.
    pub fn status_kind(&self) -> StatusKind {
        self.status.kind()
    }

    /// Look up an option by index.
    pub fn option(&self, index: usize) -> Result<&MarketOption, EngineError> {
        self.options.get(index).ok_or(EngineError::OptionOutOfRange {
            index,
            count: self.options.len(),
        })
    }

    /// Check the pool invariant: `total_pool` equals the sum of the
    /// per-option totals. A `false` here is a programming defect, not a
    /// caller error.
    pub fn pool_balanced(&self) -> bool {
        let sum: Decimal = self.options.iter().map(|o| o.total_amount).sum();
        sum == self.total_pool
    }
}
