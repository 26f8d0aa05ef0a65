//! Market status lifecycle.
//!
//! All transitions are pure functions over `(&mut Market, now)` so tests
//! drive virtual time directly. There is no background timer anywhere:
//! deadline-driven transitions are *virtual* and become real the first
//! time any mutating entry point calls [`apply_due`]. Every desk does,
//! under the market's lock, before processing the caller's intent.
//!
//! ```text
//! Active --(close: manual by creator OR now >= closes_at)--> Closed
//! Closed --(creator declares winning option)--> Cooldown
//! Cooldown --(window elapsed, reports below threshold)--> Confirmed*
//! Cooldown --(reports reach threshold)--> UnderReview
//! UnderReview --(arbitration verdict)--> Confirmed* | Disputed* | Cancelled*
//! Active/Closed --(administrative cancel)--> Cancelled*
//! ```

use chrono::{DateTime, Duration, Utc};

use super::error::EngineError;
use super::market::{AccountId, Market, MarketStatus, StatusKind};

/// Arbitration outcome for a market under review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbitrationVerdict {
    /// The declared outcome stands; market confirms and winners claim.
    Uphold,
    /// The declared outcome was wrong; market is disputed, stakes refund.
    Overturn,
    /// The market itself is void; cancelled, stakes refund.
    Void,
}

/// Compute the deadline-driven transition due at `now`, if any.
///
/// Pure and side-effect-free. Returns the status the market should move
/// to, or `None` when nothing is due, including when the transition
/// already happened, which makes repeated application idempotent.
pub fn due_transition(
    market: &Market,
    now: DateTime<Utc>,
    dispute_threshold: u32,
) -> Option<MarketStatus> {
    match &market.status {
        MarketStatus::Active => match market.closes_at {
            Some(deadline) if now >= deadline => Some(MarketStatus::Closed),
            _ => None,
        },
        MarketStatus::Cooldown {
            winning_option,
            ends_at,
            reporters,
        } if now >= *ends_at && (reporters.len() as u32) < dispute_threshold => {
            Some(MarketStatus::Confirmed {
                winning_option: *winning_option,
                resolved_at: now,
            })
        }
        _ => None,
    }
}

/// Apply the due transition, if any, returning `(from, to)` when the
/// status changed. Callers hold the market's lock, so the check-and-set
/// is atomic; losers of a deadline race simply observe `None`.
pub fn apply_due(
    market: &mut Market,
    now: DateTime<Utc>,
    dispute_threshold: u32,
) -> Option<(StatusKind, StatusKind)> {
    let next = due_transition(market, now, dispute_threshold)?;
    let from = market.status_kind();
    let to = next.kind();
    market.status = next;
    Some((from, to))
}

/// Manually end the betting window. Creator-only while the deadline has
/// not passed; the time-based close itself is applied by [`apply_due`].
pub fn close(market: &mut Market, caller: &AccountId) -> Result<(), EngineError> {
    if market.status != MarketStatus::Active {
        return Err(EngineError::InvalidTransition {
            from: market.status_kind(),
            action: "close",
        });
    }
    if *caller != market.creator {
        return Err(EngineError::Unauthorized);
    }
    market.status = MarketStatus::Closed;
    Ok(())
}

/// Declare the winning option and open the challenge window.
///
/// Creator-only, valid only from Closed. Sets `ends_at = now + cooldown`
/// exactly once; nothing ever moves it backward.
pub fn declare_winner(
    market: &mut Market,
    caller: &AccountId,
    option_index: usize,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Result<DateTime<Utc>, EngineError> {
    if market.status != MarketStatus::Closed {
        return Err(EngineError::InvalidTransition {
            from: market.status_kind(),
            action: "declare a winner",
        });
    }
    if *caller != market.creator {
        return Err(EngineError::Unauthorized);
    }
    market.option(option_index)?;

    let ends_at = now + cooldown;
    market.status = MarketStatus::Cooldown {
        winning_option: option_index,
        ends_at,
        reporters: Vec::new(),
    };
    Ok(ends_at)
}

/// Record a fraud report during the challenge window.
///
/// One report per account per market. Reaching `dispute_threshold`
/// escalates to UnderReview immediately, closing the window early.
/// Returns the report count after this report.
pub fn record_report(
    market: &mut Market,
    reporter: &AccountId,
    now: DateTime<Utc>,
    dispute_threshold: u32,
) -> Result<u32, EngineError> {
    let (count, escalate_with) = match &mut market.status {
        MarketStatus::Cooldown {
            winning_option,
            ends_at,
            reporters,
        } => {
            if now >= *ends_at {
                return Err(EngineError::WindowClosed);
            }
            if reporters.contains(reporter) {
                return Err(EngineError::DuplicateReport);
            }
            reporters.push(reporter.clone());
            let count = reporters.len() as u32;
            let escalate = (count >= dispute_threshold).then_some(*winning_option);
            (count, escalate)
        }
        // The window already ended, one way or another.
        MarketStatus::UnderReview { .. }
        | MarketStatus::Confirmed { .. }
        | MarketStatus::Disputed { .. } => return Err(EngineError::WindowClosed),
        MarketStatus::Cancelled => return Err(EngineError::MarketInactive),
        MarketStatus::Active | MarketStatus::Closed => {
            return Err(EngineError::InvalidTransition {
                from: market.status_kind(),
                action: "report fraud on",
            })
        }
    };

    if let Some(winning_option) = escalate_with {
        market.status = MarketStatus::UnderReview {
            winning_option,
            report_count: count,
        };
    }
    Ok(count)
}

/// Administrative cancellation, valid from Active or Closed.
pub fn cancel(market: &mut Market) -> Result<(), EngineError> {
    match market.status {
        MarketStatus::Active | MarketStatus::Closed => {
            market.status = MarketStatus::Cancelled;
            Ok(())
        }
        _ => Err(EngineError::InvalidTransition {
            from: market.status_kind(),
            action: "cancel",
        }),
    }
}

/// Resolve a market under review with an arbitration verdict.
pub fn arbitrate(
    market: &mut Market,
    verdict: ArbitrationVerdict,
    now: DateTime<Utc>,
) -> Result<StatusKind, EngineError> {
    let MarketStatus::UnderReview { winning_option, .. } = market.status else {
        return Err(EngineError::InvalidTransition {
            from: market.status_kind(),
            action: "arbitrate",
        });
    };

    market.status = match verdict {
        ArbitrationVerdict::Uphold => MarketStatus::Confirmed {
            winning_option,
            resolved_at: now,
        },
        ArbitrationVerdict::Overturn => MarketStatus::Disputed { winning_option },
        ArbitrationVerdict::Void => MarketStatus::Cancelled,
    };
    Ok(market.status_kind())
}
