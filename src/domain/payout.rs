//! Winner payout math.
//!
//! A confirmed market pays each winning bettor their own stake back plus
//! a pro-rata share of the combined losing stake, proportional to their
//! share of the winning pool:
//!
//! ```text
//! claimable = b + (b / W) * L
//! ```
//!
//! with `b` the bettor's winning-option stake, `W` the winning option's
//! total and `L = total_pool - W`. The pro-rata share is floored to the
//! stake asset's decimal precision per bettor, so the sum of all payouts
//! never exceeds the pool.

use rust_decimal::{Decimal, RoundingStrategy};

/// Compute one bettor's claimable amount.
///
/// `scale` is the stake asset's decimal precision; the losing-pool share
/// is truncated toward zero at that scale. Returns zero when the bettor
/// holds no winning stake, and guards the `W == 0` division (cannot occur
/// for an option that has bettors, but a winner may be declared on an
/// option nobody staked).
pub fn claimable(
    winning_stake: Decimal,
    winning_total: Decimal,
    total_pool: Decimal,
    scale: u32,
) -> Decimal {
    if winning_stake <= Decimal::ZERO || winning_total <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let losing_pool = total_pool - winning_total;
    let share = (winning_stake * losing_pool / winning_total)
        .round_dp_with_strategy(scale, RoundingStrategy::ToZero);

    winning_stake + share
}
