//! Staking multiplier and forgone-rewards pool.
//!
//! A position earns its full pro-rata share, but only `multiplier` of it is
//! paid at settlement; the rest is deferred into `payout_amount`. As the
//! position ages the multiplier ramps up and releases the deferred balance.
//! Closing a position forfeits whatever is still deferred into the forgone
//! pool, which long-term holders above a size threshold may claim pro-rata.
//!
//! | age since deposit | multiplier            |
//! |-------------------|-----------------------|
//! | < 7 days          | 0                     |
//! | 7 – 180 days      | 50% → 75% (linear)    |
//! | 180 – 365 days    | 75% → 100% (linear)   |
//! | ≥ 365 days        | 100%                  |

use common::math;
use soroban_sdk::{contracttype, Env};

use crate::rewards::ACC_PRECISION;
use crate::storage::{RewardState, UserRewardState};

pub const MULTIPLIER_PRECISION: i128 = 1_000_000_000_000_000_000;
const HALF: i128 = MULTIPLIER_PRECISION / 2;
const QUARTER: i128 = MULTIPLIER_PRECISION / 4;

const DAY: u64 = 86_400;
pub const RAMP_START: u64 = 7 * DAY;
pub const RAMP_MIDPOINT: u64 = 180 * DAY;
pub const RAMP_END: u64 = 365 * DAY;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MultiplierConfig {
    /// A full-multiplier position must stake strictly more than this to draw
    /// from the forgone pool.
    pub extra_rewards_threshold: i128,
}

/// Result of settling one token for one position.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Settlement {
    /// Total to transfer now: immediate share, released deferral, and extra.
    pub paid: i128,
    pub withheld: i128,
    pub released: i128,
    pub extra: i128,
}

/// Multiplier for a position of `amount` opened at `deposit_timestamp`.
pub fn staking_multiplier(amount: i128, deposit_timestamp: u64, now: u64) -> i128 {
    if amount <= 0 {
        return 0;
    }
    let age = now.saturating_sub(deposit_timestamp);
    if age < RAMP_START {
        0
    } else if age < RAMP_MIDPOINT {
        HALF + ramp(age - RAMP_START, RAMP_MIDPOINT - RAMP_START)
    } else if age < RAMP_END {
        HALF + QUARTER + ramp(age - RAMP_MIDPOINT, RAMP_END - RAMP_MIDPOINT)
    } else {
        MULTIPLIER_PRECISION
    }
}

fn ramp(progress: u64, span: u64) -> i128 {
    QUARTER * i128::from(progress) / i128::from(span)
}

/// Applies `multiplier` to `raw` pending reward and the position's share of
/// the forgone pool (`extra_accrued`), mutating both ledgers.
///
/// A deferred balance is released in proportion to how far the multiplier
/// climbed since the last settlement along the remaining 50%→100% ramp, so it
/// drains exactly when the multiplier reaches 100%.
pub fn settle(
    env: &Env,
    config: &MultiplierConfig,
    pool: &mut RewardState,
    user: &mut UserRewardState,
    raw: i128,
    extra_accrued: i128,
    amount: i128,
    multiplier: i128,
) -> Option<Settlement> {
    let mut settlement = Settlement::default();

    if user.payout_amount > 0 && multiplier >= HALF && multiplier > user.last_multiplier {
        let base = user.last_multiplier.max(HALF);
        let released = if multiplier >= MULTIPLIER_PRECISION {
            user.payout_amount
        } else {
            math::mul_div(
                env,
                user.payout_amount,
                multiplier - base,
                MULTIPLIER_PRECISION - base,
            )?
        };
        user.payout_amount = user.payout_amount.checked_sub(released)?;
        settlement.released = released;
    }

    let immediate = math::mul_div(env, raw, multiplier, MULTIPLIER_PRECISION)?;
    settlement.withheld = raw.checked_sub(immediate)?;
    user.payout_amount = user.payout_amount.checked_add(settlement.withheld)?;
    user.last_multiplier = multiplier;

    if extra_accrued > 0 {
        let eligible =
            multiplier >= MULTIPLIER_PRECISION && amount > config.extra_rewards_threshold;
        if eligible {
            let extra = extra_accrued.min(pool.forgone_pool);
            pool.forgone_pool -= extra;
            settlement.extra = extra;
        } else {
            recirculate(pool, extra_accrued)?;
        }
    }

    settlement.paid = immediate
        .checked_add(settlement.released)?
        .checked_add(settlement.extra)?;
    Some(settlement)
}

/// Moves the position's deferred balance into the forgone pool. Called when a
/// position returns to zero. Returns the forfeited amount.
pub fn forfeit(pool: &mut RewardState, user: &mut UserRewardState) -> Option<i128> {
    let forfeited = user.payout_amount;
    user.payout_amount = 0;
    user.last_multiplier = 0;
    if forfeited > 0 {
        pool.forgone_pool = pool.forgone_pool.checked_add(forfeited)?;
        pool.forgone_pending = pool.forgone_pending.checked_add(forfeited)?;
    }
    Some(forfeited)
}

/// Returns a forgone-pool share nobody will be paid back around the pool, to
/// be spread again on the next fold.
pub fn recirculate(pool: &mut RewardState, share: i128) -> Option<()> {
    if share > 0 {
        pool.forgone_pending = pool.forgone_pending.checked_add(share)?;
    }
    Some(())
}

/// Folds forgone rewards waiting for stakers into `acc_extra_per_share`.
pub fn fold_forgone(env: &Env, pool: &mut RewardState, total_staked: i128) -> Option<()> {
    if total_staked <= 0 || pool.forgone_pending <= 0 {
        return Some(());
    }
    let per_share = math::mul_div(env, pool.forgone_pending, ACC_PRECISION, total_staked)?;
    pool.acc_extra_per_share = pool.acc_extra_per_share.checked_add(per_share)?;
    pool.forgone_pending = 0;
    Some(())
}
