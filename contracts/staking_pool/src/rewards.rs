//! Reward-per-share accumulator arithmetic.
//!
//! The pool keeps one running total per reward token: cumulative reward owed
//! per staked unit since genesis, scaled by [`ACC_PRECISION`]. A position's
//! pending reward is `amount * acc / ACC_PRECISION - reward_debt`, where the
//! debt is the same product taken at the position's last settlement.
//!
//! Every function here leaves state alone and returns `None` on overflow.

use common::math;
use soroban_sdk::Env;

/// Fixed-point scale of the accumulator.
///
/// `amount * acc` is not bounded by the rewards ever released: a position
/// larger than the total staked when `acc` grew multiplies a large `acc`. The
/// product is therefore taken at 256 bits; only the quotient must fit.
pub const ACC_PRECISION: i128 = 1_000_000_000_000;

/// Folds `released` reward units into `acc`, spread over `total_staked`.
///
/// Nothing is folded while the pool is empty: there is no denominator to
/// spread over, and the caller is responsible for re-synchronising its
/// observed balance.
pub fn accrue(env: &Env, acc: i128, released: i128, total_staked: i128) -> Option<i128> {
    if released <= 0 || total_staked <= 0 {
        return Some(acc);
    }
    let per_share = math::mul_div(env, released, ACC_PRECISION, total_staked)?;
    acc.checked_add(per_share)
}

/// `amount * acc / ACC_PRECISION`; the value stored as reward debt.
pub fn accumulated(env: &Env, amount: i128, acc: i128) -> Option<i128> {
    math::mul_div(env, amount, acc, ACC_PRECISION)
}

/// Settlement formula, floored at zero.
pub fn pending(env: &Env, amount: i128, acc: i128, reward_debt: i128) -> Option<i128> {
    Some(math::sub_floor_zero(accumulated(env, amount, acc)?, reward_debt))
}
