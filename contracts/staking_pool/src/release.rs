//! Release gates: how newly observed reward balance reaches the accumulator.
//!
//! * `Immediate` folds every inflow as soon as it is observed.
//! * `Vesting` schedules each inflow into a linear window and folds only the
//!   part vested since the previous update.
//! * `Decay` folds `residual / factor` of the unreleased balance, at most once
//!   per `min_update_delay`.

use common::math;
use soroban_sdk::{contracttype, Env, Vec};

use crate::rewards;
use crate::storage::RewardState;

/// Upper bound on concurrently vesting windows in `Overlap` mode. When full,
/// the oldest window's remainder is merged into the newest one.
pub const MAX_VESTING_WINDOWS: u32 = 8;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VestingMode {
    /// A new inflow restarts vesting over `unvested remainder + inflow`.
    Restart,
    /// A new inflow opens its own window; earlier windows keep vesting.
    Overlap,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingParams {
    /// Seconds for a window to vest fully.
    pub period: u64,
    pub mode: VestingMode,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecayParams {
    /// Divisor applied to the unreleased residual on each eligible update.
    /// `1` releases everything.
    pub factor: u32,
    /// Minimum seconds between two releases; `0` disables the rate limit.
    pub min_update_delay: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReleasePolicy {
    Immediate,
    Vesting(VestingParams),
    Decay(DecayParams),
}

impl ReleasePolicy {
    pub fn is_valid(&self) -> bool {
        match self {
            ReleasePolicy::Immediate => true,
            ReleasePolicy::Vesting(params) => params.period > 0,
            ReleasePolicy::Decay(params) => params.factor >= 1,
        }
    }
}

/// One scheduled inflow.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingWindow {
    pub start: u64,
    pub amount: i128,
    /// Portion already folded into the accumulator.
    pub released: i128,
}

/// Observes `observed_balance` and folds whatever the policy releases at `now`
/// into `state.acc_reward_per_share`. Returns the amount folded.
///
/// While `total_staked == 0` inflow is re-synchronised without being folded or
/// scheduled, and anything vesting in that interval is discarded.
pub fn advance(
    env: &Env,
    policy: &ReleasePolicy,
    state: &mut RewardState,
    observed_balance: i128,
    total_staked: i128,
    now: u64,
) -> Option<i128> {
    let released = match policy {
        ReleasePolicy::Immediate => release_immediate(state, observed_balance),
        ReleasePolicy::Vesting(params) => {
            release_vested(env, params, state, observed_balance, total_staked, now)?
        }
        ReleasePolicy::Decay(params) => {
            release_decayed(params, state, observed_balance, total_staked, now)
        }
    };

    if total_staked <= 0 {
        return Some(0);
    }
    state.acc_reward_per_share =
        rewards::accrue(env, state.acc_reward_per_share, released, total_staked)?;
    Some(released)
}

fn release_immediate(state: &mut RewardState, observed_balance: i128) -> i128 {
    let inflow = math::sub_floor_zero(observed_balance, state.last_reward_balance);
    if inflow > 0 {
        state.last_reward_balance = observed_balance;
    }
    inflow
}

fn release_vested(
    env: &Env,
    params: &VestingParams,
    state: &mut RewardState,
    observed_balance: i128,
    total_staked: i128,
    now: u64,
) -> Option<i128> {
    // Vest existing windows up to `now` before a restart can reshape them.
    let vested = collect_vested(env, state, params.period, now)?;

    let inflow = math::sub_floor_zero(observed_balance, state.last_reward_balance);
    if inflow > 0 {
        state.last_reward_balance = observed_balance;
        if total_staked > 0 {
            schedule(env, state, &params.mode, inflow, now)?;
        }
    }
    state.last_release_time = now;
    Some(vested)
}

fn collect_vested(env: &Env, state: &mut RewardState, period: u64, now: u64) -> Option<i128> {
    let mut total: i128 = 0;
    let mut open = Vec::new(env);
    for window in state.vesting.iter() {
        let elapsed = now.saturating_sub(window.start);
        let vested_to_date = if elapsed >= period {
            window.amount
        } else {
            math::mul_div(env, window.amount, i128::from(elapsed), i128::from(period))?
        };
        let step = math::sub_floor_zero(vested_to_date, window.released);
        total = total.checked_add(step)?;

        let released = window.released.checked_add(step)?;
        if released < window.amount {
            open.push_back(VestingWindow {
                start: window.start,
                amount: window.amount,
                released,
            });
        }
    }
    state.vesting = open;
    Some(total)
}

fn schedule(
    env: &Env,
    state: &mut RewardState,
    mode: &VestingMode,
    inflow: i128,
    now: u64,
) -> Option<()> {
    let mut amount = inflow;
    match mode {
        VestingMode::Restart => {
            amount = amount.checked_add(unvested(state)?)?;
            state.vesting = Vec::new(env);
        }
        VestingMode::Overlap => {
            if state.vesting.len() >= MAX_VESTING_WINDOWS {
                if let Some(oldest) = state.vesting.pop_front() {
                    amount = amount.checked_add(oldest.amount.checked_sub(oldest.released)?)?;
                }
            }
        }
    }
    state.vesting.push_back(VestingWindow {
        start: now,
        amount,
        released: 0,
    });
    Some(())
}

fn release_decayed(
    params: &DecayParams,
    state: &mut RewardState,
    observed_balance: i128,
    total_staked: i128,
    now: u64,
) -> i128 {
    let due = params.min_update_delay == 0
        || state.last_release_time == 0
        || now >= state.last_release_time.saturating_add(params.min_update_delay);
    if !due {
        return 0;
    }

    // The residual is re-diffed against the live balance on every call rather
    // than tracked separately.
    let residual = math::sub_floor_zero(observed_balance, state.last_reward_balance);
    if residual == 0 {
        return 0;
    }
    if total_staked <= 0 {
        state.last_reward_balance = observed_balance;
        state.last_release_time = now;
        return 0;
    }

    let step = if params.factor <= 1 {
        residual
    } else {
        residual / i128::from(params.factor)
    };
    if step == 0 {
        return 0;
    }
    state.last_reward_balance += step;
    state.last_release_time = now;
    step
}

/// Sum of scheduled but not yet released amounts.
pub fn unvested(state: &RewardState) -> Option<i128> {
    let mut total: i128 = 0;
    for window in state.vesting.iter() {
        total = total.checked_add(window.amount.checked_sub(window.released)?)?;
    }
    Some(total)
}

/// Prepares `state` for a policy switch: anything scheduled but unreleased is
/// un-observed so that the next update re-observes it under the new policy.
pub fn reset_gate(env: &Env, state: &mut RewardState) -> Option<()> {
    let pending = unvested(state)?;
    state.last_reward_balance = math::sub_floor_zero(state.last_reward_balance, pending);
    state.vesting = Vec::new(env);
    state.last_release_time = 0;
    Some(())
}
