//! Glue between storage, release gates, the accumulator, and the multiplier.
//!
//! Every state-mutating entry point runs the same sequence:
//! [`update_rewards`] → [`settle`] (with the position's amount before and
//! after the change) → write position and total → [`pay_out`].
//! `settle` reads the accumulator once per token, so the pending reward and
//! the new reward debt always come from the same snapshot.

use common::math;
use soroban_sdk::{token, Address, Env, Vec};

use crate::storage::{self, RewardState, UserPosition, UserRewardState};
use crate::{events, multiplier, release, rewards, ContractError};

/// Reward balance attributable to `token`. When a reward token doubles as
/// the staking token, staked principal is excluded.
pub(crate) fn observed_balance(
    env: &Env,
    token: &Address,
    staking_token: &Address,
    total_staked: i128,
) -> i128 {
    let balance = token::Client::new(env, token).balance(&env.current_contract_address());
    if token == staking_token {
        math::sub_floor_zero(balance, total_staked)
    } else {
        balance
    }
}

/// Folds every reward token's unobserved inflow through the active gate.
pub(crate) fn update_rewards(env: &Env) -> Result<(), ContractError> {
    let staking_token = storage::staking_token(env)?;
    let policy = storage::release_policy(env)?;
    let total = storage::total_staked(env);
    let now = env.ledger().timestamp();

    for token in storage::reward_tokens(env).iter() {
        let mut state = storage::reward_state(env, &token);
        let observed = observed_balance(env, &token, &staking_token, total);
        let released = release::advance(env, &policy, &mut state, observed, total, now)
            .ok_or(ContractError::MathOverflow)?;
        multiplier::fold_forgone(env, &mut state, total).ok_or(ContractError::MathOverflow)?;
        storage::set_reward_state(env, &token, &state);

        if released > 0 {
            events::publish_rewards_updated(env, token, released, state.acc_reward_per_share);
        }
    }
    Ok(())
}

/// What `update_rewards` would leave in storage for `token`, without writing.
pub(crate) fn preview_reward_state(env: &Env, token: &Address) -> RewardState {
    let stored = storage::reward_state(env, token);
    if !storage::reward_tokens(env).contains(token) {
        return stored;
    }
    let (Ok(staking_token), Ok(policy)) = (storage::staking_token(env), storage::release_policy(env))
    else {
        return stored;
    };

    let total = storage::total_staked(env);
    let mut state = stored.clone();
    let observed = observed_balance(env, token, &staking_token, total);
    let advanced = release::advance(
        env,
        &policy,
        &mut state,
        observed,
        total,
        env.ledger().timestamp(),
    )
    .and_then(|_| multiplier::fold_forgone(env, &mut state, total));
    match advanced {
        Some(()) => state,
        None => stored,
    }
}

/// Settles `user` against the current accumulators and re-bases their debts
/// to `amount_after`. Returns the `(token, amount)` pairs owed right now.
///
/// Must run after [`update_rewards`] and before the position's amount is
/// written. A position closing to zero forfeits its deferred payout.
pub(crate) fn settle(
    env: &Env,
    user: &Address,
    position: &UserPosition,
    amount_after: i128,
) -> Result<Vec<(Address, i128)>, ContractError> {
    let multiplier_config = storage::multiplier_config(env);
    let now = env.ledger().timestamp();
    let mut payouts = Vec::new(env);

    for token in storage::reward_tokens(env).iter() {
        let mut pool = storage::reward_state(env, &token);
        let mut ledger = storage::user_reward(env, user, &token);

        let raw = rewards::pending(
            env,
            position.amount,
            pool.acc_reward_per_share,
            ledger.reward_debt,
        )
        .ok_or(ContractError::MathOverflow)?;

        let paid = match &multiplier_config {
            None => raw,
            Some(config) => {
                let extra_accrued = rewards::pending(
                    env,
                    position.amount,
                    pool.acc_extra_per_share,
                    ledger.extra_rewards_debt,
                )
                .ok_or(ContractError::MathOverflow)?;
                let current = multiplier::staking_multiplier(
                    position.amount,
                    position.deposit_timestamp,
                    now,
                );
                let settlement = multiplier::settle(
                    env,
                    config,
                    &mut pool,
                    &mut ledger,
                    raw,
                    extra_accrued,
                    position.amount,
                    current,
                )
                .ok_or(ContractError::MathOverflow)?;

                if settlement.withheld > 0 {
                    events::publish_reward_withheld(
                        env,
                        user.clone(),
                        token.clone(),
                        settlement.withheld,
                    );
                }
                if settlement.extra > 0 {
                    events::publish_extra_reward(env, user.clone(), token.clone(), settlement.extra);
                }
                if amount_after == 0 {
                    forfeit(env, user, &token, &mut pool, &mut ledger)?;
                }
                settlement.paid
            }
        };

        rebase(env, &mut ledger, &pool, amount_after)?;
        if paid > 0 {
            pool.last_reward_balance = math::sub_floor_zero(pool.last_reward_balance, paid);
            ledger.paid_rewards = ledger
                .paid_rewards
                .checked_add(paid)
                .ok_or(ContractError::MathOverflow)?;
            payouts.push_back((token.clone(), paid));
        }

        storage::set_reward_state(env, &token, &pool);
        storage::set_user_reward(env, user, &token, &ledger);
    }
    Ok(payouts)
}

/// Re-bases debts from `amount_before` to `amount_after` without paying
/// anything: whatever was pending is left unallocated in the pool. The
/// position's unclaimed forgone-pool share goes back around the pool, and a
/// position closing to zero still forfeits its deferred payout.
pub(crate) fn rebase_debts(
    env: &Env,
    user: &Address,
    amount_before: i128,
    amount_after: i128,
) -> Result<(), ContractError> {
    let multiplier_enabled = storage::multiplier_config(env).is_some();

    for token in storage::reward_tokens(env).iter() {
        let mut pool = storage::reward_state(env, &token);
        let mut ledger = storage::user_reward(env, user, &token);

        if multiplier_enabled {
            let extra_accrued = rewards::pending(
                env,
                amount_before,
                pool.acc_extra_per_share,
                ledger.extra_rewards_debt,
            )
            .ok_or(ContractError::MathOverflow)?;
            multiplier::recirculate(&mut pool, extra_accrued).ok_or(ContractError::MathOverflow)?;
            if amount_after == 0 {
                forfeit(env, user, &token, &mut pool, &mut ledger)?;
            }
            storage::set_reward_state(env, &token, &pool);
        }
        rebase(env, &mut ledger, &pool, amount_after)?;
        storage::set_user_reward(env, user, &token, &ledger);
    }
    Ok(())
}

fn rebase(
    env: &Env,
    ledger: &mut UserRewardState,
    pool: &RewardState,
    amount_after: i128,
) -> Result<(), ContractError> {
    ledger.reward_debt = rewards::accumulated(env, amount_after, pool.acc_reward_per_share)
        .ok_or(ContractError::MathOverflow)?;
    ledger.extra_rewards_debt = rewards::accumulated(env, amount_after, pool.acc_extra_per_share)
        .ok_or(ContractError::MathOverflow)?;
    Ok(())
}

fn forfeit(
    env: &Env,
    user: &Address,
    token: &Address,
    pool: &mut RewardState,
    ledger: &mut UserRewardState,
) -> Result<(), ContractError> {
    let forfeited = multiplier::forfeit(pool, ledger).ok_or(ContractError::MathOverflow)?;
    if forfeited > 0 {
        events::publish_reward_forfeited(env, user.clone(), token.clone(), forfeited);
    }
    Ok(())
}

/// Transfers settled rewards to `user`. Call only after all state is written.
pub(crate) fn pay_out(env: &Env, user: &Address, payouts: &Vec<(Address, i128)>) {
    let this = env.current_contract_address();
    for (token, amount) in payouts.iter() {
        token::Client::new(env, &token).transfer(&this, user, &amount);
        events::publish_reward_claimed(env, user.clone(), token, amount);
    }
}

/// Amount a claim would pay `user` in `token` right now, multiplier applied.
pub(crate) fn preview_claimable(env: &Env, user: &Address, token: &Address) -> i128 {
    let mut pool = preview_reward_state(env, token);
    let mut ledger = storage::user_reward(env, user, token);
    let position = storage::position(env, user);

    let Some(raw) = rewards::pending(
        env,
        position.amount,
        pool.acc_reward_per_share,
        ledger.reward_debt,
    ) else {
        return 0;
    };
    let Some(config) = storage::multiplier_config(env) else {
        return raw;
    };

    let extra_accrued = rewards::pending(
        env,
        position.amount,
        pool.acc_extra_per_share,
        ledger.extra_rewards_debt,
    )
    .unwrap_or(0);
    let current = multiplier::staking_multiplier(
        position.amount,
        position.deposit_timestamp,
        env.ledger().timestamp(),
    );
    multiplier::settle(
        env,
        &config,
        &mut pool,
        &mut ledger,
        raw,
        extra_accrued,
        position.amount,
        current,
    )
    .map(|settlement| settlement.paid)
    .unwrap_or(0)
}
