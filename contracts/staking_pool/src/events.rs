#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

use crate::release::ReleasePolicy;

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the pool is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub staking_token: Address,
    pub reward_token: Address,
    pub release_policy: ReleasePolicy,
    pub multiplier_enabled: bool,
    pub timestamp: u64,
}

/// Fired when principal is credited to a position.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositedEvent {
    pub funder: Address,
    pub user: Address,
    pub amount: i128,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

/// Fired when principal leaves a position, with or without a reward claim.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub user: Address,
    pub amount: i128,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardClaimedEvent {
    pub user: Address,
    pub token: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired when newly released reward balance is folded into the accumulator.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsUpdatedEvent {
    pub token: Address,
    pub released: i128,
    pub acc_reward_per_share: i128,
    pub timestamp: u64,
}

/// Multiplier bookkeeping: `amount` moved into deferred payout, into the
/// forgone pool, or out of the forgone pool as an extra reward.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MultiplierEvent {
    pub user: Address,
    pub token: Address,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MigratedEvent {
    pub user: Address,
    pub target: Address,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SweptEvent {
    pub token: Address,
    pub amount_in: i128,
    pub reward_out: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReinvestedEvent {
    pub user: Address,
    pub reward_in: i128,
    pub staked_out: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTransferEvent {
    pub from: Address,
    pub to: Address,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    admin: Address,
    staking_token: Address,
    reward_token: Address,
    release_policy: ReleasePolicy,
    multiplier_enabled: bool,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            staking_token,
            reward_token,
            release_policy,
            multiplier_enabled,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_deposited(
    env: &Env,
    funder: Address,
    user: Address,
    amount: i128,
    new_total_staked: i128,
) {
    env.events().publish(
        (symbol_short!("DEPOSIT"), user.clone()),
        DepositedEvent {
            funder,
            user,
            amount,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawn(env: &Env, user: Address, amount: i128, new_total_staked: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAW"), user.clone()),
        WithdrawnEvent {
            user,
            amount,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_force_withdrawn(env: &Env, user: Address, amount: i128, new_total_staked: i128) {
    env.events().publish(
        (symbol_short!("FRC_WDR"), user.clone()),
        WithdrawnEvent {
            user,
            amount,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_claimed(env: &Env, user: Address, token: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("CLAIMED"), user.clone()),
        RewardClaimedEvent {
            user,
            token,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_rewards_updated(
    env: &Env,
    token: Address,
    released: i128,
    acc_reward_per_share: i128,
) {
    env.events().publish(
        (symbol_short!("RWD_UPD"), token.clone()),
        RewardsUpdatedEvent {
            token,
            released,
            acc_reward_per_share,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_withheld(env: &Env, user: Address, token: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("WITHHELD"), user.clone()),
        MultiplierEvent {
            user,
            token,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_forfeited(env: &Env, user: Address, token: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("FORFEIT"), user.clone()),
        MultiplierEvent {
            user,
            token,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_extra_reward(env: &Env, user: Address, token: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("EXTRA"), user.clone()),
        MultiplierEvent {
            user,
            token,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_migrated(env: &Env, user: Address, target: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("MIGRATED"), user.clone()),
        MigratedEvent {
            user,
            target,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_migration_refunded(env: &Env, user: Address, target: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("MIG_REF"), user.clone()),
        MigratedEvent {
            user,
            target,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_swept(env: &Env, token: Address, amount_in: i128, reward_out: i128) {
    env.events().publish(
        (symbol_short!("SWEPT"), token.clone()),
        SweptEvent {
            token,
            amount_in,
            reward_out,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reinvested(env: &Env, user: Address, reward_in: i128, staked_out: i128) {
    env.events().publish(
        (symbol_short!("REINVEST"), user.clone()),
        ReinvestedEvent {
            user,
            reward_in,
            staked_out,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_paused(env: &Env, caller: Address) {
    env.events().publish(
        (symbol_short!("PAUSED"), caller),
        env.ledger().timestamp(),
    );
}

pub fn publish_unpaused(env: &Env, caller: Address) {
    env.events().publish(
        (symbol_short!("UNPAUSED"), caller),
        env.ledger().timestamp(),
    );
}

pub fn publish_release_policy_set(env: &Env, policy: ReleasePolicy) {
    env.events().publish(
        (symbol_short!("POLICY"),),
        (policy, env.ledger().timestamp()),
    );
}

pub fn publish_reward_token_added(env: &Env, token: Address) {
    env.events().publish(
        (symbol_short!("RWD_ADD"), token),
        env.ledger().timestamp(),
    );
}

pub fn publish_reward_token_removed(env: &Env, token: Address) {
    env.events().publish(
        (symbol_short!("RWD_REM"), token),
        env.ledger().timestamp(),
    );
}

pub fn publish_router_set(env: &Env, router: Address) {
    env.events().publish(
        (symbol_short!("ROUTER"),),
        (router, env.ledger().timestamp()),
    );
}

pub fn publish_min_out_set(env: &Env, percentage: u32) {
    env.events().publish(
        (symbol_short!("MIN_OUT"),),
        (percentage, env.ledger().timestamp()),
    );
}

pub fn publish_admin_transfer_proposed(env: &Env, current_admin: Address, proposed_admin: Address) {
    env.events().publish(
        (symbol_short!("ADM_PROP"), current_admin.clone()),
        AdminTransferEvent {
            from: current_admin,
            to: proposed_admin,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_transfer_accepted(env: &Env, old_admin: Address, new_admin: Address) {
    env.events().publish(
        (symbol_short!("ADM_ACPT"), new_admin.clone()),
        AdminTransferEvent {
            from: old_admin,
            to: new_admin,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_transfer_cancelled(env: &Env, admin: Address, cancelled_proposed: Address) {
    env.events().publish(
        (symbol_short!("ADM_CNCL"), admin.clone()),
        AdminTransferEvent {
            from: admin,
            to: cancelled_proposed,
            timestamp: env.ledger().timestamp(),
        },
    );
}
