extern crate std;

use soroban_sdk::{contract, contractimpl, contracttype, Address, Env};

use crate::rewards;
use crate::test_fixture::Fixture;
use crate::{ContractError, MigrationOutcome, MultiplierConfig, ReleasePolicy};

// ── Mock target ───────────────────────────────────────────────────────────────

#[contracttype]
enum HollowKey {
    StakingToken,
}

/// Answers like a compatible pool and reports every deposit as credited, but
/// never pulls the tokens.
#[contract]
pub struct HollowPool;

#[contractimpl]
impl HollowPool {
    pub fn set_staking_token(env: Env, token: Address) {
        env.storage().instance().set(&HollowKey::StakingToken, &token);
    }

    pub fn staking_token(env: Env) -> Address {
        env.storage()
            .instance()
            .get(&HollowKey::StakingToken)
            .unwrap()
    }

    pub fn deposit_for_user(_env: Env, _from: Address, _user: Address, amount: i128) -> i128 {
        amount
    }
}

/// Pool A plus an initialised pool B staking the same token.
fn two_pools() -> (Fixture, Fixture) {
    let a = Fixture::immediate();
    let b = Fixture::with_tokens(a.env.clone(), a.staking_token.clone(), a.reward_token.clone());
    b.pool.initialize(
        &b.admin,
        &b.staking_token,
        &b.reward_token,
        &ReleasePolicy::Immediate,
        &None,
    );
    (a, b)
}

#[test]
fn test_migrate_moves_position_and_pays_rewards() {
    let (a, b) = two_pools();
    let user = a.staker(500);
    a.pool.deposit(&user, &500);
    a.fund(10);

    // Pool B already has history so its accumulator is non-zero.
    let resident = b.staker(1_500);
    b.pool.deposit(&resident, &1_500);
    b.fund(30);
    b.pool.update_rewards();

    let outcome = a.pool.migrate(&user, &b.pool_id);
    assert_eq!(outcome, MigrationOutcome::Deposited);

    assert_eq!(a.balance(&a.reward_token, &user), 10);
    assert_eq!(a.pool.total_staked(), 0);
    assert_eq!(a.pool.user_amount(&user), 0);
    assert_eq!(a.balance(&a.staking_token, &a.pool_id), 0);

    assert_eq!(b.pool.total_staked(), 2_000);
    assert_eq!(b.pool.user_amount(&user), 500);
    assert_eq!(b.balance(&b.staking_token, &b.pool_id), 2_000);

    let acc = b.pool.get_reward_state(&b.reward_token).acc_reward_per_share;
    assert!(acc > 0);
    assert_eq!(
        b.pool.get_user_reward(&user, &b.reward_token).reward_debt,
        rewards::accumulated(&b.env, 500, acc).unwrap()
    );
    assert_eq!(b.pool.pending_rewards(&user, &b.reward_token), 0);
}

#[test]
fn test_migrate_refunds_when_target_rejects() {
    let (a, b) = two_pools();
    let user = a.staker(500);
    a.pool.deposit(&user, &500);
    a.fund(10);
    b.pool.pause(&b.admin);

    let outcome = a.pool.migrate(&user, &b.pool_id);
    assert_eq!(outcome, MigrationOutcome::Refunded);

    assert_eq!(a.balance(&a.staking_token, &user), 500);
    assert_eq!(a.balance(&a.reward_token, &user), 10);
    assert_eq!(a.pool.total_staked(), 0);
    assert_eq!(a.balance(&a.staking_token, &a.pool_id), 0);

    assert_eq!(b.pool.total_staked(), 0);
    assert_eq!(b.pool.user_amount(&user), 0);
    assert_eq!(b.balance(&b.staking_token, &b.pool_id), 0);
}

#[test]
fn test_migrate_rejects_incompatible_pool() {
    let a = Fixture::immediate();
    let c = Fixture::with_tokens(a.env.clone(), a.new_token(), a.reward_token.clone());
    c.pool.initialize(
        &c.admin,
        &c.staking_token,
        &c.reward_token,
        &ReleasePolicy::Immediate,
        &None,
    );

    let user = a.staker(500);
    a.pool.deposit(&user, &500);

    assert_eq!(
        a.pool.try_migrate(&user, &c.pool_id),
        Err(Ok(ContractError::IncompatiblePool))
    );
    // A plain token contract has no `staking_token` to answer with.
    assert_eq!(
        a.pool.try_migrate(&user, &a.reward_token),
        Err(Ok(ContractError::IncompatiblePool))
    );
    assert_eq!(a.pool.user_amount(&user), 500);
    assert_eq!(a.pool.total_staked(), 500);
}

#[test]
fn test_migrate_rejects_self_and_empty_position() {
    let (a, b) = two_pools();
    let user = a.staker(500);

    assert_eq!(
        a.pool.try_migrate(&user, &b.pool_id),
        Err(Ok(ContractError::ZeroAmount))
    );

    a.pool.deposit(&user, &500);
    assert_eq!(
        a.pool.try_migrate(&user, &a.pool_id),
        Err(Ok(ContractError::InvalidInput))
    );
    assert_eq!(a.pool.user_amount(&user), 500);
}

#[test]
fn test_migrate_is_allowed_while_paused() {
    let (a, b) = two_pools();
    let user = a.staker(500);
    a.pool.deposit(&user, &500);
    a.pool.pause(&a.admin);

    assert_eq!(a.pool.migrate(&user, &b.pool_id), MigrationOutcome::Deposited);
    assert_eq!(b.pool.user_amount(&user), 500);
}

#[test]
fn test_migrate_forfeits_deferred_payout() {
    let a = Fixture::new(
        ReleasePolicy::Immediate,
        Some(MultiplierConfig {
            extra_rewards_threshold: 1,
        }),
    );
    let b = Fixture::with_tokens(a.env.clone(), a.staking_token.clone(), a.reward_token.clone());
    b.pool.initialize(
        &b.admin,
        &b.staking_token,
        &b.reward_token,
        &ReleasePolicy::Immediate,
        &None,
    );
    let user = a.staker(500);
    a.pool.deposit(&user, &500);
    a.fund(10);

    a.pool.migrate(&user, &b.pool_id);

    assert_eq!(a.balance(&a.reward_token, &user), 0);
    assert_eq!(a.pool.get_reward_state(&a.reward_token).forgone_pool, 10);
    assert_eq!(b.pool.user_amount(&user), 500);
}

#[test]
fn test_migrate_refunds_when_target_does_not_pull() {
    let a = Fixture::immediate();
    let hollow_id = a.env.register(HollowPool, ());
    HollowPoolClient::new(&a.env, &hollow_id).set_staking_token(&a.staking_token);

    let user = a.staker(500);
    a.pool.deposit(&user, &500);
    a.fund(10);

    let outcome = a.pool.migrate(&user, &hollow_id);
    assert_eq!(outcome, MigrationOutcome::Refunded);

    assert_eq!(a.balance(&a.staking_token, &user), 500);
    assert_eq!(a.balance(&a.reward_token, &user), 10);
    assert_eq!(a.pool.total_staked(), 0);
    assert_eq!(a.pool.user_amount(&user), 0);
    assert_eq!(a.balance(&a.staking_token, &a.pool_id), 0);
    assert_eq!(a.balance(&a.staking_token, &hollow_id), 0);
}
