extern crate std;

use crate::test_fixture::{Fixture, DAY, START};
use crate::{ContractError, DecayParams, ReleasePolicy, VestingMode, VestingParams};

const PERIOD: u64 = 7 * DAY;

fn vesting(mode: VestingMode) -> Fixture {
    Fixture::new(
        ReleasePolicy::Vesting(VestingParams {
            period: PERIOD,
            mode,
        }),
        None,
    )
}

fn decay(factor: u32, min_update_delay: u64) -> Fixture {
    Fixture::new(
        ReleasePolicy::Decay(DecayParams {
            factor,
            min_update_delay,
        }),
        None,
    )
}

// ── Vesting ───────────────────────────────────────────────────────────────────

#[test]
fn test_vesting_boundary() {
    let f = vesting(VestingMode::Restart);
    let user = f.staker(1_000);
    f.pool.deposit(&user, &1_000);

    let t0 = START + 100;
    f.set_time(t0);
    f.fund(7_000);
    f.pool.update_rewards();
    assert_eq!(f.pool.pending_rewards(&user, &f.reward_token), 0);

    f.set_time(t0 + PERIOD / 2);
    assert_eq!(f.pool.pending_rewards(&user, &f.reward_token), 3_500);

    f.set_time(t0 + PERIOD);
    assert_eq!(f.pool.pending_rewards(&user, &f.reward_token), 7_000);

    f.set_time(t0 + 3 * PERIOD);
    assert_eq!(f.pool.pending_rewards(&user, &f.reward_token), 7_000);
}

#[test]
fn test_vesting_claims_add_up_to_inflow() {
    let f = vesting(VestingMode::Restart);
    let user = f.staker(1_000);
    f.pool.deposit(&user, &1_000);

    let t0 = START + 100;
    f.set_time(t0);
    f.fund(7_000);
    f.pool.update_rewards();

    f.set_time(t0 + PERIOD / 2);
    f.pool.claim(&user);
    assert_eq!(f.balance(&f.reward_token, &user), 3_500);

    f.set_time(t0 + PERIOD);
    f.pool.claim(&user);
    assert_eq!(f.balance(&f.reward_token, &user), 7_000);
    assert_eq!(f.balance(&f.reward_token, &f.pool_id), 0);
    assert!(f.pool.get_reward_state(&f.reward_token).vesting.is_empty());
}

#[test]
fn test_vesting_drops_inflow_without_stakers() {
    let f = vesting(VestingMode::Overlap);
    f.fund(1_000);
    f.pool.update_rewards();

    let user = f.staker(1_000);
    f.pool.deposit(&user, &1_000);
    f.set_time(START + 2 * PERIOD);

    assert_eq!(f.pool.pending_rewards(&user, &f.reward_token), 0);
}

#[test]
fn test_overlapping_windows_vest_independently() {
    let f = vesting(VestingMode::Overlap);
    let user = f.staker(1_000);
    f.pool.deposit(&user, &1_000);

    let t0 = START + 100;
    f.set_time(t0);
    f.fund(1_400);
    f.pool.update_rewards();

    f.set_time(t0 + PERIOD / 2);
    f.fund(700);
    f.pool.update_rewards();
    assert_eq!(f.pool.get_reward_state(&f.reward_token).vesting.len(), 2);
    assert_eq!(f.pool.pending_rewards(&user, &f.reward_token), 700);

    f.set_time(t0 + PERIOD);
    assert_eq!(f.pool.pending_rewards(&user, &f.reward_token), 1_750);

    f.set_time(t0 + PERIOD + PERIOD / 2);
    assert_eq!(f.pool.pending_rewards(&user, &f.reward_token), 2_100);
}

#[test]
fn test_restart_revests_remainder_with_new_inflow() {
    let f = vesting(VestingMode::Restart);
    let user = f.staker(1_000);
    f.pool.deposit(&user, &1_000);

    let t0 = START + 100;
    f.set_time(t0);
    f.fund(1_400);
    f.pool.update_rewards();

    f.set_time(t0 + PERIOD / 2);
    f.fund(700);
    f.pool.update_rewards();
    assert_eq!(f.pool.get_reward_state(&f.reward_token).vesting.len(), 1);

    f.set_time(t0 + PERIOD);
    assert_eq!(f.pool.pending_rewards(&user, &f.reward_token), 1_400);

    f.set_time(t0 + PERIOD + PERIOD / 2);
    assert_eq!(f.pool.pending_rewards(&user, &f.reward_token), 2_100);
}

// ── Decay ─────────────────────────────────────────────────────────────────────

#[test]
fn test_decay_releases_fraction_per_delay() {
    let f = decay(4, 60);
    let user = f.staker(1_000);
    f.pool.deposit(&user, &1_000);

    let t1 = START + 10;
    f.set_time(t1);
    f.fund(1_000);
    f.pool.update_rewards();
    assert_eq!(f.pool.pending_rewards(&user, &f.reward_token), 250);

    f.set_time(t1 + 30);
    f.pool.update_rewards();
    assert_eq!(f.pool.pending_rewards(&user, &f.reward_token), 250);

    f.set_time(t1 + 60);
    f.pool.claim(&user);
    assert_eq!(f.balance(&f.reward_token, &user), 437);

    // Residual is re-diffed against the balance left after the claim.
    f.set_time(t1 + 120);
    assert_eq!(f.pool.pending_rewards(&user, &f.reward_token), 140);
}

#[test]
fn test_decay_without_delay_releases_on_every_update() {
    let f = decay(4, 0);
    let user = f.staker(1_000);
    f.pool.deposit(&user, &1_000);

    f.fund(1_000);
    f.pool.update_rewards();
    assert_eq!(f.pool.get_reward_state(&f.reward_token).last_reward_balance, 250);
    f.pool.update_rewards();
    assert_eq!(f.pool.get_reward_state(&f.reward_token).last_reward_balance, 437);

    // A claim runs one more update of its own.
    f.pool.claim(&user);
    assert_eq!(f.balance(&f.reward_token, &user), 577);
}

#[test]
fn test_decay_factor_one_releases_everything() {
    let f = decay(1, 3_600);
    let user = f.staker(1_000);
    f.pool.deposit(&user, &1_000);

    f.fund(900);
    assert_eq!(f.pool.pending_rewards(&user, &f.reward_token), 900);
}

// ── Policy switching ──────────────────────────────────────────────────────────

#[test]
fn test_switching_policy_reobserves_unvested() {
    let f = vesting(VestingMode::Restart);
    let user = f.staker(1_000);
    f.pool.deposit(&user, &1_000);

    let t0 = START + 100;
    f.set_time(t0);
    f.fund(1_000);
    f.pool.update_rewards();

    f.set_time(t0 + PERIOD / 2);
    f.pool.set_release_policy(&f.admin, &ReleasePolicy::Immediate);

    assert_eq!(f.pool.release_policy(), ReleasePolicy::Immediate);
    assert!(f.pool.get_reward_state(&f.reward_token).vesting.is_empty());
    assert_eq!(f.pool.pending_rewards(&user, &f.reward_token), 1_000);
}

#[test]
fn test_set_invalid_policy_fails() {
    let f = Fixture::immediate();

    let result = f.pool.try_set_release_policy(
        &f.admin,
        &ReleasePolicy::Decay(DecayParams {
            factor: 0,
            min_update_delay: 10,
        }),
    );
    assert_eq!(result, Err(Ok(ContractError::InvalidPolicy)));
    assert_eq!(f.pool.release_policy(), ReleasePolicy::Immediate);
}
