#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests for the reward accounting engine.
//!
//! Random sequences of deposits, withdrawals, claims, reward inflows and
//! clock advances are replayed against a live pool under every release
//! policy, with and without the staking multiplier. Advances of up to 200
//! days carry positions across the 7, 180 and 365 day multiplier steps.
//! After each step:
//! - positions sum to `total_staked`, and the pool holds at least that much
//!   staking token
//! - `acc_reward_per_share` never decreases
//! - pending and claimable rewards are never negative
//! - every funded reward token is either still in the pool or in a wallet
//! - the observed reward balance never exceeds the pool's actual balance
//! - a claim repeated immediately pays nothing

use proptest::prelude::*;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{Address, Env};
use staking_pool::{
    DecayParams, MultiplierConfig, ReleasePolicy, StakingPool, StakingPoolClient, VestingMode, VestingParams,
};

const USERS: usize = 3;
const DAY: u64 = 86_400;

#[derive(Clone, Debug)]
enum Op {
    Deposit { user: usize, amount: i128 },
    Withdraw { user: usize, amount: i128 },
    ForceWithdraw { user: usize, amount: i128 },
    Claim { user: usize },
    Fund { amount: i128 },
    Advance { seconds: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..USERS, 1i128..5_000).prop_map(|(user, amount)| Op::Deposit { user, amount }),
        (0..USERS, 1i128..5_000).prop_map(|(user, amount)| Op::Withdraw { user, amount }),
        (0..USERS, 1i128..5_000).prop_map(|(user, amount)| Op::ForceWithdraw { user, amount }),
        (0..USERS).prop_map(|user| Op::Claim { user }),
        (1i128..10_000).prop_map(|amount| Op::Fund { amount }),
        (1u64..200_000).prop_map(|seconds| Op::Advance { seconds }),
        (DAY..200 * DAY).prop_map(|seconds| Op::Advance { seconds }),
    ]
}

fn policy_strategy() -> impl Strategy<Value = ReleasePolicy> {
    prop_oneof![
        Just(ReleasePolicy::Immediate),
        Just(ReleasePolicy::Vesting(VestingParams {
            period: 7 * 86_400,
            mode: VestingMode::Restart,
        })),
        Just(ReleasePolicy::Vesting(VestingParams {
            period: 3 * 86_400,
            mode: VestingMode::Overlap,
        })),
        Just(ReleasePolicy::Decay(DecayParams {
            factor: 3,
            min_update_delay: 600,
        })),
    ]
}

// ── Harness ───────────────────────────────────────────────────────────────────

struct Harness {
    env: Env,
    pool: StakingPoolClient<'static>,
    pool_id: Address,
    staking_token: Address,
    reward_token: Address,
    users: [Address; USERS],
    funded: i128,
    last_acc: i128,
}

impl Harness {
    fn new(policy: &ReleasePolicy, multiplier: bool) -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.cost_estimate().budget().reset_unlimited();
        env.ledger().set_timestamp(1_000);

        let staking_token = env
            .register_stellar_asset_contract_v2(Address::generate(&env))
            .address();
        let reward_token = env
            .register_stellar_asset_contract_v2(Address::generate(&env))
            .address();
        let pool_id = env.register(StakingPool, ());
        let pool = StakingPoolClient::new(&env, &pool_id);
        let multiplier = multiplier.then(|| MultiplierConfig {
            extra_rewards_threshold: 1,
        });
        pool.initialize(
            &Address::generate(&env),
            &staking_token,
            &reward_token,
            policy,
            &multiplier,
        );
        let users = [
            Address::generate(&env),
            Address::generate(&env),
            Address::generate(&env),
        ];

        Harness {
            env,
            pool,
            pool_id,
            staking_token,
            reward_token,
            users,
            funded: 0,
            last_acc: 0,
        }
    }

    fn balance(&self, token: &Address, who: &Address) -> i128 {
        TokenClient::new(&self.env, token).balance(who)
    }

    fn apply(&mut self, op: &Op) -> Result<(), TestCaseError> {
        match *op {
            Op::Deposit { user, amount } => {
                let user = &self.users[user];
                StellarAssetClient::new(&self.env, &self.staking_token).mint(user, &amount);
                self.pool.deposit(user, &amount);
            }
            Op::Withdraw { user, amount } => {
                let user = &self.users[user];
                let amount = amount.min(self.pool.user_amount(user));
                if amount > 0 {
                    self.pool.withdraw(user, &amount);
                }
            }
            Op::ForceWithdraw { user, amount } => {
                let user = &self.users[user];
                let amount = amount.min(self.pool.user_amount(user));
                if amount > 0 {
                    self.pool.force_withdraw(user, &amount);
                }
            }
            Op::Claim { user } => {
                let user = &self.users[user];
                self.pool.claim(user);
                let again = self.pool.claim(user);
                prop_assert_eq!(again.len(), 0, "second claim paid {:?}", again);
            }
            Op::Fund { amount } => {
                StellarAssetClient::new(&self.env, &self.reward_token).mint(&self.pool_id, &amount);
                self.funded += amount;
            }
            Op::Advance { seconds } => {
                let now = self.env.ledger().timestamp();
                self.env.ledger().set_timestamp(now + seconds);
            }
        }
        Ok(())
    }

    fn check(&mut self) -> Result<(), TestCaseError> {
        let total = self.pool.total_staked();
        let sum: i128 = self.users.iter().map(|u| self.pool.user_amount(u)).sum();
        prop_assert_eq!(sum, total);
        prop_assert!(self.balance(&self.staking_token, &self.pool_id) >= total);

        let state = self.pool.get_reward_state(&self.reward_token);
        prop_assert!(state.acc_reward_per_share >= self.last_acc);
        self.last_acc = state.acc_reward_per_share;

        let pool_rewards = self.balance(&self.reward_token, &self.pool_id);
        prop_assert!(state.last_reward_balance <= pool_rewards);

        let mut in_wallets = 0;
        for user in self.users.iter() {
            prop_assert!(self.pool.pending_rewards(user, &self.reward_token) >= 0);
            prop_assert!(self.pool.claimable_rewards(user, &self.reward_token) >= 0);
            in_wallets += self.balance(&self.reward_token, user);
        }
        prop_assert_eq!(in_wallets + pool_rewards, self.funded);
        Ok(())
    }
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Every invariant holds after every step of a random operation sequence.
    #[test]
    fn prop_invariants_hold_across_sequences(
        policy in policy_strategy(),
        multiplier in any::<bool>(),
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let mut harness = Harness::new(&policy, multiplier);
        for op in ops.iter() {
            harness.apply(op)?;
            harness.check()?;
        }
    }

    /// With no reward inflow, deposits and withdrawals never move rewards.
    #[test]
    fn prop_no_inflow_no_rewards(
        ops in prop::collection::vec(op_strategy(), 1..30),
    ) {
        let mut harness = Harness::new(&ReleasePolicy::Immediate, false);
        for op in ops.iter().filter(|op| !matches!(op, Op::Fund { .. })) {
            harness.apply(op)?;
            harness.check()?;
        }
        for user in harness.users.iter() {
            prop_assert_eq!(harness.balance(&harness.reward_token, user), 0);
        }
        prop_assert_eq!(harness.pool.get_reward_state(&harness.reward_token).acc_reward_per_share, 0);
    }

    /// A lone staker present for the whole vesting period ends up with the
    /// full inflow, whenever they claim along the way.
    #[test]
    fn prop_lone_staker_receives_full_vested_inflow(
        inflow in 1_000i128..1_000_000,
        claim_offsets in prop::collection::vec(0u64..7 * 86_400, 0..5),
    ) {
        let policy = ReleasePolicy::Vesting(VestingParams {
            period: 7 * 86_400,
            mode: VestingMode::Overlap,
        });
        let mut harness = Harness::new(&policy, false);
        harness.apply(&Op::Deposit { user: 0, amount: 1_000 })?;
        harness.apply(&Op::Fund { amount: inflow })?;
        harness.pool.update_rewards();

        let start = harness.env.ledger().timestamp();
        let mut offsets = claim_offsets.clone();
        offsets.sort_unstable();
        for offset in offsets {
            harness.env.ledger().set_timestamp(start + offset);
            harness.pool.claim(&harness.users[0]);
        }
        harness.env.ledger().set_timestamp(start + 7 * 86_400);
        harness.pool.claim(&harness.users[0]);

        let received = harness.balance(&harness.reward_token, &harness.users[0]);
        prop_assert!(received <= inflow);
        // Truncation loses at most a unit per fold.
        prop_assert!(inflow - received <= 6, "received {} of {}", received, inflow);
    }
}
