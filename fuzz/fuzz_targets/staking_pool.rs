#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};
use staking_pool::{
    DecayParams, MultiplierConfig, ReleasePolicy, StakingPool, StakingPoolClient, VestingMode,
    VestingParams,
};

#[derive(Arbitrary, Debug)]
pub enum FuzzPolicy {
    Immediate,
    Vesting { period: u32, overlap: bool },
    Decay { factor: u8, min_update_delay: u16 },
}

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Deposit { amount: u32 },
    Withdraw { amount: u32 },
    ForceWithdraw { amount: u32 },
    Claim,
    Fund { amount: u32 },
    UpdateRewards,
    Advance { seconds: u32 },
}

#[derive(Arbitrary, Debug)]
pub struct FuzzInput {
    policy: FuzzPolicy,
    multiplier: bool,
    actions: Vec<FuzzAction>,
}

fn release_policy(policy: &FuzzPolicy) -> ReleasePolicy {
    match *policy {
        FuzzPolicy::Immediate => ReleasePolicy::Immediate,
        FuzzPolicy::Vesting { period, overlap } => ReleasePolicy::Vesting(VestingParams {
            period: u64::from(period.max(1)),
            mode: if overlap {
                VestingMode::Overlap
            } else {
                VestingMode::Restart
            },
        }),
        FuzzPolicy::Decay {
            factor,
            min_update_delay,
        } => ReleasePolicy::Decay(DecayParams {
            factor: u32::from(factor.max(1)),
            min_update_delay: u64::from(min_update_delay),
        }),
    }
}

fuzz_target!(|input: FuzzInput| {
    let env = Env::default();
    env.mock_all_auths();
    env.cost_estimate().budget().reset_unlimited();
    env.ledger().set_timestamp(1_000);

    let admin = Address::generate(&env);
    let staking_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let reward_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let contract_id = env.register(StakingPool, ());
    let client = StakingPoolClient::new(&env, &contract_id);

    let multiplier = input.multiplier.then(|| MultiplierConfig {
        extra_rewards_threshold: 1_000,
    });
    client.initialize(
        &admin,
        &staking_token,
        &reward_token,
        &release_policy(&input.policy),
        &multiplier,
    );

    let stake = StellarAssetClient::new(&env, &staking_token);
    let reward = StellarAssetClient::new(&env, &reward_token);
    let reward_balance = TokenClient::new(&env, &reward_token);
    let stake_balance = TokenClient::new(&env, &staking_token);

    let users: Vec<Address> = (0..4).map(|_| Address::generate(&env)).collect();
    let mut funded: i128 = 0;
    let mut last_acc: i128 = 0;

    for (i, action) in input.actions.into_iter().enumerate() {
        let user = &users[i % users.len()];
        match action {
            FuzzAction::Deposit { amount } => {
                let amount = i128::from(amount);
                if amount > 0 {
                    stake.mint(user, &amount);
                }
                let _ = client.try_deposit(user, &amount);
            }
            FuzzAction::Withdraw { amount } => {
                let _ = client.try_withdraw(user, &i128::from(amount));
            }
            FuzzAction::ForceWithdraw { amount } => {
                let _ = client.try_force_withdraw(user, &i128::from(amount));
            }
            FuzzAction::Claim => {
                let _ = client.try_claim(user);
            }
            FuzzAction::Fund { amount } => {
                let amount = i128::from(amount);
                if amount > 0 {
                    reward.mint(&contract_id, &amount);
                    funded += amount;
                }
            }
            FuzzAction::UpdateRewards => {
                let _ = client.try_update_rewards();
            }
            FuzzAction::Advance { seconds } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now + u64::from(seconds));
            }
        }

        let total = client.total_staked();
        let positions: i128 = users.iter().map(|u| client.user_amount(u)).sum();
        assert_eq!(positions, total);
        assert!(stake_balance.balance(&contract_id) >= total);

        let acc = client.get_reward_state(&reward_token).acc_reward_per_share;
        assert!(acc >= last_acc);
        last_acc = acc;

        let in_wallets: i128 = users.iter().map(|u| reward_balance.balance(u)).sum();
        assert_eq!(in_wallets + reward_balance.balance(&contract_id), funded);
    }
});
