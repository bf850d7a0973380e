#![no_std]

pub mod events;
pub mod migration;
pub mod multiplier;
pub mod release;
pub mod rewards;
pub mod storage;
pub mod swap;

mod accounting;

use common::admin_tiers::{self, AdminTier};
use common::{math, reentrancy};
use soroban_sdk::{contract, contractimpl, token, vec, Address, Env, Vec};

pub use migration::MigrationOutcome;
pub use multiplier::MultiplierConfig;
pub use release::{DecayParams, ReleasePolicy, VestingMode, VestingParams};
pub use storage::{RewardState, UserPosition, UserRewardState};

use storage::{ADMIN, INITIALIZED, PENDING_ADMIN};

/// Reward tokens a pool may distribute at once, primary included.
pub const MAX_REWARD_TOKENS: u32 = 8;

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidInput = 4,
    InsufficientBalance = 5,
    ZeroAmount = 6,
    Paused = 7,
    Reentrant = 8,
    MathOverflow = 9,
    TokensIdentical = 10,
    RewardTokenExists = 11,
    RewardTokenNotFound = 12,
    TooManyRewardTokens = 13,
    /// Migration target stakes a different token, or does not answer.
    IncompatiblePool = 14,
    RouterNotSet = 15,
    SwapFailed = 16,
    NothingToReinvest = 17,
    InvalidPolicy = 18,
    /// Reward tokens cannot be swept, and the primary cannot be removed.
    ProtectedToken = 19,
    NothingToSweep = 20,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingPool;

#[contractimpl]
impl StakingPool {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the pool.
    ///
    /// * `staking_token` – SAC address of the token users stake.
    /// * `reward_token`  – primary reward token; must differ from the staking
    ///   token so that `reinvest` always has something to swap.
    /// * `release_policy` – how observed inflow reaches the accumulator.
    /// * `multiplier` – `Some` enables the staking multiplier and forgone pool.
    pub fn initialize(
        env: Env,
        admin: Address,
        staking_token: Address,
        reward_token: Address,
        release_policy: ReleasePolicy,
        multiplier: Option<MultiplierConfig>,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if staking_token == reward_token {
            return Err(ContractError::TokensIdentical);
        }
        if !release_policy.is_valid() {
            return Err(ContractError::InvalidPolicy);
        }
        if let Some(config) = &multiplier {
            if config.extra_rewards_threshold < 0 {
                return Err(ContractError::InvalidInput);
            }
            storage::set_multiplier_config(&env, config);
        }

        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&INITIALIZED, &true);
        storage::set_staking_token(&env, &staking_token);
        storage::set_reward_tokens(&env, &vec![&env, reward_token.clone()]);
        storage::set_release_policy(&env, &release_policy);
        storage::extend_instance_ttl(&env);

        admin_tiers::bootstrap_owner(&env, &admin);

        events::publish_initialized(
            &env,
            admin,
            staking_token,
            reward_token,
            release_policy,
            multiplier.is_some(),
        );

        Ok(())
    }

    // ── Deposits ────────────────────────────────────────────────────────────

    /// Stake `amount` of the staking token, paying out any pending rewards.
    pub fn deposit(env: Env, user: Address, amount: i128) -> Result<(), ContractError> {
        Self::enter(&env)?;
        user.require_auth();
        Self::credit(&env, &user, &user, amount)?;
        reentrancy::exit(&env);
        Ok(())
    }

    /// Stake `amount` pulled from `from` into `user`'s position.
    ///
    /// Anyone may fund anyone's position; only the position's owner can
    /// withdraw it. Migrating pools call this with `from` set to themselves.
    pub fn deposit_for_user(
        env: Env,
        from: Address,
        user: Address,
        amount: i128,
    ) -> Result<i128, ContractError> {
        Self::enter(&env)?;
        from.require_auth();
        Self::credit(&env, &from, &user, amount)?;
        reentrancy::exit(&env);
        Ok(amount)
    }

    // ── Withdrawals ─────────────────────────────────────────────────────────

    /// Unstake `amount`, paying out pending rewards. Returns the remaining
    /// staked amount.
    pub fn withdraw(env: Env, user: Address, amount: i128) -> Result<i128, ContractError> {
        Self::enter(&env)?;
        user.require_auth();
        let position = Self::debit_checked(&env, &user, amount)?;

        accounting::update_rewards(&env)?;
        let remaining = position.amount - amount;
        let payouts = accounting::settle(&env, &user, &position, remaining)?;
        let new_total = Self::write_debit(&env, &user, position, amount);

        let staking_token = storage::staking_token(&env)?;
        token::Client::new(&env, &staking_token).transfer(
            &env.current_contract_address(),
            &user,
            &amount,
        );
        accounting::pay_out(&env, &user, &payouts);

        events::publish_withdrawn(&env, user, amount, new_total);

        reentrancy::exit(&env);
        Ok(remaining)
    }

    /// Unstake `amount` without claiming. Pending rewards are forfeited and
    /// stay in the pool; the only outgoing transfer is the principal.
    pub fn force_withdraw(env: Env, user: Address, amount: i128) -> Result<(), ContractError> {
        Self::enter(&env)?;
        user.require_auth();
        let position = Self::debit_checked(&env, &user, amount)?;

        accounting::rebase_debts(&env, &user, position.amount, position.amount - amount)?;
        let new_total = Self::write_debit(&env, &user, position, amount);

        let staking_token = storage::staking_token(&env)?;
        token::Client::new(&env, &staking_token).transfer(
            &env.current_contract_address(),
            &user,
            &amount,
        );

        events::publish_force_withdrawn(&env, user, amount, new_total);

        reentrancy::exit(&env);
        Ok(())
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Pay out everything currently claimable, per reward token.
    pub fn claim(env: Env, user: Address) -> Result<Vec<(Address, i128)>, ContractError> {
        Self::enter(&env)?;
        user.require_auth();

        accounting::update_rewards(&env)?;
        let position = storage::position(&env, &user);
        let payouts = accounting::settle(&env, &user, &position, position.amount)?;
        accounting::pay_out(&env, &user, &payouts);

        reentrancy::exit(&env);
        Ok(payouts)
    }

    /// Fold any unobserved reward inflow into the accumulators. Callable by
    /// anyone.
    pub fn update_rewards(env: Env) -> Result<(), ContractError> {
        Self::enter(&env)?;
        accounting::update_rewards(&env)?;
        reentrancy::exit(&env);
        Ok(())
    }

    // ── Migration ───────────────────────────────────────────────────────────

    /// Close `user`'s position here, pay its rewards, and deposit the
    /// principal into `target` on the user's behalf. If `target` rejects the
    /// deposit the principal is refunded to the user instead.
    pub fn migrate(
        env: Env,
        user: Address,
        target: Address,
    ) -> Result<MigrationOutcome, ContractError> {
        Self::enter(&env)?;
        user.require_auth();

        if target == env.current_contract_address() {
            return Err(ContractError::InvalidInput);
        }
        let staking_token = storage::staking_token(&env)?;
        if migration::target_staking_token(&env, &target).as_ref() != Some(&staking_token) {
            return Err(ContractError::IncompatiblePool);
        }
        let position = storage::position(&env, &user);
        if position.amount <= 0 {
            return Err(ContractError::ZeroAmount);
        }
        let amount = position.amount;

        accounting::update_rewards(&env)?;
        let payouts = accounting::settle(&env, &user, &position, 0)?;
        let new_total = Self::write_debit(&env, &user, position, amount);

        accounting::pay_out(&env, &user, &payouts);
        events::publish_withdrawn(&env, user.clone(), amount, new_total);
        let outcome = migration::hand_over(&env, &staking_token, &target, &user, amount);

        reentrancy::exit(&env);
        Ok(outcome)
    }

    // ── Swaps ───────────────────────────────────────────────────────────────

    /// Swap the caller's claimable primary reward into the staking token and
    /// add it to their position. Other reward tokens are paid out as usual.
    /// Returns the staked amount added.
    pub fn reinvest(env: Env, user: Address) -> Result<i128, ContractError> {
        Self::enter(&env)?;
        user.require_auth();
        Self::require_not_paused(&env)?;
        let router = storage::router(&env).ok_or(ContractError::RouterNotSet)?;
        let staking_token = storage::staking_token(&env)?;
        let primary = storage::primary_reward_token(&env)?;

        accounting::update_rewards(&env)?;
        let mut position = storage::position(&env, &user);
        let mut payouts = accounting::settle(&env, &user, &position, position.amount)?;

        let mut reward_in = 0;
        if let Some(index) = payouts.iter().position(|(token, _)| token == primary) {
            let index = index as u32;
            if let Some((_, amount)) = payouts.get(index) {
                reward_in = amount;
            }
            payouts.remove(index);
        }
        if reward_in <= 0 {
            return Err(ContractError::NothingToReinvest);
        }

        let staked_out = swap::swap_exact(
            &env,
            &router,
            &primary,
            &staking_token,
            reward_in,
            storage::min_out_percentage(&env),
        )?;

        let new_amount = position
            .amount
            .checked_add(staked_out)
            .ok_or(ContractError::MathOverflow)?;
        accounting::rebase_debts(&env, &user, position.amount, new_amount)?;
        position.amount = new_amount;
        storage::set_position(&env, &user, &position);
        let new_total = storage::total_staked(&env)
            .checked_add(staked_out)
            .ok_or(ContractError::MathOverflow)?;
        storage::set_total_staked(&env, new_total);

        accounting::pay_out(&env, &user, &payouts);
        events::publish_reinvested(&env, user, reward_in, staked_out);

        reentrancy::exit(&env);
        Ok(staked_out)
    }

    /// Swap the pool's whole balance of `token` into the primary reward
    /// token and fold the proceeds. For the staking token only the excess
    /// over `total_staked` is swept. Requires `Manager`.
    pub fn sweep(env: Env, caller: Address, token: Address) -> Result<i128, ContractError> {
        Self::enter(&env)?;
        caller.require_auth();
        Self::require_tier(&env, &caller, &AdminTier::Manager)?;
        Self::require_not_paused(&env)?;
        let router = storage::router(&env).ok_or(ContractError::RouterNotSet)?;
        if storage::reward_tokens(&env).contains(&token) {
            return Err(ContractError::ProtectedToken);
        }
        let primary = storage::primary_reward_token(&env)?;
        let staking_token = storage::staking_token(&env)?;

        accounting::update_rewards(&env)?;
        let amount_in = accounting::observed_balance(
            &env,
            &token,
            &staking_token,
            storage::total_staked(&env),
        );
        if amount_in <= 0 {
            return Err(ContractError::NothingToSweep);
        }

        let reward_out = swap::swap_exact(
            &env,
            &router,
            &token,
            &primary,
            amount_in,
            storage::min_out_percentage(&env),
        )?;
        accounting::update_rewards(&env)?;

        events::publish_swept(&env, token, amount_in, reward_out);

        reentrancy::exit(&env);
        Ok(reward_out)
    }

    // ── Configuration ───────────────────────────────────────────────────────

    /// Start distributing `token` as an additional reward. Any balance the
    /// pool already holds is folded on the next update. Requires `Manager`.
    pub fn add_reward_token(env: Env, caller: Address, token: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_tier(&env, &caller, &AdminTier::Manager)?;

        let mut tokens = storage::reward_tokens(&env);
        // A removed token keeps its record and cannot come back: positions
        // that changed while it was inactive hold stale debts for it.
        if tokens.contains(&token) || storage::has_reward_state(&env, &token) {
            return Err(ContractError::RewardTokenExists);
        }
        if tokens.len() >= MAX_REWARD_TOKENS {
            return Err(ContractError::TooManyRewardTokens);
        }

        accounting::update_rewards(&env)?;
        tokens.push_back(token.clone());
        storage::set_reward_tokens(&env, &tokens);
        storage::set_reward_state(&env, &token, &RewardState::new(&env));

        events::publish_reward_token_added(&env, token);
        Ok(())
    }

    /// Stop distributing `token`. Unclaimed rewards in it are no longer
    /// claimable. The primary reward token cannot be removed. Requires
    /// `Manager`.
    pub fn remove_reward_token(
        env: Env,
        caller: Address,
        token: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_tier(&env, &caller, &AdminTier::Manager)?;

        let mut tokens = storage::reward_tokens(&env);
        let index = tokens
            .first_index_of(&token)
            .ok_or(ContractError::RewardTokenNotFound)?;
        if index == 0 {
            return Err(ContractError::ProtectedToken);
        }

        accounting::update_rewards(&env)?;
        tokens.remove(index);
        storage::set_reward_tokens(&env, &tokens);

        events::publish_reward_token_removed(&env, token);
        Ok(())
    }

    /// Switch the release gate. Pending inflow is folded under the old
    /// policy; anything scheduled but unreleased is re-observed under the new
    /// one. Requires `Manager`.
    pub fn set_release_policy(
        env: Env,
        caller: Address,
        policy: ReleasePolicy,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_tier(&env, &caller, &AdminTier::Manager)?;
        if !policy.is_valid() {
            return Err(ContractError::InvalidPolicy);
        }

        accounting::update_rewards(&env)?;
        for token in storage::reward_tokens(&env).iter() {
            let mut state = storage::reward_state(&env, &token);
            release::reset_gate(&env, &mut state).ok_or(ContractError::MathOverflow)?;
            storage::set_reward_state(&env, &token, &state);
        }
        storage::set_release_policy(&env, &policy);

        events::publish_release_policy_set(&env, policy);
        Ok(())
    }

    /// Requires `Manager`.
    pub fn set_router(env: Env, caller: Address, router: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_tier(&env, &caller, &AdminTier::Manager)?;

        storage::set_router(&env, &router);

        events::publish_router_set(&env, router);
        Ok(())
    }

    /// Slippage floor for swaps, as a percentage of the router's quote
    /// (1..=100). Requires `Manager`.
    pub fn set_min_out_percentage(
        env: Env,
        caller: Address,
        percentage: u32,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_tier(&env, &caller, &AdminTier::Manager)?;
        if percentage == 0 || percentage > 100 {
            return Err(ContractError::InvalidInput);
        }

        storage::set_min_out_percentage(&env, percentage);

        events::publish_min_out_set(&env, percentage);
        Ok(())
    }

    /// Block deposits, reinvests and sweeps. Exits stay open. Requires
    /// `Operator`.
    pub fn pause(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_tier(&env, &caller, &AdminTier::Operator)?;

        storage::set_paused(&env, true);

        events::publish_paused(&env, caller);
        Ok(())
    }

    /// Requires `Operator`.
    pub fn unpause(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_tier(&env, &caller, &AdminTier::Operator)?;

        storage::set_paused(&env, false);

        events::publish_unpaused(&env, caller);
        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Raw pending reward in `token` as of now, before the multiplier.
    pub fn pending_rewards(env: Env, user: Address, token: Address) -> i128 {
        let state = accounting::preview_reward_state(&env, &token);
        let position = storage::position(&env, &user);
        let ledger = storage::user_reward(&env, &user, &token);
        rewards::pending(
            &env,
            position.amount,
            state.acc_reward_per_share,
            ledger.reward_debt,
        )
        .unwrap_or(0)
    }

    /// What `claim` would transfer in `token` right now.
    pub fn claimable_rewards(env: Env, user: Address, token: Address) -> i128 {
        accounting::preview_claimable(&env, &user, &token)
    }

    pub fn user_amount(env: Env, user: Address) -> i128 {
        storage::position(&env, &user).amount
    }

    pub fn get_position(env: Env, user: Address) -> UserPosition {
        storage::position(&env, &user)
    }

    pub fn get_user_reward(env: Env, user: Address, token: Address) -> UserRewardState {
        storage::user_reward(&env, &user, &token)
    }

    /// Stored accounting for `token`, as of the last update.
    pub fn get_reward_state(env: Env, token: Address) -> RewardState {
        storage::reward_state(&env, &token)
    }

    /// Current multiplier for `user`, scaled by `MULTIPLIER_PRECISION`.
    pub fn staking_multiplier(env: Env, user: Address) -> i128 {
        let position = storage::position(&env, &user);
        multiplier::staking_multiplier(
            position.amount,
            position.deposit_timestamp,
            env.ledger().timestamp(),
        )
    }

    pub fn get_multiplier_config(env: Env) -> Option<MultiplierConfig> {
        storage::multiplier_config(&env)
    }

    pub fn total_staked(env: Env) -> i128 {
        storage::total_staked(&env)
    }

    pub fn staking_token(env: Env) -> Result<Address, ContractError> {
        storage::staking_token(&env)
    }

    /// Reward tokens in distribution order; the first is the primary.
    pub fn reward_tokens(env: Env) -> Vec<Address> {
        storage::reward_tokens(&env)
    }

    pub fn release_policy(env: Env) -> Result<ReleasePolicy, ContractError> {
        storage::release_policy(&env)
    }

    pub fn get_router(env: Env) -> Option<Address> {
        storage::router(&env)
    }

    pub fn get_min_out_percentage(env: Env) -> u32 {
        storage::min_out_percentage(&env)
    }

    pub fn is_paused(env: Env) -> bool {
        storage::is_paused(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)
    }

    // ── Admin transfer (two-step) ──────────────────────────────────────────

    /// Propose a new admin address. Only the current admin can call this.
    /// The new admin must call `accept_admin` to complete the transfer.
    pub fn propose_admin(
        env: Env,
        current_admin: Address,
        new_admin: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        current_admin.require_auth();
        Self::require_admin(&env, &current_admin)?;

        env.storage().instance().set(&PENDING_ADMIN, &new_admin);

        events::publish_admin_transfer_proposed(&env, current_admin, new_admin);

        Ok(())
    }

    /// Accept the pending admin transfer. The new admin takes over the
    /// `Owner` tier; the old admin loses its tier.
    pub fn accept_admin(env: Env, new_admin: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        new_admin.require_auth();

        let pending: Address = env
            .storage()
            .instance()
            .get(&PENDING_ADMIN)
            .ok_or(ContractError::InvalidInput)?;

        if new_admin != pending {
            return Err(ContractError::Unauthorized);
        }

        let old_admin: Address = env
            .storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)?;

        env.storage().instance().set(&ADMIN, &new_admin);
        env.storage().instance().remove(&PENDING_ADMIN);
        admin_tiers::clear_tier(&env, &old_admin);
        admin_tiers::bootstrap_owner(&env, &new_admin);

        events::publish_admin_transfer_accepted(&env, old_admin, new_admin);

        Ok(())
    }

    /// Cancel a pending admin transfer. Only the current admin can call this.
    pub fn cancel_admin_transfer(env: Env, current_admin: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        current_admin.require_auth();
        Self::require_admin(&env, &current_admin)?;

        let pending: Address = env
            .storage()
            .instance()
            .get(&PENDING_ADMIN)
            .ok_or(ContractError::InvalidInput)?;

        env.storage().instance().remove(&PENDING_ADMIN);

        events::publish_admin_transfer_cancelled(&env, current_admin, pending);

        Ok(())
    }

    pub fn get_pending_admin(env: Env) -> Option<Address> {
        env.storage().instance().get(&PENDING_ADMIN)
    }

    // ── Admin tier management ────────────────────────────────────────────────

    /// Grants `tier` to `target`. Only an `Owner` may call this.
    pub fn promote_admin(
        env: Env,
        caller: Address,
        target: Address,
        tier: AdminTier,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if !admin_tiers::promote(&env, &caller, &target, tier) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    /// Removes any tier from `target`. Only an `Owner` may call this, and the
    /// current admin cannot be demoted.
    pub fn demote_admin(env: Env, caller: Address, target: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if !admin_tiers::demote(&env, &caller, &target) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    pub fn get_admin_tier(env: Env, admin: Address) -> Option<AdminTier> {
        admin_tiers::get_tier(&env, &admin)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    /// Guard for state-mutating entry points: initialized, and not already
    /// inside one. The matching `reentrancy::exit` runs on success; on error
    /// the host discards the lock with the rest of the invocation's writes.
    fn enter(env: &Env) -> Result<(), ContractError> {
        Self::require_initialized(env)?;
        if !reentrancy::enter(env) {
            return Err(ContractError::Reentrant);
        }
        storage::extend_instance_ttl(env);
        Ok(())
    }

    fn require_not_paused(env: &Env) -> Result<(), ContractError> {
        if storage::is_paused(env) {
            return Err(ContractError::Paused);
        }
        Ok(())
    }

    fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)?;
        if *caller != admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn require_tier(env: &Env, caller: &Address, min_tier: &AdminTier) -> Result<(), ContractError> {
        if !admin_tiers::has_tier(env, caller, min_tier) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    /// Shared body of `deposit` and `deposit_for_user`.
    fn credit(
        env: &Env,
        funder: &Address,
        user: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        if amount <= 0 {
            return Err(ContractError::ZeroAmount);
        }
        Self::require_not_paused(env)?;

        accounting::update_rewards(env)?;
        let mut position = storage::position(env, user);
        let new_amount = position
            .amount
            .checked_add(amount)
            .ok_or(ContractError::MathOverflow)?;
        let payouts = accounting::settle(env, user, &position, new_amount)?;

        if position.amount == 0 {
            position.deposit_timestamp = env.ledger().timestamp();
        }
        position.amount = new_amount;
        storage::set_position(env, user, &position);
        let new_total = storage::total_staked(env)
            .checked_add(amount)
            .ok_or(ContractError::MathOverflow)?;
        storage::set_total_staked(env, new_total);

        let staking_token = storage::staking_token(env)?;
        token::Client::new(env, &staking_token).transfer(
            funder,
            &env.current_contract_address(),
            &amount,
        );
        accounting::pay_out(env, user, &payouts);

        events::publish_deposited(env, funder.clone(), user.clone(), amount, new_total);
        Ok(())
    }

    fn debit_checked(
        env: &Env,
        user: &Address,
        amount: i128,
    ) -> Result<UserPosition, ContractError> {
        if amount <= 0 {
            return Err(ContractError::ZeroAmount);
        }
        let position = storage::position(env, user);
        if position.amount < amount {
            return Err(ContractError::InsufficientBalance);
        }
        Ok(position)
    }

    /// Writes `position` reduced by `amount` and the new total. A position
    /// reduced to zero loses its deposit timestamp.
    fn write_debit(
        env: &Env,
        user: &Address,
        mut position: UserPosition,
        amount: i128,
    ) -> i128 {
        position.amount -= amount;
        if position.amount == 0 {
            position.deposit_timestamp = 0;
        }
        storage::set_position(env, user, &position);
        let new_total = math::sub_floor_zero(storage::total_staked(env), amount);
        storage::set_total_staked(env, new_total);
        new_total
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────




#[cfg(test)]
mod test_migration;


#[cfg(test)]
mod test_release;
