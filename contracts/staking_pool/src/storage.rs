use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, Vec};

use crate::multiplier::MultiplierConfig;
use crate::release::{ReleasePolicy, VestingWindow};
use crate::ContractError;

// ── Storage key constants ────────────────────────────────────────────────────

pub(crate) const ADMIN: Symbol = symbol_short!("ADMIN");
pub(crate) const PENDING_ADMIN: Symbol = symbol_short!("PEND_ADM");
pub(crate) const INITIALIZED: Symbol = symbol_short!("INIT");
const STAKING_TOKEN: Symbol = symbol_short!("STK_TOK");
const REWARD_TOKENS: Symbol = symbol_short!("RWD_TOKS");
const RELEASE_POLICY: Symbol = symbol_short!("POLICY");
const MULTIPLIER: Symbol = symbol_short!("MULT");
const TOTAL_STAKED: Symbol = symbol_short!("TOT_STK");
const ROUTER: Symbol = symbol_short!("ROUTER");
const MIN_OUT_PCT: Symbol = symbol_short!("MIN_OUT");
const PAUSED: Symbol = symbol_short!("PAUSED");

// Persistent keys are tuples:  (prefix, token) / (prefix, user[, token])
const REWARD_STATE: Symbol = symbol_short!("RWD_ST");
const USER_POSITION: Symbol = symbol_short!("USR_POS");
const USER_REWARD: Symbol = symbol_short!("USR_RWD");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

// ── Stored types ─────────────────────────────────────────────────────────────

/// Pool-wide accounting for one reward token.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardState {
    /// Cumulative reward per staked unit, scaled by `ACC_PRECISION`.
    pub acc_reward_per_share: i128,
    /// Reward balance already observed (folded, or scheduled by a gate).
    pub last_reward_balance: i128,
    /// Open vesting windows; empty unless the policy is `Vesting`.
    pub vesting: Vec<VestingWindow>,
    /// Last time a gate released anything (vesting: last distribution).
    pub last_release_time: u64,
    /// Tokens withheld from forfeited deferred payouts, not yet paid out.
    pub forgone_pool: i128,
    /// Part of the forgone pool not yet folded into `acc_extra_per_share`.
    pub forgone_pending: i128,
    pub acc_extra_per_share: i128,
}

impl RewardState {
    pub fn new(env: &Env) -> Self {
        RewardState {
            acc_reward_per_share: 0,
            last_reward_balance: 0,
            vesting: Vec::new(env),
            last_release_time: 0,
            forgone_pool: 0,
            forgone_pending: 0,
            acc_extra_per_share: 0,
        }
    }
}

/// A depositor's staked principal.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserPosition {
    pub amount: i128,
    /// Set when the position grows from zero, cleared when it returns to
    /// zero. Top-ups and partial withdrawals leave it untouched.
    pub deposit_timestamp: u64,
}

/// A depositor's settlement record for one reward token.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserRewardState {
    pub reward_debt: i128,
    /// Rewards withheld by the staking multiplier, awaiting release.
    pub payout_amount: i128,
    /// Lifetime rewards transferred out (or reinvested) for this token.
    pub paid_rewards: i128,
    pub extra_rewards_debt: i128,
    /// Multiplier at the last settlement, scaled by `MULTIPLIER_PRECISION`.
    pub last_multiplier: i128,
}

// ── Instance storage ─────────────────────────────────────────────────────────

pub(crate) fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub(crate) fn staking_token(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&STAKING_TOKEN)
        .ok_or(ContractError::NotInitialized)
}

pub(crate) fn set_staking_token(env: &Env, token: &Address) {
    env.storage().instance().set(&STAKING_TOKEN, token);
}

pub(crate) fn reward_tokens(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&REWARD_TOKENS)
        .unwrap_or(Vec::new(env))
}

pub(crate) fn set_reward_tokens(env: &Env, tokens: &Vec<Address>) {
    env.storage().instance().set(&REWARD_TOKENS, tokens);
}

/// The first reward token; the target of sweeps and the source of reinvests.
pub(crate) fn primary_reward_token(env: &Env) -> Result<Address, ContractError> {
    reward_tokens(env)
        .first()
        .ok_or(ContractError::NotInitialized)
}

pub(crate) fn release_policy(env: &Env) -> Result<ReleasePolicy, ContractError> {
    env.storage()
        .instance()
        .get(&RELEASE_POLICY)
        .ok_or(ContractError::NotInitialized)
}

pub(crate) fn set_release_policy(env: &Env, policy: &ReleasePolicy) {
    env.storage().instance().set(&RELEASE_POLICY, policy);
}

pub(crate) fn multiplier_config(env: &Env) -> Option<MultiplierConfig> {
    env.storage().instance().get(&MULTIPLIER)
}

pub(crate) fn set_multiplier_config(env: &Env, config: &MultiplierConfig) {
    env.storage().instance().set(&MULTIPLIER, config);
}

pub(crate) fn total_staked(env: &Env) -> i128 {
    env.storage().instance().get(&TOTAL_STAKED).unwrap_or(0)
}

pub(crate) fn set_total_staked(env: &Env, total: i128) {
    env.storage().instance().set(&TOTAL_STAKED, &total);
}

pub(crate) fn router(env: &Env) -> Option<Address> {
    env.storage().instance().get(&ROUTER)
}

pub(crate) fn set_router(env: &Env, router: &Address) {
    env.storage().instance().set(&ROUTER, router);
}

pub(crate) fn min_out_percentage(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&MIN_OUT_PCT)
        .unwrap_or(crate::swap::DEFAULT_MIN_OUT_PERCENTAGE)
}

pub(crate) fn set_min_out_percentage(env: &Env, percentage: u32) {
    env.storage().instance().set(&MIN_OUT_PCT, &percentage);
}

pub(crate) fn is_paused(env: &Env) -> bool {
    env.storage().instance().get(&PAUSED).unwrap_or(false)
}

pub(crate) fn set_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&PAUSED, &paused);
}

// ── Persistent storage ───────────────────────────────────────────────────────

pub(crate) fn reward_state(env: &Env, token: &Address) -> RewardState {
    env.storage()
        .persistent()
        .get(&(REWARD_STATE, token.clone()))
        .unwrap_or(RewardState::new(env))
}

pub(crate) fn has_reward_state(env: &Env, token: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&(REWARD_STATE, token.clone()))
}

pub(crate) fn set_reward_state(env: &Env, token: &Address, state: &RewardState) {
    let key = (REWARD_STATE, token.clone());
    env.storage().persistent().set(&key, state);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub(crate) fn position(env: &Env, user: &Address) -> UserPosition {
    env.storage()
        .persistent()
        .get(&(USER_POSITION, user.clone()))
        .unwrap_or_default()
}

pub(crate) fn set_position(env: &Env, user: &Address, position: &UserPosition) {
    let key = (USER_POSITION, user.clone());
    env.storage().persistent().set(&key, position);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub(crate) fn user_reward(env: &Env, user: &Address, token: &Address) -> UserRewardState {
    env.storage()
        .persistent()
        .get(&(USER_REWARD, user.clone(), token.clone()))
        .unwrap_or_default()
}

pub(crate) fn set_user_reward(
    env: &Env,
    user: &Address,
    token: &Address,
    state: &UserRewardState,
) {
    let key = (USER_REWARD, user.clone(), token.clone());
    env.storage().persistent().set(&key, state);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}
