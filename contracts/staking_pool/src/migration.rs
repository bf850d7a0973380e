//! Hand-over of a settled position to another pool.
//!
//! The target's `deposit_for_user` pulls the principal from this contract, so
//! the pull is pre-authorised for exactly `amount`. A failing target is
//! caught and the principal goes back to the user in the same invocation.
//! A target's `Ok` is not taken on trust: whatever it did not actually pull
//! is refunded as well.
//!
//! Trust assumption: `deposit_for_user` on any pool credits whoever `user`
//! names. Anyone may add to a position; nobody but its owner may take from it.

use common::math;
use soroban_sdk::auth::{ContractContext, InvokerContractAuthEntry, SubContractInvocation};
use soroban_sdk::{contractclient, contracttype, token, vec, Address, Env, IntoVal, Symbol};

use crate::events;

#[contractclient(name = "MigrationTargetClient")]
pub trait MigrationTarget {
    fn staking_token(env: Env) -> Address;

    /// Pulls `amount` of the staking token from `from` and credits `user`.
    fn deposit_for_user(env: Env, from: Address, user: Address, amount: i128) -> i128;
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MigrationOutcome {
    /// The target credited the position.
    Deposited,
    /// The target rejected the deposit, or did not take all of it; whatever
    /// it left behind was returned to the user.
    Refunded,
}

/// Staking token reported by `target`, or `None` if it does not answer.
pub(crate) fn target_staking_token(env: &Env, target: &Address) -> Option<Address> {
    match MigrationTargetClient::new(env, target).try_staking_token() {
        Ok(Ok(token)) => Some(token),
        _ => None,
    }
}

/// Moves `amount` of `staking_token` into `target` on behalf of `user`.
/// Position and totals must already be written.
pub(crate) fn hand_over(
    env: &Env,
    staking_token: &Address,
    target: &Address,
    user: &Address,
    amount: i128,
) -> MigrationOutcome {
    let this = env.current_contract_address();

    env.authorize_as_current_contract(vec![
        env,
        InvokerContractAuthEntry::Contract(SubContractInvocation {
            context: ContractContext {
                contract: staking_token.clone(),
                fn_name: Symbol::new(env, "transfer"),
                args: (this.clone(), target.clone(), amount).into_val(env),
            },
            sub_invocations: vec![env],
        }),
    ]);

    let stake = token::Client::new(env, staking_token);
    let before = stake.balance(&this);

    let client = MigrationTargetClient::new(env, target);
    let accepted = matches!(client.try_deposit_for_user(&this, user, &amount), Ok(Ok(_)));

    // Only the pre-authorised transfer can move tokens out, so the balance
    // drop is at most `amount`.
    let pulled = math::sub_floor_zero(before, stake.balance(&this)).min(amount);
    let shortfall = amount - pulled;

    if pulled > 0 {
        events::publish_migrated(env, user.clone(), target.clone(), pulled);
    }
    if shortfall == 0 {
        return MigrationOutcome::Deposited;
    }

    if accepted {
        soroban_sdk::log!(env, "migration target under-pulled, refunding", target, shortfall);
    } else {
        soroban_sdk::log!(env, "migration target rejected deposit, refunding", target, shortfall);
    }
    stake.transfer(&this, user, &shortfall);
    events::publish_migration_refunded(env, user.clone(), target.clone(), shortfall);
    MigrationOutcome::Refunded
}
