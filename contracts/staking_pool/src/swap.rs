//! External AMM router used by `sweep` and `reinvest`.
//!
//! The pool grants the router an allowance for exactly `amount_in` and the
//! router pulls it with `transfer_from`. Output is measured as the balance
//! change of `token_out`, never taken from the router's return value.

use common::math;
use soroban_sdk::{contractclient, token, vec, Address, Env, Vec};

use crate::ContractError;

pub const DEFAULT_MIN_OUT_PERCENTAGE: u32 = 90;

/// Seconds a swap stays valid after submission.
pub const SWAP_DEADLINE: u64 = 300;

/// Ledgers the router allowance stays live.
const ALLOWANCE_LEDGERS: u32 = 100;

#[contractclient(name = "SwapRouterClient")]
pub trait SwapRouter {
    /// Best-effort quote along `path`; the last element is the output.
    fn get_amounts_out(env: Env, amount_in: i128, path: Vec<Address>) -> Vec<i128>;

    /// Swaps exactly `amount_in` of `path[0]` and sends at least
    /// `amount_out_min` of the last token to `to`, or fails.
    fn swap_exact_tokens_for_tokens(
        env: Env,
        amount_in: i128,
        amount_out_min: i128,
        path: Vec<Address>,
        to: Address,
        deadline: u64,
    ) -> Vec<i128>;
}

/// Slippage floor for a swap of `amount_in` along `path`.
///
/// A failed or empty quote falls back to a floor of 1, which accepts any
/// non-zero output.
pub(crate) fn min_amount_out(
    env: &Env,
    router: &Address,
    amount_in: i128,
    path: &Vec<Address>,
    percentage: u32,
) -> i128 {
    let client = SwapRouterClient::new(env, router);
    let quoted = match client.try_get_amounts_out(&amount_in, path) {
        Ok(Ok(amounts)) => amounts.last().unwrap_or(0),
        _ => 0,
    };
    if quoted <= 0 {
        soroban_sdk::log!(env, "router quote unavailable, min out falls back to 1");
        return 1;
    }
    math::percent_of(env, quoted, percentage).unwrap_or(0).max(1)
}

/// Swaps `amount_in` of `token_in` for `token_out` held by this contract.
/// Returns the amount of `token_out` received.
pub(crate) fn swap_exact(
    env: &Env,
    router: &Address,
    token_in: &Address,
    token_out: &Address,
    amount_in: i128,
    percentage: u32,
) -> Result<i128, ContractError> {
    let this = env.current_contract_address();
    let path = vec![env, token_in.clone(), token_out.clone()];
    let min_out = min_amount_out(env, router, amount_in, &path, percentage);

    let out = token::Client::new(env, token_out);
    let before = out.balance(&this);

    token::Client::new(env, token_in).approve(
        &this,
        router,
        &amount_in,
        &(env.ledger().sequence() + ALLOWANCE_LEDGERS),
    );
    let deadline = env.ledger().timestamp().saturating_add(SWAP_DEADLINE);
    SwapRouterClient::new(env, router).swap_exact_tokens_for_tokens(
        &amount_in, &min_out, &path, &this, &deadline,
    );

    let received = out
        .balance(&this)
        .checked_sub(before)
        .ok_or(ContractError::MathOverflow)?;
    if received <= 0 || received < min_out {
        return Err(ContractError::SwapFailed);
    }
    Ok(received)
}
