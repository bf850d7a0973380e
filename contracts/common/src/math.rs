//! Overflow-checked fixed-point helpers for token amounts.
//!
//! All amounts are `i128`, matching the Soroban token interface. Every helper
//! returns `None` on overflow or division by zero instead of trapping, so the
//! caller decides which error to surface.

use soroban_sdk::{Env, I256};

/// Computes `a * b / denominator`, truncating toward zero.
///
/// The product is widened to 256 bits when it does not fit in `i128`, so only
/// a quotient outside `i128` is reported as overflow.
pub fn mul_div(env: &Env, a: i128, b: i128, denominator: i128) -> Option<i128> {
    if denominator == 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return product.checked_div(denominator);
    }
    I256::from_i128(env, a)
        .mul(&I256::from_i128(env, b))
        .div(&I256::from_i128(env, denominator))
        .to_i128()
}

/// Returns `pct` percent of `value`, truncating toward zero.
pub fn percent_of(env: &Env, value: i128, pct: u32) -> Option<i128> {
    mul_div(env, value, i128::from(pct), 100)
}

/// `a - b`, floored at zero. Used where a negative difference can only come
/// from rounding dust or an external balance drop.
pub fn sub_floor_zero(a: i128, b: i128) -> i128 {
    if a > b {
        a - b
    } else {
        0
    }
}
