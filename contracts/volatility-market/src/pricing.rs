//! LMSR cost function and spot-price queries.
//!
//! C(q_up, q_down) = b * ln(exp(q_up/b) + exp(q_down/b)). Buying is priced
//! as the cost difference between the post-trade and pre-trade state, which
//! is always non-negative because C is monotonically increasing in each
//! argument.

use soroban_sdk::Env;

use crate::errors::ContractError;
use crate::math::{self, SCALE};

/// LMSR cost of the state (q_up, q_down) for liquidity parameter b, scaled.
pub fn cost(env: &Env, q_up: i128, q_down: i128, b: i128) -> Result<i128, ContractError> {
    let e_up = math::exp_scaled(env, q_up, b)?;
    let e_down = math::exp_scaled(env, q_down, b)?;
    let sum = e_up.checked_add(e_down).ok_or(ContractError::Overflow)?;
    let ln = math::ln_scaled(sum)?;
    math::mul_div(b, ln, SCALE)
}

/// Pre-fee cost of buying `amount` units on top of the current state.
pub fn buy_cost(
    env: &Env,
    q_before: i128,
    q_other: i128,
    amount: i128,
    b: i128,
) -> Result<i128, ContractError> {
    let q_after = q_before.checked_add(amount).ok_or(ContractError::Overflow)?;
    let before = cost(env, q_before, q_other, b)?;
    let after = cost(env, q_after, q_other, b)?;
    after.checked_sub(before).ok_or(ContractError::Overflow)
}

/// Spot price of the Up outcome: exp(q_up/b) / (exp(q_up/b) + exp(q_down/b)).
///
/// Always in [0, SCALE]; together with `price_down` sums to SCALE within one
/// raw unit of rounding.
pub fn price_up(env: &Env, q_up: i128, q_down: i128, b: i128) -> Result<i128, ContractError> {
    let e_up = math::exp_scaled(env, q_up, b)?;
    let e_down = math::exp_scaled(env, q_down, b)?;
    let sum = e_up.checked_add(e_down).ok_or(ContractError::Overflow)?;
    math::wide_mul_div(env, e_up, SCALE, sum)
}

/// Spot price of the Down outcome, the mirror of `price_up`.
pub fn price_down(env: &Env, q_up: i128, q_down: i128, b: i128) -> Result<i128, ContractError> {
    let e_up = math::exp_scaled(env, q_up, b)?;
    let e_down = math::exp_scaled(env, q_down, b)?;
    let sum = e_up.checked_add(e_down).ok_or(ContractError::Overflow)?;
    math::wide_mul_div(env, e_down, SCALE, sum)
}
