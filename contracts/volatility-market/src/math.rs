//! Fixed-point exponential and logarithm helpers for the LMSR curve.
//!
//! All scaled values use `SCALE` (10^18) as 1.0 and are carried in `i128`.
//! Every function here is pure and deterministic: the same inputs produce
//! bit-identical outputs on every replica, which the replicated ledger
//! requires. Arithmetic never wraps; any overflow aborts with
//! `ContractError::Overflow`.

use soroban_sdk::{Env, U256};

use crate::errors::ContractError;

/// Fixed-point scale: one unit of 1.0.
pub const SCALE: i128 = 1_000_000_000_000_000_000;

/// ln(2) * SCALE, accumulated during the halving phase of `ln_scaled`.
pub const LN2_SCALED: i128 = 693_147_180_559_945_309;

/// The scaled exponent is clamped to +/- 20.0 to keep the Taylor terms
/// inside i128 range.
const EXP_INPUT_CLAMP: i128 = 20 * SCALE;

/// Number of Taylor terms beyond the leading 1 in `exp_scaled`.
const EXP_TAYLOR_TERMS: i128 = 6;

/// Exact floor(a * b / denom) for non-negative operands.
///
/// Splits `a` into quotient and remainder against `denom` so the partial
/// products stay inside i128 for the operand ranges of the Taylor loop
/// (x clamped to 20*SCALE keeps every term product below i128::MAX).
/// floor(a*b/denom) = (a/denom)*b + ((a%denom)*b)/denom holds exactly
/// under integer division.
pub fn mul_div(a: i128, b: i128, denom: i128) -> Result<i128, ContractError> {
    if a < 0 || b < 0 || denom <= 0 {
        return Err(ContractError::Overflow);
    }
    let quot = a / denom;
    let rem = a % denom;
    let high = quot.checked_mul(b).ok_or(ContractError::Overflow)?;
    let low = rem.checked_mul(b).ok_or(ContractError::Overflow)? / denom;
    high.checked_add(low).ok_or(ContractError::Overflow)
}

/// floor(a * b / denom) through 256-bit intermediates.
///
/// Used where the product can exceed i128 (spot prices, payout shares).
/// Deterministic like the narrow variant; the host U256 ops are exact.
pub fn wide_mul_div(env: &Env, a: i128, b: i128, denom: i128) -> Result<i128, ContractError> {
    if a < 0 || b < 0 || denom <= 0 {
        return Err(ContractError::Overflow);
    }
    let product = U256::from_u128(env, a as u128).mul(&U256::from_u128(env, b as u128));
    let quot = product.div(&U256::from_u128(env, denom as u128));
    let value = quot.to_u128().ok_or(ContractError::Overflow)?;
    i128::try_from(value).map_err(|_| ContractError::Overflow)
}

/// exp(q / b) scaled by `SCALE`.
///
/// The scaled exponent x = q*SCALE/b is clamped to [-20*SCALE, 20*SCALE]:
/// below the low clamp the result is 1 raw unit, above the high clamp the
/// series is evaluated at the boundary. The q*SCALE product goes through
/// 256-bit intermediates so arbitrarily large liquidity parameters stay
/// inside range. Implemented as the six-term Taylor expansion
/// 1 + x + x^2/2! + ... + x^6/6! with signed terms for negative exponents.
/// Truncation error grows with |x|; callers are expected to keep per-round
/// traded quantity small relative to `b` (a parameterization contract, not
/// enforced here).
pub fn exp_scaled(env: &Env, q: i128, b: i128) -> Result<i128, ContractError> {
    if b <= 0 {
        return Err(ContractError::Overflow);
    }
    let negative = q < 0;
    let magnitude = q.checked_abs().ok_or(ContractError::Overflow)?;

    let x = if magnitude / b >= EXP_INPUT_CLAMP / SCALE {
        if negative {
            return Ok(1);
        }
        EXP_INPUT_CLAMP
    } else {
        wide_mul_div(env, magnitude, SCALE, b)?
    };

    let mut sum = SCALE;
    let mut term = SCALE;
    for k in 1..=EXP_TAYLOR_TERMS {
        let factor = k.checked_mul(SCALE).ok_or(ContractError::Overflow)?;
        term = mul_div(term, x, factor)?;
        if negative && k % 2 == 1 {
            sum = sum.checked_sub(term).ok_or(ContractError::Overflow)?;
        } else {
            sum = sum.checked_add(term).ok_or(ContractError::Overflow)?;
        }
    }

    Ok(if sum < 1 { 1 } else { sum })
}

/// ln(x / SCALE) scaled by `SCALE`, for x >= SCALE. Returns 0 for x <= SCALE.
///
/// Halves x down into [SCALE, 2*SCALE) while accumulating LN2_SCALED, then
/// applies the four-term Taylor series of ln(1 + y) on the remainder
/// y in [0, SCALE).
pub fn ln_scaled(x: i128) -> Result<i128, ContractError> {
    if x <= SCALE {
        return Ok(0);
    }

    let mut v = x;
    let mut result: i128 = 0;
    while v >= 2 * SCALE {
        v /= 2;
        result = result.checked_add(LN2_SCALED).ok_or(ContractError::Overflow)?;
    }

    let y = v - SCALE;
    let y2 = y.checked_mul(y).ok_or(ContractError::Overflow)? / SCALE;
    let y3 = y2.checked_mul(y).ok_or(ContractError::Overflow)? / SCALE;
    let y4 = y3.checked_mul(y).ok_or(ContractError::Overflow)? / SCALE;

    result = result.checked_add(y).ok_or(ContractError::Overflow)?;
    result = result.checked_sub(y2 / 2).ok_or(ContractError::Overflow)?;
    result = result.checked_add(y3 / 3).ok_or(ContractError::Overflow)?;
    result = result.checked_sub(y4 / 4).ok_or(ContractError::Overflow)?;

    Ok(result)
}
