//! Unit tests for the fixed-point exponential and logarithm helpers.

use soroban_sdk::Env;

use crate::errors::ContractError;
use crate::math::{exp_scaled, ln_scaled, mul_div, wide_mul_div, LN2_SCALED, SCALE};

/// e scaled by 10^18.
const E_SCALED: i128 = 2_718_281_828_459_045_235;

fn assert_close(actual: i128, expected: i128, tolerance: i128) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "expected {} within {} of {}, diff {}",
        actual,
        tolerance,
        expected,
        diff
    );
}

#[test]
fn exp_of_zero_is_one() {
    let env = Env::default();
    assert_eq!(exp_scaled(&env, 0, SCALE).unwrap(), SCALE);
    assert_eq!(exp_scaled(&env, 0, 100 * SCALE).unwrap(), SCALE);
}

#[test]
fn exp_of_one_approximates_e() {
    // Six-term Taylor truncation at x = 1 is off by ~2.3e-4.
    let env = Env::default();
    let value = exp_scaled(&env, 100 * SCALE, 100 * SCALE).unwrap();
    assert_close(value, E_SCALED, 500_000_000_000_000);
}

#[test]
fn exp_of_minus_one_approximates_inverse_e() {
    let env = Env::default();
    let value = exp_scaled(&env, -(100 * SCALE), 100 * SCALE).unwrap();
    assert_close(value, 367_879_441_171_442_321, 500_000_000_000_000);
}

#[test]
fn exp_clamps_low_end_to_one_unit() {
    let env = Env::default();
    assert_eq!(exp_scaled(&env, -21 * SCALE, SCALE).unwrap(), 1);
    assert_eq!(exp_scaled(&env, -1_000_000 * SCALE, SCALE).unwrap(), 1);
}

#[test]
fn exp_clamps_high_end_at_boundary() {
    let env = Env::default();
    let at_boundary = exp_scaled(&env, 20 * SCALE, SCALE).unwrap();
    let beyond = exp_scaled(&env, 25 * SCALE, SCALE).unwrap();
    assert_eq!(beyond, at_boundary);
    assert!(at_boundary > SCALE);
}

#[test]
fn exp_is_monotone_in_quantity() {
    let env = Env::default();
    let b = 100 * SCALE;
    let mut previous = 0;
    for q in [0, SCALE, 5 * SCALE, 20 * SCALE, 100 * SCALE, 500 * SCALE] {
        let value = exp_scaled(&env, q, b).unwrap();
        assert!(value >= previous, "exp not monotone at q = {}", q);
        previous = value;
    }
}

#[test]
fn exp_handles_large_liquidity_parameters() {
    // The q*SCALE intermediate goes through 256 bits, so a deep market
    // prices the same exponent ratio as a shallow one.
    let env = Env::default();
    let deep = exp_scaled(&env, 999 * SCALE, 1_000 * SCALE).unwrap();
    assert!(deep > SCALE);
    assert_eq!(deep, exp_scaled(&env, 9_990 * SCALE, 10_000 * SCALE).unwrap());

    let huge = exp_scaled(&env, 1_000_000 * SCALE, 1_000_000 * SCALE).unwrap();
    assert_close(huge, E_SCALED, 500_000_000_000_000);
}

#[test]
fn exp_rejects_non_positive_liquidity() {
    let env = Env::default();
    assert_eq!(exp_scaled(&env, SCALE, 0), Err(ContractError::Overflow));
    assert_eq!(exp_scaled(&env, SCALE, -SCALE), Err(ContractError::Overflow));
}

#[test]
fn ln_below_scale_is_zero() {
    assert_eq!(ln_scaled(0).unwrap(), 0);
    assert_eq!(ln_scaled(SCALE / 2).unwrap(), 0);
    assert_eq!(ln_scaled(SCALE).unwrap(), 0);
}

#[test]
fn ln_of_two_is_exact() {
    // One halving lands exactly on SCALE, so only the accumulated ln(2)
    // constant remains.
    assert_eq!(ln_scaled(2 * SCALE).unwrap(), LN2_SCALED);
}

#[test]
fn ln_of_e_approximates_one() {
    let value = ln_scaled(E_SCALED).unwrap();
    assert_close(value, SCALE, 2_000_000_000_000_000);
}

#[test]
fn ln_is_monotone() {
    let mut previous = -1;
    for x in [
        SCALE,
        3 * SCALE / 2,
        2 * SCALE,
        5 * SCALE,
        100 * SCALE,
        1_000_000 * SCALE,
    ] {
        let value = ln_scaled(x).unwrap();
        assert!(value >= previous, "ln not monotone at x = {}", x);
        previous = value;
    }
}

#[test]
fn mul_div_is_exact_for_clean_ratios() {
    assert_eq!(mul_div(10 * SCALE, 3 * SCALE, 2 * SCALE).unwrap(), 15 * SCALE);
    assert_eq!(mul_div(7, 9, 3).unwrap(), 21);
    assert_eq!(mul_div(0, SCALE, SCALE).unwrap(), 0);
}

#[test]
fn mul_div_floors_like_direct_division() {
    // Small operands can be checked against the naive product.
    for a in [1i128, 17, 1_000, 99_999] {
        for b in [1i128, 3, 12_345] {
            for denom in [2i128, 7, 1_000] {
                assert_eq!(mul_div(a, b, denom).unwrap(), a * b / denom);
            }
        }
    }
}

#[test]
fn mul_div_rejects_bad_operands() {
    assert_eq!(mul_div(SCALE, SCALE, 0), Err(ContractError::Overflow));
    assert_eq!(mul_div(-1, SCALE, SCALE), Err(ContractError::Overflow));
    assert_eq!(mul_div(SCALE, -1, SCALE), Err(ContractError::Overflow));
}

#[test]
fn wide_mul_div_matches_narrow_on_small_operands() {
    let env = Env::default();
    assert_eq!(
        wide_mul_div(&env, 10 * SCALE, 3 * SCALE, 2 * SCALE).unwrap(),
        mul_div(10 * SCALE, 3 * SCALE, 2 * SCALE).unwrap()
    );
}

#[test]
fn wide_mul_div_survives_products_beyond_i128() {
    let env = Env::default();
    let big = 1_000_000_000_000 * SCALE; // 10^30
    assert_eq!(wide_mul_div(&env, big, big, big).unwrap(), big);
}

#[test]
fn wide_mul_div_rejects_bad_operands() {
    let env = Env::default();
    assert_eq!(
        wide_mul_div(&env, SCALE, SCALE, 0),
        Err(ContractError::Overflow)
    );
    assert_eq!(
        wide_mul_div(&env, -1, SCALE, SCALE),
        Err(ContractError::Overflow)
    );
}
