//! Entropy-driven trading fee.
//!
//! The regime oracle reports the entropy of its two-outcome prediction in
//! [0, ln 2]. A confident prediction (entropy near 0) keeps the fee at the
//! minimum; a coin-flip prediction (entropy at ln 2) pushes it to the
//! maximum. Linear in between, saturating at both ends.

use crate::errors::ContractError;
use crate::math::{self, LN2_SCALED, SCALE};

/// 0.5% of SCALE, charged when the oracle is fully confident.
pub const MIN_FEE_RATE: i128 = SCALE / 200;

/// 5% of SCALE, charged when the prediction is a coin flip.
pub const MAX_FEE_RATE: i128 = SCALE / 20;

/// Entropy of the uniform two-outcome distribution, ln(2) scaled.
pub const MAX_ENTROPY: i128 = LN2_SCALED;

/// Scaled fee rate for the given uncertainty score.
pub fn fee_rate(entropy: i128) -> i128 {
    if entropy <= 0 {
        return MIN_FEE_RATE;
    }
    if entropy >= MAX_ENTROPY {
        return MAX_FEE_RATE;
    }
    MIN_FEE_RATE + (MAX_FEE_RATE - MIN_FEE_RATE) * entropy / MAX_ENTROPY
}

/// Fee charged on top of a raw LMSR cost: raw_cost * rate / SCALE.
pub fn fee_amount(raw_cost: i128, rate: i128) -> Result<i128, ContractError> {
    math::mul_div(raw_cost, rate, SCALE)
}
