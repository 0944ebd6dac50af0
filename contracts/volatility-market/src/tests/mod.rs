//! Test modules for the volatility round market contract.

extern crate std;

mod math;
mod support;
