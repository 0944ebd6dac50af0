//! Round-based LMSR market maker for binary volatility bets.
//!
//! Each round snapshots a realised-volatility reading from an external
//! regime oracle, lets users buy Up/Down outcome units priced by the
//! Logarithmic Market Scoring Rule, and after a waiting period resolves
//! against a fresh reading. The trading fee widens with the oracle's
//! reported prediction entropy.
#![no_std]

pub mod contract;
pub mod errors;
pub mod fees;
pub mod math;
pub mod oracle;
pub mod pricing;
pub mod types;

#[cfg(test)]
mod tests;
