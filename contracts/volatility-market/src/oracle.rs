//! Interface boundary to the external regime-classification oracle.
//!
//! The oracle contract is maintained by a separate relay process; this
//! market only ever polls it. `is_stale` is advisory: the core never
//! refuses a stale reading itself, callers of open/resolve are expected to
//! gate on it off-chain.

use soroban_sdk::{contractclient, Env};

#[contractclient(name = "RegimeOracleClient")]
pub trait RegimeOracle {
    /// Latest realised-volatility reading, scaled by 10^18.
    fn realised_metric(env: Env) -> i128;

    /// Entropy of the current regime prediction in [0, ln 2], scaled.
    fn uncertainty(env: Env) -> i128;

    /// Whether the latest reading is older than `max_age` seconds.
    fn is_stale(env: Env, max_age: u64) -> bool;
}
