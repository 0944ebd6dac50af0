//! Shared fixtures: a mock regime oracle, a Stellar asset used as
//! collateral, and a freshly initialized market contract.

use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::{contract, contractimpl, symbol_short, token, Address, Env};

use crate::contract::{VolatilityMarketContract, VolatilityMarketContractClient};
use crate::math::SCALE;

/// Liquidity parameter used across the tests (b = 100.0).
pub const B: i128 = 100 * SCALE;

/// Minimal oracle double with settable readings.
#[contract]
pub struct MockRegimeOracle;

#[contractimpl]
impl MockRegimeOracle {
    pub fn set_reading(env: Env, metric: i128, entropy: i128) {
        env.storage().persistent().set(&symbol_short!("metric"), &metric);
        env.storage().persistent().set(&symbol_short!("entropy"), &entropy);
    }

    pub fn set_stale(env: Env, stale: bool) {
        env.storage().persistent().set(&symbol_short!("stale"), &stale);
    }

    pub fn realised_metric(env: Env) -> i128 {
        env.storage()
            .persistent()
            .get(&symbol_short!("metric"))
            .unwrap_or(0)
    }

    pub fn uncertainty(env: Env) -> i128 {
        env.storage()
            .persistent()
            .get(&symbol_short!("entropy"))
            .unwrap_or(0)
    }

    pub fn is_stale(env: Env, _max_age: u64) -> bool {
        env.storage()
            .persistent()
            .get(&symbol_short!("stale"))
            .unwrap_or(false)
    }
}

pub struct Setup {
    pub admin: Address,
    pub market: Address,
    pub oracle: Address,
    pub token: Address,
}

/// Registers oracle, collateral asset and market, and initializes the
/// market with liquidity parameter `B`.
pub fn setup(env: &Env) -> Setup {
    env.mock_all_auths();

    let admin = Address::generate(env);
    let oracle = env.register(MockRegimeOracle, ());
    let token = env.register_stellar_asset_contract_v2(admin.clone()).address();
    let market = env.register(VolatilityMarketContract, ());

    VolatilityMarketContractClient::new(env, &market).initialize(&admin, &oracle, &token, &B);

    Setup {
        admin,
        market,
        oracle,
        token,
    }
}

pub fn market<'a>(env: &'a Env, s: &Setup) -> VolatilityMarketContractClient<'a> {
    VolatilityMarketContractClient::new(env, &s.market)
}

pub fn set_reading(env: &Env, s: &Setup, metric: i128, entropy: i128) {
    MockRegimeOracleClient::new(env, &s.oracle).set_reading(&metric, &entropy);
}

pub fn mint(env: &Env, s: &Setup, to: &Address, amount: i128) {
    token::StellarAssetClient::new(env, &s.token).mint(to, &amount);
}

pub fn balance(env: &Env, s: &Setup, who: &Address) -> i128 {
    token::Client::new(env, &s.token).balance(who)
}

/// Mints collateral to the admin and deposits it into the seeding reserve.
pub fn fund_reserve(env: &Env, s: &Setup, amount: i128) {
    mint(env, s, &s.admin, amount);
    market(env, s).deposit_reserve(&amount);
}

pub fn set_time(env: &Env, timestamp: u64) {
    env.ledger().with_mut(|li| {
        li.timestamp = timestamp;
    });
}
