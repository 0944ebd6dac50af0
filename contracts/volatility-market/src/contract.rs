//! Core contract implementation for the volatility round market.
//!
//! Lifecycle per round: Trading -> Pending -> Resolved, no reverse
//! transitions. At most one round is unresolved at any time, while any
//! number of resolved rounds coexist in history for late claims. All
//! bookkeeping commits before outbound token transfers.

use soroban_sdk::{contract, contractimpl, symbol_short, token, Address, Env};

use crate::errors::ContractError;
use crate::fees;
use crate::math::{self, SCALE};
use crate::oracle::RegimeOracleClient;
use crate::pricing;
use crate::types::{DataKey, Outcome, Position, Round, Side};

const DEFAULT_TRADING_WINDOW: u64 = 3_600;
const DEFAULT_WAITING_PERIOD: u64 = 86_400;
const DEFAULT_SEED_QUANTITY: i128 = 5 * SCALE;

#[contract]
pub struct VolatilityMarketContract;

#[contractimpl]
impl VolatilityMarketContract {
    /// Initializes the contract with operator, oracle, collateral token and
    /// LMSR liquidity parameter (one-time only).
    pub fn initialize(
        env: Env,
        admin: Address,
        oracle: Address,
        token: Address,
        liquidity_param: i128,
    ) -> Result<(), ContractError> {
        admin.require_auth();

        if env.storage().persistent().has(&DataKey::Admin) {
            return Err(ContractError::AlreadyInitialized);
        }
        if liquidity_param <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        env.storage().persistent().set(&DataKey::Admin, &admin);
        env.storage().persistent().set(&DataKey::Oracle, &oracle);
        env.storage().persistent().set(&DataKey::Token, &token);
        env.storage()
            .persistent()
            .set(&DataKey::LiquidityParam, &liquidity_param);

        // Default window and seed values
        env.storage()
            .persistent()
            .set(&DataKey::TradingWindow, &DEFAULT_TRADING_WINDOW);
        env.storage()
            .persistent()
            .set(&DataKey::WaitingPeriod, &DEFAULT_WAITING_PERIOD);
        env.storage()
            .persistent()
            .set(&DataKey::SeedQuantity, &DEFAULT_SEED_QUANTITY);
        env.storage().persistent().set(&DataKey::Reserve, &0i128);

        Ok(())
    }

    /// Opens a new round. The first round is operator-restricted; afterwards
    /// anyone may open one as long as the latest round is resolved. Captures
    /// the oracle snapshot, sets deadlines and seeds best-effort.
    pub fn open_round(env: Env, caller: Address) -> Result<u64, ContractError> {
        caller.require_auth();

        let admin: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Admin)
            .ok_or(ContractError::NotInitialized)?;

        let count: u64 = env
            .storage()
            .persistent()
            .get(&DataKey::RoundCount)
            .unwrap_or(0);

        if count == 0 {
            if caller != admin {
                return Err(ContractError::NotOperator);
            }
        } else {
            let latest: Round = env
                .storage()
                .persistent()
                .get(&DataKey::Round(count))
                .ok_or(ContractError::InvalidRound)?;
            if !latest.resolved {
                return Err(ContractError::PriorRoundUnresolved);
            }
        }

        let oracle: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Oracle)
            .ok_or(ContractError::NotInitialized)?;
        let snapshot_metric = RegimeOracleClient::new(&env, &oracle).realised_metric();

        let trading_window: u64 = env
            .storage()
            .persistent()
            .get(&DataKey::TradingWindow)
            .unwrap_or(DEFAULT_TRADING_WINDOW);
        let waiting_period: u64 = env
            .storage()
            .persistent()
            .get(&DataKey::WaitingPeriod)
            .unwrap_or(DEFAULT_WAITING_PERIOD);

        let now = env.ledger().timestamp();
        let trading_deadline = now
            .checked_add(trading_window)
            .ok_or(ContractError::Overflow)?;
        let resolution_deadline = trading_deadline
            .checked_add(waiting_period)
            .ok_or(ContractError::Overflow)?;

        let round_id = count.checked_add(1).ok_or(ContractError::Overflow)?;
        let mut round = Round {
            snapshot_metric,
            trading_deadline,
            resolution_deadline,
            total_collateral: 0,
            total_up_tokens: 0,
            total_down_tokens: 0,
            net_up_quantity: 0,
            net_down_quantity: 0,
            seed_collateral: 0,
            seed_up_tokens: 0,
            seed_down_tokens: 0,
            resolved: false,
            outcome: Outcome::Unresolved,
            resolved_metric: 0,
        };

        #[allow(deprecated)]
        env.events().publish(
            (symbol_short!("round"), symbol_short!("opened")),
            (round_id, snapshot_metric, trading_deadline, resolution_deadline),
        );

        Self::_seed_round(&env, round_id, &mut round)?;

        env.storage()
            .persistent()
            .set(&DataKey::Round(round_id), &round);
        env.storage().persistent().set(&DataKey::RoundCount, &round_id);

        Ok(round_id)
    }

    /// Buys `amount` outcome units of `side` in the given round.
    ///
    /// `max_payment` is the buyer's payable ceiling: the quoted total
    /// (raw LMSR cost plus entropy fee) must not exceed it, and exactly the
    /// quote is transferred in, so overpayment never leaves the buyer.
    /// Returns the total charged.
    pub fn buy(
        env: Env,
        buyer: Address,
        round_id: u64,
        side: Side,
        amount: i128,
        max_payment: i128,
    ) -> Result<i128, ContractError> {
        buyer.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let mut round: Round = env
            .storage()
            .persistent()
            .get(&DataKey::Round(round_id))
            .ok_or(ContractError::InvalidRound)?;

        if round.resolved || env.ledger().timestamp() > round.trading_deadline {
            return Err(ContractError::TradingClosed);
        }

        let b: i128 = env
            .storage()
            .persistent()
            .get(&DataKey::LiquidityParam)
            .ok_or(ContractError::NotInitialized)?;

        let raw_cost = match side {
            Side::Up => {
                pricing::buy_cost(&env, round.net_up_quantity, round.net_down_quantity, amount, b)?
            }
            Side::Down => {
                pricing::buy_cost(&env, round.net_down_quantity, round.net_up_quantity, amount, b)?
            }
        };

        let oracle: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Oracle)
            .ok_or(ContractError::NotInitialized)?;
        let entropy = RegimeOracleClient::new(&env, &oracle).uncertainty();
        let rate = fees::fee_rate(entropy);
        let fee = fees::fee_amount(raw_cost, rate)?;
        let total = raw_cost.checked_add(fee).ok_or(ContractError::Overflow)?;

        // Dust purchases whose quote floors to zero would mint claimable
        // tokens for free; refuse them instead.
        if total <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if total > max_payment {
            return Err(ContractError::InsufficientPayment);
        }

        match side {
            Side::Up => {
                round.net_up_quantity = round
                    .net_up_quantity
                    .checked_add(amount)
                    .ok_or(ContractError::Overflow)?;
                round.total_up_tokens = round
                    .total_up_tokens
                    .checked_add(amount)
                    .ok_or(ContractError::Overflow)?;
            }
            Side::Down => {
                round.net_down_quantity = round
                    .net_down_quantity
                    .checked_add(amount)
                    .ok_or(ContractError::Overflow)?;
                round.total_down_tokens = round
                    .total_down_tokens
                    .checked_add(amount)
                    .ok_or(ContractError::Overflow)?;
            }
        }
        round.total_collateral = round
            .total_collateral
            .checked_add(total)
            .ok_or(ContractError::Overflow)?;

        let position_key = DataKey::Position(round_id, buyer.clone());
        let mut position: Position = env
            .storage()
            .persistent()
            .get(&position_key)
            .unwrap_or(Position::empty());
        match side {
            Side::Up => {
                position.up_tokens = position
                    .up_tokens
                    .checked_add(amount)
                    .ok_or(ContractError::Overflow)?;
            }
            Side::Down => {
                position.down_tokens = position
                    .down_tokens
                    .checked_add(amount)
                    .ok_or(ContractError::Overflow)?;
            }
        }

        env.storage().persistent().set(&position_key, &position);
        env.storage()
            .persistent()
            .set(&DataKey::Round(round_id), &round);

        let token_addr: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Token)
            .ok_or(ContractError::NotInitialized)?;
        token::Client::new(&env, &token_addr).transfer(
            &buyer,
            &env.current_contract_address(),
            &total,
        );

        #[allow(deprecated)]
        env.events().publish(
            (symbol_short!("trade"), symbol_short!("buy")),
            (round_id, buyer, side, amount, raw_cost, fee, total),
        );

        Ok(total)
    }

    /// Resolves the round against a fresh oracle reading (anyone may call
    /// once the resolution deadline has passed). Up wins iff the fresh
    /// metric exceeds the snapshot.
    pub fn resolve(env: Env, round_id: u64) -> Result<Side, ContractError> {
        let mut round: Round = env
            .storage()
            .persistent()
            .get(&DataKey::Round(round_id))
            .ok_or(ContractError::InvalidRound)?;

        if round.resolved {
            return Err(ContractError::RoundAlreadyResolved);
        }
        if env.ledger().timestamp() < round.resolution_deadline {
            return Err(ContractError::TooEarlyToResolve);
        }

        let oracle: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Oracle)
            .ok_or(ContractError::NotInitialized)?;
        let resolved_metric = RegimeOracleClient::new(&env, &oracle).realised_metric();

        let outcome = if resolved_metric > round.snapshot_metric {
            Side::Up
        } else {
            Side::Down
        };

        round.resolved = true;
        round.outcome = outcome.into();
        round.resolved_metric = resolved_metric;
        env.storage()
            .persistent()
            .set(&DataKey::Round(round_id), &round);

        #[allow(deprecated)]
        env.events().publish(
            (symbol_short!("round"), symbol_short!("resolved")),
            (round_id, outcome, round.snapshot_metric, resolved_metric),
        );

        Ok(outcome)
    }

    /// Pays out the claimant's winning-side tokens proportionally from the
    /// user pool (seed collateral excluded). The first claim of a round
    /// recycles the seed collateral back into the reserve. Returns the
    /// payout amount.
    pub fn claim(env: Env, claimant: Address, round_id: u64) -> Result<i128, ContractError> {
        claimant.require_auth();

        let mut round: Round = env
            .storage()
            .persistent()
            .get(&DataKey::Round(round_id))
            .ok_or(ContractError::InvalidRound)?;

        if !round.resolved {
            return Err(ContractError::RoundNotResolved);
        }
        let outcome = round
            .outcome
            .winning_side()
            .ok_or(ContractError::RoundNotResolved)?;

        let position_key = DataKey::Position(round_id, claimant.clone());
        let position: Position = env
            .storage()
            .persistent()
            .get(&position_key)
            .ok_or(ContractError::InsufficientBalance)?;

        let tokens = position.side_tokens(outcome);
        if tokens <= 0 {
            return Err(ContractError::InsufficientBalance);
        }

        // A winning side made up entirely of seed tokens leaves nothing
        // distributable to users; the claim is denied rather than paying
        // the seed its own collateral back.
        let user_winning = round.user_winning_tokens(outcome);
        if user_winning <= 0 {
            return Err(ContractError::InsufficientBalance);
        }

        let user_pool = round.user_pool();
        let mut payout = math::wide_mul_div(&env, tokens, user_pool, user_winning)?;

        // Effects before the outbound transfer: zero the position, recycle
        // the seed exactly once. Removing the seed from both seed_collateral
        // and total_collateral keeps user_pool invariant for later claims.
        env.storage().persistent().remove(&position_key);

        let mut seed_returned: i128 = 0;
        if round.seed_collateral > 0 {
            seed_returned = round.seed_collateral;
            let reserve: i128 = env
                .storage()
                .persistent()
                .get(&DataKey::Reserve)
                .unwrap_or(0);
            let new_reserve = reserve
                .checked_add(seed_returned)
                .ok_or(ContractError::Overflow)?;
            env.storage().persistent().set(&DataKey::Reserve, &new_reserve);

            round.total_collateral = round
                .total_collateral
                .checked_sub(seed_returned)
                .ok_or(ContractError::Overflow)?;
            round.seed_collateral = 0;
        }
        env.storage()
            .persistent()
            .set(&DataKey::Round(round_id), &round);

        let token_addr: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Token)
            .ok_or(ContractError::NotInitialized)?;
        let token_client = token::Client::new(&env, &token_addr);
        let contract_addr = env.current_contract_address();

        // Cap at the spendable balance (reserve excluded) to absorb any
        // rounding drift accumulated across claims.
        let reserve: i128 = env
            .storage()
            .persistent()
            .get(&DataKey::Reserve)
            .unwrap_or(0);
        let mut spendable = token_client
            .balance(&contract_addr)
            .checked_sub(reserve)
            .ok_or(ContractError::Overflow)?;
        if spendable < 0 {
            spendable = 0;
        }
        if payout > spendable {
            payout = spendable;
        }

        if payout > 0 {
            token_client.transfer(&contract_addr, &claimant, &payout);
        }

        #[allow(deprecated)]
        env.events().publish(
            (symbol_short!("claim"), symbol_short!("paid")),
            (round_id, claimant, payout, seed_returned),
        );

        Ok(payout)
    }

    /// Buys an equal quantity of both sides from the symmetric zero state
    /// using reserve funds, keeping the opening price exactly 50/50.
    /// Skipped entirely if the reserve cannot cover the cost delta:
    /// seeding is best-effort, never a precondition for trading.
    pub(crate) fn _seed_round(
        env: &Env,
        round_id: u64,
        round: &mut Round,
    ) -> Result<(), ContractError> {
        let seed_quantity: i128 = env
            .storage()
            .persistent()
            .get(&DataKey::SeedQuantity)
            .unwrap_or(DEFAULT_SEED_QUANTITY);
        if seed_quantity <= 0 {
            return Ok(());
        }

        let b: i128 = env
            .storage()
            .persistent()
            .get(&DataKey::LiquidityParam)
            .ok_or(ContractError::NotInitialized)?;

        let cost_before = pricing::cost(env, 0, 0, b)?;
        let cost_after = pricing::cost(env, seed_quantity, seed_quantity, b)?;
        let seed_cost = cost_after
            .checked_sub(cost_before)
            .ok_or(ContractError::Overflow)?;

        let reserve: i128 = env
            .storage()
            .persistent()
            .get(&DataKey::Reserve)
            .unwrap_or(0);
        if seed_cost > reserve {
            return Ok(());
        }

        let new_reserve = reserve
            .checked_sub(seed_cost)
            .ok_or(ContractError::Overflow)?;
        env.storage().persistent().set(&DataKey::Reserve, &new_reserve);

        round.net_up_quantity = round
            .net_up_quantity
            .checked_add(seed_quantity)
            .ok_or(ContractError::Overflow)?;
        round.net_down_quantity = round
            .net_down_quantity
            .checked_add(seed_quantity)
            .ok_or(ContractError::Overflow)?;
        round.total_up_tokens = round
            .total_up_tokens
            .checked_add(seed_quantity)
            .ok_or(ContractError::Overflow)?;
        round.total_down_tokens = round
            .total_down_tokens
            .checked_add(seed_quantity)
            .ok_or(ContractError::Overflow)?;
        round.seed_up_tokens = seed_quantity;
        round.seed_down_tokens = seed_quantity;
        round.seed_collateral = seed_cost;
        round.total_collateral = round
            .total_collateral
            .checked_add(seed_cost)
            .ok_or(ContractError::Overflow)?;

        #[allow(deprecated)]
        env.events().publish(
            (symbol_short!("round"), symbol_short!("seeded")),
            (round_id, seed_quantity, seed_cost),
        );

        Ok(())
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Returns the round snapshot, if the round exists.
    pub fn get_round(env: Env, round_id: u64) -> Option<Round> {
        env.storage().persistent().get(&DataKey::Round(round_id))
    }

    /// Id of the most recently opened round (0 if none).
    pub fn current_round_id(env: Env) -> u64 {
        env.storage()
            .persistent()
            .get(&DataKey::RoundCount)
            .unwrap_or(0)
    }

    /// Spot price of the Up outcome for the given round, scaled.
    pub fn price_up(env: Env, round_id: u64) -> Result<i128, ContractError> {
        let round: Round = env
            .storage()
            .persistent()
            .get(&DataKey::Round(round_id))
            .ok_or(ContractError::InvalidRound)?;
        let b: i128 = env
            .storage()
            .persistent()
            .get(&DataKey::LiquidityParam)
            .ok_or(ContractError::NotInitialized)?;
        pricing::price_up(&env, round.net_up_quantity, round.net_down_quantity, b)
    }

    /// Spot price of the Down outcome for the given round, scaled.
    pub fn price_down(env: Env, round_id: u64) -> Result<i128, ContractError> {
        let round: Round = env
            .storage()
            .persistent()
            .get(&DataKey::Round(round_id))
            .ok_or(ContractError::InvalidRound)?;
        let b: i128 = env
            .storage()
            .persistent()
            .get(&DataKey::LiquidityParam)
            .ok_or(ContractError::NotInitialized)?;
        pricing::price_down(&env, round.net_up_quantity, round.net_down_quantity, b)
    }

    /// Current fee rate implied by the oracle's entropy, scaled.
    pub fn current_fee(env: Env) -> Result<i128, ContractError> {
        let oracle: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Oracle)
            .ok_or(ContractError::NotInitialized)?;
        let entropy = RegimeOracleClient::new(&env, &oracle).uncertainty();
        Ok(fees::fee_rate(entropy))
    }

    /// Pass-through of the oracle's staleness advisory.
    pub fn oracle_stale(env: Env, max_age: u64) -> Result<bool, ContractError> {
        let oracle: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Oracle)
            .ok_or(ContractError::NotInitialized)?;
        Ok(RegimeOracleClient::new(&env, &oracle).is_stale(&max_age))
    }

    /// Returns the account's position in the given round, if any.
    pub fn get_position(env: Env, round_id: u64, account: Address) -> Option<Position> {
        env.storage()
            .persistent()
            .get(&DataKey::Position(round_id, account))
    }

    /// Protocol-owned reserve balance available for seeding.
    pub fn get_reserve(env: Env) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::Reserve)
            .unwrap_or(0)
    }

    pub fn get_admin(env: Env) -> Option<Address> {
        env.storage().persistent().get(&DataKey::Admin)
    }

    pub fn get_oracle(env: Env) -> Option<Address> {
        env.storage().persistent().get(&DataKey::Oracle)
    }

    // ------------------------------------------------------------------
    // Operator administration
    // ------------------------------------------------------------------

    /// Transfers the operator role (admin only).
    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), ContractError> {
        let admin: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Admin)
            .ok_or(ContractError::NotInitialized)?;
        admin.require_auth();

        env.storage().persistent().set(&DataKey::Admin, &new_admin);

        #[allow(deprecated)]
        env.events().publish(
            (symbol_short!("admin"), symbol_short!("updated")),
            new_admin,
        );

        Ok(())
    }

    /// Sets the trading window and waiting period in seconds (admin only).
    /// Applies to rounds opened afterwards.
    pub fn set_windows(
        env: Env,
        trading_window: u64,
        waiting_period: u64,
    ) -> Result<(), ContractError> {
        let admin: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Admin)
            .ok_or(ContractError::NotInitialized)?;
        admin.require_auth();

        if trading_window == 0 || waiting_period == 0 {
            return Err(ContractError::InvalidDuration);
        }

        env.storage()
            .persistent()
            .set(&DataKey::TradingWindow, &trading_window);
        env.storage()
            .persistent()
            .set(&DataKey::WaitingPeriod, &waiting_period);

        #[allow(deprecated)]
        env.events().publish(
            (symbol_short!("windows"), symbol_short!("updated")),
            (trading_window, waiting_period),
        );

        Ok(())
    }

    /// Sets the per-side seed quantity for future rounds (admin only).
    /// Zero disables seeding.
    pub fn set_seed_quantity(env: Env, quantity: i128) -> Result<(), ContractError> {
        let admin: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Admin)
            .ok_or(ContractError::NotInitialized)?;
        admin.require_auth();

        if quantity < 0 {
            return Err(ContractError::InvalidAmount);
        }

        env.storage()
            .persistent()
            .set(&DataKey::SeedQuantity, &quantity);

        #[allow(deprecated)]
        env.events().publish(
            (symbol_short!("seed"), symbol_short!("updated")),
            quantity,
        );

        Ok(())
    }

    /// Moves collateral from the admin into the seeding reserve (admin only).
    pub fn deposit_reserve(env: Env, amount: i128) -> Result<(), ContractError> {
        let admin: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Admin)
            .ok_or(ContractError::NotInitialized)?;
        admin.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let reserve: i128 = env
            .storage()
            .persistent()
            .get(&DataKey::Reserve)
            .unwrap_or(0);
        let new_reserve = reserve.checked_add(amount).ok_or(ContractError::Overflow)?;
        env.storage().persistent().set(&DataKey::Reserve, &new_reserve);

        let token_addr: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Token)
            .ok_or(ContractError::NotInitialized)?;
        token::Client::new(&env, &token_addr).transfer(
            &admin,
            &env.current_contract_address(),
            &amount,
        );

        #[allow(deprecated)]
        env.events().publish(
            (symbol_short!("reserve"), symbol_short!("deposit")),
            (amount, new_reserve),
        );

        Ok(())
    }

    /// Withdraws unspent reserve collateral to `to` (admin only).
    pub fn withdraw_reserve(env: Env, to: Address, amount: i128) -> Result<(), ContractError> {
        let admin: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Admin)
            .ok_or(ContractError::NotInitialized)?;
        admin.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let reserve: i128 = env
            .storage()
            .persistent()
            .get(&DataKey::Reserve)
            .unwrap_or(0);
        if amount > reserve {
            return Err(ContractError::InsufficientReserve);
        }
        let new_reserve = reserve.checked_sub(amount).ok_or(ContractError::Overflow)?;
        env.storage().persistent().set(&DataKey::Reserve, &new_reserve);

        let token_addr: Address = env
            .storage()
            .persistent()
            .get(&DataKey::Token)
            .ok_or(ContractError::NotInitialized)?;
        token::Client::new(&env, &token_addr).transfer(
            &env.current_contract_address(),
            &to,
            &amount,
        );

        #[allow(deprecated)]
        env.events().publish(
            (symbol_short!("reserve"), symbol_short!("withdraw")),
            (to, amount, new_reserve),
        );

        Ok(())
    }
}
