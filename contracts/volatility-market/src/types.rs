//! Type definitions for the volatility round market.

use soroban_sdk::{contracttype, Address};

/// Storage keys for contract data
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Oracle,
    Token,
    LiquidityParam,
    TradingWindow,
    WaitingPeriod,
    SeedQuantity,
    Reserve,
    RoundCount,
    Round(u64),
    Position(u64, Address),
}

/// The two outcomes of a round: realised volatility rose or fell.
#[contracttype]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Up,
    Down,
}

/// Resolution state stored on a round. Stays `Unresolved` until the
/// lifecycle transition commits a winning side.
#[contracttype]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Unresolved,
    Up,
    Down,
}

impl Outcome {
    /// The winning side, if the round has one.
    pub fn winning_side(&self) -> Option<Side> {
        match self {
            Outcome::Unresolved => None,
            Outcome::Up => Some(Side::Up),
            Outcome::Down => Some(Side::Down),
        }
    }
}

impl From<Side> for Outcome {
    fn from(side: Side) -> Self {
        match side {
            Side::Up => Outcome::Up,
            Side::Down => Outcome::Down,
        }
    }
}

/// One betting period. Rounds are kept forever for claims and auditing.
#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct Round {
    pub snapshot_metric: i128,    // realised vol captured at open, scaled
    pub trading_deadline: u64,    // last timestamp at which buys are accepted
    pub resolution_deadline: u64, // first timestamp at which resolve is allowed
    pub total_collateral: i128,   // all collateral paid in, incl. fees and seed
    pub total_up_tokens: i128,
    pub total_down_tokens: i128,
    pub net_up_quantity: i128,   // LMSR state, non-decreasing (buy-only)
    pub net_down_quantity: i128, // LMSR state, non-decreasing (buy-only)
    pub seed_collateral: i128,   // protocol-owned portion, recycled on first claim
    pub seed_up_tokens: i128,
    pub seed_down_tokens: i128,
    pub resolved: bool,
    pub outcome: Outcome,
    pub resolved_metric: i128,
}

impl Round {
    /// Collateral distributable to users, i.e. everything except the seed.
    pub fn user_pool(&self) -> i128 {
        self.total_collateral - self.seed_collateral
    }

    pub fn total_side_tokens(&self, side: Side) -> i128 {
        match side {
            Side::Up => self.total_up_tokens,
            Side::Down => self.total_down_tokens,
        }
    }

    pub fn seed_side_tokens(&self, side: Side) -> i128 {
        match side {
            Side::Up => self.seed_up_tokens,
            Side::Down => self.seed_down_tokens,
        }
    }

    /// Winning-side tokens held by users (seed tokens excluded).
    pub fn user_winning_tokens(&self, winning_side: Side) -> i128 {
        self.total_side_tokens(winning_side) - self.seed_side_tokens(winning_side)
    }
}

/// Per-round, per-account balances of outcome units.
#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub up_tokens: i128,
    pub down_tokens: i128,
}

impl Position {
    pub fn empty() -> Self {
        Position {
            up_tokens: 0,
            down_tokens: 0,
        }
    }

    pub fn side_tokens(&self, side: Side) -> i128 {
        match side {
            Side::Up => self.up_tokens,
            Side::Down => self.down_tokens,
        }
    }
}
