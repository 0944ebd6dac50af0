//! Error codes for the volatility market contract.

use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    NotOperator = 3,
    InvalidRound = 4,
    PriorRoundUnresolved = 5,
    TradingClosed = 6,
    TooEarlyToResolve = 7,
    RoundAlreadyResolved = 8,
    RoundNotResolved = 9,
    InsufficientPayment = 10,
    InvalidAmount = 11,
    InvalidDuration = 12,
    InsufficientBalance = 13,
    InsufficientReserve = 14,
    Overflow = 15,
}
