//! Error handling for the application

use thiserror::Error;

use crate::shared::types::{Asset, PoolId};

/// Pool-level errors raised by swap and liquidity operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoolError {
    #[error("Insufficient funds in pool to swap: requested {requested}, available {available}")]
    InsufficientFunds { requested: f64, available: f64 },

    #[error("Proportion of deposit ({actual}) does not match the pool's proportion ({expected})")]
    ProportionMismatch { expected: f64, actual: f64 },

    #[error("Insufficient shares in pool: requested {requested}, total {available}")]
    InsufficientShares { requested: f64, available: f64 },

    #[error("Ratio undefined: pool has no eth reserve")]
    DivisionByZero,

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Cannot swap {0} into itself")]
    SameAsset(Asset),

    #[error("Invalid fee rate: {0}, expected a value in [0, 1)")]
    InvalidFeeRate(f64),
}

/// Account-level errors raised by the user bookkeeping layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccountError {
    #[error("Insufficient {asset} funds: requested {requested}, available {available}")]
    InsufficientFunds {
        asset: Asset,
        requested: f64,
        available: f64,
    },

    #[error("Insufficient pool shares: requested {requested}, held {available}")]
    InsufficientShares { requested: f64, available: f64 },

    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Arbitrage service errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArbitrageError {
    #[error("Pool not found: {0}")]
    PoolNotFound(PoolId),

    #[error("Cannot arbitrage a pool against itself")]
    SamePool,

    #[error("Opportunity is stale: expected {expected_amount} eth in, pools now suggest {current_amount}")]
    Stale {
        expected_amount: f64,
        current_amount: f64,
    },

    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Pool error: {0}")]
    PoolError(String),

    #[error("Arbitrage error: {0}")]
    ArbitrageError(String),

    #[error("Account error: {0}")]
    AccountError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<PoolError> for AppError {
    fn from(err: PoolError) -> Self {
        AppError::PoolError(err.to_string())
    }
}

impl From<ArbitrageError> for AppError {
    fn from(err: ArbitrageError) -> Self {
        AppError::ArbitrageError(err.to_string())
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        AppError::AccountError(err.to_string())
    }
}
