//! Domain layer - core business logic and entities

pub mod account;
pub mod arbitrage;
pub mod pool;
