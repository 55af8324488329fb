//! Stake-ledger errors.

use agij_types::{Address, Role};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StakeError {
    #[error("insufficient {role} stake for {address}: need {needed}, available {available}")]
    InsufficientStake {
        address: Address,
        role: Role,
        needed: u128,
        available: u128,
    },

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("arithmetic overflow in stake accounting")]
    Overflow,

    #[error("{0}")]
    Other(String),
}
