//! The module contains the errors the ledger can throw.
//!
//! The errors are:
//!
//! - [`InsufficientFunds`] thrown when a withdrawal exceeds the balance.
//! - [`UserNotFound`] thrown when a user id resolves to nothing.
//!
//!  [`InsufficientFunds`]: LedgerError::InsufficientFunds
//!  [`UserNotFound`]: LedgerError::UserNotFound
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("\"{0}\" user not found!")]
    UserNotFound(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::UserNotFound(a), Self::UserNotFound(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
