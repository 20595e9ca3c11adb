//! Domain-specific errors for the ledger engine.
//!
//! Contains error variants for common failure cases like:
//! - Account-related errors (not found, duplicate name)
//! - Amount validation errors (non-positive amount, insufficient funds)
//! - Persistence errors (snapshot store or audit trail I/O)
//!
//! Validation errors are business logic failures and are always raised
//! before any state is mutated. Persistence errors are raised after the
//! in-memory mutation and never swallowed, since a mutation that is not
//! reflected on disk and in the audit trail must be visible to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("account {0} not found")]
    NotFound(u32),
    #[error("account name `{0}` is already taken")]
    DuplicateName(String),
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("cannot transfer to the same account")]
    SameAccount,
    #[error("persistence failure: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Failures from the snapshot store or the audit trail.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}
