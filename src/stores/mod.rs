//! Storage layer for the ledger engine. Provides in-memory storage for
//! account state ([`AccountStore`]).
//!
//! Current implementation is optimized for synchronous, direct memory
//! access; it performs no I/O of its own.

mod accounts;

pub use accounts::{Account, AccountStore};
