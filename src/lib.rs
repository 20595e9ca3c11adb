mod config;
mod dto;
mod engine;
mod error;
mod ledger;
mod stores;

pub use config::{ConfigError, LedgerConfig};
pub use dto::{AccountRow, Action, AuditRecord};
pub use engine::Bank;
pub use error::{Error, PersistenceError};
pub use ledger::Ledger;
pub use stores::{Account, AccountStore};
