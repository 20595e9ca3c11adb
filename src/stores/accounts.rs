use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::dto::AccountRow;
use crate::error::{Error, PersistenceError};

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: u32,
    pub name: String,
    pub balance: Decimal,
}

/// In-memory account state.
///
/// Enforces the two store invariants: no balance ever goes negative, and
/// no two accounts share a name or id. Every operation validates its
/// inputs before touching any balance, so a failed call leaves the store
/// exactly as it was.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: HashMap<u32, Account>,
    /// Highest id assigned so far. Kept as its own counter rather than
    /// derived from `accounts.len()` so id assignment stays monotonic
    /// if account deletion is ever introduced.
    last_id: u32,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the store from persisted snapshot rows.
    /// Rejects rows that would violate the store invariants.
    pub fn from_rows(rows: Vec<AccountRow>) -> Result<Self, PersistenceError> {
        let mut store = Self::new();
        for row in rows {
            let id = row.account_id;
            if id == 0 {
                return Err(PersistenceError::Corrupt(
                    "account id 0 is not a valid id".to_string(),
                ));
            }
            if row.balance < Decimal::ZERO {
                return Err(PersistenceError::Corrupt(format!(
                    "account {} has negative balance {}",
                    id, row.balance
                )));
            }
            if store.accounts.values().any(|a| a.name == row.name) {
                return Err(PersistenceError::Corrupt(format!(
                    "duplicate account name `{}`",
                    row.name
                )));
            }
            let previous = store.accounts.insert(
                id,
                Account {
                    id,
                    name: row.name,
                    balance: row.balance,
                },
            );
            if previous.is_some() {
                return Err(PersistenceError::Corrupt(format!(
                    "duplicate account id {}",
                    id
                )));
            }
            store.last_id = store.last_id.max(id);
        }
        Ok(store)
    }

    /// Creates a new account with the next sequential id.
    pub fn create(&mut self, name: &str, starting_balance: Decimal) -> Result<&Account, Error> {
        if self.accounts.values().any(|a| a.name == name) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        if starting_balance < Decimal::ZERO {
            return Err(Error::InvalidAmount);
        }
        self.last_id += 1;
        let id = self.last_id;
        Ok(self.accounts.entry(id).or_insert(Account {
            id,
            name: name.to_string(),
            balance: starting_balance,
        }))
    }

    /// Gets an account, or returns an error if it doesn't exist.
    pub fn get(&self, id: u32) -> Result<&Account, Error> {
        self.accounts.get(&id).ok_or(Error::NotFound(id))
    }

    fn get_mut(&mut self, id: u32) -> Result<&mut Account, Error> {
        self.accounts.get_mut(&id).ok_or(Error::NotFound(id))
    }

    /// Adds `amount` to the account's balance and returns the new balance.
    pub fn deposit(&mut self, id: u32, amount: Decimal) -> Result<Decimal, Error> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount);
        }
        let account = self.get_mut(id)?;
        account.balance += amount;
        Ok(account.balance)
    }

    /// Subtracts `amount` from the account's balance and returns the new
    /// balance. The funds check happens before the balance is touched.
    pub fn withdraw(&mut self, id: u32, amount: Decimal) -> Result<Decimal, Error> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount);
        }
        let account = self.get_mut(id)?;
        if amount > account.balance {
            return Err(Error::InsufficientFunds);
        }
        account.balance -= amount;
        Ok(account.balance)
    }

    /// Moves `amount` from one account to another as a single transition:
    /// both legs are validated before either balance changes, so a failed
    /// credit can never leave the source debited. Returns the source's
    /// post-transfer balance.
    pub fn transfer(&mut self, from: u32, to: u32, amount: Decimal) -> Result<Decimal, Error> {
        if from == to {
            return Err(Error::SameAccount);
        }
        if !self.accounts.contains_key(&to) {
            return Err(Error::NotFound(to));
        }
        let source = self.get(from)?;
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount);
        }
        if amount > source.balance {
            return Err(Error::InsufficientFunds);
        }

        let balance = {
            let source = self.get_mut(from)?;
            source.balance -= amount;
            source.balance
        };
        let target = self.get_mut(to)?;
        target.balance += amount;
        Ok(balance)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
