//! The ledger engine: ties the in-memory account store to the durable
//! snapshot and the audit trail.
//!
//! Every mutating operation runs to completion as one sequence:
//! validate and mutate the store, persist the full snapshot, append one
//! audit record. A validation failure leaves both memory and disk
//! untouched. Mutating methods take `&mut self`, so serving concurrent
//! callers means wrapping the whole [`Bank`] in a single
//! mutual-exclusion boundary; the critical section is the whole method,
//! never a sub-step, because a transfer touches two accounts.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::LedgerConfig;
use crate::dto::{AccountRow, Action, AuditRecord};
use crate::error::Error;
use crate::ledger::Ledger;
use crate::stores::{Account, AccountStore};

pub struct Bank {
    accounts: AccountStore,
    ledger: Ledger,
}

impl Bank {
    /// Opens the ledger at the configured paths, rebuilding the account
    /// store from the persisted snapshot if one exists.
    pub fn open(config: &LedgerConfig) -> Result<Self, Error> {
        let ledger = Ledger::new(config);
        let rows = ledger.load()?;
        let accounts = AccountStore::from_rows(rows)?;
        debug!(accounts = accounts.len(), "ledger opened");
        Ok(Self { accounts, ledger })
    }

    /// Creates a new account and returns its id.
    pub fn create_account(&mut self, name: &str, starting_balance: Decimal) -> Result<u32, Error> {
        let account = self.accounts.create(name, starting_balance)?;
        let (id, account_name) = (account.id, account.name.clone());
        self.commit(AuditRecord {
            timestamp: Utc::now(),
            action: Action::Create,
            account_id: id,
            account_name,
            target_id: None,
            target_name: None,
            amount: starting_balance,
            balance: starting_balance,
        })?;
        Ok(id)
    }

    /// Deposits into an account and returns the new balance.
    pub fn deposit(&mut self, id: u32, amount: Decimal) -> Result<Decimal, Error> {
        let balance = self.accounts.deposit(id, amount)?;
        let account_name = self.accounts.get(id)?.name.clone();
        self.commit(AuditRecord {
            timestamp: Utc::now(),
            action: Action::Deposit,
            account_id: id,
            account_name,
            target_id: None,
            target_name: None,
            amount,
            balance,
        })?;
        Ok(balance)
    }

    /// Withdraws from an account and returns the new balance.
    pub fn withdraw(&mut self, id: u32, amount: Decimal) -> Result<Decimal, Error> {
        let balance = self.accounts.withdraw(id, amount)?;
        let account_name = self.accounts.get(id)?.name.clone();
        self.commit(AuditRecord {
            timestamp: Utc::now(),
            action: Action::Withdraw,
            account_id: id,
            account_name,
            target_id: None,
            target_name: None,
            amount,
            balance,
        })?;
        Ok(balance)
    }

    /// Moves funds between two accounts as a single transition: one
    /// snapshot persist covering both updated accounts and one audit
    /// record naming both sides.
    pub fn transfer(&mut self, from: u32, to: u32, amount: Decimal) -> Result<(), Error> {
        let balance = self.accounts.transfer(from, to, amount)?;
        let account_name = self.accounts.get(from)?.name.clone();
        let target_name = self.accounts.get(to)?.name.clone();
        self.commit(AuditRecord {
            timestamp: Utc::now(),
            action: Action::Transfer,
            account_id: from,
            account_name,
            target_id: Some(to),
            target_name: Some(target_name),
            amount,
            balance,
        })?;
        Ok(())
    }

    /// Read-only lookup, no side effects.
    pub fn account(&self, id: u32) -> Result<&Account, Error> {
        self.accounts.get(id)
    }

    /// All accounts in insertion order, no side effects.
    pub fn accounts(&self) -> Vec<AccountRow> {
        self.snapshot_rows()
    }

    fn commit(&mut self, record: AuditRecord) -> Result<(), Error> {
        self.ledger.persist(&self.snapshot_rows())?;
        self.ledger.append(&record)?;
        debug!(action = ?record.action, account = record.account_id, %record.amount, "mutation committed");
        Ok(())
    }

    fn snapshot_rows(&self) -> Vec<AccountRow> {
        let mut rows: Vec<_> = self.accounts.iter().map(AccountRow::from).collect();
        // Ids are assigned sequentially and never reused, so id order is
        // insertion order.
        rows.sort_by_key(|row| row.account_id);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn bank_with_temp_dir() -> (Bank, LedgerConfig, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let config = LedgerConfig::new(
            temp.path().join("accounts.csv"),
            temp.path().join("audit.csv"),
        );
        let bank = Bank::open(&config).expect("open bank");
        (bank, config, temp)
    }

    fn read_audit(config: &LedgerConfig) -> Vec<AuditRecord> {
        let mut reader = csv::Reader::from_path(&config.audit_path).expect("open audit trail");
        reader
            .deserialize()
            .collect::<Result<_, _>>()
            .expect("audit trail parses back")
    }

    #[test]
    fn test_create_account() {
        let (mut bank, _config, _guard) = bank_with_temp_dir();
        let id = bank.create_account("Alice", dec!(100)).unwrap();
        let account = bank.account(id).unwrap();
        assert_eq!(account.name, "Alice");
        assert_eq!(account.balance, dec!(100));
    }

    #[test]
    fn test_create_duplicate_name() {
        let (mut bank, _config, _guard) = bank_with_temp_dir();
        bank.create_account("Alice", dec!(100)).unwrap();
        assert!(matches!(
            bank.create_account("Alice", dec!(50)),
            Err(Error::DuplicateName(_))
        ));
    }

    #[test]
    fn test_deposit() {
        let (mut bank, _config, _guard) = bank_with_temp_dir();
        let id = bank.create_account("Bob", dec!(50)).unwrap();
        assert_eq!(bank.deposit(id, dec!(30)).unwrap(), dec!(80));
        assert_eq!(bank.account(id).unwrap().balance, dec!(80));
    }

    #[test]
    fn test_withdraw() {
        let (mut bank, _config, _guard) = bank_with_temp_dir();
        let id = bank.create_account("Charlie", dec!(200)).unwrap();
        assert_eq!(bank.withdraw(id, dec!(50)).unwrap(), dec!(150));
    }

    #[test]
    fn test_overdraft_prevention() {
        let (mut bank, _config, _guard) = bank_with_temp_dir();
        let id = bank.create_account("David", dec!(20)).unwrap();
        assert!(matches!(
            bank.withdraw(id, dec!(30)),
            Err(Error::InsufficientFunds)
        ));
        assert_eq!(bank.account(id).unwrap().balance, dec!(20));
    }

    #[test]
    fn test_transfer() {
        let (mut bank, _config, _guard) = bank_with_temp_dir();
        let eve = bank.create_account("Eve", dec!(500)).unwrap();
        let frank = bank.create_account("Frank", dec!(100)).unwrap();
        bank.transfer(eve, frank, dec!(200)).unwrap();
        assert_eq!(bank.account(eve).unwrap().balance, dec!(300));
        assert_eq!(bank.account(frank).unwrap().balance, dec!(300));
    }

    #[test]
    fn test_transfer_insufficient_funds() {
        let (mut bank, _config, _guard) = bank_with_temp_dir();
        let grace = bank.create_account("Grace", dec!(50)).unwrap();
        let hank = bank.create_account("Hank", dec!(100)).unwrap();
        assert!(matches!(
            bank.transfer(grace, hank, dec!(100)),
            Err(Error::InsufficientFunds)
        ));
        assert_eq!(bank.account(grace).unwrap().balance, dec!(50));
        assert_eq!(bank.account(hank).unwrap().balance, dec!(100));
    }

    #[test]
    fn test_accounts_in_insertion_order() {
        let (mut bank, _config, _guard) = bank_with_temp_dir();
        bank.create_account("Zoe", dec!(10)).unwrap();
        bank.create_account("Adam", dec!(20)).unwrap();
        bank.create_account("Mia", dec!(30)).unwrap();

        let names: Vec<_> = bank.accounts().into_iter().map(|row| row.name).collect();
        assert_eq!(names, vec!["Zoe", "Adam", "Mia"]);
    }

    #[test]
    fn test_reopen_restores_state() {
        let (mut bank, config, _guard) = bank_with_temp_dir();
        let alice = bank.create_account("Alice", dec!(100)).unwrap();
        let bob = bank.create_account("Bob", dec!(200)).unwrap();
        bank.deposit(alice, dec!(50)).unwrap();
        bank.transfer(bob, alice, dec!(25)).unwrap();
        drop(bank);

        let mut reopened = Bank::open(&config).expect("reopen bank");
        assert_eq!(reopened.account(alice).unwrap().balance, dec!(175));
        assert_eq!(reopened.account(bob).unwrap().balance, dec!(175));

        // Id assignment continues the sequence after a restart.
        let next = reopened.create_account("Charlie", dec!(1)).unwrap();
        assert_eq!(next, 3);
    }

    #[test]
    fn test_audit_completeness() {
        let (mut bank, config, _guard) = bank_with_temp_dir();
        let alice = bank.create_account("Alice", dec!(100)).unwrap();
        let bob = bank.create_account("Bob", dec!(200)).unwrap();
        bank.deposit(alice, dec!(50)).unwrap();
        bank.withdraw(bob, dec!(30)).unwrap();
        bank.transfer(alice, bob, dec!(70)).unwrap();

        let records = read_audit(&config);
        assert_eq!(records.len(), 5);

        let actions: Vec<_> = records.iter().map(|r| r.action).collect();
        assert_eq!(
            actions,
            vec![
                Action::Create,
                Action::Create,
                Action::Deposit,
                Action::Withdraw,
                Action::Transfer,
            ]
        );
        assert!(
            records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp),
            "timestamps must be non-decreasing"
        );
    }

    #[test]
    fn test_audit_transfer_names_both_accounts() {
        let (mut bank, config, _guard) = bank_with_temp_dir();
        let alice = bank.create_account("Alice", dec!(100)).unwrap();
        let bob = bank.create_account("Bob", dec!(0)).unwrap();
        bank.transfer(alice, bob, dec!(40)).unwrap();

        let records = read_audit(&config);
        let transfer = records.last().unwrap();
        assert_eq!(transfer.account_id, alice);
        assert_eq!(transfer.account_name, "Alice");
        assert_eq!(transfer.target_id, Some(bob));
        assert_eq!(transfer.target_name, Some("Bob".to_string()));
        assert_eq!(transfer.amount, dec!(40));
        assert_eq!(transfer.balance, dec!(60));
    }

    #[test]
    fn test_failed_operations_are_not_audited() {
        let (mut bank, config, _guard) = bank_with_temp_dir();
        let id = bank.create_account("Alice", dec!(100)).unwrap();

        let _ = bank.deposit(id, dec!(-5));
        let _ = bank.withdraw(id, dec!(500));
        let _ = bank.transfer(id, id, dec!(10));
        let _ = bank.deposit(99, dec!(10));
        let _ = bank.create_account("Alice", dec!(1));

        let records = read_audit(&config);
        assert_eq!(records.len(), 1, "only the create should be audited");
        assert_eq!(records[0].action, Action::Create);
    }

    #[test]
    fn test_failed_operation_does_not_persist() {
        let (mut bank, config, _guard) = bank_with_temp_dir();
        let id = bank.create_account("Alice", dec!(100)).unwrap();
        let _ = bank.withdraw(id, dec!(500));
        drop(bank);

        let reopened = Bank::open(&config).expect("reopen bank");
        assert_eq!(reopened.account(id).unwrap().balance, dec!(100));
    }

    #[test]
    fn test_open_fails_on_corrupt_snapshot() {
        let temp = TempDir::new().expect("temp dir");
        let config = LedgerConfig::new(
            temp.path().join("accounts.csv"),
            temp.path().join("audit.csv"),
        );
        std::fs::write(
            &config.snapshot_path,
            "account_id,name,balance\n1,Alice,100\n1,Bob,50\n",
        )
        .unwrap();
        assert!(matches!(Bank::open(&config), Err(Error::Persistence(_))));
    }

    #[test]
    fn test_unwritable_audit_trail_surfaces_persistence_error() {
        let temp = TempDir::new().expect("temp dir");
        let config = LedgerConfig::new(
            temp.path().join("accounts.csv"),
            temp.path().join("missing-dir").join("audit.csv"),
        );
        let mut bank = Bank::open(&config).expect("open bank");
        let result = bank.create_account("Alice", dec!(100));
        assert!(matches!(result, Err(Error::Persistence(_))));
    }
}
