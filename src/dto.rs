use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::stores::Account;

/// One row of the persisted account snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountRow {
    pub account_id: u32,
    pub name: String,
    pub balance: Decimal,
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            name: account.name.clone(),
            balance: account.balance,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Create,
    Deposit,
    Withdraw,
    Transfer,
}

/// One immutable entry of the audit trail.
///
/// `balance` is the source account's balance after the operation.
/// `target_id` and `target_name` are populated only for transfers and
/// serialize as empty fields otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub action: Action,
    pub account_id: u32,
    pub account_name: String,
    pub target_id: Option<u32>,
    pub target_name: Option<String>,
    pub amount: Decimal,
    pub balance: Decimal,
}
