//! Durability and audit for the account store.
//!
//! The ledger owns two independent files:
//! - the snapshot store: one CSV row per account, fully rewritten on
//!   every mutation via a temporary file and an atomic rename, so the
//!   file on disk is always either the old state or the new state;
//! - the audit trail: one CSV row per successful mutation, append-only,
//!   with the column header written exactly once when the file is first
//!   created.
//!
//! The ledger never mutates accounts; it only consumes snapshot rows.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::LedgerConfig;
use crate::dto::{AccountRow, AuditRecord};
use crate::error::PersistenceError;

const TMP_SUFFIX: &str = "tmp";

pub struct Ledger {
    snapshot_path: PathBuf,
    audit_path: PathBuf,
}

impl Ledger {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            snapshot_path: config.snapshot_path.clone(),
            audit_path: config.audit_path.clone(),
        }
    }

    /// Reads the persisted snapshot, or an empty set if none exists yet.
    /// Malformed rows are propagated as errors, never skipped.
    pub fn load(&self) -> Result<Vec<AccountRow>, PersistenceError> {
        if !self.snapshot_path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.snapshot_path)?;
        let rows = reader.deserialize().collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Overwrites the snapshot store with the given accounts.
    ///
    /// Writes to a sibling temporary file first and renames it into
    /// place, so an interrupted write never corrupts the next load.
    pub fn persist(&self, rows: &[AccountRow]) -> Result<(), PersistenceError> {
        let tmp = tmp_path(&self.snapshot_path);
        let mut writer = csv::Writer::from_path(&tmp)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        drop(writer);
        fs::rename(&tmp, &self.snapshot_path)?;
        debug!(accounts = rows.len(), "snapshot persisted");
        Ok(())
    }

    /// Appends one audit record to the trail, preserving arrival order.
    /// The column header is written only when the trail is new or empty.
    pub fn append(&self, record: &AuditRecord) -> Result<(), PersistenceError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.audit_path)?;
        let write_header = file.metadata()?.len() == 0;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        debug!(action = ?record.action, account = record.account_id, "audit record appended");
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
