//! Persistence of whole ledgers.

pub mod json_backend;

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::{errors::Result, ledger::Ledger};

pub use json_backend::JsonStorage;

/// A stored snapshot of a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerBackupInfo {
    pub ledger: String,
    /// File name of the snapshot, used to restore it.
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub path: PathBuf,
}

/// Backend able to store ledgers by name and keep snapshots of them.
pub trait LedgerStorage {
    fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<()>;
    fn load_ledger(&self, name: &str) -> Result<Ledger>;
    fn list_ledgers(&self) -> Result<Vec<String>>;
    fn delete_ledger(&self, name: &str) -> Result<()>;
    fn backup_ledger(
        &self,
        name: &str,
        ledger: &Ledger,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo>;
    /// Snapshots of `name`, newest first.
    fn list_backups(&self, name: &str) -> Result<Vec<LedgerBackupInfo>>;
    fn restore_backup(&self, name: &str, backup_id: &str) -> Result<Ledger>;
}
