use std::{
    cmp::Reverse,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use tracing::{debug, info};

use super::{LedgerBackupInfo, LedgerStorage};
use crate::{
    core::utils,
    errors::{Result, SplitError},
    ledger::Ledger,
    utils::persistence::{canonical_name, sanitize_note, write_atomic, write_file},
};

const LEDGER_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed JSON persistence for ledgers and their backups.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    ledgers_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(ledgers_dir: PathBuf, backups_dir: PathBuf) -> Result<Self> {
        Self::with_retention(ledgers_dir, backups_dir, DEFAULT_RETENTION)
    }

    pub fn with_retention(
        ledgers_dir: PathBuf,
        backups_dir: PathBuf,
        retention: usize,
    ) -> Result<Self> {
        fs::create_dir_all(&ledgers_dir)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            ledgers_dir,
            backups_dir,
            retention: retention.max(1),
        })
    }

    /// Store rooted at the application data directory.
    pub fn from_app_dir() -> Result<Self> {
        Self::new(utils::ledgers_dir(), utils::backups_root())
    }

    pub fn ledger_path(&self, name: &str) -> PathBuf {
        self.ledgers_dir
            .join(format!("{}.{}", canonical_name(name), LEDGER_EXTENSION))
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    /// Picks an unused `stamp[-n][_note].json` file name in the ledger's backup dir.
    fn next_backup_path(&self, name: &str, note: Option<&str>) -> PathBuf {
        let dir = self.backup_dir(name);
        let stamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let label = sanitize_note(note)
            .map(|label| format!("_{label}"))
            .unwrap_or_default();
        let mut prefix = stamp.clone();
        let mut sequence = 1;
        while prefix_in_use(&dir, &prefix) {
            prefix = format!("{stamp}-{sequence}");
            sequence += 1;
        }
        dir.join(format!("{prefix}{label}.{LEDGER_EXTENSION}"))
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let target = self.next_backup_path(name, None);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(path, &target)?;
        debug!(ledger = name, backup = %target.display(), "copied previous ledger file");
        self.prune_backups(name)
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        for entry in self.list_backups(name)?.into_iter().skip(self.retention) {
            fs::remove_file(&entry.path)?;
        }
        Ok(())
    }
}

impl LedgerStorage for JsonStorage {
    fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<()> {
        let path = self.ledger_path(name);
        self.backup_existing_file(name, &path)?;
        write_atomic(&path, &serde_json::to_string_pretty(ledger)?)?;
        debug!(ledger = name, path = %path.display(), "saved ledger");
        Ok(())
    }

    fn load_ledger(&self, name: &str) -> Result<Ledger> {
        let path = self.ledger_path(name);
        if !path.exists() {
            return Err(SplitError::Storage(format!("ledger `{name}` not found")));
        }
        load_ledger_from_path(&path)
    }

    fn list_ledgers(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.ledgers_dir)? {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_ledger(&self, name: &str) -> Result<()> {
        let path = self.ledger_path(name);
        if path.exists() {
            fs::remove_file(path)?;
            info!(ledger = name, "deleted ledger");
        }
        Ok(())
    }

    fn backup_ledger(
        &self,
        name: &str,
        ledger: &Ledger,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo> {
        let path = self.next_backup_path(name, note);
        write_file(&path, &serde_json::to_string_pretty(ledger)?)?;
        self.prune_backups(name)?;
        let id = path
            .file_name()
            .and_then(|file| file.to_str())
            .unwrap_or_default()
            .to_string();
        info!(ledger = name, backup = %id, "created ledger backup");
        Ok(LedgerBackupInfo {
            ledger: canonical_name(name),
            created_at: backup_timestamp(&id),
            id,
            path,
        })
    }

    fn list_backups(&self, name: &str) -> Result<Vec<LedgerBackupInfo>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let ledger = canonical_name(name);
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|file| file.to_str()) {
                entries.push(LedgerBackupInfo {
                    ledger: ledger.clone(),
                    id: file_name.to_string(),
                    created_at: backup_timestamp(file_name),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|info| Reverse(backup_order(&info.id)));
        Ok(entries)
    }

    fn restore_backup(&self, name: &str, backup_id: &str) -> Result<Ledger> {
        let source = self.backup_dir(name).join(backup_id);
        if !source.exists() {
            return Err(SplitError::Storage(format!(
                "backup `{backup_id}` of ledger `{name}` not found"
            )));
        }
        let ledger = load_ledger_from_path(&source)?;
        write_atomic(&self.ledger_path(name), &serde_json::to_string_pretty(&ledger)?)?;
        info!(ledger = name, backup = backup_id, "restored ledger backup");
        Ok(ledger)
    }
}

/// True when a backup named `prefix.json` or `prefix_<note>.json` exists.
fn prefix_in_use(dir: &Path, prefix: &str) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries.filter_map(|entry| entry.ok()).any(|entry| {
        entry
            .file_name()
            .to_str()
            .and_then(|name| name.strip_prefix(prefix))
            .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('_'))
    })
}

pub fn load_ledger_from_path(path: &Path) -> Result<Ledger> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Splits `YYYYmmdd_HHMMSSmmm[-n][_note].json` into its time and sequence.
fn backup_order(file_name: &str) -> (Option<DateTime<Utc>>, u32) {
    let sequence = file_name
        .split('_')
        .nth(1)
        .and_then(|time| time.split_once('-'))
        .and_then(|(_, rest)| rest.split(['.', '_']).next())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0);
    (backup_timestamp(file_name), sequence)
}

fn backup_timestamp(file_name: &str) -> Option<DateTime<Utc>> {
    let mut parts = file_name.split('_');
    let date = parts.next()?;
    let time: String = parts
        .next()?
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect();
    if date.len() != 8 || time.len() != 9 {
        return None;
    }
    let (seconds, millis) = time.split_at(6);
    let naive = NaiveDateTime::parse_from_str(&format!("{date}{seconds}"), "%Y%m%d%H%M%S").ok()?;
    let millis: i64 = millis.parse().ok()?;
    Some(DateTime::from_naive_utc_and_offset(naive, Utc) + Duration::milliseconds(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_names_order_by_time_then_sequence() {
        let older = backup_order("20240501_120000000.json");
        let newer = backup_order("20240501_120000001_before-trip.json");
        let same_ms = backup_order("20240501_120000001-2.json");
        assert!(older.0.is_some());
        assert!(newer > older);
        assert!(same_ms > newer);
    }

    #[test]
    fn foreign_files_have_no_timestamp() {
        assert!(backup_timestamp("notes.json").is_none());
    }
}
