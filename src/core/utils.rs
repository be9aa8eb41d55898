use dirs::home_dir;
use std::{env, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".xsplittr";
const LEDGER_DIR: &str = "ledgers";
const BACKUP_DIR: &str = "backups";
const CONFIG_FILE: &str = "config.json";
const CONFIG_BACKUP_DIR: &str = "config_backups";

/// Returns the application data directory, `XSPLITTR_HOME` or `~/.xsplittr`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("XSPLITTR_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn ledgers_dir() -> PathBuf {
    app_data_dir().join(LEDGER_DIR)
}

/// Base directory for ledger backup snapshots.
pub fn backups_root() -> PathBuf {
    app_data_dir().join(BACKUP_DIR)
}

pub fn config_file() -> PathBuf {
    app_data_dir().join(CONFIG_FILE)
}

pub fn config_backups_dir() -> PathBuf {
    app_data_dir().join(CONFIG_BACKUP_DIR)
}
