//! Shell context, dispatch and CLI error types.

use std::io;

use strsim::levenshtein;
use thiserror::Error;
use tracing::warn;

use crate::{
    config::{Config, ConfigError, ConfigManager},
    errors::SplitError,
    ledger::Ledger,
    money::{format_money, CurrencyCode, Money, NumberStyle},
    storage::{JsonStorage, LedgerStorage},
};

use super::commands::{self, CommandDefinition, CommandRegistry};
use super::output;

const DEFAULT_LEDGER: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] SplitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] SplitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("exit requested")]
    ExitRequested,
}

/// State shared by every command of one shell session.
pub struct ShellContext {
    pub(crate) running: bool,
    mode: CliMode,
    pub(crate) ledger: Ledger,
    pub(crate) ledger_name: String,
    pub(crate) config: Config,
    config_manager: ConfigManager,
    storage: JsonStorage,
    registry: &'static CommandRegistry,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::from_app_dir();
        let config = config_manager.load()?;
        let storage = JsonStorage::from_app_dir()?;
        Self::with_parts(mode, config_manager, config, storage)
    }

    pub(crate) fn with_parts(
        mode: CliMode,
        config_manager: ConfigManager,
        config: Config,
        storage: JsonStorage,
    ) -> Result<Self, CliError> {
        let ledger_name = config
            .last_opened_ledger
            .clone()
            .unwrap_or_else(|| DEFAULT_LEDGER.to_string());
        let ledger = if storage.ledger_path(&ledger_name).exists() {
            storage.load_ledger(&ledger_name)?
        } else {
            Ledger::new(&ledger_name)
        };
        let context = Self {
            running: true,
            mode,
            ledger,
            ledger_name,
            config,
            config_manager,
            storage,
            registry: commands::registry(),
        };
        context.apply_color_preference();
        Ok(context)
    }

    /// Colors follow the config in the interactive shell and stay off for scripts.
    pub(crate) fn apply_color_preference(&self) {
        output::set_color_enabled(self.config.ui_color_enabled && self.mode == CliMode::Interactive);
    }

    pub(crate) fn prompt(&self) -> String {
        format!("xsplittr [{}]> ", self.ledger_name)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn registry(&self) -> &'static CommandRegistry {
        self.registry
    }

    pub(crate) fn command(&self, name: &str) -> Option<&'static CommandDefinition> {
        self.registry.get(name)
    }

    /// Writes the ledger and remembers it as the last opened one.
    pub(crate) fn persist(&mut self) -> CommandResult {
        self.storage.save_ledger(&self.ledger_name, &self.ledger)?;
        if self.config.last_opened_ledger.as_deref() != Some(self.ledger_name.as_str()) {
            self.config.last_opened_ledger = Some(self.ledger_name.clone());
            self.persist_config()?;
        }
        Ok(())
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn storage(&self) -> &JsonStorage {
        &self.storage
    }

    /// Switches to `name`, creating an empty ledger when none is stored yet.
    pub(crate) fn open_ledger(&mut self, name: &str) -> CommandResult {
        let name = name.trim();
        if name.is_empty() {
            return Err(CommandError::InvalidArguments("ledger name cannot be empty".into()));
        }
        self.ledger = if self.storage.ledger_path(name).exists() {
            self.storage.load_ledger(name)?
        } else {
            Ledger::new(name)
        };
        self.ledger_name = name.to_string();
        self.persist()
    }

    pub(crate) fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    pub(crate) fn format_amount(&self, amount: Money) -> String {
        format_money(
            amount,
            &CurrencyCode::new(self.config.currency.as_str()),
            NumberStyle::for_locale(&self.config.locale),
        )
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.registry.get(command).map(|definition| definition.handler) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help <command>` for usage details.");
            }
            other => {
                warn!(error = %other, "command failed");
                output::error(other);
            }
        }
    }
}

/// Wraps a usage string into an argument error.
pub(crate) fn usage(text: &str) -> CommandError {
    CommandError::InvalidArguments(format!("Usage: {text}"))
}
