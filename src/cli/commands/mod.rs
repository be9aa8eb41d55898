use std::collections::HashMap;

use once_cell::sync::Lazy;

pub mod bill;
pub mod config;
pub mod group;
pub mod ledger;
pub mod participant;
pub mod settle;
pub mod system;

use crate::cli::core::{usage, CommandError, CommandResult, ShellContext};

static REGISTRY: Lazy<CommandRegistry> = Lazy::new(|| CommandRegistry::new(all_definitions()));

pub(crate) fn registry() -> &'static CommandRegistry {
    &REGISTRY
}

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(group::definitions());
    commands.extend(participant::definitions());
    commands.extend(bill::definitions());
    commands.extend(settle::definitions());
    commands.extend(ledger::definitions());
    commands.extend(config::definitions());
    commands.extend(system::definitions());
    commands
}

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    /// One usage line per sub-command.
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

/// Splits `args` into a lowercase sub-command and its remaining arguments.
pub(crate) fn subcommand<'a>(
    args: &'a [&'a str],
    usage_text: &str,
) -> Result<(String, &'a [&'a str]), CommandError> {
    match args.split_first() {
        Some((first, rest)) => Ok((first.to_lowercase(), rest)),
        None => Err(usage(usage_text)),
    }
}

/// Returns exactly `N` arguments or a usage error.
pub(crate) fn exact<'a, const N: usize>(
    args: &[&'a str],
    usage_text: &str,
) -> Result<[&'a str; N], CommandError> {
    <[&str; N]>::try_from(args).map_err(|_| usage(usage_text))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        cli::{
            core::{CliMode, LoopControl},
            shell::handle_line,
        },
        config::{Config, ConfigManager},
        settlement::calculate_balances,
        storage::{JsonStorage, LedgerStorage},
    };

    fn context(dir: &TempDir) -> ShellContext {
        let manager = ConfigManager::with_base_dir(dir.path().join("config")).expect("config");
        let storage = JsonStorage::new(dir.path().join("ledgers"), dir.path().join("backups"))
            .expect("storage");
        ShellContext::with_parts(CliMode::Script, manager, Config::default(), storage)
            .expect("context")
    }

    fn run(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
        handle_line(context, line)
    }

    #[test]
    fn every_command_is_registered_once() {
        let names: Vec<&str> = registry().names().collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(names.len(), unique.len());
        for expected in ["group", "participant", "bill", "balances", "settle", "config"] {
            assert!(registry().get(expected).is_some(), "missing {expected}");
        }
    }

    #[test]
    fn trip_flow_updates_ledger_and_autosaves() {
        let dir = TempDir::new().expect("tempdir");
        let mut ctx = context(&dir);
        for line in [
            "group create Trip",
            "participant add Trip A Ann Lee",
            "participant add Trip B Ben Cho",
            "participant add Trip C Cat Diaz",
            "bill add Trip Dinner 90 2024-05-01 A",
            "bill add Trip Taxi 50 2024-05-02 B percentage A=50 B=30 C=20",
        ] {
            run(&mut ctx, line).expect(line);
        }
        let balances = calculate_balances(&ctx.ledger, "Trip").expect("balances");
        assert_eq!(balances["C"].minor_units(), -4000);

        let storage = JsonStorage::new(dir.path().join("ledgers"), dir.path().join("backups"))
            .expect("storage");
        let saved = storage.load_ledger("default").expect("saved ledger");
        assert_eq!(saved.bill_count(), 2);
    }

    #[test]
    fn invalid_bill_is_reported_without_changes() {
        let dir = TempDir::new().expect("tempdir");
        let mut ctx = context(&dir);
        run(&mut ctx, "group create Trip").expect("group");
        run(&mut ctx, "participant add Trip A Ann Lee").expect("participant");
        let err = run(&mut ctx, "bill add Trip Lunch 20 2024-05-01 Z").unwrap_err();
        assert!(matches!(
            err,
            CommandError::Core(crate::errors::SplitError::InvalidPayer(_))
        ));
        assert_eq!(ctx.ledger.bill_count(), 0);
    }

    #[test]
    fn exit_stops_the_shell() {
        let dir = TempDir::new().expect("tempdir");
        let mut ctx = context(&dir);
        assert_eq!(run(&mut ctx, "exit").expect("exit"), LoopControl::Exit);
        assert!(!ctx.running);
    }
}
