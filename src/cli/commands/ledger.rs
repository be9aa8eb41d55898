use super::{exact, subcommand, CommandDefinition};
use crate::cli::core::{usage, CommandError, CommandResult, ShellContext};
use crate::cli::output::{self, Alignment, Table};
use crate::storage::LedgerStorage;

const USAGE: &str = "ledger list
ledger open <name>
ledger delete <name>
ledger backup [note]
ledger backups
ledger restore <backup>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "ledger",
        "Switch between stored ledgers and manage their backups",
        USAGE,
        cmd_ledger,
    )]
}

fn cmd_ledger(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (action, rest) = subcommand(args, USAGE)?;
    match action.as_str() {
        "list" => list(context),
        "open" => {
            let [name] = exact(rest, "ledger open <name>")?;
            context.open_ledger(name)?;
            output::success(format!(
                "Opened ledger `{}` ({} group(s)).",
                context.ledger_name,
                context.ledger.groups.len()
            ));
            Ok(())
        }
        "delete" => {
            let [name] = exact(rest, "ledger delete <name>")?;
            if context.storage().ledger_path(name) == context.storage().ledger_path(&context.ledger_name) {
                return Err(CommandError::Message(
                    "cannot delete the open ledger; open another one first".into(),
                ));
            }
            context.storage().delete_ledger(name)?;
            output::success(format!("Deleted ledger `{name}`."));
            Ok(())
        }
        "backup" => {
            let note = (!rest.is_empty()).then(|| rest.join(" "));
            let info =
                context
                    .storage()
                    .backup_ledger(&context.ledger_name, &context.ledger, note.as_deref())?;
            output::success(format!("Backup `{}` created.", info.id));
            Ok(())
        }
        "backups" => {
            let backups = context.storage().list_backups(&context.ledger_name)?;
            if backups.is_empty() {
                output::info("No backups yet.");
                return Ok(());
            }
            let mut table = Table::new(&[("Backup", Alignment::Left), ("Created", Alignment::Left)]);
            for backup in backups {
                let created = backup
                    .created_at
                    .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "unknown".into());
                table.push(vec![backup.id, created]);
            }
            output::section(format!("Backups of {}", context.ledger_name));
            output::render_table(&table);
            Ok(())
        }
        "restore" => {
            let [backup] = exact(rest, "ledger restore <backup>")?;
            let restored = context
                .storage()
                .restore_backup(&context.ledger_name, backup)?;
            context.ledger = restored;
            output::success(format!("Restored `{}` from `{backup}`.", context.ledger_name));
            Ok(())
        }
        other => Err(usage(&format!(
            "ledger <list|open|delete|backup|backups|restore> (got `{other}`)"
        ))),
    }
}

fn list(context: &mut ShellContext) -> CommandResult {
    let names = context.storage().list_ledgers()?;
    if names.is_empty() {
        output::info("No ledgers saved yet.");
        return Ok(());
    }
    output::section("Ledgers");
    for name in names {
        let marker = if context.storage().ledger_path(&name)
            == context.storage().ledger_path(&context.ledger_name)
        {
            "*"
        } else {
            " "
        };
        output::info(format!("{marker} {name}"));
    }
    Ok(())
}
