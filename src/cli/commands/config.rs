use super::{exact, CommandDefinition};
use crate::cli::core::{usage, CommandResult, ShellContext};
use crate::cli::output::{self, Alignment, Table};
use crate::config::CONFIG_KEYS;

const USAGE: &str = "config show
config set <key> <value>
config backup [note]
config backups
config restore <name>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "config",
        "View and change preferences",
        USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return show(context);
    };
    match action.to_lowercase().as_str() {
        "show" => show(context),
        "set" => {
            let [key, value @ ..] = rest else {
                return Err(usage("config set <key> <value>"));
            };
            if value.is_empty() {
                return Err(usage(&format!("config set <{}> <value>", CONFIG_KEYS.join("|"))));
            }
            context.config.set(key, &value.join(" "))?;
            context.persist_config()?;
            context.apply_color_preference();
            output::success(format!("`{key}` updated."));
            Ok(())
        }
        "backup" => {
            let note = (!rest.is_empty()).then(|| rest.join(" "));
            let name = context
                .config_manager()
                .backup(&context.config, note.as_deref())?;
            output::success(format!("Configuration backup `{name}` created."));
            Ok(())
        }
        "backups" => {
            let names = context.config_manager().list_backups()?;
            if names.is_empty() {
                output::info("No configuration backups yet.");
            }
            for name in names {
                output::info(format!("  {name}"));
            }
            Ok(())
        }
        "restore" => {
            let [name] = exact(rest, "config restore <name>")?;
            context.config = context.config_manager().restore(name)?;
            context.persist_config()?;
            context.apply_color_preference();
            output::success(format!("Configuration restored from `{name}`."));
            Ok(())
        }
        other => Err(usage(&format!(
            "config <show|set|backup|backups|restore> (got `{other}`)"
        ))),
    }
}

fn show(context: &mut ShellContext) -> CommandResult {
    let config = &context.config;
    let mut table = Table::new(&[("Key", Alignment::Left), ("Value", Alignment::Left)]);
    let rows = [
        ("locale", config.locale.clone()),
        ("currency", config.currency.clone()),
        (
            "rounding_increment_cents",
            config.rounding_increment_cents.minor_units().to_string(),
        ),
        ("settlement_strategy", config.settlement_strategy.to_string()),
        ("default_split", config.default_split.to_string()),
        ("ui_color_enabled", config.ui_color_enabled.to_string()),
    ];
    for (key, value) in rows {
        table.push(vec![key.to_string(), value]);
    }
    output::section("Configuration");
    output::render_table(&table);
    output::info(format!(
        "Stored at {}",
        context.config_manager().config_path().display()
    ));
    Ok(())
}
