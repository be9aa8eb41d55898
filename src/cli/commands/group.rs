use super::{exact, subcommand, CommandDefinition};
use crate::cli::core::{usage, CommandResult, ShellContext};
use crate::cli::output::{self, Alignment, Table};
use crate::core::services::GroupService;
use crate::errors::SplitError;
use crate::ledger::SplitMethod;

const USAGE: &str = "group create <name> [equal|percentage|custom]
group default <name> <equal|percentage|custom>
group delete <name>
group list";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "group",
        "Create, list and delete expense groups",
        USAGE,
        cmd_group,
    )]
}

fn cmd_group(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (action, rest) = subcommand(args, USAGE)?;
    match action.as_str() {
        "create" => create(context, rest),
        "default" => set_default(context, rest),
        "delete" => delete(context, rest),
        "list" => list(context),
        other => Err(usage(&format!("group <create|default|delete|list> (got `{other}`)"))),
    }
}

fn parse_method(raw: &str) -> Result<SplitMethod, SplitError> {
    raw.parse()
}

fn create(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (name, method) = match args {
        [name] => (*name, context.config.default_split),
        [name, method] => (*name, parse_method(method)?),
        _ => return Err(usage("group create <name> [equal|percentage|custom]")),
    };
    GroupService::create(&mut context.ledger, name, method)?;
    context.persist()?;
    output::success(format!("Group `{}` created ({method} split).", name.trim()));
    Ok(())
}

fn set_default(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name, method] = exact(args, "group default <name> <equal|percentage|custom>")?;
    let method = parse_method(method)?;
    GroupService::set_default_split(&mut context.ledger, name, method)?;
    context.persist()?;
    output::success(format!("Group `{name}` now splits bills by {method} by default."));
    Ok(())
}

fn delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name] = exact(args, "group delete <name>")?;
    let removed = GroupService::delete(&mut context.ledger, name)?;
    context.persist()?;
    output::success(format!(
        "Group `{}` deleted with {} participant(s) and {} bill(s).",
        removed.name,
        removed.participants.len(),
        removed.bills.len()
    ));
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    let groups = GroupService::list(&context.ledger);
    if groups.is_empty() {
        output::info("No groups yet. Use `group create <name>` to add one.");
        return Ok(());
    }
    let mut table = Table::new(&[
        ("Group", Alignment::Left),
        ("Default split", Alignment::Left),
        ("Participants", Alignment::Right),
        ("Bills", Alignment::Right),
        ("Total spent", Alignment::Right),
    ]);
    for group in groups {
        let spent = group.bills.iter().map(|bill| bill.amount).sum();
        table.push(vec![
            group.name.clone(),
            group.default_split.to_string(),
            group.participants.len().to_string(),
            group.bills.len().to_string(),
            context.format_amount(spent),
        ]);
    }
    output::section("Groups");
    output::render_table(&table);
    Ok(())
}
