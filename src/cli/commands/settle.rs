use super::CommandDefinition;
use crate::cli::core::{usage, CommandResult, ShellContext};
use crate::cli::output::{self, Alignment, Table};
use crate::settlement::{calculate_settlements, SettlementStrategy};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "balances",
            "Show what each participant is owed or owes",
            "balances <group>",
            cmd_balances,
        ),
        CommandDefinition::new(
            "settle",
            "List the payments that settle a group",
            "settle <group> [greedy|pairwise]",
            cmd_settle,
        ),
    ]
}

fn cmd_balances(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [group] = args else {
        return Err(usage("balances <group>"));
    };
    let balances = context.config.engine().balances(&context.ledger, group)?;
    let mut table = Table::new(&[("Participant", Alignment::Left), ("Balance", Alignment::Right)]);
    for (participant, amount) in &balances {
        table.push(vec![participant.to_string(), context.format_amount(*amount)]);
    }
    output::section(format!("Balances of {group}"));
    output::render_table(&table);
    Ok(())
}

fn cmd_settle(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (group, strategy) = match args {
        [group] => (*group, context.config.settlement_strategy),
        [group, strategy] => (*group, strategy.parse::<SettlementStrategy>()?),
        _ => return Err(usage("settle <group> [greedy|pairwise]")),
    };
    let transfers = calculate_settlements(&context.ledger, group, strategy)?;
    output::section(format!("Settlement of {group} ({strategy})"));
    if transfers.is_empty() {
        output::info("Everyone is settled up.");
        return Ok(());
    }
    for transfer in &transfers {
        output::info(format!(
            "{} owes {} {}",
            transfer.debtor,
            transfer.creditor,
            context.format_amount(transfer.amount)
        ));
    }
    Ok(())
}
