use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::{exact, subcommand, CommandDefinition};
use crate::cli::core::{usage, CommandError, CommandResult, ShellContext};
use crate::cli::output::{self, Alignment, Table};
use crate::core::services::{BillService, NewBill};
use crate::ledger::{ParticipantId, SplitMethod};
use crate::money::Money;
use crate::split::Split;

const RECENT_LIMIT: usize = 5;
const ADD_USAGE: &str = "bill add <group> <title> <amount> <YYYY-MM-DD> <payer> \
[equal [nick..] | percentage nick=pct.. | custom nick=amount..]";
const USAGE: &str = "bill add <group> <title> <amount> <YYYY-MM-DD> <payer> [equal [nick..] | percentage nick=pct.. | custom nick=amount..]
bill remove <group> <title>
bill list <group>
bill recent";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "bill",
        "Record, list and remove bills",
        USAGE,
        cmd_bill,
    )]
}

fn cmd_bill(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (action, rest) = subcommand(args, USAGE)?;
    match action.as_str() {
        "add" => add(context, rest),
        "remove" => {
            let [group, title] = exact(rest, "bill remove <group> <title>")?;
            let removed = BillService::remove(&mut context.ledger, group, title)?;
            context.persist()?;
            output::success(format!(
                "Removed bill `{}` ({}).",
                removed.title,
                context.format_amount(removed.amount)
            ));
            Ok(())
        }
        "list" => {
            let [group] = exact(rest, "bill list <group>")?;
            list(context, group)
        }
        "recent" => recent(context),
        other => Err(usage(&format!(
            "bill <add|remove|list|recent> (got `{other}`)"
        ))),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [group, title, amount, date, payer, split_args @ ..] = args else {
        return Err(usage(ADD_USAGE));
    };
    let amount: Money = amount.parse()?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("`{date}` is not a date (use YYYY-MM-DD)"))
    })?;
    let default_split = context
        .ledger
        .group(group)
        .map(|group| group.default_split)
        .unwrap_or_default();
    let (split, participants) = parse_split(split_args, default_split)?;

    let mut new_bill = NewBill::new(*title, amount, date, *payer, split);
    new_bill.participants = participants;
    let calculator = context.config.calculator();
    let bill = BillService::record(&mut context.ledger, group, new_bill, &calculator)?.clone();
    context.persist()?;

    output::success(format!(
        "Recorded `{}` for {} paid by {} ({} split).",
        bill.title,
        context.format_amount(bill.amount),
        bill.payer,
        bill.split_method
    ));
    for share in &bill.shares {
        output::info(format!(
            "  {:<12} {}",
            share.participant.as_str(),
            context.format_amount(share.amount)
        ));
    }
    Ok(())
}

/// Reads the optional split section of `bill add`.
fn parse_split(
    args: &[&str],
    default: SplitMethod,
) -> Result<(Split, Option<Vec<ParticipantId>>), CommandError> {
    let (method, entries) = match args.split_first() {
        Some((method, entries)) => (method.parse::<SplitMethod>()?, entries),
        None => (default, &[][..]),
    };
    match method {
        SplitMethod::Equal => {
            let participants = (!entries.is_empty())
                .then(|| entries.iter().map(|nick| ParticipantId::new(*nick)).collect());
            Ok((Split::Equal, participants))
        }
        SplitMethod::Percentage => {
            let weights = parse_entries(entries, "percentage", |raw| {
                raw.parse::<f64>().map_err(|_| {
                    CommandError::InvalidArguments(format!("`{raw}` is not a percentage"))
                })
            })?;
            Ok((Split::Percentage(weights), None))
        }
        SplitMethod::Custom => {
            let amounts =
                parse_entries(entries, "custom", |raw| Ok(raw.parse::<Money>()?))?;
            Ok((Split::Custom(amounts), None))
        }
    }
}

fn parse_entries<T>(
    entries: &[&str],
    method: &str,
    parse_value: impl Fn(&str) -> Result<T, CommandError>,
) -> Result<BTreeMap<ParticipantId, T>, CommandError> {
    if entries.is_empty() {
        return Err(CommandError::InvalidArguments(format!(
            "a {method} split needs nick=value entries"
        )));
    }
    let mut parsed = BTreeMap::new();
    for entry in entries {
        let (nick, value) = entry.split_once('=').ok_or_else(|| {
            CommandError::InvalidArguments(format!("expected nick=value, got `{entry}`"))
        })?;
        let nick = ParticipantId::new(nick);
        if parsed.insert(nick.clone(), parse_value(value.trim())?).is_some() {
            return Err(CommandError::InvalidArguments(format!(
                "`{nick}` appears twice in the split"
            )));
        }
    }
    Ok(parsed)
}

fn list(context: &mut ShellContext, group: &str) -> CommandResult {
    let bills = BillService::list(&context.ledger, group)?;
    if bills.is_empty() {
        output::info(format!("No bills recorded in `{group}`."));
        return Ok(());
    }
    let mut table = Table::new(&[
        ("Date", Alignment::Left),
        ("Title", Alignment::Left),
        ("Payer", Alignment::Left),
        ("Split", Alignment::Left),
        ("Amount", Alignment::Right),
    ]);
    for bill in bills {
        table.push(vec![
            bill.date.format("%Y-%m-%d").to_string(),
            bill.title.clone(),
            bill.payer.to_string(),
            bill.split_method.to_string(),
            context.format_amount(bill.amount),
        ]);
    }
    output::section(format!("Bills of {group}"));
    output::render_table(&table);
    Ok(())
}

fn recent(context: &mut ShellContext) -> CommandResult {
    let bills = BillService::recent(&context.ledger, RECENT_LIMIT);
    if bills.is_empty() {
        output::info("No bills recorded yet.");
        return Ok(());
    }
    let mut table = Table::new(&[
        ("Group", Alignment::Left),
        ("Date", Alignment::Left),
        ("Title", Alignment::Left),
        ("Payer", Alignment::Left),
        ("Amount", Alignment::Right),
    ]);
    for entry in bills {
        table.push(vec![
            entry.group.to_string(),
            entry.bill.date.format("%Y-%m-%d").to_string(),
            entry.bill.title.clone(),
            entry.bill.payer.to_string(),
            context.format_amount(entry.bill.amount),
        ]);
    }
    output::section("Recent bills");
    output::render_table(&table);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_split_section_uses_group_default() {
        let (split, participants) = parse_split(&[], SplitMethod::Equal).expect("split");
        assert_eq!(split, Split::Equal);
        assert!(participants.is_none());
        assert!(parse_split(&[], SplitMethod::Custom).is_err());
    }

    #[test]
    fn equal_split_may_name_participants() {
        let (_, participants) = parse_split(&["equal", "A", "C"], SplitMethod::Equal).expect("split");
        assert_eq!(
            participants,
            Some(vec![ParticipantId::new("A"), ParticipantId::new("C")])
        );
    }

    #[test]
    fn weighted_entries_are_parsed() {
        let (split, _) =
            parse_split(&["percentage", "A=50", "B=50"], SplitMethod::Equal).expect("split");
        assert_eq!(split.method(), SplitMethod::Percentage);
        let (split, _) =
            parse_split(&["custom", "A=12.50", "B=7.5"], SplitMethod::Equal).expect("split");
        match split {
            Split::Custom(amounts) => {
                assert_eq!(amounts["B"], Money::from_minor(750));
            }
            other => panic!("unexpected split {other:?}"),
        }
        assert!(parse_split(&["custom", "A"], SplitMethod::Equal).is_err());
        assert!(parse_split(&["percentage", "A=x"], SplitMethod::Equal).is_err());
        assert!(parse_split(&["custom", "A=1", "A=2"], SplitMethod::Equal).is_err());
    }
}
