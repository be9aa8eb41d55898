use super::{exact, subcommand, CommandDefinition};
use crate::cli::core::{usage, CommandResult, ShellContext};
use crate::cli::output::{self, Alignment, Table};
use crate::core::services::ParticipantService;
use crate::ledger::Participant;

const USAGE: &str = "participant add <group> <nickname> <first> <last>
participant remove <group> <nickname>
participant list <group>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "participant",
        "Manage the people in a group",
        USAGE,
        cmd_participant,
    )]
}

fn cmd_participant(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (action, rest) = subcommand(args, USAGE)?;
    match action.as_str() {
        "add" => {
            let [group, nickname, first, last] =
                exact(rest, "participant add <group> <nickname> <first> <last>")?;
            ParticipantService::add(
                &mut context.ledger,
                group,
                Participant::new(nickname, first, last),
            )?;
            context.persist()?;
            output::success(format!("Added `{nickname}` to `{group}`."));
            Ok(())
        }
        "remove" => {
            let [group, nickname] = exact(rest, "participant remove <group> <nickname>")?;
            let removed = ParticipantService::remove(&mut context.ledger, group, nickname)?;
            context.persist()?;
            output::success(format!(
                "Removed `{}` ({}) from `{group}`.",
                removed.nickname,
                removed.display_name()
            ));
            Ok(())
        }
        "list" => {
            let [group] = exact(rest, "participant list <group>")?;
            let participants = ParticipantService::list(&context.ledger, group)?;
            if participants.is_empty() {
                output::info(format!("`{group}` has no participants yet."));
                return Ok(());
            }
            let mut table = Table::new(&[("Nickname", Alignment::Left), ("Name", Alignment::Left)]);
            for participant in participants {
                table.push(vec![
                    participant.nickname.to_string(),
                    participant.display_name(),
                ]);
            }
            output::section(format!("Participants of {group}"));
            output::render_table(&table);
            Ok(())
        }
        other => Err(usage(&format!(
            "participant <add|remove|list> (got `{other}`)"
        ))),
    }
}
