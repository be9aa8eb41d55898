use tracing::info;

use crate::errors::SplitError;
use crate::ledger::{Group, Ledger, SplitMethod};

use super::{group_mut_or_err, ServiceResult};

pub struct GroupService;

impl GroupService {
    pub fn create<'a>(
        ledger: &'a mut Ledger,
        name: &str,
        default_split: SplitMethod,
    ) -> ServiceResult<&'a Group> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SplitError::InvalidInput("group name cannot be empty".into()));
        }
        if ledger.group(name).is_some() {
            return Err(SplitError::DuplicateIdentifier(format!(
                "group `{}` already exists",
                name
            )));
        }
        ledger.groups.push(Group::new(name, default_split));
        ledger.touch();
        info!(group = name, %default_split, "created group");
        let index = ledger.groups.len() - 1;
        Ok(&ledger.groups[index])
    }

    /// Removes the group together with its participants and bills.
    pub fn delete(ledger: &mut Ledger, name: &str) -> ServiceResult<Group> {
        let index = ledger
            .groups
            .iter()
            .position(|group| group.matches_name(name))
            .ok_or_else(|| SplitError::UnknownGroup(name.trim().to_string()))?;
        let removed = ledger.groups.remove(index);
        ledger.touch();
        info!(
            group = %removed.name,
            participants = removed.participants.len(),
            bills = removed.bills.len(),
            "deleted group"
        );
        Ok(removed)
    }

    pub fn list(ledger: &Ledger) -> Vec<&Group> {
        ledger.groups.iter().collect()
    }

    pub fn set_default_split(
        ledger: &mut Ledger,
        name: &str,
        default_split: SplitMethod,
    ) -> ServiceResult<()> {
        let group = group_mut_or_err(ledger, name)?;
        group.default_split = default_split;
        ledger.touch();
        Ok(())
    }
}
