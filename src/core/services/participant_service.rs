use tracing::info;

use crate::errors::SplitError;
use crate::ledger::{Ledger, Participant, ParticipantId};

use super::{group_mut_or_err, group_or_err, ServiceResult};

pub struct ParticipantService;

impl ParticipantService {
    pub fn add(ledger: &mut Ledger, group: &str, participant: Participant) -> ServiceResult<()> {
        if participant.nickname.as_str().is_empty() {
            return Err(SplitError::InvalidInput("nickname cannot be empty".into()));
        }
        let target = group_mut_or_err(ledger, group)?;
        if target
            .participants
            .iter()
            .any(|existing| existing.nickname.collides_with(&participant.nickname))
        {
            return Err(SplitError::DuplicateIdentifier(format!(
                "nickname `{}` is already taken in group `{}`",
                participant.nickname, target.name
            )));
        }
        info!(group = %target.name, nickname = %participant.nickname, "added participant");
        target.participants.push(participant);
        ledger.touch();
        Ok(())
    }

    /// Refuses to remove anyone who paid or owes part of a recorded bill.
    pub fn remove(ledger: &mut Ledger, group: &str, nickname: &str) -> ServiceResult<Participant> {
        let target = group_mut_or_err(ledger, group)?;
        let id = ParticipantId::new(nickname);
        let index = target
            .participants
            .iter()
            .position(|participant| participant.nickname == id)
            .ok_or_else(|| {
                SplitError::UnknownParticipant(format!(
                    "`{}` is not part of group `{}`",
                    id, target.name
                ))
            })?;
        if let Some(bill) = target.bills.iter().find(|bill| bill.references(&id)) {
            return Err(SplitError::ParticipantInUse(format!(
                "`{}` is referenced by bill `{}`",
                id, bill.title
            )));
        }
        let removed = target.participants.remove(index);
        info!(group = %target.name, nickname = %id, "removed participant");
        ledger.touch();
        Ok(removed)
    }

    pub fn list<'a>(ledger: &'a Ledger, group: &str) -> ServiceResult<Vec<&'a Participant>> {
        Ok(group_or_err(ledger, group)?.participants.iter().collect())
    }
}
