use std::collections::BTreeMap;

use tracing::debug;

use super::reader::GroupSnapshot;
use crate::{
    errors::{Result, SplitError},
    ledger::ParticipantId,
    money::Money,
};

/// Net position per participant; positive means the participant is owed money.
pub type Balances = BTreeMap<ParticipantId, Money>;

/// Derives balances from a snapshot, rejecting data that cannot add up.
pub fn balances_for(snapshot: &GroupSnapshot) -> Result<Balances> {
    let mut balances: Balances = snapshot
        .roster
        .iter()
        .map(|participant| (participant.clone(), Money::ZERO))
        .collect();

    for bill in &snapshot.bills {
        let summary = &bill.summary;
        let shares_total = bill
            .shares
            .iter()
            .try_fold(Money::ZERO, |acc, share| acc.checked_add(share.amount));
        if shares_total != Some(summary.amount) {
            let shares_total = shares_total
                .map(|total| total.to_string())
                .unwrap_or_else(|| "an out-of-range amount".into());
            return Err(SplitError::InvalidSplit(format!(
                "shares of `{}` add up to {shares_total}, bill amount is {}",
                summary.title, summary.amount
            )));
        }

        let paid = balances.get_mut(&summary.payer).ok_or_else(|| {
            SplitError::InvalidPayer(format!(
                "`{}` paid `{}` but is not part of group `{}`",
                summary.payer, summary.title, snapshot.group
            ))
        })?;
        *paid = paid
            .checked_add(summary.amount)
            .ok_or_else(|| overflow(snapshot, &summary.payer))?;

        for share in &bill.shares {
            let owed = balances.get_mut(&share.participant).ok_or_else(|| {
                SplitError::UnknownParticipant(format!(
                    "`{}` owes part of `{}` but is not part of group `{}`",
                    share.participant, summary.title, snapshot.group
                ))
            })?;
            *owed = owed
                .checked_sub(share.amount)
                .ok_or_else(|| overflow(snapshot, &share.participant))?;
        }
    }

    debug!(
        group = %snapshot.group,
        participants = balances.len(),
        bills = snapshot.bills.len(),
        "computed balances"
    );
    Ok(balances)
}

fn overflow(snapshot: &GroupSnapshot, participant: &ParticipantId) -> SplitError {
    SplitError::InvalidGroupState(format!(
        "balance of `{participant}` in group `{}` is out of range",
        snapshot.group
    ))
}
