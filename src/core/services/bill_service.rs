use chrono::NaiveDate;
use tracing::{info, warn};

use crate::errors::SplitError;
use crate::ledger::{Bill, Ledger, ParticipantId};
use crate::money::Money;
use crate::split::{Split, SplitCalculator};

use super::{group_mut_or_err, group_or_err, ServiceResult};

/// Input for recording a bill.
#[derive(Debug, Clone)]
pub struct NewBill {
    pub title: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub payer: ParticipantId,
    pub split: Split,
    /// Who shares the bill. `None` means the whole roster for an equal split,
    /// or the participants named by the percentage/custom data.
    pub participants: Option<Vec<ParticipantId>>,
}

impl NewBill {
    pub fn new(
        title: impl Into<String>,
        amount: Money,
        date: NaiveDate,
        payer: impl Into<ParticipantId>,
        split: Split,
    ) -> Self {
        Self {
            title: title.into(),
            amount,
            date,
            payer: payer.into(),
            split,
            participants: None,
        }
    }

    pub fn with_participants(mut self, participants: Vec<ParticipantId>) -> Self {
        self.participants = Some(participants);
        self
    }
}

/// A bill paired with the name of the group it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct RecentBill<'a> {
    pub group: &'a str,
    pub bill: &'a Bill,
}

pub struct BillService;

impl BillService {
    /// Validates the bill, computes its shares and stores both at once.
    pub fn record<'a>(
        ledger: &'a mut Ledger,
        group: &str,
        new_bill: NewBill,
        calculator: &SplitCalculator,
    ) -> ServiceResult<&'a Bill> {
        let title = new_bill.title.trim().to_string();
        if title.is_empty() {
            return Err(SplitError::InvalidInput("bill title cannot be empty".into()));
        }

        let target = group_or_err(ledger, group)?;
        if target.participants.is_empty() {
            return Err(SplitError::InvalidGroupState(format!(
                "group `{}` has no participants",
                target.name
            )));
        }
        if !target.has_participant(&new_bill.payer) {
            warn!(group = %target.name, payer = %new_bill.payer, "rejected bill payer");
            return Err(SplitError::InvalidPayer(format!(
                "`{}` is not part of group `{}`",
                new_bill.payer, target.name
            )));
        }
        if target.bill_by_title(&title).is_some() {
            return Err(SplitError::DuplicateIdentifier(format!(
                "bill `{}` already exists in group `{}`",
                title, target.name
            )));
        }

        let participants = match (&new_bill.participants, new_bill.split.named_participants()) {
            (Some(explicit), _) => explicit.clone(),
            (None, None) => target.roster(),
            (None, Some(named)) => {
                // Roster order keeps share lists stable; strangers trail so they get reported.
                let mut ordered: Vec<ParticipantId> = target
                    .roster()
                    .into_iter()
                    .filter(|member| named.contains(member))
                    .collect();
                ordered.extend(named.into_iter().filter(|p| !target.has_participant(p)));
                ordered
            }
        };
        if let Some(stranger) = participants.iter().find(|p| !target.has_participant(p)) {
            return Err(SplitError::UnknownParticipant(format!(
                "`{}` is not part of group `{}`",
                stranger, target.name
            )));
        }

        let shares = calculator.compute_shares(
            new_bill.amount,
            &new_bill.split,
            &participants,
            &new_bill.payer,
        )?;
        let bill = Bill::new(
            title,
            new_bill.amount,
            new_bill.date,
            new_bill.split.method(),
            new_bill.payer,
            shares,
        );
        info!(
            group = %target.name,
            bill = %bill.title,
            amount = %bill.amount,
            method = %bill.split_method,
            "recorded bill"
        );

        ledger.touch();
        let target = group_mut_or_err(ledger, group)?;
        target.bills.push(bill);
        let bills = &target.bills;
        Ok(&bills[bills.len() - 1])
    }

    pub fn remove(ledger: &mut Ledger, group: &str, title: &str) -> ServiceResult<Bill> {
        let target = group_mut_or_err(ledger, group)?;
        let needle = title.trim();
        let index = target
            .bills
            .iter()
            .position(|bill| bill.title.eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                SplitError::UnknownBill(format!(
                    "`{}` is not recorded in group `{}`",
                    needle, target.name
                ))
            })?;
        let removed = target.bills.remove(index);
        info!(group = %target.name, bill = %removed.title, "removed bill");
        ledger.touch();
        Ok(removed)
    }

    /// Bills of a group ordered by date, oldest first.
    pub fn list<'a>(ledger: &'a Ledger, group: &str) -> ServiceResult<Vec<&'a Bill>> {
        let mut bills: Vec<&Bill> = group_or_err(ledger, group)?.bills.iter().collect();
        bills.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(bills)
    }

    /// The `limit` most recently recorded bills across every group.
    pub fn recent(ledger: &Ledger, limit: usize) -> Vec<RecentBill<'_>> {
        let mut bills: Vec<RecentBill<'_>> = ledger
            .groups
            .iter()
            .flat_map(|group| {
                group.bills.iter().map(move |bill| RecentBill {
                    group: group.name.as_str(),
                    bill,
                })
            })
            .collect();
        bills.sort_by(|a, b| b.bill.created_at.cmp(&a.bill.created_at));
        bills.truncate(limit);
        bills
    }
}
