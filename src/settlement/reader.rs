use serde::Serialize;
use uuid::Uuid;

use crate::{
    errors::{Result, SplitError},
    ledger::{Ledger, ParticipantId, Share},
    money::Money,
};

/// The parts of a bill the engine needs, without its shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillSummary {
    pub id: Uuid,
    pub title: String,
    pub payer: ParticipantId,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotBill {
    pub summary: BillSummary,
    pub shares: Vec<Share>,
}

/// Owned, read-only copy of everything the engine reads from one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSnapshot {
    pub group: String,
    pub roster: Vec<ParticipantId>,
    pub bills: Vec<SnapshotBill>,
}

/// Read access to a group's roster, bills and shares.
///
/// The settlement engine is written against this trait only, so any store
/// able to answer these three queries can be settled.
pub trait GroupReader {
    fn roster(&self, group: &str) -> Result<Vec<ParticipantId>>;

    fn bills(&self, group: &str) -> Result<Vec<BillSummary>>;

    fn shares(&self, group: &str, bill: Uuid) -> Result<Vec<Share>>;

    fn snapshot(&self, group: &str) -> Result<GroupSnapshot> {
        let roster = self.roster(group)?;
        let mut bills = Vec::new();
        for summary in self.bills(group)? {
            let shares = self.shares(group, summary.id)?;
            bills.push(SnapshotBill { summary, shares });
        }
        Ok(GroupSnapshot {
            group: group.to_string(),
            roster,
            bills,
        })
    }
}

impl GroupReader for Ledger {
    fn roster(&self, group: &str) -> Result<Vec<ParticipantId>> {
        self.group(group)
            .map(|group| group.roster())
            .ok_or_else(|| SplitError::UnknownGroup(group.to_string()))
    }

    fn bills(&self, group: &str) -> Result<Vec<BillSummary>> {
        let group = self
            .group(group)
            .ok_or_else(|| SplitError::UnknownGroup(group.to_string()))?;
        Ok(group
            .bills
            .iter()
            .map(|bill| BillSummary {
                id: bill.id,
                title: bill.title.clone(),
                payer: bill.payer.clone(),
                amount: bill.amount,
            })
            .collect())
    }

    fn shares(&self, group: &str, bill: Uuid) -> Result<Vec<Share>> {
        let group = self
            .group(group)
            .ok_or_else(|| SplitError::UnknownGroup(group.to_string()))?;
        group
            .bill(bill)
            .map(|bill| bill.shares.clone())
            .ok_or_else(|| SplitError::UnknownBill(bill.to_string()))
    }
}
