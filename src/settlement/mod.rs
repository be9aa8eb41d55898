//! Net balances and debt settlement for a group.
//!
//! Everything here is recomputed from the group's current bills on every
//! call; nothing is cached or written back.

mod balances;
mod reader;
mod strategy;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use balances::{balances_for, Balances};
pub use reader::{BillSummary, GroupReader, GroupSnapshot, SnapshotBill};
pub use strategy::SettlementStrategy;

use crate::{errors::Result, ledger::ParticipantId, money::Money};

/// One directed payment: `debtor` pays `amount` to `creditor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub debtor: ParticipantId,
    pub creditor: ParticipantId,
    pub amount: Money,
}

impl Transfer {
    pub fn new(debtor: ParticipantId, creditor: ParticipantId, amount: Money) -> Self {
        Self {
            debtor,
            creditor,
            amount,
        }
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} owes {} {}", self.debtor, self.creditor, self.amount)
    }
}

/// Settlement entry point bound to one strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettlementEngine {
    strategy: SettlementStrategy,
}

impl SettlementEngine {
    pub fn new(strategy: SettlementStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> SettlementStrategy {
        self.strategy
    }

    pub fn balances<R: GroupReader + ?Sized>(&self, reader: &R, group: &str) -> Result<Balances> {
        calculate_balances(reader, group)
    }

    pub fn settlements<R: GroupReader + ?Sized>(
        &self,
        reader: &R,
        group: &str,
    ) -> Result<Vec<Transfer>> {
        calculate_settlements(reader, group, self.strategy)
    }
}

/// Net balance of every roster participant of `group`.
pub fn calculate_balances<R: GroupReader + ?Sized>(reader: &R, group: &str) -> Result<Balances> {
    balances_for(&reader.snapshot(group)?)
}

/// Transfers that bring every balance of `group` back to zero.
pub fn calculate_settlements<R: GroupReader + ?Sized>(
    reader: &R,
    group: &str,
    strategy: SettlementStrategy,
) -> Result<Vec<Transfer>> {
    let snapshot = reader.snapshot(group)?;
    let balances = balances_for(&snapshot)?;
    let transfers = strategy.settle(&snapshot, &balances);
    debug!(group, %strategy, transfers = transfers.len(), "computed settlement");
    Ok(transfers)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;
    use crate::{
        errors::SplitError,
        ledger::{Bill, Group, Ledger, Participant, Share, SplitMethod},
        split::{Split, SplitCalculator},
    };

    fn trip_group() -> Group {
        let mut group = Group::new("Trip", SplitMethod::Equal);
        for nick in ["A", "B", "C"] {
            group
                .participants
                .push(Participant::new(nick, nick, "Traveller"));
        }
        group
    }

    fn add_bill(group: &mut Group, title: &str, minor: i64, payer: &str, split: Split) {
        let roster = group.roster();
        let participants = split.named_participants().unwrap_or(roster);
        let shares = SplitCalculator::default()
            .compute_shares(
                Money::from_minor(minor),
                &split,
                &participants,
                &payer.into(),
            )
            .unwrap();
        group.bills.push(Bill::new(
            title,
            Money::from_minor(minor),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            split.method(),
            payer.into(),
            shares,
        ));
    }

    fn trip_ledger() -> Ledger {
        let mut group = trip_group();
        add_bill(&mut group, "Dinner", 9000, "A", Split::Equal);
        add_bill(
            &mut group,
            "Taxi",
            5000,
            "B",
            Split::Percentage(BTreeMap::from([
                ("A".into(), 50.0),
                ("B".into(), 30.0),
                ("C".into(), 20.0),
            ])),
        );
        let mut ledger = Ledger::new("test");
        ledger.groups.push(group);
        ledger
    }

    #[test]
    fn trip_balances_match_hand_computation() {
        let balances = calculate_balances(&trip_ledger(), "Trip").unwrap();
        let minor: Vec<i64> = balances.values().map(|m| m.minor_units()).collect();
        assert_eq!(minor, vec![3500, 500, -4000]);
    }

    #[test]
    fn trip_settles_with_two_transfers() {
        let transfers =
            calculate_settlements(&trip_ledger(), "Trip", SettlementStrategy::GreedyMatching)
                .unwrap();
        let rendered: Vec<String> = transfers.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["C owes A 35.00", "C owes B 5.00"]);
    }

    #[test]
    fn pairwise_nets_reverse_debts() {
        let transfers =
            calculate_settlements(&trip_ledger(), "Trip", SettlementStrategy::PairwiseNetting)
                .unwrap();
        let rendered: Vec<String> = transfers.iter().map(ToString::to_string).collect();
        // B owed A 30.00 for dinner, A owed B 25.00 for the taxi
        assert_eq!(
            rendered,
            vec!["B owes A 5.00", "C owes A 30.00", "C owes B 10.00"]
        );
    }

    #[test]
    fn empty_group_has_zero_balances_and_no_transfers() {
        let mut ledger = Ledger::new("test");
        ledger.groups.push(trip_group());
        let balances = calculate_balances(&ledger, "Trip").unwrap();
        assert_eq!(balances.len(), 3);
        assert!(balances.values().all(|amount| amount.is_zero()));
        assert!(SettlementEngine::default()
            .settlements(&ledger, "Trip")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn unknown_group_is_reported() {
        let err = calculate_balances(&Ledger::new("test"), "Nowhere").unwrap_err();
        assert!(matches!(err, SplitError::UnknownGroup(name) if name == "Nowhere"));
    }

    #[test]
    fn payer_outside_roster_is_rejected() {
        let mut ledger = trip_ledger();
        ledger.groups[0].bills[0].payer = "Z".into();
        let err = calculate_balances(&ledger, "Trip").unwrap_err();
        assert!(matches!(err, SplitError::InvalidPayer(_)));
    }

    #[test]
    fn share_outside_roster_is_rejected() {
        let mut ledger = trip_ledger();
        ledger.groups[0].bills[0].shares[0] = Share::new("Z", Money::from_minor(3000));
        let err = calculate_balances(&ledger, "Trip").unwrap_err();
        assert!(matches!(err, SplitError::UnknownParticipant(_)));
    }

    #[test]
    fn shares_not_matching_bill_amount_are_rejected() {
        let mut ledger = trip_ledger();
        ledger.groups[0].bills[0].shares[0].amount = Money::from_minor(1);
        let err = calculate_balances(&ledger, "Trip").unwrap_err();
        assert!(matches!(err, SplitError::InvalidSplit(_)));
    }

    #[test]
    fn unknown_bill_shares_are_reported() {
        let err = trip_ledger().shares("Trip", Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, SplitError::UnknownBill(_)));
    }
}
