use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{balances::Balances, reader::GroupSnapshot, Transfer};
use crate::{errors::SplitError, ledger::ParticipantId, money::Money};

/// Algorithm used to turn balances into transfers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SettlementStrategy {
    /// Matches the largest debtor with the largest creditor until everyone is
    /// square. Needs at most `participants - 1` transfers.
    #[default]
    #[serde(rename = "greedy")]
    GreedyMatching,
    /// Nets bill-level debts per pair of participants. One transfer per pair
    /// that still owes something.
    #[serde(rename = "pairwise")]
    PairwiseNetting,
}

impl SettlementStrategy {
    pub(crate) fn settle(self, snapshot: &GroupSnapshot, balances: &Balances) -> Vec<Transfer> {
        match self {
            SettlementStrategy::GreedyMatching => greedy_matching(balances),
            SettlementStrategy::PairwiseNetting => pairwise_netting(snapshot),
        }
    }
}

impl fmt::Display for SettlementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettlementStrategy::GreedyMatching => f.write_str("greedy"),
            SettlementStrategy::PairwiseNetting => f.write_str("pairwise"),
        }
    }
}

impl FromStr for SettlementStrategy {
    type Err = SplitError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "greedy" | "greedy-matching" => Ok(SettlementStrategy::GreedyMatching),
            "pairwise" | "pairwise-netting" => Ok(SettlementStrategy::PairwiseNetting),
            other => Err(SplitError::InvalidInput(format!(
                "unknown settlement strategy `{other}` (use greedy or pairwise)"
            ))),
        }
    }
}

fn by_magnitude(parties: &mut [(ParticipantId, Money)]) {
    parties.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}

fn greedy_matching(balances: &Balances) -> Vec<Transfer> {
    let mut creditors: Vec<(ParticipantId, Money)> = balances
        .iter()
        .filter(|(_, amount)| amount.is_positive())
        .map(|(participant, amount)| (participant.clone(), *amount))
        .collect();
    let mut debtors: Vec<(ParticipantId, Money)> = balances
        .iter()
        .filter(|(_, amount)| amount.is_negative())
        .map(|(participant, amount)| (participant.clone(), amount.abs()))
        .collect();
    by_magnitude(&mut creditors);
    by_magnitude(&mut debtors);

    let mut transfers = Vec::new();
    let (mut c, mut d) = (0, 0);
    while c < creditors.len() && d < debtors.len() {
        let amount = creditors[c].1.min(debtors[d].1);
        if amount.is_positive() {
            transfers.push(Transfer::new(
                debtors[d].0.clone(),
                creditors[c].0.clone(),
                amount,
            ));
        }
        creditors[c].1 -= amount;
        debtors[d].1 -= amount;
        if creditors[c].1.is_zero() {
            c += 1;
        }
        if debtors[d].1.is_zero() {
            d += 1;
        }
    }
    transfers
}

fn pairwise_netting(snapshot: &GroupSnapshot) -> Vec<Transfer> {
    // Keyed by the ordered pair; positive means `lo` owes `hi`.
    let mut nets: BTreeMap<(ParticipantId, ParticipantId), Money> = BTreeMap::new();
    for bill in &snapshot.bills {
        let payer = &bill.summary.payer;
        for share in bill.shares.iter().filter(|share| &share.participant != payer) {
            let debtor = &share.participant;
            if debtor < payer {
                *nets.entry((debtor.clone(), payer.clone())).or_default() += share.amount;
            } else {
                *nets.entry((payer.clone(), debtor.clone())).or_default() -= share.amount;
            }
        }
    }

    let mut transfers: Vec<Transfer> = nets
        .into_iter()
        .filter(|(_, net)| !net.is_zero())
        .map(|((lo, hi), net)| {
            if net.is_positive() {
                Transfer::new(lo, hi, net)
            } else {
                Transfer::new(hi, lo, net.abs())
            }
        })
        .collect();
    transfers.sort_by(|a, b| {
        a.debtor
            .cmp(&b.debtor)
            .then_with(|| a.creditor.cmp(&b.creditor))
    });
    transfers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balances(entries: &[(&str, i64)]) -> Balances {
        entries
            .iter()
            .map(|(name, minor)| (ParticipantId::new(*name), Money::from_minor(*minor)))
            .collect()
    }

    #[test]
    fn greedy_matches_largest_first() {
        let transfers = greedy_matching(&balances(&[
            ("A", 5000),
            ("B", 1000),
            ("C", -4000),
            ("D", -2000),
        ]));
        let rendered: Vec<String> = transfers.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["C owes A 40.00", "D owes A 10.00", "D owes B 10.00"]
        );
    }

    #[test]
    fn greedy_breaks_ties_by_identifier() {
        let transfers = greedy_matching(&balances(&[("B", 1000), ("A", 1000), ("C", -2000)]));
        assert_eq!(transfers[0].creditor.as_str(), "A");
        assert_eq!(transfers[1].creditor.as_str(), "B");
    }

    #[test]
    fn greedy_is_empty_when_everyone_is_square() {
        assert!(greedy_matching(&balances(&[("A", 0), ("B", 0)])).is_empty());
    }

    #[test]
    fn strategy_names_round_trip_through_text() {
        for strategy in [
            SettlementStrategy::GreedyMatching,
            SettlementStrategy::PairwiseNetting,
        ] {
            assert_eq!(strategy.to_string().parse::<SettlementStrategy>().unwrap(), strategy);
        }
        assert!("fastest".parse::<SettlementStrategy>().is_err());
    }

    #[test]
    fn strategy_serializes_with_short_names() {
        let json = serde_json::to_string(&SettlementStrategy::PairwiseNetting).unwrap();
        assert_eq!(json, "\"pairwise\"");
    }
}
