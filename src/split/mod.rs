//! Turns a bill total and a split policy into per-participant shares.
//!
//! Shares are rounded to the configured [`RoundingIncrement`]. Whatever the
//! rounding leaves over (the residual) is booked on the payer when the payer
//! takes part in the split, otherwise on the first participant, so the shares
//! of a bill always add up to its total exactly.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::{
    errors::{Result, SplitError},
    ledger::{ParticipantId, Share, SplitMethod},
    money::{Money, RoundingIncrement},
};

/// Percentages are compared in millionths of a percent.
const MICRO_PERCENT: i64 = 1_000_000;
const FULL_PERCENT: i64 = 100 * MICRO_PERCENT;
/// Weights must land strictly within 0.01 percentage points of 100.
const PERCENT_TOLERANCE: i64 = MICRO_PERCENT / 100;
/// Custom amounts may miss the total by at most one minor unit.
const CUSTOM_TOLERANCE: Money = Money::from_minor(1);

/// A split method together with the data it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Split {
    Equal,
    /// Participant -> percentage of the total.
    Percentage(BTreeMap<ParticipantId, f64>),
    /// Participant -> explicit owed amount.
    Custom(BTreeMap<ParticipantId, Money>),
}

impl Split {
    pub fn method(&self) -> SplitMethod {
        match self {
            Split::Equal => SplitMethod::Equal,
            Split::Percentage(_) => SplitMethod::Percentage,
            Split::Custom(_) => SplitMethod::Custom,
        }
    }

    /// Participants named by the split data, if the method carries any.
    pub fn named_participants(&self) -> Option<Vec<ParticipantId>> {
        match self {
            Split::Equal => None,
            Split::Percentage(weights) => Some(weights.keys().cloned().collect()),
            Split::Custom(amounts) => Some(amounts.keys().cloned().collect()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitCalculator {
    increment: RoundingIncrement,
}

impl SplitCalculator {
    pub fn new(increment: RoundingIncrement) -> Self {
        Self { increment }
    }

    pub fn increment(&self) -> RoundingIncrement {
        self.increment
    }

    /// Computes the owed share of every participant, in the order given.
    ///
    /// Fails with [`SplitError::InvalidGroupState`] when `participants` is
    /// empty and with [`SplitError::InvalidSplit`] when the total or the
    /// split data is unusable. Nothing is written anywhere.
    pub fn compute_shares(
        &self,
        total: Money,
        split: &Split,
        participants: &[ParticipantId],
        payer: &ParticipantId,
    ) -> Result<Vec<Share>> {
        if !total.is_positive() {
            return Err(SplitError::InvalidSplit(format!(
                "bill total must be positive, got {total}"
            )));
        }
        if total > Money::MAX_AMOUNT {
            return Err(SplitError::InvalidSplit(format!(
                "bill total {total} exceeds the largest supported amount {}",
                Money::MAX_AMOUNT
            )));
        }
        if participants.is_empty() {
            return Err(SplitError::InvalidGroupState(format!(
                "no participants to split {total} between"
            )));
        }
        let mut seen = HashSet::new();
        for participant in participants {
            if !seen.insert(participant) {
                return Err(SplitError::DuplicateIdentifier(format!(
                    "participant `{participant}` listed twice in split"
                )));
            }
        }

        let mut shares = match split {
            Split::Equal => self.equal_shares(total, participants),
            Split::Percentage(weights) => self.percentage_shares(total, weights, participants)?,
            Split::Custom(amounts) => custom_shares(total, amounts, participants)?,
        };

        let residual = total - shares.iter().map(|share| share.amount).sum::<Money>();
        if !residual.is_zero() {
            debug!(%residual, %payer, method = %split.method(), "assigning rounding residual");
            absorb_residual(&mut shares, residual, payer);
        }
        debug_assert_eq!(shares.iter().map(|share| share.amount).sum::<Money>(), total);
        Ok(shares)
    }

    fn equal_shares(&self, total: Money, participants: &[ParticipantId]) -> Vec<Share> {
        let each = self
            .increment
            .round_ratio(total.minor_units() as i128, participants.len() as i128);
        participants
            .iter()
            .map(|participant| Share::new(participant.clone(), each))
            .collect()
    }

    fn percentage_shares(
        &self,
        total: Money,
        weights: &BTreeMap<ParticipantId, f64>,
        participants: &[ParticipantId],
    ) -> Result<Vec<Share>> {
        let members: HashSet<&ParticipantId> = participants.iter().collect();
        if let Some(stranger) = weights.keys().find(|key| !members.contains(key)) {
            return Err(SplitError::InvalidSplit(format!(
                "percentage given for `{stranger}` who is not part of the split"
            )));
        }

        let mut micro_weights = Vec::with_capacity(participants.len());
        for participant in participants {
            let weight = weights.get(participant).copied().ok_or_else(|| {
                SplitError::InvalidSplit(format!("missing percentage for `{participant}`"))
            })?;
            if !weight.is_finite() || !(0.0..=100.0).contains(&weight) {
                return Err(SplitError::InvalidSplit(format!(
                    "percentage for `{participant}` must be between 0 and 100, got {weight}"
                )));
            }
            micro_weights.push((weight * MICRO_PERCENT as f64).round() as i64);
        }

        let sum = micro_weights
            .iter()
            .try_fold(0i64, |acc, micro| acc.checked_add(*micro))
            .ok_or_else(|| SplitError::InvalidSplit("percentages are out of range".into()))?;
        if (sum - FULL_PERCENT).abs() >= PERCENT_TOLERANCE {
            return Err(SplitError::InvalidSplit(format!(
                "percentages add up to {}, expected 100",
                format_micro_percent(sum)
            )));
        }

        Ok(participants
            .iter()
            .zip(micro_weights)
            .map(|(participant, micro)| {
                let amount = self.increment.round_ratio(
                    total.minor_units() as i128 * micro as i128,
                    FULL_PERCENT as i128,
                );
                Share::new(participant.clone(), amount)
            })
            .collect())
    }
}

fn custom_shares(
    total: Money,
    amounts: &BTreeMap<ParticipantId, Money>,
    participants: &[ParticipantId],
) -> Result<Vec<Share>> {
    let members: HashSet<&ParticipantId> = participants.iter().collect();
    if let Some(stranger) = amounts.keys().find(|key| !members.contains(key)) {
        return Err(SplitError::InvalidSplit(format!(
            "amount given for `{stranger}` who is not part of the split"
        )));
    }
    if let Some((participant, amount)) = amounts
        .iter()
        .find(|(_, amount)| amount.is_negative() || **amount > total)
    {
        return Err(SplitError::InvalidSplit(format!(
            "amount for `{participant}` must be between 0 and {total}, got {amount}"
        )));
    }
    let sum = amounts
        .values()
        .try_fold(Money::ZERO, |acc, amount| acc.checked_add(*amount))
        .ok_or_else(|| SplitError::InvalidSplit("custom amounts are out of range".into()))?;
    if (total - sum).abs() > CUSTOM_TOLERANCE {
        return Err(SplitError::InvalidSplit(format!(
            "custom amounts add up to {sum}, expected {total}"
        )));
    }
    Ok(participants
        .iter()
        .filter_map(|participant| {
            amounts
                .get(participant)
                .map(|amount| Share::new(participant.clone(), *amount))
        })
        .collect())
}

/// Books `residual` on the payer's share, or on the first share when the
/// payer is not part of the split. A negative residual never drives a share
/// below zero; whatever does not fit moves on to the following shares.
fn absorb_residual(shares: &mut [Share], residual: Money, payer: &ParticipantId) {
    if shares.is_empty() {
        return;
    }
    let holder = shares
        .iter()
        .position(|share| &share.participant == payer)
        .unwrap_or(0);
    if !residual.is_negative() {
        shares[holder].amount += residual;
        return;
    }
    let mut outstanding = residual.abs();
    let order = (holder..shares.len()).chain(0..holder);
    for index in order {
        if outstanding.is_zero() {
            break;
        }
        let taken = outstanding.min(shares[index].amount);
        shares[index].amount -= taken;
        outstanding -= taken;
    }
}

fn format_micro_percent(micro: i64) -> String {
    let hundredths = (micro as f64 / (MICRO_PERCENT / 100) as f64).round() / 100.0;
    format!("{hundredths:.2}")
}
