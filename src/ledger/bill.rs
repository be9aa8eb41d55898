use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::participant::ParticipantId;
use crate::{errors::SplitError, money::Money};

/// Policy used to divide a bill between participants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    #[default]
    Equal,
    Percentage,
    Custom,
}

impl fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SplitMethod::Equal => "equal",
            SplitMethod::Percentage => "percentage",
            SplitMethod::Custom => "custom",
        };
        f.write_str(label)
    }
}

impl FromStr for SplitMethod {
    type Err = SplitError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "equal" => Ok(SplitMethod::Equal),
            "percentage" | "percent" => Ok(SplitMethod::Percentage),
            "custom" => Ok(SplitMethod::Custom),
            other => Err(SplitError::InvalidInput(format!(
                "unknown split method `{other}` (use equal, percentage or custom)"
            ))),
        }
    }
}

/// A participant's owed portion of one bill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Share {
    pub participant: ParticipantId,
    pub amount: Money,
}

impl Share {
    pub fn new(participant: impl Into<ParticipantId>, amount: Money) -> Self {
        Self {
            participant: participant.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bill {
    pub id: Uuid,
    pub title: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub split_method: SplitMethod,
    pub payer: ParticipantId,
    #[serde(default)]
    pub shares: Vec<Share>,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    pub fn new(
        title: impl Into<String>,
        amount: Money,
        date: NaiveDate,
        split_method: SplitMethod,
        payer: ParticipantId,
        shares: Vec<Share>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into().trim().to_string(),
            amount,
            date,
            split_method,
            payer,
            shares,
            created_at: Utc::now(),
        }
    }

    pub fn shares_total(&self) -> Money {
        self.shares.iter().map(|share| share.amount).sum()
    }

    pub fn share_of(&self, participant: &ParticipantId) -> Option<Money> {
        self.shares
            .iter()
            .find(|share| &share.participant == participant)
            .map(|share| share.amount)
    }

    /// True when the participant paid this bill or owes part of it.
    pub fn references(&self, participant: &ParticipantId) -> bool {
        &self.payer == participant
            || self
                .shares
                .iter()
                .any(|share| &share.participant == participant)
    }
}
