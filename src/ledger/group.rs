use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    bill::{Bill, SplitMethod},
    participant::{Participant, ParticipantId},
};

/// A set of people sharing expenses, together with the bills they recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub default_split: SplitMethod,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub bills: Vec<Bill>,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(name: impl Into<String>, default_split: SplitMethod) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            default_split,
            participants: Vec::new(),
            bills: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn participant(&self, nickname: &str) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|participant| participant.nickname.as_str() == nickname)
    }

    pub fn has_participant(&self, nickname: &ParticipantId) -> bool {
        self.participant(nickname.as_str()).is_some()
    }

    /// Participant identifiers in the order they joined the group.
    pub fn roster(&self) -> Vec<ParticipantId> {
        self.participants
            .iter()
            .map(|participant| participant.nickname.clone())
            .collect()
    }

    pub fn bill(&self, id: Uuid) -> Option<&Bill> {
        self.bills.iter().find(|bill| bill.id == id)
    }

    pub fn bill_by_title(&self, title: &str) -> Option<&Bill> {
        let needle = title.trim();
        self.bills
            .iter()
            .find(|bill| bill.title.eq_ignore_ascii_case(needle))
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}
