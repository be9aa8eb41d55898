use thiserror::Error;

/// Error type shared by the split calculator, the settlement engine and the
/// services that maintain groups, participants and bills.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("Group `{0}` does not exist")]
    UnknownGroup(String),
    #[error("Invalid group state: {0}")]
    InvalidGroupState(String),
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
    #[error("Invalid payer: {0}")]
    InvalidPayer(String),
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),
    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),
    #[error("Unknown bill: {0}")]
    UnknownBill(String),
    #[error("Participant in use: {0}")]
    ParticipantInUse(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SplitError>;
