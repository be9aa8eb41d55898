//! Ledger domain models: groups, participants, bills and their shares.

pub mod bill;
pub mod group;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod participant;

pub use bill::{Bill, Share, SplitMethod};
pub use group::Group;
pub use ledger::Ledger;
pub use participant::{Participant, ParticipantId};
