//! Operations that change the ledger while keeping its invariants intact.

pub mod bill_service;
pub mod group_service;
pub mod participant_service;

pub use bill_service::{BillService, NewBill, RecentBill};
pub use group_service::GroupService;
pub use participant_service::ParticipantService;

use crate::errors::SplitError;
use crate::ledger::{Group, Ledger};

pub type ServiceResult<T> = Result<T, SplitError>;

pub(crate) fn group_or_err<'a>(ledger: &'a Ledger, name: &str) -> ServiceResult<&'a Group> {
    ledger
        .group(name)
        .ok_or_else(|| SplitError::UnknownGroup(name.trim().to_string()))
}

pub(crate) fn group_mut_or_err<'a>(
    ledger: &'a mut Ledger,
    name: &str,
) -> ServiceResult<&'a mut Group> {
    ledger
        .group_mut(name)
        .ok_or_else(|| SplitError::UnknownGroup(name.trim().to_string()))
}
