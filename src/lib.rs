#![doc(test(attr(deny(warnings))))]

//! Xsplittr tracks shared expenses inside groups and works out who owes whom.
//!
//! Bills are divided into per-participant shares by the [`split`] module when
//! they are recorded; the [`settlement`] module turns a group's bills into net
//! balances and a short list of transfers that settles them.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod money;
pub mod settlement;
pub mod split;
pub mod storage;
pub mod utils;

pub use errors::{Result, SplitError};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing; safe to call more than once.
pub fn init() {
    INIT_TRACING.call_once(utils::init_tracing);
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
