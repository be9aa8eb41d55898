#![allow(dead_code)]

use std::{collections::BTreeMap, sync::Mutex};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use tempfile::TempDir;
use xsplittr::{
    config::ConfigManager,
    core::services::{BillService, GroupService, NewBill, ParticipantService},
    ledger::{Ledger, Participant, ParticipantId, SplitMethod},
    money::Money,
    split::{Split, SplitCalculator},
    storage::JsonStorage,
};

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a storage and config manager backed by a unique directory.
pub fn setup_test_env() -> (JsonStorage, ConfigManager) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let storage = JsonStorage::new(base.join("ledgers"), base.join("backups"))
        .expect("create json storage backend");
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");

    (storage, config_manager)
}

pub fn id(nickname: &str) -> ParticipantId {
    ParticipantId::new(nickname)
}

pub fn ids(nicknames: &[&str]) -> Vec<ParticipantId> {
    nicknames.iter().map(|nickname| id(nickname)).collect()
}

pub fn cents(amount: &str) -> Money {
    amount.parse().expect("valid amount")
}

pub fn day(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, day).expect("valid date")
}

/// Ledger with one equal-split group holding the given nicknames.
pub fn ledger_with_group(group: &str, nicknames: &[&str]) -> Ledger {
    let mut ledger = Ledger::new("Tests");
    GroupService::create(&mut ledger, group, SplitMethod::Equal).expect("create group");
    for nickname in nicknames {
        ParticipantService::add(
            &mut ledger,
            group,
            Participant::new(*nickname, *nickname, "Tester"),
        )
        .expect("add participant");
    }
    ledger
}

pub fn record(ledger: &mut Ledger, group: &str, title: &str, amount: &str, payer: &str) {
    BillService::record(
        ledger,
        group,
        NewBill::new(title, cents(amount), day(1), payer, Split::Equal),
        &SplitCalculator::default(),
    )
    .expect("record bill");
}

/// The Trip group: A pays a 90.00 dinner split equally, B pays a 50.00 taxi
/// split 50/30/20.
pub fn trip_ledger() -> Ledger {
    let mut ledger = ledger_with_group("Trip", &["A", "B", "C"]);
    record(&mut ledger, "Trip", "Dinner", "90.00", "A");
    let taxi = Split::Percentage(BTreeMap::from([
        (id("A"), 50.0),
        (id("B"), 30.0),
        (id("C"), 20.0),
    ]));
    BillService::record(
        &mut ledger,
        "Trip",
        NewBill::new("Taxi", cents("50.00"), day(2), "B", taxi),
        &SplitCalculator::default(),
    )
    .expect("record taxi");
    ledger
}
