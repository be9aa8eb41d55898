mod common;

use std::fs;

use common::setup_test_env;
use xsplittr::{
    config::{Config, ConfigError, CONFIG_KEYS},
    ledger::SplitMethod,
    money::Money,
    settlement::SettlementStrategy,
};

#[test]
fn missing_file_loads_defaults() {
    let (_, manager) = setup_test_env();
    let config = manager.load().expect("load defaults");
    assert_eq!(config, Config::default());
    assert_eq!(config.settlement_strategy, SettlementStrategy::GreedyMatching);
    assert_eq!(config.rounding_increment_cents.minor_units(), 5);
    assert_eq!(config.default_split, SplitMethod::Equal);
}

#[test]
fn saved_preferences_round_trip() {
    let (_, manager) = setup_test_env();
    let mut config = Config::default();
    config.set("locale", "pt-PT").expect("locale");
    config.set("default_split", "percentage").expect("default split");
    config.last_opened_ledger = Some("Holidays".into());
    manager.save(&config).expect("save");

    let loaded = manager.load().expect("load");
    assert_eq!(loaded, config);
    let raw = fs::read_to_string(manager.config_path()).expect("read file");
    assert!(raw.contains("\"settlement_strategy\": \"greedy\""), "{raw}");
}

#[test]
fn older_files_fill_in_new_fields() {
    let (_, manager) = setup_test_env();
    fs::write(
        manager.config_path(),
        r#"{ "locale": "en-GB", "currency": "GBP" }"#,
    )
    .expect("write legacy config");
    let config = manager.load().expect("load");
    assert_eq!(config.currency, "GBP");
    assert_eq!(config.settlement_strategy, SettlementStrategy::GreedyMatching);
    assert!(config.ui_color_enabled);
}

#[test]
fn rounding_increment_drives_the_calculator() {
    let mut config = Config::default();
    config.set("rounding_increment_cents", "100").expect("increment");
    assert_eq!(config.calculator().increment().minor_units(), 100);
    config.set("settlement_strategy", "pairwise").expect("strategy");
    assert_eq!(config.engine().strategy(), SettlementStrategy::PairwiseNetting);
    assert_eq!(Money::from_minor(100).to_string(), "1.00");
}

#[test]
fn bad_values_and_keys_are_rejected() {
    let mut config = Config::default();
    assert!(matches!(
        config.set("rounding_increment_cents", "0"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(matches!(
        config.set("settlement_strategy", "random"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(matches!(
        config.set("currency", "euro"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert!(matches!(
        config.set("theme", "dark"),
        Err(ConfigError::UnknownKey(_))
    ));
    assert_eq!(config, Config::default());
    assert!(CONFIG_KEYS.contains(&"rounding_increment_cents"));
}

#[test]
fn backups_restore_earlier_preferences() {
    let (_, manager) = setup_test_env();
    let mut config = Config::default();
    config.set("currency", "EUR").expect("currency");
    let name = manager.backup(&config, Some("Euro trip")).expect("backup");
    assert!(name.starts_with("config_"));
    assert!(name.ends_with("_euro-trip.json"), "{name}");
    assert_eq!(manager.list_backups().expect("list"), vec![name.clone()]);

    let restored = manager.restore(&name).expect("restore");
    assert_eq!(restored.currency, "EUR");
    assert!(matches!(
        manager.restore("config_19990101_0000.json"),
        Err(ConfigError::Io(_))
    ));
}
