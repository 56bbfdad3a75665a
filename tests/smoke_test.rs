mod common;

use meter_ledger::{config::Config, domain::EntryField, init};

#[test]
fn period_session_smoke() {
    init();

    let (mut session, config_manager, _base) = common::setup_test_env();
    let mut config = config_manager.load().unwrap();
    assert_eq!(config, Config::default());
    config.set("default_rate", "2").unwrap();
    config_manager.save(&config).unwrap();
    session.set_default_rate(config_manager.load().unwrap().default_rate);

    let key = session.start(&["Acme", "May", "2024"]).unwrap();
    session.add_entity("North").unwrap();
    session
        .set_field("North", EntryField::PreviousReading, "100")
        .unwrap();
    session.set_field("North", EntryField::NewReading, "150").unwrap();
    session.record_payment("North", 80.0).unwrap();
    session.save().unwrap();
    session.close();

    session.open(&key).unwrap();
    let view = session.view().unwrap();
    assert_eq!(view.total_sales, 100.0);
    assert_eq!(view.rows[0].balance(), 20.0);
    assert_eq!(session.totals().unwrap().outstanding, 20.0);
}
