use impulse_charger::config::SamplingConfig;
use impulse_charger::controller::Interruption;
use impulse_charger::session::{SessionManager, SessionOutcome};

#[test]
fn start_sample_end_session() {
    let sampling = SamplingConfig {
        readings_count: 1,
        average_length: 1,
        ..SamplingConfig::default()
    };
    let mut mgr = SessionManager::default();
    assert!(mgr.start_session(500, &sampling).is_ok());

    let session = mgr.current_mut().unwrap();
    session.advance(1_000);
    session.record_sample(300);
    session.record_sample(310);
    assert_eq!(session.detector().samples_recorded(), 2);

    let stats = mgr.get_session_stats();
    assert_eq!(
        stats.get("session_active").and_then(|v| v.as_bool()),
        Some(true)
    );
    assert_eq!(stats.get("elapsed_ms").and_then(|v| v.as_u64()), Some(1_000));

    let record = mgr
        .end_session(SessionOutcome::Completed { topped_off: false }, 9_000)
        .unwrap();
    assert!(mgr.current_session.is_none());
    assert_eq!(record.started_at_ms, 500);
    assert_eq!(record.ended_at_ms, 9_000);
    assert_eq!(record.smoothed_samples, 2);
    assert_eq!(record.peak_voltage_mv, sampling.raw_sum_to_mv(310, 1));
}

#[test]
fn each_session_starts_with_a_fresh_detector() {
    let sampling = SamplingConfig::default();
    let mut mgr = SessionManager::new(8);

    mgr.start_session(0, &sampling).unwrap();
    for _ in 0..sampling.readings_count {
        mgr.current_mut().unwrap().record_sample(400);
    }
    assert!(mgr.current().unwrap().detector().max_voltage_mv() > 0);
    mgr.end_session(SessionOutcome::Interrupted(Interruption::BatteryRemoved), 1)
        .unwrap();

    mgr.start_session(2, &sampling).unwrap();
    let session = mgr.current().unwrap();
    assert_eq!(session.id(), 2);
    assert_eq!(session.elapsed_ms(), 0);
    assert_eq!(session.detector().max_voltage_mv(), 0);
    assert_eq!(session.detector().samples_recorded(), 0);
}

#[test]
fn record_serializes_outcome() {
    let mut mgr = SessionManager::new(1);
    mgr.start_session(0, &SamplingConfig::default()).unwrap();
    let record = mgr
        .end_session(SessionOutcome::Interrupted(Interruption::ChargeTimeout), 0)
        .unwrap();

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["outcome"]["Interrupted"], "ChargeTimeout");
}
