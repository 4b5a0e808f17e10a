use impulse_charger::config::SamplingConfig;
use impulse_charger::hardware::{BatteryProfile, ChargerHardware, SimEvent, SimulatedCharger};

#[test]
fn empty_bench_reads_below_presence_threshold() {
    let mut hw = SimulatedCharger::new(&SamplingConfig::default());
    assert!(hw.read_raw_voltage() < 70);
    assert_eq!(hw.voltage_reads(), 1);
}

#[test]
fn ripple_alternates_around_the_cell_voltage() {
    let sampling = SamplingConfig::default();
    let mut hw = SimulatedCharger::new(&sampling).with_battery(BatteryProfile::nimh_aa().with_ripple(20));
    let a = hw.read_raw_voltage();
    let b = hw.read_raw_voltage();
    assert_ne!(a, b);
    assert_eq!(a, sampling.mv_to_raw(1270));
    assert_eq!(b, sampling.mv_to_raw(1230));
}

fn pulse<H: ChargerHardware>(mut board: H) {
    board.set_load(true);
    board.sleep_ms(2_000);
    board.set_load(false);
}

#[test]
fn load_time_is_tracked_through_a_mutable_borrow() {
    let mut hw = SimulatedCharger::new(&SamplingConfig::default())
        .schedule(1_000, SimEvent::InsertBattery(BatteryProfile::nimh_aa()));
    pulse(&mut hw);

    assert_eq!(hw.load_on_time_ms(), 2_000);
    // The battery only arrived after the first sleep completed
    assert_eq!(hw.charged_ms(), 0);
    assert!(hw.battery_inserted());
    assert!(hw.load_ever_on());
    assert!(!hw.load_on());
}
