#![cfg(test)]

use super::defaults::*;
use super::*;

#[test]
fn test_default_config() {
    let config = ChargerConfig::default();
    assert_eq!(config.timing.phase_1_time_ms, 600_000);
    assert_eq!(config.timing.impulse_on_time_ms + config.timing.impulse_off_time_ms, 1000);
    assert_eq!(config.sampling.readings_count, 30);
    assert_eq!(config.sampling.average_length, 7);
    assert_eq!(config.guards.presence_threshold_raw, 70);
    assert!(config.guards.overheat_protection);
}

#[test]
fn test_config_validation() {
    let mut config = ChargerConfig::default();
    assert!(config.validate().is_ok());

    config.sampling.readings_count = 0;
    assert!(config.validate().is_err());

    config = ChargerConfig::default();
    config.sampling.average_length = MAX_AVERAGE_LENGTH + 1;
    assert!(config.validate().is_err());

    config = ChargerConfig::default();
    config.timing.maximum_charge_time_ms = config.timing.phase_1_time_ms;
    assert!(config.validate().is_err());

    config = ChargerConfig::default();
    config.logging.level = "LOUD".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_overheat_threshold_ignored_when_disabled() {
    let mut config = ChargerConfig::without_overheat_protection();
    config.guards.overheat_threshold_raw = ADC_MAX_READING;
    assert!(config.validate().is_ok());

    config.guards.overheat_protection = true;
    assert!(config.validate().is_err());
}

#[test]
fn test_raw_to_millivolt_conversion() {
    let sampling = SamplingConfig::default();
    // 30 readings of 307 counts -> 307 * 5000 / 1024 = 1499 mV
    assert_eq!(sampling.raw_sum_to_mv(307 * 30, 30), 1499);
    assert_eq!(sampling.raw_sum_to_mv(0, 30), 0);
    assert_eq!(sampling.raw_sum_to_mv(100, 0), 0);

    assert_eq!(sampling.mv_to_raw(1500), 307);
    assert_eq!(sampling.mv_to_raw(u32::MAX), ADC_MAX_READING);
}

#[test]
fn test_sampling_bounds_rejected() {
    let mut config = ChargerConfig::default();
    config.sampling.readings_count = 5_000_000;
    assert!(config.validate().is_err());

    config = ChargerConfig::default();
    config.sampling.voltage_multiplier_mv = u32::MAX;
    assert!(config.validate().is_err());

    config = ChargerConfig::default();
    config.sampling.readings_count = MAX_READINGS_COUNT;
    config.sampling.voltage_multiplier_mv = MAX_VOLTAGE_MULTIPLIER_MV;
    assert!(config.validate().is_ok());
}

#[test]
fn test_raw_sum_conversion_saturates() {
    let sampling = SamplingConfig {
        voltage_multiplier_mv: u32::MAX,
        ..SamplingConfig::default()
    };
    assert_eq!(sampling.raw_sum_to_mv(u64::MAX, 1), u32::MAX);
    // Product exceeds u64 but the quotient still fits
    assert_eq!(sampling.raw_sum_to_mv(1023 * 5_000_000, 5_000_000), 4_290_772_991);
}

#[test]
fn test_largest_valid_batch_does_not_overflow() {
    let sampling = SamplingConfig {
        readings_count: MAX_READINGS_COUNT,
        voltage_multiplier_mv: MAX_VOLTAGE_MULTIPLIER_MV,
        ..SamplingConfig::default()
    };
    let mut detector = crate::termination::DeltaVDetector::new(&sampling);
    for _ in 0..MAX_READINGS_COUNT * 2 {
        detector.record_sample(ADC_MAX_READING);
    }
    assert_eq!(detector.samples_recorded(), 2);
    // 1023 * 100_000 / 1024 per batch, two batches in a zero-filled window of 7
    let batch_sum = u64::from(ADC_MAX_READING) * u64::from(MAX_READINGS_COUNT);
    assert_eq!(sampling.raw_sum_to_mv(batch_sum, MAX_READINGS_COUNT), 99_902);
    assert_eq!(detector.max_voltage_mv(), 2 * 99_902 / 7);
}

#[test]
fn test_config_serialization() {
    let config = ChargerConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let deserialized: ChargerConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, deserialized);
}
