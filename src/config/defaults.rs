use super::*;

// Phase durations (milliseconds of session time)
pub const PHASE_1_TIME_MS: u32 = 600_000;
pub const FINAL_PHASE_TIME_MS: u32 = 900_000;
pub const MAXIMUM_CHARGE_TIME_MS: u32 = 21_600_000;
pub const NO_NEED_TRICKLE_TIME_MS: u32 = 900_000;

// Impulse timing
pub const IMPULSE_ON_TIME_MS: u32 = 750;
pub const IMPULSE_OFF_TIME_MS: u32 = 250;
pub const FULL_IMPULSE_TIME_MS: u32 = 1000;

// Holding-loop cadence
pub const POLL_INTERVAL_MS: u32 = 300;
pub const FAULT_BLINK_INTERVAL_MS: u32 = 400;
pub const STARTUP_DELAY_MS: u32 = 1000;
pub const SELF_TEST_STEP_MS: u32 = 500;

// Sampling and termination
pub const READINGS_COUNT: u32 = 30;
pub const MAX_READINGS_COUNT: u32 = 1024;
pub const AVERAGE_LENGTH: usize = 7;
pub const MAX_AVERAGE_LENGTH: usize = 32;
/// Millivolts represented by a full-scale ADC reading
pub const VOLTAGE_MULTIPLIER_MV: u32 = 5000;
pub const MAX_VOLTAGE_MULTIPLIER_MV: u32 = 100_000;
pub const ADC_FULL_SCALE: u32 = 1024;
pub const ADC_MAX_READING: u16 = 1023;
pub const DROP_THRESHOLD_MV: u32 = 10;

// Guards
pub const PRESENCE_THRESHOLD_RAW: u16 = 70;
pub const OVERHEAT_THRESHOLD_RAW: u16 = 512;
pub const OVERHEAT_PROTECTION: bool = true;

pub const SESSION_HISTORY_SIZE: usize = 16;

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            phase_1_time_ms: PHASE_1_TIME_MS,
            final_phase_time_ms: FINAL_PHASE_TIME_MS,
            maximum_charge_time_ms: MAXIMUM_CHARGE_TIME_MS,
            no_need_trickle_time_ms: NO_NEED_TRICKLE_TIME_MS,
            impulse_on_time_ms: IMPULSE_ON_TIME_MS,
            impulse_off_time_ms: IMPULSE_OFF_TIME_MS,
            full_impulse_time_ms: FULL_IMPULSE_TIME_MS,
            poll_interval_ms: POLL_INTERVAL_MS,
            fault_blink_interval_ms: FAULT_BLINK_INTERVAL_MS,
            startup_delay_ms: STARTUP_DELAY_MS,
            self_test_step_ms: SELF_TEST_STEP_MS,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            readings_count: READINGS_COUNT,
            average_length: AVERAGE_LENGTH,
            voltage_multiplier_mv: VOLTAGE_MULTIPLIER_MV,
            adc_full_scale: ADC_FULL_SCALE,
            drop_threshold_mv: DROP_THRESHOLD_MV,
        }
    }
}

impl Default for GuardsConfig {
    fn default() -> Self {
        Self {
            presence_threshold_raw: PRESENCE_THRESHOLD_RAW,
            overheat_protection: OVERHEAT_PROTECTION,
            overheat_threshold_raw: OVERHEAT_THRESHOLD_RAW,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            json_format: false,
        }
    }
}

impl Default for ChargerConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            sampling: SamplingConfig::default(),
            guards: GuardsConfig::default(),
            logging: LoggingConfig::default(),
            session_history_size: SESSION_HISTORY_SIZE,
        }
    }
}
