//! Configuration for the charge controller
//!
//! Every threshold is a compile-time constant in [`defaults`]. The structures
//! here carry those constants into the controller as construction parameters
//! so a bench or test can build a controller with shorter phases. Nothing is
//! ever read from files or the environment.

use crate::error::{ChargerError, Result};
use serde::{Deserialize, Serialize};

pub mod defaults;

pub use defaults::{
    ADC_MAX_READING, MAX_AVERAGE_LENGTH, MAX_READINGS_COUNT, MAX_VOLTAGE_MULTIPLIER_MV,
};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargerConfig {
    /// Phase durations and loop cadence
    pub timing: TimingConfig,

    /// Voltage sampling and termination parameters
    pub sampling: SamplingConfig,

    /// Presence and thermal guard thresholds
    pub guards: GuardsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Number of finished sessions kept in memory
    pub session_history_size: usize,
}

/// Phase durations and loop cadence, all in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Length of the bulk impulse phase
    pub phase_1_time_ms: u32,

    /// Length of the top-off impulse phase
    pub final_phase_time_ms: u32,

    /// Session time after which the main phase gives up
    pub maximum_charge_time_ms: u32,

    /// Sessions terminated before this point skip the top-off phase
    pub no_need_trickle_time_ms: u32,

    /// Load-on half of one impulse
    pub impulse_on_time_ms: u32,

    /// Load-off half of one impulse
    pub impulse_off_time_ms: u32,

    /// Main phase sampling cadence
    pub full_impulse_time_ms: u32,

    /// Presence polling interval while idle or finished
    pub poll_interval_ms: u32,

    /// Indicator toggle interval in fault states
    pub fault_blink_interval_ms: u32,

    /// Settling delay before the power-on self test
    pub startup_delay_ms: u32,

    /// Duration of each self-test indicator step
    pub self_test_step_ms: u32,
}

/// Voltage sampling and delta-V termination parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Raw ADC readings averaged into one smoothed sample
    pub readings_count: u32,

    /// Smoothed samples in the moving-average window
    pub average_length: usize,

    /// Millivolts represented by a full-scale reading
    pub voltage_multiplier_mv: u32,

    /// ADC divisor (1024 for a 10-bit converter)
    pub adc_full_scale: u32,

    /// Drop below the running peak that signals a full battery
    pub drop_threshold_mv: u32,
}

/// Presence and thermal guard thresholds, in raw ADC counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardsConfig {
    /// Readings above this count mean a battery is inserted
    pub presence_threshold_raw: u16,

    /// Whether a thermal sensor is fitted and checked
    pub overheat_protection: bool,

    /// Thermal readings above this count trigger a safe stop
    pub overheat_threshold_raw: u16,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl ChargerConfig {
    /// Build a configuration with overheat protection compiled out
    pub fn without_overheat_protection() -> Self {
        let mut config = Self::default();
        config.guards.overheat_protection = false;
        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.timing.validate()?;
        self.sampling.validate()?;
        self.guards.validate()?;

        if crate::logging::parse_log_level(&self.logging.level).is_err() {
            return Err(ChargerError::validation(
                "logging.level",
                "Must be one of TRACE, DEBUG, INFO, WARN, ERROR",
            ));
        }

        if self.session_history_size == 0 {
            return Err(ChargerError::validation(
                "session_history_size",
                "Must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl TimingConfig {
    fn validate(&self) -> Result<()> {
        let cadences = [
            ("timing.impulse_on_time_ms", self.impulse_on_time_ms),
            ("timing.full_impulse_time_ms", self.full_impulse_time_ms),
            ("timing.poll_interval_ms", self.poll_interval_ms),
            ("timing.fault_blink_interval_ms", self.fault_blink_interval_ms),
        ];
        for (field, value) in cadences {
            if value == 0 {
                return Err(ChargerError::validation(field, "Must be greater than 0"));
            }
        }

        if self.maximum_charge_time_ms <= self.phase_1_time_ms {
            return Err(ChargerError::validation(
                "timing.maximum_charge_time_ms",
                "Must exceed the bulk phase duration",
            ));
        }

        Ok(())
    }
}

impl SamplingConfig {
    fn validate(&self) -> Result<()> {
        if self.readings_count == 0 || self.readings_count > MAX_READINGS_COUNT {
            return Err(ChargerError::validation(
                "sampling.readings_count".to_string(),
                format!("Must be between 1 and {}", MAX_READINGS_COUNT),
            ));
        }

        if self.average_length == 0 || self.average_length > MAX_AVERAGE_LENGTH {
            return Err(ChargerError::validation(
                "sampling.average_length".to_string(),
                format!("Must be between 1 and {}", MAX_AVERAGE_LENGTH),
            ));
        }

        if self.adc_full_scale == 0 {
            return Err(ChargerError::validation(
                "sampling.adc_full_scale",
                "Must be greater than 0",
            ));
        }

        if self.voltage_multiplier_mv == 0
            || self.voltage_multiplier_mv > MAX_VOLTAGE_MULTIPLIER_MV
        {
            return Err(ChargerError::validation(
                "sampling.voltage_multiplier_mv".to_string(),
                format!("Must be between 1 and {}", MAX_VOLTAGE_MULTIPLIER_MV),
            ));
        }

        Ok(())
    }

    /// Convert a sum of `count` raw readings into millivolts, saturating at `u32::MAX`
    pub fn raw_sum_to_mv(&self, raw_sum: u64, count: u32) -> u32 {
        let divisor = u128::from(count) * u128::from(self.adc_full_scale);
        if divisor == 0 {
            return 0;
        }
        let mv = u128::from(raw_sum) * u128::from(self.voltage_multiplier_mv) / divisor;
        u32::try_from(mv).unwrap_or(u32::MAX)
    }

    /// Raw reading that corresponds to `mv` millivolts, clamped to the ADC range
    pub fn mv_to_raw(&self, mv: u32) -> u16 {
        if self.voltage_multiplier_mv == 0 {
            return 0;
        }
        let raw = u64::from(mv) * u64::from(self.adc_full_scale)
            / u64::from(self.voltage_multiplier_mv);
        u16::try_from(raw.min(u64::from(ADC_MAX_READING))).unwrap_or(ADC_MAX_READING)
    }
}

impl GuardsConfig {
    fn validate(&self) -> Result<()> {
        if self.presence_threshold_raw >= ADC_MAX_READING {
            return Err(ChargerError::validation(
                "guards.presence_threshold_raw",
                "Must be below the ADC full-scale reading",
            ));
        }

        if self.overheat_protection && self.overheat_threshold_raw >= ADC_MAX_READING {
            return Err(ChargerError::validation(
                "guards.overheat_threshold_raw",
                "Must be below the ADC full-scale reading",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
