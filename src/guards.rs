//! Battery presence and thermal guards

use crate::config::{ADC_MAX_READING, GuardsConfig};
use crate::hardware::ChargerHardware;

/// Thresholds raw voltage readings into a plugged / unplugged decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceMonitor {
    threshold_raw: u16,
    last_raw: u16,
}

impl PresenceMonitor {
    pub fn new(threshold_raw: u16) -> Self {
        Self {
            threshold_raw,
            last_raw: 0,
        }
    }

    /// Record a reading and report whether it shows a battery.
    ///
    /// Readings above the converter range count as "not present".
    pub fn observe(&mut self, raw: u16) -> bool {
        self.last_raw = raw;
        self.battery_plugged()
    }

    /// Presence according to the last observed reading
    pub fn battery_plugged(&self) -> bool {
        self.last_raw > self.threshold_raw && self.last_raw <= ADC_MAX_READING
    }

    pub fn last_raw(&self) -> u16 {
        self.last_raw
    }
}

/// Pluggable overheat policy
pub trait OverheatGuard: std::fmt::Debug {
    /// Sample the thermal input if needed and report overheat
    fn is_over_heat(&mut self, hardware: &mut dyn ChargerHardware) -> bool;

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Guard for boards without a thermal sensor
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverheatGuard;

impl OverheatGuard for NoOverheatGuard {
    fn is_over_heat(&mut self, _hardware: &mut dyn ChargerHardware) -> bool {
        false
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Thermistor-backed guard tripping above a raw threshold
#[derive(Debug, Clone, Copy)]
pub struct ThermistorGuard {
    threshold_raw: u16,
    last_raw: Option<u16>,
}

impl ThermistorGuard {
    pub fn new(threshold_raw: u16) -> Self {
        Self {
            threshold_raw,
            last_raw: None,
        }
    }

    pub fn last_raw(&self) -> Option<u16> {
        self.last_raw
    }
}

impl OverheatGuard for ThermistorGuard {
    fn is_over_heat(&mut self, hardware: &mut dyn ChargerHardware) -> bool {
        let raw = hardware.read_raw_temperature();
        self.last_raw = Some(raw);
        raw > self.threshold_raw
    }
}

/// Build the overheat policy selected by the configuration
pub fn overheat_guard_from_config(config: &GuardsConfig) -> Box<dyn OverheatGuard> {
    if config.overheat_protection {
        Box::new(ThermistorGuard::new(config.overheat_threshold_raw))
    } else {
        Box::new(NoOverheatGuard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplingConfig;
    use crate::hardware::{ChargerHardware as _, SimEvent, SimulatedCharger};

    #[test]
    fn presence_threshold_is_exclusive() {
        let mut presence = PresenceMonitor::new(70);
        assert!(!presence.battery_plugged());
        assert!(!presence.observe(70));
        assert!(presence.observe(71));
        assert!(presence.observe(ADC_MAX_READING));
        assert!(!presence.observe(ADC_MAX_READING + 1));
        assert_eq!(presence.last_raw(), ADC_MAX_READING + 1);
    }

    #[test]
    fn thermistor_trips_above_threshold() {
        let mut hw = SimulatedCharger::new(&SamplingConfig::default())
            .schedule(100, SimEvent::SetTemperature(512))
            .schedule(200, SimEvent::SetTemperature(513));
        let mut guard = ThermistorGuard::new(512);

        assert!(!guard.is_over_heat(&mut hw));
        hw.sleep_ms(100);
        assert!(!guard.is_over_heat(&mut hw));
        hw.sleep_ms(100);
        assert!(guard.is_over_heat(&mut hw));
        assert_eq!(guard.last_raw(), Some(513));
    }

    #[test]
    fn disabled_guard_never_reads_the_sensor() {
        let mut hw = SimulatedCharger::new(&SamplingConfig::default())
            .schedule(0, SimEvent::SetTemperature(1000));
        let mut guard = overheat_guard_from_config(&GuardsConfig {
            overheat_protection: false,
            ..GuardsConfig::default()
        });

        assert!(!guard.is_enabled());
        assert!(!guard.is_over_heat(&mut hw));
        assert_eq!(hw.temperature_reads(), 0);
    }
}
