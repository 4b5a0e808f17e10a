//! Virtual-clock bench hardware
//!
//! `sleep_ms` advances a simulated clock instantly, so a six hour charge runs
//! in milliseconds. The battery model rises while the load is on, peaks, then
//! sags the way a full NiMH cell does. Scheduled events insert or pull the
//! battery and move the thermal reading at given simulated times.

use crate::config::SamplingConfig;
use serde::Serialize;

/// Raw reading of the battery input with nothing inserted
const LEAKAGE_RAW: u16 = 5;

/// Thermal reading of a cell at room temperature
const AMBIENT_TEMPERATURE_RAW: u16 = 300;

/// Voltage curve of a cell under charge, indexed by accumulated load-on time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatteryProfile {
    /// Open-circuit voltage when inserted
    pub start_mv: u32,
    /// Voltage at the end-of-charge peak
    pub peak_mv: u32,
    /// Load-on time needed to reach the peak
    pub peak_after_ms: u64,
    /// Sag rate after the peak
    pub drop_mv_per_min: u32,
    /// Alternating ripple added to consecutive readings
    pub ripple_mv: u32,
}

impl BatteryProfile {
    /// A discharged AA cell that peaks after 45 minutes of charge
    pub fn nimh_aa() -> Self {
        Self {
            start_mv: 1250,
            peak_mv: 1480,
            peak_after_ms: 45 * 60_000,
            drop_mv_per_min: 6,
            ripple_mv: 0,
        }
    }

    /// A cell whose voltage keeps creeping up and never shows a peak
    pub fn never_peaking() -> Self {
        Self {
            start_mv: 1250,
            peak_mv: 1500,
            peak_after_ms: 24 * 60 * 60_000,
            drop_mv_per_min: 0,
            ripple_mv: 0,
        }
    }

    /// Add alternating ripple to every reading
    pub fn with_ripple(mut self, ripple_mv: u32) -> Self {
        self.ripple_mv = ripple_mv;
        self
    }

    /// Cell voltage after `charged_ms` of load-on time
    pub fn voltage_mv(&self, charged_ms: u64) -> u32 {
        let start = u64::from(self.start_mv);
        let peak = u64::from(self.peak_mv.max(self.start_mv));

        let mv = if charged_ms < self.peak_after_ms {
            start + (peak - start) * charged_ms / self.peak_after_ms.max(1)
        } else {
            let sag = u64::from(self.drop_mv_per_min) * (charged_ms - self.peak_after_ms) / 60_000;
            peak - sag.min(peak - start)
        };
        u32::try_from(mv).unwrap_or(u32::MAX)
    }
}

/// Something that happens to the bench at a scheduled time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    InsertBattery(BatteryProfile),
    RemoveBattery,
    SetTemperature(u16),
}

/// Simulated charger board
#[derive(Debug, Clone)]
pub struct SimulatedCharger {
    sampling: SamplingConfig,
    now_ms: u64,
    events: Vec<(u64, SimEvent)>,

    battery: Option<BatteryProfile>,
    charged_ms: u64,
    temperature_raw: u16,

    load_on: bool,
    charging_indicator: bool,
    done_indicator: bool,

    load_on_time_ms: u64,
    load_history: Vec<(u64, bool)>,
    voltage_reads: u64,
    temperature_reads: u64,
}

impl SimulatedCharger {
    /// Empty bench converting millivolts with the given sampling calibration
    pub fn new(sampling: &SamplingConfig) -> Self {
        Self {
            sampling: sampling.clone(),
            now_ms: 0,
            events: Vec::new(),
            battery: None,
            charged_ms: 0,
            temperature_raw: AMBIENT_TEMPERATURE_RAW,
            load_on: false,
            charging_indicator: false,
            done_indicator: false,
            load_on_time_ms: 0,
            load_history: Vec::new(),
            voltage_reads: 0,
            temperature_reads: 0,
        }
    }

    /// Bench with a battery already inserted
    pub fn with_battery(mut self, profile: BatteryProfile) -> Self {
        self.insert_battery(profile);
        self
    }

    /// Schedule an event at simulated time `at_ms`
    pub fn schedule(mut self, at_ms: u64, event: SimEvent) -> Self {
        self.push_event(at_ms, event);
        self
    }

    /// Schedule an event on a bench that is already in use
    pub fn push_event(&mut self, at_ms: u64, event: SimEvent) {
        let idx = self.events.partition_point(|(t, _)| *t <= at_ms);
        self.events.insert(idx, (at_ms, event));
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn battery_inserted(&self) -> bool {
        self.battery.is_some()
    }

    /// Load-on time delivered to the current battery
    pub fn charged_ms(&self) -> u64 {
        self.charged_ms
    }

    pub fn load_on(&self) -> bool {
        self.load_on
    }

    pub fn charging_indicator(&self) -> bool {
        self.charging_indicator
    }

    pub fn done_indicator(&self) -> bool {
        self.done_indicator
    }

    /// Total load-on time over the whole bench run
    pub fn load_on_time_ms(&self) -> u64 {
        self.load_on_time_ms
    }

    /// Every load level change as (time, level)
    pub fn load_history(&self) -> &[(u64, bool)] {
        &self.load_history
    }

    pub fn load_ever_on(&self) -> bool {
        self.load_history.iter().any(|(_, on)| *on)
    }

    pub fn voltage_reads(&self) -> u64 {
        self.voltage_reads
    }

    pub fn temperature_reads(&self) -> u64 {
        self.temperature_reads
    }

    fn insert_battery(&mut self, profile: BatteryProfile) {
        self.battery = Some(profile);
        self.charged_ms = 0;
    }

    fn apply_due_events(&mut self) {
        let due = self.events.partition_point(|(t, _)| *t <= self.now_ms);
        let events: Vec<(u64, SimEvent)> = self.events.drain(..due).collect();
        for (_, event) in events {
            match event {
                SimEvent::InsertBattery(profile) => self.insert_battery(profile),
                SimEvent::RemoveBattery => self.battery = None,
                SimEvent::SetTemperature(raw) => self.temperature_raw = raw,
            }
        }
    }

    fn ripple(&self, ripple_mv: u32) -> i64 {
        if ripple_mv == 0 {
            return 0;
        }
        if self.voltage_reads % 2 == 0 {
            i64::from(ripple_mv)
        } else {
            -i64::from(ripple_mv)
        }
    }
}

impl super::ChargerHardware for SimulatedCharger {
    fn read_raw_voltage(&mut self) -> u16 {
        self.apply_due_events();

        let raw = match self.battery {
            Some(profile) => {
                let mv = i64::from(profile.voltage_mv(self.charged_ms))
                    + self.ripple(profile.ripple_mv);
                self.sampling
                    .mv_to_raw(u32::try_from(mv.max(0)).unwrap_or(0))
            }
            None => LEAKAGE_RAW,
        };
        self.voltage_reads += 1;
        raw
    }

    fn read_raw_temperature(&mut self) -> u16 {
        self.apply_due_events();
        self.temperature_reads += 1;
        self.temperature_raw
    }

    fn set_load(&mut self, on: bool) {
        if self.load_on != on {
            self.load_history.push((self.now_ms, on));
        }
        self.load_on = on;
    }

    fn set_charging_indicator(&mut self, on: bool) {
        self.charging_indicator = on;
    }

    fn set_done_indicator(&mut self, on: bool) {
        self.done_indicator = on;
    }

    fn sleep_ms(&mut self, duration: u32) {
        let duration = u64::from(duration);
        if self.load_on {
            self.load_on_time_ms += duration;
            if self.battery.is_some() {
                self.charged_ms += duration;
            }
        }
        self.now_ms += duration;
        self.apply_due_events();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::ChargerHardware;

    #[test]
    fn profile_rises_peaks_and_sags() {
        let p = BatteryProfile::nimh_aa();
        assert_eq!(p.voltage_mv(0), 1250);
        assert!(p.voltage_mv(20 * 60_000) > 1250);
        assert_eq!(p.voltage_mv(p.peak_after_ms), 1480);
        assert_eq!(p.voltage_mv(p.peak_after_ms + 10 * 60_000), 1420);
        // Never sags below the starting voltage
        assert_eq!(p.voltage_mv(u64::from(u32::MAX)), 1250);
    }

    #[test]
    fn charge_only_accumulates_with_load_on() {
        let mut hw = SimulatedCharger::new(&SamplingConfig::default())
            .with_battery(BatteryProfile::nimh_aa());
        hw.sleep_ms(1000);
        assert_eq!(hw.charged_ms(), 0);
        hw.set_load(true);
        hw.sleep_ms(750);
        hw.set_load(false);
        hw.sleep_ms(250);
        assert_eq!(hw.charged_ms(), 750);
        assert_eq!(hw.now_ms(), 2000);
        assert_eq!(hw.load_history(), &[(1000, true), (1750, false)]);
    }

    #[test]
    fn scheduled_events_apply_in_time_order() {
        let mut hw = SimulatedCharger::new(&SamplingConfig::default())
            .schedule(2000, SimEvent::RemoveBattery)
            .schedule(500, SimEvent::InsertBattery(BatteryProfile::nimh_aa()))
            .schedule(1000, SimEvent::SetTemperature(800));

        assert_eq!(hw.read_raw_voltage(), LEAKAGE_RAW);
        hw.sleep_ms(600);
        assert!(hw.battery_inserted());
        assert_eq!(hw.read_raw_voltage(), SamplingConfig::default().mv_to_raw(1250));
        assert_eq!(hw.read_raw_temperature(), AMBIENT_TEMPERATURE_RAW);
        hw.sleep_ms(600);
        assert_eq!(hw.read_raw_temperature(), 800);
        hw.sleep_ms(1000);
        assert!(!hw.battery_inserted());
    }
}
