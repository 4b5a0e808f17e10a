use crate::hardware::ChargerHardware;

use super::types::ChargerSnapshot;

impl<H: ChargerHardware> super::ChargeController<H> {
    /// Point-in-time view of the controller for logging and benches
    pub fn snapshot(&self) -> ChargerSnapshot {
        let (charging_indicator, done_indicator) = self.pattern.levels(self.blink_on);
        let session = self.sessions.current();

        ChargerSnapshot {
            phase: self.phase,
            load_on: self.load_on,
            indicator: self.pattern,
            charging_indicator,
            done_indicator,
            uptime_ms: self.uptime_ms,
            ticks: self.ticks,
            last_raw_voltage: self.presence.last_raw(),
            overheat_protection: self.overheat.is_enabled(),
            elapsed_ms: session.map(|s| s.elapsed_ms()),
            phase_elapsed_ms: session.map(|s| s.phase_elapsed_ms()),
            impulses: session.map(|s| s.impulses()),
            max_voltage_mv: session.map(|s| s.detector().max_voltage_mv()),
            medium_voltage_mv: session.map(|s| s.detector().medium_voltage_mv()),
            session: self.sessions.get_session_stats(),
        }
    }
}
