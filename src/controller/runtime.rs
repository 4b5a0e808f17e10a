use crate::error::{ChargerError, Result};
use crate::hardware::ChargerHardware;
use crate::indicator::IndicatorPattern;

use super::types::Phase;

impl<H: ChargerHardware> super::ChargeController<H> {
    /// Power-on sequence: settle, flash both indicators, then idle with the
    /// load off.
    pub fn power_on(&mut self) {
        let timing = self.config.timing.clone();
        self.logger
            .info(&format!("Powering on, version {}", env!("APP_VERSION")));

        self.set_load(false);
        self.sleep(timing.startup_delay_ms);

        self.hardware.set_charging_indicator(true);
        self.hardware.set_done_indicator(true);
        self.sleep(timing.self_test_step_ms);
        self.hardware.set_charging_indicator(false);
        self.sleep(timing.self_test_step_ms);

        self.apply_pattern(IndicatorPattern::Idle);
        self.logger.debug("Self test done, waiting for battery");
    }

    /// Run one step and block for the delay it asked for
    pub fn tick(&mut self) -> Phase {
        let step = self.step();
        self.sleep(step.sleep_ms);
        self.ticks += 1;
        self.logger.trace(&format!(
            "tick {}: {} (slept {} ms)",
            self.ticks, step.phase, step.sleep_ms
        ));
        step.phase
    }

    /// Tick until `done` holds, giving up after `max_ticks`
    pub fn run_until<F>(&mut self, max_ticks: u64, mut done: F) -> Result<Phase>
    where
        F: FnMut(&Self) -> bool,
    {
        for _ in 0..max_ticks {
            if done(self) {
                return Ok(self.phase);
            }
            self.tick();
        }

        if done(self) {
            return Ok(self.phase);
        }
        Err(ChargerError::timeout(format!(
            "Condition not reached within {} ticks (phase {})",
            max_ticks, self.phase
        )))
    }

    /// Control loop for the lifetime of the board
    pub fn run_forever(&mut self) -> ! {
        loop {
            self.tick();
        }
    }

    fn sleep(&mut self, ms: u32) {
        self.hardware.sleep_ms(ms);
        self.uptime_ms += u64::from(ms);
    }
}
