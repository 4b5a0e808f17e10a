use crate::hardware::ChargerHardware;
use crate::indicator::IndicatorPattern;
use crate::session::SessionOutcome;
use crate::termination::ChargeStatus;

use super::types::{GuardOutcome, ImpulseHalf, Interruption, Phase, Step};

impl<H: ChargerHardware> super::ChargeController<H> {
    /// Run one unit of work for the active phase.
    ///
    /// Does not sleep. The returned step says how long the board must block
    /// before the next call.
    pub fn step(&mut self) -> Step {
        match self.phase {
            Phase::WaitingForBattery => self.step_waiting(),
            Phase::Phase1Bulk | Phase::FinalPhase => self.step_impulse(),
            Phase::MainPhase => self.step_main(),
            Phase::Finished => self.step_finished(),
            Phase::OverheatFault | Phase::TimeoutFault => self.step_fault(),
        }
    }

    /// Overheat first, then presence
    pub(crate) fn run_guards(&mut self) -> GuardOutcome {
        if self.overheat.is_over_heat(&mut self.hardware) {
            return GuardOutcome::Tripped(Interruption::Overheat);
        }

        let raw_voltage = self.hardware.read_raw_voltage();
        if !self.presence.observe(raw_voltage) {
            return GuardOutcome::Tripped(Interruption::BatteryRemoved);
        }

        GuardOutcome::Clear { raw_voltage }
    }

    fn poll_presence(&mut self) -> bool {
        let raw = self.hardware.read_raw_voltage();
        self.presence.observe(raw)
    }

    fn step_waiting(&mut self) -> Step {
        if !self.poll_presence() {
            return Step::new(Phase::WaitingForBattery, self.config.timing.poll_interval_ms);
        }

        if let Err(e) = self
            .sessions
            .start_session(self.uptime_ms, &self.config.sampling)
        {
            self.logger
                .error(&format!("Failed to start charge session: {}", e));
        }

        self.logger.info(&format!(
            "Battery detected (raw {}), starting bulk phase",
            self.presence.last_raw()
        ));
        self.apply_pattern(IndicatorPattern::Charging);
        self.transition(Phase::Phase1Bulk);
        self.begin_impulse_phase();
        self.step_impulse()
    }

    /// One half of an impulse in the bulk or final phase
    fn step_impulse(&mut self) -> Step {
        match self.next_half {
            ImpulseHalf::LoadOn => {
                if let GuardOutcome::Tripped(reason) = self.run_guards() {
                    return self.interrupt(reason);
                }

                let on_ms = self.config.timing.impulse_on_time_ms;
                self.set_load(true);
                if let Some(session) = self.sessions.current_mut() {
                    session.advance(on_ms);
                }
                self.next_half = ImpulseHalf::LoadOff;
                Step::new(self.phase, on_ms)
            }
            ImpulseHalf::LoadOff => {
                let off_ms = self.config.timing.impulse_off_time_ms;
                self.set_load(false);
                self.next_half = ImpulseHalf::LoadOn;

                let phase_elapsed = match self.sessions.current_mut() {
                    Some(session) => {
                        session.advance(off_ms);
                        session.note_impulse();
                        session.phase_elapsed_ms()
                    }
                    None => 0,
                };

                match self.phase {
                    Phase::Phase1Bulk if phase_elapsed >= self.config.timing.phase_1_time_ms => {
                        self.transition(Phase::MainPhase);
                        if let Some(session) = self.sessions.current_mut() {
                            session.mark_phase_start();
                        }
                    }
                    Phase::FinalPhase
                        if phase_elapsed >= self.config.timing.final_phase_time_ms =>
                    {
                        self.finish_charge();
                    }
                    _ => {}
                }

                Step::new(self.phase, off_ms)
            }
        }
    }

    fn step_main(&mut self) -> Step {
        let raw_voltage = match self.run_guards() {
            GuardOutcome::Clear { raw_voltage } => raw_voltage,
            GuardOutcome::Tripped(reason) => return self.interrupt(reason),
        };

        let (status, elapsed) = match self.sessions.current_mut() {
            Some(session) => (session.record_sample(raw_voltage), session.elapsed_ms()),
            None => (ChargeStatus::NotCharged, 0),
        };

        if status.is_charged() {
            if elapsed < self.config.timing.no_need_trickle_time_ms {
                self.logger
                    .info(&format!("Charged after {} ms, skipping top-off", elapsed));
                self.finish_charge();
                return Step::new(self.phase, self.config.timing.poll_interval_ms);
            }

            self.logger
                .info(&format!("Charged after {} ms, starting top-off", elapsed));
            self.transition(Phase::FinalPhase);
            self.begin_impulse_phase();
            if let Some(session) = self.sessions.current_mut() {
                session.note_top_off();
            }
            return self.step_impulse();
        }

        if elapsed > self.config.timing.maximum_charge_time_ms {
            return self.interrupt(Interruption::ChargeTimeout);
        }

        let full_ms = self.config.timing.full_impulse_time_ms;
        self.set_load(true);
        if let Some(session) = self.sessions.current_mut() {
            session.advance(full_ms);
        }
        Step::new(Phase::MainPhase, full_ms)
    }

    fn step_finished(&mut self) -> Step {
        self.set_load(false);
        if !self.poll_presence() {
            self.logger.info("Charged battery removed");
            self.enter_waiting();
        }
        Step::new(self.phase, self.config.timing.poll_interval_ms)
    }

    fn step_fault(&mut self) -> Step {
        self.set_load(false);
        if !self.poll_presence() {
            self.logger
                .info(&format!("Battery removed, clearing {}", self.phase));
            self.enter_waiting();
            return Step::new(self.phase, self.config.timing.poll_interval_ms);
        }

        if self.pattern.blinks() {
            self.toggle_blink();
        }
        Step::new(self.phase, self.config.timing.fault_blink_interval_ms)
    }

    fn begin_impulse_phase(&mut self) {
        self.next_half = ImpulseHalf::LoadOn;
        if let Some(session) = self.sessions.current_mut() {
            session.mark_phase_start();
        }
    }

    fn finish_charge(&mut self) {
        self.set_load(false);
        if let Err(e) = self.sessions.end_session(
            SessionOutcome::Completed { topped_off: false },
            self.uptime_ms,
        ) {
            self.logger
                .error(&format!("Failed to end charge session: {}", e));
        }
        self.transition(Phase::Finished);
        self.apply_pattern(IndicatorPattern::Done);
    }

    fn enter_waiting(&mut self) {
        self.set_load(false);
        self.transition(Phase::WaitingForBattery);
        self.apply_pattern(IndicatorPattern::Idle);
    }

    /// Stop the active session for `reason`, load off before anything else
    pub(crate) fn interrupt(&mut self, reason: Interruption) -> Step {
        self.set_load(false);
        self.next_half = ImpulseHalf::LoadOn;

        if let Some(session) = self.sessions.current() {
            session.logger().warn(&format!(
                "Charging interrupted in {}: {:?}",
                self.phase, reason
            ));
        }
        if let Err(e) = self
            .sessions
            .end_session(SessionOutcome::Interrupted(reason), self.uptime_ms)
        {
            self.logger
                .error(&format!("Failed to end charge session: {}", e));
        }

        match reason.target_phase() {
            Phase::OverheatFault => {
                self.transition(Phase::OverheatFault);
                self.apply_pattern(IndicatorPattern::OverheatBlink);
                Step::new(self.phase, self.config.timing.fault_blink_interval_ms)
            }
            Phase::TimeoutFault => {
                self.transition(Phase::TimeoutFault);
                self.apply_pattern(IndicatorPattern::TimeoutBlink);
                Step::new(self.phase, self.config.timing.fault_blink_interval_ms)
            }
            _ => {
                self.enter_waiting();
                Step::new(self.phase, self.config.timing.poll_interval_ms)
            }
        }
    }
}
