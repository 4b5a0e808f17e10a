//! Charge state machine
//!
//! [`ChargeController`] owns the board, the guards and the active
//! [`ChargeSession`](crate::session::ChargeSession). Every state does one
//! bounded unit of work per [`step`](ChargeController::step) and reports the
//! delay it owes; [`tick`](ChargeController::tick) pays that delay through
//! the board's blocking sleep. Guards run before any actuation in a charging
//! phase, and every exit from a charging phase switches the load off first.

use crate::config::ChargerConfig;
use crate::error::Result;
use crate::guards::{OverheatGuard, PresenceMonitor, overheat_guard_from_config};
use crate::hardware::ChargerHardware;
use crate::indicator::IndicatorPattern;
use crate::logging::{StructuredLogger, get_logger};
use crate::session::SessionManager;

mod phases;
mod runtime;
mod snapshot;
pub mod types;

pub use types::{ChargerSnapshot, GuardOutcome, Interruption, Phase, Step};
use types::ImpulseHalf;

/// Battery charge controller
pub struct ChargeController<H: ChargerHardware> {
    hardware: H,
    config: ChargerConfig,

    presence: PresenceMonitor,
    overheat: Box<dyn OverheatGuard>,

    phase: Phase,
    next_half: ImpulseHalf,
    sessions: SessionManager,

    pattern: IndicatorPattern,
    blink_on: bool,
    load_on: bool,

    ticks: u64,
    uptime_ms: u64,

    logger: StructuredLogger,
}

impl<H: ChargerHardware> ChargeController<H> {
    /// Create a controller in `WaitingForBattery`.
    ///
    /// The board is left untouched until [`power_on`](Self::power_on) or the
    /// first step.
    pub fn new(hardware: H, config: ChargerConfig) -> Result<Self> {
        config.validate()?;

        let logger = get_logger("controller");
        let overheat = overheat_guard_from_config(&config.guards);
        logger.info(&format!(
            "Controller created (overheat protection: {})",
            overheat.is_enabled()
        ));

        Ok(Self {
            hardware,
            presence: PresenceMonitor::new(config.guards.presence_threshold_raw),
            overheat,
            phase: Phase::WaitingForBattery,
            next_half: ImpulseHalf::LoadOn,
            sessions: SessionManager::new(config.session_history_size),
            pattern: IndicatorPattern::Idle,
            blink_on: false,
            load_on: false,
            ticks: 0,
            uptime_ms: 0,
            logger,
            config,
        })
    }

    /// Replace the overheat policy chosen from the configuration
    pub fn with_overheat_guard(mut self, guard: Box<dyn OverheatGuard>) -> Self {
        self.overheat = guard;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &ChargerConfig {
        &self.config
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Load level last written to the board
    pub fn load_on(&self) -> bool {
        self.load_on
    }

    pub fn indicator(&self) -> IndicatorPattern {
        self.pattern
    }

    /// Steps completed through [`tick`](Self::tick)
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Time slept through the board since creation
    pub fn uptime_ms(&self) -> u64 {
        self.uptime_ms
    }

    pub fn overheat_protection(&self) -> bool {
        self.overheat.is_enabled()
    }

    fn set_load(&mut self, on: bool) {
        self.load_on = on;
        self.hardware.set_load(on);
    }

    fn apply_pattern(&mut self, pattern: IndicatorPattern) {
        self.pattern = pattern;
        self.blink_on = true;
        self.write_indicators();
    }

    fn toggle_blink(&mut self) {
        self.blink_on = !self.blink_on;
        self.write_indicators();
    }

    fn write_indicators(&mut self) {
        let (charging, done) = self.pattern.levels(self.blink_on);
        self.hardware.set_charging_indicator(charging);
        self.hardware.set_done_indicator(done);
    }

    fn transition(&mut self, next: Phase) {
        if !self.phase.can_transition_to(next) {
            self.logger.error(&format!(
                "Unexpected phase change {} -> {}",
                self.phase, next
            ));
        }
        debug_assert!(self.phase.can_transition_to(next));
        self.logger
            .info(&format!("Phase {} -> {}", self.phase, next));
        self.phase = next;
    }
}
