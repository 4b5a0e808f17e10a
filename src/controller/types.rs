use serde::{Deserialize, Serialize};

use crate::indicator::IndicatorPattern;

/// Charge phase; exactly one is active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    WaitingForBattery,
    Phase1Bulk,
    MainPhase,
    FinalPhase,
    Finished,
    OverheatFault,
    TimeoutFault,
}

impl Phase {
    /// Whether the load may be switched on in this phase
    pub fn is_charging(self) -> bool {
        matches!(
            self,
            Phase::Phase1Bulk | Phase::MainPhase | Phase::FinalPhase
        )
    }

    pub fn is_fault(self) -> bool {
        matches!(self, Phase::OverheatFault | Phase::TimeoutFault)
    }

    /// Directed edges of the charge state machine
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        match (self, next) {
            (WaitingForBattery, Phase1Bulk) => true,
            (Phase1Bulk, MainPhase | OverheatFault | WaitingForBattery) => true,
            (
                MainPhase,
                FinalPhase | Finished | TimeoutFault | OverheatFault | WaitingForBattery,
            ) => true,
            (FinalPhase, Finished | OverheatFault | WaitingForBattery) => true,
            (Finished | OverheatFault | TimeoutFault, WaitingForBattery) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::WaitingForBattery => "WaitingForBattery",
            Phase::Phase1Bulk => "Phase1Bulk",
            Phase::MainPhase => "MainPhase",
            Phase::FinalPhase => "FinalPhase",
            Phase::Finished => "Finished",
            Phase::OverheatFault => "OverheatFault",
            Phase::TimeoutFault => "TimeoutFault",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected operating conditions that stop a charge attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interruption {
    Overheat,
    BatteryRemoved,
    ChargeTimeout,
}

impl Interruption {
    /// Phase the machine holds in after this interruption
    pub fn target_phase(self) -> Phase {
        match self {
            Interruption::Overheat => Phase::OverheatFault,
            Interruption::BatteryRemoved => Phase::WaitingForBattery,
            Interruption::ChargeTimeout => Phase::TimeoutFault,
        }
    }
}

/// Result of the per-tick guard check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Safe to actuate; carries the voltage reading the presence check used
    Clear { raw_voltage: u16 },
    Tripped(Interruption),
}

/// Which half of an impulse the next step runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImpulseHalf {
    LoadOn,
    LoadOff,
}

/// Work done by one step: the phase after it and the delay owed to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub phase: Phase,
    pub sleep_ms: u32,
}

impl Step {
    pub fn new(phase: Phase, sleep_ms: u32) -> Self {
        Self { phase, sleep_ms }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargerSnapshot {
    pub phase: Phase,
    pub load_on: bool,
    pub indicator: IndicatorPattern,
    pub charging_indicator: bool,
    pub done_indicator: bool,
    pub uptime_ms: u64,
    pub ticks: u64,
    pub last_raw_voltage: u16,
    pub overheat_protection: bool,
    /// Session time of the active session
    pub elapsed_ms: Option<u32>,
    /// Time spent in the current phase of the active session
    pub phase_elapsed_ms: Option<u32>,
    /// Impulses delivered in the active session
    pub impulses: Option<u32>,
    pub max_voltage_mv: Option<u32>,
    pub medium_voltage_mv: Option<u32>,
    pub session: serde_json::Value,
}
