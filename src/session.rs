//! Charge session management
//!
//! A session is one charge attempt, from battery detection until the battery
//! is full, pulled, overheated or timed out. It owns the run-state of that
//! attempt (elapsed time and the delta-V detector) and is discarded into a
//! compact record when it ends.

use crate::config::SamplingConfig;
use crate::controller::Interruption;
use crate::error::{ChargerError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger, get_logger_with_context};
use crate::termination::{ChargeStatus, DeltaVDetector};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// Delta-V fired; `topped_off` tells whether the final phase ran
    Completed { topped_off: bool },
    /// A guard or the charge-time limit stopped the session
    Interrupted(Interruption),
}

/// Run-state of the active charge attempt
#[derive(Debug)]
pub struct ChargeSession {
    id: u32,
    started_at_ms: u64,
    elapsed_ms: u32,
    phase_started_ms: u32,
    impulses: u32,
    topped_off: bool,
    detector: DeltaVDetector,
    logger: StructuredLogger,
}

impl ChargeSession {
    pub fn new(id: u32, started_at_ms: u64, sampling: &SamplingConfig) -> Self {
        Self {
            id,
            started_at_ms,
            elapsed_ms: 0,
            phase_started_ms: 0,
            impulses: 0,
            topped_off: false,
            detector: DeltaVDetector::new(sampling),
            logger: get_logger_with_context(
                LogContext::new("session")
                    .with_session_id(id)
                    .with_field("started_at_ms", started_at_ms.to_string()),
            ),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Charge time since the session started, in milliseconds
    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    pub fn advance(&mut self, ms: u32) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(ms);
    }

    /// Restart the per-phase clock
    pub fn mark_phase_start(&mut self) {
        self.phase_started_ms = self.elapsed_ms;
    }

    pub fn phase_elapsed_ms(&self) -> u32 {
        self.elapsed_ms - self.phase_started_ms
    }

    pub fn note_impulse(&mut self) {
        self.impulses = self.impulses.saturating_add(1);
    }

    pub fn impulses(&self) -> u32 {
        self.impulses
    }

    pub fn note_top_off(&mut self) {
        self.topped_off = true;
    }

    /// Feed one raw main-phase reading to the end-of-charge detector
    pub fn record_sample(&mut self, raw: u16) -> ChargeStatus {
        let before = self.detector.samples_recorded();
        let status = self.detector.record_sample(raw);
        if self.detector.samples_recorded() != before {
            self.logger.debug(&format!(
                "Window mean {} mV, peak {} mV",
                self.detector.medium_voltage_mv(),
                self.detector.max_voltage_mv()
            ));
        }
        if status.is_charged() {
            self.logger.info(&format!(
                "Voltage fell from {} mV peak to {} mV",
                self.detector.max_voltage_mv(),
                self.detector.medium_voltage_mv()
            ));
        }
        status
    }

    pub fn detector(&self) -> &DeltaVDetector {
        &self.detector
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    fn into_record(self, outcome: SessionOutcome, ended_at_ms: u64) -> SessionRecord {
        let outcome = match outcome {
            SessionOutcome::Completed { .. } => SessionOutcome::Completed {
                topped_off: self.topped_off,
            },
            other => other,
        };
        SessionRecord {
            id: self.id,
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            elapsed_ms: self.elapsed_ms,
            impulses: self.impulses,
            smoothed_samples: self.detector.samples_recorded(),
            peak_voltage_mv: self.detector.max_voltage_mv(),
            final_voltage_mv: self.detector.medium_voltage_mv(),
            outcome,
        }
    }
}

/// Summary of a finished session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: u32,
    /// Controller uptime when the battery was detected
    pub started_at_ms: u64,
    /// Controller uptime when the session ended
    pub ended_at_ms: u64,
    pub elapsed_ms: u32,
    pub impulses: u32,
    pub smoothed_samples: u64,
    pub peak_voltage_mv: u32,
    pub final_voltage_mv: u32,
    pub outcome: SessionOutcome,
}

/// Tracks the active session and a bounded history of finished ones
#[derive(Debug)]
pub struct SessionManager {
    /// Current active session
    pub current_session: Option<ChargeSession>,

    /// Last finished session
    pub last_session: Option<SessionRecord>,

    history: VecDeque<SessionRecord>,
    max_history_size: usize,
    next_id: u32,
    logger: StructuredLogger,
}

impl SessionManager {
    pub fn new(max_history_size: usize) -> Self {
        Self {
            current_session: None,
            last_session: None,
            history: VecDeque::with_capacity(max_history_size),
            max_history_size: max_history_size.max(1),
            next_id: 1,
            logger: get_logger("session"),
        }
    }

    /// Start a new session with a fresh detector
    pub fn start_session(&mut self, started_at_ms: u64, sampling: &SamplingConfig) -> Result<()> {
        if self.current_session.is_some() {
            return Err(ChargerError::generic("Session already active"));
        }

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.logger.info(&format!("Started charge session {}", id));
        self.current_session = Some(ChargeSession::new(id, started_at_ms, sampling));
        Ok(())
    }

    /// End the current session and move it into the history
    pub fn end_session(&mut self, outcome: SessionOutcome, ended_at_ms: u64) -> Result<SessionRecord> {
        let Some(session) = self.current_session.take() else {
            return Err(ChargerError::generic("No active session to end"));
        };

        let record = session.into_record(outcome, ended_at_ms);
        self.logger.info(&format!(
            "Ended charge session {} after {} ms: {:?}",
            record.id, record.elapsed_ms, record.outcome
        ));

        self.last_session = Some(record.clone());
        self.history.push_back(record.clone());
        while self.history.len() > self.max_history_size {
            self.history.pop_front();
        }
        Ok(record)
    }

    pub fn current(&self) -> Option<&ChargeSession> {
        self.current_session.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut ChargeSession> {
        self.current_session.as_mut()
    }

    /// Finished sessions, oldest first
    pub fn history(&self) -> impl Iterator<Item = &SessionRecord> {
        self.history.iter()
    }

    /// Get session statistics
    pub fn get_session_stats(&self) -> serde_json::Value {
        let mut stats = serde_json::Map::new();

        if let Some(session) = self.current_session.as_ref() {
            stats.insert("session_active".to_string(), true.into());
            stats.insert("session_id".to_string(), session.id().into());
            stats.insert("elapsed_ms".to_string(), session.elapsed_ms().into());
            stats.insert(
                "peak_voltage_mv".to_string(),
                session.detector().max_voltage_mv().into(),
            );
        } else {
            stats.insert("session_active".to_string(), false.into());
            stats.insert("session_id".to_string(), serde_json::Value::Null);
            stats.insert("elapsed_ms".to_string(), serde_json::Value::Null);
            stats.insert("peak_voltage_mv".to_string(), serde_json::Value::Null);
        }

        let completed = self
            .history
            .iter()
            .filter(|r| matches!(r.outcome, SessionOutcome::Completed { .. }))
            .count();
        stats.insert("completed_sessions".to_string(), completed.into());
        stats.insert(
            "interrupted_sessions".to_string(),
            (self.history.len() - completed).into(),
        );
        stats.insert(
            "last_session".to_string(),
            self.last_session
                .as_ref()
                .and_then(|r| serde_json::to_value(r).ok())
                .unwrap_or(serde_json::Value::Null),
        );

        serde_json::Value::Object(stats)
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(crate::config::defaults::SESSION_HISTORY_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_lifecycle() {
        let sampling = SamplingConfig::default();
        let mut manager = SessionManager::new(4);

        assert!(manager.end_session(SessionOutcome::Completed { topped_off: false }, 0).is_err());
        manager.start_session(1000, &sampling).unwrap();
        assert!(manager.start_session(1000, &sampling).is_err());

        let session = manager.current_mut().unwrap();
        session.advance(750);
        session.note_impulse();
        session.note_top_off();

        let record = manager
            .end_session(SessionOutcome::Completed { topped_off: false }, 2000)
            .unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.elapsed_ms, 750);
        assert_eq!(record.outcome, SessionOutcome::Completed { topped_off: true });
        assert!(manager.current().is_none());
        assert_eq!(manager.last_session.as_ref(), Some(&record));
    }

    #[test]
    fn test_phase_clock() {
        let mut session = ChargeSession::new(1, 0, &SamplingConfig::default());
        session.advance(1000);
        assert_eq!(session.phase_elapsed_ms(), 1000);
        session.mark_phase_start();
        session.advance(300);
        assert_eq!(session.elapsed_ms(), 1300);
        assert_eq!(session.phase_elapsed_ms(), 300);
        session.advance(u32::MAX);
        assert_eq!(session.elapsed_ms(), u32::MAX);
    }

    #[test]
    fn test_history_is_bounded() {
        let sampling = SamplingConfig::default();
        let mut manager = SessionManager::new(2);
        for i in 0..3 {
            manager.start_session(i, &sampling).unwrap();
            manager
                .end_session(SessionOutcome::Interrupted(Interruption::BatteryRemoved), i)
                .unwrap();
        }
        let ids: Vec<u32> = manager.history().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_session_stats() {
        let sampling = SamplingConfig::default();
        let mut manager = SessionManager::new(4);
        let stats = manager.get_session_stats();
        assert_eq!(stats["session_active"], false);
        assert!(stats["last_session"].is_null());

        manager.start_session(0, &sampling).unwrap();
        let stats = manager.get_session_stats();
        assert_eq!(stats["session_active"], true);
        assert_eq!(stats["session_id"], 1);

        manager
            .end_session(SessionOutcome::Interrupted(Interruption::Overheat), 10)
            .unwrap();
        let stats = manager.get_session_stats();
        assert_eq!(stats["interrupted_sessions"], 1);
        assert_eq!(stats["completed_sessions"], 0);
        assert_eq!(stats["last_session"]["id"], 1);
    }
}
