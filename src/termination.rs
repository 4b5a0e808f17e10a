//! Negative delta-V end-of-charge detection
//!
//! Raw readings are batched into smoothed millivolt samples, the smoothed
//! samples feed a fixed-capacity moving-average window, and the window mean is
//! compared with the running peak. A fall of more than the drop threshold below
//! that peak means the cell is full.

use crate::config::{ADC_MAX_READING, SamplingConfig};
use serde::Serialize;
use std::collections::VecDeque;

/// Verdict of one termination check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChargeStatus {
    Charged,
    NotCharged,
}

impl ChargeStatus {
    pub fn is_charged(self) -> bool {
        matches!(self, ChargeStatus::Charged)
    }
}

/// Running sum of raw readings for the next smoothed sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleAccumulator {
    sum: u64,
    count: u32,
    readings_count: u32,
}

impl SampleAccumulator {
    pub fn new(readings_count: u32) -> Self {
        Self {
            sum: 0,
            count: 0,
            readings_count: readings_count.max(1),
        }
    }

    /// Add one reading. Returns the batch sum once `readings_count` readings
    /// have been collected, and starts a new batch.
    pub fn push(&mut self, raw: u16) -> Option<u64> {
        self.sum += u64::from(raw);
        self.count += 1;
        if self.count < self.readings_count {
            return None;
        }
        let sum = self.sum;
        self.clear();
        Some(sum)
    }

    pub fn pending(&self) -> u32 {
        self.count
    }

    pub fn readings_count(&self) -> u32 {
        self.readings_count
    }

    pub fn clear(&mut self) {
        self.sum = 0;
        self.count = 0;
    }
}

/// Fixed-capacity FIFO of smoothed samples, zero-filled at creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoltageWindow {
    slots: VecDeque<u32>,
    capacity: usize,
    pushes: u64,
}

impl VoltageWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: std::iter::repeat_n(0, capacity).collect(),
            capacity,
            pushes: 0,
        }
    }

    /// Push a sample and return the evicted oldest one
    pub fn push(&mut self, mv: u32) -> u32 {
        let evicted = self.slots.pop_front().unwrap_or(0);
        self.slots.push_back(mv);
        self.pushes += 1;
        evicted
    }

    /// Integer mean over every slot, unfilled slots counting as zero
    pub fn mean(&self) -> u32 {
        let sum: u64 = self.slots.iter().map(|&v| u64::from(v)).sum();
        let mean = sum / self.capacity as u64;
        u32::try_from(mean).unwrap_or(u32::MAX)
    }

    /// Whether every slot holds a real sample
    pub fn is_primed(&self) -> bool {
        self.pushes >= self.capacity as u64
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Samples oldest first
    pub fn samples(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots.iter().copied()
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|v| *v = 0);
        self.pushes = 0;
    }
}

/// Peak tracker deciding when the cell voltage has peaked and fallen back
#[derive(Debug, Clone)]
pub struct DeltaVDetector {
    sampling: SamplingConfig,
    accumulator: SampleAccumulator,
    window: VoltageWindow,
    max_voltage_mv: u32,
    medium_voltage_mv: u32,
    samples_recorded: u64,
    rejected_readings: u64,
}

impl DeltaVDetector {
    pub fn new(sampling: &SamplingConfig) -> Self {
        Self {
            sampling: sampling.clone(),
            accumulator: SampleAccumulator::new(sampling.readings_count),
            window: VoltageWindow::new(sampling.average_length),
            max_voltage_mv: 0,
            medium_voltage_mv: 0,
            samples_recorded: 0,
            rejected_readings: 0,
        }
    }

    /// Feed one raw reading.
    ///
    /// Only the reading that completes a batch can report `Charged`. Readings
    /// outside the converter range are dropped and report `NotCharged`.
    pub fn record_sample(&mut self, raw: u16) -> ChargeStatus {
        if raw > ADC_MAX_READING {
            self.rejected_readings += 1;
            return ChargeStatus::NotCharged;
        }

        match self.accumulator.push(raw) {
            Some(sum) => {
                let mv = self
                    .sampling
                    .raw_sum_to_mv(sum, self.accumulator.readings_count());
                self.push_smoothed(mv)
            }
            None => ChargeStatus::NotCharged,
        }
    }

    /// Feed one already smoothed sample, in millivolts
    pub fn push_smoothed(&mut self, mv: u32) -> ChargeStatus {
        self.window.push(mv);
        self.samples_recorded += 1;
        self.medium_voltage_mv = self.window.mean();

        if self.medium_voltage_mv > self.max_voltage_mv {
            self.max_voltage_mv = self.medium_voltage_mv;
        }

        if self
            .medium_voltage_mv
            .saturating_add(self.sampling.drop_threshold_mv)
            < self.max_voltage_mv
        {
            ChargeStatus::Charged
        } else {
            ChargeStatus::NotCharged
        }
    }

    /// Highest window mean seen since the last reset
    pub fn max_voltage_mv(&self) -> u32 {
        self.max_voltage_mv
    }

    /// Current window mean
    pub fn medium_voltage_mv(&self) -> u32 {
        self.medium_voltage_mv
    }

    /// Smoothed samples pushed since the last reset
    pub fn samples_recorded(&self) -> u64 {
        self.samples_recorded
    }

    pub fn rejected_readings(&self) -> u64 {
        self.rejected_readings
    }

    pub fn window(&self) -> &VoltageWindow {
        &self.window
    }

    pub fn reset(&mut self) {
        self.accumulator.clear();
        self.window.clear();
        self.max_voltage_mv = 0;
        self.medium_voltage_mv = 0;
        self.samples_recorded = 0;
        self.rejected_readings = 0;
    }
}
