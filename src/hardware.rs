//! Hardware collaborators consumed by the charge controller
//!
//! The controller never touches registers. Everything it needs from the board
//! goes through [`ChargerHardware`]: blocking analog samples, idempotent
//! actuator writes and a blocking delay, which is the only suspension point.

pub mod simulated;

pub use simulated::{BatteryProfile, SimEvent, SimulatedCharger};

/// Board interface used by the controller
pub trait ChargerHardware {
    /// One blocking sample of the battery-voltage input (0..=1023)
    fn read_raw_voltage(&mut self) -> u16;

    /// One blocking sample of the thermal input (0..=1023).
    ///
    /// Boards without a thermal sensor keep the default, which reads cold.
    fn read_raw_temperature(&mut self) -> u16 {
        0
    }

    /// Switch the charge load
    fn set_load(&mut self, on: bool);

    /// Drive the red "charging / fault" indicator
    fn set_charging_indicator(&mut self, on: bool);

    /// Drive the green "idle / done" indicator
    fn set_done_indicator(&mut self, on: bool);

    /// Block for `duration` milliseconds
    fn sleep_ms(&mut self, duration: u32);
}

impl<T: ChargerHardware + ?Sized> ChargerHardware for &mut T {
    fn read_raw_voltage(&mut self) -> u16 {
        (**self).read_raw_voltage()
    }

    fn read_raw_temperature(&mut self) -> u16 {
        (**self).read_raw_temperature()
    }

    fn set_load(&mut self, on: bool) {
        (**self).set_load(on);
    }

    fn set_charging_indicator(&mut self, on: bool) {
        (**self).set_charging_indicator(on);
    }

    fn set_done_indicator(&mut self, on: bool) {
        (**self).set_done_indicator(on);
    }

    fn sleep_ms(&mut self, duration: u32) {
        (**self).sleep_ms(duration);
    }
}
