//! Two-LED status patterns
//!
//! Red shows charging or a fault, green shows idle or done. Fault patterns
//! blink; the blink phase is supplied by the caller.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorPattern {
    /// Waiting for a battery
    Idle,
    /// Charging in progress
    Charging,
    /// Charge finished
    Done,
    /// Red blinking alone
    OverheatBlink,
    /// Both blinking together
    TimeoutBlink,
}

impl IndicatorPattern {
    /// (charging, done) LED levels for the given blink phase
    pub fn levels(self, blink_on: bool) -> (bool, bool) {
        match self {
            IndicatorPattern::Idle | IndicatorPattern::Done => (false, true),
            IndicatorPattern::Charging => (true, false),
            IndicatorPattern::OverheatBlink => (blink_on, false),
            IndicatorPattern::TimeoutBlink => (blink_on, blink_on),
        }
    }

    pub fn blinks(self) -> bool {
        matches!(
            self,
            IndicatorPattern::OverheatBlink | IndicatorPattern::TimeoutBlink
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_patterns_ignore_blink_phase() {
        for pattern in [
            IndicatorPattern::Idle,
            IndicatorPattern::Charging,
            IndicatorPattern::Done,
        ] {
            assert_eq!(pattern.levels(true), pattern.levels(false));
            assert!(!pattern.blinks());
        }
    }

    #[test]
    fn fault_patterns_are_distinct() {
        assert_eq!(IndicatorPattern::OverheatBlink.levels(true), (true, false));
        assert_eq!(IndicatorPattern::OverheatBlink.levels(false), (false, false));
        assert_eq!(IndicatorPattern::TimeoutBlink.levels(true), (true, true));
        assert_eq!(IndicatorPattern::TimeoutBlink.levels(false), (false, false));
    }
}
