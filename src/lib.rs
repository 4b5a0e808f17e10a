//! # Impulse Charger - NiMH/NiCd charge controller
//!
//! Sequences a rechargeable cell through bulk impulse charging, a monitored
//! main phase and a top-off phase, terminating on negative delta-V and
//! stopping safely on overheat, removal or charge timeout.
//!
//! ## Architecture
//!
//! - `config`: Compile-time thresholds carried as construction parameters
//! - `logging`: Structured logging and tracing
//! - `hardware`: Board interface and a virtual-clock bench implementation
//! - `termination`: Moving-average window and delta-V peak detection
//! - `guards`: Battery presence and pluggable overheat policies
//! - `indicator`: Two-LED status patterns
//! - `session`: Per-attempt run-state and session history
//! - `controller`: The charge state machine

pub mod config;
pub mod controller;
pub mod error;
pub mod guards;
pub mod hardware;
pub mod indicator;
pub mod logging;
pub mod session;
pub mod termination;

// Re-export commonly used types
pub use config::ChargerConfig;
pub use controller::{ChargeController, Phase};
pub use error::{ChargerError, Result};
