//! Power and mode control panel for a mobile robot base.
//!
//! The core ([`panel::PowerPanel`]) decodes aggregated diagnostics into
//! battery, breaker and mode state and turns operator actions into remote
//! commands. It knows nothing about windows or wires: telemetry and commands
//! go through [`bus::TelemetryBus`] and [`bus::CommandBus`], implemented by
//! the serial link and the simulated base in [`link`], and the iced
//! application in [`gui`] hosts the panel.

pub mod battery;
pub mod breakers;
pub mod bus;
pub mod command;
pub mod config;
pub mod console;
pub mod decoder;
pub mod diagnostics;
pub mod error;
pub mod gui;
pub mod gui_modules;
pub mod indicators;
pub mod link;
pub mod mode;
pub mod panel;

pub use breakers::BreakerState;
pub use config::PanelConfig;
pub use diagnostics::{DiagnosticReport, DiagnosticStatus};
pub use error::CommandError;
pub use mode::OperatingMode;
pub use panel::PowerPanel;
