//! Display-side state of the panel's indicators, independent of any toolkit.

use crate::battery::BatteryState;
use crate::mode::ModeReading;

/// An indicator fed from telemetry.
pub trait StatusDisplay {
    type Status;

    fn update_status(&mut self, status: Self::Status);

    /// Telemetry no longer carries this indicator's entry; the last value stays.
    fn set_stale(&mut self);

    fn is_stale(&self) -> bool;
}

#[derive(Clone, Debug)]
pub struct BatteryGauge {
    name: String,
    state: Option<BatteryState>,
    stale: bool,
    updates: u64,
}

impl BatteryGauge {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: None,
            stale: true,
            updates: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> Option<&BatteryState> {
        self.state.as_ref()
    }

    /// Number of times the gauge received a fresh mapping.
    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl StatusDisplay for BatteryGauge {
    type Status = BatteryState;

    fn update_status(&mut self, status: BatteryState) {
        self.state = Some(status);
        self.stale = false;
        self.updates += 1;
    }

    fn set_stale(&mut self) {
        self.stale = true;
    }

    fn is_stale(&self) -> bool {
        self.stale
    }
}

/// On/off indicator for one breaker. `None` until the first digital outputs report.
#[derive(Clone, Debug)]
pub struct BreakerIndicator {
    index: usize,
    on: Option<bool>,
    stale: bool,
}

impl BreakerIndicator {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            on: None,
            stale: true,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_on(&self) -> Option<bool> {
        self.on
    }
}

impl StatusDisplay for BreakerIndicator {
    type Status = bool;

    fn update_status(&mut self, on: bool) {
        self.on = Some(on);
        self.stale = false;
    }

    fn set_stale(&mut self) {
        self.stale = true;
    }

    fn is_stale(&self) -> bool {
        self.stale
    }
}

#[derive(Clone, Debug, Default)]
pub struct ModeIndicator {
    reading: Option<ModeReading>,
    stale: bool,
}

impl ModeIndicator {
    pub fn reading(&self) -> Option<&ModeReading> {
        self.reading.as_ref()
    }
}

impl StatusDisplay for ModeIndicator {
    type Status = ModeReading;

    fn update_status(&mut self, reading: ModeReading) {
        self.reading = Some(reading);
        self.stale = false;
    }

    fn set_stale(&mut self) {
        self.stale = true;
    }

    fn is_stale(&self) -> bool {
        self.stale || self.reading.is_none()
    }
}
