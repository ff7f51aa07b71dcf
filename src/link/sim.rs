//! In-process stand-in for the base, for running the panel without hardware.

use crate::breakers::BreakerState;
use crate::bus::{CommandBus, TelemetryBus};
use crate::diagnostics::{
    DiagnosticReport, DiagnosticStatus, Level, BATTERY_ENTRY, DIGITAL_OUTPUTS_ENTRY,
    LAPTOP_BATTERY_ENTRY, OPERATING_MODE_ENTRY, RAW_BYTE_KEY,
};
use crate::error::CommandError;
use crate::mode::OperatingMode;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

const CAPACITY_AH: f64 = 3.0;
const IDLE_DRAIN_AH: f64 = 0.002;
const BREAKER_DRAIN_AH: f64 = 0.001;

#[derive(Clone, Debug)]
struct SimState {
    outputs: BreakerState,
    mode: Option<OperatingMode>,
    charge_ah: f64,
    laptop_percent: f64,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            outputs: BreakerState::default(),
            mode: Some(OperatingMode::Passive),
            charge_ah: CAPACITY_AH * 0.9,
            laptop_percent: 75.0,
        }
    }
}

#[derive(Clone)]
pub struct SimulatedBase {
    state: Arc<Mutex<SimState>>,
    period: Duration,
    failure_rate: f64,
}

impl Default for SimulatedBase {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl SimulatedBase {
    pub fn new(failure_rate: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState::default())),
            period: Duration::from_secs(1),
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn outputs(&self) -> BreakerState {
        self.lock().outputs
    }

    pub fn mode(&self) -> Option<OperatingMode> {
        self.lock().mode
    }

    /// Advances the simulation one tick and reports the result.
    pub fn tick(&self) -> DiagnosticReport {
        let mut state = self.lock();
        let load = state.outputs.outputs().iter().filter(|on| **on).count() as f64;
        let mut rng = rand::rng();

        state.charge_ah -= IDLE_DRAIN_AH + load * BREAKER_DRAIN_AH;
        if state.charge_ah <= 0.0 {
            info!("simulated base docked, battery refilled");
            state.charge_ah = CAPACITY_AH;
        }
        state.laptop_percent = (state.laptop_percent - 0.01).max(0.0);
        let voltage = 14.0 + 2.6 * state.charge_ah / CAPACITY_AH + rng.random_range(-0.05..0.05);
        let current = -(0.4 + 0.3 * load) + rng.random_range(-0.02..0.02);

        let mode_message = match state.mode {
            Some(mode) => format!("{} Mode", mode),
            None => "Off Mode".to_string(),
        };

        DiagnosticReport::new(vec![
            DiagnosticStatus::new(BATTERY_ENTRY)
                .with_message("Discharging")
                .with_value("Voltage (V)", format!("{:.2}", voltage))
                .with_value("Current (A)", format!("{:.2}", current))
                .with_value("Charge (Ah)", format!("{:.3}", state.charge_ah))
                .with_value("Capacity (Ah)", format!("{:.1}", CAPACITY_AH)),
            DiagnosticStatus::new(LAPTOP_BATTERY_ENTRY)
                .with_value("Percent", format!("{:.1}", state.laptop_percent))
                .with_value("Charging State", "false"),
            DiagnosticStatus::new(OPERATING_MODE_ENTRY).with_message(mode_message),
            DiagnosticStatus::new(DIGITAL_OUTPUTS_ENTRY)
                .with_message("OK")
                .with_value(RAW_BYTE_KEY, state.outputs.to_raw_byte().to_string()),
            DiagnosticStatus::new("/Sensors/Cliff Sensors").with_message("All clear"),
            DiagnosticStatus::new("/Sensors/Wheel Drop")
                .with_level(if state.mode == Some(OperatingMode::Full) {
                    Level::Warn
                } else {
                    Level::Ok
                })
                .with_message("Wheel drop detection limited in full mode"),
        ])
    }

    fn should_fail(&self) -> bool {
        self.failure_rate > 0.0 && rand::rng().random_bool(self.failure_rate)
    }
}

impl TelemetryBus for SimulatedBase {
    fn subscribe(&self) -> BoxStream<'static, DiagnosticReport> {
        let base = self.clone();
        stream::unfold((base, true), |(base, first)| async move {
            if !first {
                tokio::time::sleep(base.period).await;
            }
            let report = base.tick();
            Some((report, (base, false)))
        })
        .boxed()
    }
}

#[async_trait]
impl CommandBus for SimulatedBase {
    async fn set_digital_outputs(&self, outputs: BreakerState) -> Result<(), CommandError> {
        if self.should_fail() {
            return Err(CommandError::Rejected("simulated output driver fault".into()));
        }
        debug!("simulated outputs -> {:03b}", outputs.to_raw_byte());
        self.lock().outputs = outputs;
        Ok(())
    }

    async fn set_operation_mode(&self, mode: OperatingMode) -> Result<(), CommandError> {
        if self.should_fail() {
            return Err(CommandError::Rejected(format!(
                "simulated base refused {} mode",
                mode
            )));
        }
        debug!("simulated mode -> {}", mode);
        self.lock().mode = Some(mode);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::TelemetryDecoder;

    #[tokio::test]
    async fn commands_show_up_in_next_report() {
        let base = SimulatedBase::new(0.0);
        base.set_digital_outputs(BreakerState([false, true, true]))
            .await
            .unwrap();
        base.set_operation_mode(OperatingMode::Safe).await.unwrap();

        let update = TelemetryDecoder::new().decode(&base.tick());
        assert_eq!(update.breakers, Some(Ok(BreakerState([false, true, true]))));
        assert_eq!(update.operating_mode.unwrap().message, "Safe Mode");
        assert!(update.battery.unwrap().percentage().is_some());
    }

    #[tokio::test]
    async fn always_failing_base_rejects_everything() {
        let base = SimulatedBase::new(1.0);
        assert!(matches!(
            base.set_operation_mode(OperatingMode::Full).await,
            Err(CommandError::Rejected(_))
        ));
        assert!(base.set_digital_outputs(BreakerState([true; 3])).await.is_err());
        assert_eq!(base.outputs(), BreakerState::default());
        assert_eq!(base.mode(), Some(OperatingMode::Passive));
    }

    #[tokio::test]
    async fn subscription_emits_first_report_immediately() {
        let base = SimulatedBase::new(0.0).with_period(Duration::from_millis(5));
        let reports: Vec<_> = base.subscribe().take(2).collect().await;
        assert_eq!(reports.len(), 2);
    }
}
