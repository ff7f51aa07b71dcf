//! The power panel: owns decoded telemetry and the local breaker vector, and
//! turns operator actions into commands.
//!
//! `PowerPanel` is single-owner. Whatever hosts it (the GUI event loop, a test)
//! feeds it reports and command outcomes from one context; commands it hands
//! out are executed elsewhere via [`crate::command::dispatch`] and their
//! outcome comes back through [`PowerPanel::complete`].
//!
//! Displayed breaker state is only ever taken from telemetry. The local output
//! vector starts from it, is flipped optimistically by a toggle and is
//! resynchronised by every digital outputs report. Alongside it the panel keeps
//! the last outputs the base confirmed (reported or acknowledged); a failed
//! toggle rebuilds the local vector from those plus the toggles still pending.

use crate::breakers::{BreakerState, BREAKER_COUNT};
use crate::command::{CommandOutcome, PanelCommand, Ticket};
use crate::config::PanelConfig;
use crate::console::Console;
use crate::decoder::{TelemetryDecoder, TelemetryUpdate};
use crate::diagnostics::{DiagnosticReport, DiagnosticStatus};
use crate::error::PanelError;
use crate::indicators::{BatteryGauge, BreakerIndicator, ModeIndicator, StatusDisplay};
use crate::mode::OperatingMode;
use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A user-visible error waiting to be acknowledged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub text: String,
}

#[derive(Clone, Copy, Debug)]
struct PendingToggle {
    index: usize,
    sent: bool,
}

pub struct PowerPanel {
    decoder: TelemetryDecoder,
    rollback_failed_toggles: bool,
    stale_after: Duration,
    outputs: BreakerState,
    confirmed: BreakerState,
    breakers: [BreakerIndicator; BREAKER_COUNT],
    battery: BatteryGauge,
    laptop_battery: BatteryGauge,
    mode: ModeIndicator,
    monitor: Vec<DiagnosticStatus>,
    console: Console,
    alerts: VecDeque<Alert>,
    alert_capacity: usize,
    pending: BTreeMap<Ticket, PendingToggle>,
    next_ticket: Ticket,
    last_report: Option<Instant>,
}

impl PowerPanel {
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            decoder: TelemetryDecoder::new(),
            rollback_failed_toggles: config.rollback_failed_toggles,
            stale_after: config.stale_after(),
            outputs: BreakerState::default(),
            confirmed: BreakerState::default(),
            breakers: [
                BreakerIndicator::new(0),
                BreakerIndicator::new(1),
                BreakerIndicator::new(2),
            ],
            battery: BatteryGauge::new("Base battery"),
            laptop_battery: BatteryGauge::new("Laptop battery"),
            mode: ModeIndicator::default(),
            monitor: Vec::new(),
            console: Console::new(config.console_capacity),
            alerts: VecDeque::new(),
            alert_capacity: config.alert_capacity.max(1),
            pending: BTreeMap::new(),
            next_ticket: 1,
            last_report: None,
        }
    }

    /// Applies one diagnostics report and returns what was decoded from it.
    pub fn handle_report(&mut self, report: &DiagnosticReport) -> TelemetryUpdate {
        let update = self.decoder.decode(report);
        self.last_report = Some(Instant::now());
        self.monitor = report.status.clone();

        match &update.battery {
            Some(state) => self.battery.update_status(state.clone()),
            None => {
                debug!("Power State Stale");
                self.mark_stale(true);
            }
        }

        match &update.laptop_battery {
            Some(state) => self.laptop_battery.update_status(state.clone()),
            None => {
                debug!("Laptop battery stale");
                self.mark_stale(false);
            }
        }

        match &update.operating_mode {
            Some(reading) => self.mode.update_status(reading.clone()),
            None => self.mode.set_stale(),
        }

        match &update.breakers {
            Some(Ok(state)) => self.apply_breakers(*state),
            Some(Err(err)) => {
                warn!("ignoring digital outputs entry: {}", err);
                self.console.warn(format!("Digital outputs not decoded: {}", err));
            }
            None => {}
        }

        update
    }

    fn mark_stale(&mut self, base: bool) {
        let gauge = if base {
            &mut self.battery
        } else {
            &mut self.laptop_battery
        };
        let was_fresh = !gauge.is_stale();
        gauge.set_stale();
        if was_fresh {
            self.console.warn(format!("{} stale", gauge.name()));
        }
    }

    fn apply_breakers(&mut self, state: BreakerState) {
        self.outputs = state;
        self.confirmed = state;
        for (indicator, on) in self.breakers.iter_mut().zip(state.outputs()) {
            indicator.update_status(on);
        }
    }

    fn take_ticket(&mut self) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    /// Flips breaker `index` locally and returns the full-state write to send.
    pub fn toggle_breaker(&mut self, index: usize) -> Result<PanelCommand, PanelError> {
        let on = self.outputs.toggle(index)?;
        let ticket = self.take_ticket();
        self.pending.insert(ticket, PendingToggle { index, sent: on });
        info!("breaker {} -> {}", index, if on { "on" } else { "off" });
        self.console.info(format!(
            "Breaker {} switched {}",
            index,
            if on { "on" } else { "off" }
        ));
        Ok(PanelCommand::SetDigitalOutputs {
            ticket,
            outputs: self.outputs,
        })
    }

    pub fn request_mode(&mut self, mode: OperatingMode) -> PanelCommand {
        let ticket = self.take_ticket();
        info!("requesting {} mode", mode);
        self.console.info(format!("Requesting {} mode", mode));
        PanelCommand::SetOperationMode { ticket, mode }
    }

    pub fn set_full(&mut self) -> PanelCommand {
        self.request_mode(OperatingMode::Full)
    }

    pub fn set_safe(&mut self) -> PanelCommand {
        self.request_mode(OperatingMode::Safe)
    }

    pub fn set_passive(&mut self) -> PanelCommand {
        self.request_mode(OperatingMode::Passive)
    }

    /// Takes the result of a dispatched command. Failures become one alert each.
    pub fn complete(&mut self, outcome: CommandOutcome) {
        match (outcome.command, outcome.result) {
            (PanelCommand::SetDigitalOutputs { ticket, outputs }, Ok(())) => {
                self.pending.remove(&ticket);
                self.confirmed = outputs;
                debug!("digital outputs {:03b} acknowledged", outputs.to_raw_byte());
                self.console
                    .info(format!("Digital outputs set to {:03b}", outputs.to_raw_byte()));
            }
            (PanelCommand::SetDigitalOutputs { ticket, .. }, Err(err)) => {
                if self.pending.remove(&ticket).is_some() && self.rollback_failed_toggles {
                    self.roll_back();
                }
                self.raise(format!("Service call failed with error: {}", err));
            }
            (PanelCommand::SetOperationMode { mode, .. }, Ok(())) => {
                self.console.info(format!("{} mode accepted", mode));
            }
            (PanelCommand::SetOperationMode { mode, .. }, Err(err)) => {
                self.raise(format!(
                    "Failed to put the robot in {} mode: service call failed with error: {}",
                    mode.label().to_ascii_lowercase(),
                    err
                ));
            }
        }
    }

    /// Confirmed outputs with the surviving toggles replayed in issue order.
    fn roll_back(&mut self) {
        let mut outputs = self.confirmed;
        for toggle in self.pending.values() {
            // index was validated when the toggle was issued
            let _ = outputs.set(toggle.index, toggle.sent);
        }
        if outputs != self.outputs {
            debug!(
                "rolled back outputs {:03b} -> {:03b}",
                self.outputs.to_raw_byte(),
                outputs.to_raw_byte()
            );
        }
        self.outputs = outputs;
    }

    fn raise(&mut self, text: String) {
        warn!("{}", text);
        self.console.error(text.clone());
        if self.alerts.len() == self.alert_capacity {
            self.alerts.pop_front();
        }
        self.alerts.push_back(Alert { text });
    }

    pub fn telemetry_lost(&mut self, reason: &str) {
        warn!("telemetry lost: {}", reason);
        self.console.warn(format!("Telemetry lost: {}", reason));
    }

    pub fn outputs(&self) -> BreakerState {
        self.outputs
    }

    pub fn breakers(&self) -> &[BreakerIndicator; BREAKER_COUNT] {
        &self.breakers
    }

    pub fn battery(&self) -> &BatteryGauge {
        &self.battery
    }

    pub fn laptop_battery(&self) -> &BatteryGauge {
        &self.laptop_battery
    }

    pub fn mode(&self) -> &ModeIndicator {
        &self.mode
    }

    pub fn monitor(&self) -> &[DiagnosticStatus] {
        &self.monitor
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    pub fn current_alert(&self) -> Option<&Alert> {
        self.alerts.front()
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    pub fn dismiss_alert(&mut self) -> Option<Alert> {
        self.alerts.pop_front()
    }

    pub fn pending_toggles(&self) -> usize {
        self.pending.len()
    }

    pub fn is_telemetry_stale(&self, now: Instant) -> bool {
        match self.last_report {
            Some(at) => now.saturating_duration_since(at) > self.stale_after,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{
        BATTERY_ENTRY, DIGITAL_OUTPUTS_ENTRY, LAPTOP_BATTERY_ENTRY, OPERATING_MODE_ENTRY,
        RAW_BYTE_KEY,
    };
    use crate::error::CommandError;
    use crate::mode::{ModeReading, ReportedMode};

    fn panel() -> PowerPanel {
        PowerPanel::new(&PanelConfig::default())
    }

    fn outputs_report(raw: u8) -> DiagnosticReport {
        DiagnosticReport::new(vec![
            DiagnosticStatus::new(DIGITAL_OUTPUTS_ENTRY).with_value(RAW_BYTE_KEY, raw.to_string()),
        ])
    }

    fn displayed(panel: &PowerPanel) -> Vec<Option<bool>> {
        panel.breakers().iter().map(|b| b.is_on()).collect()
    }

    fn failed(command: PanelCommand) -> CommandOutcome {
        CommandOutcome {
            command,
            result: Err(CommandError::Rejected("busy".into())),
        }
    }

    #[test]
    fn report_drives_breaker_indicators() {
        let mut panel = panel();
        panel.handle_report(&outputs_report(5));
        assert_eq!(displayed(&panel), vec![Some(true), Some(false), Some(true)]);
        assert_eq!(panel.outputs(), BreakerState([true, false, true]));
    }

    #[test]
    fn report_without_outputs_leaves_breakers_alone() {
        let mut panel = panel();
        panel.handle_report(&outputs_report(3));
        let before = displayed(&panel);
        panel.handle_report(&DiagnosticReport::new(vec![
            DiagnosticStatus::new(BATTERY_ENTRY).with_value("Voltage", "16.0"),
        ]));
        assert_eq!(displayed(&panel), before);
        assert_eq!(panel.outputs(), BreakerState([true, true, false]));
    }

    #[test]
    fn toggle_flips_only_requested_index() {
        let mut panel = panel();
        panel.handle_report(&outputs_report(0b010));
        match panel.toggle_breaker(0).unwrap() {
            PanelCommand::SetDigitalOutputs { outputs, .. } => {
                assert_eq!(outputs, BreakerState([true, true, false]))
            }
            other => panic!("unexpected command {:?}", other),
        }
        // indicators still show telemetry
        assert_eq!(displayed(&panel), vec![Some(false), Some(true), Some(false)]);
    }

    #[test]
    fn double_toggle_restores_value() {
        let mut panel = panel();
        panel.handle_report(&outputs_report(0b100));
        panel.toggle_breaker(2).unwrap();
        panel.toggle_breaker(2).unwrap();
        assert_eq!(panel.outputs(), BreakerState([false, false, true]));
    }

    #[test]
    fn invalid_index_sends_nothing() {
        let mut panel = panel();
        assert_eq!(panel.toggle_breaker(3), Err(PanelError::InvalidBreaker(3)));
        assert_eq!(panel.pending_toggles(), 0);
    }

    #[test]
    fn failed_toggle_raises_one_alert_and_rolls_back() {
        let mut panel = panel();
        let command = panel.toggle_breaker(1).unwrap();
        assert_eq!(panel.outputs(), BreakerState([false, true, false]));

        panel.complete(failed(command));
        assert_eq!(panel.alert_count(), 1);
        assert_eq!(
            panel.current_alert().map(|a| a.text.as_str()),
            Some("Service call failed with error: rejected by remote: busy")
        );
        assert_eq!(panel.outputs(), BreakerState::default());
        assert_eq!(panel.pending_toggles(), 0);
    }

    #[test]
    fn failed_toggle_without_rollback_keeps_local_vector() {
        let config = PanelConfig {
            rollback_failed_toggles: false,
            ..PanelConfig::default()
        };
        let mut panel = PowerPanel::new(&config);
        let command = panel.toggle_breaker(0).unwrap();
        let before = panel.outputs();
        panel.complete(failed(command));
        assert_eq!(panel.outputs(), before);
        assert_eq!(panel.alert_count(), 1);
    }

    #[test]
    fn rollback_does_not_fight_newer_telemetry() {
        let mut panel = panel();
        let command = panel.toggle_breaker(0).unwrap();
        // base reports breaker 0 off again before the failure arrives
        panel.handle_report(&outputs_report(0));
        panel.complete(failed(command));
        assert_eq!(panel.outputs(), BreakerState::default());
    }

    #[test]
    fn repeated_failures_of_one_breaker_restore_confirmed_state() {
        let mut panel = panel();
        panel.handle_report(&outputs_report(0));
        let first = panel.toggle_breaker(0).unwrap();
        let second = panel.toggle_breaker(0).unwrap();

        panel.complete(failed(first));
        panel.complete(failed(second));

        assert_eq!(panel.outputs(), BreakerState::default());
        assert_eq!(panel.alert_count(), 2);
        assert_eq!(panel.pending_toggles(), 0);
    }

    #[test]
    fn failure_keeps_outputs_a_later_write_got_acknowledged() {
        let mut panel = panel();
        panel.handle_report(&outputs_report(0));
        let first = panel.toggle_breaker(0).unwrap();
        let second = panel.toggle_breaker(1).unwrap();

        panel.complete(CommandOutcome {
            command: second,
            result: Ok(()),
        });
        panel.complete(CommandOutcome {
            command: first,
            result: Err(CommandError::Timeout(Duration::from_secs(3))),
        });

        assert_eq!(panel.outputs(), BreakerState([true, true, false]));
        match panel.toggle_breaker(2).unwrap() {
            PanelCommand::SetDigitalOutputs { outputs, .. } => {
                assert_eq!(outputs, BreakerState([true, true, true]))
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn failure_replays_toggles_still_in_flight() {
        let mut panel = panel();
        panel.handle_report(&outputs_report(0b100));
        let first = panel.toggle_breaker(0).unwrap();
        panel.toggle_breaker(1).unwrap();

        panel.complete(failed(first));

        assert_eq!(panel.outputs(), BreakerState([false, true, true]));
        assert_eq!(panel.pending_toggles(), 1);
    }

    #[test]
    fn alerts_are_bounded() {
        let config = PanelConfig {
            alert_capacity: 2,
            ..PanelConfig::default()
        };
        let mut panel = PowerPanel::new(&config);
        for _ in 0..3 {
            let command = panel.set_full();
            panel.complete(failed(command));
        }
        let command = panel.set_safe();
        panel.complete(failed(command));

        assert_eq!(panel.alert_count(), 2);
        assert!(panel.current_alert().unwrap().text.contains("full mode"));
        panel.dismiss_alert();
        assert!(panel.current_alert().unwrap().text.contains("safe mode"));
    }

    #[test]
    fn stale_battery_is_logged_once_by_name() {
        let mut panel = panel();
        panel.handle_report(&DiagnosticReport::new(vec![
            DiagnosticStatus::new(BATTERY_ENTRY).with_value("Voltage", "16.0"),
        ]));
        panel.handle_report(&DiagnosticReport::default());
        panel.handle_report(&DiagnosticReport::default());

        let warnings: Vec<_> = panel
            .console()
            .entries()
            .filter(|e| e.text == "Base battery stale")
            .collect();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn acknowledged_toggle_clears_pending() {
        let mut panel = panel();
        let command = panel.toggle_breaker(2).unwrap();
        assert_eq!(panel.pending_toggles(), 1);
        panel.complete(CommandOutcome {
            command,
            result: Ok(()),
        });
        assert_eq!(panel.pending_toggles(), 0);
        assert_eq!(panel.alert_count(), 0);
        assert_eq!(panel.outputs(), BreakerState([false, false, true]));
    }

    #[test]
    fn mode_requests_carry_fixed_constants() {
        let mut panel = panel();
        let modes: Vec<_> = [panel.set_full(), panel.set_safe(), panel.set_passive()]
            .into_iter()
            .map(|c| match c {
                PanelCommand::SetOperationMode { mode, .. } => mode.code(),
                other => panic!("unexpected command {:?}", other),
            })
            .collect();
        assert_eq!(modes, vec![3, 2, 1]);
        assert_eq!(panel.outputs(), BreakerState::default());
    }

    #[test]
    fn failed_mode_names_the_transition() {
        let mut panel = panel();
        let command = panel.set_safe();
        panel.complete(CommandOutcome {
            command,
            result: Err(CommandError::Disconnected),
        });
        assert_eq!(
            panel.current_alert().map(|a| a.text.as_str()),
            Some("Failed to put the robot in safe mode: service call failed with error: link disconnected")
        );
        panel.dismiss_alert();
        assert!(panel.current_alert().is_none());
    }

    #[test]
    fn battery_mapping_reaches_gauge_unmodified() {
        let mut panel = panel();
        panel.handle_report(&DiagnosticReport::new(vec![
            DiagnosticStatus::new(BATTERY_ENTRY).with_value("Voltage", "16.4"),
        ]));
        let state = panel.battery().state().unwrap();
        assert_eq!(state.iter().collect::<Vec<_>>(), vec![("Voltage", "16.4")]);
        assert_eq!(panel.battery().updates(), 1);
        assert_eq!(panel.laptop_battery().updates(), 0);
    }

    #[test]
    fn missing_batteries_are_stale_without_updates() {
        let mut panel = panel();
        panel.handle_report(&DiagnosticReport::new(vec![
            DiagnosticStatus::new("/Sensors/Wheel Drop"),
        ]));
        assert!(panel.battery().is_stale());
        assert!(panel.laptop_battery().is_stale());
        assert_eq!(panel.battery().updates(), 0);
        assert_eq!(panel.laptop_battery().updates(), 0);
    }

    #[test]
    fn laptop_battery_and_mode_are_displayed() {
        let mut panel = panel();
        panel.handle_report(&DiagnosticReport::new(vec![
            DiagnosticStatus::new(LAPTOP_BATTERY_ENTRY).with_value("Percent", "80"),
            DiagnosticStatus::new(OPERATING_MODE_ENTRY).with_message("Passive Mode"),
        ]));
        assert_eq!(panel.laptop_battery().state().and_then(|s| s.percentage()), Some(80.0));
        assert_eq!(
            panel.mode().reading().and_then(|r: &ModeReading| r.mode),
            Some(ReportedMode::Drive(OperatingMode::Passive))
        );
    }

    #[test]
    fn freshness_follows_last_report() {
        let mut panel = panel();
        let now = Instant::now();
        assert!(panel.is_telemetry_stale(now));
        panel.handle_report(&DiagnosticReport::default());
        let now = Instant::now();
        assert!(!panel.is_telemetry_stale(now));
        assert!(panel.is_telemetry_stale(now + Duration::from_secs(10)));
    }

    #[test]
    fn errors_do_not_stop_later_reports() {
        let mut panel = panel();
        let command = panel.set_full();
        panel.complete(failed(command));
        panel.handle_report(&outputs_report(7));
        assert_eq!(panel.outputs(), BreakerState([true, true, true]));
    }
}
