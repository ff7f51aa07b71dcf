//! Turns an aggregated diagnostics report into panel state.
//!
//! Each extraction runs independently: a missing battery entry does not stop
//! the breaker byte from being decoded, and vice versa.

use crate::battery::BatteryState;
use crate::breakers::BreakerState;
use crate::diagnostics::{
    DiagnosticReport, BATTERY_ENTRY, DIGITAL_OUTPUTS_ENTRY, LAPTOP_BATTERY_ENTRY,
    OPERATING_MODE_ENTRY, RAW_BYTE_KEY,
};
use crate::error::DecodeError;
use crate::mode::ModeReading;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Everything one report says about the base. `None` means the entry was absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TelemetryUpdate {
    pub battery: Option<BatteryState>,
    pub laptop_battery: Option<BatteryState>,
    pub operating_mode: Option<ModeReading>,
    pub breakers: Option<Result<BreakerState, DecodeError>>,
}

#[derive(Clone, Debug, Default)]
pub struct TelemetryDecoder;

impl TelemetryDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&self, report: &DiagnosticReport) -> TelemetryUpdate {
        let mut battery = BTreeMap::new();
        let mut laptop_battery = BTreeMap::new();
        let mut digital_outputs = BTreeMap::new();
        let mut seen_outputs = false;
        let mut op_mode = None;

        for status in &report.status {
            match status.name.as_str() {
                BATTERY_ENTRY => collect(&mut battery, status),
                LAPTOP_BATTERY_ENTRY => collect(&mut laptop_battery, status),
                OPERATING_MODE_ENTRY => op_mode = Some(status.message.clone()),
                DIGITAL_OUTPUTS_ENTRY => {
                    seen_outputs = true;
                    collect(&mut digital_outputs, status);
                }
                other => trace!("ignoring diagnostic entry {}", other),
            }
        }

        let breakers = seen_outputs.then(|| parse_raw_byte(digital_outputs.get(RAW_BYTE_KEY)));
        if let Some(Ok(state)) = &breakers {
            debug!("digital outputs raw byte {:#05b}", state.to_raw_byte());
        }

        TelemetryUpdate {
            battery: non_empty(battery),
            laptop_battery: non_empty(laptop_battery),
            operating_mode: op_mode.as_deref().map(ModeReading::parse),
            breakers,
        }
    }
}

fn collect(into: &mut BTreeMap<String, String>, status: &crate::diagnostics::DiagnosticStatus) {
    for kv in &status.values {
        into.insert(kv.key.clone(), kv.value.clone());
    }
}

fn non_empty(values: BTreeMap<String, String>) -> Option<BatteryState> {
    if values.is_empty() {
        None
    } else {
        Some(values.into_iter().collect())
    }
}

fn parse_raw_byte(raw: Option<&String>) -> Result<BreakerState, DecodeError> {
    let raw = raw.ok_or(DecodeError::MissingRawByte)?;
    raw.trim()
        .parse::<u64>()
        .map(BreakerState::from_raw_byte)
        .map_err(|_| DecodeError::InvalidRawByte(raw.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticStatus;
    use crate::mode::{OperatingMode, ReportedMode};

    fn outputs(raw: &str) -> DiagnosticStatus {
        DiagnosticStatus::new(DIGITAL_OUTPUTS_ENTRY).with_value(RAW_BYTE_KEY, raw)
    }

    #[test]
    fn decodes_every_raw_byte() {
        let decoder = TelemetryDecoder::new();
        for raw in 0..8u8 {
            let report = DiagnosticReport::new(vec![outputs(&raw.to_string())]);
            let state = decoder.decode(&report).breakers.unwrap().unwrap();
            assert_eq!(state.to_raw_byte(), raw);
        }
    }

    #[test]
    fn battery_map_passes_through_verbatim() {
        let report = DiagnosticReport::new(vec![
            DiagnosticStatus::new(BATTERY_ENTRY).with_value("Voltage", "16.4"),
        ]);
        let update = TelemetryDecoder::new().decode(&report);
        let battery = update.battery.unwrap();
        assert_eq!(battery.len(), 1);
        assert_eq!(battery.get("Voltage"), Some("16.4"));
        assert!(update.laptop_battery.is_none());
        assert!(update.breakers.is_none());
    }

    #[test]
    fn repeated_entries_accumulate_key_by_key() {
        let report = DiagnosticReport::new(vec![
            DiagnosticStatus::new(LAPTOP_BATTERY_ENTRY)
                .with_value("Charge (Ah)", "1.0")
                .with_value("Capacity (Ah)", "4.0"),
            DiagnosticStatus::new("/Sensors/Cliff"),
            DiagnosticStatus::new(LAPTOP_BATTERY_ENTRY).with_value("Charge (Ah)", "2.0"),
        ]);
        let laptop = TelemetryDecoder::new().decode(&report).laptop_battery.unwrap();
        assert_eq!(laptop.get("Charge (Ah)"), Some("2.0"));
        assert_eq!(laptop.get("Capacity (Ah)"), Some("4.0"));
    }

    #[test]
    fn operating_mode_message_is_decoded() {
        let report = DiagnosticReport::new(vec![
            DiagnosticStatus::new(OPERATING_MODE_ENTRY).with_message("Safe Mode"),
        ]);
        let reading = TelemetryDecoder::new().decode(&report).operating_mode.unwrap();
        assert_eq!(reading.message, "Safe Mode");
        assert_eq!(reading.mode, Some(ReportedMode::Drive(OperatingMode::Safe)));
    }

    #[test]
    fn bad_raw_byte_is_reported_not_panicked() {
        let decoder = TelemetryDecoder::new();
        let update = decoder.decode(&DiagnosticReport::new(vec![outputs("lots")]));
        assert_eq!(
            update.breakers,
            Some(Err(DecodeError::InvalidRawByte("lots".into())))
        );

        let update = decoder.decode(&DiagnosticReport::new(vec![DiagnosticStatus::new(
            DIGITAL_OUTPUTS_ENTRY,
        )]));
        assert_eq!(update.breakers, Some(Err(DecodeError::MissingRawByte)));
    }

    #[test]
    fn empty_report_yields_nothing() {
        let update = TelemetryDecoder::new().decode(&DiagnosticReport::default());
        assert_eq!(update, TelemetryUpdate::default());
    }
}
