use crate::command::CommandOutcome;
use crate::diagnostics::{DiagnosticReport, Level};
use crate::mode::OperatingMode;
use iced::{widget::container::StyleSheet, Color, Theme};

// Message enum shared between all components
#[derive(Debug, Clone)]
pub enum Message {
    ReportReceived(DiagnosticReport),
    TelemetryEnded(String),
    ToggleBreaker(usize),
    SetMode(OperatingMode),
    CommandFinished(CommandOutcome),
    DismissAlert,
    ToggleFullscreen,
    ToggleMonitorExpanded,
    ClearConsole,
    Tick,
}

pub const ON_GREEN: Color = Color {
    r: 0.0,
    g: 0.8,
    b: 0.0,
    a: 1.0,
};
pub const OFF_RED: Color = Color {
    r: 0.8,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};
pub const WARN_YELLOW: Color = Color {
    r: 1.0,
    g: 0.8,
    b: 0.0,
    a: 1.0,
};
pub const UNKNOWN_GREY: Color = Color {
    r: 0.45,
    g: 0.45,
    b: 0.45,
    a: 1.0,
};

pub fn filled_container_style(background: Color, text_color: Color) -> iced::theme::Container {
    iced::theme::Container::Custom(Box::new(move |theme: &Theme| {
        let mut appearance = theme.appearance(&iced::theme::Container::Box);
        appearance.background = Some(background.into());
        appearance.text_color = Some(text_color);
        appearance
    }))
}

pub fn alert_container_style() -> iced::theme::Container {
    iced::theme::Container::Custom(Box::new(move |theme: &Theme| {
        let mut appearance = theme.appearance(&iced::theme::Container::Box);
        appearance.background = Some(Color::from_rgb(0.8, 0.0, 0.0).into());
        appearance.text_color = Some(Color::WHITE);
        appearance.border.color = Color::from_rgb(1.0, 0.0, 0.0);
        appearance.border.width = 2.0;
        appearance
    }))
}

/// Green for on, red for off, grey until telemetry has said anything.
pub fn on_off_style(on: Option<bool>) -> iced::theme::Container {
    match on {
        Some(true) => filled_container_style(ON_GREEN, Color::WHITE),
        Some(false) => filled_container_style(OFF_RED, Color::WHITE),
        None => filled_container_style(UNKNOWN_GREY, Color::WHITE),
    }
}

pub fn level_style(level: Level) -> iced::theme::Container {
    match level {
        Level::Ok => filled_container_style(ON_GREEN, Color::WHITE),
        Level::Warn => filled_container_style(WARN_YELLOW, Color::BLACK),
        Level::Error => filled_container_style(OFF_RED, Color::WHITE),
        Level::Stale => filled_container_style(UNKNOWN_GREY, Color::WHITE),
    }
}
