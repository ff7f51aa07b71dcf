use crate::bus::{CommandBus, TelemetryBus};
use crate::command::{self, PanelCommand};
use crate::config::PanelConfig;
use crate::diagnostics::DiagnosticReport;
use crate::panel::PowerPanel;
use futures::stream::{BoxStream, StreamExt};
use iced::{subscription, time, Application, Command, Element, Subscription};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::gui_modules::*;

const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(1);

/// Everything the application needs from whoever launches it.
pub struct PanelFlags {
    pub config: PanelConfig,
    pub telemetry: Arc<dyn TelemetryBus>,
    pub commands: Arc<dyn CommandBus>,
    pub source: String,
    pub fullscreen: bool,
}

pub struct PanelApp {
    panel: PowerPanel,
    config: PanelConfig,
    telemetry: Arc<dyn TelemetryBus>,
    commands: Arc<dyn CommandBus>,
    source: String,
    fullscreen: bool,
    monitor_expanded: bool,
    now: Instant,
}

impl PanelApp {
    fn dispatch(&self, command: PanelCommand) -> Command<Message> {
        Command::perform(
            command::dispatch(Arc::clone(&self.commands), command),
            Message::CommandFinished,
        )
    }

    fn window_mode(&self) -> Command<Message> {
        iced::window::change_mode(
            iced::window::Id::MAIN,
            if self.fullscreen {
                iced::window::Mode::Fullscreen
            } else {
                iced::window::Mode::Windowed
            },
        )
    }
}

impl Application for PanelApp {
    type Executor = iced::executor::Default;
    type Message = Message;
    type Theme = iced::Theme;
    type Flags = PanelFlags;

    fn theme(&self) -> Self::Theme {
        iced::Theme::Dark
    }

    fn new(flags: PanelFlags) -> (Self, Command<Message>) {
        let app = Self {
            panel: PowerPanel::new(&flags.config),
            config: flags.config,
            telemetry: flags.telemetry,
            commands: flags.commands,
            source: flags.source,
            fullscreen: flags.fullscreen,
            monitor_expanded: false,
            now: Instant::now(),
        };
        info!("power panel started on {}", app.source);
        let command = if app.fullscreen {
            app.window_mode()
        } else {
            Command::none()
        };
        (app, command)
    }

    fn title(&self) -> String {
        "Power Panel".into()
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::ReportReceived(report) => {
                self.panel.handle_report(&report);
            }

            Message::TelemetryEnded(reason) => self.panel.telemetry_lost(&reason),

            Message::ToggleBreaker(index) => match self.panel.toggle_breaker(index) {
                Ok(command) => return self.dispatch(command),
                Err(e) => warn!("ignoring toggle: {}", e),
            },

            Message::SetMode(mode) => {
                let command = self.panel.request_mode(mode);
                return self.dispatch(command);
            }

            Message::CommandFinished(outcome) => self.panel.complete(outcome),

            Message::DismissAlert => {
                self.panel.dismiss_alert();
            }

            Message::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                return self.window_mode();
            }

            Message::ToggleMonitorExpanded => {
                self.monitor_expanded = !self.monitor_expanded;
            }

            Message::ClearConsole => self.panel.console_mut().clear(),

            Message::Tick => self.now = Instant::now(),
        }
        Command::none()
    }

    fn view(&self) -> Element<Message> {
        let breakers = self
            .panel
            .breakers()
            .iter()
            .map(|indicator| BreakerButton::new(indicator, &self.config.assets).view())
            .collect();

        let batteries = vec![
            BatteryGaugeView::new("Base Battery", self.panel.battery()).view(),
            BatteryGaugeView::new("Laptop Battery", self.panel.laptop_battery()).view(),
        ];

        let link = LinkStatusData {
            source: self.source.clone(),
            live: !self.panel.is_telemetry_stale(self.now),
            pending_toggles: self.panel.pending_toggles(),
        };

        main_layout(
            self.fullscreen,
            PanelRegions {
                alert: alert_banner(self.panel.current_alert(), self.panel.alert_count()),
                link_status: link_status(&link),
                monitor: MonitorView::new(self.panel.monitor(), self.monitor_expanded).view(),
                console: ConsoleView::new(self.panel.console()).view(),
                mode_menu: ModeMenu::new(self.panel.mode()).view(),
                breakers,
                batteries,
            },
        )
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch(vec![
            telemetry_subscription(Arc::clone(&self.telemetry)),
            // keeps the freshness indicator honest when reports stop
            time::every(Duration::from_secs(1)).map(|_| Message::Tick),
        ])
    }
}

enum Feed {
    Idle(Arc<dyn TelemetryBus>),
    Streaming(Arc<dyn TelemetryBus>, BoxStream<'static, DiagnosticReport>),
}

fn telemetry_subscription(bus: Arc<dyn TelemetryBus>) -> Subscription<Message> {
    subscription::unfold("diagnostics_agg", Feed::Idle(bus), |feed| async move {
        let (bus, mut stream) = match feed {
            Feed::Idle(bus) => {
                let stream = bus.subscribe();
                (bus, stream)
            }
            Feed::Streaming(bus, stream) => (bus, stream),
        };

        match stream.next().await {
            Some(report) => (Message::ReportReceived(report), Feed::Streaming(bus, stream)),
            None => {
                tokio::time::sleep(RESUBSCRIBE_DELAY).await;
                (
                    Message::TelemetryEnded("telemetry stream closed".into()),
                    Feed::Idle(bus),
                )
            }
        }
    })
}
