use crate::diagnostics::{worst_level, DiagnosticStatus, Level};
use crate::gui_modules::{level_style, Message, Renderable};
use iced::widget::{button, column, container, row, scrollable, text};
use iced::{Alignment, Element, Length};

/// Aggregated diagnostics from the last report.
pub struct MonitorView<'a> {
    statuses: &'a [DiagnosticStatus],
    expanded: bool,
}

impl<'a> MonitorView<'a> {
    pub fn new(statuses: &'a [DiagnosticStatus], expanded: bool) -> Self {
        Self { statuses, expanded }
    }

    fn count(&self, level: Level) -> usize {
        self.statuses.iter().filter(|s| s.level == level).count()
    }
}

impl Renderable for MonitorView<'_> {
    fn view(&self) -> Element<'static, Message> {
        let worst = worst_level(self.statuses);

        let summary = container(
            text(match worst {
                Some(level) => format!("Diagnostics: {}", level),
                None => "Diagnostics: no data".to_string(),
            })
            .size(16),
        )
        .padding(10)
        .width(Length::FillPortion(1))
        .style(level_style(worst.unwrap_or(Level::Stale)));

        let expand_button = button(text(if self.expanded { "Collapse" } else { "Expand" }).size(14))
            .on_press(Message::ToggleMonitorExpanded)
            .width(Length::Shrink);

        let header = row![summary, expand_button]
            .spacing(10)
            .align_items(Alignment::Center);

        let content: Element<'static, Message> = if self.expanded && !self.statuses.is_empty() {
            let rows = self
                .statuses
                .iter()
                .map(|status| {
                    row![
                        container(text(status.level.to_string()).size(12))
                            .padding(2)
                            .width(Length::Fixed(60.0))
                            .style(level_style(status.level)),
                        text(&status.name).width(Length::FillPortion(2)),
                        text(&status.message).width(Length::FillPortion(3)),
                    ]
                    .spacing(10)
                    .padding(2)
                    .width(Length::Fill)
                    .into()
                })
                .collect::<Vec<_>>();

            scrollable(column(rows).spacing(2).width(Length::Fill))
                .height(Length::Fixed(180.0))
                .into()
        } else {
            text(format!(
                "{} ok, {} warn, {} error, {} stale",
                self.count(Level::Ok),
                self.count(Level::Warn),
                self.count(Level::Error),
                self.count(Level::Stale)
            ))
            .size(14)
            .into()
        };

        container(column![header, content].spacing(10).width(Length::Fill))
            .padding(10)
            .width(Length::Fill)
            .style(iced::theme::Container::Box)
            .into()
    }
}
