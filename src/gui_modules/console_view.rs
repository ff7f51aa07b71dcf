use crate::console::{Console, Severity};
use crate::gui_modules::{Message, Renderable, OFF_RED, WARN_YELLOW};
use iced::widget::{button, column, container, row, scrollable, text};
use iced::{Alignment, Element, Length};

pub struct ConsoleView<'a> {
    console: &'a Console,
}

impl<'a> ConsoleView<'a> {
    pub fn new(console: &'a Console) -> Self {
        Self { console }
    }
}

impl Renderable for ConsoleView<'_> {
    fn view(&self) -> Element<'static, Message> {
        // newest first
        let lines = self
            .console
            .entries()
            .rev()
            .map(|entry| {
                let line = text(format!(
                    "{} {:5} {}",
                    entry.timestamp.format("%H:%M:%S"),
                    entry.severity,
                    entry.text
                ))
                .size(13);
                match entry.severity {
                    Severity::Info => line.into(),
                    Severity::Warning => line.style(WARN_YELLOW).into(),
                    Severity::Error => line.style(OFF_RED).into(),
                }
            })
            .collect::<Vec<Element<'static, Message>>>();

        let header = row![
            text(format!("Console ({})", self.console.len())).size(18).width(Length::Fill),
            button(text("Clear").size(14)).on_press(Message::ClearConsole),
        ]
        .align_items(Alignment::Center);

        container(
            column![
                header,
                scrollable(column(lines).spacing(2).width(Length::Fill)).height(Length::Fixed(150.0))
            ]
            .spacing(5),
        )
        .padding(10)
        .width(Length::Fill)
        .style(iced::theme::Container::Box)
        .into()
    }
}
