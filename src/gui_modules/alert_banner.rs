use crate::gui_modules::{alert_container_style, Message};
use crate::panel::Alert;
use iced::widget::{button, container, row, text};
use iced::{Alignment, Element, Length};

/// Shows the oldest unacknowledged error; nothing when there is none.
pub fn alert_banner(alert: Option<&Alert>, queued: usize) -> Option<Element<'static, Message>> {
    let alert = alert?;
    let more = if queued > 1 {
        format!(" (+{} more)", queued - 1)
    } else {
        String::new()
    };

    Some(
        container(
            row![
                text(format!("{}{}", alert.text, more)).width(Length::Fill),
                button(text("Dismiss")).on_press(Message::DismissAlert),
            ]
            .spacing(10)
            .align_items(Alignment::Center),
        )
        .padding(10)
        .width(Length::Fill)
        .style(alert_container_style())
        .into(),
    )
}
