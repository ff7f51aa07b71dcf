use crate::gui_modules::{filled_container_style, Message, OFF_RED, ON_GREEN};
use iced::widget::{container, row, text};
use iced::{Alignment, Color, Element, Length};

pub struct LinkStatusData {
    pub source: String,
    pub live: bool,
    pub pending_toggles: usize,
}

pub fn link_status(data: &LinkStatusData) -> Element<'static, Message> {
    let indicator = container(
        text(if data.live { "TELEMETRY: LIVE" } else { "TELEMETRY: STALE" })
            .size(14)
            .horizontal_alignment(iced::alignment::Horizontal::Center),
    )
    .padding(4)
    .width(Length::Fixed(160.0))
    .style(filled_container_style(
        if data.live { ON_GREEN } else { OFF_RED },
        Color::WHITE,
    ));

    let mut status = row![indicator, text(format!("Source: {}", data.source)).size(14)]
        .spacing(10)
        .align_items(Alignment::Center);
    if data.pending_toggles > 0 {
        status = status.push(text(format!("{} breaker command(s) pending", data.pending_toggles)).size(14));
    }
    status.into()
}
