use crate::gui_modules::Message;
use iced::widget::{column, container, row, text, Column, Row};
use iced::{Alignment, Element, Length};

pub fn fullscreen_button(is_fullscreen: bool) -> Element<'static, Message> {
    container(
        iced::widget::button(text(if is_fullscreen {
            "Exit Fullscreen"
        } else {
            "Fullscreen"
        }))
        .on_press(Message::ToggleFullscreen),
    )
    .width(Length::Shrink)
    .align_x(iced::alignment::Horizontal::Right)
    .into()
}

pub struct PanelRegions<'a> {
    pub alert: Option<Element<'a, Message>>,
    pub link_status: Element<'a, Message>,
    pub monitor: Element<'a, Message>,
    pub console: Element<'a, Message>,
    pub mode_menu: Element<'a, Message>,
    pub breakers: Vec<Element<'a, Message>>,
    pub batteries: Vec<Element<'a, Message>>,
}

// Combine all parts into the main layout
pub fn main_layout(is_fullscreen: bool, regions: PanelRegions<'_>) -> Element<'_, Message> {
    let top = row![regions.link_status, fullscreen_button(is_fullscreen)]
        .spacing(10)
        .align_items(Alignment::Center);

    let mut layout = Column::new()
        .padding(20)
        .spacing(10)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_items(Alignment::Center);

    if let Some(alert) = regions.alert {
        layout = layout.push(alert);
    }

    layout
        .push(top)
        .push(
            row![
                regions.mode_menu,
                // breakers stacked in the middle column
                column(regions.breakers).spacing(8).width(Length::FillPortion(1)),
            ]
            .spacing(10),
        )
        .push(Row::with_children(regions.batteries).spacing(10))
        .push(regions.monitor)
        .push(regions.console)
        .into()
}
