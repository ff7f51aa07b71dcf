use crate::gui_modules::{Clickable, Message, Renderable};
use crate::indicators::{ModeIndicator, StatusDisplay};
use crate::mode::{OperatingMode, ReportedMode};
use iced::widget::{button, column, container, row, text};
use iced::{Alignment, Element, Length};

/// One fixed entry of the mode menu.
pub struct ModeAction(pub OperatingMode);

impl Clickable for ModeAction {
    fn on_click(&self) -> Message {
        Message::SetMode(self.0)
    }
}

impl Renderable for ModeAction {
    fn view(&self) -> Element<'static, Message> {
        button(text(self.0.label()))
            .on_press(self.on_click())
            .width(Length::Fill)
            .into()
    }
}

pub struct ModeMenu<'a> {
    indicator: &'a ModeIndicator,
    actions: [ModeAction; 3],
}

impl<'a> ModeMenu<'a> {
    pub fn new(indicator: &'a ModeIndicator) -> Self {
        Self {
            indicator,
            actions: OperatingMode::ALL.map(ModeAction),
        }
    }

    fn current(&self) -> String {
        let reading = match self.indicator.reading() {
            Some(reading) => reading,
            None => return "Mode: unknown".to_string(),
        };
        let mode = match reading.mode {
            Some(ReportedMode::Drive(mode)) => mode.label(),
            Some(ReportedMode::Off) => "Off",
            None => reading.message.as_str(),
        };
        if self.indicator.is_stale() {
            format!("Mode: {} (stale)", mode)
        } else {
            format!("Mode: {}", mode)
        }
    }
}

impl Renderable for ModeMenu<'_> {
    fn view(&self) -> Element<'static, Message> {
        let buttons = self
            .actions
            .iter()
            .fold(row![].spacing(10), |buttons, action| buttons.push(action.view()));

        container(
            column![text("Mode").size(20), text(self.current()), buttons]
                .spacing(10)
                .align_items(Alignment::Start),
        )
        .padding(10)
        .width(Length::FillPortion(1))
        .style(iced::theme::Container::Box)
        .into()
    }
}
