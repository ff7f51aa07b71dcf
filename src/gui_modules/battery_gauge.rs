use crate::gui_modules::{Message, Renderable};
use crate::indicators::{BatteryGauge, StatusDisplay};
use iced::widget::{column, container, progress_bar, text};
use iced::{Alignment, Element, Length};

pub struct BatteryGaugeView<'a> {
    title: &'static str,
    gauge: &'a BatteryGauge,
}

impl<'a> BatteryGaugeView<'a> {
    pub fn new(title: &'static str, gauge: &'a BatteryGauge) -> Self {
        Self { title, gauge }
    }
}

impl Renderable for BatteryGaugeView<'_> {
    fn view(&self) -> Element<'static, Message> {
        let heading = if self.gauge.is_stale() {
            format!("{} (stale)", self.title)
        } else {
            self.title.to_string()
        };
        let mut body = column![text(heading).size(20)]
            .spacing(5)
            .align_items(Alignment::Start);

        match self.gauge.state() {
            None => body = body.push(text("No data")),
            Some(state) => {
                if let Some(percent) = state.percentage() {
                    let charging = match state.is_charging() {
                        Some(true) => " (charging)",
                        _ => "",
                    };
                    body = body
                        .push(progress_bar(0.0..=100.0, percent as f32).height(Length::Fixed(12.0)))
                        .push(text(format!("Charge: {:.1} %{}", percent, charging)));
                }
                for (key, value) in state.iter() {
                    body = body.push(text(format!("{}: {}", key, value)).size(14));
                }
            }
        }

        container(body)
            .padding(10)
            .width(Length::FillPortion(1))
            .style(iced::theme::Container::Box)
            .into()
    }
}
