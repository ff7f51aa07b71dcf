use crate::config::AssetConfig;
use crate::gui_modules::{on_off_style, Clickable, Message, Renderable};
use crate::indicators::{BreakerIndicator, StatusDisplay};
use iced::widget::{button, column, container, row, svg, text};
use iced::{Alignment, Element, Length};
use std::path::Path;

pub struct BreakerButton<'a> {
    indicator: &'a BreakerIndicator,
    assets: &'a AssetConfig,
}

impl<'a> BreakerButton<'a> {
    pub fn new(indicator: &'a BreakerIndicator, assets: &'a AssetConfig) -> Self {
        Self { indicator, assets }
    }

    fn label(&self) -> String {
        let state = match self.indicator.is_on() {
            Some(true) => "ON",
            Some(false) => "OFF",
            None => "--",
        };
        format!("Breaker {}: {}", self.indicator.index(), state)
    }
}

fn icon(path: &Path, width: f32) -> Option<Element<'static, Message>> {
    // a missing asset just means no icon, the colour still shows the state
    path.exists().then(|| {
        svg(svg::Handle::from_path(path))
            .width(Length::Fixed(width))
            .height(Length::Fixed(30.0))
            .into()
    })
}

impl Clickable for BreakerButton<'_> {
    fn on_click(&self) -> Message {
        Message::ToggleBreaker(self.indicator.index())
    }
}

impl Renderable for BreakerButton<'_> {
    fn view(&self) -> Element<'static, Message> {
        let [background, glyph] = self.assets.breaker_icon(self.indicator.is_on() == Some(true));

        let mut content = row![].spacing(6).align_items(Alignment::Center);
        if let Some(lamp) = icon(&background, 12.0) {
            content = content.push(lamp);
        }
        if let Some(glyph) = icon(&glyph, 30.0) {
            content = content.push(glyph);
        }
        content = content.push(text(self.label()).size(14));

        let mut body = column![content].align_items(Alignment::Center);
        if self.indicator.is_stale() && self.indicator.is_on().is_some() {
            body = body.push(text("stale").size(10));
        }

        button(
            container(body)
                .padding(6)
                .width(Length::Fill)
                .style(on_off_style(self.indicator.is_on())),
        )
        .on_press(self.on_click())
        .padding(0)
        .width(Length::FillPortion(1))
        .style(iced::theme::Button::Text)
        .into()
    }
}
