//! Capabilities a panel region can have. Regions pick the ones they need and
//! the application composes them; there is no common widget base.

use crate::gui_modules::Message;
use iced::Element;

pub trait Renderable {
    fn view(&self) -> Element<'static, Message>;
}

pub trait Clickable {
    fn on_click(&self) -> Message;
}
