// Export all components and types
mod alert_banner;
mod battery_gauge;
mod breaker_button;
mod console_view;
mod layout;
mod link_status;
mod mode_menu;
mod monitor_view;
mod types;
mod widgets;

// Re-export for easy import
pub use alert_banner::*;
pub use battery_gauge::*;
pub use breaker_button::*;
pub use console_view::*;
pub use layout::*;
pub use link_status::*;
pub use mode_menu::*;
pub use monitor_view::*;
pub use types::*;
pub use widgets::*;
