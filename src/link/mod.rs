pub mod frame;
pub mod protocol;
pub mod serial;
pub mod sim;

pub use protocol::LinkMessage;
pub use serial::SerialLink;
pub use sim::SimulatedBase;
