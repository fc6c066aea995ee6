// UI module
//
// Slint frontend: the EventLoopBridge for tokio/Slint coordination and the
// GuiController that wires callbacks, workflows and state subscriptions.

pub mod bridge;
pub mod controller;

pub use bridge::{EventLoopBridge, EventLoopBridgeHandle};
pub use controller::GuiController;
