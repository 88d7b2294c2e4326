//! Table controller and the event seam towards presentation adapters

pub mod controller;
pub mod dispatcher;
pub mod events;
pub mod render;

pub use controller::{ControllerState, TableController};
pub use dispatcher::{EventDispatcher, EventRecorder, GridSubscriber};
pub use events::{ChangeReason, ErrorKind, EventSummary, GridEvent, GridRequest};
pub use render::render_text;
