//! Screen graph of the design wizard and the controller that walks it.

mod payload;
mod screen;
mod slots;
mod wizard;

pub use payload::NavPayload;
pub use screen::Screen;
pub use slots::{ImageSlot, ImageSlots};
pub use wizard::{Draft, FlowError, Wizard};
