//! Presentation-free core of the phone case design kiosk: catalog data,
//! pan/zoom math, the persisted order store, the screen flow and the AI
//! image service client.

pub mod ai;
pub mod catalog;
pub mod flow;
pub mod generation;
pub mod image_ref;
pub mod state;
pub mod store;
pub mod transform;

pub use ai::{AiImageClient, GenerationError, ImageGenerator, MissingImageGenerator, TemplateStyle};
pub use flow::{FlowError, NavPayload, Screen, Wizard};
pub use generation::{AiCredits, GenerationOutcome, GenerationRefused, GenerationSession};
pub use image_ref::ImageRef;
pub use state::{Action, OrderState, SessionParams};
pub use store::{AppStateStore, MemorySnapshotStore, SnapshotStore, STATE_KEY};
pub use transform::{Nudge, Orientation, TransformRange, TransformState};
