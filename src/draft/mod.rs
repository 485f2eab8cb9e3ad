//! Draft module - the order form aggregate and its save-side policies

pub mod autosave;
pub mod gate;
pub mod model;
pub mod validate;

pub use autosave::{AutosaveCoordinator, CommitRequest, DraftSink};
pub use gate::ReadinessGate;
pub use model::OrderDraft;
pub use validate::{validate, ValidationErrors};
