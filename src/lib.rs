//! Procura: order workflow and permission-resolution engine
//!
//! The core library behind a healthcare procurement system's order module.
//! It decides what a workflow state id means, which transitions are legal,
//! which permissions a user effectively holds, and whether an order form is
//! valid for the save being attempted. Persistence and rendering live in
//! external collaborators; this crate's contract ends at "supply current
//! state + permissions, receive next state + validation errors."

pub mod core;
pub mod draft;

pub use crate::core::permission::{
    expand_permissions, HierarchyConfig, Permission, PermissionChecker, PermissionSummary,
};
pub use crate::core::registry::{CatalogRow, OrderStatus, StateRegistry};
pub use crate::core::transition::{
    allowed_transitions, can_transition, derive_next_state, next_state_for_action, ApprovalAction,
    DeriveNextState,
};
pub use crate::draft::autosave::{AutosaveCoordinator, AutosaveError, CommitRequest, DraftSink};
pub use crate::draft::gate::{ReadinessGate, ReadinessHandle};
pub use crate::draft::model::{Attachment, ConfirmationMethod, FundingSource, OrderDraft, OrderItem};
pub use crate::draft::validate::{validate, SectionVisibility, ValidationErrors, ValidationInput};
