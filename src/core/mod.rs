//! Core module - workflow states, transitions, and permissions

pub mod permission;
pub mod registry;
pub mod transition;

pub use permission::{Permission, PermissionChecker};
pub use registry::{OrderStatus, StateRegistry};
pub use transition::ApprovalAction;
