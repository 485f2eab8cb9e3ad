//! Transition resolver - computes the next workflow state for a user action
//!
//! Terminal approval states (approved, rejected) are frozen: a transient UI
//! action must not silently downgrade a persisted decision. Only an explicit
//! override (an administrator unlock) may force a recomputation.

use serde::{Deserialize, Serialize};

use crate::core::registry::{OrderStatus, StateRegistry};

/// Approval action selected in the UI. `None` corresponds to the empty
/// selection and resolves back to the draft state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalAction {
    Approved,
    Rejected,
    Pending,
    #[default]
    None,
}

impl ApprovalAction {
    /// Target status the action nominally requests.
    pub fn target_status(self) -> OrderStatus {
        match self {
            ApprovalAction::Approved => OrderStatus::Approved,
            ApprovalAction::Rejected => OrderStatus::Rejected,
            ApprovalAction::Pending => OrderStatus::Pending,
            ApprovalAction::None => OrderStatus::Draft,
        }
    }
}

impl std::str::FromStr for ApprovalAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(ApprovalAction::None),
            "approved" => Ok(ApprovalAction::Approved),
            "rejected" => Ok(ApprovalAction::Rejected),
            "pending" => Ok(ApprovalAction::Pending),
            other => Err(format!("Unknown approval action: {}", other)),
        }
    }
}

/// Input for [`derive_next_state`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DeriveNextState {
    pub current_id: Option<i64>,
    pub action: ApprovalAction,
    pub supplier_confirmed: bool,
}

/// Next state id for a requested approval action.
///
/// If the current state is approved or rejected and `override_frozen` is
/// false, the current id is returned unchanged. Otherwise the action maps to
/// the registry id of its target status; a status with no registered id
/// falls back to the current id rather than inventing one.
pub fn next_state_for_action(
    registry: &StateRegistry,
    action: ApprovalAction,
    current_id: Option<i64>,
    override_frozen: bool,
) -> Option<i64> {
    let current = registry.status_from_state_id(current_id);
    if !override_frozen && current.is_approval_terminal() {
        return current_id;
    }
    registry.id_for(action.target_status()).or(current_id)
}

/// Next state id with supplier confirmation taken into account.
///
/// A confirmed supplier short-circuits the approval-action logic: when the
/// confirmed state has a registered id, that id wins outright.
pub fn derive_next_state(registry: &StateRegistry, input: &DeriveNextState) -> Option<i64> {
    if input.supplier_confirmed {
        if let Some(id) = registry.id_for(OrderStatus::SupplierConfirmed) {
            return Some(id);
        }
    }
    next_state_for_action(registry, input.action, input.current_id, false)
}

/// Check if a status transition is allowed by the workflow table.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Allowed transitions from the given status.
pub fn allowed_transitions(from: OrderStatus) -> Vec<OrderStatus> {
    match from {
        OrderStatus::Draft => vec![OrderStatus::Pending, OrderStatus::Canceled],
        OrderStatus::Pending => vec![
            OrderStatus::Approved,
            OrderStatus::Rejected,
            OrderStatus::Draft,
        ],
        OrderStatus::Approved => vec![
            OrderStatus::SupplierPending,
            OrderStatus::Finished,
            OrderStatus::Canceled,
        ],
        OrderStatus::Rejected => vec![OrderStatus::Draft, OrderStatus::Canceled],
        OrderStatus::SupplierPending => {
            vec![OrderStatus::SupplierConfirmed, OrderStatus::Canceled]
        }
        OrderStatus::SupplierConfirmed => vec![OrderStatus::Finished, OrderStatus::Canceled],
        OrderStatus::Finished => vec![],
        OrderStatus::Canceled => vec![],
        OrderStatus::Unknown => vec![],
    }
}
