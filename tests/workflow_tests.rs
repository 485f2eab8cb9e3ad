//! End-to-end order workflow tests
//!
//! Exercises the registry, transition resolution, permission expansion and
//! form validation together, the way the form layer drives them during one
//! order's life.

mod common;

use common::{checker_with_hierarchy, checker_without_hierarchy, hydrated_registry};
use procura::{
    validate, ApprovalAction, CatalogRow, OrderDraft, OrderStatus, Permission, SectionVisibility,
    StateRegistry, ValidationInput,
};

// ============================================================================
// Registry + transitions over a live catalog
// ============================================================================

#[test]
fn test_catalog_ids_flow_through_transition_resolution() {
    let registry = hydrated_registry();

    // Order sits in pending (catalog id 102), approver approves.
    assert_eq!(registry.status_from_state_id(Some(102)), OrderStatus::Pending);
    let next = procura::next_state_for_action(&registry, ApprovalAction::Approved, Some(102), false);
    assert_eq!(next, Some(103));
    assert_eq!(registry.status_from_state_id(next), OrderStatus::Approved);
}

#[test]
fn test_terminal_states_freeze_until_override() {
    let registry = hydrated_registry();

    // Approved (103) and rejected (104) ignore further actions.
    for terminal in [103, 104] {
        for action in [ApprovalAction::Approved, ApprovalAction::Rejected, ApprovalAction::Pending] {
            let next = procura::next_state_for_action(&registry, action, Some(terminal), false);
            assert_eq!(next, Some(terminal));
        }
    }

    // An explicit override (admin correction) unfreezes.
    let next =
        procura::next_state_for_action(&registry, ApprovalAction::Pending, Some(103), true);
    assert_eq!(next, Some(102));
}

#[test]
fn test_partial_catalog_keeps_defaults_for_missing_codes() {
    let mut registry = StateRegistry::with_defaults();
    registry.hydrate_from_catalog(&[CatalogRow { id: 900, business_code: "schvalena".into() }]);

    assert_eq!(registry.id_for(OrderStatus::Approved), Some(900));
    // Untouched codes keep their compiled-in ids.
    assert_eq!(registry.id_for(OrderStatus::Draft), Some(1));
    assert_eq!(registry.status_from_state_id(Some(900)), OrderStatus::Approved);
    assert_eq!(registry.status_from_state_id(None), OrderStatus::Draft);
}

// ============================================================================
// Permission expansion scenarios
// ============================================================================

#[test]
fn test_read_own_expands_one_hop_exactly() {
    let checker = checker_with_hierarchy(&["ORDER_READ_OWN"]);
    let effective = checker.effective();

    assert!(effective.contains(&Permission::OrderReadOwn));
    assert!(effective.contains(&Permission::OrderReadAll));
    assert!(effective.contains(&Permission::OrderEditOwn));
    // One hop only: READ_ALL's own derivations are not followed.
    assert!(!effective.contains(&Permission::OrderEditAll));
    assert_eq!(effective.len(), 3);
}

#[test]
fn test_hierarchy_without_profile_is_inert() {
    let tokens = vec!["ORDER_READ_OWN".to_string()];
    let config = procura::HierarchyConfig { enabled: true, profile_id: None };
    let checker = procura::PermissionChecker::from_tokens(&tokens, &config);
    assert_eq!(checker.effective().len(), 1);
}

#[test]
fn test_hierarchy_never_originates_grants() {
    let checker = checker_with_hierarchy(&[]);
    assert!(checker.effective().is_empty());
    assert!(!checker.can_create_orders());
}

#[test]
fn test_delete_own_is_owner_scoped() {
    let checker = checker_without_hierarchy(&["ORDER_DELETE_OWN"]);
    assert!(checker.can_delete_order(7, Some(7)));
    assert!(!checker.can_delete_order(7, Some(8)));
    assert!(!checker.can_delete_order(7, None));

    let manager = checker_without_hierarchy(&["ORDER_MANAGE"]);
    assert!(manager.can_delete_order(7, Some(8)));
}

#[test]
fn test_unknown_tokens_are_skipped_not_fatal() {
    let checker = checker_without_hierarchy(&["ORDER_READ_OWN", "TOTALLY_BOGUS", ""]);
    assert_eq!(checker.effective().len(), 1);
    assert!(checker.allows(Permission::OrderReadOwn));
}

// ============================================================================
// Validation driven by workflow position
// ============================================================================

#[test]
fn test_cashbook_initial_save_flags_items_only() {
    let mut draft = OrderDraft::default();
    draft.subject = "Kancelářské potřeby".into();
    draft.price_ceiling = Some(3_000.0);
    draft.purchaser.contact_name = "Petr Svoboda".into();
    draft.purchaser.email = "petr.svoboda@example.cz".into();
    draft.purchaser.phone = "+420 602 111 222".into();
    draft.purchaser.guarantor_id = Some(3);
    draft.financing.source = Some(procura::FundingSource::Cashbook);

    let mut visible = SectionVisibility::default();
    visible.purchaser = true;
    visible.financing = true;
    visible.supplier = true;
    visible.order_details = true;

    let checker = checker_without_hierarchy(&["ORDER_EDIT_OWN"]);
    let errors = validate(&ValidationInput {
        draft: &draft,
        visible,
        checker: &checker,
        target: None,
        middle_sections_valid: false,
        strict: false,
    });

    assert!(errors.contains("polozky[0].popis"));
    assert!(!errors.contains("dodavatel_nazev"));
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_provisional_approval_relaxes_then_strict_save_does_not() {
    let mut draft = OrderDraft::default();
    draft.order_id = Some(77);
    draft.subject = "Pravidelná revize výtahu".into();
    draft.price_ceiling = Some(15_000.0);
    draft.financing.source = Some(procura::FundingSource::Contract);

    let approver = checker_with_hierarchy(&["ORDER_APPROVE"]);
    let mut input = ValidationInput {
        draft: &draft,
        visible: SectionVisibility::default(),
        checker: &approver,
        target: Some(OrderStatus::Approved),
        middle_sections_valid: false,
        strict: false,
    };
    assert!(validate(&input).is_empty());

    input.strict = true;
    let errors = validate(&input);
    assert!(errors.contains("dodavatel_nazev"));
}

#[test]
fn test_rejected_order_lifecycle() {
    let registry = hydrated_registry();
    let mut draft = OrderDraft::default();
    draft.order_id = Some(12);
    draft.subject = "Nákup monitorů".into();
    draft.price_ceiling = Some(40_000.0);
    draft.approval_status = Some(ApprovalAction::Rejected);

    let checker = checker_without_hierarchy(&["ORDER_APPROVE"]);
    let errors = validate(&ValidationInput {
        draft: &draft,
        visible: SectionVisibility::default(),
        checker: &checker,
        target: Some(OrderStatus::Rejected),
        middle_sections_valid: false,
        strict: false,
    });
    assert!(errors.contains("stav_komentar"));

    draft.status_comment = "Nad rámec rozpočtu oddělení".into();
    let errors = validate(&ValidationInput {
        draft: &draft,
        visible: SectionVisibility::default(),
        checker: &checker,
        target: Some(OrderStatus::Rejected),
        middle_sections_valid: false,
        strict: false,
    });
    assert!(errors.is_empty());

    let next =
        procura::next_state_for_action(&registry, ApprovalAction::Rejected, Some(102), false);
    assert_eq!(registry.status_from_state_id(next), OrderStatus::Rejected);
    // Once rejected, further approval clicks change nothing.
    let frozen = procura::next_state_for_action(&registry, ApprovalAction::Approved, next, false);
    assert_eq!(frozen, next);
}

#[test]
fn test_supplier_confirmation_short_circuit() {
    let registry = hydrated_registry();
    let input = procura::DeriveNextState {
        current_id: Some(103),
        action: ApprovalAction::None,
        supplier_confirmed: true,
    };
    let next = procura::derive_next_state(&registry, &input);
    assert_eq!(registry.status_from_state_id(next), OrderStatus::SupplierConfirmed);
}
