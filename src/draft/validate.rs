//! Form validation
//!
//! Field-level validation of an [`OrderDraft`] against the currently visible
//! sections, the caller's effective permissions, and the workflow state the
//! save is committing into. The result is a set of field-path keys; no key
//! carries a message, rendering is left to the presentation layer.
//!
//! Validation never fails as an operation. Malformed or partially filled
//! drafts produce entries in the error set, not errors from the function.

use std::collections::BTreeSet;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::core::permission::{Permission, PermissionChecker};
use crate::core::registry::OrderStatus;
use crate::core::transition::ApprovalAction;
use crate::draft::model::{OrderDraft, OrderItem};

/// Which form sections are currently open in the UI. Hidden sections are
/// exempt from most required-field checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionVisibility {
    pub purchaser: bool,
    pub po_approval: bool,
    pub financing: bool,
    pub supplier: bool,
    pub order_details: bool,
    pub delivery: bool,
    pub docs: bool,
    pub sent_confirmation: bool,
}

impl SectionVisibility {
    pub fn all_open() -> Self {
        SectionVisibility {
            purchaser: true,
            po_approval: true,
            financing: true,
            supplier: true,
            order_details: true,
            delivery: true,
            docs: true,
            sent_confirmation: true,
        }
    }
}

/// Set of invalid field paths, e.g. `polozky[0].cena_s_dph`.
///
/// Serializes as a map from path to `true`, the shape the form layer
/// consumes for highlighting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeSet<String>);

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors(BTreeSet::new())
    }

    fn flag(&mut self, path: impl Into<String>) {
        self.0.insert(path.into());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for path in &self.0 {
            map.serialize_entry(path, &true)?;
        }
        map.end()
    }
}

/// Everything the validator needs for one pass.
pub struct ValidationInput<'a> {
    pub draft: &'a OrderDraft,
    pub visible: SectionVisibility,
    pub checker: &'a PermissionChecker,
    /// Workflow state this save commits into, if any. `Some(Approved)`
    /// activates the strict approval branch.
    pub target: Option<OrderStatus>,
    /// Whether the financing/supplier/details sections already pass on their
    /// own, as judged by the form layer. Gates the early approval relax and
    /// the supplier-confirmation requirements.
    pub middle_sections_valid: bool,
    /// Disables the early approval relax, forcing full validation.
    pub strict: bool,
}

fn non_empty(value: &str) -> bool {
    !value.trim().is_empty()
}

fn positive(value: Option<f64>) -> bool {
    value.map_or(false, |v| v.is_finite() && v > 0.0)
}

fn check_purchaser(draft: &OrderDraft, errors: &mut ValidationErrors) {
    if !non_empty(&draft.purchaser.contact_name) {
        errors.flag("purchaser.contactPerson.name");
    }
    if !non_empty(&draft.purchaser.email) {
        errors.flag("purchaser.contactPerson.email");
    }
    if !non_empty(&draft.purchaser.phone) {
        errors.flag("purchaser.contactPerson.phone");
    }
    if draft.purchaser.guarantor_id.is_none() {
        errors.flag("garant_uzivatel_id");
    }
}

fn check_po_approval(draft: &OrderDraft, errors: &mut ValidationErrors) {
    if draft.po_approval.approver_id.is_none() {
        errors.flag("prikazce_id");
    }
    if draft.po_approval.cost_centers.is_empty() {
        errors.flag("strediska");
    }
}

fn check_supplier(draft: &OrderDraft, errors: &mut ValidationErrors) {
    if !non_empty(&draft.supplier.name) {
        errors.flag("dodavatel_nazev");
    }
    if !non_empty(&draft.supplier.address) {
        errors.flag("dodavatel_adresa");
    }
    if !non_empty(&draft.supplier.tax_id) {
        errors.flag("dodavatel_ico");
    }
}

fn check_item(idx: usize, item: &OrderItem, require_vat_rate: bool, errors: &mut ValidationErrors) {
    if !non_empty(&item.description) {
        errors.flag(format!("polozky[{idx}].popis"));
    }
    if !positive(item.price_excl_vat) {
        errors.flag(format!("polozky[{idx}].cena_bez_dph"));
    }
    if !positive(item.price_incl_vat) {
        errors.flag(format!("polozky[{idx}].cena_s_dph"));
    }
    if require_vat_rate && item.vat_rate.is_none() {
        errors.flag(format!("polozky[{idx}].sazba_dph"));
    }
}

fn check_items(draft: &OrderDraft, require_vat_rate: bool, errors: &mut ValidationErrors) {
    if draft.details.items.is_empty() {
        errors.flag("polozky[0].popis");
        return;
    }
    for (idx, item) in draft.details.items.iter().enumerate() {
        check_item(idx, item, require_vat_rate, errors);
    }
}

fn check_aggregate_details(draft: &OrderDraft, errors: &mut ValidationErrors) {
    if !non_empty(&draft.details.order_type) {
        errors.flag("druh_objednavky");
    }
    if !non_empty(&draft.details.description) {
        errors.flag("description");
    }
    if !positive(draft.details.price_excl_vat) {
        errors.flag("cena_bez_dph");
    }
    if !positive(draft.details.price_incl_vat) {
        errors.flag("cena_s_dph");
    }
}

/// Validate a draft for one save attempt.
///
/// Pure over its input: identical inputs produce identical error sets, and
/// no draft shape can make it fail.
pub fn validate(input: &ValidationInput<'_>) -> ValidationErrors {
    let ValidationInput { draft, visible, checker, target, middle_sections_valid, strict } = input;
    let mut errors = ValidationErrors::new();
    let cashbook = draft.is_cashbook();

    // Core anchors, required in every workflow phase no matter what is open.
    if !non_empty(&draft.subject) {
        errors.flag("predmet");
    }
    if !positive(draft.price_ceiling) {
        errors.flag("max_cena_s_dph");
    }

    // First save of a new order: starred fields of every visible section.
    let initial_save = draft.order_id.is_none();
    if initial_save {
        if visible.purchaser {
            check_purchaser(draft, &mut errors);
        }
        if visible.po_approval {
            check_po_approval(draft, &mut errors);
        }
        if visible.financing {
            if draft.financing.source.is_none() {
                errors.flag("zdroj_financovani");
            }
            if matches!(
                draft.financing.source,
                Some(crate::draft::model::FundingSource::LimitedPromise)
            ) && !non_empty(&draft.financing.funding_code)
            {
                errors.flag("lp_kod");
            }
        }
        if visible.supplier && !cashbook {
            check_supplier(draft, &mut errors);
        }
        if visible.order_details {
            if cashbook {
                check_items(draft, false, &mut errors);
            } else {
                check_aggregate_details(draft, &mut errors);
            }
        }
    }

    // Purchaser and approval blocks gate every save while visible.
    if visible.purchaser {
        check_purchaser(draft, &mut errors);
    }
    if visible.po_approval {
        check_po_approval(draft, &mut errors);
    }

    // A provisional approval by an approver may bypass the full middle-section
    // checks while those sections are still being filled in.
    let early_relax = !strict
        && checker.allows(Permission::OrderApprove)
        && *target == Some(OrderStatus::Approved)
        && !middle_sections_valid;
    let committing_approval = *target == Some(OrderStatus::Approved) && !early_relax;

    if committing_approval {
        if draft.financing.source.is_none() {
            errors.flag("zdroj_financovani");
        }
        if cashbook {
            check_items(draft, true, &mut errors);
        } else if !non_empty(&draft.supplier.name) {
            errors.flag("dodavatel_nazev");
        }
        // Supplier confirmation stays optional; once checked, the method and
        // acceptance date become mandatory.
        if *middle_sections_valid && draft.supplier_confirmed {
            if draft.confirmation_methods.is_empty() {
                errors.flag("confirmationMethod");
            }
            if draft.acceptance_date.is_none() {
                errors.flag("acceptanceDate");
            }
        }
    } else {
        // Plain save: lenient checks limited to visible blocks.
        if visible.financing && draft.financing.source.is_none() {
            errors.flag("zdroj_financovani");
        }
        if visible.supplier && !cashbook {
            check_supplier(draft, &mut errors);
        }
        if visible.order_details {
            if cashbook {
                if draft.details.items.is_empty() {
                    errors.flag("polozky[0].popis");
                } else {
                    for (idx, item) in draft.details.items.iter().enumerate() {
                        if !non_empty(&item.description) {
                            errors.flag(format!("polozky[{idx}].popis"));
                        }
                    }
                }
            } else {
                check_aggregate_details(draft, &mut errors);
            }
        }
    }

    // Every attachment must carry a document classification.
    for attachment in &draft.attachments {
        if !non_empty(&attachment.classification) {
            errors.flag(format!("attachment.{}.type", attachment.id));
        }
    }

    // Rejection needs a comment; putting an order on hold needs a comment or
    // a pending note, and both keys are flagged so the form can highlight
    // the either-or choice.
    match draft.approval_status {
        Some(ApprovalAction::Rejected) if !non_empty(&draft.status_comment) => {
            errors.flag("stav_komentar");
        }
        Some(ApprovalAction::Pending)
            if !non_empty(&draft.status_comment) && !non_empty(&draft.pending_note) =>
        {
            errors.flag("stav_komentar");
            errors.flag("pendingNote");
        }
        _ => {}
    }

    errors
}
