//! Order draft aggregate
//!
//! In-memory representation of the order form being edited. Field names on
//! the wire follow the persisted column names of the order table, so a raw
//! order record from the persistence collaborator deserializes directly.
//! Hydration is lenient throughout: a missing section reads as its empty
//! default, never as an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::transition::ApprovalAction;

/// Funding source of the order. The cashbook source switches the order
/// details to the itemized representation; every other source uses the
/// aggregate description/price pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingSource {
    #[serde(rename = "Pokladna")]
    Cashbook,
    #[serde(rename = "LP")]
    LimitedPromise,
    #[serde(rename = "Smlouva")]
    Contract,
    #[serde(rename = "Individuální schválení")]
    IndividualApproval,
    #[serde(rename = "Pojistná událost")]
    InsuranceEvent,
}

impl FundingSource {
    pub fn is_cashbook(self) -> bool {
        matches!(self, FundingSource::Cashbook)
    }
}

/// How the supplier confirmed the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationMethod {
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "phone")]
    Phone,
    #[serde(rename = "signedForm")]
    SignedForm,
    #[serde(rename = "eShop")]
    EShop,
}

/// One itemized order line (cashbook funding).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderItem {
    #[serde(rename = "popis")]
    pub description: String,
    #[serde(rename = "cena_bez_dph")]
    pub price_excl_vat: Option<f64>,
    #[serde(rename = "sazba_dph")]
    pub vat_rate: Option<f64>,
    #[serde(rename = "cena_s_dph")]
    pub price_incl_vat: Option<f64>,
}

/// Uploaded attachment with its document classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
    pub id: i64,
    #[serde(rename = "typ_prilohy")]
    pub classification: String,
}

/// Purchaser contact block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaserSection {
    #[serde(rename = "jmeno")]
    pub contact_name: String,
    pub email: String,
    #[serde(rename = "telefon")]
    pub phone: String,
    #[serde(rename = "garant_uzivatel_id")]
    pub guarantor_id: Option<i64>,
}

/// Approval block: the authorizing officer and the cost centers charged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoApprovalSection {
    #[serde(rename = "prikazce_id")]
    pub approver_id: Option<i64>,
    #[serde(rename = "strediska")]
    pub cost_centers: Vec<String>,
}

/// Financing block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancingSection {
    #[serde(rename = "zdroj_financovani")]
    pub source: Option<FundingSource>,
    #[serde(rename = "lp_kod")]
    pub funding_code: String,
}

/// Supplier block. Unused (cleared) under cashbook funding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplierSection {
    #[serde(rename = "dodavatel_nazev")]
    pub name: String,
    #[serde(rename = "dodavatel_adresa")]
    pub address: String,
    #[serde(rename = "dodavatel_ico")]
    pub tax_id: String,
}

/// Order details: either the itemized list (cashbook) or the aggregate
/// description/prices, selected by the funding source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDetails {
    #[serde(rename = "polozky")]
    pub items: Vec<OrderItem>,
    #[serde(rename = "druh_objednavky")]
    pub order_type: String,
    #[serde(rename = "popis")]
    pub description: String,
    #[serde(rename = "cena_bez_dph")]
    pub price_excl_vat: Option<f64>,
    #[serde(rename = "cena_s_dph")]
    pub price_incl_vat: Option<f64>,
}

/// Optional delivery terms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliverySection {
    #[serde(rename = "predpokladany_termin_dodani")]
    pub expected_date: Option<NaiveDate>,
    #[serde(rename = "misto_dodani")]
    pub place: String,
    #[serde(rename = "zaruka")]
    pub warranty: String,
}

/// The order form aggregate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDraft {
    /// Persisted order id; `None` until the first successful save.
    #[serde(rename = "orderId")]
    pub order_id: Option<i64>,

    /// Subject of the order. Required in every workflow phase.
    #[serde(rename = "predmet")]
    pub subject: String,
    /// Price ceiling incl. VAT. Required in every workflow phase.
    #[serde(rename = "max_cena_s_dph")]
    pub price_ceiling: Option<f64>,

    #[serde(rename = "objednatel")]
    pub purchaser: PurchaserSection,
    #[serde(rename = "schvaleni")]
    pub po_approval: PoApprovalSection,
    #[serde(rename = "financovani")]
    pub financing: FinancingSection,
    #[serde(rename = "dodavatel")]
    pub supplier: SupplierSection,
    #[serde(rename = "detaily")]
    pub details: OrderDetails,
    #[serde(rename = "dodaci_podminky")]
    pub delivery: Option<DeliverySection>,
    #[serde(rename = "prilohy")]
    pub attachments: Vec<Attachment>,

    /// Transient approval selection made by the approver in the UI.
    #[serde(rename = "approvalStatus")]
    pub approval_status: Option<ApprovalAction>,
    #[serde(rename = "stav_komentar")]
    pub status_comment: String,
    #[serde(rename = "pendingNote")]
    pub pending_note: String,

    #[serde(rename = "potvrzeno_dodavatelem")]
    pub supplier_confirmed: bool,
    #[serde(rename = "potvrzeno_zpusob")]
    pub confirmation_methods: Vec<ConfirmationMethod>,
    #[serde(rename = "datum_akceptace")]
    pub acceptance_date: Option<NaiveDate>,
}

impl OrderDraft {
    /// Hydrate a draft from a raw persisted order record.
    ///
    /// Unknown fields are ignored and missing fields default; a record that
    /// does not parse at all yields an empty draft rather than an error,
    /// per the never-block-the-read-path policy.
    pub fn from_record(record: serde_json::Value) -> Self {
        match serde_json::from_value(record) {
            Ok(draft) => draft,
            Err(err) => {
                tracing::warn!(%err, "order record did not parse, starting from an empty draft");
                OrderDraft::default()
            }
        }
    }

    /// Whether the itemized detail representation is authoritative.
    pub fn is_cashbook(&self) -> bool {
        self.financing.source.map_or(false, FundingSource::is_cashbook)
    }
}
