//! State registry - maps numeric workflow-state ids to semantic statuses
//!
//! The persistence store assigns opaque numeric ids to workflow states; the
//! rest of the system reasons about semantic status codes. The registry is
//! the single source of truth for that mapping. It ships with compiled-in
//! default ids and can be re-hydrated at runtime from the external state
//! catalog, at which point the reverse index is rebuilt lazily on next read.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Semantic workflow status of an order, independent of any DB-assigned id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    #[default]
    Draft,
    Pending,
    Approved,
    Rejected,
    SupplierPending,
    SupplierConfirmed,
    Finished,
    Canceled,
    Unknown,
}

impl OrderStatus {
    /// The eight catalog-backed statuses, in catalog declaration order.
    /// `Unknown` is a read-path degradation, never a stored state.
    pub const CATALOG: [OrderStatus; 8] = [
        OrderStatus::Draft,
        OrderStatus::Pending,
        OrderStatus::Approved,
        OrderStatus::Rejected,
        OrderStatus::SupplierPending,
        OrderStatus::SupplierConfirmed,
        OrderStatus::Finished,
        OrderStatus::Canceled,
    ];

    /// Business code used by the external state catalog.
    pub fn business_code(self) -> Option<&'static str> {
        match self {
            OrderStatus::Draft => Some("NOVA"),
            OrderStatus::Pending => Some("ODESLANA_KE_SCHVALENI"),
            OrderStatus::Approved => Some("SCHVALENA"),
            OrderStatus::Rejected => Some("ZAMITNUTA"),
            OrderStatus::SupplierPending => Some("CEKA_POTVRZENI"),
            OrderStatus::SupplierConfirmed => Some("POTVRZENA"),
            OrderStatus::Finished => Some("DOKONCENA"),
            OrderStatus::Canceled => Some("ZRUSENA"),
            OrderStatus::Unknown => None,
        }
    }

    /// Human display label for the UI collaborator.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Draft => "Nová",
            OrderStatus::Pending => "Ke schválení",
            OrderStatus::Approved => "Schválená",
            OrderStatus::Rejected => "Zamítnuta",
            OrderStatus::SupplierPending => "Čeká na potvrzení",
            OrderStatus::SupplierConfirmed => "Potvrzená dodavatelem",
            OrderStatus::Finished => "Dokončená",
            OrderStatus::Canceled => "Zrušena",
            OrderStatus::Unknown => "Neznámý stav",
        }
    }

    /// True for states that freeze the approval workflow: once an order is
    /// approved or rejected, transient UI actions must not recompute it.
    pub fn is_approval_terminal(self) -> bool {
        matches!(self, OrderStatus::Approved | OrderStatus::Rejected)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::Rejected => "rejected",
            OrderStatus::SupplierPending => "supplierPending",
            OrderStatus::SupplierConfirmed => "supplierConfirmed",
            OrderStatus::Finished => "finished",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Unknown => "unknown",
        };
        write!(f, "{}", tag)
    }
}

/// One row of the external state catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRow {
    pub id: i64,
    #[serde(rename = "businessCode")]
    pub business_code: String,
}

/// Registry instance owning the id <-> status mapping.
///
/// The reverse index (id -> status) is a cache rebuilt lazily after
/// hydration; readers never observe a stale index.
#[derive(Debug)]
pub struct StateRegistry {
    ids: HashMap<OrderStatus, i64>,
    reverse: Mutex<Option<HashMap<i64, OrderStatus>>>,
}

impl Default for StateRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl StateRegistry {
    /// Registry with the compiled-in default ids (catalog order, 1-based).
    pub fn with_defaults() -> Self {
        let ids = OrderStatus::CATALOG
            .iter()
            .enumerate()
            .map(|(i, &status)| (status, (i + 1) as i64))
            .collect();
        Self {
            ids,
            reverse: Mutex::new(None),
        }
    }

    /// Registry with no ids at all. Every forward lookup returns `None`
    /// until the catalog is hydrated; read paths still degrade gracefully.
    pub fn empty() -> Self {
        Self {
            ids: HashMap::new(),
            reverse: Mutex::new(None),
        }
    }

    /// Numeric id for a semantic status, if one is registered.
    pub fn id_for(&self, status: OrderStatus) -> Option<i64> {
        self.ids.get(&status).copied()
    }

    /// Resolve a raw state id to its semantic status.
    ///
    /// Total by contract: `None` resolves to `Draft` (an order that was
    /// never persisted has no state row yet), an id missing from the index
    /// resolves to `Unknown`. Never fails.
    pub fn status_from_state_id(&self, id: Option<i64>) -> OrderStatus {
        let Some(id) = id else {
            return OrderStatus::Draft;
        };
        let mut cache = self
            .reverse
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let index = cache.get_or_insert_with(|| {
            self.ids.iter().map(|(&status, &id)| (id, status)).collect()
        });
        index.get(&id).copied().unwrap_or(OrderStatus::Unknown)
    }

    /// Overwrite default ids from the external state catalog.
    ///
    /// Each of the eight well-known business codes is looked up in the rows
    /// case-insensitively; codes absent from the catalog keep their current
    /// id. Invalidate the reverse index unconditionally so the next read
    /// rebuilds it. Hydrating twice with the same catalog is a no-op.
    pub fn hydrate_from_catalog(&mut self, rows: &[CatalogRow]) {
        for status in OrderStatus::CATALOG {
            let Some(code) = status.business_code() else {
                continue;
            };
            let row = rows
                .iter()
                .find(|r| r.business_code.eq_ignore_ascii_case(code));
            if let Some(row) = row {
                tracing::debug!(code, id = row.id, "catalog id for workflow state");
                self.ids.insert(status, row.id);
            }
        }
        *self
            .reverse
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
    }

    /// Normalize a raw business-code string to a semantic status.
    ///
    /// Case-insensitive; `CEKA_SCHVALENI` and `CEKA_SE` are historical
    /// aliases of the pending state, `ODESLANA` of the supplier-pending
    /// state. Empty input means the order was never submitted and reads as
    /// `Draft`; anything unmapped reads as `Unknown`.
    pub fn status_from_raw_code(&self, raw: &str) -> OrderStatus {
        let code = raw.trim().to_ascii_uppercase();
        match code.as_str() {
            "" => OrderStatus::Draft,
            "NOVA" => OrderStatus::Draft,
            "ODESLANA_KE_SCHVALENI" | "CEKA_SCHVALENI" | "CEKA_SE" => OrderStatus::Pending,
            "SCHVALENA" => OrderStatus::Approved,
            "ZAMITNUTA" => OrderStatus::Rejected,
            "CEKA_POTVRZENI" | "ODESLANA" => OrderStatus::SupplierPending,
            "POTVRZENA" => OrderStatus::SupplierConfirmed,
            "DOKONCENA" => OrderStatus::Finished,
            "ZRUSENA" => OrderStatus::Canceled,
            _ => OrderStatus::Unknown,
        }
    }
}
