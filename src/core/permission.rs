//! Permission hierarchy expander
//!
//! The organizational hierarchy amplifies a user's existing grants; it never
//! originates one. Two amplification kinds exist: scope expansion (OWN ->
//! ALL, same action) and action upgrade (READ -> EDIT -> DELETE -> MANAGE,
//! same scope). Expansion is deliberately single-hop: a token added by one
//! pass is not itself re-expanded, so an OWN -> ALL -> MANAGE chain requires
//! the caller to already hold the intermediate grant.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A known permission token, wire form `DOMAIN_ACTION_SCOPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    // Orders
    OrderReadOwn,
    OrderViewOwn,
    OrderReadAll,
    OrderViewAll,
    OrderEditOwn,
    OrderEditAll,
    OrderDeleteOwn,
    OrderDeleteAll,
    OrderCreate,
    OrderApprove,
    OrderManage,
    // Invoices
    InvoiceReadOwn,
    InvoiceReadAll,
    InvoiceEditOwn,
    InvoiceEditAll,
    InvoiceDeleteOwn,
    InvoiceDeleteAll,
    // Cashbook
    CashbookReadOwn,
    CashbookReadAll,
    CashbookEditOwn,
    CashbookEditAll,
    CashbookDeleteOwn,
    CashbookDeleteAll,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::OrderReadOwn => "ORDER_READ_OWN",
            Permission::OrderViewOwn => "ORDER_VIEW_OWN",
            Permission::OrderReadAll => "ORDER_READ_ALL",
            Permission::OrderViewAll => "ORDER_VIEW_ALL",
            Permission::OrderEditOwn => "ORDER_EDIT_OWN",
            Permission::OrderEditAll => "ORDER_EDIT_ALL",
            Permission::OrderDeleteOwn => "ORDER_DELETE_OWN",
            Permission::OrderDeleteAll => "ORDER_DELETE_ALL",
            Permission::OrderCreate => "ORDER_CREATE",
            Permission::OrderApprove => "ORDER_APPROVE",
            Permission::OrderManage => "ORDER_MANAGE",
            Permission::InvoiceReadOwn => "INVOICE_READ_OWN",
            Permission::InvoiceReadAll => "INVOICE_READ_ALL",
            Permission::InvoiceEditOwn => "INVOICE_EDIT_OWN",
            Permission::InvoiceEditAll => "INVOICE_EDIT_ALL",
            Permission::InvoiceDeleteOwn => "INVOICE_DELETE_OWN",
            Permission::InvoiceDeleteAll => "INVOICE_DELETE_ALL",
            Permission::CashbookReadOwn => "CASHBOOK_READ_OWN",
            Permission::CashbookReadAll => "CASHBOOK_READ_ALL",
            Permission::CashbookEditOwn => "CASHBOOK_EDIT_OWN",
            Permission::CashbookEditAll => "CASHBOOK_EDIT_ALL",
            Permission::CashbookDeleteOwn => "CASHBOOK_DELETE_OWN",
            Permission::CashbookDeleteAll => "CASHBOOK_DELETE_ALL",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ORDER_READ_OWN" => Ok(Permission::OrderReadOwn),
            "ORDER_VIEW_OWN" => Ok(Permission::OrderViewOwn),
            "ORDER_READ_ALL" => Ok(Permission::OrderReadAll),
            "ORDER_VIEW_ALL" => Ok(Permission::OrderViewAll),
            "ORDER_EDIT_OWN" => Ok(Permission::OrderEditOwn),
            "ORDER_EDIT_ALL" => Ok(Permission::OrderEditAll),
            "ORDER_DELETE_OWN" => Ok(Permission::OrderDeleteOwn),
            "ORDER_DELETE_ALL" => Ok(Permission::OrderDeleteAll),
            "ORDER_CREATE" => Ok(Permission::OrderCreate),
            "ORDER_APPROVE" => Ok(Permission::OrderApprove),
            "ORDER_MANAGE" => Ok(Permission::OrderManage),
            "INVOICE_READ_OWN" => Ok(Permission::InvoiceReadOwn),
            "INVOICE_READ_ALL" => Ok(Permission::InvoiceReadAll),
            "INVOICE_EDIT_OWN" => Ok(Permission::InvoiceEditOwn),
            "INVOICE_EDIT_ALL" => Ok(Permission::InvoiceEditAll),
            "INVOICE_DELETE_OWN" => Ok(Permission::InvoiceDeleteOwn),
            "INVOICE_DELETE_ALL" => Ok(Permission::InvoiceDeleteAll),
            "CASHBOOK_READ_OWN" => Ok(Permission::CashbookReadOwn),
            "CASHBOOK_READ_ALL" => Ok(Permission::CashbookReadAll),
            "CASHBOOK_EDIT_OWN" => Ok(Permission::CashbookEditOwn),
            "CASHBOOK_EDIT_ALL" => Ok(Permission::CashbookEditAll),
            "CASHBOOK_DELETE_OWN" => Ok(Permission::CashbookDeleteOwn),
            "CASHBOOK_DELETE_ALL" => Ok(Permission::CashbookDeleteAll),
            other => Err(format!("Unknown permission token: {}", other)),
        }
    }
}

/// Hierarchy amplification for one base token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HierarchyRule {
    /// Broader scope, same action (OWN -> ALL).
    pub expand: Option<Permission>,
    /// Stronger action, same scope (READ -> EDIT -> DELETE -> MANAGE).
    pub upgrade: Option<Permission>,
}

/// Compiled-in hierarchy rule for a base token. Exhaustive on purpose: a new
/// token variant forces a decision here instead of silently falling through.
pub fn hierarchy_rule(base: Permission) -> HierarchyRule {
    use Permission::*;
    let (expand, upgrade) = match base {
        OrderReadOwn => (Some(OrderReadAll), Some(OrderEditOwn)),
        OrderViewOwn => (Some(OrderViewAll), Some(OrderEditOwn)),
        OrderReadAll => (None, Some(OrderEditAll)),
        OrderViewAll => (None, Some(OrderEditAll)),
        OrderEditOwn => (Some(OrderEditAll), Some(OrderDeleteOwn)),
        OrderEditAll => (None, Some(OrderDeleteAll)),
        OrderDeleteOwn => (Some(OrderDeleteAll), Some(OrderManage)),
        OrderDeleteAll => (None, Some(OrderManage)),
        // CREATE and APPROVE are global grants; only the action upgrades
        OrderCreate => (None, Some(OrderEditOwn)),
        OrderApprove => (None, Some(OrderManage)),
        OrderManage => (None, None),
        InvoiceReadOwn => (Some(InvoiceReadAll), Some(InvoiceEditOwn)),
        InvoiceReadAll => (None, Some(InvoiceEditAll)),
        InvoiceEditOwn => (Some(InvoiceEditAll), Some(InvoiceDeleteOwn)),
        InvoiceEditAll => (None, Some(InvoiceDeleteAll)),
        InvoiceDeleteOwn => (None, None),
        InvoiceDeleteAll => (None, None),
        CashbookReadOwn => (Some(CashbookReadAll), Some(CashbookEditOwn)),
        CashbookReadAll => (None, Some(CashbookEditAll)),
        CashbookEditOwn => (Some(CashbookEditAll), Some(CashbookDeleteOwn)),
        CashbookEditAll => (None, Some(CashbookDeleteAll)),
        CashbookDeleteOwn => (None, None),
        CashbookDeleteAll => (None, None),
    };
    HierarchyRule { expand, upgrade }
}

/// Hierarchy mode configuration supplied by the external profile service.
/// A hierarchy mode with no selected profile is equivalent to disabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    pub enabled: bool,
    #[serde(rename = "profileId")]
    pub profile_id: Option<i64>,
}

impl HierarchyConfig {
    pub fn is_effective(&self) -> bool {
        self.enabled && self.profile_id.is_some()
    }
}

/// Parse wire tokens into the typed set, skipping unknown tokens.
/// Unknown grants are dropped, never guessed at.
pub fn parse_permissions(tokens: &[String]) -> HashSet<Permission> {
    tokens
        .iter()
        .filter_map(|raw| match raw.parse::<Permission>() {
            Ok(p) => Some(p),
            Err(_) => {
                tracing::warn!(token = raw.as_str(), "ignoring unknown permission token");
                None
            }
        })
        .collect()
}

/// Expand a base permission set by the hierarchy rules.
///
/// Disabled hierarchy returns a copy of the base set. An empty base set
/// stays empty regardless of flags. Expansion is single-pass: derived
/// tokens are not re-expanded within the same call.
pub fn expand_permissions(
    base: &HashSet<Permission>,
    hierarchy_enabled: bool,
    allow_expand: bool,
    allow_upgrade: bool,
) -> HashSet<Permission> {
    if !hierarchy_enabled || base.is_empty() {
        return base.clone();
    }

    let mut expanded = base.clone();
    for &perm in base {
        let rule = hierarchy_rule(perm);
        if allow_expand {
            if let Some(p) = rule.expand {
                expanded.insert(p);
            }
        }
        if allow_upgrade {
            if let Some(p) = rule.upgrade {
                expanded.insert(p);
            }
        }
    }
    expanded
}

/// View-permission breakdown for the order list UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewPermissions {
    pub can_view: bool,
    pub can_view_own: bool,
    pub can_view_all: bool,
}

/// Edit-permission breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditPermissions {
    pub can_edit: bool,
    pub can_edit_own: bool,
    pub can_edit_all: bool,
}

/// Effective permission set with membership queries.
///
/// Built once per session from the base grants and the hierarchy config;
/// all queries run against the expanded set.
#[derive(Debug, Clone)]
pub struct PermissionChecker {
    base: HashSet<Permission>,
    expanded: HashSet<Permission>,
}

impl PermissionChecker {
    pub fn new(base: HashSet<Permission>, config: &HierarchyConfig) -> Self {
        let expanded = expand_permissions(&base, config.is_effective(), true, true);
        Self { base, expanded }
    }

    /// Checker over wire-form tokens.
    pub fn from_tokens(tokens: &[String], config: &HierarchyConfig) -> Self {
        Self::new(parse_permissions(tokens), config)
    }

    pub fn allows(&self, permission: Permission) -> bool {
        self.expanded.contains(&permission)
    }

    pub fn effective(&self) -> &HashSet<Permission> {
        &self.expanded
    }

    pub fn view_orders(&self) -> ViewPermissions {
        let can_view_own =
            self.allows(Permission::OrderReadOwn) || self.allows(Permission::OrderViewOwn);
        let can_view_all = self.allows(Permission::OrderReadAll)
            || self.allows(Permission::OrderViewAll)
            || self.allows(Permission::OrderManage)
            || self.allows(Permission::OrderEditAll)
            || self.allows(Permission::OrderDeleteAll);
        ViewPermissions {
            can_view: can_view_own || can_view_all,
            can_view_own,
            can_view_all,
        }
    }

    pub fn edit_orders(&self) -> EditPermissions {
        let can_edit_own = self.allows(Permission::OrderEditOwn);
        let can_edit_all = self.allows(Permission::OrderEditAll)
            || self.allows(Permission::OrderManage)
            || self.allows(Permission::OrderDeleteAll);
        EditPermissions {
            can_edit: can_edit_own || can_edit_all,
            can_edit_own,
            can_edit_all,
        }
    }

    pub fn can_create_orders(&self) -> bool {
        self.allows(Permission::OrderCreate) || self.allows(Permission::OrderManage)
    }

    /// Deletion of a specific order. Deleting only one's own records
    /// additionally requires ownership of the record.
    pub fn can_delete_order(&self, current_user_id: i64, owner_id: Option<i64>) -> bool {
        if self.allows(Permission::OrderDeleteAll) || self.allows(Permission::OrderManage) {
            return true;
        }
        self.allows(Permission::OrderDeleteOwn) && owner_id == Some(current_user_id)
    }

    pub fn summary(&self) -> PermissionSummary {
        let mut added: Vec<Permission> = self
            .expanded
            .difference(&self.base)
            .copied()
            .collect();
        added.sort_by_key(|p| p.as_str());
        PermissionSummary {
            base_count: self.base.len(),
            expanded_count: self.expanded.len(),
            added_by_hierarchy: added,
        }
    }
}

/// Debug/audit overview of what the hierarchy contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSummary {
    pub base_count: usize,
    pub expanded_count: usize,
    pub added_by_hierarchy: Vec<Permission>,
}
