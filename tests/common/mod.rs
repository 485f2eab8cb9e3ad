//! Shared test fixtures

use procura::{CatalogRow, HierarchyConfig, PermissionChecker, StateRegistry};

/// Registry hydrated from a catalog whose ids differ from the compiled-in
/// defaults, the shape a live deployment presents.
pub fn hydrated_registry() -> StateRegistry {
    let mut registry = StateRegistry::with_defaults();
    registry.hydrate_from_catalog(&catalog_rows());
    registry
}

pub fn catalog_rows() -> Vec<CatalogRow> {
    [
        (101, "NOVA"),
        (102, "ODESLANA_KE_SCHVALENI"),
        (103, "SCHVALENA"),
        (104, "ZAMITNUTA"),
        (105, "CEKA_POTVRZENI"),
        (106, "POTVRZENA"),
        (107, "DOKONCENA"),
        (108, "ZRUSENA"),
    ]
    .iter()
    .map(|(id, code)| CatalogRow { id: *id, business_code: (*code).to_string() })
    .collect()
}

pub fn checker_with_hierarchy(tokens: &[&str]) -> PermissionChecker {
    let tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    let config = HierarchyConfig { enabled: true, profile_id: Some(1) };
    PermissionChecker::from_tokens(&tokens, &config)
}

pub fn checker_without_hierarchy(tokens: &[&str]) -> PermissionChecker {
    let tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    PermissionChecker::from_tokens(&tokens, &HierarchyConfig::default())
}
