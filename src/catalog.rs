//! Static permission catalogs for the shipper and trucker portals.
//!
//! Each catalog lists, in declaration order, the permission keys a sub-user
//! of that portal can be granted, together with the human label shown in the
//! permissions dialog and the route the key protects. The data is fixed at
//! compile time; lookup maps are built once behind `Lazy`.
//!
//! The trucker catalog includes `addLoad`, which supersedes the shipper-era
//! `loadBoard` key on the wire; reconciling the two is the normalizer's job
//! (`crate::normalize`), never the catalog's.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::warn;

use crate::account::AccountType;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub route: &'static str,
}

/// Shipper portal: 9 gated modules.
pub static SHIPPER_CATALOG: &[CatalogEntry] = &[
    CatalogEntry { key: "dashboard", label: "Dashboard", route: "/dashboard" },
    CatalogEntry { key: "liveTracker", label: "Live Tracker", route: "/live-tracker" },
    CatalogEntry { key: "loadBoard", label: "Load Board", route: "/loadboard" },
    CatalogEntry { key: "addUser", label: "Add User", route: "/add-user-shipper" },
    CatalogEntry { key: "billing", label: "Billing", route: "/bills" },
    CatalogEntry { key: "consignment", label: "Consignment", route: "/consignment" },
    CatalogEntry { key: "email", label: "Email", route: "/email" },
    CatalogEntry { key: "report", label: "Report", route: "/reports" },
    CatalogEntry { key: "loadCalculator", label: "Load Calculator", route: "/loadcalculator" },
];

/// Trucker portal: all 16 sidebar modules, so the permissions dialog can
/// control each one.
pub static TRUCKER_CATALOG: &[CatalogEntry] = &[
    CatalogEntry { key: "dashboard", label: "Dashboard", route: "/dashboard" },
    CatalogEntry { key: "liveTracker", label: "Live Tracker", route: "/live-tracker" },
    CatalogEntry { key: "addLoad", label: "Add Load", route: "/add-load" },
    CatalogEntry { key: "addUser", label: "Add User", route: "/add-user-trucker" },
    CatalogEntry { key: "addCustomer", label: "Add Customer", route: "/add-customer" },
    CatalogEntry { key: "driver", label: "Driver", route: "/driver" },
    CatalogEntry { key: "fleet", label: "Fleet", route: "/fleet" },
    CatalogEntry { key: "billing", label: "Billing", route: "/billing" },
    CatalogEntry { key: "consignment", label: "Consignment", route: "/consignment" },
    CatalogEntry { key: "bidManagement", label: "Bid Management", route: "/bid-management" },
    CatalogEntry { key: "payments", label: "Payments", route: "/payments" },
    CatalogEntry { key: "yard", label: "Yard", route: "/yard" },
    CatalogEntry { key: "yardDropContainer", label: "Yard Drop Container", route: "/yard-drop-container" },
    CatalogEntry { key: "email", label: "Email", route: "/email" },
    CatalogEntry { key: "report", label: "Report", route: "/reports" },
    CatalogEntry { key: "loadCalculator", label: "Load Calculator", route: "/loadcalculator" },
];

static SHIPPER_KEYS: Lazy<Vec<&'static str>> =
    Lazy::new(|| SHIPPER_CATALOG.iter().map(|e| e.key).collect());
static TRUCKER_KEYS: Lazy<Vec<&'static str>> =
    Lazy::new(|| TRUCKER_CATALOG.iter().map(|e| e.key).collect());

// Labels are shared across portals; trucker-only keys extend the shipper set.
static LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for e in SHIPPER_CATALOG.iter().chain(TRUCKER_CATALOG.iter()) {
        m.insert(e.key, e.label);
    }
    m
});

static SHIPPER_ROUTES: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| SHIPPER_CATALOG.iter().map(|e| (e.key, e.route)).collect());
static TRUCKER_ROUTES: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| TRUCKER_CATALOG.iter().map(|e| (e.key, e.route)).collect());
static SHIPPER_ROUTE_KEYS: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| SHIPPER_CATALOG.iter().map(|e| (e.route, e.key)).collect());
static TRUCKER_ROUTE_KEYS: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| TRUCKER_CATALOG.iter().map(|e| (e.route, e.key)).collect());

fn catalog_for(account_type: &AccountType) -> Result<&'static [CatalogEntry]> {
    match account_type {
        AccountType::Shipper | AccountType::ShipperDriver => Ok(SHIPPER_CATALOG),
        AccountType::Trucker => Ok(TRUCKER_CATALOG),
        AccountType::Other(_) => Err(Error::unknown_account_type(account_type.as_str())),
    }
}

/// Permission keys for the given account type, in declaration order.
/// `ShipperDriver` shares the shipper catalog. Errs for types with no
/// catalog; see [`keys_for_or_empty`] for the degrading variant.
pub fn keys_for(account_type: &AccountType) -> Result<&'static [&'static str]> {
    match account_type {
        AccountType::Shipper | AccountType::ShipperDriver => Ok(SHIPPER_KEYS.as_slice()),
        AccountType::Trucker => Ok(TRUCKER_KEYS.as_slice()),
        AccountType::Other(_) => Err(Error::unknown_account_type(account_type.as_str())),
    }
}

/// Like [`keys_for`] but degrades to an empty key list in release builds.
/// Asking for a catalog-less account type is a caller bug, so it trips an
/// assertion in development and logs in production.
pub fn keys_for_or_empty(account_type: &AccountType) -> &'static [&'static str] {
    match keys_for(account_type) {
        Ok(keys) => keys,
        Err(_) => {
            debug_assert!(false, "no permission catalog for account type '{}'", account_type);
            warn!(target: "drayline::catalog", "no permission catalog for account type '{}'", account_type);
            &[]
        }
    }
}

/// Human label for a permission key; falls back to the raw key for anything
/// undeclared. Never fails.
pub fn label_for(key: &str) -> &str {
    LABELS.get(key).copied().unwrap_or(key)
}

/// Route protected by `key` for the given account type, if mapped.
pub fn route_for(account_type: &AccountType, key: &str) -> Option<&'static str> {
    match account_type {
        AccountType::Shipper | AccountType::ShipperDriver => SHIPPER_ROUTES.get(key).copied(),
        AccountType::Trucker => TRUCKER_ROUTES.get(key).copied(),
        AccountType::Other(_) => None,
    }
}

/// Permission key guarding `route` for the given account type, if mapped.
pub fn permission_key_for(account_type: &AccountType, route: &str) -> Option<&'static str> {
    match account_type {
        AccountType::Shipper | AccountType::ShipperDriver => SHIPPER_ROUTE_KEYS.get(route).copied(),
        AccountType::Trucker => TRUCKER_ROUTE_KEYS.get(route).copied(),
        AccountType::Other(_) => None,
    }
}

/// Catalog entries (key, label, route) for the given account type.
pub fn entries_for(account_type: &AccountType) -> Result<&'static [CatalogEntry]> {
    catalog_for(account_type)
}
