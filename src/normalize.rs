//! Permission-set normalization.
//!
//! The backend historically reported the trucker load-board module under the
//! shipper-era key `loadBoard`; current payloads use `addLoad`. All aliasing
//! is resolved here, in one pure function, so call sites never re-implement
//! the fallback. The input is a raw `serde_json::Value` because the server
//! payload is heterogeneous: anything that is not a JSON object passes
//! through untouched.

use serde_json::Value;

use crate::account::AccountType;

/// Canonical key for the trucker load-board module.
pub const ADD_LOAD: &str = "addLoad";
/// Legacy alias still emitted by older backend versions.
pub const LOAD_BOARD: &str = "loadBoard";

/// Produce a canonical permission set from a raw server payload.
///
/// For trucker accounts, `addLoad` takes the server value when present;
/// otherwise it falls back to the legacy `loadBoard` value; otherwise it
/// stays absent. An explicit `addLoad: false` is preserved — the fallback
/// fires only on absence (or JSON null, which the wire treats as absent).
/// Every other key, and every other account type, passes through unchanged.
///
/// Idempotent: once `addLoad` is resolved the fallback can never fire again.
pub fn normalize(account_type: &AccountType, raw: Value) -> Value {
    if !matches!(account_type, AccountType::Trucker) {
        return raw;
    }
    match raw {
        Value::Object(mut map) => {
            let add_load_missing = matches!(map.get(ADD_LOAD), None | Some(Value::Null));
            if add_load_missing {
                match map.get(LOAD_BOARD) {
                    None | Some(Value::Null) => {}
                    Some(v) => {
                        let v = v.clone();
                        map.insert(ADD_LOAD.to_string(), v);
                    }
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}
