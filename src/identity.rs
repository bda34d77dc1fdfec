//! The authenticated identity owned by the session store.
//!
//! Wire compatibility notes: login responses spell the account-type field
//! `type` while older persisted copies use `userType`; permission values are
//! arbitrary JSON and are evaluated for truthiness the way the portal UI
//! historically did (anything but false/0/""/null counts as granted).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::account::AccountType;
use crate::normalize::normalize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "type", alias = "userType")]
    pub account_type: AccountType,
    #[serde(default, rename = "isSubUser")]
    pub is_sub_user: bool,
    #[serde(default, rename = "subUserId", skip_serializing_if = "Option::is_none")]
    pub sub_user_id: Option<Value>,
    /// Raw (but normalized) permission set; absent until first reconciliation
    /// for accounts that track permissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Value>,
    #[serde(default, rename = "authToken", skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Identity {
    pub fn new(account_type: AccountType) -> Self {
        Self {
            id: None,
            name: None,
            email: None,
            account_type,
            is_sub_user: false,
            sub_user_id: None,
            permissions: None,
            auth_token: None,
        }
    }

    /// True when the permission set is present and holds a truthy value for
    /// `key`. Note this says nothing about whether the identity is gated at
    /// all; that decision belongs to the access guard.
    pub fn has_permission(&self, key: &str) -> bool {
        self.permissions
            .as_ref()
            .and_then(|p| p.get(key))
            .map(is_truthy)
            .unwrap_or(false)
    }

    /// Merge a partial profile payload into this identity. Trucker permission
    /// sets run through the normalizer; everything else overwrites only when
    /// the payload carries it.
    pub fn apply_profile(&mut self, profile: ProfileUpdate) {
        if let Some(perms) = profile.permissions {
            if perms.is_object() {
                self.permissions = Some(normalize(&self.account_type, perms));
            }
        }
        if let Some(sub) = profile.is_sub_user {
            self.is_sub_user = is_truthy(&sub);
        }
        if let Some(id) = profile.sub_user_id {
            self.sub_user_id = Some(id);
        }
        if let Some(name) = profile.display_name {
            self.name = Some(name);
        }
        if let Some(email) = profile.display_email {
            self.email = Some(email);
        }
    }
}

/// Partial profile payload merged into the current identity, as returned by
/// the profile and permission endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub permissions: Option<Value>,
    #[serde(default, rename = "isSubUser")]
    pub is_sub_user: Option<Value>,
    #[serde(default, rename = "subUserId")]
    pub sub_user_id: Option<Value>,
    #[serde(default, rename = "displayName", alias = "name")]
    pub display_name: Option<String>,
    #[serde(default, rename = "displayEmail", alias = "email")]
    pub display_email: Option<String>,
}

/// JS-style truthiness, matching how the portal UI evaluates permission
/// values off the wire.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
