//! Navigation gating.
//!
//! `can_enter` is a pure function of the route directive and the current
//! session state; it holds no cache and must be re-evaluated on every
//! navigation attempt, since the identity's permission set can change under
//! it (a permission refresh, a logout). First matching rule wins.

use serde::{Deserialize, Serialize};

use crate::account::AccountType;
use crate::session::SessionState;

/// What a navigable destination requires. Both fields optional; an empty
/// directive only requires an authenticated session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteDirective {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_account_type: Option<AccountType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_permission: Option<String>,
}

impl RouteDirective {
    pub fn account_type(at: AccountType) -> Self {
        Self { required_account_type: Some(at), ..Default::default() }
    }

    pub fn permission<S: Into<String>>(key: S) -> Self {
        Self { required_permission: Some(key.into()), ..Default::default() }
    }

    pub fn with_permission<S: Into<String>>(mut self, key: S) -> Self {
        self.required_permission = Some(key.into());
        self
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Session still resolving; render a neutral waiting state, decide later.
    Wait,
    Allow,
    RedirectLogin,
    RedirectHome,
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allow)
    }
}

/// Decide whether the current session may enter a destination.
///
/// Order: unresolved session → [`Access::Wait`]; anonymous →
/// [`Access::RedirectLogin`]; account-type mismatch →
/// [`Access::RedirectHome`]; then, for shipper/trucker sub-users with a
/// permission set present, a non-truthy required key →
/// [`Access::RedirectHome`]. Primary account holders are never
/// permission-gated, even when a permission set happens to be present.
pub fn can_enter(directive: &RouteDirective, state: &SessionState) -> Access {
    let identity = match state {
        SessionState::Uninitialized | SessionState::Loading => return Access::Wait,
        SessionState::Anonymous => return Access::RedirectLogin,
        SessionState::Authenticated(identity) => identity,
    };

    if let Some(required) = &directive.required_account_type {
        if *required != identity.account_type {
            return Access::RedirectHome;
        }
    }

    if let Some(key) = &directive.required_permission {
        if identity.account_type.gates_sub_users()
            && identity.is_sub_user
            && identity.permissions.is_some()
            && !identity.has_permission(key)
        {
            return Access::RedirectHome;
        }
    }

    Access::Allow
}
