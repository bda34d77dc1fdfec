//! HTTP client for the portal backend.
//!
//! Thin reqwest wrapper: a base URL, bearer-token headers, JSON bodies.
//! The permission/profile endpoints return loosely-shaped envelopes that are
//! decoded into [`ProfileUpdate`] here, so the session layer only deals in
//! one merge shape. Sub-user and yard CRUD live in their own submodules.

mod subusers;
mod yards;

pub use subusers::{NewSubUser, SubUser, SubUserUpdate};

use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::identity::ProfileUpdate;

/// Endpoint namespace shared by permission, profile, and sub-user calls.
const SHIPPER_DRIVER_BASE: &str = "/api/v1/shipper_driver";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| Error::network(e.to_string()))?;
        Ok(Self { base_url })
    }

    /// Honors `DRAYLINE_API_URL`, falling back to the local dev backend.
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var("DRAYLINE_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        Self::new(&raw)
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self { base: config.base_url, client: reqwest::Client::new() }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(|e| Error::network(e.to_string()))
    }

    /// `GET /api/v1/shipper_driver/my-permissions`.
    ///
    /// Returns `Ok(Some(update))` when the backend reports success with a
    /// permission object, `Ok(None)` for any other well-formed answer (the
    /// caller treats that as "nothing to merge"), and `Err` only for
    /// transport failures.
    pub async fn my_permissions(&self, token: &str) -> Result<Option<ProfileUpdate>> {
        let url = self.join(&format!("{}/my-permissions", SHIPPER_DRIVER_BASE))?;
        let resp = self.client.get(url).bearer_auth(token).send().await?;
        if !resp.status().is_success() {
            debug!(target: "drayline::api", "my-permissions: HTTP {}", resp.status());
            return Ok(None);
        }
        let body: Value = resp.json().await?;
        Ok(permissions_update(&body, &body))
    }

    /// `GET /api/v1/shipper_driver/trucker` — authoritative trucker profile.
    ///
    /// The envelope nests the profile under `data` but older backends put
    /// the same fields at the top level; per-field, `data` wins. Returns
    /// `Ok(None)` when no usable permission data came back, which tells the
    /// caller to fall back to the generic permissions endpoint.
    pub async fn trucker_profile(&self, token: &str) -> Result<Option<ProfileUpdate>> {
        let url = self.join(&format!("{}/trucker", SHIPPER_DRIVER_BASE))?;
        let resp = self.client.get(url).bearer_auth(token).send().await?;
        if !resp.status().is_success() {
            debug!(target: "drayline::api", "trucker profile: HTTP {}", resp.status());
            return Ok(None);
        }
        let body: Value = resp.json().await?;
        let data = body.get("data").filter(|d| d.is_object()).unwrap_or(&body);
        Ok(permissions_update(data, &body))
    }

    pub(crate) async fn get_json(&self, path: &str, token: &str) -> Result<Value> {
        let url = self.join(path)?;
        let resp = self.client.get(url).bearer_auth(token).send().await?;
        Ok(resp.json().await?)
    }

    pub(crate) async fn post_json(&self, path: &str, token: &str, body: &Value) -> Result<Value> {
        let url = self.join(path)?;
        let resp = self.client.post(url).bearer_auth(token).json(body).send().await?;
        Ok(resp.json().await?)
    }

    pub(crate) async fn put_json(&self, path: &str, token: &str, body: &Value) -> Result<Value> {
        let url = self.join(path)?;
        let resp = self.client.put(url).bearer_auth(token).json(body).send().await?;
        Ok(resp.json().await?)
    }

    pub(crate) async fn delete_json(&self, path: &str, token: &str) -> Result<Value> {
        let url = self.join(path)?;
        let resp = self.client.delete(url).bearer_auth(token).send().await?;
        Ok(resp.json().await?)
    }
}

/// Extract a profile merge from a permissions-bearing envelope. `primary`
/// holds the fields of record; `fallback` fills per-field gaps (the trucker
/// envelope's top level). Yields `None` unless `success` is true and a
/// permission object is present.
fn permissions_update(primary: &Value, fallback: &Value) -> Option<ProfileUpdate> {
    let success = fallback.get("success").and_then(Value::as_bool).unwrap_or(false);
    if !success {
        return None;
    }
    let field = |name: &str| -> Option<Value> {
        match primary.get(name) {
            Some(Value::Null) | None => fallback.get(name).filter(|v| !v.is_null()).cloned(),
            Some(v) => Some(v.clone()),
        }
    };
    let permissions = field("permissions").filter(Value::is_object)?;
    Some(ProfileUpdate {
        permissions: Some(permissions),
        // Always carried: a missing flag downgrades to "not a sub-user".
        is_sub_user: Some(field("isSubUser").unwrap_or(Value::Null)),
        sub_user_id: field("subUserId"),
        display_name: field("displayName")
            .or_else(|| field("name"))
            .and_then(|v| v.as_str().map(str::to_string)),
        display_email: field("displayEmail")
            .or_else(|| field("email"))
            .and_then(|v| v.as_str().map(str::to_string)),
    })
}

/// Shared envelope check for CRUD calls: `success:false` becomes a
/// [`Error::ServerRejection`] carrying the backend's message.
pub(crate) fn expect_success(body: Value, default_msg: &str) -> Result<Value> {
    let success = body.get("success").and_then(Value::as_bool).unwrap_or(false);
    if success {
        Ok(body)
    } else {
        let msg = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(default_msg)
            .to_string();
        Err(Error::rejected(msg))
    }
}
