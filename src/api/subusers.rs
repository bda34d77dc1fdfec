//! Sub-user CRUD against `/api/v1/shipper_driver/my-sub-users`.
//!
//! These calls are consumed by the management screens; unlike the session
//! reconciliation paths, a backend rejection here is surfaced to the caller
//! so the UI can show it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{expect_success, ApiClient, SHIPPER_DRIVER_BASE};
use crate::error::{Error, Result};

fn base_path() -> String {
    format!("{}/my-sub-users", SHIPPER_DRIVER_BASE)
}

/// A sub-user row as listed by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubUser {
    #[serde(rename = "subUserId")]
    pub sub_user_id: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub permissions: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSubUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub permissions: Value,
}

/// Partial update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SubUserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Value>,
}

impl ApiClient {
    /// `GET my-sub-users`.
    pub async fn list_sub_users(&self, token: &str) -> Result<Vec<SubUser>> {
        let body = self.get_json(&base_path(), token).await?;
        let body = expect_success(body, "Failed to fetch sub-users")?;
        let rows = body
            .get("subUsers")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| Error::rejected("Failed to fetch sub-users"))?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(|e| Error::rejected(e.to_string())))
            .collect()
    }

    /// `POST my-sub-users`.
    pub async fn create_sub_user(&self, token: &str, new: &NewSubUser) -> Result<()> {
        let body = serde_json::to_value(new).map_err(|e| Error::rejected(e.to_string()))?;
        let resp = self.post_json(&base_path(), token, &body).await?;
        expect_success(resp, "Failed to create sub-user")?;
        Ok(())
    }

    /// `PUT my-sub-users/{id}`.
    pub async fn update_sub_user(
        &self,
        token: &str,
        sub_user_id: &str,
        update: &SubUserUpdate,
    ) -> Result<()> {
        let body = serde_json::to_value(update).map_err(|e| Error::rejected(e.to_string()))?;
        let path = format!("{}/{}", base_path(), sub_user_id);
        let resp = self.put_json(&path, token, &body).await?;
        expect_success(resp, "Failed to update sub-user")?;
        Ok(())
    }

    /// `DELETE my-sub-users/{id}`.
    pub async fn delete_sub_user(&self, token: &str, sub_user_id: &str) -> Result<()> {
        let path = format!("{}/{}", base_path(), sub_user_id);
        let resp = self.delete_json(&path, token).await?;
        expect_success(resp, "Failed to remove sub-user")?;
        Ok(())
    }
}
