//! Yard CRUD against `/api/v1/yard`.
//!
//! Yard records are domain payloads the core does not interpret; they stay
//! as raw JSON and rejections are surfaced to the calling screen.

use serde_json::Value;

use super::{expect_success, ApiClient};
use crate::error::{Error, Result};

const YARD_BASE: &str = "/api/v1/yard";

impl ApiClient {
    /// `GET /api/v1/yard/by-trucker?truckerId={id}`.
    pub async fn list_yards(&self, token: &str, trucker_id: &str) -> Result<Vec<Value>> {
        let path = format!("{}/by-trucker?truckerId={}", YARD_BASE, trucker_id);
        let body = self.get_json(&path, token).await?;
        let body = expect_success(body, "Failed to fetch yards")?;
        body.get("data")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| Error::rejected("Failed to fetch yards"))
    }

    /// `POST /api/v1/yard`.
    pub async fn create_yard(&self, token: &str, yard: &Value) -> Result<Value> {
        let resp = self.post_json(YARD_BASE, token, yard).await?;
        expect_success(resp, "Failed to create yard")
    }

    /// `PUT /api/v1/yard/{id}`.
    pub async fn update_yard(&self, token: &str, yard_id: &str, yard: &Value) -> Result<Value> {
        let path = format!("{}/{}", YARD_BASE, yard_id);
        let resp = self.put_json(&path, token, yard).await?;
        expect_success(resp, "Failed to update yard")
    }

    /// `DELETE /api/v1/yard/{id}`.
    pub async fn delete_yard(&self, token: &str, yard_id: &str) -> Result<()> {
        let path = format!("{}/{}", YARD_BASE, yard_id);
        let resp = self.delete_json(&path, token).await?;
        expect_success(resp, "Failed to delete yard")?;
        Ok(())
    }
}
