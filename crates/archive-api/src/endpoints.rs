//! Typed methods for the backend RPC surface.
//!
//! The authentication endpoints return the raw response value because
//! the user payload shape varies across backend versions; the session
//! store normalizes it. The tracking endpoints deserialize into the
//! wire types.

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::types::{ArcDetail, ProgressEntry};
use serde_json::{json, Value};

impl ApiClient {
    // --- Authentication ---

    /// Verify credentials. The response carries either a user payload or
    /// an in-band `error` field.
    pub async fn authenticate(&self, username: &str, password: &str) -> ApiResult<Value> {
        self.post(
            "/Authentication/authenticate",
            json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Create a new account. Same response contract as `authenticate`.
    pub async fn register(&self, username: &str, password: &str) -> ApiResult<Value> {
        self.post(
            "/Authentication/register",
            json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Mint a session token for a verified user.
    pub async fn create_session(&self, user: &str) -> ApiResult<Value> {
        self.post("/Authentication/createSession", json!({ "user": user }))
            .await
    }

    /// Invalidate the current session token server-side. The token
    /// itself travels in the body via the wrapper's injection.
    pub async fn invalidate_session(&self) -> ApiResult<()> {
        self.post("/Authentication/invalidateSession", json!({}))
            .await?;
        Ok(())
    }

    // --- Friending ---

    /// Provision a friend code for a user.
    pub async fn generate_friend_code(&self, user: &str) -> ApiResult<Option<String>> {
        let response = self
            .post("/Friending/generateFriendCode", json!({ "user": user }))
            .await?;
        Ok(string_field(&response, "friendCode"))
    }

    /// Look up a user's friend code.
    pub async fn get_friend_code_by_username(&self, username: &str) -> ApiResult<Option<String>> {
        let response = self
            .post(
                "/Friending/getFriendCodeByUsername",
                json!({ "username": username }),
            )
            .await?;
        Ok(string_field(&response, "friendCode"))
    }

    // --- ArcTracking ---

    /// Ids of every arc the user belongs to. An absent list is empty.
    pub async fn get_arcs(&self, user: &str) -> ApiResult<Vec<String>> {
        let response = self
            .post("/ArcTracking/getArcs", json!({ "user": user }))
            .await?;

        let arcs = response
            .get("arcs")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Ok(arcs)
    }

    /// Full detail for one arc, or `None` if the backend has no record.
    pub async fn get_arc(&self, arc: &str) -> ApiResult<Option<ArcDetail>> {
        let response = self
            .post("/ArcTracking/getArc", json!({ "arc": arc }))
            .await?;

        match response.get("arc") {
            Some(Value::Null) | None => Ok(None),
            Some(detail) => Ok(Some(serde_json::from_value(detail.clone())?)),
        }
    }

    /// Per-member daily progress flags for an arc.
    pub async fn get_arc_status(&self, arc: &str) -> ApiResult<Vec<ProgressEntry>> {
        let response = self
            .post("/ArcTracking/getArcStatus", json!({ "arc": arc }))
            .await?;

        match response.get("status") {
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(status) => Ok(serde_json::from_value(status.clone())?),
        }
    }

    /// Advance or reset the arc's streak. The backend also resets every
    /// member's daily-progress flag as a side effect. Returns the new
    /// streak value.
    pub async fn update_arc_streak(&self, arc: &str) -> ApiResult<i64> {
        let response = self
            .post("/ArcTracking/updateArcStreak", json!({ "arc": arc }))
            .await?;
        Ok(response
            .get("newStreak")
            .and_then(Value::as_i64)
            .unwrap_or(0))
    }

    // --- StatTracking ---

    /// Credit a completed daily task against a stat.
    pub async fn update_stat_completed(&self, user: &str, stat: &str, delta: i64) -> ApiResult<()> {
        self.post(
            "/StatTracking/updateStatWithCompletedTask",
            json!({ "user": user, "stat": stat, "delta": delta }),
        )
        .await?;
        Ok(())
    }

    /// Debit a missed daily task against a stat.
    pub async fn update_stat_incomplete(
        &self,
        user: &str,
        stat: &str,
        delta: i64,
    ) -> ApiResult<()> {
        self.post(
            "/StatTracking/updateStatWithIncompleteTask",
            json!({ "user": user, "stat": stat, "delta": delta }),
        )
        .await?;
        Ok(())
    }

    /// Create the user's stat records. Called once after registration.
    pub async fn initialize_stats(&self, user: &str) -> ApiResult<()> {
        self.post("/StatTracking/initializeStats", json!({ "user": user }))
            .await?;
        Ok(())
    }

    // --- Rewarding ---

    /// Award points for an extended streak.
    pub async fn earn_points(&self, user: &str, points: i64) -> ApiResult<()> {
        self.post(
            "/Rewarding/earnPoints",
            json!({ "user": user, "points": points }),
        )
        .await?;
        Ok(())
    }

    /// Create the user's rewards record. Called once after registration.
    pub async fn initialize_rewards(&self, user: &str) -> ApiResult<()> {
        self.post("/Rewarding/initializeRewards", json!({ "user": user }))
            .await?;
        Ok(())
    }
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
}
