//! Request wrapper: credential injection and global 401 handling.

use crate::error::{ApiError, ApiResult};
use archive_routes::{Navigator, Route};
use archive_storage::{KeyValueStore, StorageKeys};
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Endpoints that establish a session and therefore must not carry one.
const SESSION_EXEMPT_PATHS: [&str; 3] = [
    "/Authentication/authenticate",
    "/Authentication/createSession",
    "/Authentication/register",
];

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Extract the backend's in-band error field, if present.
///
/// The backend sometimes answers 200 with `{"error": "..."}`; callers
/// treat that as a failure.
pub fn error_field(value: &Value) -> Option<String> {
    match value.get("error") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    }
}

/// HTTP client for the ArcHive backend.
#[derive(Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    storage: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Backend origin including the API prefix
    ///   (e.g. `http://127.0.0.1:8080/api`)
    /// * `storage` - Persisted session store; the token is read from here
    ///   on every request
    /// * `navigator` - Sink for the forced login redirect on 401
    pub fn new(
        base_url: impl Into<String>,
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client: reqwest::Client::new(),
            base_url,
            storage,
            navigator,
        }
    }

    /// Backend origin this client targets.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body to a backend path and return the parsed response.
    ///
    /// The session token, when present in storage, is attached as a
    /// bearer header and (outside the session-establishing endpoints)
    /// injected into the body as `sessionToken`. A 401 clears the
    /// persisted session, forces navigation to the login route, and
    /// returns [`ApiError::Unauthorized`].
    pub async fn post(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.send(reqwest::Method::POST, path, Some(body)).await
    }

    /// Issue a request to a backend path.
    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> ApiResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.storage.get(StorageKeys::TOKEN)?;

        let mut request = self.http_client.request(method, &url);

        let mut body = body.unwrap_or_else(|| Value::Object(Default::default()));
        if let Some(ref token) = token {
            request = request.header("Authorization", format!("Bearer {}", token));

            // Dual-transport quirk: several backend routes read the token
            // from the body rather than the header.
            if !SESSION_EXEMPT_PATHS.contains(&path) {
                if let Some(obj) = body.as_object_mut() {
                    obj.insert("sessionToken".to_string(), Value::String(token.clone()));
                }
            }
        }

        tracing::debug!(path, has_token = token.is_some(), "Sending backend request");

        let response = request
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(path)?;
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            tracing::error!(path, status = status.as_u16(), body_summary = %body_summary, "Backend error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: format!("backend error ({body_summary})"),
            });
        }

        let value: Value = response.json().await?;
        Ok(value)
    }

    /// Session invalidation: clear both persisted keys and push the
    /// client to the login route. Not scoped to the failing call.
    fn handle_unauthorized(&self, path: &str) -> ApiResult<()> {
        tracing::warn!(path, "Received 401, clearing session and redirecting to login");
        self.storage.remove(StorageKeys::TOKEN)?;
        self.storage.remove(StorageKeys::USER)?;
        self.navigator.navigate(Route::Login);
        Ok(())
    }
}
