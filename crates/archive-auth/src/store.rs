//! The session/auth state machine.

use crate::error::{AuthError, AuthResult};
use crate::user::UserIdentity;
use archive_api::{error_field, ApiClient};
use archive_storage::{KeyValueStore, StorageKeys};
use serde_json::Value;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Delay before the friend-code lookup for a freshly registered user,
/// giving the backend's asynchronous account initialization time to
/// finish. Best-effort race tolerance, not a guarantee.
const REGISTRATION_FRIEND_CODE_DELAY: Duration = Duration::from_millis(500);

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Anonymous,
    Authenticating,
    Authenticated,
}

#[derive(Debug)]
struct Inner {
    phase: AuthPhase,
    user: Option<UserIdentity>,
    token: Option<String>,
}

/// Owner of the current user and session token.
///
/// All mutating steps write through to storage immediately after the
/// in-memory change, so memory and storage agree at every observable
/// point. The state lock is never held across an await.
#[derive(Clone)]
pub struct AuthStore {
    api: ApiClient,
    storage: Arc<dyn KeyValueStore>,
    state: Arc<RwLock<Inner>>,
}

impl AuthStore {
    pub fn new(api: ApiClient, storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            api,
            storage,
            state: Arc::new(RwLock::new(Inner {
                phase: AuthPhase::Anonymous,
                user: None,
                token: None,
            })),
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> AuthPhase {
        self.state.read().expect("state lock poisoned").phase
    }

    /// Whether a user and token are both present.
    pub fn is_authenticated(&self) -> bool {
        let inner = self.state.read().expect("state lock poisoned");
        inner.user.is_some() && inner.token.is_some()
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<UserIdentity> {
        self.state.read().expect("state lock poisoned").user.clone()
    }

    /// Sign in with username and password.
    ///
    /// Sequence: authenticate, normalize the user shape, create a
    /// session, persist token and user, then best-effort friend-code
    /// population. A friend-code failure does not fail the login.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<()> {
        self.set_phase(AuthPhase::Authenticating);

        let result = self.login_sequence(username, password).await;
        if result.is_err() {
            self.set_phase(AuthPhase::Anonymous);
        }
        result
    }

    async fn login_sequence(&self, username: &str, password: &str) -> AuthResult<()> {
        let response = self.api.authenticate(username, password).await?;
        let user = self.establish_session(&response).await?;

        if user.friend_code.is_none() {
            self.populate_friend_code(&user).await;
        }

        info!(username = %user.username, "Login complete");
        Ok(())
    }

    /// Create a new account and sign in.
    ///
    /// Mirrors `login`, plus fire-and-forget initialization of the
    /// user's stats and rewards records. The friend-code lookup is
    /// deferred so backend-side account initialization can complete.
    pub async fn register(&self, username: &str, password: &str) -> AuthResult<()> {
        self.set_phase(AuthPhase::Authenticating);

        let result = self.register_sequence(username, password).await;
        if result.is_err() {
            self.set_phase(AuthPhase::Anonymous);
        }
        result
    }

    async fn register_sequence(&self, username: &str, password: &str) -> AuthResult<()> {
        let response = self.api.register(username, password).await?;
        let user = self.establish_session(&response).await?;

        // Best-effort backend record initialization; failures are logged
        // and the registration still succeeds.
        let api = self.api.clone();
        let key = user.backend_key().to_string();
        tokio::spawn(async move {
            if let Err(e) = api.initialize_stats(&key).await {
                warn!(user = %key, error = %e, "Failed to initialize stats");
            }
            if let Err(e) = api.initialize_rewards(&key).await {
                warn!(user = %key, error = %e, "Failed to initialize rewards");
            }
        });

        if user.friend_code.is_none() {
            let store = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(REGISTRATION_FRIEND_CODE_DELAY).await;
                store.populate_friend_code(&user).await;
            });
        }

        info!(username, "Registration complete");
        Ok(())
    }

    /// Shared tail of login/register: interpret the auth response,
    /// create a session, and persist it before any further call so the
    /// rest of the sequence carries the new credential.
    async fn establish_session(&self, response: &Value) -> AuthResult<UserIdentity> {
        if let Some(message) = error_field(response) {
            return Err(AuthError::Backend(message));
        }

        let user = UserIdentity::from_response(response).ok_or(AuthError::InvalidUser)?;

        let session = self
            .api
            .create_session(&user.id)
            .await
            .map_err(|_| AuthError::SessionCreation)?;
        if error_field(&session).is_some() {
            return Err(AuthError::SessionCreation);
        }
        let token = session
            .get("token")
            .and_then(Value::as_str)
            .ok_or(AuthError::SessionCreation)?
            .to_string();

        self.commit_session(user.clone(), token)?;
        Ok(user)
    }

    /// Write the new session to memory and storage together.
    fn commit_session(&self, user: UserIdentity, token: String) -> AuthResult<()> {
        let encoded = serde_json::to_string(&user)
            .map_err(|e| AuthError::Backend(format!("failed to encode user: {e}")))?;

        {
            let mut inner = self.state.write().expect("state lock poisoned");
            inner.phase = AuthPhase::Authenticated;
            inner.user = Some(user);
            inner.token = Some(token.clone());
        }
        self.storage.set(StorageKeys::TOKEN, &token)?;
        self.storage.set(StorageKeys::USER, &encoded)?;
        Ok(())
    }

    /// Best-effort friend-code population. The code is fetched at most
    /// once per user and persisted back to storage; any failure here is
    /// logged and swallowed.
    async fn populate_friend_code(&self, user: &UserIdentity) {
        let code = match self.api.get_friend_code_by_username(&user.username).await {
            Ok(Some(code)) => Some(code),
            // No code provisioned yet; ask the backend to mint one.
            Ok(None) => match self.api.generate_friend_code(user.backend_key()).await {
                Ok(code) => code,
                Err(e) => {
                    warn!(username = %user.username, error = %e, "Friend-code generation failed");
                    None
                }
            },
            Err(e) => {
                warn!(username = %user.username, error = %e, "Friend-code lookup failed");
                None
            }
        };

        let Some(code) = code else { return };

        let updated = {
            let mut inner = self.state.write().expect("state lock poisoned");
            match inner.user.as_mut() {
                Some(current) if current.username == user.username => {
                    current.friend_code = Some(code);
                    Some(current.clone())
                }
                // Session changed underneath the best-effort task.
                _ => None,
            }
        };

        if let Some(updated) = updated {
            match serde_json::to_string(&updated) {
                Ok(encoded) => {
                    if let Err(e) = self.storage.set(StorageKeys::USER, &encoded) {
                        warn!(error = %e, "Failed to persist friend code");
                    }
                }
                Err(e) => warn!(error = %e, "Failed to encode user with friend code"),
            }
            debug!(username = %updated.username, "Friend code populated");
        }
    }

    /// Sign out. The remote invalidation is attempted first; local
    /// state is cleared even when it fails.
    pub async fn logout(&self) -> AuthResult<()> {
        if let Err(e) = self.api.invalidate_session().await {
            warn!(error = %e, "Remote session invalidation failed, clearing local state anyway");
        }

        {
            let mut inner = self.state.write().expect("state lock poisoned");
            inner.phase = AuthPhase::Anonymous;
            inner.user = None;
            inner.token = None;
        }
        self.storage.remove(StorageKeys::TOKEN)?;
        self.storage.remove(StorageKeys::USER)?;

        info!("Logged out");
        Ok(())
    }

    /// Restore a persisted session. Run once at startup.
    ///
    /// A parse failure clears storage and leaves the store anonymous;
    /// partially restored state is never kept.
    pub fn restore_from_storage(&self) -> AuthResult<()> {
        let stored_user = self.storage.get(StorageKeys::USER)?;
        let stored_token = self.storage.get(StorageKeys::TOKEN)?;

        let (Some(raw_user), Some(token)) = (stored_user, stored_token) else {
            debug!("No persisted session");
            return Ok(());
        };

        match UserIdentity::from_stored(&raw_user) {
            Some(user) => {
                let mut inner = self.state.write().expect("state lock poisoned");
                inner.phase = AuthPhase::Authenticated;
                inner.user = Some(user);
                inner.token = Some(token);
                info!("Session restored from storage");
            }
            None => {
                warn!("Persisted user is unreadable, clearing session");
                self.storage.remove(StorageKeys::USER)?;
                self.storage.remove(StorageKeys::TOKEN)?;
            }
        }
        Ok(())
    }

    fn set_phase(&self, phase: AuthPhase) {
        self.state.write().expect("state lock poisoned").phase = phase;
    }
}
