//! Identity providers for RedBlue.
//!
//! The credential store never talks to these. The application watches the
//! current session and only exposes the store while one is present.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use crate::types::errors::AuthError;
use crate::types::identity::{AuthUser, Session};

/// Trait defining identity operations consumed by the application.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Signs in with email and password, publishing the new session.
    async fn sign_in(&self, email: &str, secret: &str) -> Result<Session, AuthError>;

    /// Registers a new account. Does not sign in.
    async fn sign_up(&self, email: &str, secret: &str) -> Result<(), AuthError>;

    /// Ends the current session, if any.
    async fn sign_out(&self);

    fn current_session(&self) -> Option<Session>;

    /// Receiver notified on every session change.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}

fn require_credentials(email: &str, secret: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() || secret.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(())
}

/// Identity provider keeping accounts in process memory.
///
/// Used when no hosted provider is configured and in tests.
pub struct InMemoryIdentity {
    accounts: Mutex<HashMap<String, (String, String)>>,
    session: watch::Sender<Option<Session>>,
}

impl Default for InMemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self { accounts: Mutex::new(HashMap::new()), session }
    }

    fn accounts(&self) -> std::sync::MutexGuard<'_, HashMap<String, (String, String)>> {
        self.accounts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentity {
    async fn sign_in(&self, email: &str, secret: &str) -> Result<Session, AuthError> {
        require_credentials(email, secret)?;
        let user_id = match self.accounts().get(email) {
            Some((user_id, stored)) if stored == secret => user_id.clone(),
            _ => return Err(AuthError::Rejected("Invalid login credentials".to_string())),
        };

        let session = Session {
            access_token: Uuid::new_v4().to_string(),
            refresh_token: None,
            expires_at: None,
            user: AuthUser { id: user_id, email: Some(email.to_string()) },
        };
        self.session.send_replace(Some(session.clone()));
        info!(email, "signed in");
        Ok(session)
    }

    async fn sign_up(&self, email: &str, secret: &str) -> Result<(), AuthError> {
        require_credentials(email, secret)?;
        let mut accounts = self.accounts();
        if accounts.contains_key(email) {
            return Err(AuthError::Rejected("User already registered".to_string()));
        }
        accounts.insert(email.to_string(), (Uuid::new_v4().to_string(), secret.to_string()));
        Ok(())
    }

    async fn sign_out(&self) {
        self.session.send_replace(None);
    }

    fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}

#[cfg(feature = "supabase")]
pub use supabase::SupabaseIdentity;

#[cfg(feature = "supabase")]
mod supabase {
    use std::time::{SystemTime, UNIX_EPOCH};

    use async_trait::async_trait;
    use reqwest::Client;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use tokio::sync::watch;
    use tracing::{info, warn};

    use super::{require_credentials, IdentityProvider};
    use crate::types::errors::AuthError;
    use crate::types::identity::{AuthUser, Session};

    #[derive(Debug, Deserialize)]
    struct TokenResponse {
        access_token: String,
        #[serde(default)]
        refresh_token: Option<String>,
        #[serde(default)]
        expires_at: Option<i64>,
        #[serde(default)]
        expires_in: Option<i64>,
        user: AuthUser,
    }

    /// Identity provider backed by a hosted Supabase project's auth endpoints.
    pub struct SupabaseIdentity {
        base_url: String,
        anon_key: String,
        client: Client,
        session: watch::Sender<Option<Session>>,
    }

    impl SupabaseIdentity {
        pub fn new(base_url: &str, anon_key: &str) -> Self {
            let (session, _) = watch::channel(None);
            Self {
                base_url: base_url.trim_end_matches('/').to_string(),
                anon_key: anon_key.to_string(),
                client: Client::new(),
                session,
            }
        }

        fn url(&self, path: &str) -> String {
            format!("{}/auth/v1/{}", self.base_url, path)
        }

        async fn post(
            &self,
            path: &str,
            body: Value,
            bearer: Option<&str>,
        ) -> Result<String, AuthError> {
            let mut request = self
                .client
                .post(self.url(path))
                .header("apikey", &self.anon_key)
                .json(&body);
            if let Some(token) = bearer {
                request = request.bearer_auth(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| AuthError::NetworkError(e.to_string()))?;
            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| AuthError::NetworkError(e.to_string()))?;

            if !status.is_success() {
                return Err(AuthError::Rejected(provider_message(&text, status.as_u16())));
            }
            Ok(text)
        }
    }

    /// Pulls the human-readable message out of an auth error body.
    pub(super) fn provider_message(body: &str, status: u16) -> String {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        parsed
            .as_ref()
            .and_then(|v| {
                ["error_description", "msg", "message", "error"]
                    .iter()
                    .find_map(|field| v.get(*field).and_then(|m| m.as_str()))
            })
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("Auth request failed with HTTP {}", status))
    }

    #[async_trait]
    impl IdentityProvider for SupabaseIdentity {
        async fn sign_in(&self, email: &str, secret: &str) -> Result<Session, AuthError> {
            require_credentials(email, secret)?;
            let body = json!({ "email": email, "password": secret });
            let text = self.post("token?grant_type=password", body, None).await?;
            let token: TokenResponse = serde_json::from_str(&text)
                .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

            let expires_at = token.expires_at.or_else(|| {
                token.expires_in.map(|secs| {
                    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
                    now.as_secs() as i64 + secs
                })
            });
            let session = Session {
                access_token: token.access_token,
                refresh_token: token.refresh_token,
                expires_at,
                user: token.user,
            };
            self.session.send_replace(Some(session.clone()));
            info!(user = %session.user.id, "signed in");
            Ok(session)
        }

        async fn sign_up(&self, email: &str, secret: &str) -> Result<(), AuthError> {
            require_credentials(email, secret)?;
            let body = json!({ "email": email, "password": secret });
            self.post("signup", body, None).await?;
            Ok(())
        }

        async fn sign_out(&self) {
            let token = self.session.borrow().as_ref().map(|s| s.access_token.clone());
            if let Some(token) = token {
                if let Err(e) = self.post("logout", json!({}), Some(&token)).await {
                    warn!("remote sign-out failed, clearing local session anyway: {}", e);
                }
            }
            self.session.send_replace(None);
        }

        fn current_session(&self) -> Option<Session> {
            self.session.borrow().clone()
        }

        fn subscribe(&self) -> watch::Receiver<Option<Session>> {
            self.session.subscribe()
        }
    }
}
