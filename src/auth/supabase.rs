// SPDX-License-Identifier: MPL-2.0
//! Identity service backed by a Supabase (GoTrue) auth endpoint.
//!
//! The access token is kept in memory only; a restart starts signed out.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::error::AuthError;
use super::provider::{AuthProvider, EVENT_CAPACITY};
use super::session::{AuthEvent, Credentials, Session, SignUpRequest};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserPayload,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    full_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug)]
struct ActiveToken {
    access_token: String,
    session: Session,
}

pub struct SupabaseAuthProvider {
    client: Client,
    base_url: String,
    anon_key: String,
    active: Mutex<Option<ActiveToken>>,
    events: broadcast::Sender<AuthEvent>,
}

impl SupabaseAuthProvider {
    /// `base_url` is the project URL, e.g. `https://xyz.supabase.co`.
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, anon_key)
    }

    /// Uses a preconfigured client (timeouts, proxy settings).
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            active: Mutex::new(None),
            events,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveToken>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn activate(&self, token: TokenResponse) -> Session {
        let session = session_from_user(token.user);
        *self.lock() = Some(ActiveToken {
            access_token: token.access_token,
            session: session.clone(),
        });
        let _ = self.events.send(AuthEvent::SignedIn(session.clone()));
        session
    }

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<(StatusCode, String), AuthError> {
        let url = self.endpoint(path);
        debug!("POST {url}");
        let response = self
            .client
            .post(url.as_str())
            .header("apikey", self.anon_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        Ok((status, text))
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthProvider {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password,
        });
        let (status, text) = self.post("token?grant_type=password", body).await?;
        if !status.is_success() {
            return Err(classify_error(status, &text));
        }
        let token: TokenResponse = serde_json::from_str(&text)
            .map_err(|e| AuthError::UnexpectedResponse(e.to_string()))?;
        Ok(self.activate(token))
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<Session, AuthError> {
        let body = json!({
            "email": request.email,
            "password": request.password,
            "data": { "full_name": request.display_name },
        });
        let (status, text) = self.post("signup", body).await?;
        if !status.is_success() {
            return Err(classify_error(status, &text));
        }
        let token = parse_signup(&text)?;
        Ok(self.activate(token))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(active) = self.lock().take() else {
            return Ok(());
        };
        let _ = self.events.send(AuthEvent::SignedOut);

        let response = self
            .client
            .post(self.endpoint("logout"))
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(&active.access_token)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let status = response.status();
        // An expired token is already signed out as far as the server cares.
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            warn!("logout for {} returned {status}", active.session.user_id);
            Err(classify_error(status, &text))
        }
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.lock().as_ref().map(|active| active.session.clone()))
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

fn session_from_user(user: UserPayload) -> Session {
    Session {
        user_id: user.id,
        email: user.email.unwrap_or_default(),
        display_name: user
            .user_metadata
            .full_name
            .filter(|name| !name.trim().is_empty()),
    }
}

/// A sign-up body either carries a session, or just the new user when the
/// project requires email confirmation.
fn parse_signup(text: &str) -> Result<TokenResponse, AuthError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| AuthError::UnexpectedResponse(e.to_string()))?;
    if value.get("access_token").is_none() {
        return if value.get("id").is_some() {
            Err(AuthError::EmailConfirmationRequired)
        } else {
            Err(AuthError::UnexpectedResponse(text.to_string()))
        };
    }
    serde_json::from_value(value).map_err(|e| AuthError::UnexpectedResponse(e.to_string()))
}

fn classify_error(status: StatusCode, body: &str) -> AuthError {
    let payload: ErrorPayload = serde_json::from_str(body).unwrap_or_default();
    let code = payload
        .error_code
        .as_deref()
        .or(payload.error.as_deref())
        .unwrap_or_default();
    let message = payload
        .error_description
        .or(payload.msg)
        .or(payload.message)
        .unwrap_or_else(|| status.to_string());

    match code {
        "invalid_grant" | "invalid_credentials" => AuthError::InvalidCredentials,
        "user_already_exists" | "email_exists" => AuthError::AccountExists,
        "email_not_confirmed" => AuthError::EmailConfirmationRequired,
        _ if message.contains("already registered") => AuthError::AccountExists,
        _ => AuthError::Rejected(message),
    }
}
