// SPDX-License-Identifier: MPL-2.0
//! In-process identity service for offline runs and tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use super::error::AuthError;
use super::provider::{AuthProvider, EVENT_CAPACITY};
use super::session::{AuthEvent, Credentials, Session, SignUpRequest};

/// Number of calls each operation has received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub sign_in: usize,
    pub sign_up: usize,
    pub sign_out: usize,
    pub current_session: usize,
}

impl CallCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.sign_in + self.sign_up + self.sign_out + self.current_session
    }
}

#[derive(Debug)]
struct Account {
    password: String,
    session: Session,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    active: Option<Session>,
    calls: CallCounts,
}

/// Accounts live in memory, keyed by lowercase email. One session is active
/// at a time.
#[derive(Debug)]
pub struct InMemoryAuthProvider {
    inner: Mutex<Inner>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for InMemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Mutex::new(Inner::default()),
            events,
        }
    }

    /// Registers an account up front without counting a sign-up call.
    #[must_use]
    pub fn with_account(self, email: &str, password: &str, display_name: &str) -> Self {
        {
            let mut inner = self.lock();
            let key = normalize_email(email);
            let session = new_session(&key, display_name);
            inner.accounts.insert(
                key,
                Account {
                    password: password.to_string(),
                    session,
                },
            );
        }
        self
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    /// Drops the active session as if it had expired server-side.
    pub fn expire_session(&self) {
        if self.lock().active.take().is_some() {
            self.notify(AuthEvent::SignedOut);
        }
    }

    /// Changes the display name of an account, notifying subscribers when it
    /// belongs to the active session.
    pub fn rename(&self, email: &str, display_name: &str) -> bool {
        let key = normalize_email(email);
        let updated = {
            let mut inner = self.lock();
            let Some(account) = inner.accounts.get_mut(&key) else {
                return false;
            };
            account.session.display_name = Some(display_name.to_string());
            let session = account.session.clone();
            match &mut inner.active {
                Some(active) if active.user_id == session.user_id => {
                    *active = session.clone();
                    Some(session)
                }
                _ => None,
            }
        };
        if let Some(session) = updated {
            self.notify(AuthEvent::UserUpdated(session));
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, event: AuthEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let session = {
            let mut inner = self.lock();
            inner.calls.sign_in += 1;
            let key = normalize_email(&credentials.email);
            let session = match inner.accounts.get(&key) {
                Some(account) if account.password == credentials.password => {
                    account.session.clone()
                }
                _ => return Err(AuthError::InvalidCredentials),
            };
            inner.active = Some(session.clone());
            session
        };
        debug!("in-memory sign in for {}", session.user_id);
        self.notify(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<Session, AuthError> {
        let session = {
            let mut inner = self.lock();
            inner.calls.sign_up += 1;
            let key = normalize_email(&request.email);
            if inner.accounts.contains_key(&key) {
                return Err(AuthError::AccountExists);
            }
            let session = new_session(&key, &request.display_name);
            inner.accounts.insert(
                key,
                Account {
                    password: request.password.clone(),
                    session: session.clone(),
                },
            );
            inner.active = Some(session.clone());
            session
        };
        debug!("in-memory sign up for {}", session.user_id);
        self.notify(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let was_active = {
            let mut inner = self.lock();
            inner.calls.sign_out += 1;
            inner.active.take().is_some()
        };
        if was_active {
            self.notify(AuthEvent::SignedOut);
        }
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let mut inner = self.lock();
        inner.calls.current_session += 1;
        Ok(inner.active.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn new_session(email: &str, display_name: &str) -> Session {
    let hash = blake3::hash(email.as_bytes()).to_hex();
    let display_name = display_name.trim();
    Session {
        user_id: hash.as_str()[..16].to_string(),
        email: email.to_string(),
        display_name: (!display_name.is_empty()).then(|| display_name.to_string()),
    }
}
