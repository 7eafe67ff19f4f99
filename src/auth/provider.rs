// SPDX-License-Identifier: MPL-2.0
use async_trait::async_trait;
use tokio::sync::broadcast;

use super::error::AuthError;
use super::session::{AuthEvent, Credentials, Session, SignUpRequest};

/// Capacity of the auth event channel each collaborator keeps.
pub const EVENT_CAPACITY: usize = 16;

/// External identity service.
///
/// Implementations own the wire protocol and any token storage; callers only
/// see [`Session`] records. Calls have no client-side timeout or retry.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError>;

    async fn sign_up(&self, request: &SignUpRequest) -> Result<Session, AuthError>;

    /// Invalidates the active session, if any.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The session the service currently considers active.
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;

    /// Subscribes to session changes, including ones not initiated by this
    /// client (expiry, revocation, profile edits).
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
