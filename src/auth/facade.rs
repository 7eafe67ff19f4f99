// SPDX-License-Identifier: MPL-2.0
//! Client-side view of the identity service.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use super::error::AuthError;
use super::provider::AuthProvider;
use super::session::{AuthEvent, Credentials, Session, SessionState, SignUpRequest};

/// Wraps an [`AuthProvider`] and keeps a synchronous cache of the current
/// session for views.
///
/// The cache follows the provider's change notifications; call
/// [`pump_events`](Self::pump_events) from the UI tick to apply the ones that
/// arrived since the last call.
pub struct SessionFacade {
    provider: Arc<dyn AuthProvider>,
    state: SessionState,
    events: broadcast::Receiver<AuthEvent>,
}

impl SessionFacade {
    /// Starts in the loading state until [`restore`](Self::restore) or the
    /// first auth call completes.
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        let events = provider.subscribe();
        Self {
            provider,
            state: SessionState {
                session: None,
                loading: true,
            },
            events,
        }
    }

    /// Reads whatever session the provider already holds.
    pub async fn restore(&mut self) -> Result<(), AuthError> {
        self.pump_events();
        self.state.loading = true;
        let result = self.provider.current_session().await;
        self.discard_events();
        self.state.loading = false;
        self.state.session = result?;
        Ok(())
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<Session, AuthError> {
        let credentials = Credentials::new(email.trim(), password);
        self.pump_events();
        self.state.loading = true;
        let result = self.provider.sign_in(&credentials).await;
        self.finish_call(result, "sign in")
    }

    /// Creates an account. Password rules are checked by the form beforehand.
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Session, AuthError> {
        let request = SignUpRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
            display_name: display_name.trim().to_string(),
        };
        self.pump_events();
        self.state.loading = true;
        let result = self.provider.sign_up(&request).await;
        self.finish_call(result, "sign up")
    }

    /// Clears the cached session and invalidates it at the provider.
    ///
    /// Does nothing when already signed out. A provider failure is logged;
    /// the local session is gone either way.
    pub async fn sign_out(&mut self) {
        self.pump_events();
        let Some(session) = self.state.session.take() else {
            return;
        };
        if let Err(err) = self.provider.sign_out().await {
            warn!("sign out for {} failed at provider: {err}", session.user_id);
        }
        self.discard_events();
        self.state.session = None;
        info!("signed out {}", session.user_id);
    }

    #[must_use]
    pub fn current_session(&self) -> Option<&Session> {
        self.state.session.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Applies pending provider notifications. Returns how many were applied.
    pub fn pump_events(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.apply(event);
                    applied += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("missed {skipped} auth events; call restore to resync");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        applied
    }

    fn apply(&mut self, event: AuthEvent) {
        debug!("auth event: {event:?}");
        match event {
            AuthEvent::SignedIn(session) | AuthEvent::UserUpdated(session) => {
                self.state.session = Some(session);
            }
            AuthEvent::SignedOut => {
                self.state.session = None;
            }
        }
    }

    /// Drops notifications caused by our own successful call; its result is
    /// authoritative.
    fn discard_events(&mut self) {
        while !matches!(self.events.try_recv(), Err(TryRecvError::Empty | TryRecvError::Closed)) {}
    }

    fn finish_call(
        &mut self,
        result: Result<Session, AuthError>,
        action: &str,
    ) -> Result<Session, AuthError> {
        self.state.loading = false;
        match result {
            Ok(session) => {
                self.discard_events();
                info!("{action} succeeded for {}", session.user_id);
                self.state.session = Some(session.clone());
                Ok(session)
            }
            Err(err) => {
                warn!("{action} failed: {err}");
                self.pump_events();
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::auth::InMemoryAuthProvider;

    /// Delegates to an in-memory provider but fails every sign-out after
    /// dropping the session, like a logout request that never reaches the
    /// server.
    struct UnreachableLogout(InMemoryAuthProvider);

    #[async_trait]
    impl AuthProvider for UnreachableLogout {
        async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
            self.0.sign_in(credentials).await
        }

        async fn sign_up(&self, request: &SignUpRequest) -> Result<Session, AuthError> {
            self.0.sign_up(request).await
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            self.0.sign_out().await?;
            Err(AuthError::Network("connection refused".into()))
        }

        async fn current_session(&self) -> Result<Option<Session>, AuthError> {
            self.0.current_session().await
        }

        fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
            self.0.subscribe()
        }
    }

    fn facade_with(provider: Arc<InMemoryAuthProvider>) -> SessionFacade {
        SessionFacade::new(provider)
    }

    #[tokio::test]
    async fn starts_loading_until_restored() {
        let provider = Arc::new(InMemoryAuthProvider::new());
        let mut facade = facade_with(provider);
        assert!(facade.is_loading());
        facade.restore().await.unwrap();
        assert!(!facade.is_loading());
        assert!(facade.current_session().is_none());
    }

    #[tokio::test]
    async fn restore_picks_up_existing_session() {
        let provider = Arc::new(InMemoryAuthProvider::new().with_account("a@b.c", "secret1", "A"));
        provider
            .sign_in(&Credentials::new("a@b.c", "secret1"))
            .await
            .unwrap();

        let mut facade = facade_with(provider);
        facade.restore().await.unwrap();
        assert_eq!(facade.current_session().unwrap().email, "a@b.c");
    }

    #[tokio::test]
    async fn sign_in_caches_session() {
        let provider = Arc::new(InMemoryAuthProvider::new().with_account("a@b.c", "secret1", "A"));
        let mut facade = facade_with(provider);

        let session = facade.sign_in(" a@b.c ", "secret1").await.unwrap();
        assert_eq!(facade.current_session(), Some(&session));
        assert!(!facade.is_loading());
    }

    #[tokio::test]
    async fn sign_in_failure_is_returned_and_cache_untouched() {
        let provider = Arc::new(InMemoryAuthProvider::new().with_account("a@b.c", "secret1", "A"));
        let mut facade = facade_with(provider);

        let err = facade.sign_in("a@b.c", "wrong").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert!(facade.current_session().is_none());
        assert!(!facade.is_loading());
    }

    #[tokio::test]
    async fn sign_up_caches_session() {
        let provider = Arc::new(InMemoryAuthProvider::new());
        let mut facade = facade_with(provider.clone());

        let session = facade.sign_up("new@b.c", "secret1", " Meera ").await.unwrap();
        assert_eq!(session.display_name.as_deref(), Some("Meera"));
        assert_eq!(facade.current_session(), Some(&session));
        assert_eq!(provider.calls().sign_up, 1);
    }

    #[tokio::test]
    async fn sign_out_clears_session_and_is_idempotent() {
        let provider = Arc::new(InMemoryAuthProvider::new().with_account("a@b.c", "secret1", "A"));
        let mut facade = facade_with(provider.clone());
        facade.sign_in("a@b.c", "secret1").await.unwrap();

        facade.sign_out().await;
        assert!(facade.current_session().is_none());
        assert_eq!(provider.current_session().await.unwrap(), None);
        assert_eq!(provider.calls().sign_out, 1);

        facade.sign_out().await;
        assert!(facade.current_session().is_none());
        assert_eq!(provider.calls().sign_out, 1);
    }

    #[tokio::test]
    async fn provider_notifications_update_cache() {
        let provider = Arc::new(InMemoryAuthProvider::new().with_account("a@b.c", "secret1", "A"));
        let mut facade = facade_with(provider.clone());
        facade.sign_in("a@b.c", "secret1").await.unwrap();
        assert_eq!(facade.pump_events(), 0);

        provider.rename("a@b.c", "Anand");
        assert_eq!(facade.pump_events(), 1);
        assert_eq!(
            facade.current_session().unwrap().display_name.as_deref(),
            Some("Anand")
        );

        provider.expire_session();
        assert_eq!(facade.pump_events(), 1);
        assert!(facade.current_session().is_none());
    }

    #[tokio::test]
    async fn failed_call_keeps_earlier_expiry() {
        let provider = Arc::new(InMemoryAuthProvider::new().with_account("a@b.c", "secret1", "A"));
        let mut facade = facade_with(provider.clone());
        facade.sign_in("a@b.c", "secret1").await.unwrap();

        provider.expire_session();
        let err = facade.sign_in("a@b.c", "wrong").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        facade.pump_events();

        assert_eq!(provider.current_session().await.unwrap(), None);
        assert!(facade.current_session().is_none());
    }

    #[tokio::test]
    async fn failed_sign_up_keeps_earlier_expiry() {
        let provider = Arc::new(InMemoryAuthProvider::new().with_account("a@b.c", "secret1", "A"));
        let mut facade = facade_with(provider.clone());
        facade.sign_in("a@b.c", "secret1").await.unwrap();

        provider.expire_session();
        let err = facade.sign_up("a@b.c", "secret1", "A").await.unwrap_err();
        assert_eq!(err, AuthError::AccountExists);
        assert!(facade.current_session().is_none());
    }

    #[tokio::test]
    async fn provider_sign_out_failure_still_clears_session() {
        let provider = Arc::new(UnreachableLogout(
            InMemoryAuthProvider::new().with_account("a@b.c", "secret1", "A"),
        ));
        let mut facade = SessionFacade::new(provider.clone());
        facade.sign_in("a@b.c", "secret1").await.unwrap();

        facade.sign_out().await;
        assert!(facade.current_session().is_none());
        assert_eq!(facade.pump_events(), 0);
        assert_eq!(provider.0.calls().sign_out, 1);

        facade.sign_out().await;
        assert_eq!(provider.0.calls().sign_out, 1);
    }
}
