// SPDX-License-Identifier: MPL-2.0
//! Application context shared by every screen.
//!
//! [`AppContext`] bundles the locale store, the session facade and the
//! notification queue. Screens receive it explicitly; there is no global
//! state. The handlers here implement the flows behind each screen: language
//! picking, login, signup, sign-out and entering the chat.

pub mod config;
pub mod paths;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{AuthProvider, InMemoryAuthProvider, Session, SessionFacade, SupabaseAuthProvider};
use crate::chat::Conversation;
use crate::error::{Error, Result};
use crate::forms::{LoginForm, SignupForm};
use crate::i18n::{resolve_initial_locale, LocaleStore, LocaleTag, TranslationTable};
use crate::notifications::{Manager, Notification};

use self::config::{AuthBackend, AuthConfig, Config};

/// Startup options taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    /// Language override (`--lang`).
    pub lang: Option<String>,
    /// Config directory override (`--config-dir`).
    pub config_dir: Option<String>,
}

pub struct AppContext {
    pub locale: LocaleStore,
    pub session: SessionFacade,
    pub notifications: Manager,
    config: Config,
    /// Where language changes are persisted; `None` keeps them in memory.
    config_dir: Option<PathBuf>,
}

impl AppContext {
    /// Assembles a context from parts, without touching disk.
    pub fn new(locale: LocaleStore, session: SessionFacade, config: Config) -> Self {
        Self {
            locale,
            session,
            notifications: Manager::new(),
            config,
            config_dir: None,
        }
    }

    /// Loads settings and catalogs, picks the startup language, connects the
    /// configured identity service and restores any existing session.
    pub async fn bootstrap(flags: &Flags) -> Result<Self> {
        let config_dir = paths::get_app_config_dir_with_override(
            flags.config_dir.as_ref().map(PathBuf::from),
        );
        let (config, warning) = config::load_with_override(config_dir.clone());

        let table = Arc::new(TranslationTable::embedded()?);
        let coverage = table.coverage();
        if !coverage.is_complete() {
            warn!("{} translations missing", coverage.missing.len());
        }
        let tag = resolve_initial_locale(flags.lang.as_deref(), config.general.language.as_deref());
        let locale = LocaleStore::new(table).with_locale(tag);

        let provider = provider_from_config(&config.auth)?;
        let mut ctx = Self::new(locale, SessionFacade::new(provider), config);
        ctx.config_dir = config_dir;
        if let Some(key) = warning {
            ctx.notifications.push(Notification::warning(key));
        }
        if let Err(err) = ctx.session.restore().await {
            ctx.notifications
                .push(Notification::error(err.i18n_key()).with_detail(err.to_string()));
        }
        info!("started in {} with {:?} auth", tag, ctx.config.auth.backend);
        Ok(ctx)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Switches the UI language and remembers the choice.
    pub fn select_language(&mut self, tag: LocaleTag) {
        self.locale.set_locale(tag);
        self.config.general.language = Some(tag.code().to_string());
        if let Some(dir) = &self.config_dir {
            if let Err(err) = config::save_with_override(&self.config, Some(dir.clone())) {
                warn!("failed to save language choice: {err}");
                self.notifications
                    .push(Notification::warning("configSaveError").with_detail(err.to_string()));
                return;
            }
        }
        self.notifications.push(Notification::info("languageChanged"));
    }

    /// Validates the form and signs in. Problems become notifications.
    pub async fn login(&mut self, form: &LoginForm) -> Option<Session> {
        let credentials = match form.validate() {
            Ok(credentials) => credentials,
            Err(err) => {
                self.notifications.push(Notification::warning(err.i18n_key()));
                return None;
            }
        };
        let result = self
            .session
            .sign_in(&credentials.email, &credentials.password)
            .await;
        self.report(result, "signedIn")
    }

    /// Validates the form and creates the account. A form that fails
    /// validation never reaches the identity service.
    pub async fn signup(&mut self, form: &SignupForm) -> Option<Session> {
        let request = match form.validate() {
            Ok(request) => request,
            Err(err) => {
                self.notifications.push(Notification::warning(err.i18n_key()));
                return None;
            }
        };
        let result = self
            .session
            .sign_up(&request.email, &request.password, &request.display_name)
            .await;
        self.report(result, "signedUp")
    }

    pub async fn sign_out(&mut self) {
        self.session.pump_events();
        let was_signed_in = self.session.current_session().is_some();
        self.session.sign_out().await;
        if was_signed_in {
            self.notifications.push(Notification::info("signedOut"));
        }
    }

    /// Opens the assistant. Requires a session.
    pub fn open_chat(&mut self) -> Option<Conversation> {
        self.session.pump_events();
        match self.session.current_session() {
            Some(session) => Some(Conversation::new(Some(session))),
            None => {
                self.notifications.push(Notification::warning("authRequired"));
                None
            }
        }
    }

    /// Periodic housekeeping: applies auth notifications and expires toasts.
    pub fn tick(&mut self) {
        self.session.pump_events();
        self.notifications.tick();
    }

    /// Localized text of a notification, with any detail appended.
    pub fn render_notification(&self, notification: &Notification) -> String {
        let message = self.locale.translate(notification.message_key());
        match notification.detail() {
            Some(detail) => format!("{message} ({detail})"),
            None => message.to_string(),
        }
    }

    fn report(
        &mut self,
        result: std::result::Result<Session, crate::auth::AuthError>,
        success_key: &str,
    ) -> Option<Session> {
        match result {
            Ok(session) => {
                self.notifications.clear_failures();
                self.notifications.push(Notification::success(success_key));
                Some(session)
            }
            Err(err) => {
                let mut notification = Notification::error(err.i18n_key());
                if let crate::auth::AuthError::Rejected(detail) = &err {
                    notification = notification.with_detail(detail.clone());
                }
                self.notifications.push(notification);
                None
            }
        }
    }
}

/// Builds the identity service named in the `[auth]` section.
pub fn provider_from_config(auth: &AuthConfig) -> Result<Arc<dyn AuthProvider>> {
    match auth.backend {
        AuthBackend::Memory => Ok(Arc::new(InMemoryAuthProvider::new())),
        AuthBackend::Supabase => {
            let url = auth
                .url
                .as_deref()
                .filter(|url| !url.is_empty())
                .ok_or_else(|| Error::Config("auth.url is required for supabase".into()))?;
            let key = auth
                .anon_key
                .as_deref()
                .filter(|key| !key.is_empty())
                .ok_or_else(|| Error::Config("auth.anon_key is required for supabase".into()))?;
            Ok(Arc::new(SupabaseAuthProvider::new(url, key)))
        }
    }
}
