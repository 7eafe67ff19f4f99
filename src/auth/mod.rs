// SPDX-License-Identifier: MPL-2.0
//! Authentication: the session facade and the identity services behind it.
//!
//! - [`SessionFacade`] - cached session state for views
//! - [`AuthProvider`] - the external identity service seam
//! - [`InMemoryAuthProvider`] - offline accounts, used by default and in tests
//! - [`SupabaseAuthProvider`] - Supabase auth over HTTPS

mod error;
mod facade;
mod memory;
mod provider;
mod session;
mod supabase;

pub use error::AuthError;
pub use facade::SessionFacade;
pub use memory::{CallCounts, InMemoryAuthProvider};
pub use provider::{AuthProvider, EVENT_CAPACITY};
pub use session::{AuthEvent, Credentials, Session, SessionState, SignUpRequest};
pub use supabase::SupabaseAuthProvider;
