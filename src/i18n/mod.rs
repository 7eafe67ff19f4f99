// SPDX-License-Identifier: MPL-2.0
//! Internationalization (i18n) support for the application.
//!
//! Catalogs are Fluent (`.ftl`) files embedded at build time, one per
//! supported language. They are flattened into a [`TranslationTable`] once at
//! startup; a [`LocaleStore`] then answers lookups for the active language.
//!
//! # Features
//!
//! - Locale resolution from CLI, config, or system settings
//! - Runtime language switching
//! - Missing keys render as the key itself

mod locale;
mod store;
mod table;

pub use locale::{LocaleTag, UnsupportedLocale};
pub use store::{resolve_initial_locale, LocaleStore};
pub use table::{CatalogError, CoverageReport, MissingKey, TranslationTable};
