// SPDX-License-Identifier: MPL-2.0
//! Active-locale state and key lookup.

use std::sync::Arc;

use tracing::{debug, trace};

use super::locale::LocaleTag;
use super::table::TranslationTable;

/// Holds the active language and resolves translation keys against a shared,
/// read-only [`TranslationTable`].
///
/// Lookups go straight to the table on every call, so a [`set_locale`] is
/// visible to the very next [`translate`].
///
/// [`set_locale`]: LocaleStore::set_locale
/// [`translate`]: LocaleStore::translate
#[derive(Debug, Clone)]
pub struct LocaleStore {
    table: Arc<TranslationTable>,
    current: LocaleTag,
}

impl LocaleStore {
    /// Creates a store starting at the default locale.
    pub fn new(table: Arc<TranslationTable>) -> Self {
        Self {
            table,
            current: LocaleTag::default(),
        }
    }

    #[must_use]
    pub fn with_locale(mut self, tag: LocaleTag) -> Self {
        self.current = tag;
        self
    }

    pub fn locale(&self) -> LocaleTag {
        self.current
    }

    pub fn set_locale(&mut self, tag: LocaleTag) {
        if self.current != tag {
            debug!("LocaleStore::set_locale: {} -> {}", self.current, tag);
        }
        self.current = tag;
    }

    /// Returns the localized string for `key`, or `key` itself when the
    /// active catalog has no entry.
    pub fn translate<'a>(&'a self, key: &'a str) -> &'a str {
        match self.table.lookup(self.current, key) {
            Some(value) => value,
            None => {
                trace!("missing translation for {key} in {}", self.current);
                key
            }
        }
    }

    /// Owned variant of [`translate`](Self::translate).
    pub fn tr(&self, key: &str) -> String {
        self.translate(key).to_string()
    }

    pub fn table(&self) -> &TranslationTable {
        &self.table
    }
}

/// Picks the startup locale.
///
/// Order: CLI flag, config file, OS locale, then the default. Values that do
/// not name a supported language are skipped.
pub fn resolve_initial_locale(cli_lang: Option<&str>, config_lang: Option<&str>) -> LocaleTag {
    resolve_with_os(cli_lang, config_lang, sys_locale::get_locale().as_deref())
}

fn resolve_with_os(
    cli_lang: Option<&str>,
    config_lang: Option<&str>,
    os_lang: Option<&str>,
) -> LocaleTag {
    [cli_lang, config_lang, os_lang]
        .into_iter()
        .flatten()
        .find_map(|candidate| candidate.parse::<LocaleTag>().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> LocaleStore {
        let table = TranslationTable::from_pairs(LocaleTag::En, [("continue", "Continue")])
            .with_pairs(LocaleTag::Hi, [("continue", "जारी रखें")])
            .with_pairs(LocaleTag::Mr, [("continue", "सुरू ठेवा")]);
        LocaleStore::new(Arc::new(table))
    }

    #[test]
    fn starts_at_default_locale() {
        assert_eq!(store().locale(), LocaleTag::En);
    }

    #[test]
    fn set_locale_is_reflected_immediately() {
        let mut store = store();
        assert_eq!(store.translate("continue"), "Continue");
        store.set_locale(LocaleTag::Hi);
        assert_eq!(store.translate("continue"), "जारी रखें");
        store.set_locale(LocaleTag::Mr);
        assert_eq!(store.translate("continue"), "सुरू ठेवा");
        store.set_locale(LocaleTag::En);
        assert_eq!(store.translate("continue"), "Continue");
    }

    #[test]
    fn missing_key_falls_back_to_key() {
        let store = store();
        assert_eq!(store.translate("doesNotExist"), "doesNotExist");
        assert_eq!(store.tr("doesNotExist"), "doesNotExist");
    }

    #[test]
    fn missing_locale_table_falls_back_to_key() {
        let store = LocaleStore::new(Arc::new(TranslationTable::default())).with_locale(LocaleTag::Mr);
        assert_eq!(store.translate("continue"), "continue");
    }

    #[test]
    fn resolve_prefers_cli_then_config_then_os() {
        assert_eq!(resolve_with_os(Some("hi"), Some("mr"), Some("en-US")), LocaleTag::Hi);
        assert_eq!(resolve_with_os(None, Some("mr"), Some("hi-IN")), LocaleTag::Mr);
        assert_eq!(resolve_with_os(None, None, Some("hi-IN")), LocaleTag::Hi);
    }

    #[test]
    fn resolve_skips_unsupported_values() {
        assert_eq!(resolve_with_os(Some("fr"), Some("de"), Some("mr_IN")), LocaleTag::Mr);
        assert_eq!(resolve_with_os(Some("fr"), None, Some("ja-JP")), LocaleTag::En);
        assert_eq!(resolve_with_os(None, None, None), LocaleTag::En);
    }
}
