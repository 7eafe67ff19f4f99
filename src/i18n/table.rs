// SPDX-License-Identifier: MPL-2.0
//! Read-only translation table built from Fluent catalogs.
//!
//! Catalogs are parsed once with `fluent-bundle` and flattened to plain
//! strings, so lookups afterwards are a pair of hash probes. Messages with
//! placeables are formatted without arguments; the UI strings here carry none.

use std::collections::{BTreeSet, HashMap};

use fluent_bundle::{FluentBundle, FluentResource};
use rust_embed::RustEmbed;
use thiserror::Error;
use tracing::debug;

use super::locale::LocaleTag;

#[derive(RustEmbed)]
#[folder = "assets/i18n/"]
struct Asset;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse catalog for {locale}: {details}")]
    Parse { locale: LocaleTag, details: String },

    #[error("failed to load catalog for {locale}: {details}")]
    Resource { locale: LocaleTag, details: String },

    #[error("no catalog for {0}")]
    MissingLocale(LocaleTag),
}

/// A key present in some locale but absent from `locale`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKey {
    pub locale: LocaleTag,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    pub missing: Vec<MissingKey>,
}

impl CoverageReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Locale -> key -> localized string.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    entries: HashMap<LocaleTag, HashMap<String, String>>,
}

impl TranslationTable {
    /// Loads the catalogs embedded in the binary. Every supported locale must
    /// have one.
    pub fn embedded() -> Result<Self, CatalogError> {
        let mut sources = Vec::with_capacity(LocaleTag::ALL.len());
        for tag in LocaleTag::ALL {
            let file = format!("{}.ftl", tag.code());
            let content = Asset::get(&file).ok_or(CatalogError::MissingLocale(tag))?;
            sources.push((tag, String::from_utf8_lossy(content.data.as_ref()).into_owned()));
        }
        Self::from_ftl_sources(sources.iter().map(|(tag, src)| (*tag, src.as_str())))
    }

    /// Builds a table from Fluent sources. A later source for the same locale
    /// replaces the earlier one.
    pub fn from_ftl_sources<'a, I>(sources: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (LocaleTag, &'a str)>,
    {
        let mut entries = HashMap::new();
        for (tag, src) in sources {
            let messages = parse_catalog(tag, src)?;
            debug!("loaded {} messages for {}", messages.len(), tag);
            entries.insert(tag, messages);
        }
        Ok(Self { entries })
    }

    /// Builds a table from already-flattened pairs.
    pub fn from_pairs<I, K, V>(tag: LocaleTag, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::default();
        table.entries.insert(
            tag,
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        );
        table
    }

    /// Merges another locale's pairs into the table, builder style.
    #[must_use]
    pub fn with_pairs<I, K, V>(mut self, tag: LocaleTag, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.entries.insert(
            tag,
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        );
        self
    }

    #[must_use]
    pub fn lookup(&self, tag: LocaleTag, key: &str) -> Option<&str> {
        self.entries
            .get(&tag)
            .and_then(|messages| messages.get(key))
            .map(String::as_str)
    }

    #[must_use]
    pub fn has_locale(&self, tag: LocaleTag) -> bool {
        self.entries.contains_key(&tag)
    }

    /// Keys defined for `tag`, sorted.
    #[must_use]
    pub fn keys(&self, tag: LocaleTag) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .entries
            .get(&tag)
            .map(|messages| messages.keys().map(String::as_str).collect())
            .unwrap_or_default();
        keys.sort_unstable();
        keys
    }

    /// Reports every key that is defined for at least one locale but missing
    /// from another supported locale.
    #[must_use]
    pub fn coverage(&self) -> CoverageReport {
        let all_keys: BTreeSet<&str> = self
            .entries
            .values()
            .flat_map(|messages| messages.keys().map(String::as_str))
            .collect();

        let mut missing = Vec::new();
        for tag in LocaleTag::ALL {
            let messages = self.entries.get(&tag);
            for key in &all_keys {
                if !messages.is_some_and(|m| m.contains_key(*key)) {
                    missing.push(MissingKey {
                        locale: tag,
                        key: (*key).to_string(),
                    });
                }
            }
        }
        CoverageReport { missing }
    }
}

fn parse_catalog(tag: LocaleTag, src: &str) -> Result<HashMap<String, String>, CatalogError> {
    let resource = FluentResource::try_new(src.to_string()).map_err(|(_, errors)| {
        CatalogError::Parse {
            locale: tag,
            details: format!("{errors:?}"),
        }
    })?;

    let mut bundle = FluentBundle::new(vec![tag.language_identifier()]);
    bundle.set_use_isolating(false);
    bundle
        .add_resource(resource)
        .map_err(|errors| CatalogError::Resource {
            locale: tag,
            details: format!("{errors:?}"),
        })?;

    let mut messages = HashMap::new();
    for id in message_ids(src) {
        let Some(message) = bundle.get_message(id) else {
            continue;
        };
        let Some(pattern) = message.value() else {
            continue;
        };
        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, None, &mut errors);
        if errors.is_empty() {
            messages.insert(id.to_string(), value.into_owned());
        } else {
            debug!("skipping {id} in {tag}: {errors:?}");
        }
    }
    Ok(messages)
}

/// Identifiers of top-level messages. Terms (`-name`), comments and
/// indented continuation lines are skipped.
fn message_ids(src: &str) -> impl Iterator<Item = &str> {
    src.lines().filter_map(|line| {
        let first = line.chars().next()?;
        if !first.is_ascii_alphabetic() {
            return None;
        }
        let (id, _) = line.split_once('=')?;
        let id = id.trim_end();
        id.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            .then_some(id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalogs_cover_every_locale() {
        let table = TranslationTable::embedded().expect("embedded catalogs load");
        for tag in LocaleTag::ALL {
            assert!(table.has_locale(tag), "missing catalog for {tag}");
        }
        let report = table.coverage();
        assert!(report.is_complete(), "missing keys: {:?}", report.missing);
    }

    #[test]
    fn embedded_catalogs_have_welcome_strings() {
        let table = TranslationTable::embedded().unwrap();
        assert_eq!(table.lookup(LocaleTag::En, "continue"), Some("Continue"));
        assert_eq!(table.lookup(LocaleTag::Hi, "continue"), Some("जारी रखें"));
        assert_eq!(table.lookup(LocaleTag::Mr, "continue"), Some("सुरू ठेवा"));
        assert_eq!(
            table.lookup(LocaleTag::En, "welcome"),
            Some("Welcome to AgriSaathi")
        );
    }

    #[test]
    fn message_ids_skip_comments_terms_and_continuations() {
        let src = "# comment\n-brand = Agri\nhello = Hi\n    continued\nfeature1Title = X\n";
        let ids: Vec<&str> = message_ids(src).collect();
        assert_eq!(ids, vec!["hello", "feature1Title"]);
    }

    #[test]
    fn multiline_values_are_flattened() {
        let table =
            TranslationTable::from_ftl_sources([(LocaleTag::En, "long = first\n    second\n")])
                .unwrap();
        assert_eq!(table.lookup(LocaleTag::En, "long"), Some("first\nsecond"));
    }

    #[test]
    fn invalid_ftl_is_a_parse_error() {
        let err = TranslationTable::from_ftl_sources([(LocaleTag::Hi, "= no id\n")]).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { locale: LocaleTag::Hi, .. }));
    }

    #[test]
    fn coverage_reports_keys_missing_from_other_locales() {
        let table = TranslationTable::from_pairs(LocaleTag::En, [("a", "A"), ("b", "B")])
            .with_pairs(LocaleTag::Hi, [("a", "अ")])
            .with_pairs(LocaleTag::Mr, [("a", "अ"), ("b", "ब")]);

        let report = table.coverage();
        assert_eq!(
            report.missing,
            vec![MissingKey {
                locale: LocaleTag::Hi,
                key: "b".to_string()
            }]
        );
    }

    #[test]
    fn keys_are_sorted() {
        let table = TranslationTable::from_pairs(LocaleTag::En, [("b", "B"), ("a", "A")]);
        assert_eq!(table.keys(LocaleTag::En), vec!["a", "b"]);
        assert!(table.keys(LocaleTag::Mr).is_empty());
    }
}
