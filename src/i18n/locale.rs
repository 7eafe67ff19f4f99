// SPDX-License-Identifier: MPL-2.0
//! Supported display languages.

use std::fmt;
use std::str::FromStr;

use unic_langid::LanguageIdentifier;

/// A supported display language.
///
/// The set is closed: anything outside it is rejected at parse time, so a
/// `LocaleTag` held by the store is always backed by a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum LocaleTag {
    #[default]
    En,
    Hi,
    Mr,
}

impl LocaleTag {
    /// Every supported tag, in picker order.
    pub const ALL: [LocaleTag; 3] = [LocaleTag::En, LocaleTag::Hi, LocaleTag::Mr];

    /// Short language code, also used as the catalog file stem.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            LocaleTag::En => "en",
            LocaleTag::Hi => "hi",
            LocaleTag::Mr => "mr",
        }
    }

    /// Translation key of the language's native name, shown in the picker.
    #[must_use]
    pub fn native_name_key(self) -> &'static str {
        match self {
            LocaleTag::En => "english",
            LocaleTag::Hi => "hindi",
            LocaleTag::Mr => "marathi",
        }
    }

    #[must_use]
    pub fn language_identifier(self) -> LanguageIdentifier {
        self.code().parse().unwrap_or_default()
    }

    /// Maps a parsed identifier to a tag by its language subtag.
    #[must_use]
    pub fn from_language_identifier(id: &LanguageIdentifier) -> Option<Self> {
        match id.language.as_str() {
            "en" => Some(LocaleTag::En),
            "hi" => Some(LocaleTag::Hi),
            "mr" => Some(LocaleTag::Mr),
            _ => None,
        }
    }
}

impl fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a string does not name a supported language.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language: {0}")]
pub struct UnsupportedLocale(pub String);

impl FromStr for LocaleTag {
    type Err = UnsupportedLocale;

    /// Accepts `en`, `en-US`, `hi_IN`, `MR` and similar; the language subtag decides.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('_', "-");
        normalized
            .parse::<LanguageIdentifier>()
            .ok()
            .and_then(|id| Self::from_language_identifier(&id))
            .ok_or_else(|| UnsupportedLocale(s.to_string()))
    }
}
