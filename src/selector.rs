//! Language selection
//!
//! Picks exactly one language per request. Search order:
//! 1. the `lang` parameter (first value only, lowercased, not validated)
//! 2. the primary subtag of the `Accept-Language` header (weights and extra ranges ignored)
//! 3. the caller's fallback, returned as given
//!
//! Selection never fails and keeps no state between calls.

use std::fmt;

use crate::request::{RequestView, ACCEPT_LANGUAGE, LANGUAGE_PARAMETER};

/// Longest primary language subtag allowed by BCP 47.
const MAX_PRIMARY_SUBTAG_LEN: usize = 8;

/// Shortest primary language subtag allowed by BCP 47.
const MIN_PRIMARY_SUBTAG_LEN: usize = 2;

/// A selected language, e.g. `en` or `fr`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Wrap a code as-is.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Lowercase with the locale-independent Unicode mapping.
    pub fn normalized(raw: &str) -> Self {
        Self(raw.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Relative child path of the localized root, `"<lang>/"`.
    pub fn child_path(&self) -> String {
        format!("{}/", self.0)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Names the request inputs language selection reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSelector {
    parameter: String,
    header: String,
}

impl Default for LanguageSelector {
    fn default() -> Self {
        Self {
            parameter: LANGUAGE_PARAMETER.to_string(),
            header: ACCEPT_LANGUAGE.to_string(),
        }
    }
}

impl LanguageSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the override from a differently named parameter.
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = parameter.into();
        self
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// Select the request language, or `fallback` when the request names none.
    pub fn select(&self, request: &dyn RequestView, fallback: &str) -> LanguageCode {
        if let Some(value) = request.first_parameter(&self.parameter) {
            return LanguageCode::normalized(value);
        }

        if let Some(value) = request.header(&self.header) {
            let primary = primary_language_subtag(value);
            // A header with no usable subtag counts as absent.
            if !primary.is_empty() {
                return LanguageCode::new(primary);
            }
        }

        LanguageCode::new(fallback)
    }
}

/// Select with the default `lang` parameter and `Accept-Language` header.
pub fn select_language(request: &dyn RequestView, fallback: &str) -> LanguageCode {
    LanguageSelector::default().select(request, fallback)
}

/// Extract the lowercased primary language subtag of the first language range.
///
/// Returns an empty string for anything that is not a well-formed subtag
/// (`*`, `en_US`, digits, empty input).
pub fn primary_language_subtag(header: &str) -> String {
    let range = header.split(',').next().unwrap_or_default();
    let tag = range.split(';').next().unwrap_or_default().trim();
    let primary = tag.split('-').next().unwrap_or_default();

    let well_formed = (MIN_PRIMARY_SUBTAG_LEN..=MAX_PRIMARY_SUBTAG_LEN).contains(&primary.len())
        && primary.bytes().all(|b| b.is_ascii_alphabetic());

    if well_formed {
        primary.to_ascii_lowercase()
    } else {
        String::new()
    }
}
