//! Resolution errors
//!
//! | Variant | Status | Meaning |
//! |---------|--------|---------|
//! | `UnsupportedLanguage` | 400 | no location has a `<lang>/` subdirectory |
//! | `ResourceAccess` | 500 | deriving a relative location failed at the storage layer |
//! | `UnsupportedOperation` | 501 | reverse URL lookup on the localized stage |
//! | `Config` | 500 | handler configuration could not be loaded |
//!
//! None of these are retried anywhere in the crate.

use rust_i18n::t;
use std::io;
use thiserror::Error;

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Error, Debug)]
pub enum ResolveError {
    /// The selected language has no subdirectory under any candidate location.
    #[error("language not supported: {language:?}")]
    UnsupportedLanguage { language: String },

    /// The storage layer failed while deriving a relative location.
    #[error("failure while resolving paths under {location}")]
    ResourceAccess {
        location: String,
        #[source]
        source: io::Error,
    },

    #[error("{operation} is not supported")]
    UnsupportedOperation { operation: &'static str },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ResolveError {
    pub fn unsupported_language(language: impl Into<String>) -> Self {
        Self::UnsupportedLanguage {
            language: language.into(),
        }
    }

    pub fn resource_access(location: impl Into<String>, source: io::Error) -> Self {
        Self::ResourceAccess {
            location: location.into(),
            source,
        }
    }

    /// HTTP status class the failure should surface as.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnsupportedLanguage { .. } => 400,
            Self::ResourceAccess { .. } | Self::Config(_) => 500,
            Self::UnsupportedOperation { .. } => 501,
        }
    }

    /// Whether the caller, not the server, is at fault.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Message in the currently selected tool locale.
    pub fn localized_message(&self) -> String {
        match self {
            Self::UnsupportedLanguage { language } => {
                t!("errors.unsupported_language", lang = language).to_string()
            }
            Self::ResourceAccess { location, source } => t!(
                "errors.resource_access",
                location = location,
                reason = source.to_string()
            )
            .to_string(),
            Self::UnsupportedOperation { operation } => {
                t!("errors.unsupported_operation", operation = operation).to_string()
            }
            Self::Config(reason) => t!("errors.invalid_config", reason = reason).to_string(),
        }
    }
}
