//! Locale of the tool's own messages
//!
//! This is unrelated to the language picked for a request: it only decides
//! which `locales/*.yml` catalog error and help text is printed from.
//! Supported languages: English (en), French (fr), German (de)

use rust_i18n::set_locale;
use sys_locale::get_locale;

use crate::selector::primary_language_subtag;

/// Supported message locales
const SUPPORTED_LOCALES: &[&str] = &["en", "fr", "de"];

/// Default locale when the system locale is not supported
const DEFAULT_LOCALE: &str = "en";

/// Set the message locale from the operating system settings.
pub fn init_locale() {
    let locale = detect_locale(get_locale().as_deref());
    set_locale(locale);
}

/// Map a system locale such as `fr_FR.UTF-8` or `de-CH` to a supported message locale.
fn detect_locale(system: Option<&str>) -> &'static str {
    let Some(system) = system else {
        return DEFAULT_LOCALE;
    };

    // POSIX locales use '_' and may carry an encoding suffix.
    let tag = system.split('.').next().unwrap_or_default().replace('_', "-");
    let lang = primary_language_subtag(&tag);

    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|supported| *supported == lang)
        .unwrap_or(DEFAULT_LOCALE)
}
