//! Library settings.
//!
//! [`Settings`] gathers the knobs an embedding application may want to set
//! once at startup. It is plain data: there is no global instance, and
//! request-scoped behaviour is derived from it through
//! [`RequestContext::from_settings`](crate::context::RequestContext::from_settings).

use serde::{Deserialize, Serialize};

/// The complete set of atocha-rs settings.
///
/// # Examples
///
/// ```
/// use atocha_rs_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.completeness_checks);
/// assert_eq!(settings.language_code, "en");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,
    /// The log filter (e.g. "info", "atocha_rs_forms=debug").
    pub log_level: String,
    /// The language used to select locale data for dates.
    pub language_code: String,
    /// Whether render sessions verify that every field was rendered.
    pub completeness_checks: bool,
    /// Base URL under which client-side scripts are served.
    pub scripts_url: String,
    /// Whether labels get a trailing colon in table renderings.
    pub label_colon: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            language_code: "en".to_string(),
            completeness_checks: true,
            scripts_url: "/scripts".to_string(),
            label_colon: false,
        }
    }
}
