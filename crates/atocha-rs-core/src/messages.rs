//! The message registry.
//!
//! All human-readable strings produced by the library live here, keyed by a
//! stable symbolic name such as `date-invalid-format`. Templates are stored
//! untranslated; translation happens at lookup time through the translator
//! passed by the caller, so one registry serves every locale and request.
//!
//! Templates may contain positional placeholders `{0}`, `{1}`, ... which are
//! substituted by [`MessageRegistry::format`].

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::i18n::Translator;

/// The built-in message templates.
const BUILTIN_MESSAGES: &[(&str, &str)] = &[
    ("submit-button", "Submit"),
    ("reset-button", "Reset"),
    (
        "error-invalid-encoding",
        "Browser error: Invalid chars in expected encoding.",
    ),
    ("error-required-value", "Missing value required."),
    ("generic-ui-message", "Please fix errors below."),
    ("generic-value-error", "Invalid value."),
    ("text-invalid-chars", "Invalid characters in string."),
    ("text-minlen", "String too short."),
    ("text-maxlen", "String too long."),
    ("email-invalid", "Invalid email address."),
    ("email-error-local", "Please specify a full email address."),
    ("url-invalid", "Invalid URL: '{0}'."),
    ("numerical-invalid", "Invalid number."),
    ("numerical-minval", "Value too small.  Minimum value is '{0}'."),
    ("numerical-maxval", "Value too large.  Maximum value is '{0}'."),
    ("one-choice-required", "Please select at least one of the choices."),
    ("choice-invalid", "Invalid choice: '{0}'."),
    (
        "date-invalid-format",
        "Invalid format for date: '{0}'. Use YYYY-MM-DD format.",
    ),
    ("date-invalid-month", "Invalid month name: '{0}'."),
    ("date-invalid", "Invalid date: '{0}'."),
    ("file-invalid", "Invalid file upload."),
    ("display-unset", "(not set)"),
];

static BUILTIN_REGISTRY: LazyLock<Arc<MessageRegistry>> =
    LazyLock::new(|| Arc::new(MessageRegistry::builtin()));

/// Maps symbolic message keys to untranslated templates.
///
/// # Examples
///
/// ```
/// use atocha_rs_core::i18n::IdentityTranslator;
/// use atocha_rs_core::messages::MessageRegistry;
///
/// let registry = MessageRegistry::builtin();
/// let msg = registry.format("numerical-minval", &["10"], &IdentityTranslator);
/// assert_eq!(msg, "Value too small.  Minimum value is '10'.");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageRegistry {
    templates: HashMap<String, String>,
}

impl MessageRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in templates.
    pub fn builtin() -> Self {
        let templates = BUILTIN_MESSAGES
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { templates }
    }

    /// Returns the process-wide built-in registry, shared by every context
    /// that does not override its messages.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&BUILTIN_REGISTRY)
    }

    /// Replaces (or adds) the template for a key.
    #[must_use]
    pub fn with_message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.set(key, template);
        self
    }

    /// Replaces (or adds) the template for a key.
    pub fn set(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(key.into(), template.into());
    }

    /// Returns `true` if the registry has a template for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    /// Returns the raw, untranslated template for `key`.
    pub fn get_untranslated(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }

    /// Returns the translated template for `key`.
    ///
    /// An unknown key is a configuration defect; it is logged and the key
    /// itself is returned so that the problem is visible in the output.
    pub fn get(&self, key: &str, translator: &dyn Translator) -> String {
        self.get_untranslated(key).map_or_else(
            || {
                tracing::warn!(key, "unknown message key");
                key.to_string()
            },
            |template| translator.translate(template),
        )
    }

    /// Translates the template for `key` and substitutes positional arguments.
    pub fn format(&self, key: &str, args: &[&str], translator: &dyn Translator) -> String {
        interpolate(&self.get(key, translator), args)
    }
}

/// Substitutes `{0}`, `{1}`, ... placeholders with the given arguments.
///
/// Placeholders without a matching argument are left untouched.
pub fn interpolate(template: &str, args: &[&str]) -> String {
    let mut out = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        out = out.replace(&format!("{{{i}}}"), arg);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{CatalogTranslator, IdentityTranslator};

    #[test]
    fn test_builtin_keys_present() {
        let reg = MessageRegistry::builtin();
        for key in [
            "error-required-value",
            "error-invalid-encoding",
            "date-invalid-format",
            "date-invalid",
            "numerical-minval",
            "generic-ui-message",
        ] {
            assert!(reg.contains(key), "missing {key}");
        }
    }

    #[test]
    fn test_translation_happens_at_lookup() {
        let reg = MessageRegistry::builtin();
        let fr = CatalogTranslator::from_pairs(vec![("Submit", "Envoyer")]);
        assert_eq!(reg.get("submit-button", &IdentityTranslator), "Submit");
        assert_eq!(reg.get("submit-button", &fr), "Envoyer");
        assert_eq!(reg.get_untranslated("submit-button"), Some("Submit"));
    }

    #[test]
    fn test_format_substitutes_placeholders() {
        let reg = MessageRegistry::builtin();
        let msg = reg.format("date-invalid", &["2001-02-30"], &IdentityTranslator);
        assert_eq!(msg, "Invalid date: '2001-02-30'.");
    }

    #[test]
    fn test_override_message() {
        let reg = MessageRegistry::builtin().with_message("text-minlen", "Need {0} chars.");
        assert_eq!(
            reg.format("text-minlen", &["3"], &IdentityTranslator),
            "Need 3 chars."
        );
    }

    #[test]
    fn test_unknown_key_returns_key() {
        let reg = MessageRegistry::new();
        assert_eq!(reg.get("nope", &IdentityTranslator), "nope");
    }

    #[test]
    fn test_interpolate_leaves_unmatched() {
        assert_eq!(interpolate("{0} and {1}", &["a"]), "a and {1}");
    }
}
