//! Request-scoped configuration.
//!
//! A [`RequestContext`] carries everything that may change from one request
//! to the next: the translator, the locale data used for dates, the message
//! registry, and the action evaluator that turns symbolic action tokens into
//! URLs. It is passed explicitly to parsing and rendering, so no process-wide
//! mutable state is involved.

use std::fmt;
use std::sync::Arc;

use crate::i18n::{IdentityTranslator, LocaleData, Translator};
use crate::messages::MessageRegistry;
use crate::settings::Settings;

/// Turns a symbolic action into a URL.
pub type ActionEvaluator = dyn Fn(&str) -> String + Send + Sync;

/// Per-request configuration for parsing and rendering.
///
/// Cloning is cheap: the shared pieces are reference counted.
///
/// # Examples
///
/// ```
/// use atocha_rs_core::context::RequestContext;
///
/// let ctx = RequestContext::new()
///     .with_translator(|s: &str| s.to_uppercase())
///     .with_action_evaluator(|token: &str| format!("/app/{token}"));
/// assert_eq!(ctx.translate("Submit"), "SUBMIT");
/// assert_eq!(ctx.eval_action("save"), "/app/save");
/// ```
#[derive(Clone)]
pub struct RequestContext {
    translator: Arc<dyn Translator>,
    locale: Arc<LocaleData>,
    messages: Arc<MessageRegistry>,
    action_evaluator: Option<Arc<ActionEvaluator>>,
    completeness_checks: bool,
    scripts_url: String,
    label_colon: bool,
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("locale", &self.locale.language())
            .field("action_evaluator", &self.action_evaluator.is_some())
            .field("completeness_checks", &self.completeness_checks)
            .field("scripts_url", &self.scripts_url)
            .field("label_colon", &self.label_colon)
            .finish_non_exhaustive()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    /// Creates a context with the identity translator, English locale data
    /// and the built-in messages.
    pub fn new() -> Self {
        let defaults = Settings::default();
        Self {
            translator: Arc::new(IdentityTranslator),
            locale: Arc::new(LocaleData::english()),
            messages: MessageRegistry::shared(),
            action_evaluator: None,
            completeness_checks: defaults.completeness_checks,
            scripts_url: defaults.scripts_url,
            label_colon: defaults.label_colon,
        }
    }

    /// Creates a context from settings, selecting locale data by language.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            locale: Arc::new(LocaleData::for_language(&settings.language_code)),
            completeness_checks: settings.completeness_checks,
            scripts_url: settings.scripts_url.clone(),
            label_colon: settings.label_colon,
            ..Self::new()
        }
    }

    /// Sets the translator.
    #[must_use]
    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Arc::new(translator);
        self
    }

    /// Sets the locale data.
    #[must_use]
    pub fn with_locale(mut self, locale: LocaleData) -> Self {
        self.locale = Arc::new(locale);
        self
    }

    /// Sets the message registry.
    #[must_use]
    pub fn with_messages(mut self, messages: MessageRegistry) -> Self {
        self.messages = Arc::new(messages);
        self
    }

    /// Sets the action evaluator.
    #[must_use]
    pub fn with_action_evaluator<F>(mut self, evaluator: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.action_evaluator = Some(Arc::new(evaluator));
        self
    }

    /// Enables or disables render completeness checks.
    #[must_use]
    pub const fn with_completeness_checks(mut self, enabled: bool) -> Self {
        self.completeness_checks = enabled;
        self
    }

    /// Sets the base URL for client-side scripts.
    #[must_use]
    pub fn with_scripts_url(mut self, url: impl Into<String>) -> Self {
        self.scripts_url = url.into();
        self
    }

    /// Returns the translator.
    pub fn translator(&self) -> &dyn Translator {
        self.translator.as_ref()
    }

    /// Translates a message identifier.
    pub fn translate(&self, msgid: &str) -> String {
        self.translator.translate(msgid)
    }

    /// Returns the locale data.
    pub fn locale(&self) -> &LocaleData {
        &self.locale
    }

    /// Returns the message registry.
    pub fn messages(&self) -> &MessageRegistry {
        &self.messages
    }

    /// Looks up and translates a registry message.
    pub fn message(&self, key: &str) -> String {
        self.messages.get(key, self.translator())
    }

    /// Looks up, translates and formats a registry message.
    pub fn format_message(&self, key: &str, args: &[&str]) -> String {
        self.messages.format(key, args, self.translator())
    }

    /// Evaluates an action token into a URL (identity by default).
    pub fn eval_action(&self, action: &str) -> String {
        self.action_evaluator
            .as_ref()
            .map_or_else(|| action.to_string(), |eval| eval(action))
    }

    /// Whether render sessions verify completeness.
    pub const fn completeness_checks(&self) -> bool {
        self.completeness_checks
    }

    /// Base URL for client-side scripts.
    pub fn scripts_url(&self) -> &str {
        &self.scripts_url
    }

    /// Whether labels get a trailing colon.
    pub const fn label_colon(&self) -> bool {
        self.label_colon
    }
}
