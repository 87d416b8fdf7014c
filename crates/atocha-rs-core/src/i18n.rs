//! Translation hooks and locale data.
//!
//! Translation is injected rather than global: a [`Translator`] is carried by
//! the request-scoped [`RequestContext`](crate::context::RequestContext) and
//! applied at the time a message or label is produced. The default is the
//! identity function, so the library works unchanged in applications that are
//! not internationalized.
//!
//! [`LocaleData`] provides the ordered month and weekday names used to parse
//! natural-language dates and to format them for display.

use std::collections::HashMap;
use std::fmt;

use crate::error::{AtochaError, AtochaResult};

/// A message translation function.
///
/// Any `Fn(&str) -> String + Send + Sync` closure is a translator.
///
/// # Examples
///
/// ```
/// use atocha_rs_core::i18n::Translator;
///
/// let shout = |msgid: &str| msgid.to_uppercase();
/// assert_eq!(shout.translate("submit"), "SUBMIT");
/// ```
pub trait Translator: Send + Sync {
    /// Translates a message identifier, returning it unchanged if unknown.
    fn translate(&self, msgid: &str) -> String;
}

impl<F> Translator for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn translate(&self, msgid: &str) -> String {
        self(msgid)
    }
}

/// The no-op translator.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate(&self, msgid: &str) -> String {
        msgid.to_string()
    }
}

/// A translator backed by a msgid -> translation map.
///
/// # Examples
///
/// ```
/// use atocha_rs_core::i18n::{CatalogTranslator, Translator};
///
/// let catalog = CatalogTranslator::from_pairs(vec![("Submit", "Envoyer")]);
/// assert_eq!(catalog.translate("Submit"), "Envoyer");
/// assert_eq!(catalog.translate("Reset"), "Reset");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CatalogTranslator {
    messages: HashMap<String, String>,
}

impl CatalogTranslator {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog from `(msgid, translated)` pairs.
    pub fn from_pairs(entries: Vec<(&str, &str)>) -> Self {
        let messages = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { messages }
    }

    /// Loads a catalog from JSON.
    ///
    /// Accepts either `{"messages": {"msgid": "translated", ...}}` or a flat
    /// object of `msgid -> translated` pairs. Non-string values are ignored.
    pub fn from_json(json_str: &str) -> AtochaResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json_str)
            .map_err(|e| AtochaError::Configuration(format!("Invalid translation JSON: {e}")))?;

        let object = value
            .get("messages")
            .unwrap_or(&value)
            .as_object()
            .ok_or_else(|| {
                AtochaError::Configuration("Translation JSON must be an object".to_string())
            })?;

        let messages = object
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|t| (k.clone(), t.to_string())))
            .collect();
        Ok(Self { messages })
    }

    /// Adds or replaces a single translation.
    pub fn insert(&mut self, msgid: impl Into<String>, translated: impl Into<String>) {
        self.messages.insert(msgid.into(), translated.into());
    }

    /// Returns the number of translations in the catalog.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the catalog holds no translations.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Translator for CatalogTranslator {
    fn translate(&self, msgid: &str) -> String {
        self.messages
            .get(msgid)
            .cloned()
            .unwrap_or_else(|| msgid.to_string())
    }
}

/// Ordered month and weekday names for one locale.
///
/// Months are January-first, weekdays are Monday-first.
#[derive(Clone, PartialEq, Eq)]
pub struct LocaleData {
    language: String,
    months: Vec<String>,
    abbr_months: Vec<String>,
    weekdays: Vec<String>,
    abbr_weekdays: Vec<String>,
}

impl fmt::Debug for LocaleData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleData")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl Default for LocaleData {
    fn default() -> Self {
        Self::english()
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

impl LocaleData {
    /// Creates locale data from explicit name lists.
    ///
    /// Fails unless there are exactly 12 month names and 7 weekday names in
    /// each list.
    pub fn new(
        language: impl Into<String>,
        months: Vec<String>,
        abbr_months: Vec<String>,
        weekdays: Vec<String>,
        abbr_weekdays: Vec<String>,
    ) -> AtochaResult<Self> {
        if months.len() != 12 || abbr_months.len() != 12 {
            return Err(AtochaError::Configuration(
                "Locale data requires exactly 12 month names".to_string(),
            ));
        }
        if weekdays.len() != 7 || abbr_weekdays.len() != 7 {
            return Err(AtochaError::Configuration(
                "Locale data requires exactly 7 weekday names".to_string(),
            ));
        }
        Ok(Self {
            language: language.into(),
            months,
            abbr_months,
            weekdays,
            abbr_weekdays,
        })
    }

    /// English names.
    pub fn english() -> Self {
        Self {
            language: "en".to_string(),
            months: owned(&[
                "January", "February", "March", "April", "May", "June", "July", "August",
                "September", "October", "November", "December",
            ]),
            abbr_months: owned(&[
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ]),
            weekdays: owned(&[
                "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
            ]),
            abbr_weekdays: owned(&["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]),
        }
    }

    /// French names.
    pub fn french() -> Self {
        Self {
            language: "fr".to_string(),
            months: owned(&[
                "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août",
                "septembre", "octobre", "novembre", "décembre",
            ]),
            abbr_months: owned(&[
                "janv", "févr", "mars", "avr", "mai", "juin", "juil", "août", "sept", "oct", "nov",
                "déc",
            ]),
            weekdays: owned(&[
                "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
            ]),
            abbr_weekdays: owned(&["lun", "mar", "mer", "jeu", "ven", "sam", "dim"]),
        }
    }

    /// Returns the built-in locale data for a language code such as `"fr"`
    /// or `"en-us"`, falling back to English.
    pub fn for_language(code: &str) -> Self {
        let primary = code
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Self::english(),
            "fr" => Self::french(),
            _ => {
                tracing::warn!(language = code, "no locale data for language, using English");
                Self::english()
            }
        }
    }

    /// The language code these names belong to.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Full month names, January first.
    pub fn months(&self) -> &[String] {
        &self.months
    }

    /// Abbreviated month names, January first.
    pub fn abbr_months(&self) -> &[String] {
        &self.abbr_months
    }

    /// Full weekday names, Monday first.
    pub fn weekdays(&self) -> &[String] {
        &self.weekdays
    }

    /// Abbreviated weekday names, Monday first.
    pub fn abbr_weekdays(&self) -> &[String] {
        &self.abbr_weekdays
    }

    /// Resolves a month name to its number (1-12).
    ///
    /// Abbreviated names are tried before full names; matching ignores case.
    pub fn month_number(&self, name: &str) -> Option<u32> {
        let wanted = name.to_lowercase();
        let find = |names: &[String]| {
            names
                .iter()
                .position(|n| n.to_lowercase() == wanted)
                .and_then(|i| u32::try_from(i + 1).ok())
        };
        find(&self.abbr_months).or_else(|| find(&self.months))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_translator() {
        assert_eq!(IdentityTranslator.translate("Submit"), "Submit");
    }

    #[test]
    fn test_closure_translator() {
        let t = |s: &str| format!("[{s}]");
        assert_eq!(t.translate("x"), "[x]");
    }

    #[test]
    fn test_catalog_from_json_nested() {
        let cat = CatalogTranslator::from_json(r#"{"messages": {"Submit": "Absenden"}}"#).unwrap();
        assert_eq!(cat.translate("Submit"), "Absenden");
        assert_eq!(cat.len(), 1);
    }

    #[test]
    fn test_catalog_from_json_flat() {
        let cat = CatalogTranslator::from_json(r#"{"Reset": "Effacer", "n": 3}"#).unwrap();
        assert_eq!(cat.translate("Reset"), "Effacer");
        assert_eq!(cat.len(), 1);
    }

    #[test]
    fn test_catalog_from_json_invalid() {
        assert!(CatalogTranslator::from_json("not json").is_err());
        assert!(CatalogTranslator::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_month_number_prefers_abbreviation() {
        let en = LocaleData::english();
        assert_eq!(en.month_number("Sep"), Some(9));
        assert_eq!(en.month_number("september"), Some(9));
        assert_eq!(en.month_number("MAY"), Some(5));
        assert_eq!(en.month_number("Septembre"), None);
    }

    #[test]
    fn test_french_month_number() {
        let fr = LocaleData::french();
        assert_eq!(fr.month_number("Septembre"), Some(9));
        assert_eq!(fr.month_number("févr"), Some(2));
    }

    #[test]
    fn test_for_language_fallback() {
        assert_eq!(LocaleData::for_language("fr-ca").language(), "fr");
        assert_eq!(LocaleData::for_language("en-us").language(), "en");
        assert_eq!(LocaleData::for_language("xx").language(), "en");
    }

    #[test]
    fn test_locale_data_new_validates_lengths() {
        let result = LocaleData::new(
            "xx",
            vec!["a".into()],
            vec![],
            vec![],
            vec![],
        );
        assert!(matches!(result, Err(AtochaError::Configuration(_))));
    }
}
