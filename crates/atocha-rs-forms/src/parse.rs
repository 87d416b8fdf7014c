//! Parsing submitted data against a form.
//!
//! [`FormParser::parse`] walks every field of a form and produces a
//! [`ParsedForm`]: native values for the fields that validated, and an
//! [`ErrorMap`] for those that did not. Field validation errors are always
//! collected, never returned as `Err`; only contract violations abort
//! parsing.
//!
//! For each field, in order:
//!
//! 1. Undecodable bytes produce `error-invalid-encoding`.
//! 2. Absent or empty input on a required field produces
//!    `error-required-value`; on an optional field it produces nothing.
//! 3. Otherwise the field parses the input, and a rejection records the
//!    message along with the submitted text for redisplay.

use std::collections::HashMap;

use atocha_rs_core::context::RequestContext;
use atocha_rs_core::error::{AtochaError, AtochaResult};
use atocha_rs_core::logging;

use crate::fields::{Field, ParseFailure};
use crate::form::Form;
use crate::submitted::{Submitted, SubmittedData};
use crate::value::{RawValue, RenderValue, TypeTag, Value};

/// An error recorded against a field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorEntry {
    /// The message to show, if any.
    pub message: Option<String>,
    /// A value to redisplay instead of the field's native value.
    pub replacement: Option<RenderValue>,
}

impl ErrorEntry {
    /// An error with a message and a replacement value.
    pub fn new(message: impl Into<String>, replacement: Option<RenderValue>) -> Self {
        Self {
            message: Some(message.into()),
            replacement,
        }
    }
}

impl From<&str> for ErrorEntry {
    fn from(message: &str) -> Self {
        Self::new(message, None)
    }
}

impl From<String> for ErrorEntry {
    fn from(message: String) -> Self {
        Self::new(message, None)
    }
}

impl<M: Into<String>, R: Into<RenderValue>> From<(M, R)> for ErrorEntry {
    fn from((message, replacement): (M, R)) -> Self {
        Self::new(message, Some(replacement.into()))
    }
}

/// Field errors keyed by field name.
///
/// # Examples
///
/// ```
/// use atocha_rs_forms::parse::ErrorMap;
///
/// let mut errors = ErrorMap::new();
/// errors.insert("email", "Already registered.");
/// errors.insert("age", ("Too young.", "12"));
/// errors.insert("terms", true);
/// assert_eq!(errors.len(), 3);
/// assert!(errors.get("terms").unwrap().message.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorMap {
    entries: HashMap<String, ErrorEntry>,
}

impl ErrorMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error, normalizing any of the shorthand forms.
    ///
    /// A `false` flag means "no error" and removes any existing entry.
    pub fn insert(&mut self, name: impl Into<String>, entry: impl Into<ErrorEntryInput>) {
        let name = name.into();
        match entry.into().0 {
            Some(entry) => {
                self.entries.insert(name, entry);
            }
            None => {
                self.entries.remove(&name);
            }
        }
    }

    /// Returns the error for a field.
    pub fn get(&self, name: &str) -> Option<&ErrorEntry> {
        self.entries.get(name)
    }

    /// Returns `true` if the field has an error.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Removes and returns the error for a field.
    pub fn remove(&mut self, name: &str) -> Option<ErrorEntry> {
        self.entries.remove(name)
    }

    /// The number of fields with errors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(field name, error)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ErrorEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The names of the fields with errors, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Input accepted by [`ErrorMap::insert`].
#[derive(Debug)]
pub struct ErrorEntryInput(Option<ErrorEntry>);

/// `true` records an error with neither message nor replacement.
impl From<bool> for ErrorEntryInput {
    fn from(flag: bool) -> Self {
        Self(flag.then(ErrorEntry::default))
    }
}

impl From<ErrorEntry> for ErrorEntryInput {
    fn from(entry: ErrorEntry) -> Self {
        Self(Some(entry))
    }
}

impl From<&str> for ErrorEntryInput {
    fn from(message: &str) -> Self {
        Self(Some(message.into()))
    }
}

impl From<String> for ErrorEntryInput {
    fn from(message: String) -> Self {
        Self(Some(message.into()))
    }
}

impl<M: Into<String>, R: Into<RenderValue>> From<(M, R)> for ErrorEntryInput {
    fn from(pair: (M, R)) -> Self {
        Self(Some(pair.into()))
    }
}

/// The outcome of parsing a submission.
#[derive(Debug, Clone, Default)]
pub struct ParsedForm {
    /// Native values of the fields that validated.
    pub values: HashMap<String, Value>,
    /// Errors of the fields that did not.
    pub errors: ErrorMap,
}

impl ParsedForm {
    /// Returns `true` if no field has an error.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The native value of a field, if it validated.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The form-wide message to show above an invalid form.
    pub fn ui_message(&self, ctx: &RequestContext) -> Option<String> {
        (!self.is_valid()).then(|| ctx.message("generic-ui-message"))
    }
}

/// Parses submissions for one form.
#[derive(Debug, Clone, Copy)]
pub struct FormParser<'a> {
    form: &'a Form,
    ctx: &'a RequestContext,
}

impl<'a> FormParser<'a> {
    /// Creates a parser for `form` in the given request context.
    pub const fn new(form: &'a Form, ctx: &'a RequestContext) -> Self {
        Self { form, ctx }
    }

    /// Parses every field of the form.
    pub fn parse(&self, data: &SubmittedData) -> AtochaResult<ParsedForm> {
        let span = logging::parse_span(self.form.name());
        let _guard = span.enter();

        let mut parsed = ParsedForm::default();
        for field in self.form.fields() {
            match self.parse_field(field, data.get(field.name()))? {
                FieldOutcome::Value(value) => {
                    parsed.values.insert(field.name().to_string(), value);
                }
                FieldOutcome::Error(entry) => {
                    parsed.errors.insert(field.name(), entry);
                }
                FieldOutcome::Skipped => {}
            }
        }

        tracing::debug!(
            values = parsed.values.len(),
            errors = parsed.errors.len(),
            "form parsed"
        );
        Ok(parsed)
    }

    fn parse_field(&self, field: &Field, submitted: Option<&Submitted>) -> AtochaResult<FieldOutcome> {
        let Ok(raw) = decode(submitted) else {
            return Ok(self.error_outcome("error-invalid-encoding", None));
        };
        let raw = self.coerce(field, raw);

        let client_supplied = field.converter().client_supplied();
        if raw.is_empty() && !client_supplied {
            return Ok(self.missing(field));
        }

        if !field.parses(raw.type_tag()) {
            tracing::debug!(
                field = field.name(),
                submitted = %raw.type_tag(),
                "submitted value type not accepted by field"
            );
            return Ok(self.error_outcome("generic-value-error", None));
        }

        match field.parse(&raw, self.ctx) {
            Ok(Value::Unset) => Ok(self.missing(field)),
            Ok(value) => Ok(FieldOutcome::Value(value)),
            Err(ParseFailure::Invalid(err)) => {
                tracing::debug!(field = field.name(), key = %err.key, "field rejected");
                let replacement = raw.to_render().map(|r| {
                    if field.converter().types_render().contains(TypeTag::List) {
                        r.into_list()
                    } else {
                        r
                    }
                });
                Ok(FieldOutcome::Error(ErrorEntry::new(err.message, replacement)))
            }
            Err(ParseFailure::Internal(err)) => {
                tracing::error!(field = field.name(), error = %err, "field parse contract violation");
                Err(AtochaError::Internal(err))
            }
        }
    }

    /// Reduces a list to its last value for fields that take a single value.
    fn coerce(&self, field: &Field, raw: RawValue) -> RawValue {
        match raw {
            RawValue::List(mut items) if !field.parses(TypeTag::List) => {
                tracing::warn!(
                    form = self.form.name(),
                    field = field.name(),
                    count = items.len(),
                    "several values submitted for a single-valued field; keeping the last"
                );
                items.pop().map_or(RawValue::Absent, RawValue::Text)
            }
            other => other,
        }
    }

    fn missing(&self, field: &Field) -> FieldOutcome {
        if field.is_required() {
            self.error_outcome("error-required-value", None)
        } else {
            FieldOutcome::Skipped
        }
    }

    fn error_outcome(&self, key: &str, replacement: Option<RenderValue>) -> FieldOutcome {
        FieldOutcome::Error(ErrorEntry::new(self.ctx.message(key), replacement))
    }
}

enum FieldOutcome {
    Value(Value),
    Error(ErrorEntry),
    Skipped,
}

/// Decodes submitted bytes as UTF-8.
fn decode(submitted: Option<&Submitted>) -> Result<RawValue, std::string::FromUtf8Error> {
    Ok(match submitted {
        None => RawValue::Absent,
        Some(Submitted::Bytes(bytes)) => RawValue::Text(String::from_utf8(bytes.clone())?),
        Some(Submitted::List(items)) => RawValue::List(
            items
                .iter()
                .map(|b| String::from_utf8(b.clone()))
                .collect::<Result<_, _>>()?,
        ),
        Some(Submitted::File(file)) => RawValue::File(file.clone()),
    })
}

/// Parses `data` against `form`. Shorthand for [`FormParser::parse`].
pub fn parse(form: &Form, data: &SubmittedData, ctx: &RequestContext) -> AtochaResult<ParsedForm> {
    FormParser::new(form, ctx).parse(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{CheckboxesField, IntField, JsDateField, StringField};

    fn form() -> Form {
        Form::builder("t")
            .field(Field::new("name", StringField::new()).required())
            .field(Field::new("age", IntField::new()))
            .field(Field::new("colors", CheckboxesField::new([("r", "Red"), ("g", "Green")])))
            .build()
            .unwrap()
    }

    #[test]
    fn test_parse_valid() {
        let ctx = RequestContext::new();
        let data = SubmittedData::from_urlencoded("name=Ada&age=36&colors=r&colors=g");
        let parsed = parse(&form(), &data, &ctx).unwrap();
        assert!(parsed.is_valid());
        assert_eq!(parsed.value("name"), Some(&Value::from("Ada")));
        assert_eq!(parsed.value("age"), Some(&Value::Int(36)));
        assert_eq!(parsed.value("colors"), Some(&Value::from(vec!["r", "g"])));
        assert!(parsed.ui_message(&ctx).is_none());
    }

    #[test]
    fn test_required_and_optional_missing() {
        let ctx = RequestContext::new();
        let data = SubmittedData::from_urlencoded("name=&age=");
        let parsed = parse(&form(), &data, &ctx).unwrap();
        assert_eq!(
            parsed.errors.get("name").and_then(|e| e.message.as_deref()),
            Some("Missing value required.")
        );
        assert!(!parsed.values.contains_key("name"));
        assert!(!parsed.values.contains_key("age"));
        assert!(!parsed.errors.contains("age"));
        assert!(!parsed.errors.contains("colors"));
        assert_eq!(parsed.ui_message(&ctx).as_deref(), Some("Please fix errors below."));
    }

    #[test]
    fn test_whitespace_only_required_is_missing() {
        let ctx = RequestContext::new();
        let data = SubmittedData::from_urlencoded("name=+++");
        let parsed = parse(&form(), &data, &ctx).unwrap();
        assert_eq!(
            parsed.errors.get("name").and_then(|e| e.message.as_deref()),
            Some("Missing value required.")
        );
    }

    #[test]
    fn test_invalid_value_keeps_replacement() {
        let ctx = RequestContext::new();
        let data = SubmittedData::from_urlencoded("name=Ada&age=old&colors=x");
        let parsed = parse(&form(), &data, &ctx).unwrap();
        let age = parsed.errors.get("age").unwrap();
        assert_eq!(age.message.as_deref(), Some("Invalid number."));
        assert_eq!(age.replacement, Some(RenderValue::from("old")));
        let colors = parsed.errors.get("colors").unwrap();
        assert_eq!(colors.replacement, Some(RenderValue::List(vec!["x".into()])));
        assert_eq!(parsed.errors.names(), ["age", "colors"]);
    }

    #[test]
    fn test_invalid_encoding() {
        let ctx = RequestContext::new();
        let data = SubmittedData::from_urlencoded("name=%FF");
        let parsed = parse(&form(), &data, &ctx).unwrap();
        let entry = parsed.errors.get("name").unwrap();
        assert_eq!(
            entry.message.as_deref(),
            Some("Browser error: Invalid chars in expected encoding.")
        );
        assert!(entry.replacement.is_none());
    }

    #[test]
    fn test_list_for_single_field_keeps_last() {
        let ctx = RequestContext::new();
        let data = SubmittedData::from_urlencoded("name=a&name=b");
        let parsed = parse(&form(), &data, &ctx).unwrap();
        assert_eq!(parsed.value("name"), Some(&Value::from("b")));
    }

    #[test]
    fn test_client_supplied_missing_is_internal() {
        let ctx = RequestContext::new();
        let form = Form::builder("d")
            .field(Field::new("when", JsDateField::new()))
            .build()
            .unwrap();
        let err = parse(&form, &SubmittedData::new(), &ctx).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_error_map_shorthands() {
        let mut errors = ErrorMap::new();
        errors.insert("a", true);
        errors.insert("b", "bad");
        errors.insert("c", ("worse", "raw"));
        errors.insert("d", false);
        assert_eq!(errors.get("a"), Some(&ErrorEntry::default()));
        assert_eq!(errors.get("b").unwrap().message.as_deref(), Some("bad"));
        assert!(errors.get("b").unwrap().replacement.is_none());
        assert_eq!(
            errors.get("c").unwrap().replacement,
            Some(RenderValue::from("raw"))
        );
        assert!(!errors.contains("d"));
        errors.insert("a", false);
        assert!(!errors.contains("a"));
    }
}
