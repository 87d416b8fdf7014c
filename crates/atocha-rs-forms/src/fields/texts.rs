//! Text input fields.

use std::sync::LazyLock;

use atocha_rs_core::context::RequestContext;
use atocha_rs_core::error::InternalError;
use regex::Regex;

use super::{invalid, raw_text, unexpected, FieldConverter, FieldKind, ParseFailure};
use crate::value::{RawValue, RenderValue, TypeSet, TypeTag, Value};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid regex")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://[^\s/$.?#][^\s]*$").expect("valid regex")
});

const TEXT_DATA: TypeSet = TypeSet::of(&[TypeTag::Unset, TypeTag::Text]);

fn render_text(kind: FieldKind, value: &Value) -> Result<RenderValue, InternalError> {
    match value {
        Value::Unset => Ok(RenderValue::Text(String::new())),
        Value::Text(s) => Ok(RenderValue::Text(s.clone())),
        other => Err(unexpected(kind, other)),
    }
}

fn display_text(kind: FieldKind, value: &Value) -> Result<String, InternalError> {
    match value {
        Value::Unset => Ok(String::new()),
        Value::Text(s) => Ok(s.clone()),
        other => Err(unexpected(kind, other)),
    }
}

fn whole_match(re: &Regex, value: &str) -> bool {
    re.find(value)
        .is_some_and(|m| m.start() == 0 && m.end() == value.len())
}

/// A single-line text input.
///
/// # Examples
///
/// ```
/// use atocha_rs_core::context::RequestContext;
/// use atocha_rs_forms::fields::{FieldConverter, StringField};
/// use atocha_rs_forms::value::{RawValue, Value};
///
/// let field = StringField::new().max_len(5);
/// let ctx = RequestContext::new();
/// assert_eq!(field.parse(&RawValue::from("  hi "), &ctx).unwrap(), Value::from("hi"));
/// assert!(field.parse(&RawValue::from("too long"), &ctx).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct StringField {
    /// Minimum length in characters.
    pub min_len: Option<usize>,
    /// Maximum length in characters.
    pub max_len: Option<usize>,
    /// A pattern the whole (stripped) value must match.
    pub allowed_chars: Option<Regex>,
    /// Whether surrounding whitespace is removed before validation.
    pub strip: bool,
}

impl Default for StringField {
    fn default() -> Self {
        Self::new()
    }
}

impl StringField {
    /// Creates an unconstrained, stripping text field.
    pub fn new() -> Self {
        Self {
            min_len: None,
            max_len: None,
            allowed_chars: None,
            strip: true,
        }
    }

    /// Sets the minimum length.
    #[must_use]
    pub fn min_len(mut self, len: usize) -> Self {
        self.min_len = Some(len);
        self
    }

    /// Sets the maximum length.
    #[must_use]
    pub fn max_len(mut self, len: usize) -> Self {
        self.max_len = Some(len);
        self
    }

    /// Restricts the value to a pattern.
    #[must_use]
    pub fn allowed_chars(mut self, pattern: Regex) -> Self {
        self.allowed_chars = Some(pattern);
        self
    }

    /// Sets whether whitespace is stripped.
    #[must_use]
    pub fn strip(mut self, strip: bool) -> Self {
        self.strip = strip;
        self
    }

    /// Strips and validates a submitted text, returning `None` when nothing
    /// remains.
    pub(crate) fn clean<'t>(
        &self,
        text: &'t str,
        ctx: &RequestContext,
    ) -> Result<Option<&'t str>, ParseFailure> {
        let value = if self.strip { text.trim() } else { text };
        if value.is_empty() {
            return Ok(None);
        }
        let len = value.chars().count();
        if self.min_len.is_some_and(|min| len < min) {
            return Err(invalid(ctx, "text-minlen", &[], text));
        }
        if self.max_len.is_some_and(|max| len > max) {
            return Err(invalid(ctx, "text-maxlen", &[], text));
        }
        if let Some(re) = &self.allowed_chars {
            if !whole_match(re, value) {
                return Err(invalid(ctx, "text-invalid-chars", &[], text));
            }
        }
        Ok(Some(value))
    }

    fn check_options(&self) -> Result<(), String> {
        match (self.min_len, self.max_len) {
            (Some(min), Some(max)) if min > max => {
                Err(format!("min_len {min} is greater than max_len {max}"))
            }
            _ => Ok(()),
        }
    }
}

impl FieldConverter for StringField {
    fn kind(&self) -> FieldKind {
        FieldKind::STRING
    }

    fn render_as(&self) -> Option<FieldKind> {
        None
    }

    fn types_data(&self) -> TypeSet {
        TEXT_DATA
    }

    fn parse(&self, raw: &RawValue, ctx: &RequestContext) -> Result<Value, ParseFailure> {
        let Some(text) = raw_text(self.kind(), raw)? else {
            return Ok(Value::Unset);
        };
        Ok(self
            .clean(text, ctx)?
            .map_or(Value::Unset, |v| Value::Text(v.to_string())))
    }

    fn render(&self, value: &Value) -> Result<RenderValue, InternalError> {
        render_text(self.kind(), value)
    }

    fn display(&self, value: &Value, _ctx: &RequestContext) -> Result<String, InternalError> {
        display_text(self.kind(), value)
    }

    fn css_class(&self) -> &'static str {
        "string"
    }

    fn validate(&self, _name: &str) -> Result<(), String> {
        self.check_options()
    }
}

/// A multi-line text input.
#[derive(Debug, Clone)]
pub struct TextAreaField {
    /// Visible rows.
    pub rows: Option<u32>,
    /// Visible columns.
    pub cols: Option<u32>,
    /// Text constraints. Whitespace is kept by default.
    pub text: StringField,
}

impl Default for TextAreaField {
    fn default() -> Self {
        Self::new()
    }
}

impl TextAreaField {
    /// Creates a text area that keeps whitespace.
    pub fn new() -> Self {
        Self {
            rows: None,
            cols: None,
            text: StringField::new().strip(false),
        }
    }

    /// Sets the visible size.
    #[must_use]
    pub fn size(mut self, rows: u32, cols: u32) -> Self {
        self.rows = Some(rows);
        self.cols = Some(cols);
        self
    }

    /// Replaces the text constraints.
    #[must_use]
    pub fn with_text(mut self, text: StringField) -> Self {
        self.text = text;
        self
    }
}

impl FieldConverter for TextAreaField {
    fn kind(&self) -> FieldKind {
        FieldKind::TEXTAREA
    }

    fn types_data(&self) -> TypeSet {
        TEXT_DATA
    }

    fn parse(&self, raw: &RawValue, ctx: &RequestContext) -> Result<Value, ParseFailure> {
        let Some(text) = raw_text(self.kind(), raw)? else {
            return Ok(Value::Unset);
        };
        Ok(self
            .text
            .clean(text, ctx)?
            .map_or(Value::Unset, |v| Value::Text(v.to_string())))
    }

    fn render(&self, value: &Value) -> Result<RenderValue, InternalError> {
        render_text(self.kind(), value)
    }

    fn display(&self, value: &Value, _ctx: &RequestContext) -> Result<String, InternalError> {
        display_text(self.kind(), value)
    }

    fn css_class(&self) -> &'static str {
        "textarea"
    }

    fn validate(&self, _name: &str) -> Result<(), String> {
        self.text.check_options()
    }
}

/// A masked text input. The value is never shown in read-only display.
#[derive(Debug, Clone, Default)]
pub struct PasswordField {
    /// Text constraints.
    pub text: StringField,
}

impl PasswordField {
    /// Creates a password field.
    pub fn new() -> Self {
        Self {
            text: StringField::new(),
        }
    }

    /// Sets the minimum length.
    #[must_use]
    pub fn min_len(mut self, len: usize) -> Self {
        self.text.min_len = Some(len);
        self
    }
}

impl FieldConverter for PasswordField {
    fn kind(&self) -> FieldKind {
        FieldKind::PASSWORD
    }

    fn types_data(&self) -> TypeSet {
        TEXT_DATA
    }

    fn parse(&self, raw: &RawValue, ctx: &RequestContext) -> Result<Value, ParseFailure> {
        let Some(text) = raw_text(self.kind(), raw)? else {
            return Ok(Value::Unset);
        };
        Ok(self
            .text
            .clean(text, ctx)?
            .map_or(Value::Unset, |v| Value::Text(v.to_string())))
    }

    fn render(&self, value: &Value) -> Result<RenderValue, InternalError> {
        render_text(self.kind(), value)
    }

    fn display(&self, value: &Value, _ctx: &RequestContext) -> Result<String, InternalError> {
        let text = display_text(self.kind(), value)?;
        Ok("*".repeat(text.chars().count().min(8)))
    }

    fn css_class(&self) -> &'static str {
        "password"
    }

    fn validate(&self, _name: &str) -> Result<(), String> {
        self.text.check_options()
    }
}

/// An email address.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailField;

impl EmailField {
    /// Creates an email field.
    pub const fn new() -> Self {
        Self
    }
}

impl FieldConverter for EmailField {
    fn kind(&self) -> FieldKind {
        FieldKind::EMAIL
    }

    fn types_data(&self) -> TypeSet {
        TEXT_DATA
    }

    fn parse(&self, raw: &RawValue, ctx: &RequestContext) -> Result<Value, ParseFailure> {
        let Some(text) = raw_text(self.kind(), raw)? else {
            return Ok(Value::Unset);
        };
        let value = text.trim();
        if value.is_empty() {
            return Ok(Value::Unset);
        }
        if !value.contains('@') {
            return Err(invalid(ctx, "email-error-local", &[], text));
        }
        if !EMAIL_RE.is_match(value) {
            return Err(invalid(ctx, "email-invalid", &[], text));
        }
        Ok(Value::Text(value.to_string()))
    }

    fn render(&self, value: &Value) -> Result<RenderValue, InternalError> {
        render_text(self.kind(), value)
    }

    fn display(&self, value: &Value, _ctx: &RequestContext) -> Result<String, InternalError> {
        display_text(self.kind(), value)
    }

    fn css_class(&self) -> &'static str {
        "email"
    }
}

/// An absolute URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlField;

impl UrlField {
    /// Creates a URL field.
    pub const fn new() -> Self {
        Self
    }
}

impl FieldConverter for UrlField {
    fn kind(&self) -> FieldKind {
        FieldKind::URL
    }

    fn types_data(&self) -> TypeSet {
        TEXT_DATA
    }

    fn parse(&self, raw: &RawValue, ctx: &RequestContext) -> Result<Value, ParseFailure> {
        let Some(text) = raw_text(self.kind(), raw)? else {
            return Ok(Value::Unset);
        };
        let value = text.trim();
        if value.is_empty() {
            return Ok(Value::Unset);
        }
        if !URL_RE.is_match(value) {
            return Err(invalid(ctx, "url-invalid", &[value], text));
        }
        Ok(Value::Text(value.to_string()))
    }

    fn render(&self, value: &Value) -> Result<RenderValue, InternalError> {
        render_text(self.kind(), value)
    }

    fn display(&self, value: &Value, _ctx: &RequestContext) -> Result<String, InternalError> {
        display_text(self.kind(), value)
    }

    fn css_class(&self) -> &'static str {
        "url"
    }
}
