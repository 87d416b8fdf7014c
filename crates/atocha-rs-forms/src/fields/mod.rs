//! The field type hierarchy.
//!
//! A [`Field`] pairs identity and presentation attributes (name, label,
//! initial value, required flag, default state) with a [`FieldType`], the
//! closed set of built-in input kinds. Every kind implements the
//! [`FieldConverter`] contract, which converts between the three value
//! domains and declares the type sets it accepts and produces:
//!
//! - `parse`: [`RawValue`] to [`Value`], failing with a user-facing
//!   [`FieldError`] or, for impossible client input, an [`InternalError`].
//! - `render`: [`Value`] to [`RenderValue`], total over the declared data set.
//! - `display`: [`Value`] to human-readable text for read-only output.
//!
//! Applications add their own kinds by implementing [`FieldConverter`] and
//! wrapping it in [`FieldType::Custom`].

pub mod choices;
pub mod numeric;
pub mod temporal;
pub mod texts;
pub mod uploads;

use std::fmt;
use std::sync::Arc;

use atocha_rs_core::context::RequestContext;
use atocha_rs_core::error::{FieldError, InternalError};

use crate::value::{RawValue, RenderValue, TypeSet, TypeTag, Value};

pub use choices::{
    BoolField, CheckboxesField, ListboxField, MenuField, Orientation, RadioField,
};
pub use numeric::{FloatField, IntField};
pub use temporal::{DateField, JsDateField};
pub use texts::{EmailField, PasswordField, StringField, TextAreaField, UrlField};
pub use uploads::FileUploadField;

/// Identifies a field kind for render dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKind(&'static str);

impl FieldKind {
    /// Single-line text input.
    pub const STRING: Self = Self("string");
    /// Multi-line text input.
    pub const TEXTAREA: Self = Self("textarea");
    /// Masked text input.
    pub const PASSWORD: Self = Self("password");
    /// Email address.
    pub const EMAIL: Self = Self("email");
    /// Absolute URL.
    pub const URL: Self = Self("url");
    /// Integer.
    pub const INT: Self = Self("int");
    /// Floating point number.
    pub const FLOAT: Self = Self("float");
    /// Checkbox.
    pub const BOOL: Self = Self("bool");
    /// Radio buttons.
    pub const RADIO: Self = Self("radio");
    /// Drop-down menu.
    pub const MENU: Self = Self("menu");
    /// Multiple checkboxes.
    pub const CHECKBOXES: Self = Self("checkboxes");
    /// List box.
    pub const LISTBOX: Self = Self("listbox");
    /// Free-form date.
    pub const DATE: Self = Self("date");
    /// Script-assisted date widget.
    pub const JSDATE: Self = Self("jsdate");
    /// File upload.
    pub const FILE_UPLOAD: Self = Self("file-upload");

    /// Every built-in kind.
    pub const BUILTIN: [Self; 15] = [
        Self::STRING,
        Self::TEXTAREA,
        Self::PASSWORD,
        Self::EMAIL,
        Self::URL,
        Self::INT,
        Self::FLOAT,
        Self::BOOL,
        Self::RADIO,
        Self::MENU,
        Self::CHECKBOXES,
        Self::LISTBOX,
        Self::DATE,
        Self::JSDATE,
        Self::FILE_UPLOAD,
    ];

    /// Creates a kind for an application-defined field.
    pub const fn custom(name: &'static str) -> Self {
        Self(name)
    }

    /// The kind name.
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// How a field is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldState {
    /// Editable.
    #[default]
    Normal,
    /// Sent back as a hidden input.
    Hidden,
    /// Shown but not editable.
    ReadOnly,
    /// Shown greyed out; not submitted by browsers.
    Disabled,
}

impl FieldState {
    /// Returns `true` for [`FieldState::Normal`].
    pub const fn is_normal(self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// A client-side script a field depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Script {
    /// File name under the configured scripts URL.
    pub filename: &'static str,
    /// A notice that must be reproduced alongside the script reference.
    pub notice: &'static str,
}

/// Why a field failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// The user submitted an invalid value.
    Invalid(FieldError),
    /// The submitted data is structurally impossible.
    Internal(InternalError),
}

impl From<FieldError> for ParseFailure {
    fn from(err: FieldError) -> Self {
        Self::Invalid(err)
    }
}

impl From<InternalError> for ParseFailure {
    fn from(err: InternalError) -> Self {
        Self::Internal(err)
    }
}

/// Builds a user-facing failure from a message key and its arguments.
pub(crate) fn invalid(ctx: &RequestContext, key: &str, args: &[&str], raw: &str) -> ParseFailure {
    ParseFailure::Invalid(FieldError::new(
        key,
        ctx.format_message(key, args),
        Some(raw.to_string()),
    ))
}

/// Returns the single text of a raw value, or `None` when absent.
///
/// Parsers receive only raw values listed in their parse type set, so any
/// other shape is a contract violation.
pub(crate) fn raw_text<'r>(
    kind: FieldKind,
    raw: &'r RawValue,
) -> Result<Option<&'r str>, ParseFailure> {
    match raw {
        RawValue::Absent => Ok(None),
        RawValue::Text(s) => Ok(Some(s)),
        other => Err(ParseFailure::Internal(InternalError::new(format!(
            "field kind '{kind}' cannot parse a {} value",
            other.type_tag()
        )))),
    }
}

/// Error for a native value a converter was not declared to handle.
pub(crate) fn unexpected(kind: FieldKind, value: &Value) -> InternalError {
    InternalError::new(format!(
        "field kind '{kind}' cannot render a {} value",
        value.type_tag()
    ))
}

/// The conversion contract implemented by every field kind.
pub trait FieldConverter: Send + Sync + fmt::Debug {
    /// The dispatch kind.
    fn kind(&self) -> FieldKind;

    /// The kind whose render routines serve this one when it has none of
    /// its own.
    fn render_as(&self) -> Option<FieldKind> {
        Some(FieldKind::STRING)
    }

    /// Acceptable native values.
    fn types_data(&self) -> TypeSet;

    /// Acceptable raw inputs.
    fn types_parse(&self) -> TypeSet {
        TypeSet::UNSET_TEXT
    }

    /// Values `render` may produce.
    fn types_render(&self) -> TypeSet {
        TypeSet::TEXT
    }

    /// Converts submitted input into a native value.
    ///
    /// Returns [`Value::Unset`] when the input means "not submitted".
    fn parse(&self, raw: &RawValue, ctx: &RequestContext) -> Result<Value, ParseFailure>;

    /// Converts a native value into its markup value. [`Value::Unset`]
    /// must always be accepted.
    fn render(&self, value: &Value) -> Result<RenderValue, InternalError>;

    /// Converts a native value into text for read-only display.
    fn display(&self, value: &Value, ctx: &RequestContext) -> Result<String, InternalError>;

    /// CSS class for the input element.
    fn css_class(&self) -> &'static str;

    /// Scripts the editable widget needs in the page head.
    fn scripts(&self) -> &'static [Script] {
        &[]
    }

    /// Whether a client-side widget always supplies a value, so that absent
    /// input is a defect rather than an omission.
    fn client_supplied(&self) -> bool {
        false
    }

    /// Checks the options and the field name; called when a form is built.
    fn validate(&self, _name: &str) -> Result<(), String> {
        Ok(())
    }
}

/// The closed set of field kinds, plus an extension point.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// See [`StringField`].
    String(StringField),
    /// See [`TextAreaField`].
    TextArea(TextAreaField),
    /// See [`PasswordField`].
    Password(PasswordField),
    /// See [`EmailField`].
    Email(EmailField),
    /// See [`UrlField`].
    Url(UrlField),
    /// See [`IntField`].
    Int(IntField),
    /// See [`FloatField`].
    Float(FloatField),
    /// See [`BoolField`].
    Bool(BoolField),
    /// See [`RadioField`].
    Radio(RadioField),
    /// See [`MenuField`].
    Menu(MenuField),
    /// See [`CheckboxesField`].
    Checkboxes(CheckboxesField),
    /// See [`ListboxField`].
    Listbox(ListboxField),
    /// See [`DateField`].
    Date(DateField),
    /// See [`JsDateField`].
    JsDate(JsDateField),
    /// See [`FileUploadField`].
    FileUpload(FileUploadField),
    /// An application-defined kind.
    Custom(Arc<dyn FieldConverter>),
}

impl FieldType {
    /// The converter implementing this kind.
    pub fn converter(&self) -> &dyn FieldConverter {
        match self {
            Self::String(f) => f,
            Self::TextArea(f) => f,
            Self::Password(f) => f,
            Self::Email(f) => f,
            Self::Url(f) => f,
            Self::Int(f) => f,
            Self::Float(f) => f,
            Self::Bool(f) => f,
            Self::Radio(f) => f,
            Self::Menu(f) => f,
            Self::Checkboxes(f) => f,
            Self::Listbox(f) => f,
            Self::Date(f) => f,
            Self::JsDate(f) => f,
            Self::FileUpload(f) => f,
            Self::Custom(f) => f.as_ref(),
        }
    }
}

macro_rules! impl_from_field_type {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for FieldType {
                fn from(f: $ty) -> Self {
                    Self::$variant(f)
                }
            }
        )*
    };
}

impl_from_field_type!(
    String(StringField),
    TextArea(TextAreaField),
    Password(PasswordField),
    Email(EmailField),
    Url(UrlField),
    Int(IntField),
    Float(FloatField),
    Bool(BoolField),
    Radio(RadioField),
    Menu(MenuField),
    Checkboxes(CheckboxesField),
    Listbox(ListboxField),
    Date(DateField),
    JsDate(JsDateField),
    FileUpload(FileUploadField),
);

/// A named, typed input of a form.
///
/// # Examples
///
/// ```
/// use atocha_rs_forms::fields::{Field, IntField};
///
/// let age = Field::new("age", IntField::new().min(0))
///     .with_label("Your age")
///     .required();
/// assert_eq!(age.name(), "age");
/// assert!(age.is_required());
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    label: Option<String>,
    initial: Value,
    required: bool,
    state: FieldState,
    field_type: FieldType,
}

impl Field {
    /// Creates an optional, editable field with no label and no initial
    /// value.
    pub fn new(name: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            label: None,
            initial: Value::Unset,
            required: false,
            state: FieldState::Normal,
            field_type: field_type.into(),
        }
    }

    /// Sets the untranslated label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the value rendered when no value is supplied.
    #[must_use]
    pub fn with_initial(mut self, initial: impl Into<Value>) -> Self {
        self.initial = initial.into();
        self
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the default presentation state.
    #[must_use]
    pub const fn with_state(mut self, state: FieldState) -> Self {
        self.state = state;
        self
    }

    /// Shorthand for `with_state(FieldState::Hidden)`.
    #[must_use]
    pub const fn hidden(self) -> Self {
        self.with_state(FieldState::Hidden)
    }

    /// The field name, also the submitted parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The untranslated label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The initial value.
    pub const fn initial(&self) -> &Value {
        &self.initial
    }

    /// Whether a value must be submitted.
    pub fn is_required(&self) -> bool {
        self.required || self.converter().client_supplied()
    }

    /// The default presentation state.
    pub const fn state(&self) -> FieldState {
        self.state
    }

    /// Whether the default state is hidden.
    pub const fn is_hidden(&self) -> bool {
        matches!(self.state, FieldState::Hidden)
    }

    /// The field type.
    pub const fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// The converter implementing the field type.
    pub fn converter(&self) -> &dyn FieldConverter {
        self.field_type.converter()
    }

    /// The dispatch kind.
    pub fn kind(&self) -> FieldKind {
        self.converter().kind()
    }

    /// Whether `value` belongs to the declared data set. [`Value::Unset`]
    /// is always accepted for rendering.
    pub fn accepts(&self, value: &Value) -> bool {
        value.is_unset() || self.converter().types_data().contains(value.type_tag())
    }

    /// Checks name, options and initial value.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("field name must not be empty".to_string());
        }
        self.converter()
            .validate(&self.name)
            .map_err(|e| format!("field '{}': {e}", self.name))?;
        if !self.accepts(&self.initial) {
            return Err(format!(
                "field '{}': initial value of type {} is not in {}",
                self.name,
                self.initial.type_tag(),
                self.converter().types_data()
            ));
        }
        Ok(())
    }

    /// Parses a raw value, checking the result against the declared data set.
    pub fn parse(&self, raw: &RawValue, ctx: &RequestContext) -> Result<Value, ParseFailure> {
        let value = self.converter().parse(raw, ctx)?;
        if !value.is_unset() && !self.converter().types_data().contains(value.type_tag()) {
            return Err(ParseFailure::Internal(InternalError::new(format!(
                "field '{}' parsed a {} value, expected one of {}",
                self.name,
                value.type_tag(),
                self.converter().types_data()
            ))));
        }
        Ok(value)
    }

    /// Renders a native value, checking the result against the declared
    /// render set.
    pub fn render_value(&self, value: &Value) -> Result<RenderValue, InternalError> {
        let rendered = self.converter().render(value)?;
        let allowed = self.converter().types_render();
        if !allowed.contains(rendered.type_tag()) {
            return Err(InternalError::new(format!(
                "field '{}' rendered a {} value, expected one of {allowed}",
                self.name,
                rendered.type_tag()
            )));
        }
        Ok(rendered)
    }

    /// Converts a native value into display text.
    pub fn display_value(&self, value: &Value, ctx: &RequestContext) -> Result<String, InternalError> {
        self.converter().display(value, ctx)
    }

    /// Whether `tag` is an acceptable raw input type.
    pub(crate) fn parses(&self, tag: TypeTag) -> bool {
        self.converter().types_parse().contains(tag)
    }
}
