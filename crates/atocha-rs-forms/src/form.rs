//! Form schemas.
//!
//! A [`Form`] is an ordered collection of uniquely named [`Field`]s plus the
//! form-level attributes needed to render its container and buttons. Forms
//! are built once, typically at startup, and are immutable afterwards.

use std::collections::HashMap;
use std::fmt;

use atocha_rs_core::error::{AtochaError, AtochaResult};

use crate::fields::{Field, FieldKind, Script};

/// The HTTP method a form submits with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    #[default]
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// The submit button(s) of a form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Submit {
    /// A single button labelled with the `submit-button` message.
    #[default]
    Default,
    /// A single button with an untranslated label.
    Label(String),
    /// Several named buttons, as `(label, name)` pairs; the name tells the
    /// application which one was pressed.
    Buttons(Vec<(String, String)>),
}

impl From<&str> for Submit {
    fn from(label: &str) -> Self {
        Self::Label(label.to_string())
    }
}

/// A form schema.
///
/// # Examples
///
/// ```
/// use atocha_rs_forms::fields::{DateField, Field, StringField};
/// use atocha_rs_forms::form::Form;
///
/// let form = Form::builder("signup")
///     .field(Field::new("name", StringField::new()).required())
///     .field(Field::new("birthday", DateField::new()))
///     .action("/signup")
///     .build()
///     .unwrap();
/// assert_eq!(form.names(), vec!["name", "birthday"]);
/// ```
#[derive(Debug, Clone)]
pub struct Form {
    name: String,
    fields: Vec<Field>,
    index: HashMap<String, usize>,
    action: Option<String>,
    method: Method,
    submit: Submit,
    reset: Option<String>,
    accept_charset: Option<String>,
    enctype: Option<String>,
}

impl Form {
    /// Starts building a form.
    pub fn builder(name: impl Into<String>) -> FormBuilder {
        FormBuilder::new(name)
    }

    /// The form name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fields, in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The field names, in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(Field::name).collect()
    }

    /// Looks up a field by name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Looks up a field by name, failing if it does not exist.
    pub fn field(&self, name: &str) -> AtochaResult<&Field> {
        self.get(name)
            .ok_or_else(|| AtochaError::UnknownField(name.to_string()))
    }

    /// The number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the form has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The action (URL or symbolic token), if any.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// The submit method.
    pub const fn method(&self) -> Method {
        self.method
    }

    /// The submit button(s).
    pub const fn submit(&self) -> &Submit {
        &self.submit
    }

    /// The reset button label, if the form has one.
    pub fn reset(&self) -> Option<&str> {
        self.reset.as_deref()
    }

    /// The accepted character set, if declared.
    pub fn accept_charset(&self) -> Option<&str> {
        self.accept_charset.as_deref()
    }

    /// The encoding type, if any.
    pub fn enctype(&self) -> Option<&str> {
        self.enctype.as_deref()
    }

    /// Selects fields for rendering.
    ///
    /// With `only`, the named fields are returned in the given order;
    /// otherwise all fields in declaration order. Fields named in `ignore`
    /// are then removed. Unknown names are an error.
    pub fn select_fields(
        &self,
        only: Option<&[&str]>,
        ignore: Option<&[&str]>,
    ) -> AtochaResult<Vec<&Field>> {
        let mut selected = match only {
            Some(names) => names
                .iter()
                .map(|n| self.field(n))
                .collect::<AtochaResult<Vec<_>>>()?,
            None => self.fields.iter().collect(),
        };
        if let Some(names) = ignore {
            for name in names {
                self.field(name)?;
            }
            selected.retain(|f| !names.contains(&f.name()));
        }
        Ok(selected)
    }

    /// The scripts required by the fields, without duplicates, in field
    /// order.
    pub fn scripts(&self) -> Vec<Script> {
        let mut scripts: Vec<Script> = Vec::new();
        for script in self.fields.iter().flat_map(|f| f.converter().scripts()) {
            if !scripts.iter().any(|s| s.filename == script.filename) {
                scripts.push(*script);
            }
        }
        scripts
    }

    /// Returns `true` if any field is a file upload.
    pub fn has_file_upload(&self) -> bool {
        self.fields.iter().any(|f| f.kind() == FieldKind::FILE_UPLOAD)
    }
}

/// Builder for [`Form`].
#[derive(Debug)]
pub struct FormBuilder {
    name: String,
    fields: Vec<Field>,
    action: Option<String>,
    method: Method,
    submit: Submit,
    reset: Option<String>,
    accept_charset: Option<String>,
    enctype: Option<String>,
}

impl FormBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            action: None,
            method: Method::default(),
            submit: Submit::default(),
            reset: None,
            accept_charset: None,
            enctype: None,
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends several fields.
    #[must_use]
    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Sets the action.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the method.
    #[must_use]
    pub const fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the submit button(s).
    #[must_use]
    pub fn submit(mut self, submit: impl Into<Submit>) -> Self {
        self.submit = submit.into();
        self
    }

    /// Adds a reset button with the given untranslated label.
    #[must_use]
    pub fn reset(mut self, label: impl Into<String>) -> Self {
        self.reset = Some(label.into());
        self
    }

    /// Sets the accepted character set.
    #[must_use]
    pub fn accept_charset(mut self, charset: impl Into<String>) -> Self {
        self.accept_charset = Some(charset.into());
        self
    }

    /// Sets the encoding type.
    #[must_use]
    pub fn enctype(mut self, enctype: impl Into<String>) -> Self {
        self.enctype = Some(enctype.into());
        self
    }

    /// Validates the fields and builds the form.
    ///
    /// Fails on duplicate field names, on field options that contradict
    /// each other, and on initial values outside a field's data types.
    pub fn build(self) -> AtochaResult<Form> {
        let mut index = HashMap::with_capacity(self.fields.len());
        for (i, field) in self.fields.iter().enumerate() {
            field
                .validate()
                .map_err(|e| AtochaError::Form(format!("form '{}': {e}", self.name)))?;
            if index.insert(field.name().to_string(), i).is_some() {
                return Err(AtochaError::Form(format!(
                    "form '{}': duplicate field name '{}'",
                    self.name,
                    field.name()
                )));
            }
        }

        let has_upload = self.fields.iter().any(|f| f.kind() == FieldKind::FILE_UPLOAD);
        let enctype = self
            .enctype
            .or_else(|| has_upload.then(|| "multipart/form-data".to_string()));

        tracing::debug!(form = %self.name, fields = self.fields.len(), "form built");

        Ok(Form {
            name: self.name,
            fields: self.fields,
            index,
            action: self.action,
            method: self.method,
            submit: self.submit,
            reset: self.reset,
            accept_charset: self.accept_charset,
            enctype,
        })
    }
}
