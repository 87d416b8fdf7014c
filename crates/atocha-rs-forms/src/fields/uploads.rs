//! File upload fields.

use atocha_rs_core::context::RequestContext;
use atocha_rs_core::error::InternalError;

use super::{invalid, unexpected, FieldConverter, FieldKind, ParseFailure};
use crate::value::{RawValue, RenderValue, TypeSet, TypeTag, Value};

/// A file upload.
///
/// Browsers cannot be told which file to preselect, so the rendered value is
/// always empty, and read-only display never shows file contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileUploadField {
    /// Largest accepted file, in bytes.
    pub max_size: Option<usize>,
}

impl FileUploadField {
    /// Creates an upload field without a size limit.
    pub const fn new() -> Self {
        Self { max_size: None }
    }

    /// Sets the size limit.
    #[must_use]
    pub const fn max_size(mut self, bytes: usize) -> Self {
        self.max_size = Some(bytes);
        self
    }
}

impl FieldConverter for FileUploadField {
    fn kind(&self) -> FieldKind {
        FieldKind::FILE_UPLOAD
    }

    fn types_data(&self) -> TypeSet {
        TypeSet::of(&[TypeTag::Unset, TypeTag::File])
    }

    fn types_parse(&self) -> TypeSet {
        TypeSet::of(&[TypeTag::Unset, TypeTag::File, TypeTag::Text])
    }

    fn parse(&self, raw: &RawValue, ctx: &RequestContext) -> Result<Value, ParseFailure> {
        match raw {
            RawValue::Absent => Ok(Value::Unset),
            RawValue::File(file) if file.is_empty() => Ok(Value::Unset),
            RawValue::File(file) => {
                if self.max_size.is_some_and(|max| file.size() > max) {
                    return Err(invalid(ctx, "file-invalid", &[], &file.filename));
                }
                Ok(Value::File(file.clone()))
            }
            // A form posted without multipart encoding sends only the name.
            RawValue::Text(name) => Err(invalid(ctx, "file-invalid", &[], name)),
            RawValue::List(_) => Err(InternalError::new("several files under one name").into()),
        }
    }

    fn render(&self, value: &Value) -> Result<RenderValue, InternalError> {
        match value {
            Value::Unset | Value::File(_) => Ok(RenderValue::Text(String::new())),
            other => Err(unexpected(self.kind(), other)),
        }
    }

    fn display(&self, value: &Value, _ctx: &RequestContext) -> Result<String, InternalError> {
        match value {
            Value::Unset => Ok(String::new()),
            Value::File(file) => Ok(file.filename.clone()),
            other => Err(unexpected(self.kind(), other)),
        }
    }

    fn css_class(&self) -> &'static str {
        "file"
    }
}
