//! Error types for the atocha-rs form library.
//!
//! Three families of errors are kept apart at the type level:
//!
//! - [`FieldError`]: a user typed something that does not validate. These are
//!   collected into the parser's error map and never abort an operation.
//! - [`InternalError`]: the library, its configuration, or a client-side widget
//!   broke one of the core's own contracts. These are defects to fix.
//! - [`AtochaError`]: the top-level error returned by fallible public APIs,
//!   covering misuse of the API (rendering without an action, asking for a
//!   field that does not exist, ...) and wrapping internal errors.

use std::fmt;

use thiserror::Error;

/// A user-facing validation failure for a single field.
///
/// The `key` names the entry of the message registry the message was built
/// from, so that callers can recognize error classes without comparing
/// translated text.
///
/// # Examples
///
/// ```
/// use atocha_rs_core::error::FieldError;
///
/// let err = FieldError::new("numerical-invalid", "Invalid number.", Some("abc".into()));
/// assert_eq!(err.key, "numerical-invalid");
/// assert_eq!(err.to_string(), "Invalid number.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The message registry key this error was raised with.
    pub key: String,
    /// The formatted, translated message.
    pub message: String,
    /// The offending raw value, redisplayed in place of the rejected input.
    pub raw: Option<String>,
}

impl FieldError {
    /// Creates a new `FieldError`.
    pub fn new(key: impl Into<String>, message: impl Into<String>, raw: Option<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
            raw,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FieldError {}

/// A violation of the library's own invariants.
///
/// Raised when a field converter produces a value outside its declared type
/// set, when a field is rendered twice, or when a client-side widget submits
/// structurally impossible data. These are never shown to end users.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Internal error: {0}")]
pub struct InternalError(pub String);

impl InternalError {
    /// Creates a new `InternalError` with the given description.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The primary error type for atocha-rs.
#[derive(Error, Debug)]
pub enum AtochaError {
    /// Misuse of the public API (e.g. rendering a form without an action).
    #[error("Form error: {0}")]
    Form(String),

    /// A field name that does not exist in the form was requested.
    #[error("Field not present in form: {0}")]
    UnknownField(String),

    /// A contract violation inside the library or its configuration.
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// A render routine was registered twice for the same pair.
    #[error("Render routine already registered for renderer '{renderer}', field '{field}'")]
    DuplicateRoutine {
        /// The renderer kind.
        renderer: String,
        /// The field kind.
        field: String,
    },

    /// No render routine exists for the pair, not even through an alias.
    #[error("Missing rendering routine for renderer '{renderer}', field '{field}'")]
    MissingRoutine {
        /// The renderer kind.
        renderer: String,
        /// The field kind.
        field: String,
    },

    /// A render session ended without rendering every field of its form.
    #[error("Form renderer for form '{form}' did not render form completely (missing: {})", missing.join(", "))]
    IncompleteRender {
        /// The name of the form.
        form: String,
        /// The names of the fields that were never rendered, sorted.
        missing: Vec<String>,
    },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Writing to the output sink failed.
    #[error("Output error: {0}")]
    Fmt(#[from] fmt::Error),
}

impl AtochaError {
    /// Returns `true` if this error signals a defect rather than API misuse.
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Internal(_) | Self::MissingRoutine { .. } | Self::DuplicateRoutine { .. }
        )
    }
}

/// A convenience type alias for `Result<T, AtochaError>`.
pub type AtochaResult<T> = Result<T, AtochaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_display() {
        let err = FieldError::new("text-minlen", "String too short.", Some("ab".into()));
        assert_eq!(err.to_string(), "String too short.");
        assert_eq!(err.raw.as_deref(), Some("ab"));
    }

    #[test]
    fn test_internal_error_converts() {
        let err: AtochaError = InternalError::new("bad value").into();
        assert!(err.is_internal());
        assert_eq!(err.to_string(), "Internal error: bad value");
    }

    #[test]
    fn test_incomplete_render_lists_missing() {
        let err = AtochaError::IncompleteRender {
            form: "signup".into(),
            missing: vec!["c".into(), "d".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("signup"));
        assert!(msg.contains("missing: c, d"));
        assert!(!err.is_internal());
    }

    #[test]
    fn test_missing_routine_display() {
        let err = AtochaError::MissingRoutine {
            renderer: "text-form".into(),
            field: "color".into(),
        };
        assert!(err.to_string().contains("'text-form'"));
        assert!(err.to_string().contains("'color'"));
        assert!(err.is_internal());
    }

    #[test]
    fn test_fmt_error_conversion() {
        let err: AtochaError = fmt::Error.into();
        assert!(matches!(err, AtochaError::Fmt(_)));
    }
}
