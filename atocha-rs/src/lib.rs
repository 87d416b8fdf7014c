//! # atocha-rs
//!
//! Web forms for Rust: declare a form once, parse its submissions into typed
//! values with per-field errors, and render it as HTML through a pluggable
//! dispatch registry.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. You can depend on `atocha-rs` to get everything, or depend on the
//! individual crates for finer-grained control.

/// Errors, messages, i18n, settings and logging.
pub use atocha_rs_core as core;

/// Fields, forms, parsing and rendering.
#[cfg(feature = "forms")]
pub use atocha_rs_forms as forms;

/// Date types used by date fields.
pub use chrono;

/// Structured logging; see [`crate::core::logging`] for subscriber setup.
pub use tracing;

/// The most commonly used types, for glob import.
pub mod prelude {
    pub use atocha_rs_core::context::RequestContext;
    pub use atocha_rs_core::error::{AtochaError, AtochaResult};
    pub use atocha_rs_core::settings::Settings;

    #[cfg(feature = "forms")]
    pub use atocha_rs_forms::{
        fields::{
            BoolField, CheckboxesField, DateField, EmailField, FileUploadField, FloatField,
            IntField, JsDateField, ListboxField, MenuField, PasswordField, RadioField,
            StringField, TextAreaField, UrlField,
        },
        DisplayOptions, DisplayRenderer, ErrorMap, Field, FieldState, Form, FormParser,
        Method, ParsedForm, RenderOptions, SubmittedData, TextFormRenderer, Value,
    };
}
