//! # atocha-rs-core
//!
//! Core types for the atocha-rs form library. This crate has no dependency on
//! the field or renderer machinery and provides the foundation for it.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`messages`] - The translatable message registry
//! - [`i18n`] - Translator hook and locale data
//! - [`context`] - Request-scoped configuration
//! - [`settings`] / [`settings_loader`] - Library settings and their loading
//! - [`logging`] - Tracing-based logging integration
//! - [`utils`] - HTML text helpers

pub mod context;
pub mod error;
pub mod i18n;
pub mod logging;
pub mod messages;
pub mod settings;
pub mod settings_loader;
pub mod utils;

pub use context::RequestContext;
pub use error::{AtochaError, AtochaResult, FieldError, InternalError};
pub use settings::Settings;
