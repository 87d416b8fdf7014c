//! # atocha-rs-forms
//!
//! Form schemas, typed parsing of submitted data, and rendering through a
//! dispatch registry.
//!
//! ## Modules
//!
//! - [`value`] - The raw, native and render value domains
//! - [`fields`] - Field kinds and their conversion contract
//! - [`form`] - Form schemas
//! - [`submitted`] - Submitted request data
//! - [`parse`] - Parsing submissions into values and errors
//! - [`registry`] - Render routine dispatch
//! - [`render`] - Editable and read-only renderers
//!
//! ## Example
//!
//! ```
//! use atocha_rs_core::RequestContext;
//! use atocha_rs_forms::fields::{DateField, Field, IntField};
//! use atocha_rs_forms::{Form, FormParser, SubmittedData, TextFormRenderer};
//!
//! let form = Form::builder("event")
//!     .field(Field::new("when", DateField::new()).required())
//!     .field(Field::new("seats", IntField::new().min(1)))
//!     .action("/events")
//!     .build()
//!     .unwrap();
//! let ctx = RequestContext::new();
//!
//! let data = SubmittedData::from_urlencoded("when=Sep+11%2C+2001&seats=0");
//! let parsed = FormParser::new(&form, &ctx).parse(&data).unwrap();
//! assert!(parsed.value("when").is_some());
//! assert!(parsed.errors.contains("seats"));
//!
//! let mut renderer = TextFormRenderer::text(&form, &ctx).with_parsed(parsed);
//! let html = renderer.render().unwrap();
//! renderer.finish().unwrap();
//! assert!(html.contains(r#"value="2001-09-11""#));
//! ```

pub mod fields;
pub mod form;
pub mod parse;
pub mod registry;
pub mod render;
pub mod submitted;
pub mod value;

pub use fields::{Field, FieldKind, FieldState, FieldType};
pub use form::{Form, Method, Submit};
pub use parse::{ErrorEntry, ErrorMap, FormParser, ParsedForm};
pub use registry::{default_registry, RenderRegistry, RendererKind};
pub use render::{DisplayOptions, DisplayRenderer, FormRenderer, RenderOptions, TextFormRenderer};
pub use submitted::SubmittedData;
pub use value::{RawValue, RenderValue, UploadedFile, Value};
