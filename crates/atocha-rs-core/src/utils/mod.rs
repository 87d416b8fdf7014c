//! Small utilities shared by the atocha-rs crates.

pub mod html;

pub use html::{capfirst, escape_html};
