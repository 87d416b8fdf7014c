//! Read-only rendering of parsed values.
//!
//! A [`DisplayRenderer`] shows the values of a form as a table of labels and
//! human-readable text, as produced by each field's `display` conversion. It
//! takes no error map: only valid values are displayed. File uploads are
//! never displayed.

use std::fmt;

use atocha_rs_core::context::RequestContext;
use atocha_rs_core::error::{AtochaError, AtochaResult};
use atocha_rs_core::utils::escape_html;

use super::text::{error_markup, TextBackend};
use super::{field_label, RenderBackend, RenderOptions, RenderSession};
use crate::fields::{Field, FieldKind, FieldState};
use crate::form::Form;
use crate::registry::{FieldRender, RenderFn, RenderRegistry};
use crate::value::{RenderValue, Value};

/// Which fields a [`DisplayRenderer`] shows in tables.
///
/// The two value filters are independent. A field with no value, or whose
/// value is [`Value::Unset`], is governed by `show_unset` alone and is shown
/// with the `display-unset` message. A field whose value is set but empty
/// (blank text, an empty list) is governed by `show_empty` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Show fields whose declared state is hidden.
    pub show_hidden: bool,
    /// Show fields that have no value.
    pub show_unset: bool,
    /// Show fields whose value is empty.
    pub show_empty: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_hidden: true,
            show_unset: true,
            show_empty: true,
        }
    }
}

enum Shown<'v> {
    Skip,
    Unset,
    Value(&'v Value),
}

/// Renders parsed values for reading.
#[derive(Debug)]
pub struct DisplayRenderer<'a> {
    backend: TextBackend,
    options: DisplayOptions,
    session: RenderSession<'a>,
}

impl<'a> DisplayRenderer<'a> {
    /// Creates a display renderer with default options and no values.
    pub fn new(form: &'a Form, ctx: &'a RequestContext) -> Self {
        Self {
            backend: TextBackend::display(),
            options: DisplayOptions::default(),
            session: RenderSession::new(form, ctx),
        }
    }

    /// Supplies the values to display.
    #[must_use]
    pub fn with_values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.session.update_values(values);
        self
    }

    /// Sets the filtering options.
    #[must_use]
    pub const fn with_options(mut self, options: DisplayOptions) -> Self {
        self.options = options;
        self
    }

    /// Allows the session to end without rendering every field.
    #[must_use]
    pub const fn incomplete(mut self) -> Self {
        self.session.incomplete = true;
        self
    }

    /// Looks routines up in `registry` instead of the default registry.
    #[must_use]
    pub const fn with_registry(mut self, registry: &'a RenderRegistry) -> Self {
        self.session.registry = registry;
        self
    }

    /// Reports a completeness violation on drop through `hook` rather than
    /// the log.
    #[must_use]
    pub fn on_incomplete(mut self, hook: impl FnOnce(AtochaError) + 'a) -> Self {
        self.session.on_incomplete = Some(Box::new(hook));
        self
    }

    /// The filtering options.
    pub const fn options(&self) -> DisplayOptions {
        self.options
    }

    /// The session bookkeeping.
    pub const fn session(&self) -> &RenderSession<'a> {
        &self.session
    }

    /// Marks fields as rendered without producing output for them.
    pub fn ignore(&mut self, names: &[&str]) {
        self.session.ignore(names);
    }

    /// Renders a table of all the fields.
    pub fn render(&mut self) -> AtochaResult<String> {
        self.render_table(&RenderOptions::default())
    }

    /// Renders a table of the selected fields, honoring the options.
    ///
    /// Fields filtered out by the options count as rendered.
    pub fn render_table(&mut self, opts: &RenderOptions<'_>) -> AtochaResult<String> {
        let mut out = String::new();
        self.render_table_to(&mut out, opts)?;
        Ok(out)
    }

    /// Like [`render_table`](Self::render_table), into a sink.
    pub fn render_table_to(
        &mut self,
        out: &mut dyn fmt::Write,
        opts: &RenderOptions<'_>,
    ) -> AtochaResult<()> {
        let span = self.session.span.clone();
        let _enter = span.enter();

        let form = self.session.form;
        let ctx = self.session.ctx;
        let mut visible = Vec::new();
        for field in form.select_fields(opts.only, opts.ignore)? {
            self.session.ensure_unrendered(field)?;
            let rendered = match self.classify(field) {
                Shown::Skip => None,
                Shown::Unset => Some(escape_html(&ctx.message("display-unset"))),
                Shown::Value(value) => Some(self.display(field, value)?),
            };
            self.session.mark_rendered(field);
            if let Some(rendered) = rendered {
                visible.push((field_label(field, ctx), rendered));
            } else {
                tracing::debug!(field = field.name(), "field filtered from display");
            }
        }
        self.backend
            .write_table(out, &visible, None, opts.css_class, ctx)?;
        Ok(())
    }

    /// Displays one field by name, whatever the filtering options.
    pub fn render_field(&mut self, name: &str) -> AtochaResult<String> {
        let form = self.session.form;
        let field = form.field(name)?;
        self.session.ensure_unrendered(field)?;
        let rendered = match self.session.values.get(name) {
            Some(value) if !value.is_unset() => self.display(field, value)?,
            _ => escape_html(&self.session.ctx.message("display-unset")),
        };
        self.session.mark_rendered(field);
        Ok(rendered)
    }

    fn classify(&self, field: &Field) -> Shown<'_> {
        if field.kind() == FieldKind::FILE_UPLOAD {
            return Shown::Skip;
        }
        if field.is_hidden() && !self.options.show_hidden {
            return Shown::Skip;
        }
        match self.session.values.get(field.name()) {
            None | Some(Value::Unset) => {
                if self.options.show_unset {
                    Shown::Unset
                } else {
                    Shown::Skip
                }
            }
            Some(value) if value.is_empty() && !self.options.show_empty => Shown::Skip,
            Some(value) => Shown::Value(value),
        }
    }

    fn display(&self, field: &Field, value: &Value) -> AtochaResult<String> {
        if !field.accepts(value) {
            return Err(AtochaError::Form(format!(
                "value of type {} is invalid for field '{}' (expecting {})",
                value.type_tag(),
                field.name(),
                field.converter().types_data()
            )));
        }
        let text = RenderValue::Text(field.display_value(value, self.session.ctx)?);
        let routine = self
            .session
            .registry
            .lookup(self.backend.kind(), field.converter())?;
        routine(&FieldRender {
            field,
            value: &text,
            error: None,
            state: FieldState::Normal,
            required: field.is_required(),
            ctx: self.session.ctx,
        })
    }

    /// Ends the session, returning the completeness violation if any.
    pub fn finish(self) -> AtochaResult<()> {
        self.session.finish()
    }
}

/// The display renderer's routines for the built-in field kinds.
pub(crate) const ROUTINES: &[(FieldKind, RenderFn)] = &[
    (FieldKind::STRING, render_simple),
    (FieldKind::TEXTAREA, render_preformatted),
    (FieldKind::PASSWORD, render_simple),
    (FieldKind::EMAIL, render_simple),
    (FieldKind::URL, render_simple),
    (FieldKind::INT, render_simple),
    (FieldKind::FLOAT, render_simple),
    (FieldKind::BOOL, render_simple),
    (FieldKind::RADIO, render_simple),
    (FieldKind::MENU, render_simple),
    (FieldKind::CHECKBOXES, render_simple),
    (FieldKind::LISTBOX, render_simple),
    (FieldKind::DATE, render_simple),
    (FieldKind::JSDATE, render_simple),
    (FieldKind::FILE_UPLOAD, render_nothing),
];

fn render_simple(r: &FieldRender<'_>) -> AtochaResult<String> {
    let text: Vec<&str> = r.value.texts().collect();
    Ok(error_markup(r.error) + &escape_html(&text.join(", ")))
}

fn render_preformatted(r: &FieldRender<'_>) -> AtochaResult<String> {
    let text: Vec<&str> = r.value.texts().collect();
    Ok(format!(
        "{}<pre>{}</pre>",
        error_markup(r.error),
        escape_html(&text.join("\n"))
    ))
}

fn render_nothing(_: &FieldRender<'_>) -> AtochaResult<String> {
    Ok(String::new())
}
