//! Form rendering.
//!
//! A renderer oversees one rendering pass over a form. It resolves the value
//! to show for every field (a replacement value from the error map, then the
//! supplied values, then the field's initial value), converts it to render
//! form, and dispatches to the routine registered for the pair
//! (renderer kind, field kind) in a [`RenderRegistry`].
//!
//! Every renderer owns a [`RenderSession`] that records which fields were
//! rendered. When the session ends, whether through
//! [`FormRenderer::finish`] or by being dropped on any exit path, fields that
//! were neither rendered nor explicitly ignored are reported, unless the
//! session was marked incomplete.
//!
//! Two renderers are provided:
//!
//! - [`FormRenderer`] over a [`RenderBackend`]; [`TextFormRenderer`] emits
//!   editable HTML.
//! - [`DisplayRenderer`] emits read-only HTML tables of parsed values.
//!
//! # Examples
//!
//! ```
//! use atocha_rs_core::context::RequestContext;
//! use atocha_rs_forms::fields::{Field, StringField};
//! use atocha_rs_forms::form::Form;
//! use atocha_rs_forms::render::{RenderOptions, TextFormRenderer};
//!
//! let form = Form::builder("login")
//!     .field(Field::new("user", StringField::new()).required())
//!     .action("/login")
//!     .build()
//!     .unwrap();
//! let ctx = RequestContext::new();
//! let mut renderer = TextFormRenderer::text(&form, &ctx);
//! let html = renderer.render_with(&RenderOptions::default()).unwrap();
//! assert!(html.starts_with("<form id=\"login\""));
//! renderer.finish().unwrap();
//! ```

pub mod display;
pub mod text;

use std::collections::{HashMap, HashSet};
use std::fmt;

use atocha_rs_core::context::RequestContext;
use atocha_rs_core::error::{AtochaError, AtochaResult, InternalError};
use atocha_rs_core::logging;
use atocha_rs_core::utils::{capfirst, escape_html};

use crate::fields::{Field, FieldState, Script};
use crate::form::{Form, Method, Submit};
use crate::parse::{ErrorEntry, ErrorMap, ParsedForm};
use crate::registry::{default_registry, FieldRender, RenderRegistry, RendererKind};
use crate::value::{RenderValue, Value};

pub use display::{DisplayOptions, DisplayRenderer};
pub use text::{TextBackend, TextFormRenderer};

/// Called with the completeness violation of a session dropped without
/// [`FormRenderer::finish`].
pub type IncompleteHook<'a> = Box<dyn FnOnce(AtochaError) + 'a>;

/// The bookkeeping of one rendering pass.
pub struct RenderSession<'a> {
    form: &'a Form,
    ctx: &'a RequestContext,
    registry: &'a RenderRegistry,
    values: HashMap<String, Value>,
    errors: Option<ErrorMap>,
    incomplete: bool,
    rendered: HashSet<String>,
    on_incomplete: Option<IncompleteHook<'a>>,
    span: tracing::Span,
    finished: bool,
}

impl fmt::Debug for RenderSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderSession")
            .field("form", &self.form.name())
            .field("incomplete", &self.incomplete)
            .field("rendered", &self.rendered)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<'a> RenderSession<'a> {
    /// Opens a session over a form.
    pub fn new(form: &'a Form, ctx: &'a RequestContext) -> Self {
        Self {
            form,
            ctx,
            registry: default_registry(),
            values: HashMap::new(),
            errors: None,
            incomplete: false,
            rendered: HashSet::new(),
            on_incomplete: None,
            span: logging::render_span(form.name()),
            finished: false,
        }
    }

    /// The form being rendered.
    pub const fn form(&self) -> &'a Form {
        self.form
    }

    /// The request context.
    pub const fn ctx(&self) -> &'a RequestContext {
        self.ctx
    }

    /// The registry routines are looked up in.
    pub const fn registry(&self) -> &'a RenderRegistry {
        self.registry
    }

    /// The values supplied for the fields.
    pub const fn values(&self) -> &HashMap<String, Value> {
        &self.values
    }

    /// Returns `true` if the field was already rendered or ignored.
    pub fn is_rendered(&self, name: &str) -> bool {
        self.rendered.contains(name)
    }

    /// Adds or replaces supplied values.
    pub fn update_values<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.values
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Marks fields as rendered without producing output for them.
    pub fn ignore(&mut self, names: &[&str]) {
        self.rendered
            .extend(names.iter().map(|name| (*name).to_string()));
    }

    fn ensure_unrendered(&self, field: &Field) -> AtochaResult<()> {
        if self.rendered.contains(field.name()) {
            return Err(InternalError::new(format!(
                "field '{}' being rendered more than once",
                field.name()
            ))
            .into());
        }
        Ok(())
    }

    fn mark_rendered(&mut self, field: &Field) {
        self.rendered.insert(field.name().to_string());
    }

    fn error(&self, name: &str) -> Option<&ErrorEntry> {
        self.errors.as_ref().and_then(|errors| errors.get(name))
    }

    /// Resolves the render value of a field.
    ///
    /// A hidden or read-only field needs a supplied or initial value, whatever
    /// its errors. Otherwise a replacement value from the error map wins over
    /// a supplied value, which wins over the initial value. A field with an
    /// error but no replacement and no supplied value renders as unset.
    fn resolve(&self, field: &Field, state: FieldState) -> AtochaResult<RenderValue> {
        let supplied = self.values.get(field.name());
        if supplied.is_none() && !state.is_normal() && field.initial().is_unset() {
            return Err(AtochaError::Form(format!(
                "hidden/read-only field '{}' has no value",
                field.name()
            )));
        }

        let error = self.error(field.name());
        if let Some(replacement) = error.and_then(|e| e.replacement.as_ref()) {
            let types = field.converter().types_render();
            if !types.contains(replacement.type_tag()) {
                return Err(AtochaError::Form(format!(
                    "replacement value of type {} is invalid for field '{}' (expecting {types})",
                    replacement.type_tag(),
                    field.name()
                )));
            }
            return Ok(replacement.clone());
        }

        let value = match supplied {
            Some(value) => value,
            None if error.is_some() => &Value::Unset,
            None => field.initial(),
        };
        if !field.accepts(value) {
            return Err(AtochaError::Form(format!(
                "value of type {} is invalid for field '{}' (expecting {})",
                value.type_tag(),
                field.name(),
                field.converter().types_data()
            )));
        }
        Ok(field.render_value(value)?)
    }

    /// The names of the fields neither rendered nor ignored, sorted.
    pub fn missing(&self) -> Vec<String> {
        let mut missing: Vec<String> = self
            .form
            .names()
            .into_iter()
            .filter(|name| !self.rendered.contains(*name))
            .map(str::to_string)
            .collect();
        missing.sort_unstable();
        missing
    }

    fn check(&self) -> AtochaResult<()> {
        if self.incomplete {
            return Ok(());
        }
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AtochaError::IncompleteRender {
                form: self.form.name().to_string(),
                missing,
            })
        }
    }

    /// Ends the session, returning the completeness violation if any.
    ///
    /// Unlike the check run on drop, this one does not depend on
    /// [`RequestContext::completeness_checks`].
    pub fn finish(mut self) -> AtochaResult<()> {
        self.finished = true;
        self.check()
    }
}

impl Drop for RenderSession<'_> {
    fn drop(&mut self) {
        if self.finished || !self.ctx.completeness_checks() {
            return;
        }
        self.finished = true;
        if let Err(err) = self.check() {
            match self.on_incomplete.take() {
                Some(hook) => hook(err),
                None => {
                    let _enter = self.span.enter();
                    tracing::error!(error = %err, "render session ended incomplete");
                }
            }
        }
    }
}

/// Returns the display label of a field, HTML-escaped.
///
/// This is the translated label, or the field name with its first letter
/// capitalized.
pub fn field_label(field: &Field, ctx: &RequestContext) -> String {
    let label = field
        .label()
        .map_or_else(|| capfirst(field.name()), |label| ctx.translate(label));
    escape_html(&label)
}

/// Options for [`FormRenderer::render_with`] and
/// [`FormRenderer::render_table`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions<'o> {
    /// Render only these fields, in this order.
    pub only: Option<&'o [&'o str]>,
    /// Skip these fields.
    pub ignore: Option<&'o [&'o str]>,
    /// Overrides the form's action.
    pub action: Option<&'o str>,
    /// Overrides the form's submit buttons.
    pub submit: Option<&'o Submit>,
    /// An extra CSS class for the table.
    pub css_class: Option<&'o str>,
}

impl<'o> RenderOptions<'o> {
    /// Restricts rendering to the named fields.
    #[must_use]
    pub const fn only(mut self, names: &'o [&'o str]) -> Self {
        self.only = Some(names);
        self
    }

    /// Excludes the named fields.
    #[must_use]
    pub const fn ignore(mut self, names: &'o [&'o str]) -> Self {
        self.ignore = Some(names);
        self
    }

    /// Overrides the action.
    #[must_use]
    pub const fn action(mut self, action: &'o str) -> Self {
        self.action = Some(action);
        self
    }

    /// Overrides the submit buttons.
    #[must_use]
    pub const fn submit(mut self, submit: &'o Submit) -> Self {
        self.submit = Some(submit);
        self
    }

    /// Adds a CSS class to the table.
    #[must_use]
    pub const fn css_class(mut self, class: &'o str) -> Self {
        self.css_class = Some(class);
        self
    }
}

/// Form-level markup of an editable renderer.
///
/// Field markup comes from the render routines in the registry; a backend
/// provides everything around it.
pub trait RenderBackend {
    /// The renderer kind used for routine lookup.
    fn kind(&self) -> RendererKind;

    /// Markup for a field rendered in the hidden state.
    fn render_hidden(&self, field: &Field, value: &RenderValue) -> String;

    /// Markup appended to the label of a required field.
    fn required_marker(&self) -> &str;

    /// Writes the opening form tag.
    fn write_container(
        &self,
        out: &mut dyn fmt::Write,
        form: &Form,
        action_url: &str,
    ) -> fmt::Result;

    /// Writes a table of `(label, inputs)` rows followed by `extra`.
    fn write_table(
        &self,
        out: &mut dyn fmt::Write,
        pairs: &[(String, String)],
        extra: Option<&str>,
        css_class: Option<&str>,
        ctx: &RequestContext,
    ) -> fmt::Result;

    /// Writes the submit and reset buttons.
    fn write_submit(
        &self,
        out: &mut dyn fmt::Write,
        submit: &Submit,
        reset: Option<&str>,
        ctx: &RequestContext,
    ) -> fmt::Result;

    /// Writes references to client-side scripts.
    fn write_scripts(
        &self,
        out: &mut dyn fmt::Write,
        scripts: &[Script],
        ctx: &RequestContext,
    ) -> fmt::Result;

    /// Writes the closing form tag.
    fn write_close(&self, out: &mut dyn fmt::Write) -> fmt::Result;
}

/// Renders a form for editing.
#[derive(Debug)]
pub struct FormRenderer<'a, B> {
    backend: B,
    session: RenderSession<'a>,
}

impl<'a, B: RenderBackend> FormRenderer<'a, B> {
    /// Creates a renderer with no values and no errors.
    pub fn new(backend: B, form: &'a Form, ctx: &'a RequestContext) -> Self {
        Self {
            backend,
            session: RenderSession::new(form, ctx),
        }
    }

    /// Supplies native values for the fields.
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

    /// Supplies errors to show next to the fields.
    #[must_use]
    pub fn with_errors(mut self, errors: ErrorMap) -> Self {
        self.session.errors = Some(errors);
        self
    }

    /// Supplies both the values and the errors of a parse.
    #[must_use]
    pub fn with_parsed(self, parsed: ParsedForm) -> Self {
        self.with_values(parsed.values).with_errors(parsed.errors)
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

    /// The form being rendered.
    pub const fn form(&self) -> &'a Form {
        self.session.form
    }

    /// The session bookkeeping.
    pub const fn session(&self) -> &RenderSession<'a> {
        &self.session
    }

    /// The backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Adds or replaces supplied values.
    pub fn update_values<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.session.update_values(values);
    }

    /// Marks fields as rendered without producing output for them.
    pub fn ignore(&mut self, names: &[&str]) {
        self.session.ignore(names);
    }

    /// Renders the whole form: container, table, buttons and closing tag.
    pub fn render(&mut self) -> AtochaResult<String> {
        self.render_with(&RenderOptions::default())
    }

    /// Renders the whole form with options.
    pub fn render_with(&mut self, opts: &RenderOptions<'_>) -> AtochaResult<String> {
        let mut out = String::new();
        self.render_to(&mut out, opts)?;
        Ok(out)
    }

    /// Renders the whole form into a caller-supplied sink.
    pub fn render_to(
        &mut self,
        out: &mut dyn fmt::Write,
        opts: &RenderOptions<'_>,
    ) -> AtochaResult<()> {
        let span = self.session.span.clone();
        let _enter = span.enter();
        tracing::debug!("rendering form");

        self.render_container_to(out, opts.action)?;
        self.render_table_to(out, opts)?;
        self.render_submit_to(out, opts.submit)?;
        self.backend.write_close(out)?;
        Ok(())
    }

    /// Renders the opening form tag.
    ///
    /// The action is `action` or the form's own, passed through the
    /// context's action evaluator. Having neither is an error.
    pub fn render_container(&mut self, action: Option<&str>) -> AtochaResult<String> {
        let mut out = String::new();
        self.render_container_to(&mut out, action)?;
        Ok(out)
    }

    /// Like [`render_container`](Self::render_container), into a sink.
    pub fn render_container_to(
        &mut self,
        out: &mut dyn fmt::Write,
        action: Option<&str>,
    ) -> AtochaResult<()> {
        let form = self.session.form;
        let action = action.or_else(|| form.action()).ok_or_else(|| {
            AtochaError::Form(format!(
                "form '{}' needs an action to be rendered",
                form.name()
            ))
        })?;
        let action_url = self.session.ctx.eval_action(action);
        self.backend.write_container(out, form, &action_url)?;
        Ok(())
    }

    /// Renders the selected fields as a table of labels and inputs.
    ///
    /// Hidden fields are emitted after the table.
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
        let form = self.session.form;
        let ctx = self.session.ctx;
        let mut hidden = Vec::new();
        let mut visible = Vec::new();
        for field in form.select_fields(opts.only, opts.ignore)? {
            let rendered = self.render_field_in(field, field.state())?;
            if field.is_hidden() {
                hidden.push(rendered);
            } else {
                let mut label = field_label(field, ctx);
                if field.is_required() {
                    label.push_str(self.backend.required_marker());
                }
                visible.push((label, rendered));
            }
        }
        let extra = (!hidden.is_empty()).then(|| hidden.join("\n"));
        self.backend
            .write_table(out, &visible, extra.as_deref(), opts.css_class, ctx)?;
        Ok(())
    }

    /// Renders a table of arbitrary `(label, inputs)` rows.
    ///
    /// Both columns are written as given, without escaping.
    pub fn table(
        &self,
        pairs: &[(String, String)],
        css_class: Option<&str>,
    ) -> AtochaResult<String> {
        let mut out = String::new();
        self.backend
            .write_table(&mut out, pairs, None, css_class, self.session.ctx)?;
        Ok(out)
    }

    /// Renders the submit buttons, and the reset button if the form has one.
    pub fn render_submit(&mut self, submit: Option<&Submit>) -> AtochaResult<String> {
        let mut out = String::new();
        self.render_submit_to(&mut out, submit)?;
        Ok(out)
    }

    /// Like [`render_submit`](Self::render_submit), into a sink.
    pub fn render_submit_to(
        &mut self,
        out: &mut dyn fmt::Write,
        submit: Option<&Submit>,
    ) -> AtochaResult<()> {
        let form = self.session.form;
        let submit = submit.unwrap_or_else(|| form.submit());
        self.backend
            .write_submit(out, submit, form.reset(), self.session.ctx)?;
        Ok(())
    }

    /// Renders the script references the form's fields depend on.
    pub fn render_scripts(&self) -> AtochaResult<String> {
        let mut out = String::new();
        self.backend
            .write_scripts(&mut out, &self.session.form.scripts(), self.session.ctx)?;
        Ok(out)
    }

    /// Renders one field by name, in `state` or its declared state.
    pub fn render_field(&mut self, name: &str, state: Option<FieldState>) -> AtochaResult<String> {
        let form = self.session.form;
        let field = form.field(name)?;
        self.render_field_in(field, state.unwrap_or_else(|| field.state()))
    }

    fn render_field_in(&mut self, field: &'a Field, state: FieldState) -> AtochaResult<String> {
        self.session.ensure_unrendered(field)?;
        let value = self.session.resolve(field, state)?;
        let error = self.session.error(field.name());

        if !state.is_normal() && error.is_some() {
            return Err(InternalError::new(format!(
                "non-editable field '{}' must have no errors",
                field.name()
            ))
            .into());
        }

        let output = if state == FieldState::Hidden {
            self.backend.render_hidden(field, &value)
        } else {
            let routine = self
                .session
                .registry
                .lookup(self.backend.kind(), field.converter())?;
            routine(&FieldRender {
                field,
                value: &value,
                error: error.and_then(|e| e.message.as_deref()),
                state,
                required: field.is_required(),
                ctx: self.session.ctx,
            })?
        };

        tracing::debug!(field = field.name(), ?state, "field rendered");
        self.session.mark_rendered(field);
        Ok(output)
    }

    /// Ends the session, returning the completeness violation if any.
    pub fn finish(self) -> AtochaResult<()> {
        self.session.finish()
    }
}

impl<B: RenderBackend + Default> FormRenderer<'_, B> {
    /// Renders a standalone form made only of buttons.
    ///
    /// `buttons` are `(label, name)` pairs. The form is named `form_name`,
    /// or `form-buttons` if not given.
    pub fn render_buttons(
        buttons: Vec<(String, String)>,
        action: &str,
        form_name: Option<&str>,
        method: Option<Method>,
        ctx: &RequestContext,
    ) -> AtochaResult<String> {
        if buttons.is_empty() {
            return Err(AtochaError::Form(
                "a button form needs at least one button".to_string(),
            ));
        }
        let form = Form::builder(form_name.unwrap_or("form-buttons"))
            .action(action)
            .method(method.unwrap_or_default())
            .submit(Submit::Buttons(buttons))
            .build()?;
        let mut renderer = FormRenderer::new(B::default(), &form, ctx);
        let html = renderer.render()?;
        renderer.finish()?;
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::fields::{IntField, StringField};

    fn abc() -> Form {
        Form::builder("abc")
            .field(Field::new("a", StringField::new()))
            .field(Field::new("b", IntField::new()))
            .field(Field::new("c", StringField::new()))
            .action("/go")
            .build()
            .unwrap()
    }

    #[test]
    fn test_finish_names_missing_fields() {
        let form = abc();
        let ctx = RequestContext::new();
        let mut r = TextFormRenderer::text(&form, &ctx);
        r.render_field("a", None).unwrap();
        r.render_field("b", None).unwrap();
        match r.finish().unwrap_err() {
            AtochaError::IncompleteRender { form, missing } => {
                assert_eq!(form, "abc");
                assert_eq!(missing, vec!["c".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_drop_reports_through_hook() {
        let form = abc();
        let ctx = RequestContext::new();
        let reported = RefCell::new(None);
        {
            let mut r = TextFormRenderer::text(&form, &ctx)
                .on_incomplete(|err| *reported.borrow_mut() = Some(err.to_string()));
            r.render_field("a", None).unwrap();
        }
        let msg = reported.into_inner().unwrap();
        assert!(msg.contains("b, c"), "{msg}");
    }

    #[test]
    fn test_drop_reports_on_early_return() {
        fn fails(form: &Form, ctx: &RequestContext, hits: &RefCell<u32>) -> AtochaResult<()> {
            let mut r =
                TextFormRenderer::text(form, ctx).on_incomplete(|_| *hits.borrow_mut() += 1);
            r.render_field("a", None)?;
            r.render_field("nope", None)?;
            r.finish()
        }
        let form = abc();
        let ctx = RequestContext::new();
        let hits = RefCell::new(0);
        assert!(fails(&form, &ctx, &hits).is_err());
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_incomplete_and_ignore() {
        let form = abc();
        let ctx = RequestContext::new();
        let r = TextFormRenderer::text(&form, &ctx).incomplete();
        r.finish().unwrap();

        let mut r = TextFormRenderer::text(&form, &ctx);
        r.ignore(&["b", "c"]);
        r.render_field("a", None).unwrap();
        r.finish().unwrap();
    }

    #[test]
    fn test_checks_disabled_skip_drop_report() {
        let form = abc();
        let ctx = RequestContext::new().with_completeness_checks(false);
        let hit = RefCell::new(false);
        {
            let _r = TextFormRenderer::text(&form, &ctx).on_incomplete(|_| *hit.borrow_mut() = true);
        }
        assert!(!*hit.borrow());
    }

    #[test]
    fn test_double_render_is_internal() {
        let form = abc();
        let ctx = RequestContext::new();
        let mut r = TextFormRenderer::text(&form, &ctx).incomplete();
        r.render_field("a", None).unwrap();
        let err = r.render_field("a", None).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_hidden_without_value_is_form_error() {
        let form = abc();
        let ctx = RequestContext::new();
        let mut r = TextFormRenderer::text(&form, &ctx).incomplete();
        let err = r.render_field("a", Some(FieldState::Hidden)).unwrap_err();
        assert!(matches!(err, AtochaError::Form(_)));

        let mut r = TextFormRenderer::text(&form, &ctx)
            .incomplete()
            .with_values([("a", "x")]);
        let html = r.render_field("a", Some(FieldState::Hidden)).unwrap();
        assert_eq!(html, r#"<input name="a" type="hidden" value="x" />"#);
    }

    #[test]
    fn test_hidden_with_error_is_internal() {
        let form = abc();
        let ctx = RequestContext::new();
        let mut errors = ErrorMap::new();
        errors.insert("a", "Bad.");
        let mut r = TextFormRenderer::text(&form, &ctx)
            .incomplete()
            .with_values([("a", "x")])
            .with_errors(errors);
        let err = r.render_field("a", Some(FieldState::Hidden)).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_hidden_without_value_but_with_error_is_form_error() {
        let form = abc();
        let ctx = RequestContext::new();
        for entry in [ErrorEntry::from(("Bad.", "x")), ErrorEntry::from("Bad.")] {
            let mut errors = ErrorMap::new();
            errors.insert("a", entry);
            let mut r = TextFormRenderer::text(&form, &ctx)
                .incomplete()
                .with_errors(errors);
            let err = r.render_field("a", Some(FieldState::Hidden)).unwrap_err();
            assert!(matches!(err, AtochaError::Form(_)), "{err:?}");
            assert!(!err.is_internal());
        }
    }

    #[test]
    fn test_value_priority() {
        let form = Form::builder("p")
            .field(Field::new("n", IntField::new()).with_initial(1))
            .build()
            .unwrap();
        let ctx = RequestContext::new();

        let mut r = TextFormRenderer::text(&form, &ctx);
        assert!(r.render_field("n", None).unwrap().contains(r#"value="1""#));

        let mut r = TextFormRenderer::text(&form, &ctx).with_values([("n", 2)]);
        assert!(r.render_field("n", None).unwrap().contains(r#"value="2""#));

        let mut errors = ErrorMap::new();
        errors.insert("n", ("Too big.", "2x"));
        let mut r = TextFormRenderer::text(&form, &ctx)
            .with_values([("n", 2)])
            .with_errors(errors);
        let html = r.render_field("n", None).unwrap();
        assert!(html.contains(r#"value="2x""#), "{html}");
        assert!(html.contains("Too big."));

        // An error without replacement and no value renders unset.
        let mut errors = ErrorMap::new();
        errors.insert("n", true);
        let mut r = TextFormRenderer::text(&form, &ctx).with_errors(errors);
        assert!(r.render_field("n", None).unwrap().contains(r#"value="""#));
    }

    #[test]
    fn test_foreign_value_type_is_form_error() {
        let form = abc();
        let ctx = RequestContext::new();
        let mut r = TextFormRenderer::text(&form, &ctx)
            .incomplete()
            .with_values([("b", "not a number")]);
        assert!(matches!(
            r.render_field("b", None).unwrap_err(),
            AtochaError::Form(_)
        ));
    }

    #[test]
    fn test_list_replacement_for_text_field_is_form_error() {
        let form = abc();
        let ctx = RequestContext::new();
        let mut errors = ErrorMap::new();
        errors.insert("a", ("Bad.", vec!["x".to_string()]));
        let mut r = TextFormRenderer::text(&form, &ctx)
            .incomplete()
            .with_errors(errors);
        assert!(matches!(
            r.render_field("a", None).unwrap_err(),
            AtochaError::Form(_)
        ));
    }

    #[test]
    fn test_container_requires_action() {
        let form = Form::builder("x").build().unwrap();
        let ctx = RequestContext::new();
        let mut r = TextFormRenderer::text(&form, &ctx);
        assert!(matches!(
            r.render_container(None).unwrap_err(),
            AtochaError::Form(_)
        ));
        let html = r.render_container(Some("/y")).unwrap();
        assert!(html.contains(r#"action="/y""#));
    }

    #[test]
    fn test_action_evaluator() {
        let form = abc();
        let ctx = RequestContext::new().with_action_evaluator(|a: &str| format!("/app{a}"));
        let mut r = TextFormRenderer::text(&form, &ctx).incomplete();
        assert!(r
            .render_container(None)
            .unwrap()
            .contains(r#"action="/app/go""#));
    }

    #[test]
    fn test_render_buttons() {
        let ctx = RequestContext::new();
        let html = TextFormRenderer::render_buttons(
            vec![("Delete".to_string(), "delete".to_string())],
            "/items",
            None,
            None,
            &ctx,
        )
        .unwrap();
        assert!(html.contains(r#"<form id="form-buttons""#));
        assert!(html.contains(r#"<input type="submit" name="delete" value="Delete" />"#));
        assert!(TextFormRenderer::render_buttons(Vec::new(), "/x", None, None, &ctx).is_err());
    }

    #[test]
    fn test_field_label() {
        let ctx = RequestContext::new();
        let plain = Field::new("first_name", StringField::new());
        assert_eq!(field_label(&plain, &ctx), "First_name");
        let labelled = Field::new("x", StringField::new()).with_label("A & B");
        assert_eq!(field_label(&labelled, &ctx), "A &amp; B");
    }
}
