//! HTML text output.
//!
//! [`TextBackend`] writes the form-level markup; the render routines below
//! write the per-kind input markup of the editable renderer. Every value, label and
//! message is HTML-escaped before it is embedded.

use std::fmt;

use atocha_rs_core::context::RequestContext;
use atocha_rs_core::error::{AtochaResult, InternalError};
use atocha_rs_core::utils::escape_html;

use super::{FormRenderer, RenderBackend};
use crate::fields::{Field, FieldKind, FieldState, FieldType, Orientation, Script};
use crate::form::{Form, Submit};
use crate::registry::{FieldRender, RenderFn, RendererKind};
use crate::value::RenderValue;

const CSS_ERROR: &str = "formerror";
const CSS_TABLE: &str = "formtable";
const CSS_LABEL: &str = "formlabel";
const CSS_VERTICAL: &str = "formminitable";

/// An editable HTML renderer.
pub type TextFormRenderer<'a> = FormRenderer<'a, TextBackend>;

impl<'a> FormRenderer<'a, TextBackend> {
    /// Creates an editable HTML renderer.
    pub fn text(form: &'a Form, ctx: &'a RequestContext) -> Self {
        Self::new(TextBackend::form(), form, ctx)
    }
}

/// Form-level HTML markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBackend {
    kind: RendererKind,
    input_class: &'static str,
}

impl Default for TextBackend {
    fn default() -> Self {
        Self::form()
    }
}

impl TextBackend {
    /// Markup for editable forms.
    pub const fn form() -> Self {
        Self {
            kind: RendererKind::TEXT_FORM,
            input_class: "forminput",
        }
    }

    /// Markup for read-only tables.
    pub const fn display() -> Self {
        Self {
            kind: RendererKind::TEXT_DISPLAY,
            input_class: "formdisplay",
        }
    }

    /// The CSS class of the input column of tables.
    pub const fn input_class(&self) -> &'static str {
        self.input_class
    }
}

impl RenderBackend for TextBackend {
    fn kind(&self) -> RendererKind {
        self.kind
    }

    fn render_hidden(&self, field: &Field, value: &RenderValue) -> String {
        let name = escape_html(field.name());
        value
            .texts()
            .map(|v| {
                format!(
                    r#"<input name="{name}" type="hidden" value="{}" />"#,
                    escape_html(v)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn required_marker(&self) -> &str {
        r#"<span class="formreq">*</span>"#
    }

    fn write_container(
        &self,
        out: &mut dyn fmt::Write,
        form: &Form,
        action_url: &str,
    ) -> fmt::Result {
        let name = escape_html(form.name());
        write!(
            out,
            r#"<form id="{name}" name="{name}" action="{}" method="{}""#,
            escape_html(action_url),
            form.method()
        )?;
        if let Some(charset) = form.accept_charset() {
            write!(out, r#" accept-charset="{}""#, escape_html(charset))?;
        }
        if let Some(enctype) = form.enctype() {
            write!(out, r#" enctype="{}""#, escape_html(enctype))?;
        }
        writeln!(out, ">")
    }

    fn write_table(
        &self,
        out: &mut dyn fmt::Write,
        pairs: &[(String, String)],
        extra: Option<&str>,
        css_class: Option<&str>,
        ctx: &RequestContext,
    ) -> fmt::Result {
        match css_class {
            Some(class) => writeln!(out, r#"<table class="{CSS_TABLE} {}">"#, escape_html(class))?,
            None => writeln!(out, r#"<table class="{CSS_TABLE}">"#)?,
        }
        let colon = if ctx.label_colon() { ":" } else { "" };
        for (label, inputs) in pairs {
            writeln!(
                out,
                "<tr><td class=\"{CSS_LABEL}\">{label}{colon}</td>\n    <td class=\"{}\">{inputs}</td></tr>",
                self.input_class
            )?;
        }
        writeln!(out, "</table>")?;
        if let Some(extra) = extra {
            writeln!(out, "{extra}")?;
        }
        Ok(())
    }

    fn write_submit(
        &self,
        out: &mut dyn fmt::Write,
        submit: &Submit,
        reset: Option<&str>,
        ctx: &RequestContext,
    ) -> fmt::Result {
        match submit {
            Submit::Default => writeln!(
                out,
                r#"<input type="submit" value="{}" />"#,
                escape_html(&ctx.message("submit-button"))
            )?,
            Submit::Label(label) => writeln!(
                out,
                r#"<input type="submit" value="{}" />"#,
                escape_html(&ctx.translate(label))
            )?,
            Submit::Buttons(buttons) => {
                for (label, name) in buttons {
                    writeln!(
                        out,
                        r#"<input type="submit" name="{}" value="{}" />"#,
                        escape_html(name),
                        escape_html(&ctx.translate(label))
                    )?;
                }
            }
        }
        if let Some(label) = reset {
            let label = if label.is_empty() {
                ctx.message("reset-button")
            } else {
                ctx.translate(label)
            };
            writeln!(out, r#"<input type="reset" value="{}" />"#, escape_html(&label))?;
        }
        Ok(())
    }

    fn write_scripts(
        &self,
        out: &mut dyn fmt::Write,
        scripts: &[Script],
        ctx: &RequestContext,
    ) -> fmt::Result {
        let base = ctx.scripts_url().trim_end_matches('/');
        for script in scripts {
            writeln!(out, "<!-- {} -->", script.notice)?;
            writeln!(
                out,
                r#"<script type="text/javascript" src="{}/{}"></script>"#,
                escape_html(base),
                escape_html(script.filename)
            )?;
        }
        Ok(())
    }

    fn write_close(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "</form>")
    }
}

/// The editable renderer's routines for the built-in field kinds.
pub(crate) const ROUTINES: &[(FieldKind, RenderFn)] = &[
    (FieldKind::STRING, render_text),
    (FieldKind::TEXTAREA, render_textarea),
    (FieldKind::PASSWORD, render_password),
    (FieldKind::EMAIL, render_text),
    (FieldKind::URL, render_text),
    (FieldKind::INT, render_text),
    (FieldKind::FLOAT, render_text),
    (FieldKind::BOOL, render_bool),
    (FieldKind::RADIO, render_radio),
    (FieldKind::MENU, render_menu),
    (FieldKind::CHECKBOXES, render_checkboxes),
    (FieldKind::LISTBOX, render_listbox),
    (FieldKind::DATE, render_text),
    (FieldKind::JSDATE, render_jsdate),
    (FieldKind::FILE_UPLOAD, render_file),
];

/// The error line shown above an input, or nothing.
pub(crate) fn error_markup(error: Option<&str>) -> String {
    error.map_or_else(String::new, |msg| {
        format!(r#"<span class="{CSS_ERROR}">{}</span><br/>"#, escape_html(msg))
    })
}

const fn state_attrs(state: FieldState) -> &'static str {
    match state {
        FieldState::ReadOnly => r#" readonly="readonly""#,
        FieldState::Disabled => r#" disabled="disabled""#,
        FieldState::Normal | FieldState::Hidden => "",
    }
}

struct Input<'i> {
    html_type: &'static str,
    value: &'i str,
    checked: bool,
    label: Option<String>,
}

fn input(r: &FieldRender<'_>, attrs: &Input<'_>) -> String {
    let checked = if attrs.checked { r#" checked="checked""# } else { "" };
    let tag = format!(
        r#"<input name="{}" type="{}" value="{}" class="{}"{checked}{} />"#,
        escape_html(r.field.name()),
        attrs.html_type,
        escape_html(attrs.value),
        r.field.converter().css_class(),
        state_attrs(r.state),
    );
    match &attrs.label {
        Some(label) => format!("<label>{tag} {}</label>", escape_html(label)),
        None => tag,
    }
}

fn single(r: &FieldRender<'_>, html_type: &'static str) -> AtochaResult<String> {
    let value = r.value.as_text().ok_or_else(|| list_for_single(r))?;
    Ok(error_markup(r.error)
        + &input(
            r,
            &Input {
                html_type,
                value,
                checked: false,
                label: None,
            },
        ))
}

fn list_for_single(r: &FieldRender<'_>) -> InternalError {
    InternalError::new(format!(
        "field '{}' cannot render a list as a single input",
        r.field.name()
    ))
}

fn wrong_type(r: &FieldRender<'_>, expected: FieldKind) -> InternalError {
    InternalError::new(format!(
        "field '{}' of kind '{}' is not a '{expected}' field",
        r.field.name(),
        r.field.kind()
    ))
}

fn orient(inputs: &[String], orientation: Orientation) -> String {
    match orientation {
        Orientation::Vertical => {
            let mut out = format!("<table class=\"{CSS_VERTICAL}\">\n");
            for i in inputs {
                out.push_str("<tr><td>");
                out.push_str(i);
                out.push_str("</td></tr>\n");
            }
            out.push_str("</table>");
            out
        }
        Orientation::Horizontal => inputs.join("\n"),
    }
}

fn choice_inputs(
    r: &FieldRender<'_>,
    html_type: &'static str,
    choices: &[(String, String)],
) -> Vec<String> {
    choices
        .iter()
        .map(|(value, label)| {
            input(
                r,
                &Input {
                    html_type,
                    value,
                    checked: r.value.contains(value),
                    label: Some(r.ctx.translate(label)),
                },
            )
        })
        .collect()
}

fn select(
    r: &FieldRender<'_>,
    choices: &[(String, String)],
    multiple: bool,
    size: Option<u32>,
) -> String {
    let mut attrs = String::new();
    if let Some(size) = size.filter(|s| *s > 1) {
        attrs.push_str(&format!(r#" size="{size}""#));
    }
    if multiple {
        attrs.push_str(r#" multiple="multiple""#);
    }
    attrs.push_str(state_attrs(r.state));

    let mut lines = vec![format!(
        r#"<select name="{}" class="{}"{attrs}>"#,
        escape_html(r.field.name()),
        r.field.converter().css_class()
    )];
    for (value, label) in choices {
        let selected = if r.value.contains(value) {
            r#" selected="selected""#
        } else {
            ""
        };
        lines.push(format!(
            r#"<option value="{}"{selected}>{}</option>"#,
            escape_html(value),
            escape_html(&r.ctx.translate(label))
        ));
    }
    lines.push("</select>".to_string());
    error_markup(r.error) + &lines.join("\n")
}

fn render_text(r: &FieldRender<'_>) -> AtochaResult<String> {
    single(r, "text")
}

fn render_password(r: &FieldRender<'_>) -> AtochaResult<String> {
    single(r, "password")
}

fn render_file(r: &FieldRender<'_>) -> AtochaResult<String> {
    single(r, "file")
}

fn render_textarea(r: &FieldRender<'_>) -> AtochaResult<String> {
    let value = r.value.as_text().ok_or_else(|| list_for_single(r))?;
    let mut attrs = String::new();
    if let FieldType::TextArea(area) = r.field.field_type() {
        if let Some(rows) = area.rows {
            attrs.push_str(&format!(r#" rows="{rows}""#));
        }
        if let Some(cols) = area.cols {
            attrs.push_str(&format!(r#" cols="{cols}""#));
        }
    }
    attrs.push_str(state_attrs(r.state));
    Ok(format!(
        r#"{}<textarea name="{}" class="{}"{attrs}>{}</textarea>"#,
        error_markup(r.error),
        escape_html(r.field.name()),
        r.field.converter().css_class(),
        escape_html(value)
    ))
}

fn render_bool(r: &FieldRender<'_>) -> AtochaResult<String> {
    let checked = r.value.as_text().ok_or_else(|| list_for_single(r))?;
    Ok(error_markup(r.error)
        + &input(
            r,
            &Input {
                html_type: "checkbox",
                value: "1",
                checked: checked == "1",
                label: None,
            },
        ))
}

fn render_radio(r: &FieldRender<'_>) -> AtochaResult<String> {
    let FieldType::Radio(radio) = r.field.field_type() else {
        return Err(wrong_type(r, FieldKind::RADIO).into());
    };
    let inputs = choice_inputs(r, "radio", &radio.choices);
    Ok(error_markup(r.error) + &orient(&inputs, radio.orient))
}

fn render_checkboxes(r: &FieldRender<'_>) -> AtochaResult<String> {
    let FieldType::Checkboxes(boxes) = r.field.field_type() else {
        return Err(wrong_type(r, FieldKind::CHECKBOXES).into());
    };
    let inputs = choice_inputs(r, "checkbox", &boxes.choices);
    Ok(error_markup(r.error) + &orient(&inputs, boxes.orient))
}

fn render_menu(r: &FieldRender<'_>) -> AtochaResult<String> {
    let FieldType::Menu(menu) = r.field.field_type() else {
        return Err(wrong_type(r, FieldKind::MENU).into());
    };
    Ok(select(r, &menu.choices, false, None))
}

fn render_listbox(r: &FieldRender<'_>) -> AtochaResult<String> {
    let FieldType::Listbox(listbox) = r.field.field_type() else {
        return Err(wrong_type(r, FieldKind::LISTBOX).into());
    };
    Ok(select(r, &listbox.choices, listbox.multiple, listbox.size))
}

fn render_jsdate(r: &FieldRender<'_>) -> AtochaResult<String> {
    let value = r.value.as_text().ok_or_else(|| list_for_single(r))?;
    let mut out = single(r, "text")?;
    let name = r.field.name();
    if value.is_empty() {
        out.push_str(&format!(
            r#"<script type="text/javascript">DateInput('{name}', true, 'YYYYMMDD')</script>"#
        ));
    } else {
        out.push_str(&format!(
            r#"<script type="text/javascript">DateInput('{name}', true, 'YYYYMMDD', '{}')</script>"#,
            escape_html(value)
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{
        BoolField, CheckboxesField, JsDateField, ListboxField, MenuField, RadioField,
        StringField, TextAreaField,
    };
    use crate::render::RenderOptions;
    use crate::value::Value;

    fn render_one(field: Field, value: Option<Value>) -> String {
        let name = field.name().to_string();
        let form = Form::builder("t").field(field).build().unwrap();
        let ctx = RequestContext::new();
        let mut r = TextFormRenderer::text(&form, &ctx);
        if let Some(value) = value {
            r.update_values([(name.clone(), value)]);
        }
        let html = r.render_field(&name, None).unwrap();
        r.finish().unwrap();
        html
    }

    #[test]
    fn test_string_input_escapes() {
        let html = render_one(
            Field::new("q", StringField::new()),
            Some(Value::from(r#"a "b" <c>"#)),
        );
        assert_eq!(
            html,
            r#"<input name="q" type="text" value="a &quot;b&quot; &lt;c&gt;" class="string" />"#
        );
    }

    #[test]
    fn test_error_markup_precedes_input() {
        let form = Form::builder("t")
            .field(Field::new("q", StringField::new()))
            .build()
            .unwrap();
        let ctx = RequestContext::new();
        let mut errors = crate::parse::ErrorMap::new();
        errors.insert("q", ("Too <short>.", "x"));
        let mut r = TextFormRenderer::text(&form, &ctx).with_errors(errors);
        let html = r.render_field("q", None).unwrap();
        assert!(html.starts_with(
            r#"<span class="formerror">Too &lt;short&gt;.</span><br/><input name="q""#
        ));
    }

    #[test]
    fn test_read_only_state() {
        let form = Form::builder("t")
            .field(Field::new("q", StringField::new()).with_state(FieldState::ReadOnly))
            .build()
            .unwrap();
        let ctx = RequestContext::new();
        let mut r = TextFormRenderer::text(&form, &ctx).with_values([("q", "v")]);
        let html = r.render_field("q", None).unwrap();
        assert!(html.contains(r#"readonly="readonly""#));
    }

    #[test]
    fn test_textarea() {
        let html = render_one(
            Field::new("body", TextAreaField::new().size(4, 40)),
            Some(Value::from("x < y")),
        );
        assert_eq!(
            html,
            r#"<textarea name="body" class="textarea" rows="4" cols="40">x &lt; y</textarea>"#
        );
    }

    #[test]
    fn test_bool_checked() {
        let on = render_one(Field::new("ok", BoolField::new()), Some(Value::Bool(true)));
        assert!(on.contains(r#"type="checkbox" value="1""#));
        assert!(on.contains(r#"checked="checked""#));
        let off = render_one(Field::new("ok", BoolField::new()), Some(Value::Bool(false)));
        assert!(off.contains(r#"type="checkbox" value="1""#));
        assert!(!off.contains("checked="));
    }

    #[test]
    fn test_radio_vertical_and_horizontal() {
        let colors = [("r", "Red"), ("g", "Green")];
        let html = render_one(
            Field::new("c", RadioField::new(colors)),
            Some(Value::from("g")),
        );
        assert!(html.starts_with(r#"<table class="formminitable">"#));
        assert!(html.contains(
            r#"<label><input name="c" type="radio" value="g" class="radio" checked="checked" /> Green</label>"#
        ));
        let html = render_one(
            Field::new("c", RadioField::new(colors).orient(Orientation::Horizontal)),
            None,
        );
        assert!(!html.contains("<table"));
        assert!(!html.contains("checked="));
    }

    #[test]
    fn test_checkboxes_mark_selected() {
        let html = render_one(
            Field::new("c", CheckboxesField::new([("a", "A"), ("b", "B"), ("c", "C")])),
            Some(Value::from(vec!["a", "c"])),
        );
        assert_eq!(html.matches(r#"checked="checked""#).count(), 2);
    }

    #[test]
    fn test_menu_and_listbox() {
        let menu = render_one(
            Field::new("m", MenuField::new([("1", "One"), ("2", "Two")])),
            Some(Value::from("2")),
        );
        assert!(menu.contains(r#"<select name="m" class="menu">"#));
        assert!(menu.contains(r#"<option value="2" selected="selected">Two</option>"#));

        let listbox = render_one(
            Field::new("l", ListboxField::new([("1", "One"), ("2", "Two")]).multiple().size(5)),
            Some(Value::from(vec!["1", "2"])),
        );
        assert!(listbox.contains(r#"size="5" multiple="multiple""#));
        assert_eq!(listbox.matches("selected=").count(), 2);
    }

    #[test]
    fn test_jsdate_emits_widget_call() {
        let date = chrono::NaiveDate::from_ymd_opt(2001, 9, 11).unwrap();
        let html = render_one(Field::new("when", JsDateField::new()), Some(Value::Date(date)));
        assert!(html.contains(r#"value="20010911""#));
        assert!(html.contains("DateInput('when', true, 'YYYYMMDD', '20010911')"));
    }

    #[test]
    fn test_full_render_layout() {
        let form = Form::builder("f")
            .field(Field::new("name", StringField::new()).required())
            .field(Field::new("token", StringField::new()).hidden().with_initial("t1"))
            .action("/post")
            .reset("")
            .accept_charset("UTF-8")
            .build()
            .unwrap();
        let ctx = RequestContext::new();
        let mut r = TextFormRenderer::text(&form, &ctx);
        let html = r.render().unwrap();
        r.finish().unwrap();
        let expected = concat!(
            r#"<form id="f" name="f" action="/post" method="POST" accept-charset="UTF-8">"#,
            "\n",
            r#"<table class="formtable">"#,
            "\n",
            r#"<tr><td class="formlabel">Name<span class="formreq">*</span></td>"#,
            "\n",
            r#"    <td class="forminput"><input name="name" type="text" value="" class="string" /></td></tr>"#,
            "\n",
            "</table>\n",
            r#"<input name="token" type="hidden" value="t1" />"#,
            "\n",
            r#"<input type="submit" value="Submit" />"#,
            "\n",
            r#"<input type="reset" value="Reset" />"#,
            "\n",
            "</form>\n",
        );
        assert_eq!(html, expected);
    }

    #[test]
    fn test_table_css_class_and_colon() {
        let form = Form::builder("f")
            .field(Field::new("a", StringField::new()))
            .build()
            .unwrap();
        let ctx = RequestContext::from_settings(&atocha_rs_core::settings::Settings {
            label_colon: true,
            ..Default::default()
        });
        let mut r = TextFormRenderer::text(&form, &ctx);
        let html = r
            .render_table(&RenderOptions::default().css_class("wide"))
            .unwrap();
        assert!(html.starts_with(r#"<table class="formtable wide">"#));
        assert!(html.contains(">A:</td>"));
    }

    #[test]
    fn test_submit_buttons_translated() {
        let form = Form::builder("f")
            .submit(Submit::Buttons(vec![
                ("Save".to_string(), "save".to_string()),
                ("Cancel".to_string(), "cancel".to_string()),
            ]))
            .build()
            .unwrap();
        let ctx = RequestContext::new().with_translator(|s: &str| format!("{s}!"));
        let mut r = TextFormRenderer::text(&form, &ctx);
        let html = r.render_submit(None).unwrap();
        assert_eq!(
            html,
            "<input type=\"submit\" name=\"save\" value=\"Save!\" />\n\
             <input type=\"submit\" name=\"cancel\" value=\"Cancel!\" />\n"
        );
    }

    #[test]
    fn test_scripts_keep_notice() {
        let form = Form::builder("f")
            .field(Field::new("start", JsDateField::new()))
            .field(Field::new("end", JsDateField::new()))
            .build()
            .unwrap();
        let ctx = RequestContext::new().with_scripts_url("/static/");
        let r = TextFormRenderer::text(&form, &ctx).incomplete();
        let html = r.render_scripts().unwrap();
        assert_eq!(html.matches("<script").count(), 1);
        assert!(html.contains(r#"src="/static/calendarDateInput.js""#));
        assert!(html.contains("Keep this notice intact"));
    }

    #[test]
    fn test_render_to_sink() {
        let form = Form::builder("f")
            .field(Field::new("a", StringField::new()))
            .action("/x")
            .build()
            .unwrap();
        let ctx = RequestContext::new();
        let mut out = String::from("<body>\n");
        let mut r = TextFormRenderer::text(&form, &ctx);
        r.render_to(&mut out, &RenderOptions::default()).unwrap();
        r.finish().unwrap();
        assert!(out.starts_with("<body>\n<form "));
        assert!(out.ends_with("</form>\n"));
    }
}
