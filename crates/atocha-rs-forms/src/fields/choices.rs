//! Boolean and choice fields.
//!
//! Choices are `(value, label)` pairs. Values are what the browser submits;
//! labels are untranslated and go through the request translator when shown.

use std::collections::HashSet;

use atocha_rs_core::context::RequestContext;
use atocha_rs_core::error::InternalError;

use super::{invalid, raw_text, unexpected, FieldConverter, FieldKind, ParseFailure};
use crate::value::{RawValue, RenderValue, TypeSet, TypeTag, Value};

/// Layout of radio buttons and checkboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// One choice per row.
    #[default]
    Vertical,
    /// All choices on one line.
    Horizontal,
}

fn to_choices<I, V, L>(choices: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (V, L)>,
    V: Into<String>,
    L: Into<String>,
{
    choices
        .into_iter()
        .map(|(v, l)| (v.into(), l.into()))
        .collect()
}

fn check_choices(choices: &[(String, String)]) -> Result<(), String> {
    if choices.is_empty() {
        return Err("no choices declared".to_string());
    }
    let mut seen = HashSet::new();
    for (value, _) in choices {
        if !seen.insert(value.as_str()) {
            return Err(format!("duplicate choice value '{value}'"));
        }
    }
    Ok(())
}

fn choice_label(choices: &[(String, String)], value: &str, ctx: &RequestContext) -> String {
    choices
        .iter()
        .find(|(v, _)| v == value)
        .map_or_else(|| value.to_string(), |(_, label)| ctx.translate(label))
}

fn parse_single(
    kind: FieldKind,
    choices: &[(String, String)],
    raw: &RawValue,
    ctx: &RequestContext,
) -> Result<Value, ParseFailure> {
    let Some(text) = raw_text(kind, raw)? else {
        return Ok(Value::Unset);
    };
    if text.is_empty() {
        return Ok(Value::Unset);
    }
    if !choices.iter().any(|(v, _)| v == text) {
        return Err(invalid(ctx, "choice-invalid", &[text], text));
    }
    Ok(Value::Text(text.to_string()))
}

fn parse_multiple(
    kind: FieldKind,
    choices: &[(String, String)],
    min_selected: usize,
    raw: &RawValue,
    ctx: &RequestContext,
) -> Result<Value, ParseFailure> {
    let selected: Vec<String> = match raw {
        RawValue::Absent => return Ok(Value::Unset),
        RawValue::Text(s) => vec![s.clone()],
        RawValue::List(items) => items.clone(),
        RawValue::File(_) => {
            return Err(ParseFailure::Internal(InternalError::new(format!(
                "field kind '{kind}' cannot parse a file value"
            ))))
        }
    };
    let selected: Vec<String> = selected.into_iter().filter(|s| !s.is_empty()).collect();
    if selected.is_empty() {
        return Ok(Value::Unset);
    }
    let joined = selected.join(", ");
    if let Some(bad) = selected.iter().find(|s| !choices.iter().any(|(v, _)| v == *s)) {
        return Err(invalid(ctx, "choice-invalid", &[bad.as_str()], &joined));
    }
    if selected.len() < min_selected {
        return Err(invalid(ctx, "one-choice-required", &[], &joined));
    }
    Ok(Value::List(selected))
}

fn render_single(kind: FieldKind, value: &Value) -> Result<RenderValue, InternalError> {
    match value {
        Value::Unset => Ok(RenderValue::Text(String::new())),
        Value::Text(s) => Ok(RenderValue::Text(s.clone())),
        other => Err(unexpected(kind, other)),
    }
}

fn render_multiple(kind: FieldKind, value: &Value) -> Result<RenderValue, InternalError> {
    match value {
        Value::Unset => Ok(RenderValue::List(Vec::new())),
        Value::List(items) => Ok(RenderValue::List(items.clone())),
        other => Err(unexpected(kind, other)),
    }
}

fn display_choices(
    kind: FieldKind,
    choices: &[(String, String)],
    value: &Value,
    ctx: &RequestContext,
) -> Result<String, InternalError> {
    match value {
        Value::Unset => Ok(String::new()),
        Value::Text(s) => Ok(choice_label(choices, s, ctx)),
        Value::List(items) => Ok(items
            .iter()
            .map(|s| choice_label(choices, s, ctx))
            .collect::<Vec<_>>()
            .join(", ")),
        other => Err(unexpected(kind, other)),
    }
}

/// A single checkbox.
///
/// An unchecked box is not submitted at all, so an optional boolean that was
/// left unchecked produces no parsed value. Blank submissions count as
/// missing too. `false` renders as `"0"` so that it survives a hidden field.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolField;

impl BoolField {
    /// Creates a checkbox field.
    pub const fn new() -> Self {
        Self
    }
}

impl FieldConverter for BoolField {
    fn kind(&self) -> FieldKind {
        FieldKind::BOOL
    }

    fn types_data(&self) -> TypeSet {
        TypeSet::of(&[TypeTag::Unset, TypeTag::Bool])
    }

    fn parse(&self, raw: &RawValue, _ctx: &RequestContext) -> Result<Value, ParseFailure> {
        let Some(text) = raw_text(self.kind(), raw)? else {
            return Ok(Value::Unset);
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(Value::Unset);
        }
        let off = matches!(
            text.to_ascii_lowercase().as_str(),
            "0" | "false" | "off" | "no"
        );
        Ok(Value::Bool(!off))
    }

    fn render(&self, value: &Value) -> Result<RenderValue, InternalError> {
        match value {
            Value::Bool(true) => Ok(RenderValue::Text("1".to_string())),
            Value::Bool(false) => Ok(RenderValue::Text("0".to_string())),
            Value::Unset => Ok(RenderValue::Text(String::new())),
            other => Err(unexpected(self.kind(), other)),
        }
    }

    fn display(&self, value: &Value, ctx: &RequestContext) -> Result<String, InternalError> {
        match value {
            Value::Bool(true) => Ok(ctx.translate("Yes")),
            Value::Bool(false) => Ok(ctx.translate("No")),
            Value::Unset => Ok(String::new()),
            other => Err(unexpected(self.kind(), other)),
        }
    }

    fn css_class(&self) -> &'static str {
        "bool"
    }
}

/// A set of radio buttons; exactly one value may be chosen.
#[derive(Debug, Clone, Default)]
pub struct RadioField {
    /// The `(value, label)` choices.
    pub choices: Vec<(String, String)>,
    /// Button layout.
    pub orient: Orientation,
}

impl RadioField {
    /// Creates a radio field from `(value, label)` pairs.
    pub fn new<I, V, L>(choices: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        Self {
            choices: to_choices(choices),
            orient: Orientation::default(),
        }
    }

    /// Sets the layout.
    #[must_use]
    pub fn orient(mut self, orient: Orientation) -> Self {
        self.orient = orient;
        self
    }
}

impl FieldConverter for RadioField {
    fn kind(&self) -> FieldKind {
        FieldKind::RADIO
    }

    fn types_data(&self) -> TypeSet {
        TypeSet::UNSET_TEXT
    }

    fn parse(&self, raw: &RawValue, ctx: &RequestContext) -> Result<Value, ParseFailure> {
        parse_single(self.kind(), &self.choices, raw, ctx)
    }

    fn render(&self, value: &Value) -> Result<RenderValue, InternalError> {
        render_single(self.kind(), value)
    }

    fn display(&self, value: &Value, ctx: &RequestContext) -> Result<String, InternalError> {
        display_choices(self.kind(), &self.choices, value, ctx)
    }

    fn css_class(&self) -> &'static str {
        "radio"
    }

    fn validate(&self, _name: &str) -> Result<(), String> {
        check_choices(&self.choices)
    }
}

/// A drop-down menu with a single selection.
#[derive(Debug, Clone, Default)]
pub struct MenuField {
    /// The `(value, label)` choices.
    pub choices: Vec<(String, String)>,
}

impl MenuField {
    /// Creates a menu from `(value, label)` pairs.
    pub fn new<I, V, L>(choices: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        Self {
            choices: to_choices(choices),
        }
    }
}

impl FieldConverter for MenuField {
    fn kind(&self) -> FieldKind {
        FieldKind::MENU
    }

    fn types_data(&self) -> TypeSet {
        TypeSet::UNSET_TEXT
    }

    fn parse(&self, raw: &RawValue, ctx: &RequestContext) -> Result<Value, ParseFailure> {
        parse_single(self.kind(), &self.choices, raw, ctx)
    }

    fn render(&self, value: &Value) -> Result<RenderValue, InternalError> {
        render_single(self.kind(), value)
    }

    fn display(&self, value: &Value, ctx: &RequestContext) -> Result<String, InternalError> {
        display_choices(self.kind(), &self.choices, value, ctx)
    }

    fn css_class(&self) -> &'static str {
        "menu"
    }

    fn validate(&self, _name: &str) -> Result<(), String> {
        check_choices(&self.choices)
    }
}

/// A group of checkboxes; any number of values may be chosen.
#[derive(Debug, Clone, Default)]
pub struct CheckboxesField {
    /// The `(value, label)` choices.
    pub choices: Vec<(String, String)>,
    /// Checkbox layout.
    pub orient: Orientation,
    /// Fewest selections accepted once anything is selected.
    pub min_selected: usize,
}

impl CheckboxesField {
    /// Creates a checkbox group from `(value, label)` pairs.
    pub fn new<I, V, L>(choices: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        Self {
            choices: to_choices(choices),
            orient: Orientation::default(),
            min_selected: 0,
        }
    }

    /// Sets the layout.
    #[must_use]
    pub fn orient(mut self, orient: Orientation) -> Self {
        self.orient = orient;
        self
    }

    /// Sets the minimum number of selections.
    #[must_use]
    pub fn min_selected(mut self, n: usize) -> Self {
        self.min_selected = n;
        self
    }
}

impl FieldConverter for CheckboxesField {
    fn kind(&self) -> FieldKind {
        FieldKind::CHECKBOXES
    }

    fn types_data(&self) -> TypeSet {
        TypeSet::of(&[TypeTag::Unset, TypeTag::List])
    }

    fn types_parse(&self) -> TypeSet {
        TypeSet::UNSET_TEXT.with(TypeTag::List)
    }

    fn types_render(&self) -> TypeSet {
        TypeSet::LIST
    }

    fn parse(&self, raw: &RawValue, ctx: &RequestContext) -> Result<Value, ParseFailure> {
        parse_multiple(self.kind(), &self.choices, self.min_selected, raw, ctx)
    }

    fn render(&self, value: &Value) -> Result<RenderValue, InternalError> {
        render_multiple(self.kind(), value)
    }

    fn display(&self, value: &Value, ctx: &RequestContext) -> Result<String, InternalError> {
        display_choices(self.kind(), &self.choices, value, ctx)
    }

    fn css_class(&self) -> &'static str {
        "checkboxes"
    }

    fn validate(&self, _name: &str) -> Result<(), String> {
        check_choices(&self.choices)?;
        if self.min_selected > self.choices.len() {
            return Err(format!(
                "min_selected {} exceeds the {} available choices",
                self.min_selected,
                self.choices.len()
            ));
        }
        Ok(())
    }
}

/// A list box, optionally allowing several selections.
#[derive(Debug, Clone, Default)]
pub struct ListboxField {
    /// The `(value, label)` choices.
    pub choices: Vec<(String, String)>,
    /// Whether several values may be selected.
    pub multiple: bool,
    /// Visible rows.
    pub size: Option<u32>,
}

impl ListboxField {
    /// Creates a single-selection list box from `(value, label)` pairs.
    pub fn new<I, V, L>(choices: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        Self {
            choices: to_choices(choices),
            multiple: false,
            size: None,
        }
    }

    /// Allows several selections.
    #[must_use]
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Sets the number of visible rows.
    #[must_use]
    pub fn size(mut self, rows: u32) -> Self {
        self.size = Some(rows);
        self
    }
}

impl FieldConverter for ListboxField {
    fn kind(&self) -> FieldKind {
        FieldKind::LISTBOX
    }

    fn types_data(&self) -> TypeSet {
        if self.multiple {
            TypeSet::of(&[TypeTag::Unset, TypeTag::List])
        } else {
            TypeSet::UNSET_TEXT
        }
    }

    fn types_parse(&self) -> TypeSet {
        if self.multiple {
            TypeSet::UNSET_TEXT.with(TypeTag::List)
        } else {
            TypeSet::UNSET_TEXT
        }
    }

    fn types_render(&self) -> TypeSet {
        if self.multiple {
            TypeSet::LIST
        } else {
            TypeSet::TEXT
        }
    }

    fn parse(&self, raw: &RawValue, ctx: &RequestContext) -> Result<Value, ParseFailure> {
        if self.multiple {
            parse_multiple(self.kind(), &self.choices, 0, raw, ctx)
        } else {
            parse_single(self.kind(), &self.choices, raw, ctx)
        }
    }

    fn render(&self, value: &Value) -> Result<RenderValue, InternalError> {
        if self.multiple {
            render_multiple(self.kind(), value)
        } else {
            render_single(self.kind(), value)
        }
    }

    fn display(&self, value: &Value, ctx: &RequestContext) -> Result<String, InternalError> {
        display_choices(self.kind(), &self.choices, value, ctx)
    }

    fn css_class(&self) -> &'static str {
        "listbox"
    }

    fn validate(&self, _name: &str) -> Result<(), String> {
        check_choices(&self.choices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atocha_rs_core::i18n::CatalogTranslator;

    const COLORS: [(&str, &str); 3] = [("r", "Red"), ("g", "Green"), ("b", "Blue")];

    fn key(result: Result<Value, ParseFailure>) -> String {
        match result {
            Err(ParseFailure::Invalid(e)) => e.key,
            other => panic!("expected a field error, got {other:?}"),
        }
    }

    #[test]
    fn test_bool_parse_and_render() {
        let ctx = RequestContext::new();
        let f = BoolField::new();
        assert_eq!(f.parse(&RawValue::from("1"), &ctx).unwrap(), Value::Bool(true));
        assert_eq!(f.parse(&RawValue::from("off"), &ctx).unwrap(), Value::Bool(false));
        assert_eq!(f.parse(&RawValue::Absent, &ctx).unwrap(), Value::Unset);
        assert_eq!(f.render(&Value::Bool(true)).unwrap(), RenderValue::from("1"));
        assert_eq!(f.render(&Value::Bool(false)).unwrap(), RenderValue::from("0"));
        assert_eq!(f.render(&Value::Unset).unwrap(), RenderValue::from(""));
        assert_eq!(f.display(&Value::Bool(false), &ctx).unwrap(), "No");
    }

    #[test]
    fn test_bool_false_survives_render_then_parse() {
        let ctx = RequestContext::new();
        let f = BoolField::new();
        for value in [Value::Bool(false), Value::Bool(true)] {
            let RenderValue::Text(text) = f.render(&value).unwrap() else {
                panic!("checkbox renders a single string");
            };
            assert_eq!(f.parse(&RawValue::from(text.as_str()), &ctx).unwrap(), value);
        }
    }

    #[test]
    fn test_bool_blank_is_unset() {
        let ctx = RequestContext::new();
        let f = BoolField::new();
        assert_eq!(f.parse(&RawValue::from(""), &ctx).unwrap(), Value::Unset);
        assert_eq!(f.parse(&RawValue::from("   "), &ctx).unwrap(), Value::Unset);
        assert_eq!(f.parse(&RawValue::from(" no "), &ctx).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_radio_rejects_unknown_choice() {
        let ctx = RequestContext::new();
        let f = RadioField::new(COLORS);
        assert_eq!(f.parse(&RawValue::from("g"), &ctx).unwrap(), Value::from("g"));
        match f.parse(&RawValue::from("x"), &ctx) {
            Err(ParseFailure::Invalid(e)) => {
                assert_eq!(e.key, "choice-invalid");
                assert_eq!(e.message, "Invalid choice: 'x'.");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_menu_display_translates_label() {
        let ctx = RequestContext::new()
            .with_translator(CatalogTranslator::from_pairs(vec![("Blue", "Bleu")]));
        let f = MenuField::new(COLORS);
        assert_eq!(f.display(&Value::from("b"), &ctx).unwrap(), "Bleu");
    }

    #[test]
    fn test_checkboxes_parse() {
        let ctx = RequestContext::new();
        let f = CheckboxesField::new(COLORS);
        let raw = RawValue::List(vec!["r".into(), "b".into()]);
        assert_eq!(
            f.parse(&raw, &ctx).unwrap(),
            Value::from(vec!["r", "b"])
        );
        assert_eq!(
            f.parse(&RawValue::from("g"), &ctx).unwrap(),
            Value::from(vec!["g"])
        );
        let bad = RawValue::List(vec!["r".into(), "z".into()]);
        assert_eq!(key(f.parse(&bad, &ctx)), "choice-invalid");
    }

    #[test]
    fn test_checkboxes_minimum() {
        let ctx = RequestContext::new();
        let f = CheckboxesField::new(COLORS).min_selected(2);
        assert_eq!(key(f.parse(&RawValue::from("r"), &ctx)), "one-choice-required");
        assert!(f.validate("c").is_ok());
        assert!(CheckboxesField::new(COLORS).min_selected(4).validate("c").is_err());
    }

    #[test]
    fn test_checkboxes_display_joins_labels() {
        let ctx = RequestContext::new();
        let f = CheckboxesField::new(COLORS);
        assert_eq!(
            f.display(&Value::from(vec!["r", "g"]), &ctx).unwrap(),
            "Red, Green"
        );
        assert_eq!(f.render(&Value::Unset).unwrap(), RenderValue::List(vec![]));
    }

    #[test]
    fn test_listbox_modes() {
        let single = ListboxField::new(COLORS);
        let multi = ListboxField::new(COLORS).multiple().size(3);
        assert!(!single.types_parse().contains(TypeTag::List));
        assert!(multi.types_parse().contains(TypeTag::List));
        assert_eq!(single.render(&Value::from("r")).unwrap(), RenderValue::from("r"));
        assert!(multi.render(&Value::from("r")).is_err());
    }

    #[test]
    fn test_choice_validation() {
        assert!(RadioField::new(Vec::<(String, String)>::new()).validate("r").is_err());
        assert!(MenuField::new([("a", "A"), ("a", "B")]).validate("m").is_err());
    }
}
