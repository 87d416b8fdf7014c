//! Numeric fields.

use atocha_rs_core::context::RequestContext;
use atocha_rs_core::error::InternalError;

use super::{invalid, raw_text, unexpected, FieldConverter, FieldKind, ParseFailure};
use crate::value::{RawValue, RenderValue, TypeSet, TypeTag, Value};

/// An integer input with optional bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntField {
    /// Smallest accepted value.
    pub min: Option<i64>,
    /// Largest accepted value.
    pub max: Option<i64>,
}

impl IntField {
    /// Creates an unbounded integer field.
    pub const fn new() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Sets the lower bound.
    #[must_use]
    pub const fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the upper bound.
    #[must_use]
    pub const fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }
}

impl FieldConverter for IntField {
    fn kind(&self) -> FieldKind {
        FieldKind::INT
    }

    fn types_data(&self) -> TypeSet {
        TypeSet::of(&[TypeTag::Unset, TypeTag::Int])
    }

    fn parse(&self, raw: &RawValue, ctx: &RequestContext) -> Result<Value, ParseFailure> {
        let Some(text) = raw_text(self.kind(), raw)? else {
            return Ok(Value::Unset);
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Value::Unset);
        }
        let n: i64 = trimmed
            .parse()
            .map_err(|_| invalid(ctx, "numerical-invalid", &[], text))?;
        if let Some(min) = self.min.filter(|min| n < *min) {
            return Err(invalid(ctx, "numerical-minval", &[&min.to_string()], text));
        }
        if let Some(max) = self.max.filter(|max| n > *max) {
            return Err(invalid(ctx, "numerical-maxval", &[&max.to_string()], text));
        }
        Ok(Value::Int(n))
    }

    fn render(&self, value: &Value) -> Result<RenderValue, InternalError> {
        match value {
            Value::Unset => Ok(RenderValue::Text(String::new())),
            Value::Int(n) => Ok(RenderValue::Text(n.to_string())),
            other => Err(unexpected(self.kind(), other)),
        }
    }

    fn display(&self, value: &Value, _ctx: &RequestContext) -> Result<String, InternalError> {
        self.render(value)
            .map(|r| r.as_text().map(str::to_string).unwrap_or_default())
    }

    fn css_class(&self) -> &'static str {
        "int"
    }

    fn validate(&self, _name: &str) -> Result<(), String> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => Err(format!("min {min} is greater than max {max}")),
            _ => Ok(()),
        }
    }
}

/// A floating point input with optional bounds.
///
/// Integer native values are accepted for rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FloatField {
    /// Smallest accepted value.
    pub min: Option<f64>,
    /// Largest accepted value.
    pub max: Option<f64>,
}

impl FloatField {
    /// Creates an unbounded float field.
    pub const fn new() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Sets the lower bound.
    #[must_use]
    pub const fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the upper bound.
    #[must_use]
    pub const fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }
}

impl FieldConverter for FloatField {
    fn kind(&self) -> FieldKind {
        FieldKind::FLOAT
    }

    fn types_data(&self) -> TypeSet {
        TypeSet::of(&[TypeTag::Unset, TypeTag::Float, TypeTag::Int])
    }

    fn parse(&self, raw: &RawValue, ctx: &RequestContext) -> Result<Value, ParseFailure> {
        let Some(text) = raw_text(self.kind(), raw)? else {
            return Ok(Value::Unset);
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Value::Unset);
        }
        let f: f64 = trimmed
            .parse()
            .ok()
            .filter(|f: &f64| f.is_finite())
            .ok_or_else(|| invalid(ctx, "numerical-invalid", &[], text))?;
        if let Some(min) = self.min.filter(|min| f < *min) {
            return Err(invalid(ctx, "numerical-minval", &[&min.to_string()], text));
        }
        if let Some(max) = self.max.filter(|max| f > *max) {
            return Err(invalid(ctx, "numerical-maxval", &[&max.to_string()], text));
        }
        Ok(Value::Float(f))
    }

    fn render(&self, value: &Value) -> Result<RenderValue, InternalError> {
        match value {
            Value::Unset => Ok(RenderValue::Text(String::new())),
            Value::Float(f) => Ok(RenderValue::Text(f.to_string())),
            Value::Int(n) => Ok(RenderValue::Text(n.to_string())),
            other => Err(unexpected(self.kind(), other)),
        }
    }

    fn display(&self, value: &Value, _ctx: &RequestContext) -> Result<String, InternalError> {
        self.render(value)
            .map(|r| r.as_text().map(str::to_string).unwrap_or_default())
    }

    fn css_class(&self) -> &'static str {
        "float"
    }

    fn validate(&self, _name: &str) -> Result<(), String> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => Err(format!("min {min} is greater than max {max}")),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(result: Result<Value, ParseFailure>) -> String {
        match result {
            Err(ParseFailure::Invalid(e)) => e.key,
            other => panic!("expected a field error, got {other:?}"),
        }
    }

    #[test]
    fn test_int_parse() {
        let ctx = RequestContext::new();
        let f = IntField::new();
        assert_eq!(f.parse(&RawValue::from(" 42 "), &ctx).unwrap(), Value::Int(42));
        assert_eq!(f.parse(&RawValue::from("-7"), &ctx).unwrap(), Value::Int(-7));
        assert_eq!(key(f.parse(&RawValue::from("4.2"), &ctx)), "numerical-invalid");
        assert_eq!(f.parse(&RawValue::from(""), &ctx).unwrap(), Value::Unset);
    }

    #[test]
    fn test_int_bounds_message() {
        let ctx = RequestContext::new();
        let f = IntField::new().min(1).max(10);
        match f.parse(&RawValue::from("0"), &ctx) {
            Err(ParseFailure::Invalid(e)) => {
                assert_eq!(e.key, "numerical-minval");
                assert_eq!(e.message, "Value too small.  Minimum value is '1'.");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(key(f.parse(&RawValue::from("11"), &ctx)), "numerical-maxval");
        assert_eq!(f.parse(&RawValue::from("10"), &ctx).unwrap(), Value::Int(10));
    }

    #[test]
    fn test_int_round_trip() {
        let ctx = RequestContext::new();
        let f = IntField::new();
        let rendered = f.render(&Value::Int(-12)).unwrap();
        let raw = RawValue::from(rendered.as_text().unwrap());
        assert_eq!(f.parse(&raw, &ctx).unwrap(), Value::Int(-12));
    }

    #[test]
    fn test_float_parse() {
        let ctx = RequestContext::new();
        let f = FloatField::new().max(1.5);
        assert_eq!(f.parse(&RawValue::from("1.25"), &ctx).unwrap(), Value::Float(1.25));
        assert_eq!(key(f.parse(&RawValue::from("2"), &ctx)), "numerical-maxval");
        assert_eq!(key(f.parse(&RawValue::from("inf"), &ctx)), "numerical-invalid");
        assert_eq!(key(f.parse(&RawValue::from("abc"), &ctx)), "numerical-invalid");
    }

    #[test]
    fn test_float_renders_int() {
        let f = FloatField::new();
        assert_eq!(f.render(&Value::Int(3)).unwrap(), RenderValue::from("3"));
        assert_eq!(f.render(&Value::Float(0.5)).unwrap(), RenderValue::from("0.5"));
        assert!(f.render(&Value::from("x")).is_err());
    }

    #[test]
    fn test_bounds_validated() {
        assert!(IntField::new().min(5).max(1).validate("n").is_err());
        assert!(FloatField::new().min(0.0).max(1.0).validate("n").is_ok());
    }
}
