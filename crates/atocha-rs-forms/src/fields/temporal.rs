//! Date fields.

use std::sync::LazyLock;

use atocha_rs_core::context::RequestContext;
use atocha_rs_core::error::InternalError;
use atocha_rs_core::i18n::LocaleData;
use chrono::{Datelike, NaiveDate};
use regex::Regex;

use super::{invalid, raw_text, unexpected, FieldConverter, FieldKind, ParseFailure, Script};
use crate::value::{RawValue, RenderValue, TypeSet, TypeTag, Value};

static ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)-([0-9]+)-([0-9]+)$").expect("valid regex"));

// 11 Sep 2001
static DAY_MONTH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\s+(\w+)\s+([0-9]+)$").expect("valid regex"));

// Sep 11, 2001
static MONTH_DAY_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\s+([0-9]+)[\s,]+([0-9]+)$").expect("valid regex"));

static SCRIPT_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_]+$").expect("valid regex"));

const JSDATE_SCRIPTS: &[Script] = &[Script {
    filename: "calendarDateInput.js",
    notice: "Jason's Date Input Calendar- By Jason Moon http://www.jasonmoon.net/ \
             Script featured on and available at http://www.dynamicdrive.com \
             Keep this notice intact for use.",
}];

enum MonthPart<'a> {
    Number(&'a str),
    Name(&'a str),
}

/// Formats a date for reading, e.g. `Tue, 11 September 2001`.
///
/// Years before 1900 use a plain `year-month-day` form without padding.
pub fn long_date(date: NaiveDate, locale: &LocaleData) -> String {
    if date.year() < 1900 {
        return format!("{}-{}-{}", date.year(), date.month(), date.day());
    }
    let weekday = date.weekday().num_days_from_monday() as usize;
    let month = date.month0() as usize;
    format!(
        "{}, {:02} {} {}",
        locale.abbr_weekdays().get(weekday).map_or("", String::as_str),
        date.day(),
        locale.months().get(month).map_or("", String::as_str),
        date.year()
    )
}

/// A free-form date input.
///
/// Accepts `YYYY-MM-DD`, `11 Sep 2001` and `Sep 11, 2001`, tried in that
/// order. Month names come from the request locale; abbreviations are tried
/// first. Renders as ISO text. Year 0 is not a valid date.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateField;

impl DateField {
    /// Creates a date field.
    pub const fn new() -> Self {
        Self
    }

    fn parse_date(text: &str, ctx: &RequestContext) -> Result<Option<NaiveDate>, ParseFailure> {
        let value = text.trim();
        if value.is_empty() {
            return Ok(None);
        }

        let (year, month, day) = if let Some(c) = ISO_RE.captures(value) {
            (c.get(1), c.get(2).map(|m| MonthPart::Number(m.as_str())), c.get(3))
        } else if let Some(c) = DAY_MONTH_YEAR_RE.captures(value) {
            (c.get(3), c.get(2).map(|m| MonthPart::Name(m.as_str())), c.get(1))
        } else if let Some(c) = MONTH_DAY_YEAR_RE.captures(value) {
            (c.get(3), c.get(1).map(|m| MonthPart::Name(m.as_str())), c.get(2))
        } else {
            return Err(invalid(ctx, "date-invalid-format", &[value], text));
        };
        let (Some(year), Some(month), Some(day)) = (year, month, day) else {
            return Err(invalid(ctx, "date-invalid-format", &[value], text));
        };

        let month = match month {
            MonthPart::Number(digits) => digits.parse::<u32>().ok(),
            MonthPart::Name(name) => Some(
                ctx.locale()
                    .month_number(name)
                    .ok_or_else(|| invalid(ctx, "date-invalid-month", &[name], text))?,
            ),
        };

        month
            .zip(year.as_str().parse::<i32>().ok())
            .zip(day.as_str().parse::<u32>().ok())
            .filter(|&((_, y), _)| y >= 1)
            .and_then(|((m, y), d)| NaiveDate::from_ymd_opt(y, m, d))
            .map(Some)
            .ok_or_else(|| invalid(ctx, "date-invalid", &[value], text))
    }
}

impl FieldConverter for DateField {
    fn kind(&self) -> FieldKind {
        FieldKind::DATE
    }

    fn types_data(&self) -> TypeSet {
        TypeSet::of(&[TypeTag::Unset, TypeTag::Date])
    }

    fn parse(&self, raw: &RawValue, ctx: &RequestContext) -> Result<Value, ParseFailure> {
        let Some(text) = raw_text(self.kind(), raw)? else {
            return Ok(Value::Unset);
        };
        Ok(Self::parse_date(text, ctx)?.map_or(Value::Unset, Value::Date))
    }

    fn render(&self, value: &Value) -> Result<RenderValue, InternalError> {
        match value {
            Value::Unset => Ok(RenderValue::Text(String::new())),
            Value::Date(d) => Ok(RenderValue::Text(d.format("%Y-%m-%d").to_string())),
            other => Err(unexpected(self.kind(), other)),
        }
    }

    fn display(&self, value: &Value, ctx: &RequestContext) -> Result<String, InternalError> {
        match value {
            Value::Unset => Ok(String::new()),
            Value::Date(d) => Ok(long_date(*d, ctx.locale())),
            other => Err(unexpected(self.kind(), other)),
        }
    }

    fn css_class(&self) -> &'static str {
        "date"
    }
}

/// A date picked with a client-side calendar widget.
///
/// The widget always submits `YYYYMMDD`, so the field is always required and
/// malformed input is a defect. Only a well-formed but impossible date, year 0
/// included, is a user error. The field name must be a plain identifier since it appears in
/// generated script code.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsDateField;

impl JsDateField {
    /// Creates a script-assisted date field.
    pub const fn new() -> Self {
        Self
    }
}

impl FieldConverter for JsDateField {
    fn kind(&self) -> FieldKind {
        FieldKind::JSDATE
    }

    fn types_data(&self) -> TypeSet {
        TypeSet::of(&[TypeTag::Date])
    }

    fn parse(&self, raw: &RawValue, ctx: &RequestContext) -> Result<Value, ParseFailure> {
        let Some(text) = raw_text(self.kind(), raw)? else {
            return Err(InternalError::new("date widget submitted no value").into());
        };
        if !text.is_ascii() {
            return Err(InternalError::new("date widget submitted non-ASCII input").into());
        }
        if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InternalError::new(format!(
                "date widget submitted malformed input '{text}'"
            ))
            .into());
        }
        let year = text[0..4].parse::<i32>().ok();
        let month = text[4..6].parse::<u32>().ok();
        let day = text[6..8].parse::<u32>().ok();
        match (year, month, day) {
            (Some(y), Some(m), Some(d)) if y >= 1 => NaiveDate::from_ymd_opt(y, m, d)
                .map(Value::Date)
                .ok_or_else(|| invalid(ctx, "date-invalid", &[text], text)),
            _ => Err(invalid(ctx, "date-invalid", &[text], text)),
        }
    }

    fn render(&self, value: &Value) -> Result<RenderValue, InternalError> {
        match value {
            Value::Unset => Ok(RenderValue::Text(String::new())),
            Value::Date(d) => Ok(RenderValue::Text(d.format("%Y%m%d").to_string())),
            other => Err(unexpected(self.kind(), other)),
        }
    }

    fn display(&self, value: &Value, ctx: &RequestContext) -> Result<String, InternalError> {
        match value {
            Value::Unset => Ok(String::new()),
            Value::Date(d) => Ok(long_date(*d, ctx.locale())),
            other => Err(unexpected(self.kind(), other)),
        }
    }

    fn css_class(&self) -> &'static str {
        "jsdate"
    }

    fn scripts(&self) -> &'static [Script] {
        JSDATE_SCRIPTS
    }

    fn client_supplied(&self) -> bool {
        true
    }

    fn validate(&self, name: &str) -> Result<(), String> {
        if SCRIPT_NAME_RE.is_match(name) {
            Ok(())
        } else {
            Err("name must contain only ASCII letters and underscores".to_string())
        }
    }
}
