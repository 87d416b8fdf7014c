//! The three value domains of a field.
//!
//! - [`RawValue`]: what the browser submitted, decoded to text.
//! - [`Value`]: the validated, typed (native) value.
//! - [`RenderValue`]: markup-ready text, or a list of texts for multi-valued
//!   widgets.
//!
//! Each field declares which members of each domain it accepts through a
//! [`TypeSet`], and the pipeline checks values against those sets at every
//! boundary.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A file received through a multipart submission.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UploadedFile {
    /// The client-side file name.
    pub filename: String,
    /// The declared MIME type, if any.
    pub content_type: Option<String>,
    /// The file contents.
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Creates a new uploaded file.
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data,
        }
    }

    /// Sets the MIME type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Returns `true` if the browser sent the part without selecting a file.
    pub fn is_empty(&self) -> bool {
        self.filename.is_empty() && self.data.is_empty()
    }

    /// Size of the contents in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Identifies the type of a value in any of the three domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// No value at all (absent input, or the "unset" native value).
    Unset,
    /// A single text value.
    Text,
    /// A signed integer.
    Int,
    /// A floating point number.
    Float,
    /// A boolean.
    Bool,
    /// A calendar date.
    Date,
    /// A list of texts.
    List,
    /// An uploaded file.
    File,
}

impl TypeTag {
    const fn bit(self) -> u16 {
        1 << (self as u16)
    }

    const ALL: [Self; 8] = [
        Self::Unset,
        Self::Text,
        Self::Int,
        Self::Float,
        Self::Bool,
        Self::Date,
        Self::List,
        Self::File,
    ];

    /// A short lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Text => "text",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Date => "date",
            Self::List => "list",
            Self::File => "file",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of [`TypeTag`]s, as declared by a field for one domain.
///
/// # Examples
///
/// ```
/// use atocha_rs_forms::value::{TypeSet, TypeTag};
///
/// const DATA: TypeSet = TypeSet::of(&[TypeTag::Unset, TypeTag::Int]);
/// assert!(DATA.contains(TypeTag::Int));
/// assert!(!DATA.contains(TypeTag::Text));
/// assert_eq!(DATA.to_string(), "{unset, int}");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeSet(u16);

impl TypeSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// `{unset, text}`, the usual parse set.
    pub const UNSET_TEXT: Self = Self::of(&[TypeTag::Unset, TypeTag::Text]);

    /// `{text}`, the usual render set.
    pub const TEXT: Self = Self::of(&[TypeTag::Text]);

    /// `{list}`, the render set of multi-valued widgets.
    pub const LIST: Self = Self::of(&[TypeTag::List]);

    /// Builds a set from a slice of tags.
    pub const fn of(tags: &[TypeTag]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < tags.len() {
            bits |= tags[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Returns this set with `tag` added.
    #[must_use]
    pub const fn with(self, tag: TypeTag) -> Self {
        Self(self.0 | tag.bit())
    }

    /// Returns `true` if `tag` is a member.
    pub const fn contains(self, tag: TypeTag) -> bool {
        self.0 & tag.bit() != 0
    }

    /// Returns `true` if the set has no members.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the members in declaration order.
    pub fn iter(self) -> impl Iterator<Item = TypeTag> {
        TypeTag::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(TypeTag::name).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

impl fmt::Debug for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeSet{self}")
    }
}

/// A validated, native field value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// The "unset" sentinel: no value was provided.
    #[default]
    Unset,
    /// Text.
    Text(String),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// A calendar date.
    Date(NaiveDate),
    /// A list of selected choice values.
    List(Vec<String>),
    /// An uploaded file.
    File(UploadedFile),
}

impl Value {
    /// The type tag of this value.
    pub const fn type_tag(&self) -> TypeTag {
        match self {
            Self::Unset => TypeTag::Unset,
            Self::Text(_) => TypeTag::Text,
            Self::Int(_) => TypeTag::Int,
            Self::Float(_) => TypeTag::Float,
            Self::Bool(_) => TypeTag::Bool,
            Self::Date(_) => TypeTag::Date,
            Self::List(_) => TypeTag::List,
            Self::File(_) => TypeTag::File,
        }
    }

    /// Returns `true` for [`Value::Unset`].
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Returns `true` for a value that is set but carries nothing: blank text,
    /// an empty list or an empty upload. Numbers and booleans are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::File(file) => file.is_empty(),
            Self::Unset | Self::Int(_) | Self::Float(_) | Self::Bool(_) | Self::Date(_) => false,
        }
    }

    /// Returns the text if this is a [`Value::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the date if this is a [`Value::Date`].
    pub const fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the integer if this is a [`Value::Int`].
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the list if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(String::from).collect())
    }
}

impl From<UploadedFile> for Value {
    fn from(file: UploadedFile) -> Self {
        Self::File(file)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Unset, Into::into)
    }
}

/// A submitted value after character decoding, as handed to a field's parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// The parameter was not submitted.
    Absent,
    /// A single text value.
    Text(String),
    /// Several values submitted under the same name.
    List(Vec<String>),
    /// An uploaded file.
    File(UploadedFile),
}

impl RawValue {
    /// The type tag of this raw value; [`RawValue::Absent`] maps to
    /// [`TypeTag::Unset`].
    pub const fn type_tag(&self) -> TypeTag {
        match self {
            Self::Absent => TypeTag::Unset,
            Self::Text(_) => TypeTag::Text,
            Self::List(_) => TypeTag::List,
            Self::File(_) => TypeTag::File,
        }
    }

    /// Returns `true` if nothing meaningful was submitted.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.iter().all(String::is_empty),
            Self::File(file) => file.is_empty(),
        }
    }

    /// Returns the text if this is a [`RawValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Converts the input into the value to redisplay after a rejection.
    pub fn to_render(&self) -> Option<RenderValue> {
        match self {
            Self::Text(s) => Some(RenderValue::Text(s.clone())),
            Self::List(items) => Some(RenderValue::List(items.clone())),
            Self::Absent | Self::File(_) => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// A markup-ready value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RenderValue {
    /// A single text.
    Text(String),
    /// A list of texts (selected choices).
    List(Vec<String>),
}

impl Default for RenderValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl RenderValue {
    /// The type tag of this render value.
    pub const fn type_tag(&self) -> TypeTag {
        match self {
            Self::Text(_) => TypeTag::Text,
            Self::List(_) => TypeTag::List,
        }
    }

    /// Returns the text if this is a [`RenderValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// Returns `true` if `candidate` is (or is among) the rendered value(s).
    pub fn contains(&self, candidate: &str) -> bool {
        match self {
            Self::Text(s) => s == candidate,
            Self::List(items) => items.iter().any(|i| i == candidate),
        }
    }

    /// Iterates over the rendered texts.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        let items: &[String] = match self {
            Self::Text(s) => std::slice::from_ref(s),
            Self::List(items) => items,
        };
        items.iter().map(String::as_str)
    }

    /// Converts a single text into a one-element list; lists are unchanged.
    #[must_use]
    pub fn into_list(self) -> Self {
        match self {
            Self::Text(s) => Self::List(vec![s]),
            list @ Self::List(_) => list,
        }
    }
}

impl From<&str> for RenderValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RenderValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for RenderValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_set_membership() {
        let set = TypeSet::UNSET_TEXT.with(TypeTag::List);
        assert!(set.contains(TypeTag::Unset));
        assert!(set.contains(TypeTag::List));
        assert!(!set.contains(TypeTag::Date));
        assert_eq!(set.to_string(), "{unset, text, list}");
        assert!(TypeSet::EMPTY.is_empty());
    }

    #[test]
    fn test_value_emptiness() {
        assert!(Value::from("").is_empty());
        assert!(Value::List(vec![]).is_empty());
        assert!(!Value::Unset.is_empty());
        assert!(!Value::Int(0).is_empty());
        assert!(!Value::Bool(false).is_empty());
        assert!(!Value::from("x").is_empty());
    }

    #[test]
    fn test_value_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Unset);
        assert_eq!(Value::from(Some(3_i64)), Value::Int(3));
    }

    #[test]
    fn test_raw_value_emptiness() {
        assert!(RawValue::Absent.is_empty());
        assert!(RawValue::from("").is_empty());
        assert!(RawValue::List(vec![String::new()]).is_empty());
        assert!(!RawValue::from(" ").is_empty());
        assert!(RawValue::File(UploadedFile::default()).is_empty());
    }

    #[test]
    fn test_raw_to_render() {
        assert_eq!(RawValue::from("abc").to_render(), Some(RenderValue::from("abc")));
        assert_eq!(RawValue::Absent.to_render(), None);
    }

    #[test]
    fn test_render_value_contains() {
        let list = RenderValue::from(vec!["a".to_string(), "b".to_string()]);
        assert!(list.contains("b"));
        assert!(!list.contains("c"));
        assert!(RenderValue::from("x").contains("x"));
        assert_eq!(RenderValue::from("x").into_list(), RenderValue::List(vec!["x".into()]));
    }

    #[test]
    fn test_value_serde() {
        let v = Value::Date(NaiveDate::from_ymd_opt(2001, 9, 11).unwrap());
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"type":"date","value":"2001-09-11"}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
