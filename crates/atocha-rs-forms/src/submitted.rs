//! Submitted form data.
//!
//! [`SubmittedData`] is the transport-neutral input of the parser: a map
//! from parameter name to raw bytes, several raw byte strings, or an
//! uploaded file. Adapters for a specific web framework fill it in; bytes are
//! kept undecoded so that the parser can report invalid encodings per field.

use std::collections::HashMap;

use crate::value::UploadedFile;

/// One submitted parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    /// A single value.
    Bytes(Vec<u8>),
    /// Several values under the same name.
    List(Vec<Vec<u8>>),
    /// An uploaded file.
    File(UploadedFile),
}

/// Raw submitted parameters, keyed by name.
///
/// # Examples
///
/// ```
/// use atocha_rs_forms::submitted::{Submitted, SubmittedData};
///
/// let data = SubmittedData::from_urlencoded("name=Ada+Lovelace&tag=a&tag=b");
/// assert_eq!(data.get("name"), Some(&Submitted::Bytes(b"Ada Lovelace".to_vec())));
/// assert!(matches!(data.get("tag"), Some(Submitted::List(v)) if v.len() == 2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmittedData {
    entries: HashMap<String, Submitted>,
}

impl SubmittedData {
    /// Creates an empty set of parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` body or query string.
    ///
    /// Repeated names accumulate into a list. Decoded bytes are not checked
    /// for valid UTF-8 here.
    pub fn from_urlencoded(input: &str) -> Self {
        let mut data = Self::new();
        for pair in input.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = String::from_utf8_lossy(&decode_component(key)).into_owned();
            data.append(key, decode_component(value));
        }
        data
    }

    /// Builds parameters from `(name, value)` text pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let mut data = Self::new();
        for (key, value) in pairs {
            data.append(key, value);
        }
        data
    }

    /// Adds a value, turning an existing single value into a list.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) {
        let value = value.into();
        let name = name.into();
        match self.entries.remove(&name) {
            None => {
                self.entries.insert(name, Submitted::Bytes(value));
            }
            Some(Submitted::Bytes(first)) => {
                self.entries.insert(name, Submitted::List(vec![first, value]));
            }
            Some(Submitted::List(mut values)) => {
                values.push(value);
                self.entries.insert(name, Submitted::List(values));
            }
            Some(Submitted::File(_)) => {
                tracing::warn!(name = %name, "text value replaces an uploaded file");
                self.entries.insert(name, Submitted::Bytes(value));
            }
        }
    }

    /// Sets a parameter, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: Submitted) {
        self.entries.insert(name.into(), value);
    }

    /// Sets an uploaded file.
    pub fn set_file(&mut self, name: impl Into<String>, file: UploadedFile) {
        self.set(name, Submitted::File(file));
    }

    /// Returns the parameter with the given name.
    pub fn get(&self, name: &str) -> Option<&Submitted> {
        self.entries.get(name)
    }

    /// Returns `true` if the parameter was submitted.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The number of distinct parameter names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was submitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the parameter names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn decode_component(input: &str) -> Vec<u8> {
    let plus_decoded = input.replace('+', " ");
    percent_encoding::percent_decode_str(&plus_decoded).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urlencoded_decoding() {
        let data = SubmittedData::from_urlencoded("a=1%202&b=caf%C3%A9&empty=&flag");
        assert_eq!(data.get("a"), Some(&Submitted::Bytes(b"1 2".to_vec())));
        assert_eq!(data.get("b"), Some(&Submitted::Bytes("café".as_bytes().to_vec())));
        assert_eq!(data.get("empty"), Some(&Submitted::Bytes(vec![])));
        assert_eq!(data.get("flag"), Some(&Submitted::Bytes(vec![])));
        assert_eq!(data.len(), 4);
    }

    #[test]
    fn test_urlencoded_keeps_invalid_utf8() {
        let data = SubmittedData::from_urlencoded("x=%FF%FE");
        assert_eq!(data.get("x"), Some(&Submitted::Bytes(vec![0xFF, 0xFE])));
    }

    #[test]
    fn test_repeated_names_accumulate() {
        let data = SubmittedData::from_pairs([("c", "r"), ("c", "g"), ("c", "b")]);
        assert_eq!(
            data.get("c"),
            Some(&Submitted::List(vec![b"r".to_vec(), b"g".to_vec(), b"b".to_vec()]))
        );
    }

    #[test]
    fn test_files() {
        let mut data = SubmittedData::new();
        data.set_file("doc", UploadedFile::new("a.txt", b"hi".to_vec()));
        assert!(matches!(data.get("doc"), Some(Submitted::File(f)) if f.filename == "a.txt"));
        assert!(data.contains("doc"));
        assert!(!data.contains("other"));
    }

    #[test]
    fn test_empty_input() {
        assert!(SubmittedData::from_urlencoded("").is_empty());
        assert!(SubmittedData::from_urlencoded("&&").is_empty());
    }
}
