//! Payload types: an ordered string-keyed mapping of scalar or blob values.
//!
//! # Design
//! `Payload` is an explicit ordered mapping rather than a generic serde
//! value, so the set of encodable values is closed and iteration order is
//! always insertion order.

/// Binary form value, sent as a file part in multipart bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl Blob {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: None,
            content_type: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// File name written in the part header; `blob` when unset.
    pub fn file_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("blob")
    }

    pub fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or("application/octet-stream")
    }
}

/// A single payload value.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Blob(Blob),
}

impl FormValue {
    /// String form of a scalar value. `None` for blobs.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FormValue::Text(s) => Some(s.clone()),
            FormValue::Integer(n) => Some(n.to_string()),
            FormValue::Float(x) => Some(x.to_string()),
            FormValue::Bool(b) => Some(b.to_string()),
            FormValue::Blob(_) => None,
        }
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        FormValue::Integer(value)
    }
}

impl From<i32> for FormValue {
    fn from(value: i32) -> Self {
        FormValue::Integer(value.into())
    }
}

impl From<u32> for FormValue {
    fn from(value: u32) -> Self {
        FormValue::Integer(value.into())
    }
}

impl From<f64> for FormValue {
    fn from(value: f64) -> Self {
        FormValue::Float(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        FormValue::Bool(value)
    }
}

impl From<Blob> for FormValue {
    fn from(value: Blob) -> Self {
        FormValue::Blob(value)
    }
}

/// Flat key-value data sent with a request, kept in insertion order.
///
/// Re-inserting a key replaces its value without moving it, so every key
/// appears exactly once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    entries: Vec<(String, FormValue)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FormValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<FormValue>> FromIterator<(K, V)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Payload::new();
        for (k, v) in iter {
            payload.insert(k, v);
        }
        payload
    }
}
