//! Keyed string collections with a wire rendering.
//!
//! # Design
//! Headers and query parameters share one collection type, `KeyValues<S>`.
//! The marker `S` only selects a `WireStyle`; `format` matches on that enum,
//! so there is no virtual dispatch for a two-variant distinction. Keys are
//! kept in a `BTreeMap`, which makes iteration (and therefore the rendered
//! wire string) ordered by key.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use ::url::form_urlencoded;

/// How a collection renders itself on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireStyle {
    /// `Name: value\r\n` per entry.
    Header,
    /// `name=value` pairs joined by `&`, form-urlencoded, no leading `?`.
    Query,
}

/// Selects the `WireStyle` of a `KeyValues` collection.
pub trait Style {
    const STYLE: WireStyle;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderStyle;

impl Style for HeaderStyle {
    const STYLE: WireStyle = WireStyle::Header;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryStyle;

impl Style for QueryStyle {
    const STYLE: WireStyle = WireStyle::Query;
}

/// Request headers, rendered as a CRLF-terminated header block.
pub type Headers = KeyValues<HeaderStyle>;

/// Query parameters, rendered as a bare query string.
pub type QueryParameters = KeyValues<QueryStyle>;

/// Ordered string-to-string mapping with unique keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValues<S> {
    entries: BTreeMap<String, String>,
    _style: PhantomData<S>,
}

impl<S> Default for KeyValues<S> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            _style: PhantomData,
        }
    }
}

impl<S: Style> KeyValues<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Remove `key`. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// The value stored under `key`, or `""` when absent.
    ///
    /// Use `contains` to tell an absent key from an empty value.
    pub fn get(&self, key: &str) -> &str {
        self.entries.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get_all(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the collection in its wire style. An empty collection renders
    /// as `""`, which callers treat as "nothing to send".
    pub fn format(&self) -> String {
        match S::STYLE {
            WireStyle::Header => self
                .entries
                .iter()
                .map(|(name, value)| format!("{name}: {value}\r\n"))
                .collect(),
            WireStyle::Query => form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.entries.iter())
                .finish(),
        }
    }
}

impl<S: Style, K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValues<S> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut kv = Self::new();
        for (k, v) in iter {
            kv.set(k, v);
        }
        kv
    }
}
