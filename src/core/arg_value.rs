//! Template argument values
//!
//! This module provides:
//! - `ArgValue`: one positional argument of a log call
//! - `NamedArgs`: an ordered bag of name/value pairs used to resolve named
//!   placeholders when passed as the last argument

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Value type for template arguments
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Null,
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Char(char),
    Named(NamedArgs),
}

impl ArgValue {
    /// Capture any `Display` value as its rendered text
    pub fn display(value: impl fmt::Display) -> Self {
        ArgValue::Str(value.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ArgValue::Null)
    }

    /// Returns the bag when this value is a non-empty named-argument bag
    pub fn as_named(&self) -> Option<&NamedArgs> {
        match self {
            ArgValue::Named(bag) if !bag.is_empty() => Some(bag),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Null => write!(f, "<null>"),
            ArgValue::Str(s) => write!(f, "{}", s),
            ArgValue::Int(i) => write!(f, "{}", i),
            ArgValue::UInt(u) => write!(f, "{}", u),
            ArgValue::Float(fl) => write!(f, "{}", fl),
            ArgValue::Bool(b) => write!(f, "{}", b),
            ArgValue::Char(c) => write!(f, "{}", c),
            ArgValue::Named(bag) => write!(f, "{}", bag),
        }
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Str(s)
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Str(s.to_string())
    }
}

impl From<&String> for ArgValue {
    fn from(s: &String) -> Self {
        ArgValue::Str(s.clone())
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for ArgValue {
            fn from(i: $t) -> Self {
                ArgValue::Int(i as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for ArgValue {
            fn from(u: $t) -> Self {
                ArgValue::UInt(u as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for ArgValue {
    fn from(f: f32) -> Self {
        ArgValue::Float(f as f64)
    }
}

impl From<f64> for ArgValue {
    fn from(f: f64) -> Self {
        ArgValue::Float(f)
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

impl From<char> for ArgValue {
    fn from(c: char) -> Self {
        ArgValue::Char(c)
    }
}

impl From<NamedArgs> for ArgValue {
    fn from(bag: NamedArgs) -> Self {
        ArgValue::Named(bag)
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ArgValue::Null, Into::into)
    }
}

/// Ordered name/value pairs for named placeholders
///
/// Insertion order is preserved; it decides the order of unused pairs in
/// the `(Extra args: ...)` suffix.
///
/// # Example
///
/// ```
/// use rust_log_pipeline::NamedArgs;
///
/// let bag = NamedArgs::new().with("Id", 7).with("Name", "x");
/// assert_eq!(bag.len(), 2);
/// assert_eq!(bag.get("id").map(ToString::to_string), Some("7".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedArgs {
    pairs: Vec<(String, ArgValue)>,
}

impl NamedArgs {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Add a pair (builder style)
    #[must_use]
    pub fn with<K, V>(mut self, name: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<ArgValue>,
    {
        self.pairs.push((name.into(), value.into()));
        self
    }

    /// Add a pair (mutable version)
    pub fn insert<K, V>(&mut self, name: K, value: V)
    where
        K: Into<String>,
        V: Into<ArgValue>,
    {
        self.pairs.push((name.into(), value.into()));
    }

    /// Case-insensitive lookup of the first pair with this name
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.position(name).map(|idx| &self.pairs[idx].1)
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.pairs
            .iter()
            .position(|(key, _)| names_match(key, name))
    }

    pub fn pairs(&self) -> &[(String, ArgValue)] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn names_match(key: &str, name: &str) -> bool {
    key.eq_ignore_ascii_case(name) || (!key.is_ascii() && key.to_lowercase() == name.to_lowercase())
}

impl fmt::Display for NamedArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, (name, value)) in self.pairs.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        write!(f, "}}")
    }
}

impl<K: Into<String>, V: Into<ArgValue>> FromIterator<(K, V)> for NamedArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<ArgValue>> From<Vec<(K, V)>> for NamedArgs {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<ArgValue>> From<BTreeMap<K, V>> for NamedArgs {
    fn from(map: BTreeMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

/// Map iteration order is unspecified, so the extra-args suffix order is too.
impl<K: Into<String>, V: Into<ArgValue>, S> From<HashMap<K, V, S>> for NamedArgs {
    fn from(map: HashMap<K, V, S>) -> Self {
        map.into_iter().collect()
    }
}
