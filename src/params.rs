//! Flat parameter mappings shared by path templates, query strings and headers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Flat mapping from parameter name to value.
///
/// Ordered so that query strings and log output are deterministic.
pub type Params = BTreeMap<String, ParamValue>;

/// Flat mapping from header name to header value.
pub type Headers = BTreeMap<String, String>;

/// A single path or query parameter value.
///
/// Only scalar values are allowed: strings, numbers, and null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Text value, used verbatim.
    String(String),
    /// Numeric value, rendered the way JSON renders it.
    Number(serde_json::Number),
    /// Explicitly absent value.
    Null,
}

impl ParamValue {
    /// Returns the textual form of the value, or `None` for [`ParamValue::Null`].
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Number(n) => Some(n.to_string()),
            Self::Null => None,
        }
    }

    /// Returns true if the value is [`ParamValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Number(value.into())
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl From<f64> for ParamValue {
    /// Non-finite floats have no JSON representation and become [`ParamValue::Null`].
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl<T: Into<Self>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Builds a [`Params`] mapping from key/value pairs.
///
/// # Example
///
/// ```
/// use reqflow::params::{ParamValue, to_params};
///
/// let params = to_params([("id", ParamValue::from(42)), ("name", "alice".into())]);
/// assert_eq!(params["id"].to_string(), "42");
/// ```
pub fn to_params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<ParamValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Builds a [`Headers`] mapping from name/value pairs.
pub fn to_headers<I, K, V>(pairs: I) -> Headers
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
