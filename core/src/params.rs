//! Parameter normalization.
//!
//! Callers hand parameters over in one of three forms: a list of
//! `name => value` expressions (see [`params!`](crate::params!)), an explicit
//! ordered map, or any `Serialize` value whose fields become parameters. All
//! three funnel into [`ParameterSource`], and [`ParameterSource::normalize`]
//! turns that into the canonical ordered [`Parameters`] the dispatcher puts
//! on the wire.
//!
//! Normalization is a pure transform: the same input always yields the same
//! output, in the caller's order.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// A caller-supplied parameter value before wire coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    /// Multi-value field, sent comma-joined.
    List(Vec<String>),
    /// Structured value, sent as compact JSON unless it is a scalar.
    Json(Value),
}

impl ParamValue {
    /// Textual form sent on the wire.
    pub fn to_wire(&self) -> String {
        match self {
            ParamValue::Str(s) => s.clone(),
            ParamValue::Int(n) => n.to_string(),
            ParamValue::UInt(n) => n.to_string(),
            ParamValue::Float(n) => n.to_string(),
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::List(items) => items.join(","),
            ParamValue::Json(value) => json_to_wire(value),
        }
    }
}

fn json_to_wire(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(json_to_wire).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => ParamValue::Str(s),
            Value::Bool(b) => ParamValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ParamValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    ParamValue::UInt(u)
                } else {
                    ParamValue::Float(n.as_f64().unwrap_or_default())
                }
            }
            Value::Array(items) => ParamValue::List(items.iter().map(json_to_wire).collect()),
            other => ParamValue::Json(other),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

macro_rules! signed_param {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(value: $t) -> Self {
                ParamValue::Int(i64::from(value))
            }
        })*
    };
}

macro_rules! unsigned_param {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(value: $t) -> Self {
                ParamValue::UInt(u64::from(value))
            }
        })*
    };
}

signed_param!(i8, i16, i32, i64);
unsigned_param!(u8, u16, u32, u64);

/// `None` becomes a null that `normalize` leaves out.
impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ParamValue::Json(Value::Null))
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(value: Vec<&str>) -> Self {
        ParamValue::List(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<i64>> for ParamValue {
    fn from(value: Vec<i64>) -> Self {
        ParamValue::List(value.iter().map(i64::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ParamValue {
    fn from(value: [&str; N]) -> Self {
        ParamValue::List(value.iter().map(|s| s.to_string()).collect())
    }
}

/// One normalized parameter: a name and its wire text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

/// Canonical, ordered parameter list. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(Vec<Parameter>);

impl Parameters {
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.name.as_str()).collect()
    }

    /// Returns a copy with `name` set to `value`. An existing parameter keeps
    /// its position; a new one is appended.
    pub fn with(&self, name: &str, value: impl Into<String>) -> Parameters {
        let value = value.into();
        let mut out = self.0.clone();
        match out.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.value = value,
            None => out.push(Parameter {
                name: name.to_string(),
                value,
            }),
        }
        Parameters(out)
    }

    /// `name=value&...` with RFC 3986 percent-encoding, in order.
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|p| format!("{}={}", urlencoding::encode(&p.name), urlencoding::encode(&p.value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The three accepted caller-facing parameter forms. Exactly one is used
/// per call.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSource {
    /// `name => value` expressions, usually built by `params!`.
    Pairs(Vec<(String, ParamValue)>),
    /// An explicit ordered map.
    Map(IndexMap<String, ParamValue>),
    /// Fields reflected out of a serializable object.
    Object(serde_json::Map<String, Value>),
}

impl Default for ParameterSource {
    fn default() -> Self {
        ParameterSource::Pairs(Vec::new())
    }
}

impl ParameterSource {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, ParamValue)>,
        K: Into<String>,
    {
        ParameterSource::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Reflect the public fields of `value` into parameters, in declaration
    /// order. Fields serializing to `null` are left out.
    pub fn object<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        match serde_json::to_value(value) {
            Ok(Value::Object(fields)) => Ok(ParameterSource::Object(fields)),
            Ok(other) => Err(ApiError::InvalidParameter(format!(
                "expected an object with named fields, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(ApiError::InvalidParameter(format!(
                "fields could not be read: {e}"
            ))),
        }
    }

    /// Produce the canonical parameter list.
    pub fn normalize(self) -> Result<Parameters, ApiError> {
        let entries: Vec<(String, ParamValue)> = match self {
            ParameterSource::Pairs(pairs) => pairs,
            ParameterSource::Map(map) => map.into_iter().collect(),
            ParameterSource::Object(fields) => fields
                .into_iter()
                .map(|(k, v)| (k, ParamValue::from(v)))
                .collect(),
        };

        let mut out: Vec<Parameter> = Vec::with_capacity(entries.len());
        for (name, value) in entries {
            // Null means "not sent", whichever form it came from.
            if value == ParamValue::Json(Value::Null) {
                continue;
            }
            validate_name(&name)?;
            if out.iter().any(|p| p.name == name) {
                return Err(ApiError::InvalidParameter(format!(
                    "duplicate parameter `{name}`"
                )));
            }
            out.push(Parameter {
                value: value.to_wire(),
                name,
            });
        }
        Ok(Parameters(out))
    }
}

impl From<IndexMap<String, ParamValue>> for ParameterSource {
    fn from(map: IndexMap<String, ParamValue>) -> Self {
        ParameterSource::Map(map)
    }
}

impl From<Vec<(String, ParamValue)>> for ParameterSource {
    fn from(pairs: Vec<(String, ParamValue)>) -> Self {
        ParameterSource::Pairs(pairs)
    }
}

impl From<Vec<(&str, ParamValue)>> for ParameterSource {
    fn from(pairs: Vec<(&str, ParamValue)>) -> Self {
        ParameterSource::pairs(pairs)
    }
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::InvalidParameter("empty parameter name".to_string()));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ApiError::InvalidParameter(format!(
            "`{name}` is not a valid parameter name"
        )));
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Build a [`ParameterSource`] from `name => value` expressions.
///
/// ```
/// use tweet_core::params;
///
/// let params = params![cursor => -1, skip_status => true].normalize().unwrap();
/// assert_eq!(params.encode(), "cursor=-1&skip_status=true");
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::params::ParameterSource::empty()
    };
    ($($name:ident => $value:expr),+ $(,)?) => {
        $crate::params::ParameterSource::pairs(vec![
            $((stringify!($name), $crate::params::ParamValue::from($value))),+
        ])
    };
}
