use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, VariantNames};

/// A single element of an option value: a number or a piece of text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Text(v) => f.write_str(v),
        }
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value as i64)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Scalar::Float(value as f64)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

/// The value supplied for one module option.
///
/// Which variants an option accepts is decided by the option's kind in the
/// module alias table, never by the variant alone.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Sequence(Vec<Scalar>),
}

/// Variant tag of an [`OptionValue`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Text,
    Sequence,
}

impl OptionValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            OptionValue::Bool(_) => ValueKind::Bool,
            OptionValue::Int(_) => ValueKind::Int,
            OptionValue::Float(_) => ValueKind::Float,
            OptionValue::Text(_) => ValueKind::Text,
            OptionValue::Sequence(_) => ValueKind::Sequence,
        }
    }

    /// Returns the value as a single scalar, or `None` for booleans and sequences.
    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            OptionValue::Int(v) => Some(Scalar::Int(*v)),
            OptionValue::Float(v) => Some(Scalar::Float(*v)),
            OptionValue::Text(v) => Some(Scalar::Text(v.clone())),
            OptionValue::Bool(_) | OptionValue::Sequence(_) => None,
        }
    }

    /// Join the elements of a sequence with `separator`. Scalars render as themselves.
    pub fn join(&self, separator: &str) -> Option<String> {
        match self {
            OptionValue::Sequence(values) => Some(
                values
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(separator),
            ),
            _ => self.as_scalar().map(|s| s.to_string()),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<Scalar> for OptionValue {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Int(v) => OptionValue::Int(v),
            Scalar::Float(v) => OptionValue::Float(v),
            Scalar::Text(v) => OptionValue::Text(v),
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for OptionValue {
                fn from(value: $ty) -> Self {
                    OptionValue::from(Scalar::from(value))
                }
            }
        )*
    };
}

impl_from_scalar!(i32, i64, f32, f64, &str, String);

impl<T: Into<Scalar>> From<Vec<T>> for OptionValue {
    fn from(values: Vec<T>) -> Self {
        OptionValue::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Scalar>, const N: usize> From<[T; N]> for OptionValue {
    fn from(values: [T; N]) -> Self {
        OptionValue::Sequence(values.into_iter().map(Into::into).collect())
    }
}
