//! Property value model.
//!
//! Every simulated property stores a [`Value`]. The kind of a property is
//! fixed by its schema default; typed access goes through [`SimValue`].

use serde::Serialize;
use std::fmt;

/// Tagged value held by a property cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean flag.
    Boolean(bool),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// Double precision floating point.
    Double(f64),
    /// Enumerated code (see the enum types in `devices`).
    Enum(i32),
}

impl Value {
    /// Kind of this value.
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Int(_) => ValueKind::Int,
            Self::Long(_) => ValueKind::Long,
            Self::Double(_) => ValueKind::Double,
            Self::Enum(_) => ValueKind::Enum,
        }
    }

    /// Typed view of this value, `None` on kind mismatch.
    pub fn get<T: SimValue>(&self) -> Option<T> {
        T::from_value(*self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Enum(v) => write!(f, "enum({v})"),
        }
    }
}

/// Discriminant of [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// `bool`
    Boolean,
    /// `i32`
    Int,
    /// `i64`
    Long,
    /// `f64`
    Double,
    /// Enumerated `i32` code
    Enum,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Double => write!(f, "double"),
            Self::Enum => write!(f, "enum"),
        }
    }
}

/// Rust types that can be stored in a property cell.
pub trait SimValue: Copy + Default + Send + Sync + 'static {
    /// Kind this type maps to.
    const KIND: ValueKind;

    /// Wrap into a [`Value`].
    fn into_value(self) -> Value;

    /// Unwrap from a [`Value`] of the matching kind.
    fn from_value(value: Value) -> Option<Self>;
}

impl SimValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Boolean(v) => Some(v),
            _ => None,
        }
    }
}

impl SimValue for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl SimValue for i64 {
    const KIND: ValueKind = ValueKind::Long;

    fn into_value(self) -> Value {
        Value::Long(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Long(v) => Some(v),
            _ => None,
        }
    }
}

impl SimValue for f64 {
    const KIND: ValueKind = ValueKind::Double;

    fn into_value(self) -> Value {
        Value::Double(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Double(v) => Some(v),
            _ => None,
        }
    }
}

/// Implements [`SimValue`] for a `#[repr(i32)]` enum stored as [`Value::Enum`].
///
/// The enum must provide `const fn code(self) -> i32` and
/// `fn from_code(i32) -> Option<Self>`.
#[macro_export]
macro_rules! sim_enum_value {
    ($ty:ty) => {
        impl $crate::value::SimValue for $ty {
            const KIND: $crate::value::ValueKind = $crate::value::ValueKind::Enum;

            fn into_value(self) -> $crate::value::Value {
                $crate::value::Value::Enum(self.code())
            }

            fn from_value(value: $crate::value::Value) -> Option<Self> {
                match value {
                    $crate::value::Value::Enum(code) => Self::from_code(code),
                    _ => None,
                }
            }
        }
    };
}
