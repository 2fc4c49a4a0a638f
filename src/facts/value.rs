use serde::Serialize;
use std::fmt;

/// A single fact value. Serialized untagged so structured formats keep
/// numbers and booleans as native types.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FactValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::String(s) => f.write_str(s),
            FactValue::Integer(i) => write!(f, "{}", i),
            FactValue::Float(x) => write!(f, "{}", x),
            FactValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<String> for FactValue {
    fn from(value: String) -> Self {
        FactValue::String(value)
    }
}

impl From<&str> for FactValue {
    fn from(value: &str) -> Self {
        FactValue::String(value.to_string())
    }
}

impl From<&String> for FactValue {
    fn from(value: &String) -> Self {
        FactValue::String(value.clone())
    }
}

impl From<bool> for FactValue {
    fn from(value: bool) -> Self {
        FactValue::Boolean(value)
    }
}

impl From<f64> for FactValue {
    fn from(value: f64) -> Self {
        FactValue::Float(value)
    }
}

impl From<f32> for FactValue {
    fn from(value: f32) -> Self {
        FactValue::Float(value as f64)
    }
}

macro_rules! lossless_integer {
    ($($t:ty),*) => {
        $(impl From<$t> for FactValue {
            fn from(value: $t) -> Self {
                FactValue::Integer(value as i64)
            }
        })*
    };
}

lossless_integer!(i8, i16, i32, i64, u8, u16, u32);

// Values above i64::MAX saturate.
macro_rules! saturating_integer {
    ($($t:ty),*) => {
        $(impl From<$t> for FactValue {
            fn from(value: $t) -> Self {
                FactValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
            }
        })*
    };
}

saturating_integer!(u64, usize);
