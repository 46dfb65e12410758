#[derive(Debug, Clone, Default, PartialEq)]
/// A single dynamically typed value.
///
/// This is the exchange type for per-row access and statistics, columns
/// themselves store values in their own representation.
pub enum Field {
    #[default]
    Null,
    UInt64(u64),
    Int64(i64),
    Float64(f64),
    String(String),
    Array(Vec<Field>),
}

impl Field {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The name of the value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::UInt64(_) => "UInt64",
            Self::Int64(_) => "Int64",
            Self::Float64(_) => "Float64",
            Self::String(_) => "String",
            Self::Array(_) => "Array",
        }
    }
}

impl From<u64> for Field {
    fn from(value: u64) -> Self {
        Self::UInt64(value)
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Self::Float64(value)
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Vec<Field>> for Field {
    fn from(value: Vec<Field>) -> Self {
        Self::Array(value)
    }
}
