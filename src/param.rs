//! Named bind parameters and the value vocabulary they carry
//!
//! A [`Parameter`] is the only way a runtime value enters a query. The
//! generator emits its name as an `@name` bind marker and never inlines
//! the value itself, so the SQL text stays safe to hand to a driver
//! together with the parameter set.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A scalar value that can be bound to a parameter
///
/// This is a closed vocabulary: anything a driver can bind is one of
/// these kinds, and the generator never needs to inspect the value
/// beyond its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    String(String),
    Bytes(Vec<u8>),
    DateTime(DateTime<Utc>),
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::String(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::DateTime(v)
    }
}

/// Driver type tags for bound parameters
///
/// Matches the type vocabulary of the TDS drivers. A parameter without
/// an explicit tag falls back to the default mapping for its value kind
/// (see [`SqlType::default_for`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlType {
    Bit,
    Int,
    BigInt,
    Float,
    Decimal,
    VarChar,
    NVarChar,
    Text,
    Date,
    Time,
    DateTime,
    Binary,
    VarBinary,
    UniqueIdentifier,
}

impl SqlType {
    /// Default driver type for a value kind
    ///
    /// This is the native-type defaulting table: integers bind as `Int`,
    /// booleans as `Bit`, strings as `VarChar`, dates as `DateTime` and
    /// byte buffers as `Binary`. `Null` has no default, its type comes
    /// from the column.
    pub fn default_for(value: &SqlValue) -> Option<SqlType> {
        match value {
            SqlValue::Null => None,
            SqlValue::Bool(_) => Some(SqlType::Bit),
            SqlValue::Int(_) => Some(SqlType::Int),
            SqlValue::Float(_) => Some(SqlType::Float),
            SqlValue::Decimal(_) => Some(SqlType::Decimal),
            SqlValue::String(_) => Some(SqlType::VarChar),
            SqlValue::Bytes(_) => Some(SqlType::Binary),
            SqlValue::DateTime(_) => Some(SqlType::DateTime),
        }
    }
}

/// A named, typed placeholder for a runtime value
///
/// The name is emitted verbatim as `@name` in generated SQL, so it must
/// be a valid bind identifier. Names are checked during clause
/// translation and an invalid name fails the whole generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Bind name, unique within one statement
    pub name: String,
    /// The value handed to the driver at execution time
    pub value: SqlValue,
    /// Optional driver type tag
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub sql_type: Option<SqlType>,
}

impl Parameter {
    /// Create a parameter from a name and any bindable value
    pub fn new(name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            sql_type: None,
        }
    }

    /// Set an explicit driver type tag
    pub fn with_type(mut self, sql_type: SqlType) -> Self {
        self.sql_type = Some(sql_type);
        self
    }

    /// The driver type to bind with: the explicit tag if set, otherwise
    /// the default for the value kind
    pub fn bind_type(&self) -> Option<SqlType> {
        self.sql_type.or_else(|| SqlType::default_for(&self.value))
    }
}
