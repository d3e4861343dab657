//! Abstract column types.

use serde::{Deserialize, Serialize};

/// The abstract type of a schema column, independent of any database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbstractType {
    Integer,
    String,
    Text,
    Date,
    DateTime,
    Timestamp,
    Time,
    Decimal,
    Float,
    Money,
    Percent,
    Boolean,
    Binary,
    Year,
}

impl AbstractType {
    /// Numeric types accept bounds, sign derivation and the numeric aggregates.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            AbstractType::Integer
                | AbstractType::Decimal
                | AbstractType::Float
                | AbstractType::Money
                | AbstractType::Percent
                | AbstractType::Year
        )
    }

    /// Types whose values are whole numbers, so a bounded range can be enumerated.
    pub fn is_integral(&self) -> bool {
        matches!(self, AbstractType::Integer | AbstractType::Year)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            AbstractType::Date
                | AbstractType::DateTime
                | AbstractType::Timestamp
                | AbstractType::Time
        )
    }
}
