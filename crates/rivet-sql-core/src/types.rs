//! SQL storage classes and the values bound to them.
//!
//! Every expression node carries a [`SqlType`] describing the storage
//! class of its result. Values travel as [`SqlValue`]s and are either
//! bound as parameters through the generation context or rendered
//! inline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// SQL storage classes of the dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    /// 64-bit integer.
    Integer,
    /// 8-byte IEEE float.
    Real,
    /// UTF-8 text.
    Text,
    /// Raw bytes.
    Blob,
    /// Stored as an integer 0/1.
    Boolean,
    /// Stored as integer Unix milliseconds.
    DateTime,
}

impl SqlType {
    /// Returns the column type name used in generated DDL.
    #[must_use]
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
            Self::Boolean => "BOOLEAN",
            Self::DateTime => "DATETIME",
        }
    }

    /// Maps a declared column type name to a storage class using
    /// SQLite-style affinity rules. The raw spelling (including any
    /// size suffix) is preserved separately by the schema model.
    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        let upper = name.to_ascii_uppercase();
        if upper.contains("BOOL") {
            Self::Boolean
        } else if upper.contains("DATE") || upper.contains("TIME") {
            Self::DateTime
        } else if upper.contains("INT") {
            Self::Integer
        } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
            Self::Text
        } else if upper.contains("BLOB") {
            Self::Blob
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            Self::Real
        } else {
            Self::Text
        }
    }
}

/// A value bound into a query.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL.
    Null,
    /// Integer value.
    Int(i64),
    /// Float value.
    Real(f64),
    /// Text value.
    Text(String),
    /// Binary value.
    Blob(Vec<u8>),
    /// Boolean value.
    Bool(bool),
    /// Date/time value.
    DateTime(DateTime<Utc>),
}

impl SqlValue {
    /// Returns the storage class this value naturally belongs to.
    /// `Null` fits every storage class and returns `None`.
    #[must_use]
    pub const fn default_type(&self) -> Option<SqlType> {
        match self {
            Self::Null => None,
            Self::Int(_) => Some(SqlType::Integer),
            Self::Real(_) => Some(SqlType::Real),
            Self::Text(_) => Some(SqlType::Text),
            Self::Blob(_) => Some(SqlType::Blob),
            Self::Bool(_) => Some(SqlType::Boolean),
            Self::DateTime(_) => Some(SqlType::DateTime),
        }
    }

    /// Returns true if this value can be bound to a slot of the given
    /// storage class.
    #[must_use]
    pub fn matches(&self, ty: SqlType) -> bool {
        match self.default_type() {
            None => true,
            Some(own) => own == ty,
        }
    }

    /// Returns the SQL literal form of this value for inline use.
    ///
    /// Text escapes single quotes by doubling them; blobs use the
    /// `X'…'` hex form; booleans and datetimes take their integer
    /// storage form. Prefer parameter binding over inlining.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Int(n) => format!("{n}"),
            Self::Real(f) => format!("{f}"),
            Self::Text(s) => {
                let escaped = s.replace('\'', "''");
                format!("'{escaped}'")
            }
            Self::Blob(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
                format!("X'{hex}'")
            }
            Self::Bool(b) => String::from(if *b { "1" } else { "0" }),
            Self::DateTime(dt) => format!("{}", dt.timestamp_millis()),
        }
    }
}

/// A bound parameter: the value together with the storage class of the
/// slot it fills.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundValue {
    /// The bound value.
    pub value: SqlValue,
    /// The storage class of the slot.
    pub ty: SqlType,
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a [`SqlValue`].
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for i16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Real(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Real(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl ToSqlValue for DateTime<Utc> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::DateTime(self)
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

/// Strategy mapping in-memory values to their bound storage form.
///
/// A generation context applies this to every value it introduces, so
/// a caller can swap in a different datetime codec (e.g. ISO-8601
/// text) without touching the expression tree.
pub trait ValueSerializer {
    /// Maps a value destined for a slot of type `ty` to the form that
    /// is actually bound.
    fn map_to_bound(&self, value: SqlValue, ty: SqlType) -> SqlValue;
}

/// The default codec: datetimes become integer Unix milliseconds and
/// booleans become 0/1. Everything else is bound as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultValueSerializer;

impl ValueSerializer for DefaultValueSerializer {
    fn map_to_bound(&self, value: SqlValue, _ty: SqlType) -> SqlValue {
        match value {
            SqlValue::DateTime(dt) => SqlValue::Int(dt.timestamp_millis()),
            SqlValue::Bool(b) => SqlValue::Int(i64::from(b)),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sql_name() {
        assert_eq!(SqlType::Integer.sql_name(), "INTEGER");
        assert_eq!(SqlType::DateTime.sql_name(), "DATETIME");
    }

    #[test]
    fn test_from_type_name_affinity() {
        assert_eq!(SqlType::from_type_name("INTEGER"), SqlType::Integer);
        assert_eq!(SqlType::from_type_name("int"), SqlType::Integer);
        assert_eq!(SqlType::from_type_name("BIGINT"), SqlType::Integer);
        assert_eq!(SqlType::from_type_name("VARCHAR(255)"), SqlType::Text);
        assert_eq!(SqlType::from_type_name("BLOB"), SqlType::Blob);
        assert_eq!(SqlType::from_type_name("DOUBLE"), SqlType::Real);
        assert_eq!(SqlType::from_type_name("BOOLEAN"), SqlType::Boolean);
        assert_eq!(SqlType::from_type_name("TIMESTAMP"), SqlType::DateTime);
        assert_eq!(SqlType::from_type_name("DATETIME"), SqlType::DateTime);
        // Unknown spellings fall back to TEXT.
        assert_eq!(SqlType::from_type_name("GEOMETRY"), SqlType::Text);
    }

    #[test]
    fn test_inline_rendering() {
        assert_eq!(SqlValue::Null.to_sql_inline(), "NULL");
        assert_eq!(SqlValue::Int(42).to_sql_inline(), "42");
        assert_eq!(
            SqlValue::Text(String::from("it's")).to_sql_inline(),
            "'it''s'"
        );
        assert_eq!(
            SqlValue::Blob(vec![0x48, 0x45]).to_sql_inline(),
            "X'4845'"
        );
        assert_eq!(SqlValue::Bool(true).to_sql_inline(), "1");
    }

    #[test]
    fn test_datetime_inline_is_millis() {
        let dt = Utc.timestamp_millis_opt(1_500_000_000_123).unwrap();
        assert_eq!(
            SqlValue::DateTime(dt).to_sql_inline(),
            "1500000000123"
        );
    }

    #[test]
    fn test_value_matches_type() {
        assert!(SqlValue::Int(1).matches(SqlType::Integer));
        assert!(!SqlValue::Int(1).matches(SqlType::Text));
        assert!(SqlValue::Null.matches(SqlType::Blob));
    }

    #[test]
    fn test_to_sql_value_conversions() {
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!("k".to_sql_value(), SqlValue::Text(String::from("k")));
        assert_eq!(None::<i64>.to_sql_value(), SqlValue::Null);
        assert_eq!(Some(1.5_f64).to_sql_value(), SqlValue::Real(1.5));
    }

    #[test]
    fn test_default_serializer() {
        let serializer = DefaultValueSerializer;
        let dt = Utc.timestamp_millis_opt(86_400_000).unwrap();
        assert_eq!(
            serializer.map_to_bound(SqlValue::DateTime(dt), SqlType::DateTime),
            SqlValue::Int(86_400_000)
        );
        assert_eq!(
            serializer.map_to_bound(SqlValue::Bool(true), SqlType::Boolean),
            SqlValue::Int(1)
        );
        assert_eq!(
            serializer.map_to_bound(SqlValue::Text(String::from("x")), SqlType::Text),
            SqlValue::Text(String::from("x"))
        );
    }
}
