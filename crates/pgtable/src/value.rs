//! Loosely-typed values bound as parameters and decoded from result columns.
//!
//! [`Value`] implements both [`ToSql`] and [`FromSql`] for every Postgres type it
//! can represent. Binding is resolved against the parameter type the server
//! reports, so `Value::Int(5)` binds to `int2`, `int4`, `int8`, `float4` or
//! `float8` alike, and `Value::Array` binds to any array whose element type
//! accepts its members.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use std::error::Error;
use tokio_postgres::types::{FromSql, IsNull, Kind, ToSql, Type, to_sql_checked};
use uuid::Uuid;

type BoxError = Box<dyn Error + Sync + Send>;

/// A single parameter or column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Json(serde_json::Value),
    Bytes(Vec<u8>),
    /// A list of values: membership in criteria, an array column in row data.
    Array(Vec<Value>),
    #[cfg(feature = "rust_decimal")]
    Decimal(rust_decimal::Decimal),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// The value as a UUID: either a `Uuid` or a UUID-shaped `Text`.
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(v) => Some(*v),
            Value::Text(v) if is_uuid_shaped(v) => Uuid::try_parse(v).ok(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Whether this value can stand for a primary key on its own: an integer,
    /// a UUID, or a UUID-shaped string.
    pub fn is_key_shaped(&self) -> bool {
        match self {
            Value::Int(_) | Value::Uuid(_) => true,
            Value::Text(s) => is_uuid_shaped(s),
            _ => false,
        }
    }

    /// Short type name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Uuid(_) => "uuid",
            Value::Timestamp(_) => "timestamp",
            Value::Date(_) => "date",
            Value::Json(_) => "json",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(_) => "decimal",
        }
    }
}

/// Hyphenated, 36-character UUID text (`8-4-4-4-12`).
pub fn is_uuid_shaped(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 36
        && bytes.iter().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => *b == b'-',
            _ => b.is_ascii_hexdigit(),
        })
}

fn int_to_sql(v: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        Type::OID => u32::try_from(v)?.to_sql(ty, out),
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => (v as f64).to_sql(ty, out),
        #[cfg(feature = "rust_decimal")]
        Type::NUMERIC => rust_decimal::Decimal::from(v).to_sql(ty, out),
        _ => v.to_sql_checked(ty, out),
    }
}

fn float_to_sql(v: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        #[cfg(feature = "rust_decimal")]
        Type::NUMERIC => rust_decimal::Decimal::try_from(v)?.to_sql(ty, out),
        _ => v.to_sql_checked(ty, out),
    }
}

fn text_to_sql(v: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if *ty == Type::UUID {
        return Uuid::try_parse(v)?.to_sql(ty, out);
    }
    if let Kind::Enum(_) = ty.kind() {
        out.extend_from_slice(v.as_bytes());
        return Ok(IsNull::No);
    }
    v.to_sql_checked(ty, out)
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => int_to_sql(*v, ty, out),
            Value::Float(v) => float_to_sql(*v, ty, out),
            Value::Text(v) => text_to_sql(v, ty, out),
            Value::Uuid(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) if *ty == Type::TIMESTAMP => v.naive_utc().to_sql(ty, out),
            Value::Timestamp(v) => v.to_sql_checked(ty, out),
            Value::Date(v) => v.to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
            Value::Bytes(v) => v.to_sql_checked(ty, out),
            Value::Array(items) => items.to_sql_checked(ty, out),
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(v) => v.to_sql_checked(ty, out),
        }
    }

    // The concrete encoding is chosen per variant in `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

impl<'a> FromSql<'a> for Value {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        match ty.kind() {
            Kind::Array(_) => return Ok(Value::Array(Vec::<Value>::from_sql(ty, raw)?)),
            Kind::Enum(_) => return Ok(Value::Text(String::from_sql(ty, raw)?)),
            Kind::Domain(inner) => return Value::from_sql(inner, raw),
            _ => {}
        }

        let value = match *ty {
            Type::BOOL => Value::Bool(bool::from_sql(ty, raw)?),
            Type::INT2 => Value::Int(i16::from_sql(ty, raw)?.into()),
            Type::INT4 => Value::Int(i32::from_sql(ty, raw)?.into()),
            Type::INT8 => Value::Int(i64::from_sql(ty, raw)?),
            Type::OID => Value::Int(u32::from_sql(ty, raw)?.into()),
            Type::FLOAT4 => Value::Float(f32::from_sql(ty, raw)?.into()),
            Type::FLOAT8 => Value::Float(f64::from_sql(ty, raw)?),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
                Value::Text(String::from_sql(ty, raw)?)
            }
            Type::UUID => Value::Uuid(Uuid::from_sql(ty, raw)?),
            Type::JSON | Type::JSONB => Value::Json(serde_json::Value::from_sql(ty, raw)?),
            Type::TIMESTAMPTZ => Value::Timestamp(DateTime::<Utc>::from_sql(ty, raw)?),
            Type::TIMESTAMP => Value::Timestamp(NaiveDateTime::from_sql(ty, raw)?.and_utc()),
            Type::DATE => Value::Date(NaiveDate::from_sql(ty, raw)?),
            Type::BYTEA => Value::Bytes(Vec::<u8>::from_sql(ty, raw)?),
            #[cfg(feature = "rust_decimal")]
            Type::NUMERIC => Value::Decimal(rust_decimal::Decimal::from_sql(ty, raw)?),
            _ => return Err(format!("unsupported column type '{ty}'").into()),
        };
        Ok(value)
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, BoxError> {
        Ok(Value::Null)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

// ==================== Conversions ====================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

#[cfg(feature = "rust_decimal")]
impl From<rust_decimal::Decimal> for Value {
    fn from(v: rust_decimal::Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// JSON arrays become [`Value::Array`]; objects stay as [`Value::Json`].
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match v {
            J::Null => Value::Null,
            J::Bool(b) => Value::Bool(b),
            J::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            J::String(s) => Value::Text(s),
            J::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            obj @ J::Object(_) => Value::Json(obj),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        use serde_json::Value as J;
        match v {
            Value::Null => J::Null,
            Value::Bool(b) => J::Bool(b),
            Value::Int(i) => J::from(i),
            Value::Float(f) => serde_json::Number::from_f64(f).map_or(J::Null, J::Number),
            Value::Text(s) => J::String(s),
            Value::Uuid(u) => J::String(u.to_string()),
            Value::Timestamp(t) => J::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Date(d) => J::String(d.to_string()),
            Value::Json(j) => j,
            Value::Bytes(b) => J::Array(b.into_iter().map(J::from).collect()),
            Value::Array(items) => J::Array(items.into_iter().map(J::from).collect()),
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(d) => J::String(d.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode(value: &Value, ty: &Type) -> Result<(IsNull, Vec<u8>), BoxError> {
        let mut buf = BytesMut::new();
        let is_null = value.to_sql_checked(ty, &mut buf)?;
        Ok((is_null, buf.to_vec()))
    }

    #[test]
    fn int_binds_to_narrow_integer_types() {
        let (_, bytes) = encode(&Value::Int(5), &Type::INT4).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 5]);

        let (_, bytes) = encode(&Value::Int(5), &Type::INT2).unwrap();
        assert_eq!(bytes, vec![0, 5]);

        let (_, bytes) = encode(&Value::Int(5), &Type::INT8).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0, 0, 0, 0, 5]);
    }

    #[test]
    fn int_out_of_range_is_an_error() {
        assert!(encode(&Value::Int(i64::from(i32::MAX) + 1), &Type::INT4).is_err());
    }

    #[test]
    fn int_binds_to_float() {
        let (_, bytes) = encode(&Value::Int(2), &Type::FLOAT8).unwrap();
        assert_eq!(bytes, 2.0f64.to_be_bytes().to_vec());
    }

    #[test]
    fn mismatched_type_is_rejected() {
        assert!(encode(&Value::Bool(true), &Type::INT4).is_err());
        assert!(encode(&Value::Text("x".into()), &Type::INT4).is_err());
    }

    #[test]
    fn null_binds_to_anything() {
        let (is_null, bytes) = encode(&Value::Null, &Type::INT4).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
        assert!(bytes.is_empty());
    }

    #[test]
    fn text_binds_to_uuid_column() {
        let id = "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11";
        let (_, bytes) = encode(&Value::Text(id.into()), &Type::UUID).unwrap();
        assert_eq!(bytes, Uuid::parse_str(id).unwrap().as_bytes().to_vec());
    }

    #[test]
    fn array_binds_to_text_array() {
        let tags = Value::from(vec!["one", "two"]);
        assert!(encode(&tags, &Type::TEXT_ARRAY).is_ok());
        assert!(encode(&tags, &Type::TEXT).is_err());
    }

    #[test]
    fn decodes_scalars_and_arrays() {
        assert_eq!(Value::from_sql(&Type::INT4, &[0, 0, 0, 7]).unwrap(), Value::Int(7));
        assert_eq!(Value::from_sql(&Type::BOOL, &[1]).unwrap(), Value::Bool(true));
        assert_eq!(
            Value::from_sql(&Type::TEXT, b"hello").unwrap(),
            Value::Text("hello".into())
        );
        assert_eq!(Value::from_sql_null(&Type::TEXT).unwrap(), Value::Null);

        let mut buf = BytesMut::new();
        vec!["a", "b"].to_sql(&Type::TEXT_ARRAY, &mut buf).unwrap();
        assert_eq!(
            Value::from_sql(&Type::TEXT_ARRAY, &buf).unwrap(),
            Value::from(vec!["a", "b"])
        );
    }

    #[test]
    fn uuid_shape_detection() {
        assert!(is_uuid_shaped("a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11"));
        assert!(!is_uuid_shaped("a0eebc999c0b4ef8bb6d6bb9bd380a11"));
        assert!(!is_uuid_shaped("not-a-uuid"));
        assert!(!is_uuid_shaped("g0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11"));
    }

    #[test]
    fn key_shape() {
        assert!(Value::Int(4).is_key_shaped());
        assert!(Value::Uuid(Uuid::nil()).is_key_shaped());
        assert!(Value::from("a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11").is_key_shaped());
        assert!(!Value::from("products").is_key_shaped());
        assert!(!Value::Float(1.5).is_key_shaped());
    }

    #[test]
    fn json_conversion() {
        let v = Value::from(json!({"a": [1, "x", null], "b": 1.5}));
        assert!(matches!(v, Value::Json(_)));

        let v = Value::from(json!([1, "x", null, 2.5]));
        assert_eq!(
            v,
            Value::Array(vec![
                Value::Int(1),
                Value::Text("x".into()),
                Value::Null,
                Value::Float(2.5)
            ])
        );

        let back: serde_json::Value = v.into();
        assert_eq!(back, json!([1, "x", null, 2.5]));
    }
}
