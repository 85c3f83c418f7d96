//! The value-side visitor contract (spec §6).
//!
//! Target record types describe themselves to the encoder walk by
//! implementing [`ToEncodeValue`], producing an [`EncodeValue`] tree. This
//! is the static, reflection-free replacement for runtime introspection.
//! `EncodeValue` distinguishes `Record` (keyed, subject to key transform)
//! from `Map` (data, exempt from key transform) because this spec's
//! key-transform rule depends on that distinction (spec §4.2).

use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;

/// A single scalar wire value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
    Bytes(Vec<u8>),
    /// Present, empty — distinct from an absent field (spec §3).
    Null,
}

impl Scalar {
    /// Render the canonical wire text for this scalar, or `None` for `Null`
    /// (the encoder walk emits `Null` scalars as the `Option<String>::None`
    /// half of a `(key, value)` pair).
    pub fn to_wire_string(&self) -> Option<String> {
        match self {
            Scalar::Str(s) => Some(s.clone()),
            Scalar::Bool(b) => Some(if *b { "true".to_string() } else { "false".to_string() }),
            Scalar::Int(i) => Some(i.to_string()),
            Scalar::Float(f) => Some(format_float(*f)),
            Scalar::Timestamp(ts) => Some(ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Scalar::Bytes(b) => Some(base64::engine::general_purpose::STANDARD.encode(b)),
            Scalar::Null => None,
        }
    }
}

/// Integers print with no exponent and no locale grouping; floats use a
/// plain decimal form, never scientific notation.
fn format_float(f: f64) -> String {
    if f == f.trunc() && f.abs() < 1e15 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

/// The pre-composition value tree a record describes itself as, consumed
/// by the encoder walk (C).
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeValue {
    /// A keyed container: record fields. Field names are subject to the
    /// key transform and are re-sorted by the encoder (spec §4.2 "Ordering").
    Record(Vec<(String, EncodeValue)>),
    /// An indexed container: list items, 1-based on the wire.
    List(Vec<EncodeValue>),
    /// A map container: entry keys are data, exempt from key transform.
    Map(Vec<(String, EncodeValue)>),
    Scalar(Scalar),
}

impl EncodeValue {
    pub fn record(fields: impl IntoIterator<Item = (String, EncodeValue)>) -> EncodeValue {
        EncodeValue::Record(fields.into_iter().collect())
    }
}

/// The value-side half of the visitor contract (spec §6): "iterate fields
/// with names and values ... expose list/map structure for collection
/// fields". Implemented by hand for target record types.
pub trait ToEncodeValue {
    fn to_encode_value(&self) -> EncodeValue;
}

impl ToEncodeValue for String {
    fn to_encode_value(&self) -> EncodeValue {
        EncodeValue::Scalar(Scalar::Str(self.clone()))
    }
}

impl ToEncodeValue for str {
    fn to_encode_value(&self) -> EncodeValue {
        EncodeValue::Scalar(Scalar::Str(self.to_string()))
    }
}

impl ToEncodeValue for bool {
    fn to_encode_value(&self) -> EncodeValue {
        EncodeValue::Scalar(Scalar::Bool(*self))
    }
}

macro_rules! impl_to_encode_value_int {
    ($($t:ty),+) => {
        $(
            impl ToEncodeValue for $t {
                fn to_encode_value(&self) -> EncodeValue {
                    EncodeValue::Scalar(Scalar::Int(*self as i64))
                }
            }
        )+
    };
}
impl_to_encode_value_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl ToEncodeValue for f64 {
    fn to_encode_value(&self) -> EncodeValue {
        EncodeValue::Scalar(Scalar::Float(*self))
    }
}

impl ToEncodeValue for f32 {
    fn to_encode_value(&self) -> EncodeValue {
        EncodeValue::Scalar(Scalar::Float(*self as f64))
    }
}

impl ToEncodeValue for DateTime<Utc> {
    fn to_encode_value(&self) -> EncodeValue {
        EncodeValue::Scalar(Scalar::Timestamp(*self))
    }
}

impl ToEncodeValue for Vec<u8> {
    fn to_encode_value(&self) -> EncodeValue {
        EncodeValue::Scalar(Scalar::Bytes(self.clone()))
    }
}

/// An already-built `EncodeValue` tree describes itself verbatim, letting
/// callers (tests, the path emitter) hand a tree straight to anything
/// generic over `ToEncodeValue`.
impl ToEncodeValue for EncodeValue {
    fn to_encode_value(&self) -> EncodeValue {
        self.clone()
    }
}

/// `None` becomes an explicit `Null` scalar (spec §3: "present, empty").
/// Omitting a field entirely is the record author's job at the `Record`-
/// building level, not something `Option<T>` alone can express (spec §9).
impl<T: ToEncodeValue> ToEncodeValue for Option<T> {
    fn to_encode_value(&self) -> EncodeValue {
        match self {
            Some(v) => v.to_encode_value(),
            None => EncodeValue::Scalar(Scalar::Null),
        }
    }
}

impl<T: ToEncodeValue> ToEncodeValue for Vec<T> {
    fn to_encode_value(&self) -> EncodeValue {
        EncodeValue::List(self.iter().map(|v| v.to_encode_value()).collect())
    }
}

impl<T: ToEncodeValue> ToEncodeValue for HashMap<String, T> {
    fn to_encode_value(&self) -> EncodeValue {
        EncodeValue::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_encode_value()))
                .collect(),
        )
    }
}
