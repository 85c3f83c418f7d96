//! The Headers surface codec (component H, spec §4.7).
//!
//! Defaults: key separator `-`, `SingleEntry` maps, `CollapseByIndex`
//! lists, percent-encoding set `&' ()-._A-Za-z0-9`. Unlike Query, the wire
//! form is an ordered `[(String, Option<String>)]` supplied by and
//! returned to the HTTP layer directly, not a single joined string.

use tracing::trace;

use crate::decode::{DecodeCtx, FromShape};
use crate::encode::encode_walk;
use crate::error::{DecodingError, EncodingError};
use crate::parse::parse;
use crate::percent::{self, HEADERS_DEFAULT_ALLOWED};
use crate::strategy::{
    DecodeStrategy, EncodeStrategy, KeyDecodeStrategy, KeyDecodeTransform, KeyEncodeStrategy,
    KeyEncodeTransform, ListDecodeStrategy, MapLayout,
};

/// Encodes to/decodes from an ordered header set (spec §4.7 "Headers specifics").
#[derive(Clone, Debug)]
pub struct HeaderCodec {
    encode_strategy: EncodeStrategy,
    decode_strategy: DecodeStrategy,
    allowed_chars: Option<String>,
}

impl Default for HeaderCodec {
    fn default() -> Self {
        HeaderCodec::new()
    }
}

impl HeaderCodec {
    /// The documented defaults: key sep `-`, `SingleEntry` map,
    /// `CollapseByIndex` list, default allowed set `&' ()-._A-Za-z0-9`.
    pub fn new() -> HeaderCodec {
        HeaderCodec {
            encode_strategy: EncodeStrategy {
                key_strategy: KeyEncodeStrategy::AsSeparator('-'),
                key_transform: KeyEncodeTransform::None,
                map_layout: MapLayout::SingleEntry,
            },
            decode_strategy: DecodeStrategy {
                key_strategy: KeyDecodeStrategy::AsSeparator('-'),
                key_transform: KeyDecodeTransform::None,
                map_layout: MapLayout::SingleEntry,
                list_strategy: ListDecodeStrategy::CollapseByIndex,
            },
            allowed_chars: Some(HEADERS_DEFAULT_ALLOWED.to_string()),
        }
    }

    pub fn builder() -> HeaderCodecBuilder {
        HeaderCodecBuilder::new()
    }

    /// Encode `value` into an ordered list of `(name, value)` pairs.
    pub fn encode<T: crate::value::ToEncodeValue>(
        &self,
        value: &T,
    ) -> Result<Vec<(String, Option<String>)>, EncodingError> {
        trace!("headers encode");
        let pairs = encode_walk(&value.to_encode_value(), &self.encode_strategy)?;
        // Only values are percent-encoded (spec §4.7); the key is structural
        // and is emitted verbatim.
        Ok(pairs
            .into_iter()
            .map(|(key, value)| {
                let value = value.map(|v| percent::encode(&v, self.allowed_chars.as_deref()));
                (key, value)
            })
            .collect())
    }

    /// Decode an ordered `[(name, value)]` header set into `T`.
    pub fn decode<T: FromShape>(
        &self,
        headers: &[(String, Option<String>)],
    ) -> Result<T, DecodingError> {
        trace!("headers decode");
        let mut pairs = Vec::with_capacity(headers.len());
        for (key, value) in headers {
            // Only values are percent-decoded (spec §4.3 step 6); the key is
            // structural and is taken verbatim.
            let value = match value {
                Some(v) => Some(percent::decode(v)?),
                None => None,
            };
            pairs.push((key.clone(), value));
        }

        let shape = parse(&pairs, &self.decode_strategy.key_strategy, &self.decode_strategy.key_transform)?;
        let ctx = DecodeCtx::root(
            &self.decode_strategy.key_strategy,
            &self.decode_strategy.map_layout,
            &self.decode_strategy.list_strategy,
        );
        T::from_shape(Some(&shape), &ctx)
    }
}

/// Builder for [`HeaderCodec`] (spec §1a "Configuration").
pub struct HeaderCodecBuilder {
    codec: HeaderCodec,
}

impl HeaderCodecBuilder {
    fn new() -> HeaderCodecBuilder {
        HeaderCodecBuilder {
            codec: HeaderCodec::new(),
        }
    }

    pub fn key_separator(mut self, sep: char) -> Self {
        self.codec.encode_strategy.key_strategy = KeyEncodeStrategy::AsSeparator(sep);
        self.codec.decode_strategy.key_strategy = KeyDecodeStrategy::AsSeparator(sep);
        self
    }

    pub fn map_layout(mut self, layout: MapLayout) -> Self {
        self.codec.encode_strategy.map_layout = layout.clone();
        self.codec.decode_strategy.map_layout = layout;
        self
    }

    pub fn list_strategy(mut self, strategy: ListDecodeStrategy) -> Self {
        self.codec.decode_strategy.list_strategy = strategy;
        self
    }

    pub fn key_encode_transform(mut self, transform: KeyEncodeTransform) -> Self {
        self.codec.encode_strategy.key_transform = transform;
        self
    }

    pub fn key_decode_transform(mut self, transform: KeyDecodeTransform) -> Self {
        self.codec.decode_strategy.key_transform = transform;
        self
    }

    pub fn allowed_chars(mut self, allowed: impl Into<String>) -> Self {
        self.codec.allowed_chars = Some(allowed.into());
        self
    }

    pub fn build(self) -> HeaderCodec {
        self.codec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathElem;
    use crate::value::{EncodeValue, Scalar, ToEncodeValue};
    use base64::Engine;
    use chrono::{TimeZone, Utc};

    fn s(v: &str) -> EncodeValue {
        EncodeValue::Scalar(Scalar::Str(v.to_string()))
    }

    struct Record(Vec<(String, EncodeValue)>);
    impl ToEncodeValue for Record {
        fn to_encode_value(&self) -> EncodeValue {
            EncodeValue::record(self.0.clone())
        }
    }

    #[derive(Debug, PartialEq)]
    struct Three {
        firstly: String,
        secondly: String,
        thirdly: String,
    }
    impl FromShape for Three {
        fn from_shape(node: Option<&crate::shape::Shape>, ctx: &DecodeCtx) -> Result<Self, DecodingError> {
            let dict = node.and_then(|n| n.as_dict());
            let field = |name: &str| dict.and_then(|d| d.get(name).cloned());
            Ok(Three {
                firstly: String::from_shape(field("firstly").as_ref(), &ctx.push(PathElem::Field("firstly".into())))?,
                secondly: String::from_shape(field("secondly").as_ref(), &ctx.push(PathElem::Field("secondly".into())))?,
                thirdly: String::from_shape(field("thirdly").as_ref(), &ctx.push(PathElem::Field("thirdly".into())))?,
            })
        }
    }

    #[test]
    fn headers_nested_record_with_list() {
        let record = Record(vec![
            ("action".to_string(), s("myAction")),
            (
                "ids".to_string(),
                EncodeValue::List(vec![
                    EncodeValue::record([
                        ("firstly".to_string(), s("v1")),
                        ("secondly".to_string(), s("v2")),
                        ("thirdly".to_string(), s("v3")),
                    ]),
                    EncodeValue::record([
                        ("firstly".to_string(), s("v4")),
                        ("secondly".to_string(), s("v5")),
                        ("thirdly".to_string(), s("v6")),
                    ]),
                ]),
            ),
        ]);
        let codec = HeaderCodec::new();
        let pairs = codec.encode(&record).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("action".to_string(), Some("myAction".to_string())),
                ("ids-1-firstly".to_string(), Some("v1".to_string())),
                ("ids-1-secondly".to_string(), Some("v2".to_string())),
                ("ids-1-thirdly".to_string(), Some("v3".to_string())),
                ("ids-2-firstly".to_string(), Some("v4".to_string())),
                ("ids-2-secondly".to_string(), Some("v5".to_string())),
                ("ids-2-thirdly".to_string(), Some("v6".to_string())),
            ]
        );
    }

    #[test]
    fn mixed_primitives_use_default_allowed_set() {
        let ts = Utc.timestamp_opt(1534352914, 0).unwrap();
        let data = base64::engine::general_purpose::STANDARD.encode(b"<tag>value</tag>");
        let record = Record(vec![
            ("id".to_string(), s("id")),
            ("data".to_string(), EncodeValue::Scalar(Scalar::Bytes(b"<tag>value</tag>".to_vec()))),
            ("date".to_string(), EncodeValue::Scalar(Scalar::Timestamp(ts))),
            ("bool".to_string(), EncodeValue::Scalar(Scalar::Bool(true))),
            ("int".to_string(), EncodeValue::Scalar(Scalar::Int(54))),
            ("double".to_string(), EncodeValue::Scalar(Scalar::Float(128.67))),
        ]);
        let codec = HeaderCodec::builder()
            .key_encode_transform(KeyEncodeTransform::CapitalizeFirst)
            .build();
        let pairs = codec.encode(&record).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("Bool".to_string(), Some("true".to_string())),
                ("Data".to_string(), Some(format!("{}%3D%3D", &data[..data.len() - 2]))),
                ("Date".to_string(), Some("2018-08-15T17%3A08%3A34.000Z".to_string())),
                ("Double".to_string(), Some("128.67".to_string())),
                ("Id".to_string(), Some("id".to_string())),
                ("Int".to_string(), Some("54".to_string())),
            ]
        );
    }

    #[test]
    fn round_trip_through_encode_and_decode() {
        let record = Record(vec![
            ("firstly".to_string(), s("value1")),
            ("secondly".to_string(), s("value2")),
            ("thirdly".to_string(), s("value3")),
        ]);
        let codec = HeaderCodec::new();
        let pairs = codec.encode(&record).unwrap();
        let decoded: Three = codec.decode(&pairs).unwrap();
        assert_eq!(
            decoded,
            Three {
                firstly: "value1".to_string(),
                secondly: "value2".to_string(),
                thirdly: "value3".to_string(),
            }
        );
    }
}
