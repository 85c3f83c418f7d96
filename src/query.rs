//! The Query surface codec (component H, spec §4.7).
//!
//! Defaults: key separator `.`, `SingleEntry` maps, `CollapseByIndex`
//! lists, no percent-encoding unless an allowed character set is given.

use tracing::trace;

use crate::decode::{DecodeCtx, FromShape};
use crate::encode::encode_walk;
use crate::error::{DecodingError, EncodingError};
use crate::parse::parse;
use crate::percent;
use crate::strategy::{
    DecodeStrategy, EncodeStrategy, KeyDecodeStrategy, KeyDecodeTransform, KeyEncodeStrategy,
    KeyEncodeTransform, ListDecodeStrategy, MapLayout,
};

/// Encodes to/decodes from an `application/x-www-form-urlencoded`-adjacent
/// query string (spec §4.7 "Query specifics").
#[derive(Clone, Debug)]
pub struct QueryCodec {
    encode_strategy: EncodeStrategy,
    decode_strategy: DecodeStrategy,
    allowed_chars: Option<String>,
}

impl Default for QueryCodec {
    fn default() -> Self {
        QueryCodec::new()
    }
}

impl QueryCodec {
    /// The documented defaults: key sep `.`, `SingleEntry` map,
    /// `CollapseByIndex` list, no percent-encoding.
    pub fn new() -> QueryCodec {
        QueryCodec {
            encode_strategy: EncodeStrategy {
                key_strategy: KeyEncodeStrategy::AsSeparator('.'),
                key_transform: KeyEncodeTransform::None,
                map_layout: MapLayout::SingleEntry,
            },
            decode_strategy: DecodeStrategy {
                key_strategy: KeyDecodeStrategy::AsSeparator('.'),
                key_transform: KeyDecodeTransform::None,
                map_layout: MapLayout::SingleEntry,
                list_strategy: ListDecodeStrategy::CollapseByIndex,
            },
            allowed_chars: None,
        }
    }

    pub fn builder() -> QueryCodecBuilder {
        QueryCodecBuilder::new()
    }

    /// Encode `value` to a query string, without a leading `?` (spec §4.7).
    pub fn encode<T: crate::value::ToEncodeValue>(&self, value: &T) -> Result<String, EncodingError> {
        trace!("query encode");
        let pairs = encode_walk(&value.to_encode_value(), &self.encode_strategy)?;

        let mut sorted = pairs;
        sorted.sort_by(|a, b| {
            let a_lower = a.0.to_lowercase();
            let b_lower = b.0.to_lowercase();
            a_lower.cmp(&b_lower).then_with(|| a.0.cmp(&b.0))
        });

        // Only values are percent-encoded (spec §4.7); the key is structural
        // and is emitted verbatim.
        let rendered: Vec<String> = sorted
            .into_iter()
            .map(|(key, value)| match value {
                Some(v) => format!("{key}={}", percent::encode(&v, self.allowed_chars.as_deref())),
                None => key,
            })
            .collect();
        Ok(rendered.join("&"))
    }

    /// Decode a query string (an optional leading `?` is stripped) into `T`
    /// (spec §4.7 "Query specifics").
    pub fn decode<T: FromShape>(&self, query: &str) -> Result<T, DecodingError> {
        trace!("query decode");
        let body = query.strip_prefix('?').unwrap_or(query);

        let mut pairs = Vec::new();
        for run in body.split('&') {
            if run.is_empty() {
                continue;
            }
            let (key, value) = match run.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (run, None),
            };
            // Only values are percent-decoded (spec §4.3 step 6); the key is
            // structural and is taken verbatim.
            let value = match value {
                Some(v) => Some(percent::decode(v)?),
                None => None,
            };
            pairs.push((key.to_string(), value));
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

/// Builder for [`QueryCodec`] (spec §1a "Configuration").
pub struct QueryCodecBuilder {
    codec: QueryCodec,
}

impl QueryCodecBuilder {
    fn new() -> QueryCodecBuilder {
        QueryCodecBuilder {
            codec: QueryCodec::new(),
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

    pub fn build(self) -> QueryCodec {
        self.codec
    }
}
