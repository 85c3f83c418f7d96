//! The Path surface codec (component H, spec §4.5–§4.7).
//!
//! Combines the tokenizer (F, [`token`]) and the matcher/emitter (G,
//! [`matcher`]) with the parser (D) and decoder walk (E) to turn a
//! template string plus a concrete path into a typed value, and back.
//! Percent-encoding is never applied here (spec §4.7 "Path specifics");
//! the higher HTTP layer owns path-segment encoding.

mod matcher;
pub mod token;

pub use matcher::{match_path, render_path};
pub use token::{tokenize, Segment, Template, Token};

use tracing::trace;

use crate::decode::{DecodeCtx, FromShape};
use crate::error::PathError;
use crate::parse::parse;
use crate::strategy::{KeyDecodeStrategy, KeyDecodeTransform, ListDecodeStrategy, MapLayout};
use crate::strategy::{EncodeStrategy, KeyEncodeStrategy, KeyEncodeTransform};
use crate::value::ToEncodeValue;

/// Encodes to/decodes from a path rendered against a [`Template`] (spec
/// §4.5–§4.7 "Path specifics").
#[derive(Clone, Debug)]
pub struct PathCodec {
    encode_strategy: EncodeStrategy,
    key_decode_strategy: KeyDecodeStrategy,
    key_decode_transform: KeyDecodeTransform,
}

impl Default for PathCodec {
    fn default() -> Self {
        PathCodec::new()
    }
}

impl PathCodec {
    /// The documented default: key sep `.`, `SingleEntry` map (list layout
    /// is moot — path variables are scalars, grouping comes from the
    /// template, not from a list strategy).
    pub fn new() -> PathCodec {
        PathCodec {
            encode_strategy: EncodeStrategy {
                key_strategy: KeyEncodeStrategy::AsSeparator('.'),
                key_transform: KeyEncodeTransform::None,
                map_layout: MapLayout::SingleEntry,
            },
            key_decode_strategy: KeyDecodeStrategy::AsSeparator('.'),
            key_decode_transform: KeyDecodeTransform::None,
        }
    }

    pub fn builder() -> PathCodecBuilder {
        PathCodecBuilder::new()
    }

    /// Render `value` against `template` (spec §4.6 "Emitter").
    pub fn encode<T: ToEncodeValue>(&self, value: &T, template: &Template) -> Result<String, PathError> {
        trace!("path encode");
        render_path(template, value, &self.encode_strategy)
    }

    /// Match `path` against `template`, then decode the resulting bindings
    /// into `T` (spec §4.6 "Matcher").
    pub fn decode<T: FromShape>(&self, path: &str, template: &Template) -> Result<T, PathError> {
        trace!("path decode");
        let bindings = match_path(path, template)?;
        let shape = parse(&bindings, &self.key_decode_strategy, &self.key_decode_transform)?;
        let ctx = DecodeCtx::root(
            &self.key_decode_strategy,
            &MapLayout::SingleEntry,
            &ListDecodeStrategy::CollapseByIndex,
        );
        Ok(T::from_shape(Some(&shape), &ctx)?)
    }
}

/// Builder for [`PathCodec`] (spec §1a "Configuration").
pub struct PathCodecBuilder {
    codec: PathCodec,
}

impl PathCodecBuilder {
    fn new() -> PathCodecBuilder {
        PathCodecBuilder {
            codec: PathCodec::new(),
        }
    }

    pub fn key_separator(mut self, sep: char) -> Self {
        self.codec.encode_strategy.key_strategy = KeyEncodeStrategy::AsSeparator(sep);
        self.codec.key_decode_strategy = KeyDecodeStrategy::AsSeparator(sep);
        self
    }

    pub fn build(self) -> PathCodec {
        self.codec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathElem;
    use crate::value::EncodeValue;

    #[derive(Debug, PartialEq)]
    struct Three {
        firstly: String,
        secondly: String,
        thirdly: String,
    }

    impl ToEncodeValue for Three {
        fn to_encode_value(&self) -> EncodeValue {
            EncodeValue::record([
                ("firstly".to_string(), self.firstly.to_encode_value()),
                ("secondly".to_string(), self.secondly.to_encode_value()),
                ("thirdly".to_string(), self.thirdly.to_encode_value()),
            ])
        }
    }

    impl FromShape for Three {
        fn from_shape(
            node: Option<&crate::shape::Shape>,
            ctx: &DecodeCtx,
        ) -> Result<Self, crate::error::DecodingError> {
            let dict = node.and_then(|n| n.as_dict());
            let field = |name: &str| dict.and_then(|d| d.get(name).cloned());
            Ok(Three {
                firstly: String::from_shape(
                    field("firstly").as_ref(),
                    &ctx.push(PathElem::Field("firstly".into())),
                )?,
                secondly: String::from_shape(
                    field("secondly").as_ref(),
                    &ctx.push(PathElem::Field("secondly".into())),
                )?,
                thirdly: String::from_shape(
                    field("thirdly").as_ref(),
                    &ctx.push(PathElem::Field("thirdly".into())),
                )?,
            })
        }
    }

    #[test]
    fn path_template_with_greedy_variable_round_trips() {
        let template = tokenize("items{firstly}/things/{secondly}/{thirdly+}").unwrap();
        let value = Three {
            firstly: "value1".to_string(),
            secondly: "value2".to_string(),
            thirdly: "value3/value4".to_string(),
        };
        let codec = PathCodec::new();
        let rendered = codec.encode(&value, &template).unwrap();
        assert_eq!(rendered, "itemsvalue1/things/value2/value3/value4");

        let decoded: Three = codec.decode(&rendered, &template).unwrap();
        assert_eq!(decoded, value);
    }
}
