//! # shapecodec
//!
//! A reflection-free codec mapping nested records, lists, and maps onto
//! three HTTP wire surfaces: query strings, header sets, and templated
//! URL paths.
//!
//! ```no_run
//! use shapecodec::{FromShape, QueryCodec, ToEncodeValue, EncodeValue};
//!
//! struct Search { term: String }
//!
//! impl ToEncodeValue for Search {
//!     fn to_encode_value(&self) -> EncodeValue {
//!         EncodeValue::record([("term".to_string(), self.term.to_encode_value())])
//!     }
//! }
//!
//! let codec = QueryCodec::new();
//! let query = codec.encode(&Search { term: "rust".into() }).unwrap();
//! assert_eq!(query, "term=rust");
//! ```
//!
//! A value describes itself to the encoder walk via [`ToEncodeValue`]; a
//! target type reconstructs itself from a decoded [`shape::Shape`] tree via
//! [`FromShape`]. Both are hand-written, not derived or reflected — the
//! static visitor contract this crate is built around.

pub mod decode;
pub mod encode;
pub mod error;
pub mod headers;
pub mod parse;
pub mod path;
pub mod percent;
pub mod query;
pub mod shape;
pub mod strategy;
pub mod value;

pub use decode::{DecodeCtx, FromShape};
pub use encode::encode_walk;
pub use error::{DecodingError, EncodingError, PathElem, PathError};
pub use headers::{HeaderCodec, HeaderCodecBuilder};
pub use parse::parse;
pub use path::{match_path, render_path, tokenize, PathCodec, PathCodecBuilder, Segment, Template, Token};
pub use query::{QueryCodec, QueryCodecBuilder};
pub use shape::{MutableShape, RawShape, Shape};
pub use strategy::{
    CustomTransform, DecodeStrategy, EncodeStrategy, KeyDecodeStrategy, KeyDecodeTransform,
    KeyEncodeStrategy, KeyEncodeTransform, ListDecodeStrategy, MapLayout,
};
pub use value::{EncodeValue, Scalar, ToEncodeValue};
