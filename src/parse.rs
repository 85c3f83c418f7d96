//! The parser (component D, spec §4.3).
//!
//! Inverse of the encoder walk: consumes an ordered list of
//! `(key, Option<value>)` pairs — already percent-decoded — and produces a
//! [`Shape`]. Builds a [`MutableShape`] tree during the walk and finalises
//! it to an immutable `Shape` once every pair has been inserted.

use tracing::trace;

use crate::error::DecodingError;
use crate::shape::{MutableShape, Shape};
use crate::strategy::KeyDecodeStrategy;

/// Parse a flat list of wire pairs into a `Shape` tree.
///
/// `key_transform` is applied to each key before grouping: pre-split for
/// `ShapePrefix` and `Flat` (there is no split to be "after"), post-split
/// for `AsSeparator` (spec §4.3 step 2) — in other words, under
/// `AsSeparator` the transform applies to each segment once it has been
/// isolated, not to the whole undivided wire key.
pub fn parse(
    pairs: &[(String, Option<String>)],
    key_strategy: &KeyDecodeStrategy,
    key_transform: &crate::strategy::KeyDecodeTransform,
) -> Result<Shape, DecodingError> {
    let mut root = MutableShape::empty_dict();

    match key_strategy {
        KeyDecodeStrategy::Flat => {
            for (key, value) in pairs {
                let key = key_transform.apply(key);
                if key.is_empty() {
                    return Err(DecodingError::data_corrupted(&[], "empty field name"));
                }
                root.insert_leaf(&key, leaf(value));
            }
        }

        KeyDecodeStrategy::ShapePrefix => {
            // Grouping is deferred to the decoder walk (E); the parser
            // inserts pairs verbatim under their (transformed) raw key
            // (spec §4.3 step 5).
            for (key, value) in pairs {
                let key = key_transform.apply(key);
                if key.is_empty() {
                    return Err(DecodingError::data_corrupted(&[], "empty field name"));
                }
                root.insert_leaf(&key, leaf(value));
            }
        }

        KeyDecodeStrategy::AsSeparator(sep) => {
            for (key, value) in pairs {
                insert_separated(&mut root, key, *sep, value, key_transform)?;
            }
        }
    }

    Ok(root.finalize())
}

fn leaf(value: &Option<String>) -> MutableShape {
    match value {
        Some(s) => MutableShape::String(s.clone()),
        None => MutableShape::Null,
    }
}

/// Insert one `(key, value)` pair under `root`, splitting `key` on the
/// first occurrence of `sep` at each level and descending one `Dict` per
/// split (spec §4.3 step 4).
fn insert_separated(
    root: &mut MutableShape,
    key: &str,
    sep: char,
    value: &Option<String>,
    key_transform: &crate::strategy::KeyDecodeTransform,
) -> Result<(), DecodingError> {
    let mut cur = root;
    let mut rest = key;
    loop {
        match rest.split_once(sep) {
            Some((head, tail)) => {
                let head = key_transform.apply(head);
                if head.is_empty() {
                    return Err(DecodingError::data_corrupted(&[], "empty field name"));
                }
                trace!(segment = %head, "parser: descend group");
                cur = cur.entry_dict(&head);
                rest = tail;
            }
            None => {
                let leaf_key = key_transform.apply(rest);
                if leaf_key.is_empty() {
                    return Err(DecodingError::data_corrupted(&[], "empty field name"));
                }
                cur.insert_leaf(&leaf_key, leaf(value));
                return Ok(());
            }
        }
    }
}
