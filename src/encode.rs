//! The encoder walk (component C, spec §4.2).
//!
//! Walks an [`EncodeValue`] tree, composing keys per the configured
//! [`EncodeStrategy`], and emits a flat ordered list of
//! `(composed_key, Option<value>)` pairs — `None` denotes `Null`. Percent-
//! encoding of the emitted values is the surface codec's job (§4.7), not
//! this walk's; this module only composes keys and stringifies scalars.

use tracing::trace;

use crate::error::EncodingError;
use crate::strategy::{EncodeStrategy, MapLayout};
use crate::value::EncodeValue;

/// Encode an [`EncodeValue`] tree into a flat, canonically ordered list of
/// `(key, value)` pairs.
///
/// Only a `Record` or a `Map` may sit at the root (spec §4.2 "Errors"): a
/// bare scalar has no key to hang off of, and a bare list has no key
/// either (`UnkeyedRoot`).
pub fn encode_walk(
    root: &EncodeValue,
    strategy: &EncodeStrategy,
) -> Result<Vec<(String, Option<String>)>, EncodingError> {
    match root {
        EncodeValue::Record(_) | EncodeValue::Map(_) => {}
        EncodeValue::List(_) => return Err(EncodingError::UnkeyedRoot),
        EncodeValue::Scalar(_) => return Err(EncodingError::NotContainerRoot),
    }
    let mut out = Vec::new();
    walk(root, None, strategy, &mut out)?;
    Ok(out)
}

fn walk(
    node: &EncodeValue,
    base: Option<&str>,
    strategy: &EncodeStrategy,
    out: &mut Vec<(String, Option<String>)>,
) -> Result<(), EncodingError> {
    match node {
        EncodeValue::Scalar(s) => {
            let key = base
                .map(|b| b.to_string())
                .ok_or(EncodingError::NotContainerRoot)?;
            out.push((key, s.to_wire_string()));
            Ok(())
        }

        EncodeValue::Record(fields) => {
            // Keyed containers iterate sorted by ASCII field name (spec §4.2
            // "Ordering"); the key transform applies only here, never to
            // indices or map entry keys.
            let mut sorted: Vec<&(String, EncodeValue)> = fields.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(&b.0));
            for (name, value) in sorted {
                let key = strategy.compose(base, name);
                trace!(field = %name, composed = %key, "encode record field");
                walk(value, Some(&key), strategy, out)?;
            }
            Ok(())
        }

        EncodeValue::List(items) => {
            for (i, item) in items.iter().enumerate() {
                let key = strategy.compose_index(base, i + 1);
                walk(item, Some(&key), strategy, out)?;
            }
            Ok(())
        }

        EncodeValue::Map(entries) => {
            // Map entries are data, not field names: no key transform, and
            // iteration is over sorted entries so SplitEntries indices and
            // SingleEntry wire output are both deterministic (spec §4.2,
            // §8 "Deterministic query").
            let mut sorted: Vec<&(String, EncodeValue)> = entries.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(&b.0));

            match &strategy.map_layout {
                MapLayout::SingleEntry => {
                    for (k, v) in sorted {
                        let key = strategy.compose_raw(base, k);
                        walk(v, Some(&key), strategy, out)?;
                    }
                    Ok(())
                }
                MapLayout::SplitEntries { key_tag, value_tag } => {
                    for (i, (k, v)) in sorted.into_iter().enumerate() {
                        let entry_base = strategy.compose_index(base, i + 1);
                        let key_key = strategy.compose_raw(Some(&entry_base), key_tag);
                        out.push((key_key, Some(k.clone())));
                        let value_key = strategy.compose_raw(Some(&entry_base), value_tag);
                        walk(v, Some(&value_key), strategy, out)?;
                    }
                    Ok(())
                }
            }
        }
    }
}
