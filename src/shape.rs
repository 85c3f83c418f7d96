//! The shape model (component A, spec §3, §4.1).
//!
//! `Shape` is the immutable intermediate tree that mediates between typed
//! records and flat wire key/value pairs. `RawShape` is its array-aware
//! companion: the same tree, but with contiguous `"1".."N"` dict keys
//! collapsed back into a real array for inspection or debugging. `MutableShape`
//! is the construction-time counterpart used only inside the [`crate::parse`]
//! module; it is never exposed outside a single parse call.

use std::collections::HashMap;

/// An immutable key/value tree: the mediator between typed values and the
/// flat wire form.
///
/// `Dict` compares as an unordered mapping — insertion order never affects
/// equality (spec invariant I1). Arrays have no dedicated variant; per the
/// "array-as-dict" convention (spec §3) they are `Dict`s keyed `"1".."N"`.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Dict(HashMap<String, Shape>),
    String(String),
    Null,
}

impl Shape {
    pub fn dict(entries: impl IntoIterator<Item = (String, Shape)>) -> Shape {
        Shape::Dict(entries.into_iter().collect())
    }

    pub fn string(s: impl Into<String>) -> Shape {
        Shape::String(s.into())
    }

    pub fn null() -> Shape {
        Shape::Null
    }

    pub fn as_dict(&self) -> Option<&HashMap<String, Shape>> {
        match self {
            Shape::Dict(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Shape::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Shape::Null)
    }

    /// Lossy inverse of the array-as-dict convention: if every key of a
    /// `Dict` is exactly `"1".."N"` (contiguous, 1-based), render it as a
    /// [`RawShape::Array`]; otherwise recurse as a `Dict`.
    pub fn as_raw(&self) -> RawShape {
        match self {
            Shape::Null => RawShape::Null,
            Shape::String(s) => RawShape::String(s.clone()),
            Shape::Dict(map) => {
                if let Some(items) = try_as_array(map) {
                    RawShape::Array(items)
                } else {
                    RawShape::Dict(map.iter().map(|(k, v)| (k.clone(), v.as_raw())).collect())
                }
            }
        }
    }
}

/// `Shape`'s array-aware companion: a `Dict` whose keys are exactly
/// `"1".."N"` is rendered as an `Array` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum RawShape {
    Dict(HashMap<String, RawShape>),
    Array(Vec<RawShape>),
    String(String),
    Null,
}

fn try_as_array(map: &HashMap<String, Shape>) -> Option<Vec<RawShape>> {
    if map.is_empty() {
        return None;
    }
    let n = map.len();
    let mut items: Vec<Option<RawShape>> = (0..n).map(|_| None).collect();
    for (k, v) in map {
        let idx: usize = k.parse().ok()?;
        if idx == 0 || idx > n {
            return None;
        }
        if items[idx - 1].is_some() {
            return None; // shouldn't happen since map keys are unique
        }
        items[idx - 1] = Some(v.as_raw());
    }
    items.into_iter().collect()
}

/// Construction-time counterpart to `Shape`, used only inside a single
/// parse call (spec §3 "Lifecycle"). `Dict` owns a growable mapping whose
/// values are other `MutableShape`s; [`MutableShape::finalize`] is a pure
/// recursive move into `Shape`.
#[derive(Debug)]
pub enum MutableShape {
    Dict(HashMap<String, MutableShape>),
    String(String),
    Null,
}

impl MutableShape {
    pub fn empty_dict() -> MutableShape {
        MutableShape::Dict(HashMap::new())
    }

    /// Get-or-insert the nested dict at `key`, creating it if absent.
    ///
    /// Panics if `self` is not a `Dict` or if `key` already names a
    /// non-dict child; both are parser-internal invariant violations, not
    /// user-facing error conditions (malformed wire input is always caught
    /// before this is called).
    pub fn entry_dict(&mut self, key: &str) -> &mut MutableShape {
        match self {
            MutableShape::Dict(map) => map
                .entry(key.to_string())
                .or_insert_with(MutableShape::empty_dict),
            _ => panic!("entry_dict called on a non-dict MutableShape"),
        }
    }

    pub fn insert_leaf(&mut self, key: &str, value: MutableShape) {
        match self {
            MutableShape::Dict(map) => {
                map.insert(key.to_string(), value);
            }
            _ => panic!("insert_leaf called on a non-dict MutableShape"),
        }
    }

    pub fn finalize(self) -> Shape {
        match self {
            MutableShape::Dict(map) => {
                Shape::Dict(map.into_iter().map(|(k, v)| (k, v.finalize())).collect())
            }
            MutableShape::String(s) => Shape::String(s),
            MutableShape::Null => Shape::Null,
        }
    }
}
