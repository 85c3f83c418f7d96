//! Key, map, and list strategies (component B, spec §3, §6 "Configuration
//! enumeration").
//!
//! These are the orthogonal configuration axes consulted by the encoder
//! walk (C), the parser (D), and the decoder walk (E). Per spec §9
//! ("Strategy explosion"), each of those three components consults only
//! the strategies relevant to it: the parser consults key/transform; the
//! decoder walk consults key(for grouping)/map/list; the encoder walk
//! consults key/map/transform.

use std::fmt;
use std::sync::Arc;

/// Key-composition strategy, encoder side (spec §3).
#[derive(Clone)]
pub enum KeyEncodeStrategy {
    /// Compose nested keys with a separator character (e.g. `.` for query
    /// and path, `-` for headers).
    AsSeparator(char),
    /// Concatenate nested keys with no delimiter.
    NoSeparator,
}

impl fmt::Debug for KeyEncodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEncodeStrategy::AsSeparator(c) => write!(f, "AsSeparator({:?})", c),
            KeyEncodeStrategy::NoSeparator => write!(f, "NoSeparator"),
        }
    }
}

/// Key-parsing strategy, decoder side (spec §3).
#[derive(Clone, Debug)]
pub enum KeyDecodeStrategy {
    /// Split wire keys on the first occurrence of `char` to form a nested path.
    AsSeparator(char),
    /// Group sibling keys sharing a common prefix matching a field name; no
    /// separator character is consumed.
    ShapePrefix,
    /// Refuse to split; every wire key is a leaf key directly under the root.
    Flat,
}

/// How a map is laid out on the wire; shared between encode and decode
/// (spec §3 "Map layout").
#[derive(Clone, Debug)]
pub enum MapLayout {
    /// One key/value pair per map entry, keyed by the map's own key.
    SingleEntry,
    /// The map is emitted/parsed as a list of `{keyTag, valueTag}` pairs.
    SplitEntries { key_tag: String, value_tag: String },
}

impl MapLayout {
    pub fn split_entries(key_tag: impl Into<String>, value_tag: impl Into<String>) -> MapLayout {
        MapLayout::SplitEntries {
            key_tag: key_tag.into(),
            value_tag: value_tag.into(),
        }
    }
}

/// List layout, decoder side only — the encoder always emits contiguous
/// 1-based indices (spec §4.2); only the decoder needs to know whether
/// those indices sit directly under the base key or behind an item tag.
#[derive(Clone, Debug)]
pub enum ListDecodeStrategy {
    CollapseByIndex,
    CollapseByIndexAndItemTag(String),
}

/// A user-supplied key-transform function. Boxed in an `Arc` so strategy
/// objects remain `Clone + Send + Sync` (spec §5: strategies may be shared
/// across threads without synchronisation).
#[derive(Clone)]
pub struct CustomTransform(pub Arc<dyn Fn(&str) -> String + Send + Sync>);

impl fmt::Debug for CustomTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomTransform(..)")
    }
}

impl CustomTransform {
    pub fn new(f: impl Fn(&str) -> String + Send + Sync + 'static) -> CustomTransform {
        CustomTransform(Arc::new(f))
    }
}

/// Key transform applied at emission time, record/field keys only — never
/// to indices or map entry keys (spec §4.2).
#[derive(Clone, Debug)]
pub enum KeyEncodeTransform {
    None,
    CapitalizeFirst,
    Custom(CustomTransform),
}

impl KeyEncodeTransform {
    pub fn apply(&self, key: &str) -> String {
        match self {
            KeyEncodeTransform::None => key.to_string(),
            KeyEncodeTransform::CapitalizeFirst => capitalize_first(key),
            KeyEncodeTransform::Custom(f) => (f.0)(key),
        }
    }
}

/// Key transform applied at decode time, the inverse of [`KeyEncodeTransform`].
#[derive(Clone, Debug)]
pub enum KeyDecodeTransform {
    None,
    UncapitalizeFirst,
    Custom(CustomTransform),
}

impl KeyDecodeTransform {
    pub fn apply(&self, key: &str) -> String {
        match self {
            KeyDecodeTransform::None => key.to_string(),
            KeyDecodeTransform::UncapitalizeFirst => uncapitalize_first(key),
            KeyDecodeTransform::Custom(f) => (f.0)(key),
        }
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn uncapitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Bundled encode-side configuration, consulted by the encoder walk (C).
#[derive(Clone, Debug)]
pub struct EncodeStrategy {
    pub key_strategy: KeyEncodeStrategy,
    pub key_transform: KeyEncodeTransform,
    pub map_layout: MapLayout,
}

impl EncodeStrategy {
    pub fn compose(&self, base: Option<&str>, field: &str) -> String {
        let transformed = self.key_transform.apply(field);
        match (base, &self.key_strategy) {
            (None, _) => transformed,
            (Some(base), KeyEncodeStrategy::AsSeparator(sep)) => {
                format!("{base}{sep}{transformed}")
            }
            (Some(base), KeyEncodeStrategy::NoSeparator) => format!("{base}{transformed}"),
        }
    }

    /// Compose a key for an indexed (list) entry; indices are never
    /// transformed.
    pub fn compose_index(&self, base: Option<&str>, index: usize) -> String {
        self.compose_raw(base, &index.to_string())
    }

    /// Compose a key for raw (untransformed) text — used for list indices
    /// and map entry data, which the spec explicitly exempts from key
    /// transforms.
    pub fn compose_raw(&self, base: Option<&str>, raw: &str) -> String {
        match (base, &self.key_strategy) {
            (None, _) => raw.to_string(),
            (Some(base), KeyEncodeStrategy::AsSeparator(sep)) => format!("{base}{sep}{raw}"),
            (Some(base), KeyEncodeStrategy::NoSeparator) => format!("{base}{raw}"),
        }
    }
}

/// Bundled decode-side configuration, consulted by the parser (D) and the
/// decoder walk (E).
#[derive(Clone, Debug)]
pub struct DecodeStrategy {
    pub key_strategy: KeyDecodeStrategy,
    pub key_transform: KeyDecodeTransform,
    pub map_layout: MapLayout,
    pub list_strategy: ListDecodeStrategy,
}
