//! The decoder walk (component E, spec §4.4).
//!
//! Reconstructs a typed value from a [`Shape`] tree via [`FromShape`], the
//! decode-side half of the visitor contract (spec §6). [`DecodeCtx`] carries
//! the strategies this walk consults (key strategy for grouping, map
//! layout, list layout) plus the accumulated field path used to localise
//! decode errors.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::{DecodingError, PathElem};
use crate::shape::Shape;
use crate::strategy::{KeyDecodeStrategy, ListDecodeStrategy, MapLayout};

/// Decode-side context: the strategies the decoder walk consults, plus the
/// field path accumulated so far (used only for error messages).
#[derive(Clone, Debug)]
pub struct DecodeCtx<'a> {
    pub key_strategy: &'a KeyDecodeStrategy,
    pub map_layout: &'a MapLayout,
    pub list_strategy: &'a ListDecodeStrategy,
    pub path: Vec<PathElem>,
}

impl<'a> DecodeCtx<'a> {
    pub fn root(
        key_strategy: &'a KeyDecodeStrategy,
        map_layout: &'a MapLayout,
        list_strategy: &'a ListDecodeStrategy,
    ) -> DecodeCtx<'a> {
        DecodeCtx {
            key_strategy,
            map_layout,
            list_strategy,
            path: Vec::new(),
        }
    }

    /// A copy of this context with `elem` appended to the path, used when
    /// descending into a field, list item, or map entry.
    pub fn push(&self, elem: PathElem) -> DecodeCtx<'a> {
        let mut path = self.path.clone();
        path.push(elem);
        DecodeCtx {
            key_strategy: self.key_strategy,
            map_layout: self.map_layout,
            list_strategy: self.list_strategy,
            path,
        }
    }

    /// Container resolution for a child key `name` under `dict` (spec §4.4).
    ///
    /// Under `AsSeparator`/`Flat`, a direct lookup. Under `ShapePrefix`, an
    /// exact `Dict[name]` child wins over grouping every sibling whose key
    /// starts with `name` into a synthetic dict of suffix → child — the
    /// "exact match wins over prefix-group" precedence the spec requires
    /// (spec §9).
    pub fn field(&self, dict: &Shape, name: &str) -> Option<Shape> {
        let map = dict.as_dict()?;
        match self.key_strategy {
            KeyDecodeStrategy::AsSeparator(_) | KeyDecodeStrategy::Flat => map.get(name).cloned(),
            KeyDecodeStrategy::ShapePrefix => {
                if let Some(v) = map.get(name) {
                    return Some(v.clone());
                }
                let mut synthetic = HashMap::new();
                let mut found = false;
                for (k, v) in map.iter() {
                    if let Some(suffix) = k.strip_prefix(name) {
                        if !suffix.is_empty() {
                            if synthetic.insert(suffix.to_string(), v.clone()).is_some() {
                                warn!(field = %name, suffix = %suffix, "ShapePrefix group has colliding suffix");
                            }
                            found = true;
                        }
                    }
                }
                if found {
                    Some(Shape::Dict(synthetic))
                } else {
                    None
                }
            }
        }
    }

    /// List resolution from a `Dict` (spec §4.4): `CollapseByIndex` iterates
    /// `"1".."N"` directly; `CollapseByIndexAndItemTag` first descends into
    /// the item-tag sub-dict.
    pub fn resolve_list(&self, container: &Shape) -> Result<Vec<Shape>, DecodingError> {
        match self.list_strategy {
            ListDecodeStrategy::CollapseByIndex => self.resolve_list_by_index(container),
            ListDecodeStrategy::CollapseByIndexAndItemTag(tag) => {
                match self.field(container, tag) {
                    Some(inner) => self.resolve_list_by_index(&inner),
                    None => Ok(Vec::new()),
                }
            }
        }
    }

    fn resolve_list_by_index(&self, dict: &Shape) -> Result<Vec<Shape>, DecodingError> {
        let map = match dict {
            Shape::Dict(map) => map,
            Shape::Null => return Ok(Vec::new()),
            Shape::String(_) => {
                return Err(DecodingError::type_mismatch(&self.path, "list", "string"))
            }
        };
        let n = map.len();
        let mut out = Vec::with_capacity(n);
        for i in 1..=n {
            let key = i.to_string();
            match map.get(&key) {
                Some(v) => out.push(v.clone()),
                None => {
                    return Err(DecodingError::data_corrupted(
                        &self.path,
                        format!("missing index {i} in list of {n}"),
                    ))
                }
            }
        }
        Ok(out)
    }

    /// Map resolution from a `Dict` (spec §4.4).
    pub fn resolve_map<T: FromShape>(
        &self,
        container: &Shape,
    ) -> Result<HashMap<String, T>, DecodingError> {
        match &self.map_layout {
            MapLayout::SingleEntry => {
                let map = match container {
                    Shape::Dict(map) => map,
                    Shape::Null => return Ok(HashMap::new()),
                    Shape::String(_) => {
                        return Err(DecodingError::type_mismatch(&self.path, "map", "string"))
                    }
                };
                let mut out = HashMap::with_capacity(map.len());
                for (k, v) in map {
                    let entry_ctx = self.push(PathElem::Field(k.clone()));
                    out.insert(k.clone(), T::from_shape(Some(v), &entry_ctx)?);
                }
                Ok(out)
            }
            MapLayout::SplitEntries { key_tag, value_tag } => {
                let entries = self.resolve_list(container)?;
                let mut out = HashMap::with_capacity(entries.len());
                for (i, entry) in entries.into_iter().enumerate() {
                    let entry_ctx = self.push(PathElem::Index(i + 1));
                    let key_node = self.field(&entry, key_tag);
                    let key_str = match key_node {
                        Some(Shape::String(s)) => s,
                        Some(Shape::Null) => return Err(entry_ctx.value_not_found("string")),
                        None => return Err(entry_ctx.key_not_found()),
                        Some(Shape::Dict(_)) => {
                            return Err(DecodingError::type_mismatch(
                                &entry_ctx.path,
                                "string",
                                "dict",
                            ))
                        }
                    };
                    let value_ctx = entry_ctx.push(PathElem::Field(value_tag.clone()));
                    let value_node = self.field(&entry, value_tag);
                    let value = T::from_shape(value_node.as_ref(), &value_ctx)?;
                    out.insert(key_str, value); // duplicate keys overwrite (spec §4.4)
                }
                Ok(out)
            }
        }
    }

    /// Build the `KeyNotFound` error for a field that is entirely absent
    /// from its parent `Dict` (spec §7: "a required field was absent").
    pub fn key_not_found(&self) -> DecodingError {
        match self.path.last() {
            Some(PathElem::Field(name)) => DecodingError::key_not_found(&self.path, name.clone()),
            _ => DecodingError::key_not_found(&self.path, String::new()),
        }
    }

    /// Build the `ValueNotFound` error for a field that is present but
    /// `Null` where a value is required (spec §7: "field present but Null
    /// where a value is required").
    pub fn value_not_found(&self, expected_kind: &str) -> DecodingError {
        DecodingError::value_not_found(&self.path, expected_kind)
    }
}

/// The decode-side half of the visitor contract (spec §6): reconstruct
/// `Self` from an optional `Shape` node (`None` = absent, `Some(Null)` =
/// present-but-empty, `Some(String(_))`/`Some(Dict(_))` = present).
pub trait FromShape: Sized {
    fn from_shape(node: Option<&Shape>, ctx: &DecodeCtx) -> Result<Self, DecodingError>;
}

impl FromShape for String {
    /// Missing required strings default to `""` rather than erroring — the
    /// round-trip convention preserved from the source system (spec §4.4, §9).
    fn from_shape(node: Option<&Shape>, ctx: &DecodeCtx) -> Result<Self, DecodingError> {
        match node {
            None => Ok(String::new()),
            Some(Shape::String(s)) => Ok(s.clone()),
            Some(Shape::Null) => Err(ctx.value_not_found("string")),
            Some(Shape::Dict(_)) => Err(DecodingError::type_mismatch(&ctx.path, "string", "dict")),
        }
    }
}

impl FromShape for bool {
    fn from_shape(node: Option<&Shape>, ctx: &DecodeCtx) -> Result<Self, DecodingError> {
        let s = require_string(node, ctx, "bool")?;
        match s.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(DecodingError::type_mismatch(&ctx.path, "bool", other)),
        }
    }
}

macro_rules! impl_from_shape_int {
    ($($t:ty),+) => {
        $(
            impl FromShape for $t {
                fn from_shape(node: Option<&Shape>, ctx: &DecodeCtx) -> Result<Self, DecodingError> {
                    let s = require_string(node, ctx, stringify!($t))?;
                    s.parse::<$t>().map_err(|_| {
                        DecodingError::type_mismatch(&ctx.path, stringify!($t), &s)
                    })
                }
            }
        )+
    };
}
impl_from_shape_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl FromShape for f64 {
    fn from_shape(node: Option<&Shape>, ctx: &DecodeCtx) -> Result<Self, DecodingError> {
        let s = require_string(node, ctx, "f64")?;
        s.parse::<f64>()
            .map_err(|_| DecodingError::type_mismatch(&ctx.path, "f64", &s))
    }
}

impl FromShape for DateTime<Utc> {
    fn from_shape(node: Option<&Shape>, ctx: &DecodeCtx) -> Result<Self, DecodingError> {
        let s = require_string(node, ctx, "timestamp")?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DecodingError::data_corrupted(&ctx.path, e.to_string()))
    }
}

impl FromShape for Vec<u8> {
    /// Missing required binary blobs default to empty bytes, mirroring the
    /// `String` exception (spec §4.4, §9).
    fn from_shape(node: Option<&Shape>, ctx: &DecodeCtx) -> Result<Self, DecodingError> {
        use base64::Engine;
        match node {
            None => Ok(Vec::new()),
            Some(Shape::Null) => Err(ctx.value_not_found("bytes")),
            Some(Shape::String(s)) => base64::engine::general_purpose::STANDARD
                .decode(s)
                .map_err(|e| DecodingError::data_corrupted(&ctx.path, e.to_string())),
            Some(Shape::Dict(_)) => Err(DecodingError::type_mismatch(&ctx.path, "bytes", "dict")),
        }
    }
}

impl<T: FromShape> FromShape for Option<T> {
    /// Absence and explicit `Null` both decode to `None` (spec §9).
    fn from_shape(node: Option<&Shape>, ctx: &DecodeCtx) -> Result<Self, DecodingError> {
        match node {
            None => Ok(None),
            Some(Shape::Null) => Ok(None),
            Some(_) => Ok(Some(T::from_shape(node, ctx)?)),
        }
    }
}

impl<T: FromShape> FromShape for Vec<T> {
    fn from_shape(node: Option<&Shape>, ctx: &DecodeCtx) -> Result<Self, DecodingError> {
        let container = match node {
            None => return Err(ctx.key_not_found()),
            Some(Shape::Null) => return Ok(Vec::new()),
            Some(shape) => shape,
        };
        let items = ctx.resolve_list(container)?;
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let item_ctx = ctx.push(PathElem::Index(i + 1));
            out.push(T::from_shape(Some(&item), &item_ctx)?);
        }
        Ok(out)
    }
}

impl<T: FromShape> FromShape for HashMap<String, T> {
    fn from_shape(node: Option<&Shape>, ctx: &DecodeCtx) -> Result<Self, DecodingError> {
        let container = match node {
            None => return Err(ctx.key_not_found()),
            Some(Shape::Null) => return Ok(HashMap::new()),
            Some(shape) => shape,
        };
        ctx.resolve_map(container)
    }
}

fn require_string(node: Option<&Shape>, ctx: &DecodeCtx, kind: &str) -> Result<String, DecodingError> {
    match node {
        None => Err(ctx.key_not_found()),
        Some(Shape::Null) => Err(ctx.value_not_found(kind)),
        Some(Shape::String(s)) => Ok(s.clone()),
        Some(Shape::Dict(_)) => Err(DecodingError::type_mismatch(&ctx.path, kind, "dict")),
    }
}
