//! Error taxonomy for the shape codec (spec §7).
//!
//! Three families, one per failure domain: [`EncodingError`] (value → wire),
//! [`DecodingError`] (wire → value), and [`PathError`] (template tokenizing
//! and matching). Every decode-side error carries a [`PathElem`] trail so
//! callers can localise the fault to a specific field or list index.

use std::fmt;

/// One step of a decode error's field path: a record field name or a list index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathElem {
    Field(String),
    Index(usize),
}

impl fmt::Display for PathElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElem::Field(name) => write!(f, "{}", name),
            PathElem::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// Render a path trail as `a.b[2].c`, for error messages.
pub fn format_path(path: &[PathElem]) -> String {
    let mut out = String::new();
    for (i, elem) in path.iter().enumerate() {
        match elem {
            PathElem::Field(_) if i > 0 => {
                out.push('.');
                out.push_str(&elem.to_string());
            }
            _ => out.push_str(&elem.to_string()),
        }
    }
    out
}

/// Errors raised while walking a value into flat `(key, value)` pairs (§4.2).
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    /// A scalar or list was offered at the encode root; only records and maps
    /// may sit at the root.
    #[error("value at encode root must be a record or map, not a scalar or list")]
    NotContainerRoot,

    /// A list sat directly at the encode root with no enclosing record.
    #[error("a list cannot be the encode root")]
    UnkeyedRoot,

    /// A map was offered whose keys are not strings.
    #[error("map keys must be strings")]
    NonStringMapKey,

    /// A percent-encoding pass failed on an already-invalid value (should not
    /// occur for well-formed UTF-8 strings; kept for API completeness).
    #[error("failed to percent-encode value at {path}: {reason}")]
    EncodingFailed { path: String, reason: String },
}

/// Errors raised while reconstructing a typed value from a [`crate::shape::Shape`] (§4.4).
#[derive(Debug, thiserror::Error)]
pub enum DecodingError {
    /// A required field was absent at `path`.
    #[error("key not found at {path}: {key}")]
    KeyNotFound { path: String, key: String },

    /// A field was present but held `Null` where a value of `expected_kind`
    /// was required.
    #[error("value not found at {path}: expected {expected_kind}")]
    ValueNotFound { path: String, expected_kind: String },

    /// A string value at `path` could not be parsed as `expected`.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// A value at `path` failed percent-decoding, Base64 decoding, or
    /// timestamp parsing.
    #[error("data corrupted at {path}: {reason}")]
    DataCorrupted { path: String, reason: String },
}

impl DecodingError {
    pub fn key_not_found(path: &[PathElem], key: impl Into<String>) -> Self {
        DecodingError::KeyNotFound {
            path: format_path(path),
            key: key.into(),
        }
    }

    pub fn value_not_found(path: &[PathElem], expected_kind: impl Into<String>) -> Self {
        DecodingError::ValueNotFound {
            path: format_path(path),
            expected_kind: expected_kind.into(),
        }
    }

    pub fn type_mismatch(
        path: &[PathElem],
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        DecodingError::TypeMismatch {
            path: format_path(path),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn data_corrupted(path: &[PathElem], reason: impl Into<String>) -> Self {
        DecodingError::DataCorrupted {
            path: format_path(path),
            reason: reason.into(),
        }
    }
}

/// Errors raised while tokenizing or matching a path template (§4.5, §4.6).
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// An empty segment appeared in the middle of, or at the end of, a template.
    #[error("empty segment in path template")]
    EmptySegment,

    /// Two variables adjoin each other within a single segment (`{a}{b}`).
    #[error("adjoining variables within a single segment")]
    AdjoiningVariables,

    /// A greedy variable (`{name+}`) appeared somewhere other than the last
    /// token of the last segment.
    #[error("greedy variable must be the final token of the final segment")]
    InvalidMultiSegmentTokens,

    /// A concrete path did not match the tokenized template.
    #[error("path does not match template: {0}")]
    PathDoesNotMatchTemplate(String),

    /// A variable referenced by the template had no corresponding encoded
    /// value when rendering a path.
    #[error("value not found for path variable {0}")]
    ValueNotFound(String),

    /// Propagated failure from the encoder/decoder walk invoked by the path
    /// codec's emitter/matcher.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Decoding(#[from] DecodingError),
}
