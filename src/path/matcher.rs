//! The path matcher and emitter (component G, spec §4.6).
//!
//! The matcher consumes a concrete URL path and a tokenized [`Template`],
//! producing `(variable_name, value)` bindings that feed the parser (D) as
//! its decode key space. The emitter runs the encoder walk (C) over a
//! value with a flat default key strategy, then substitutes each `{name}`
//! token in the template with the value stored under that name.

use std::collections::HashMap;

use crate::encode::encode_walk;
use crate::error::PathError;
use crate::path::token::{Template, Token};
use crate::strategy::EncodeStrategy;
use crate::value::ToEncodeValue;

/// Match a concrete path against a tokenized template, producing variable
/// bindings (spec §4.6).
pub fn match_path(path: &str, template: &Template) -> Result<Vec<(String, Option<String>)>, PathError> {
    let path_body = if template.leading_slash {
        path.strip_prefix('/').ok_or_else(|| {
            PathError::PathDoesNotMatchTemplate("template requires a leading slash".to_string())
        })?
    } else {
        path
    };

    let path_segments: Vec<&str> = if path_body.is_empty() {
        Vec::new()
    } else {
        path_body.split('/').collect()
    };

    let mut bindings = Vec::new();
    let mut path_idx = 0;
    let last_template_idx = template.segments.len().saturating_sub(1);

    for (seg_idx, segment) in template.segments.iter().enumerate() {
        if path_idx >= path_segments.len() {
            return Err(PathError::PathDoesNotMatchTemplate(
                "too few path segments".to_string(),
            ));
        }

        let has_greedy = segment
            .tokens
            .iter()
            .any(|t| matches!(t, Token::Var { greedy: true, .. }));

        if has_greedy {
            debug_assert_eq!(seg_idx, last_template_idx, "greedy var must be in the last segment");
            let joined = path_segments[path_idx..].join("/");
            match_tokens(&segment.tokens, &joined, &mut bindings)?;
            path_idx = path_segments.len();
        } else {
            let text = path_segments[path_idx];
            match_tokens(&segment.tokens, text, &mut bindings)?;
            path_idx += 1;
        }
    }

    if path_idx < path_segments.len() {
        return Err(PathError::PathDoesNotMatchTemplate(
            "too many path segments".to_string(),
        ));
    }

    Ok(bindings)
}

/// Match one segment's tokens against `text` (which, for a segment holding
/// the greedy variable, is the `/`-joined remainder of the whole path).
fn match_tokens(
    tokens: &[Token],
    text: &str,
    bindings: &mut Vec<(String, Option<String>)>,
) -> Result<(), PathError> {
    let mut cursor = 0usize;
    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i] {
            Token::StringLit(lit) => {
                let remaining = &text[cursor..];
                // Literal matching is case-insensitive; `lit` is already
                // lowercased by the tokenizer.
                if remaining.len() < lit.len() || !remaining[..lit.len()].to_lowercase().eq(lit) {
                    return Err(PathError::PathDoesNotMatchTemplate(format!(
                        "expected literal '{lit}'"
                    )));
                }
                cursor += lit.len();
                i += 1;
            }
            Token::Var { name, greedy } => {
                if *greedy {
                    let value = &text[cursor..];
                    bindings.push((name.clone(), Some(value.to_string())));
                    cursor = text.len();
                    i += 1;
                } else if let Some(Token::StringLit(next_lit)) = tokens.get(i + 1) {
                    let remaining = &text[cursor..];
                    let pos = remaining.to_lowercase().find(next_lit.as_str()).ok_or_else(|| {
                        PathError::PathDoesNotMatchTemplate(format!(
                            "literal '{next_lit}' not found for variable {{{name}}}"
                        ))
                    })?;
                    let value = &remaining[..pos];
                    bindings.push((name.clone(), Some(value.to_string())));
                    cursor += pos;
                    i += 1;
                } else {
                    // Non-greedy variable at end of segment: consumes the remainder.
                    let value = &text[cursor..];
                    bindings.push((name.clone(), Some(value.to_string())));
                    cursor = text.len();
                    i += 1;
                }
            }
        }
    }
    if cursor != text.len() {
        return Err(PathError::PathDoesNotMatchTemplate(
            "trailing unmatched text in segment".to_string(),
        ));
    }
    Ok(())
}

/// Render a path by running the encoder walk over `value` with `strategy`
/// and substituting each `{name}` token with the value stored under `name`
/// in the resulting flat map (spec §4.6).
pub fn render_path<T: ToEncodeValue>(
    template: &Template,
    value: &T,
    strategy: &EncodeStrategy,
) -> Result<String, PathError> {
    let pairs = encode_walk(&value.to_encode_value(), strategy)?;
    let lookup: HashMap<String, Option<String>> = pairs.into_iter().collect();

    let mut rendered_segments = Vec::with_capacity(template.segments.len());
    for segment in &template.segments {
        let mut text = String::new();
        for token in &segment.tokens {
            match token {
                Token::StringLit(lit) => text.push_str(lit),
                Token::Var { name, .. } => match lookup.get(name) {
                    Some(Some(s)) => text.push_str(s),
                    Some(None) | None => return Err(PathError::ValueNotFound(name.clone())),
                },
            }
        }
        rendered_segments.push(text);
    }

    let joined = rendered_segments.join("/");
    Ok(if template.leading_slash {
        format!("/{joined}")
    } else {
        joined
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::token::tokenize;
    use crate::strategy::{KeyEncodeStrategy, KeyEncodeTransform, MapLayout};
    use crate::value::EncodeValue;

    #[test]
    fn matches_literal_and_variable_segments() {
        let template = tokenize("/things/{secondly}/{thirdly+}").unwrap();
        let bindings = match_path("/things/value2/value3/value4", &template).unwrap();
        assert_eq!(
            bindings,
            vec![
                ("secondly".to_string(), Some("value2".to_string())),
                ("thirdly".to_string(), Some("value3/value4".to_string())),
            ]
        );
    }

    #[test]
    fn mixed_literal_prefix_and_variable() {
        let template = tokenize("items{firstly}/things/{secondly}").unwrap();
        let bindings = match_path("itemsvalue1/things/value2", &template).unwrap();
        assert_eq!(
            bindings,
            vec![
                ("firstly".to_string(), Some("value1".to_string())),
                ("secondly".to_string(), Some("value2".to_string())),
            ]
        );
    }

    #[test]
    fn literal_mismatch_is_rejected() {
        let template = tokenize("/things/{secondly}").unwrap();
        let err = match_path("/stuff/value2", &template).unwrap_err();
        assert!(matches!(err, PathError::PathDoesNotMatchTemplate(_)));
    }

    #[test]
    fn too_few_segments_is_rejected() {
        let template = tokenize("/a/{b}/c").unwrap();
        let err = match_path("/a/x", &template).unwrap_err();
        assert!(matches!(err, PathError::PathDoesNotMatchTemplate(_)));
    }

    #[test]
    fn too_many_segments_is_rejected() {
        let template = tokenize("/a/{b}").unwrap();
        let err = match_path("/a/x/y", &template).unwrap_err();
        assert!(matches!(err, PathError::PathDoesNotMatchTemplate(_)));
    }

    #[test]
    fn literal_match_is_case_insensitive() {
        let template = tokenize("/Things/{id}").unwrap();
        let bindings = match_path("/THINGS/abc", &template).unwrap();
        assert_eq!(bindings, vec![("id".to_string(), Some("abc".to_string()))]);
    }

    #[test]
    fn render_path_substitutes_variables() {
        let template = tokenize("items{firstly}/things/{secondly}/{thirdly+}").unwrap();
        let strategy = EncodeStrategy {
            key_strategy: KeyEncodeStrategy::AsSeparator('.'),
            key_transform: KeyEncodeTransform::None,
            map_layout: MapLayout::SingleEntry,
        };
        let value = EncodeValue::record([
            ("firstly".to_string(), EncodeValue::Scalar(crate::value::Scalar::Str("value1".into()))),
            ("secondly".to_string(), EncodeValue::Scalar(crate::value::Scalar::Str("value2".into()))),
            ("thirdly".to_string(), EncodeValue::Scalar(crate::value::Scalar::Str("value3/value4".into()))),
        ]);
        let rendered = render_path(&template, &value, &strategy).unwrap();
        assert_eq!(rendered, "itemsvalue1/things/value2/value3/value4");
    }
}
