//! The path template tokenizer (component F, spec §4.5).
//!
//! Parses a template string like `/items/{firstly}/things/{secondly}/{thirdly+}`
//! into a [`Template`]: an ordered list of [`Segment`]s, each an ordered list
//! of [`Token`]s, plus a leading-slash flag. Grammar rules enforced here:
//!
//! - variables may not adjoin other variables within a segment;
//! - a greedy variable (`{name+}`) must be the last token of the last
//!   non-empty segment;
//! - an empty segment in the middle or at the end is rejected; a leading
//!   empty segment (from a leading `/`) is allowed and recorded in the flag;
//! - string-literal tokens are stored lowercased (matching is therefore
//!   case-insensitive for literals, case-sensitive for variable values).

use crate::error::PathError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Stored lowercased; literal matching is case-insensitive (spec §4.5).
    StringLit(String),
    Var { name: String, greedy: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub segments: Vec<Segment>,
    pub leading_slash: bool,
}

/// Tokenize a path template string (spec §4.5).
pub fn tokenize(template: &str) -> Result<Template, PathError> {
    let leading_slash = template.starts_with('/');
    let body = template.strip_prefix('/').unwrap_or(template);

    let raw_segments: Vec<&str> = body.split('/').collect();

    // An empty last raw segment (trailing slash) is an EmptySegment, same as
    // an empty raw segment in the middle. A single empty raw segment is only
    // valid when it's the *whole* body produced purely by the leading slash
    // case (template == "" or template == "/"), which `split` represents as
    // one empty string.
    if raw_segments.len() == 1 && raw_segments[0].is_empty() {
        return Ok(Template {
            segments: Vec::new(),
            leading_slash,
        });
    }

    let mut segments = Vec::with_capacity(raw_segments.len());
    for raw in &raw_segments {
        if raw.is_empty() {
            return Err(PathError::EmptySegment);
        }
        segments.push(tokenize_segment(raw)?);
    }

    validate_greedy_placement(&segments)?;

    Ok(Template {
        segments,
        leading_slash,
    })
}

fn tokenize_segment(raw: &str) -> Result<Segment, PathError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = raw.chars().collect();
    let mut i = 0;
    let mut last_was_var = false;

    while i < chars.len() {
        if chars[i] == '{' {
            if last_was_var {
                return Err(PathError::AdjoiningVariables);
            }
            let end = chars[i..]
                .iter()
                .position(|&c| c == '}')
                .map(|p| i + p)
                .ok_or(PathError::EmptySegment)?;
            let inner: String = chars[i + 1..end].iter().collect();
            let (name, greedy) = match inner.strip_suffix('+') {
                Some(stripped) => (stripped.to_string(), true),
                None => (inner, false),
            };
            tokens.push(Token::Var { name, greedy });
            last_was_var = true;
            i = end + 1;
        } else {
            let start = i;
            while i < chars.len() && chars[i] != '{' {
                i += 1;
            }
            let lit: String = chars[start..i].iter().collect::<String>().to_lowercase();
            tokens.push(Token::StringLit(lit));
            last_was_var = false;
        }
    }

    Ok(Segment { tokens })
}

/// A greedy variable must be the last token of the last segment (spec §4.5,
/// I4). A segment may hold at most one greedy variable by construction
/// (two adjoining variables are already rejected above; a greedy variable
/// followed by more tokens in the same segment is caught here too).
fn validate_greedy_placement(segments: &[Segment]) -> Result<(), PathError> {
    let last_segment_idx = segments.len().saturating_sub(1);
    for (seg_idx, segment) in segments.iter().enumerate() {
        let last_token_idx = segment.tokens.len().saturating_sub(1);
        for (tok_idx, token) in segment.tokens.iter().enumerate() {
            if let Token::Var { greedy: true, .. } = token {
                let is_last_token_of_segment = tok_idx == last_token_idx;
                let is_last_segment = seg_idx == last_segment_idx;
                if !is_last_token_of_segment || !is_last_segment {
                    return Err(PathError::InvalidMultiSegmentTokens);
                }
            }
        }
    }
    Ok(())
}
