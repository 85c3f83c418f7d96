//! Percent-encoding helpers for the surface codecs (spec §4.7).
//!
//! Encoding is opt-in: a caller-supplied allowed character set determines
//! which non-alphanumeric bytes pass through unescaped; with no set
//! supplied, values are emitted raw (spec §4.2 "Percent-encoding").
//! Decoding always runs, since wire input is always percent-decoded
//! before it reaches the parser (spec §4.3 step 6).

use percent_encoding::percent_decode_str;

use crate::error::DecodingError;

/// Percent-encode `input`, letting ASCII alphanumerics and any byte in
/// `allowed` through unescaped. `allowed` of `None` disables encoding
/// entirely: the value is emitted verbatim.
pub fn encode(input: &str, allowed: Option<&str>) -> String {
    let allowed = match allowed {
        Some(a) => a,
        None => return input.to_string(),
    };
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || allowed.as_bytes().contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Percent-decode `input` (spec §4.3 step 6); a non-UTF-8 result after
/// decoding is `DataCorrupted`.
pub fn decode(input: &str) -> Result<String, DecodingError> {
    percent_decode_str(input)
        .decode_utf8()
        .map(|cow| cow.into_owned())
        .map_err(|e| DecodingError::data_corrupted(&[], format!("invalid percent-encoding: {e}")))
}

/// The Headers codec's default allowed character set (spec §4.7):
/// `&' ()-._A-Za-z0-9`. Alphanumerics are always allowed by [`encode`], so
/// only the extra punctuation needs listing here.
pub const HEADERS_DEFAULT_ALLOWED: &str = "&' ()-._";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_allowed_set_is_raw() {
        assert_eq!(encode("id1=", None), "id1=");
    }

    #[test]
    fn disallowed_byte_is_percent_encoded() {
        assert_eq!(encode("id1=", Some("")), "id1%3D");
    }

    #[test]
    fn allowed_punctuation_passes_through() {
        assert_eq!(
            encode("a&b'c d(e)f-g.h_i", Some(HEADERS_DEFAULT_ALLOWED)),
            "a&b'c d(e)f-g.h_i"
        );
    }

    #[test]
    fn decode_round_trips_percent_sequences() {
        assert_eq!(decode("id1%3D").unwrap(), "id1=");
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        assert!(decode("%FF%FE").is_err());
    }
}
