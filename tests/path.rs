//! Path template tokenizer/matcher/emitter integration tests (spec
//! §4.5–§4.6, §8 "Template well-formedness").

use proptest::prelude::*;
use shapecodec::{
    render_path, tokenize, DecodeCtx, DecodingError, EncodeStrategy, EncodeValue, FromShape,
    KeyEncodeStrategy, KeyEncodeTransform, MapLayout, PathCodec, PathElem, PathError, Shape,
    Token, ToEncodeValue,
};

#[derive(Debug, Clone, PartialEq)]
struct Triple {
    firstly: String,
    secondly: String,
    thirdly: String,
}

impl ToEncodeValue for Triple {
    fn to_encode_value(&self) -> EncodeValue {
        EncodeValue::record([
            ("firstly".to_string(), self.firstly.to_encode_value()),
            ("secondly".to_string(), self.secondly.to_encode_value()),
            ("thirdly".to_string(), self.thirdly.to_encode_value()),
        ])
    }
}

impl FromShape for Triple {
    fn from_shape(node: Option<&Shape>, ctx: &DecodeCtx) -> Result<Self, DecodingError> {
        let dict = node.and_then(|n| n.as_dict());
        let field = |name: &str| dict.and_then(|d| d.get(name).cloned());
        Ok(Triple {
            firstly: String::from_shape(
                field("firstly").as_ref(),
                &ctx.push(PathElem::Field("firstly".into())),
            )?,
            secondly: String::from_shape(
                field("secondly").as_ref(),
                &ctx.push(PathElem::Field("secondly".into())),
            )?,
            thirdly: String::from_shape(
                field("thirdly").as_ref(),
                &ctx.push(PathElem::Field("thirdly".into())),
            )?,
        })
    }
}

#[test]
fn greedy_variable_template_round_trips() {
    let template = tokenize("items{firstly}/things/{secondly}/{thirdly+}").unwrap();
    let value = Triple {
        firstly: "value1".to_string(),
        secondly: "value2".to_string(),
        thirdly: "value3/value4".to_string(),
    };
    let codec = PathCodec::new();
    let rendered = codec.encode(&value, &template).unwrap();
    assert_eq!(rendered, "itemsvalue1/things/value2/value3/value4");
    let decoded: Triple = codec.decode(&rendered, &template).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn missing_variable_at_render_time_is_value_not_found() {
    let template = tokenize("/things/{secondly}").unwrap();
    let strategy = EncodeStrategy {
        key_strategy: KeyEncodeStrategy::AsSeparator('.'),
        key_transform: KeyEncodeTransform::None,
        map_layout: MapLayout::SingleEntry,
    };
    let empty = EncodeValue::record([]);
    let err = render_path(&template, &empty, &strategy).unwrap_err();
    assert!(matches!(err, PathError::ValueNotFound(_)));
}

#[test]
fn custom_key_separator_is_honoured_when_decoding_dotted_field() {
    let template = tokenize("/items/{pair}").unwrap();
    let codec = PathCodec::builder().key_separator('-').build();

    #[derive(Debug, PartialEq)]
    struct Pair {
        pair: String,
    }
    impl FromShape for Pair {
        fn from_shape(node: Option<&Shape>, ctx: &DecodeCtx) -> Result<Self, DecodingError> {
            let dict = node.and_then(|n| n.as_dict());
            Ok(Pair {
                pair: String::from_shape(
                    dict.and_then(|d| d.get("pair").cloned()).as_ref(),
                    &ctx.push(PathElem::Field("pair".into())),
                )?,
            })
        }
    }

    let decoded: Pair = codec.decode("/items/a.b", &template).unwrap();
    assert_eq!(decoded.pair, "a.b");
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn segment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        name_strategy(),
        name_strategy().prop_map(|n| format!("{{{n}}}")),
        (name_strategy(), name_strategy()).prop_map(|(lit, var)| format!("{lit}{{{var}}}")),
    ]
}

proptest! {
    /// Templates built only from well-formed segments (no empty segments, no
    /// adjoining variables, no mid-template greedy vars) always tokenize
    /// successfully (spec §8 "Template well-formedness").
    #[test]
    fn well_formed_templates_always_tokenize(segments in prop::collection::vec(segment_strategy(), 1..6)) {
        let template = format!("/{}", segments.join("/"));
        let result = tokenize(&template);
        prop_assert!(result.is_ok(), "expected {:?} to tokenize, got {:?}", template, result);
    }

    /// A template with a doubled slash (an empty segment in the middle) is
    /// always rejected as `EmptySegment`.
    #[test]
    fn double_slash_is_always_rejected(segments in prop::collection::vec(name_strategy(), 2..5)) {
        let template = format!("/{}//{}", segments[0], segments[1..].join("/"));
        let err = tokenize(&template).unwrap_err();
        prop_assert!(matches!(err, PathError::EmptySegment));
    }

    /// A greedy variable followed by more literal text in the same segment
    /// is always rejected.
    #[test]
    fn greedy_followed_by_literal_is_always_rejected(var in name_strategy(), lit in name_strategy()) {
        let template = format!("/{{{var}+}}{lit}");
        let err = tokenize(&template).unwrap_err();
        prop_assert!(matches!(err, PathError::InvalidMultiSegmentTokens));
    }
}

#[test]
fn tokenizer_lowercases_literals_but_not_variable_names() {
    let t = tokenize("/Items/{Id}").unwrap();
    assert_eq!(t.segments[0].tokens[0], Token::StringLit("items".into()));
    match &t.segments[1].tokens[0] {
        Token::Var { name, .. } => assert_eq!(name, "Id"),
        other => panic!("expected Var, got {other:?}"),
    }
}
