use lambda_rs::matches::{AlignStats, AlignmentMatch};
use lambda_rs::tags::{EDIT_DISTANCE, EncodedTag, TagSource};
use lambda_rs::{ConfigError, MatchError, NarrowIntPolicy, SamTag, TagSelection, TagValue};

fn sample_match() -> AlignmentMatch {
    AlignmentMatch {
        q_id: "read1".into(),
        s_id: "chr1".into(),
        q_start: 0,
        q_end: 20,
        s_start: 100,
        s_end: 120,
        q_frame_shift: -2,
        s_frame_shift: 1,
        e_value: 1.5e-7,
        bit_score: 48.3,
        raw_score: 40,
        stats: AlignStats {
            alignment_length: 20,
            num_matches: 18,
            num_positive: 19,
            num_mismatches: 2,
            num_gap_opens: 0,
            num_gaps: 0,
        },
        query_row: vec![b'A'; 20],
        subject_row: vec![b'A'; 20],
    }
}

fn encode(list: &str, m: &AlignmentMatch, policy: NarrowIntPolicy) -> Result<Vec<EncodedTag>, MatchError> {
    let selection = TagSelection::parse(list).unwrap();
    let src = TagSource {
        m,
        query_start: 1,
        subject_start: m.s_start + 1,
    };
    selection.encode(&src, policy)
}

fn value_of(tags: &[EncodedTag], code: &[u8; 2]) -> Option<TagValue> {
    tags.iter().find(|t| &t.code == code).map(|t| t.value)
}

#[test]
fn edit_distance_always_present() {
    let m = sample_match();
    let tags = encode("", &m, NarrowIntPolicy::Saturate).unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].code, EDIT_DISTANCE);
    assert_eq!(tags[0].value, TagValue::UInt32(2));
    assert_eq!(tags[0].value.type_code(), 'I');
}

#[test]
fn selection_order_then_edit_distance() {
    let m = sample_match();
    let tags = encode("ZI AS,qframe", &m, NarrowIntPolicy::Saturate).unwrap();
    let codes: Vec<[u8; 2]> = tags.iter().map(|t| t.code).collect();
    assert_eq!(codes, vec![*b"ZI", *b"AS", *b"ZF", *b"NM"]);
}

#[test]
fn declared_widths() {
    let m = sample_match();
    let tags = encode(
        "qstart sstart evalue bitscore score pident ppos mismatch qframe sframe",
        &m,
        NarrowIntPolicy::Saturate,
    )
    .unwrap();
    assert_eq!(value_of(&tags, b"ZS"), Some(TagValue::UInt32(1)));
    assert_eq!(value_of(&tags, b"YS"), Some(TagValue::UInt32(101)));
    assert_eq!(value_of(&tags, b"ZE"), Some(TagValue::Float(1.5e-7)));
    assert_eq!(value_of(&tags, b"AS"), Some(TagValue::UInt16(48)));
    assert_eq!(value_of(&tags, b"ZR"), Some(TagValue::UInt8(40)));
    assert_eq!(value_of(&tags, b"ZI"), Some(TagValue::UInt8(90)));
    assert_eq!(value_of(&tags, b"ZP"), Some(TagValue::UInt8(95)));
    assert_eq!(value_of(&tags, b"ZM"), Some(TagValue::UInt16(2)));
    assert_eq!(value_of(&tags, b"ZF"), Some(TagValue::Int8(-2)));
    assert_eq!(value_of(&tags, b"YF"), Some(TagValue::Int8(1)));
    assert_eq!(value_of(&tags, b"NM"), Some(TagValue::UInt32(2)));
}

#[test]
fn percentages_truncate() {
    let mut m = sample_match();
    // 18/19 = 94.74%, 19/19 = 100%
    m.stats.alignment_length = 19;
    let tags = encode("pident ppos", &m, NarrowIntPolicy::Strict).unwrap();
    assert_eq!(value_of(&tags, b"ZI"), Some(TagValue::UInt8(94)));
    assert_eq!(value_of(&tags, b"ZP"), Some(TagValue::UInt8(100)));

    // 17/19 = 89.47%
    m.stats.num_matches = 17;
    let tags = encode("pident", &m, NarrowIntPolicy::Saturate).unwrap();
    assert_eq!(value_of(&tags, b"ZI"), Some(TagValue::UInt8(89)));
}

#[test]
fn duplicates_keep_first_position() {
    let selection = TagSelection::parse("AS ZI bitscore AS").unwrap();
    assert_eq!(selection.tags(), &[SamTag::BitScore, SamTag::PercentIdentity]);
}

#[test]
fn overflow_saturates_by_default() {
    let mut m = sample_match();
    m.raw_score = 300;
    m.bit_score = 70_000.0;
    let tags = encode("ZR AS", &m, NarrowIntPolicy::Saturate).unwrap();
    assert_eq!(value_of(&tags, b"ZR"), Some(TagValue::UInt8(u8::MAX)));
    assert_eq!(value_of(&tags, b"AS"), Some(TagValue::UInt16(u16::MAX)));

    m.raw_score = -5;
    let tags = encode("ZR", &m, NarrowIntPolicy::Saturate).unwrap();
    assert_eq!(value_of(&tags, b"ZR"), Some(TagValue::UInt8(0)));
}

#[test]
fn overflow_is_an_error_under_strict_policy() {
    let mut m = sample_match();
    m.raw_score = 300;
    let err = encode("score", &m, NarrowIntPolicy::Strict).unwrap_err();
    assert_eq!(
        err,
        MatchError::TagOverflow {
            tag: "ZR".into(),
            width: "uint8",
            value: 300.0
        }
    );
}

#[test]
fn unsupported_fields_rejected_together() {
    let err = TagSelection::parse("AS stitle qaaseq stitle").unwrap_err();
    assert_eq!(
        err,
        ConfigError::UnsupportedField {
            kind: "SAM tag",
            names: vec!["stitle".into(), "qaaseq".into()]
        }
    );
}

#[test]
fn unknown_field_rejected() {
    let err = TagSelection::parse("XX").unwrap_err();
    assert!(matches!(err, ConfigError::UnknownField { .. }));
}

#[test]
fn every_supported_tag_has_a_code() {
    for tag in SamTag::ALL {
        assert_eq!(tag.is_supported(), tag.code().is_some(), "{tag:?}");
    }
}
