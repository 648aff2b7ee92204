//! Optional SAM/BAM fields.
//!
//! Each selectable field maps to a fixed two-character code, a fixed value type and one
//! encode function. Fields that are named in the enumeration but have no encoding are
//! rejected while the selection is parsed, so a run never silently drops a requested tag.
use crate::error::{ConfigError, MatchError};
use crate::matches::AlignmentMatch;
use clap::ValueEnum;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::data::field::Value;
use std::str::FromStr;

pub const EDIT_DISTANCE: [u8; 2] = *b"NM";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamTag {
    /// (`ZS`)
    QueryStart,
    /// (`YS`)
    SubjectStart,
    /// (`ZE`)
    EValue,
    /// (`AS`)
    BitScore,
    /// (`ZR`)
    RawScore,
    /// (`ZI`)
    PercentIdentity,
    /// (`ZP`)
    PercentPositive,
    /// (`ZM`)
    Mismatches,
    /// (`ZF`)
    QueryFrame,
    /// (`YF`)
    SubjectFrame,
    SubjectAllIds,
    SubjectTaxIds,
    SubjectSciNames,
    SubjectTitle,
    SubjectAllTitles,
    QueryProteinSeq,
    QueryProteinCigar,
}

impl SamTag {
    pub const ALL: [SamTag; 17] = [
        SamTag::QueryStart,
        SamTag::SubjectStart,
        SamTag::EValue,
        SamTag::BitScore,
        SamTag::RawScore,
        SamTag::PercentIdentity,
        SamTag::PercentPositive,
        SamTag::Mismatches,
        SamTag::QueryFrame,
        SamTag::SubjectFrame,
        SamTag::SubjectAllIds,
        SamTag::SubjectTaxIds,
        SamTag::SubjectSciNames,
        SamTag::SubjectTitle,
        SamTag::SubjectAllTitles,
        SamTag::QueryProteinSeq,
        SamTag::QueryProteinCigar,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            SamTag::QueryStart => "qstart",
            SamTag::SubjectStart => "sstart",
            SamTag::EValue => "evalue",
            SamTag::BitScore => "bitscore",
            SamTag::RawScore => "score",
            SamTag::PercentIdentity => "pident",
            SamTag::PercentPositive => "ppos",
            SamTag::Mismatches => "mismatch",
            SamTag::QueryFrame => "qframe",
            SamTag::SubjectFrame => "sframe",
            SamTag::SubjectAllIds => "sallseqid",
            SamTag::SubjectTaxIds => "staxids",
            SamTag::SubjectSciNames => "sscinames",
            SamTag::SubjectTitle => "stitle",
            SamTag::SubjectAllTitles => "salltitles",
            SamTag::QueryProteinSeq => "qaaseq",
            SamTag::QueryProteinCigar => "qaacigar",
        }
    }

    /// The two-character code, or `None` for fields without an encoding.
    pub fn code(self) -> Option<[u8; 2]> {
        self.handler().map(|h| h.code)
    }

    pub fn is_supported(self) -> bool {
        self.handler().is_some()
    }

    fn handler(self) -> Option<TagHandler> {
        let (code, encode) = match self {
            SamTag::QueryStart => (*b"ZS", encode_query_start as EncodeFn),
            SamTag::SubjectStart => (*b"YS", encode_subject_start as EncodeFn),
            SamTag::EValue => (*b"ZE", encode_e_value as EncodeFn),
            SamTag::BitScore => (*b"AS", encode_bit_score as EncodeFn),
            SamTag::RawScore => (*b"ZR", encode_raw_score as EncodeFn),
            SamTag::PercentIdentity => (*b"ZI", encode_identity as EncodeFn),
            SamTag::PercentPositive => (*b"ZP", encode_positive as EncodeFn),
            SamTag::Mismatches => (*b"ZM", encode_mismatches as EncodeFn),
            SamTag::QueryFrame => (*b"ZF", encode_query_frame as EncodeFn),
            SamTag::SubjectFrame => (*b"YF", encode_subject_frame as EncodeFn),
            SamTag::SubjectAllIds
            | SamTag::SubjectTaxIds
            | SamTag::SubjectSciNames
            | SamTag::SubjectTitle
            | SamTag::SubjectAllTitles
            | SamTag::QueryProteinSeq
            | SamTag::QueryProteinCigar => return None,
        };
        Some(TagHandler { code, encode })
    }
}

impl FromStr for SamTag {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SamTag::ALL
            .into_iter()
            .find(|tag| {
                tag.keyword() == s || tag.code().is_some_and(|code| code == s.as_bytes())
            })
            .ok_or_else(|| ConfigError::UnknownField {
                kind: "SAM tag",
                name: s.to_string(),
            })
    }
}

/// A tag value with its declared width.
///
/// Every field is a fixed-width integer except `ZE`, which is carried as `Float` since an
/// e-value has no useful integer form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TagValue {
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Float(f32),
}

impl TagValue {
    /// BAM type character.
    pub fn type_code(&self) -> char {
        match self {
            TagValue::Int8(_) => 'c',
            TagValue::UInt8(_) => 'C',
            TagValue::Int16(_) => 's',
            TagValue::UInt16(_) => 'S',
            TagValue::Int32(_) => 'i',
            TagValue::UInt32(_) => 'I',
            TagValue::Float(_) => 'f',
        }
    }
}

impl From<TagValue> for Value {
    fn from(value: TagValue) -> Self {
        match value {
            TagValue::Int8(v) => Value::Int8(v),
            TagValue::UInt8(v) => Value::UInt8(v),
            TagValue::Int16(v) => Value::Int16(v),
            TagValue::UInt16(v) => Value::UInt16(v),
            TagValue::Int32(v) => Value::Int32(v),
            TagValue::UInt32(v) => Value::UInt32(v),
            TagValue::Float(v) => Value::Float(v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedTag {
    pub code: [u8; 2],
    pub value: TagValue,
}

impl EncodedTag {
    pub fn tag(&self) -> Tag {
        Tag::new(self.code[0], self.code[1])
    }
}

/// What to do with a value that does not fit its declared integer width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum NarrowIntPolicy {
    /// Clamp to the nearest representable value.
    #[default]
    Saturate,
    /// Drop the match with a diagnostic.
    Strict,
}

/// Inputs for tag encoding: the match plus its positions in output coordinates.
#[derive(Debug, Clone, Copy)]
pub struct TagSource<'a> {
    pub m: &'a AlignmentMatch,
    /// 1-based untranslated query start.
    pub query_start: u64,
    /// 1-based subject start.
    pub subject_start: u64,
}

type EncodeFn = fn(&TagSource<'_>, NarrowIntPolicy) -> Result<TagValue, MatchError>;

#[derive(Clone, Copy)]
struct TagHandler {
    code: [u8; 2],
    encode: EncodeFn,
}

fn narrow(
    code: &[u8; 2],
    width: &'static str,
    value: f64,
    min: f64,
    max: f64,
    policy: NarrowIntPolicy,
) -> Result<f64, MatchError> {
    let value = value.trunc();
    if value >= min && value <= max {
        return Ok(value);
    }
    match policy {
        NarrowIntPolicy::Saturate => Ok(value.clamp(min, max)),
        NarrowIntPolicy::Strict => Err(MatchError::TagOverflow {
            tag: String::from_utf8_lossy(code).into_owned(),
            width,
            value,
        }),
    }
}

fn to_u8(code: &[u8; 2], value: f64, policy: NarrowIntPolicy) -> Result<TagValue, MatchError> {
    let v = narrow(code, "uint8", value, 0.0, u8::MAX as f64, policy)?;
    Ok(TagValue::UInt8(v as u8))
}

fn to_u16(code: &[u8; 2], value: f64, policy: NarrowIntPolicy) -> Result<TagValue, MatchError> {
    let v = narrow(code, "uint16", value, 0.0, u16::MAX as f64, policy)?;
    Ok(TagValue::UInt16(v as u16))
}

fn to_u32(code: &[u8; 2], value: f64, policy: NarrowIntPolicy) -> Result<TagValue, MatchError> {
    let v = narrow(code, "uint32", value, 0.0, u32::MAX as f64, policy)?;
    Ok(TagValue::UInt32(v as u32))
}

fn encode_query_start(src: &TagSource<'_>, policy: NarrowIntPolicy) -> Result<TagValue, MatchError> {
    to_u32(b"ZS", src.query_start as f64, policy)
}

fn encode_subject_start(src: &TagSource<'_>, policy: NarrowIntPolicy) -> Result<TagValue, MatchError> {
    to_u32(b"YS", src.subject_start as f64, policy)
}

fn encode_e_value(src: &TagSource<'_>, _: NarrowIntPolicy) -> Result<TagValue, MatchError> {
    Ok(TagValue::Float(src.m.e_value as f32))
}

fn encode_bit_score(src: &TagSource<'_>, policy: NarrowIntPolicy) -> Result<TagValue, MatchError> {
    to_u16(b"AS", src.m.bit_score, policy)
}

fn encode_raw_score(src: &TagSource<'_>, policy: NarrowIntPolicy) -> Result<TagValue, MatchError> {
    to_u8(b"ZR", src.m.raw_score as f64, policy)
}

fn encode_identity(src: &TagSource<'_>, policy: NarrowIntPolicy) -> Result<TagValue, MatchError> {
    to_u8(b"ZI", src.m.stats.identity_percent(), policy)
}

fn encode_positive(src: &TagSource<'_>, policy: NarrowIntPolicy) -> Result<TagValue, MatchError> {
    to_u8(b"ZP", src.m.stats.positive_percent(), policy)
}

fn encode_mismatches(src: &TagSource<'_>, policy: NarrowIntPolicy) -> Result<TagValue, MatchError> {
    to_u16(b"ZM", src.m.stats.num_mismatches as f64, policy)
}

fn encode_query_frame(src: &TagSource<'_>, _: NarrowIntPolicy) -> Result<TagValue, MatchError> {
    Ok(TagValue::Int8(src.m.q_frame_shift))
}

fn encode_subject_frame(src: &TagSource<'_>, _: NarrowIntPolicy) -> Result<TagValue, MatchError> {
    Ok(TagValue::Int8(src.m.s_frame_shift))
}

/// Ordered, duplicate-free set of requested fields. Only encodable fields get in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSelection {
    tags: Vec<SamTag>,
}

impl TagSelection {
    /// Parse a whitespace- or comma-separated list of keywords or two-character codes.
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        let mut tags: Vec<SamTag> = Vec::new();
        let mut unsupported: Vec<String> = Vec::new();

        for token in list.split([' ', ',', '\t']).filter(|t| !t.is_empty()) {
            let tag: SamTag = token.parse()?;
            if !tag.is_supported() {
                if !unsupported.iter().any(|u| u == tag.keyword()) {
                    unsupported.push(tag.keyword().to_string());
                }
                continue;
            }
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        if !unsupported.is_empty() {
            return Err(ConfigError::UnsupportedField {
                kind: "SAM tag",
                names: unsupported,
            });
        }
        Ok(Self { tags })
    }

    pub fn tags(&self) -> &[SamTag] {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Encode the selected fields in selection order, then the edit distance, which is
    /// always present.
    pub fn encode(
        &self,
        src: &TagSource<'_>,
        policy: NarrowIntPolicy,
    ) -> Result<Vec<EncodedTag>, MatchError> {
        let mut out = Vec::with_capacity(self.tags.len() + 1);
        for tag in &self.tags {
            let Some(handler) = tag.handler() else {
                continue;
            };
            out.push(EncodedTag {
                code: handler.code,
                value: (handler.encode)(src, policy)?,
            });
        }
        out.push(EncodedTag {
            code: EDIT_DISTANCE,
            value: TagValue::UInt32(src.m.stats.edit_distance()),
        });
        Ok(out)
    }
}
