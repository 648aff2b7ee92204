//! Per-match assembly of alignment records.
use crate::cigar::{Cigar, build_cigar};
use crate::config::OutputConfig;
use crate::coords::{blast_positions, untranslated_clip_positions};
use crate::error::MatchError;
use crate::fasta::{SeqDb, short_id};
use crate::matches::{AlignmentMatch, MatchGroup};
use crate::sequence::untranslate_sequence;
use crate::tags::{EncodedTag, TagSource};
use crate::types::{QueryIdx, SubjectIdx};
use noodles::core::Position;
use noodles::sam;
use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record_buf::{Data as SamData, Sequence};
use noodles::sam::alignment::record_buf::data::field::Value;

/// Everything the encoders read. Shared by reference across workers; nothing in it mutates.
#[derive(Debug, Clone, Copy)]
pub struct EncodeContext<'a> {
    pub config: &'a OutputConfig,
    pub queries: &'a SeqDb,
    pub subjects: &'a SeqDb,
}

impl EncodeContext<'_> {
    pub(crate) fn resolve(&self, m: &AlignmentMatch) -> Result<(QueryIdx, SubjectIdx), MatchError> {
        let q_idx = self
            .queries
            .lookup(&m.q_id)
            .ok_or_else(|| MatchError::UnknownQuery(m.q_id.clone()))?;
        let s_idx = self
            .subjects
            .lookup(&m.s_id)
            .ok_or_else(|| MatchError::UnknownSubject(m.s_id.clone()))?;
        Ok((q_idx, s_idx))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub q_name: String,
    pub is_reverse: bool,
    pub is_secondary: bool,
    pub reference_index: SubjectIdx,
    /// 1-based alignment start on the subject.
    pub position: Position,
    pub cigar: Cigar,
    pub sequence: Option<Vec<u8>>,
    pub tags: Vec<EncodedTag>,
}

impl OutputRecord {
    pub fn flags(&self) -> Flags {
        let mut flags = Flags::empty();
        if self.is_reverse {
            flags.insert(Flags::REVERSE_COMPLEMENTED);
        }
        if self.is_secondary {
            flags.insert(Flags::SECONDARY);
        }
        flags
    }

    pub fn to_record_buf(&self) -> sam::alignment::RecordBuf {
        let mut out = sam::alignment::RecordBuf::default();

        *out.name_mut() = Some(self.q_name.as_bytes().to_vec().into());
        *out.flags_mut() = self.flags();
        *out.reference_sequence_id_mut() = Some(self.reference_index);
        *out.alignment_start_mut() = Some(self.position);
        *out.cigar_mut() = self.cigar.to_sam_cigar();

        if let Some(seq) = &self.sequence {
            *out.sequence_mut() = Sequence::from(seq.clone());
        }

        let mut data = SamData::default();
        for tag in &self.tags {
            data.insert(tag.tag(), Value::from(tag.value));
        }
        *out.data_mut() = data;

        out
    }
}

fn emitted_sequence(
    m: &AlignmentMatch,
    ctx: &EncodeContext<'_>,
    q_idx: QueryIdx,
) -> Result<Option<Vec<u8>>, MatchError> {
    let program = ctx.config.program;
    if !ctx.config.emit_sequence || !program.query_is_nucleotide() {
        return Ok(None);
    }
    if program.query_is_translated() {
        let seq = untranslate_sequence(
            ctx.queries.sequence(q_idx),
            m.q_start,
            m.q_end,
            m.q_frame_shift,
        )?;
        Ok(Some(seq))
    } else {
        Ok(Some(m.aligned_query().to_ascii_uppercase()))
    }
}

/// Build one record. The record starts out secondary; group assembly picks the primary.
pub fn assemble_record(
    m: &AlignmentMatch,
    ctx: &EncodeContext<'_>,
) -> Result<OutputRecord, MatchError> {
    let program = ctx.config.program;
    let translated = program.query_is_translated();
    let (q_idx, s_idx) = ctx.resolve(m)?;
    let q_len = ctx.queries.length(q_idx);

    let clips = untranslated_clip_positions(m.q_start, m.q_end, m.q_frame_shift, q_len, translated)?;
    let cigar = build_cigar(&m.query_row, &m.subject_row, clips, program.query_scale())?;

    let subject_start = m
        .s_start
        .checked_add(1)
        .ok_or(MatchError::InvalidPosition(m.s_start))?;
    let position = usize::try_from(subject_start)
        .ok()
        .and_then(Position::new)
        .ok_or(MatchError::InvalidPosition(subject_start))?;

    let (query_start, _) = blast_positions(m.q_start, m.q_end, m.q_frame_shift, q_len, translated)?;
    let src = TagSource {
        m,
        query_start,
        subject_start,
    };
    let tags = ctx.config.tags.encode(&src, ctx.config.narrow_ints)?;

    Ok(OutputRecord {
        q_name: short_id(&m.q_id).to_string(),
        is_reverse: m.is_reverse(),
        is_secondary: true,
        reference_index: s_idx,
        position,
        cigar,
        sequence: emitted_sequence(m, ctx, q_idx)?,
        tags,
    })
}

/// Records of one group in input order, plus the matches that failed a precondition.
///
/// The first match that assembles successfully becomes the primary record.
pub fn assemble_group(
    group: &MatchGroup,
    ctx: &EncodeContext<'_>,
) -> (Vec<OutputRecord>, Vec<(usize, MatchError)>) {
    let mut records = Vec::with_capacity(group.matches.len());
    let mut skipped = Vec::new();

    for (i, m) in group.matches.iter().enumerate() {
        match assemble_record(m, ctx) {
            Ok(mut record) => {
                if records.is_empty() {
                    record.is_secondary = false;
                }
                records.push(record);
            }
            Err(e) => skipped.push((i, e)),
        }
    }

    (records, skipped)
}
