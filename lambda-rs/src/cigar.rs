use crate::coords::Clips;
use crate::error::MatchError;
use crate::matches::GAP;
use noodles::sam::alignment::record::cigar::{Op as SamCigarOp, op::Kind as CigarKind};
use noodles::sam::alignment::record_buf::Cigar as SamCigar;
use std::fmt;

/// The operations a match can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOp {
    /// M: match or mismatch
    Match,
    /// I: residues present in the query only
    Ins,
    /// D: residues present in the subject only
    Del,
    /// H: query residues outside the aligned region
    HardClip,
}

impl CigarOp {
    pub fn op_char(self) -> char {
        match self {
            CigarOp::Match => 'M',
            CigarOp::Ins => 'I',
            CigarOp::Del => 'D',
            CigarOp::HardClip => 'H',
        }
    }

    pub fn consumes_query(self) -> bool {
        !matches!(self, CigarOp::Del)
    }

    fn kind(self) -> CigarKind {
        match self {
            CigarOp::Match => CigarKind::Match,
            CigarOp::Ins => CigarKind::Insertion,
            CigarOp::Del => CigarKind::Deletion,
            CigarOp::HardClip => CigarKind::HardClip,
        }
    }
}

/// Run-length encoded operations, lengths already in output coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cigar {
    pub ops: Vec<(u32, CigarOp)>,
}

impl Cigar {
    pub fn add_operation(&mut self, len: u32, op: CigarOp) {
        if len == 0 {
            return;
        }
        if let Some((prev_len, prev_op)) = self.ops.last_mut()
            && *prev_op == op
        {
            *prev_len += len;
            return;
        }
        self.ops.push((len, op));
    }

    /// Sum of the lengths of query-consuming operations, hard clips included.
    pub fn query_length(&self) -> u64 {
        self.ops
            .iter()
            .filter(|(_, op)| op.consumes_query())
            .map(|(len, _)| *len as u64)
            .sum()
    }

    pub fn to_sam_cigar(&self) -> SamCigar {
        self.ops
            .iter()
            .map(|(len, op)| SamCigarOp::new(op.kind(), *len as usize))
            .collect()
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return f.write_str("*");
        }
        for (len, op) in &self.ops {
            write!(f, "{}{}", len, op.op_char())?;
        }
        Ok(())
    }
}

fn clip_len(len: u64) -> Result<u32, MatchError> {
    u32::try_from(len).map_err(|_| MatchError::ClipTooLong(len))
}

/// Walk the two gapped rows left to right and emit hard clips, deletions, insertions and
/// match runs. Each run is scaled by `scale` (3 for a translated query).
pub fn build_cigar(
    query_row: &[u8],
    subject_row: &[u8],
    clips: Clips,
    scale: u32,
) -> Result<Cigar, MatchError> {
    if query_row.len() != subject_row.len() {
        return Err(MatchError::RowLengthMismatch {
            query_row: query_row.len(),
            subject_row: subject_row.len(),
        });
    }

    let q_gap = |i: usize| query_row[i] == GAP;
    let s_gap = |i: usize| subject_row[i] == GAP;
    let n = query_row.len();

    let mut cigar = Cigar::default();
    cigar.add_operation(clip_len(clips.left)?, CigarOp::HardClip);

    let mut i = 0usize;
    while i < n {
        if q_gap(i) && s_gap(i) {
            return Err(MatchError::GapColumn { column: i });
        }

        // deletion from query
        let mut count = 0u32;
        while i < n && q_gap(i) && !s_gap(i) {
            count += 1;
            i += 1;
        }
        cigar.add_operation(count * scale, CigarOp::Del);

        // insertion into query
        count = 0;
        while i < n && s_gap(i) && !q_gap(i) {
            count += 1;
            i += 1;
        }
        cigar.add_operation(count * scale, CigarOp::Ins);

        // match or mismatch
        count = 0;
        while i < n && !q_gap(i) && !s_gap(i) {
            count += 1;
            i += 1;
        }
        cigar.add_operation(count * scale, CigarOp::Match);
    }

    cigar.add_operation(clip_len(clips.right)?, CigarOp::HardClip);
    Ok(cigar)
}
