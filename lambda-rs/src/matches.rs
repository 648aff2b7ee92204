use anyhow::{Context, Result, anyhow, bail};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

pub const GAP: u8 = b'-';

const N_COLUMNS: usize = 19;

/// Alignment statistics computed upstream; the encoder only reads them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignStats {
    pub alignment_length: u32,
    pub num_matches: u32,
    pub num_positive: u32,
    pub num_mismatches: u32,
    pub num_gap_opens: u32,
    pub num_gaps: u32,
}

impl AlignStats {
    pub fn identity_percent(&self) -> f64 {
        percent(self.num_matches, self.alignment_length)
    }

    pub fn positive_percent(&self) -> f64 {
        percent(self.num_positive, self.alignment_length)
    }

    /// Columns that are not identities. Saturates at zero on inconsistent counts.
    pub fn edit_distance(&self) -> u32 {
        self.alignment_length.saturating_sub(self.num_matches)
    }
}

fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// One gapped pairwise local alignment.
///
/// Positions are 0-based, half-open and live in the coordinate space the match was
/// computed in (codon space for a translated query).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentMatch {
    pub q_id: String,
    pub s_id: String,
    pub q_start: u64,
    pub q_end: u64,
    pub s_start: u64,
    pub s_end: u64,
    pub q_frame_shift: i8,
    pub s_frame_shift: i8,
    pub e_value: f64,
    pub bit_score: f64,
    pub raw_score: i32,
    pub stats: AlignStats,
    /// Query row, `-` marks a gap.
    pub query_row: Vec<u8>,
    /// Subject row, `-` marks a gap.
    pub subject_row: Vec<u8>,
}

impl AlignmentMatch {
    pub fn is_reverse(&self) -> bool {
        self.q_frame_shift < 0
    }

    /// Query residues covered by the alignment, gaps removed.
    pub fn aligned_query(&self) -> Vec<u8> {
        self.query_row.iter().copied().filter(|&b| b != GAP).collect()
    }

    /// Parse one tab-separated line of the match table.
    pub fn parse_line(line: &str) -> Result<Self> {
        let cols: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        if cols.len() != N_COLUMNS {
            bail!("expected {N_COLUMNS} columns, found {}", cols.len());
        }

        Ok(Self {
            q_id: cols[0].to_string(),
            s_id: cols[1].to_string(),
            q_start: field(&cols, 2, "qstart")?,
            q_end: field(&cols, 3, "qend")?,
            s_start: field(&cols, 4, "sstart")?,
            s_end: field(&cols, 5, "send")?,
            q_frame_shift: field(&cols, 6, "qframe")?,
            s_frame_shift: field(&cols, 7, "sframe")?,
            e_value: field(&cols, 8, "evalue")?,
            bit_score: field(&cols, 9, "bitscore")?,
            raw_score: field(&cols, 10, "score")?,
            stats: AlignStats {
                alignment_length: field(&cols, 11, "length")?,
                num_matches: field(&cols, 12, "nident")?,
                num_positive: field(&cols, 13, "positive")?,
                num_mismatches: field(&cols, 14, "mismatch")?,
                num_gap_opens: field(&cols, 15, "gapopen")?,
                num_gaps: field(&cols, 16, "gaps")?,
            },
            query_row: cols[17].as_bytes().to_vec(),
            subject_row: cols[18].as_bytes().to_vec(),
        })
    }
}

fn field<T: FromStr>(cols: &[&str], idx: usize, name: &str) -> Result<T> {
    cols[idx]
        .trim()
        .parse()
        .map_err(|_| anyhow!("invalid {name} value '{}'", cols[idx]))
}

/// All matches for one query, in emission order. The first one is the primary candidate.
#[derive(Debug, Clone, Default)]
pub struct MatchGroup {
    pub q_id: String,
    pub matches: Vec<AlignmentMatch>,
}

/// Streams the match table and yields groups of consecutive lines sharing a query id.
pub struct MatchReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
    pending: Option<AlignmentMatch>,
}

impl MatchReader<BufReader<File>> {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open match table {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> MatchReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            pending: None,
        }
    }

    fn next_match(&mut self) -> Result<Option<AlignmentMatch>> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = line?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let m = AlignmentMatch::parse_line(&line)
                .with_context(|| format!("match table line {}", self.line_no))?;
            return Ok(Some(m));
        }
        Ok(None)
    }

    pub fn next_group(&mut self) -> Result<Option<MatchGroup>> {
        let first = match self.pending.take() {
            Some(m) => m,
            None => match self.next_match()? {
                Some(m) => m,
                None => return Ok(None),
            },
        };

        let mut group = MatchGroup {
            q_id: first.q_id.clone(),
            matches: vec![first],
        };

        while let Some(m) = self.next_match()? {
            if m.q_id == group.q_id {
                group.matches.push(m);
            } else {
                self.pending = Some(m);
                break;
            }
        }

        Ok(Some(group))
    }
}

impl<R: BufRead> Iterator for MatchReader<R> {
    type Item = Result<MatchGroup>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_group().transpose()
    }
}
