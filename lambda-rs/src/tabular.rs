//! BLAST-style tabular rows.
use crate::coords::blast_positions;
use crate::error::{ConfigError, MatchError};
use crate::fasta::short_id;
use crate::matches::AlignmentMatch;
use crate::record::EncodeContext;
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    QuerySeqId,
    QueryGi,
    QueryAcc,
    QueryAccVer,
    QueryLength,
    SubjectSeqId,
    SubjectAllSeqIds,
    SubjectGi,
    SubjectAllGis,
    SubjectAcc,
    SubjectAccVer,
    SubjectAllAccs,
    SubjectLength,
    QueryStart,
    QueryEnd,
    SubjectStart,
    SubjectEnd,
    QuerySeq,
    SubjectSeq,
    EValue,
    BitScore,
    RawScore,
    AlignmentLength,
    PercentIdentity,
    Identities,
    Mismatches,
    Positives,
    GapOpens,
    Gaps,
    PercentPositive,
    Frames,
    QueryFrame,
    SubjectFrame,
    Btop,
    SubjectTaxIds,
    SubjectSciNames,
    SubjectComNames,
    SubjectBlastNames,
    SubjectKingdoms,
    SubjectTitle,
    SubjectAllTitles,
    SubjectStrand,
    QueryCoverage,
    QueryCoverageHsp,
}

/// Expansion of the `std` keyword.
pub const STD_COLUMNS: [Column; 12] = [
    Column::QuerySeqId,
    Column::SubjectSeqId,
    Column::PercentIdentity,
    Column::AlignmentLength,
    Column::Mismatches,
    Column::GapOpens,
    Column::QueryStart,
    Column::QueryEnd,
    Column::SubjectStart,
    Column::SubjectEnd,
    Column::EValue,
    Column::BitScore,
];

impl Column {
    pub const ALL: [Column; 44] = [
        Column::QuerySeqId,
        Column::QueryGi,
        Column::QueryAcc,
        Column::QueryAccVer,
        Column::QueryLength,
        Column::SubjectSeqId,
        Column::SubjectAllSeqIds,
        Column::SubjectGi,
        Column::SubjectAllGis,
        Column::SubjectAcc,
        Column::SubjectAccVer,
        Column::SubjectAllAccs,
        Column::SubjectLength,
        Column::QueryStart,
        Column::QueryEnd,
        Column::SubjectStart,
        Column::SubjectEnd,
        Column::QuerySeq,
        Column::SubjectSeq,
        Column::EValue,
        Column::BitScore,
        Column::RawScore,
        Column::AlignmentLength,
        Column::PercentIdentity,
        Column::Identities,
        Column::Mismatches,
        Column::Positives,
        Column::GapOpens,
        Column::Gaps,
        Column::PercentPositive,
        Column::Frames,
        Column::QueryFrame,
        Column::SubjectFrame,
        Column::Btop,
        Column::SubjectTaxIds,
        Column::SubjectSciNames,
        Column::SubjectComNames,
        Column::SubjectBlastNames,
        Column::SubjectKingdoms,
        Column::SubjectTitle,
        Column::SubjectAllTitles,
        Column::SubjectStrand,
        Column::QueryCoverage,
        Column::QueryCoverageHsp,
    ];

    pub fn keyword(self) -> &'static str {
        self.names().0
    }

    /// Label used on the `# Fields:` comment line.
    pub fn label(self) -> &'static str {
        self.names().1
    }

    fn names(self) -> (&'static str, &'static str) {
        match self {
            Column::QuerySeqId => ("qseqid", "query id"),
            Column::QueryGi => ("qgi", "query gi"),
            Column::QueryAcc => ("qacc", "query acc."),
            Column::QueryAccVer => ("qaccver", "query acc.ver"),
            Column::QueryLength => ("qlen", "query length"),
            Column::SubjectSeqId => ("sseqid", "subject id"),
            Column::SubjectAllSeqIds => ("sallseqid", "subject ids"),
            Column::SubjectGi => ("sgi", "subject gi"),
            Column::SubjectAllGis => ("sallgi", "subject gis"),
            Column::SubjectAcc => ("sacc", "subject acc."),
            Column::SubjectAccVer => ("saccver", "subject acc.ver"),
            Column::SubjectAllAccs => ("sallacc", "subject accs."),
            Column::SubjectLength => ("slen", "subject length"),
            Column::QueryStart => ("qstart", "q. start"),
            Column::QueryEnd => ("qend", "q. end"),
            Column::SubjectStart => ("sstart", "s. start"),
            Column::SubjectEnd => ("send", "s. end"),
            Column::QuerySeq => ("qseq", "query seq"),
            Column::SubjectSeq => ("sseq", "subject seq"),
            Column::EValue => ("evalue", "evalue"),
            Column::BitScore => ("bitscore", "bit score"),
            Column::RawScore => ("score", "score"),
            Column::AlignmentLength => ("length", "alignment length"),
            Column::PercentIdentity => ("pident", "% identity"),
            Column::Identities => ("nident", "identical"),
            Column::Mismatches => ("mismatch", "mismatches"),
            Column::Positives => ("positive", "positives"),
            Column::GapOpens => ("gapopen", "gap opens"),
            Column::Gaps => ("gaps", "gaps"),
            Column::PercentPositive => ("ppos", "% positives"),
            Column::Frames => ("frames", "query/sbjct frames"),
            Column::QueryFrame => ("qframe", "query frame"),
            Column::SubjectFrame => ("sframe", "sbjct frame"),
            Column::Btop => ("btop", "BTOP"),
            Column::SubjectTaxIds => ("staxids", "subject tax ids"),
            Column::SubjectSciNames => ("sscinames", "subject sci names"),
            Column::SubjectComNames => ("scomnames", "subject com names"),
            Column::SubjectBlastNames => ("sblastnames", "subject blast names"),
            Column::SubjectKingdoms => ("sskingdoms", "subject super kingdoms"),
            Column::SubjectTitle => ("stitle", "subject title"),
            Column::SubjectAllTitles => ("salltitles", "subject titles"),
            Column::SubjectStrand => ("sstrand", "subject strand"),
            Column::QueryCoverage => ("qcovs", "% query coverage per subject"),
            Column::QueryCoverageHsp => ("qcovhsp", "% query coverage per hsp"),
        }
    }

    /// Whether a value can be produced from a match and the two sequence databases.
    pub fn is_supported(self) -> bool {
        !matches!(
            self,
            Column::QueryGi
                | Column::QueryAcc
                | Column::QueryAccVer
                | Column::SubjectAllSeqIds
                | Column::SubjectGi
                | Column::SubjectAllGis
                | Column::SubjectAcc
                | Column::SubjectAccVer
                | Column::SubjectAllAccs
                | Column::Btop
                | Column::SubjectTaxIds
                | Column::SubjectSciNames
                | Column::SubjectComNames
                | Column::SubjectBlastNames
                | Column::SubjectKingdoms
                | Column::SubjectTitle
                | Column::SubjectAllTitles
                | Column::QueryCoverage
                | Column::QueryCoverageHsp
        )
    }
}

impl FromStr for Column {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|c| c.keyword() == s)
            .ok_or_else(|| ConfigError::UnknownField {
                kind: "column",
                name: s.to_string(),
            })
    }
}

/// Ordered list of output columns. Duplicates are kept, as BLAST keeps them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    columns: Vec<Column>,
}

impl Default for ColumnSelection {
    fn default() -> Self {
        Self {
            columns: STD_COLUMNS.to_vec(),
        }
    }
}

impl ColumnSelection {
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        let mut columns = Vec::new();
        let mut unsupported: Vec<String> = Vec::new();

        for token in list.split([' ', ',', '\t']).filter(|t| !t.is_empty()) {
            if token == "std" {
                columns.extend_from_slice(&STD_COLUMNS);
                continue;
            }
            let column: Column = token.parse()?;
            if !column.is_supported() {
                if !unsupported.iter().any(|u| u == column.keyword()) {
                    unsupported.push(column.keyword().to_string());
                }
                continue;
            }
            columns.push(column);
        }

        if !unsupported.is_empty() {
            return Err(ConfigError::UnsupportedField {
                kind: "column",
                names: unsupported,
            });
        }
        if columns.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

/// BLAST's magnitude-dependent e-value rendering.
pub fn format_evalue(evalue: f64) -> String {
    if evalue < 1.0e-180 {
        "0.0".to_string()
    } else if evalue < 0.0009 {
        c_exponent(evalue, 0)
    } else if evalue < 0.1 {
        format!("{evalue:.3}")
    } else if evalue < 1.0 {
        format!("{evalue:.2}")
    } else if evalue < 10.0 {
        format!("{evalue:.1}")
    } else {
        format!("{evalue:.0}")
    }
}

pub fn format_bitscore(bit_score: f64) -> String {
    if bit_score > 9999.0 {
        c_exponent(bit_score, 3)
    } else if bit_score > 99.9 {
        format!("{}", bit_score.round() as i64)
    } else {
        format!("{bit_score:.1}")
    }
}

/// `printf("%.*e")`: explicit sign on the exponent and at least two exponent digits.
fn c_exponent(value: f64, precision: usize) -> String {
    let s = format!("{value:.precision$e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => s,
    }
}

fn strand_name(frame_shift: i8) -> &'static str {
    if frame_shift < 0 { "minus" } else { "plus" }
}

/// One tab-separated row, without the trailing newline.
pub fn format_row(m: &AlignmentMatch, ctx: &EncodeContext<'_>) -> Result<String, MatchError> {
    let program = ctx.config.program;
    let (q_idx, s_idx) = ctx.resolve(m)?;
    let q_len = ctx.queries.length(q_idx);
    let s_len = ctx.subjects.length(s_idx);

    let (q_begin, q_end) = blast_positions(
        m.q_start,
        m.q_end,
        m.q_frame_shift,
        q_len,
        program.query_is_translated(),
    )?;
    let (s_begin, s_end) = blast_positions(
        m.s_start,
        m.s_end,
        m.s_frame_shift,
        s_len,
        program.subject_is_translated(),
    )?;

    let mut row = String::new();
    for (i, column) in ctx.config.columns.columns().iter().enumerate() {
        if i > 0 {
            row.push('\t');
        }
        // writing into a String cannot fail
        let _ = match column {
            Column::QuerySeqId => write!(row, "{}", short_id(&m.q_id)),
            Column::QueryLength => write!(row, "{q_len}"),
            Column::SubjectSeqId => write!(row, "{}", short_id(&m.s_id)),
            Column::SubjectLength => write!(row, "{s_len}"),
            Column::QueryStart => write!(row, "{q_begin}"),
            Column::QueryEnd => write!(row, "{q_end}"),
            Column::SubjectStart => write!(row, "{s_begin}"),
            Column::SubjectEnd => write!(row, "{s_end}"),
            Column::QuerySeq => write!(row, "{}", String::from_utf8_lossy(&m.query_row)),
            Column::SubjectSeq => write!(row, "{}", String::from_utf8_lossy(&m.subject_row)),
            Column::EValue => write!(row, "{}", format_evalue(m.e_value)),
            Column::BitScore => write!(row, "{}", format_bitscore(m.bit_score)),
            Column::RawScore => write!(row, "{}", m.raw_score),
            Column::AlignmentLength => write!(row, "{}", m.stats.alignment_length),
            Column::PercentIdentity => write!(row, "{:.2}", m.stats.identity_percent()),
            Column::Identities => write!(row, "{}", m.stats.num_matches),
            Column::Mismatches => write!(row, "{}", m.stats.num_mismatches),
            Column::Positives => write!(row, "{}", m.stats.num_positive),
            Column::GapOpens => write!(row, "{}", m.stats.num_gap_opens),
            Column::Gaps => write!(row, "{}", m.stats.num_gaps),
            Column::PercentPositive => write!(row, "{:.2}", m.stats.positive_percent()),
            Column::Frames => write!(row, "{}/{}", m.q_frame_shift, m.s_frame_shift),
            Column::QueryFrame => write!(row, "{}", m.q_frame_shift),
            Column::SubjectFrame => write!(row, "{}", m.s_frame_shift),
            Column::SubjectStrand => {
                if program.subject_is_translated() {
                    write!(row, "{}", strand_name(m.s_frame_shift))
                } else if program.query_is_nucleotide() && !program.query_is_translated() {
                    write!(row, "{}", strand_name(m.q_frame_shift))
                } else {
                    write!(row, "N/A")
                }
            }
            // rejected by ColumnSelection::parse
            _ => write!(row, "N/A"),
        };
    }
    Ok(row)
}

/// Comment block printed ahead of a query's rows in the commented format.
pub fn group_comments(q_id: &str, database: &str, columns: &ColumnSelection, hits: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Query: {q_id}");
    let _ = writeln!(out, "# Database: {database}");
    if hits > 0 {
        let labels: Vec<&str> = columns.columns().iter().map(|c| c.label()).collect();
        let _ = writeln!(out, "# Fields: {}", labels.join(", "));
    }
    let _ = writeln!(out, "# {hits} hits found");
    out
}

pub fn footer(queries: u64) -> String {
    format!("# lambda-rs processed {queries} queries\n")
}
