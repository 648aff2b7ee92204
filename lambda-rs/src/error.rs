//! Error taxonomy for the encoder.
//!
//! `MatchError` is scoped to a single match: the pipeline logs it, drops the match
//! and keeps going. `ConfigError` is raised once while validating the command line.
//! Everything else (I/O, malformed input) travels as `anyhow::Error` and ends the run.

/// A precondition violated by one match.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MatchError {
    #[error("alignment rows differ in length (query row {query_row}, subject row {subject_row})")]
    RowLengthMismatch { query_row: usize, subject_row: usize },

    #[error("match end {end} lies before its start {start}")]
    InvertedRange { start: u64, end: u64 },

    #[error("match end {end} exceeds sequence length {length}")]
    ClipUnderflow { end: u64, length: u64 },

    #[error("frame shift {0} is not valid for a translated match")]
    InvalidFrame(i8),

    #[error("both alignment rows hold a gap at column {column}")]
    GapColumn { column: usize },

    #[error("sequence range {start}..{end} is outside a sequence of length {length}")]
    SequenceRange { start: u64, end: u64, length: u64 },

    #[error("alignment start {0} is not a valid 1-based position")]
    InvalidPosition(u64),

    #[error("coordinate {pos} in frame {frame_shift} overflows when untranslated")]
    CoordinateOverflow { pos: u64, frame_shift: i8 },

    #[error("hard clip of {0} bases exceeds the CIGAR operation limit")]
    ClipTooLong(u64),

    #[error("value {value} does not fit the {width} tag {tag}")]
    TagOverflow {
        tag: String,
        width: &'static str,
        value: f64,
    },

    #[error("query '{0}' is not in the query database")]
    UnknownQuery(String),

    #[error("subject '{0}' is not in the subject database")]
    UnknownSubject(String),
}

/// A rejected output configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown {kind} field '{name}'")]
    UnknownField { kind: &'static str, name: String },

    #[error("unsupported {kind} field(s): {}", names.join(", "))]
    UnsupportedField {
        kind: &'static str,
        names: Vec<String>,
    },

    #[error("cannot infer output format from '{0}'; use --format")]
    UnknownFormat(String),
}
