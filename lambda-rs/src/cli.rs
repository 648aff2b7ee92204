use crate::config::OutputFormat;
use crate::program::BlastProgram;
use crate::tags::NarrowIntPolicy;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "lambda-rs",
    about = "Write precomputed local alignments as BLAST tabular, SAM or BAM output",
    version
)]
pub struct Args {
    /// Tab-separated match table, matches of one query on consecutive lines
    pub matches: PathBuf,

    /// Untranslated query sequences
    #[arg(short = 'Q', long = "queries", value_name = "FASTA")]
    pub queries: PathBuf,

    /// Untranslated subject sequences
    #[arg(short = 'S', long = "subjects", value_name = "FASTA")]
    pub subjects: PathBuf,

    /// Output path; the extension picks the format unless --format is given
    #[arg(short = 'o', long = "out", value_name = "PATH")]
    pub out: PathBuf,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Search mode that produced the matches
    #[arg(long, value_enum, default_value_t = BlastProgram::Blastn)]
    pub program: BlastProgram,

    /// Tabular output columns
    #[arg(long, default_value = "std")]
    pub columns: String,

    /// Optional SAM/BAM fields, by keyword or two-character code
    #[arg(long = "sam-tags", default_value = "")]
    pub sam_tags: String,

    /// Write the (untranslated) query sequence into SAM/BAM records
    #[arg(long = "sam-seq")]
    pub sam_seq: bool,

    /// Write @SQ lines into SAM output
    #[arg(long = "sam-with-ref-header")]
    pub sam_with_ref_header: bool,

    /// Handling of tag values that overflow their integer width
    #[arg(long = "narrow-ints", value_enum, default_value_t = NarrowIntPolicy::Saturate)]
    pub narrow_ints: NarrowIntPolicy,

    /// Number of threads (CPUs) to use
    #[arg(short = 'p', long = "threads", default_value_t = 1)]
    pub threads: u8,

    /// Allow non-deterministic output order (query groups remain contiguous)
    #[arg(long)]
    pub unordered: bool,

    /// Unordered mode: flush output after this many records
    #[arg(long, default_value_t = 1024)]
    pub unordered_flush_records: usize,

    /// Set logging level to WARN
    #[arg(short = 'q', long)]
    pub quiet: bool,
}
