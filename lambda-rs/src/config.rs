use crate::cli::Args;
use crate::error::ConfigError;
use crate::program::BlastProgram;
use crate::tabular::ColumnSelection;
use crate::tags::{NarrowIntPolicy, TagSelection};
use anyhow::Result;
use clap::ValueEnum;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// BLAST tabular, no comments
    Tab,
    /// BLAST tabular with per-query comment lines
    TabComments,
    Sam,
    Bam,
}

impl OutputFormat {
    pub fn detect(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "m8" | "tsv" | "tab" => Ok(OutputFormat::Tab),
            "m9" => Ok(OutputFormat::TabComments),
            "sam" => Ok(OutputFormat::Sam),
            "bam" => Ok(OutputFormat::Bam),
            _ => Err(ConfigError::UnknownFormat(path.display().to_string())),
        }
    }

    pub fn is_tabular(self) -> bool {
        matches!(self, OutputFormat::Tab | OutputFormat::TabComments)
    }
}

/// Validated output settings shared read-only by all workers.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub program: BlastProgram,
    pub columns: ColumnSelection,
    pub tags: TagSelection,
    pub emit_sequence: bool,
    pub with_ref_header: bool,
    pub narrow_ints: NarrowIntPolicy,
    /// Shown on `# Database:` comment lines.
    pub database: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Sam,
            program: BlastProgram::default(),
            columns: ColumnSelection::default(),
            tags: TagSelection::default(),
            emit_sequence: false,
            with_ref_header: false,
            narrow_ints: NarrowIntPolicy::default(),
            database: String::new(),
        }
    }
}

impl OutputConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let format = match args.format {
            Some(format) => format,
            None => OutputFormat::detect(&args.out)?,
        };
        let columns = ColumnSelection::parse(&args.columns)?;
        let tags = TagSelection::parse(&args.sam_tags)?;

        if format.is_tabular() && (!tags.is_empty() || args.sam_seq) {
            tracing::warn!("--sam-tags and --sam-seq have no effect on tabular output");
        }
        if args.sam_seq && !args.program.query_is_nucleotide() {
            tracing::warn!(
                program = %args.program,
                "query is protein; records are written without sequence"
            );
        }

        Ok(Self {
            format,
            program: args.program,
            columns,
            tags,
            emit_sequence: args.sam_seq,
            with_ref_header: args.sam_with_ref_header,
            narrow_ints: args.narrow_ints,
            database: args.subjects.display().to_string(),
        })
    }
}
