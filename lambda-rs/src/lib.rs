//! lambda-rs: encode gapped pairwise matches as BLAST tabular, SAM or BAM records.
//!
//! # Library usage
//!
//! ```no_run
//! use lambda_rs::{EncodeContext, OutputConfig, SeqDb, assemble_group};
//! use lambda_rs::matches::MatchReader;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let queries = SeqDb::load(Path::new("queries.fa"), true)?;
//! let subjects = SeqDb::load(Path::new("subjects.fa"), false)?;
//! let config = OutputConfig::default();
//! let ctx = EncodeContext { config: &config, queries: &queries, subjects: &subjects };
//!
//! for group in MatchReader::from_path(Path::new("matches.tsv"))? {
//!     let (records, skipped) = assemble_group(&group?, &ctx);
//!     // first record is primary; `skipped` holds (match index, MatchError)
//!     # let _ = (records, skipped);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cigar;
pub mod cli;
pub mod config;
pub mod coords;
pub mod error;
pub mod fasta;
pub mod header;
pub mod matches;
pub mod pipeline;
pub mod program;
pub mod record;
pub mod sequence;
pub mod sink;
pub mod tabular;
pub mod tags;
pub mod types;

// Flat re-exports for the most commonly used public types.
pub use cigar::{Cigar, CigarOp, build_cigar};
pub use config::{OutputConfig, OutputFormat};
pub use coords::{Clips, untranslated_clip_positions};
pub use error::{ConfigError, MatchError};
pub use fasta::SeqDb;
pub use matches::{AlignmentMatch, MatchGroup};
pub use program::BlastProgram;
pub use record::{EncodeContext, OutputRecord, assemble_group, assemble_record};
pub use sequence::untranslate_sequence;
pub use tags::{NarrowIntPolicy, SamTag, TagSelection, TagValue};
