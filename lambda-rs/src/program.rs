use clap::ValueEnum;
use std::fmt;

/// Search mode that produced the matches.
///
/// Only the translation status of each side matters to the encoder: a translated query
/// means match coordinates are in codon space and must be scaled back to nucleotides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BlastProgram {
    #[default]
    Blastn,
    Blastp,
    Blastx,
    Tblastn,
    Tblastx,
}

impl BlastProgram {
    pub fn query_is_translated(self) -> bool {
        matches!(self, BlastProgram::Blastx | BlastProgram::Tblastx)
    }

    pub fn subject_is_translated(self) -> bool {
        matches!(self, BlastProgram::Tblastn | BlastProgram::Tblastx)
    }

    /// True when the emitted query sequence is nucleotide (possibly after untranslation).
    pub fn query_is_nucleotide(self) -> bool {
        self == BlastProgram::Blastn || self.query_is_translated()
    }

    /// Factor between match-space and output-space query lengths.
    pub fn query_scale(self) -> u32 {
        if self.query_is_translated() { 3 } else { 1 }
    }
}

impl fmt::Display for BlastProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlastProgram::Blastn => "BLASTN",
            BlastProgram::Blastp => "BLASTP",
            BlastProgram::Blastx => "BLASTX",
            BlastProgram::Tblastn => "TBLASTN",
            BlastProgram::Tblastx => "TBLASTX",
        };
        f.write_str(name)
    }
}
