use crate::types::HashMap;
use anyhow::{Result, bail};
use needletail::parse_fastx_file;
use std::path::Path;

/// Id up to the first whitespace, the form written into SAM/BAM.
pub fn short_id(id: &str) -> &str {
    id.split_whitespace().next().unwrap_or("")
}

/// Untranslated sequences addressed by id.
///
/// Subjects only need names and lengths, so sequences are kept on request.
#[derive(Debug, Default)]
pub struct SeqDb {
    names: Vec<String>,
    lengths: Vec<u64>,
    seqs: Vec<Vec<u8>>,
    index: HashMap<String, usize>,
}

impl SeqDb {
    pub fn load(path: &Path, keep_sequences: bool) -> Result<Self> {
        let mut reader = parse_fastx_file(path)
            .map_err(|e| anyhow::anyhow!("failed to open FASTA {}: {}", path.display(), e))?;
        let mut db = SeqDb::default();

        while let Some(result) = reader.next() {
            let record = result
                .map_err(|e| anyhow::anyhow!("failed to parse FASTA record: {}", e))?;
            let id = String::from_utf8_lossy(record.id()).into_owned();
            db.push(&id, &record.seq(), keep_sequences)?;
        }

        if db.is_empty() {
            bail!("no sequences in {}", path.display());
        }
        Ok(db)
    }

    /// Build from in-memory `(id, sequence)` pairs.
    pub fn from_records<'a, I>(records: I, keep_sequences: bool) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
    {
        let mut db = SeqDb::default();
        for (id, seq) in records {
            db.push(id, seq, keep_sequences)?;
        }
        Ok(db)
    }

    fn push(&mut self, id: &str, seq: &[u8], keep_sequence: bool) -> Result<()> {
        let name = short_id(id).to_string();
        if self.index.contains_key(&name) {
            bail!("duplicate sequence id '{}'", name);
        }
        let idx = self.names.len();
        self.index.insert(name.clone(), idx);
        self.names.push(name);
        self.lengths.push(seq.len() as u64);
        self.seqs.push(if keep_sequence {
            seq.to_ascii_uppercase()
        } else {
            Vec::new()
        });
        Ok(())
    }

    /// Index of `id`, which may carry a description after the first whitespace.
    pub fn lookup(&self, id: &str) -> Option<usize> {
        self.index.get(short_id(id)).copied()
    }

    pub fn name(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    pub fn length(&self, idx: usize) -> u64 {
        self.lengths[idx]
    }

    pub fn sequence(&self, idx: usize) -> &[u8] {
        &self.seqs[idx]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.names
            .iter()
            .zip(self.lengths.iter())
            .map(|(name, len)| (name.as_str(), *len))
    }
}
