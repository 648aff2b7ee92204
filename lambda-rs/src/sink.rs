//! Output streams.
//!
//! Workers hand over fully encoded batches; a sink only appends bytes. The one shared
//! mutable resource in a multi-threaded run is the sink behind `ConcurrentSink`.
use crate::config::{OutputConfig, OutputFormat};
use crate::header::without_reference_sequences;
use crate::tabular;
use anyhow::{Context, Result, anyhow, bail};
use noodles::{bam, sam};
use sam::alignment::io::Write as AlignmentWrite;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// Output of one or more whole query groups, in group order.
#[derive(Debug)]
pub enum EncodedBatch {
    Tabular {
        /// Newline-terminated rows, comment lines included.
        text: String,
        rows: usize,
        groups: u64,
    },
    Alignment(Vec<sam::alignment::RecordBuf>),
}

impl EncodedBatch {
    /// Number of records (tabular rows or alignment records).
    pub fn len(&self) -> usize {
        match self {
            EncodedBatch::Tabular { rows, .. } => *rows,
            EncodedBatch::Alignment(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `other` after this batch. Both must be of the same kind.
    pub fn extend(&mut self, other: EncodedBatch) -> Result<()> {
        match (self, other) {
            (
                EncodedBatch::Tabular { text, rows, groups },
                EncodedBatch::Tabular {
                    text: t,
                    rows: r,
                    groups: g,
                },
            ) => {
                text.push_str(&t);
                *rows += r;
                *groups += g;
            }
            (EncodedBatch::Alignment(records), EncodedBatch::Alignment(more)) => {
                records.extend(more);
            }
            _ => bail!("cannot merge tabular and alignment batches"),
        }
        Ok(())
    }
}

pub trait RecordSink: Send {
    fn write_batch(&mut self, batch: &EncodedBatch) -> Result<()>;

    /// Write trailers and flush. Called once, after the last batch.
    fn finish(&mut self) -> Result<()>;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn write_batch(&mut self, batch: &EncodedBatch) -> Result<()> {
        (**self).write_batch(batch)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn write_batch(&mut self, batch: &EncodedBatch) -> Result<()> {
        (**self).write_batch(batch)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

pub struct TabularSink<W: Write> {
    writer: W,
    footer: bool,
    queries: u64,
}

impl<W: Write> TabularSink<W> {
    pub fn new(writer: W, footer: bool) -> Self {
        Self {
            writer,
            footer,
            queries: 0,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}

impl<W: Write + Send> RecordSink for TabularSink<W> {
    fn write_batch(&mut self, batch: &EncodedBatch) -> Result<()> {
        let EncodedBatch::Tabular { text, groups, .. } = batch else {
            bail!("tabular sink received alignment records");
        };
        self.writer.write_all(text.as_bytes())?;
        self.queries += groups;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.footer {
            self.writer
                .write_all(tabular::footer(self.queries).as_bytes())?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// SAM or BAM writer plus the header records are resolved against.
pub struct AlignmentSink<W> {
    writer: W,
    header: sam::Header,
}

impl<W: AlignmentWrite> AlignmentSink<W> {
    pub fn new(writer: W, header: sam::Header) -> Self {
        Self { writer, header }
    }

    /// Write `header`, which may be a reduced form of the header records refer to.
    pub fn write_header(&mut self, header: &sam::Header) -> Result<()> {
        self.writer.write_alignment_header(header)?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}

impl<W: AlignmentWrite + Send> RecordSink for AlignmentSink<W> {
    fn write_batch(&mut self, batch: &EncodedBatch) -> Result<()> {
        let EncodedBatch::Alignment(records) = batch else {
            bail!("alignment sink received tabular rows");
        };
        for record in records {
            self.writer.write_alignment_record(&self.header, record)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.finish(&self.header)?;
        Ok(())
    }
}

/// A sink shared by worker threads. Each batch is written under a single lock.
pub struct ConcurrentSink<S> {
    inner: Mutex<S>,
}

impl<S: RecordSink> ConcurrentSink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    pub fn write(&self, batch: &EncodedBatch) -> Result<()> {
        let mut sink = self
            .inner
            .lock()
            .map_err(|_| anyhow!("output sink lock poisoned"))?;
        sink.write_batch(batch)
    }

    pub fn into_inner(self) -> Result<S> {
        self.inner
            .into_inner()
            .map_err(|_| anyhow!("output sink lock poisoned"))
    }
}

/// Create the output file and write any header.
pub fn open_sink(
    path: &Path,
    config: &OutputConfig,
    header: &sam::Header,
) -> Result<Box<dyn RecordSink>> {
    let file = File::create(path)
        .with_context(|| format!("failed to create output {}", path.display()))?;

    let sink: Box<dyn RecordSink> = match config.format {
        OutputFormat::Tab => Box::new(TabularSink::new(BufWriter::new(file), false)),
        OutputFormat::TabComments => Box::new(TabularSink::new(BufWriter::new(file), true)),
        OutputFormat::Sam => {
            let mut sink =
                AlignmentSink::new(sam::io::Writer::new(BufWriter::new(file)), header.clone());
            if config.with_ref_header {
                sink.write_header(header)?;
            } else {
                sink.write_header(&without_reference_sequences(header))?;
            }
            Box::new(sink)
        }
        OutputFormat::Bam => {
            let mut sink = AlignmentSink::new(bam::io::Writer::new(file), header.clone());
            sink.write_header(header)?;
            Box::new(sink)
        }
    };
    Ok(sink)
}
