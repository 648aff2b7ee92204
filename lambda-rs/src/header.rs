use crate::fasta::SeqDb;
use anyhow::{Result, anyhow};
use noodles::sam;
use noodles::sam::header::record::value::Map;
use noodles::sam::header::record::value::map::header::tag as header_tag;
use noodles::sam::header::record::value::map::program::tag as program_tag;
use noodles::sam::header::record::value::map::{Header as HeaderRecord, Program, ReferenceSequence};
use std::num::NonZeroUsize;

pub const PROGRAM_ID: &str = "lambda-rs";

fn header_record() -> Result<Map<HeaderRecord>> {
    Ok(Map::<HeaderRecord>::builder()
        .insert(header_tag::GROUP_ORDER, "query")
        .build()?)
}

fn program_record(command_line: &str) -> Result<Map<Program>> {
    Ok(Map::<Program>::builder()
        .insert(program_tag::NAME, PROGRAM_ID)
        .insert(program_tag::VERSION, env!("CARGO_PKG_VERSION"))
        .insert(program_tag::COMMAND_LINE, command_line)
        .build()?)
}

/// Full output header: `@HD GO:query`, one `@SQ` per subject in database order, `@PG`.
///
/// Record reference indices are subject indices, so the `@SQ` order must not change.
pub fn build_header(subjects: &SeqDb, command_line: &str) -> Result<sam::Header> {
    let mut builder = sam::Header::builder().set_header(header_record()?);

    for (name, len) in subjects.iter() {
        let len = NonZeroUsize::new(len as usize)
            .ok_or_else(|| anyhow!("subject '{name}' has zero length"))?;
        builder = builder.add_reference_sequence(name, Map::<ReferenceSequence>::new(len));
    }

    Ok(builder
        .add_program(PROGRAM_ID, program_record(command_line)?)
        .build())
}

/// The same header without `@SQ` lines, for SAM text written without reference lines.
pub fn without_reference_sequences(header: &sam::Header) -> sam::Header {
    let mut builder = sam::Header::builder();
    if let Some(hd) = header.header() {
        builder = builder.set_header(hd.clone());
    }
    for (id, pg) in header.programs().as_ref() {
        builder = builder.add_program(id.as_slice(), pg.clone());
    }
    builder.build()
}
