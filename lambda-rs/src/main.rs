use anyhow::Result;
use clap::Parser;
use lambda_rs::cli::Args;
use lambda_rs::matches::MatchReader;
use lambda_rs::pipeline::{self, PipelineOptions};
use lambda_rs::{EncodeContext, OutputConfig, SeqDb, header, sink};
use mimalloc::MiMalloc;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.quiet {
            EnvFilter::new("warn")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = OutputConfig::from_args(&args)?;

    // subject sequences are never emitted, only names and lengths
    let queries = SeqDb::load(&args.queries, config.emit_sequence)?;
    let subjects = SeqDb::load(&args.subjects, false)?;
    tracing::info!(
        queries = queries.len(),
        subjects = subjects.len(),
        format = ?config.format,
        program = %config.program,
        "lambda-rs: sequences loaded"
    );

    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    let out_header = header::build_header(&subjects, &command_line)?;
    let mut out = sink::open_sink(&args.out, &config, &out_header)?;

    let ctx = EncodeContext {
        config: &config,
        queries: &queries,
        subjects: &subjects,
    };
    let reader = MatchReader::from_path(&args.matches)?;
    let stats = pipeline::run(reader, &ctx, &mut out, &PipelineOptions::from_args(&args))?;

    tracing::info!(
        total_matches = stats.total_matches,
        query_groups = stats.query_groups,
        records_written = stats.records_written,
        skipped_matches = stats.skipped_matches,
        "lambda-rs: processing complete"
    );
    Ok(())
}
