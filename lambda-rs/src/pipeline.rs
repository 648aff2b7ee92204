use crate::cli::Args;
use crate::config::OutputFormat;
use crate::matches::MatchGroup;
use crate::record::{EncodeContext, assemble_group};
use crate::sink::{ConcurrentSink, EncodedBatch, RecordSink};
use crate::tabular;
use anyhow::{Result, anyhow};
use crossfire::mpmc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

const UNORDERED_FLUSH_GROUPS: usize = 8;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    pub total_matches: u64,
    pub query_groups: u64,
    pub records_written: u64,
    pub skipped_matches: u64,
}

impl Stats {
    fn merge(&mut self, other: &Stats) {
        self.total_matches += other.total_matches;
        self.query_groups += other.query_groups;
        self.records_written += other.records_written;
        self.skipped_matches += other.skipped_matches;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub threads: usize,
    pub unordered: bool,
    pub unordered_flush_records: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            unordered: false,
            unordered_flush_records: 1024,
        }
    }
}

impl PipelineOptions {
    pub fn from_args(args: &Args) -> Self {
        Self {
            threads: (args.threads as usize).max(1),
            unordered: args.unordered,
            unordered_flush_records: args.unordered_flush_records.max(1),
        }
    }
}

/// Encoded output of one query group.
#[derive(Debug)]
pub struct GroupOutcome {
    pub batch: EncodedBatch,
    pub skipped: u64,
}

/// Encode every match of a group. Matches that fail a precondition are logged and dropped;
/// the rest of the group is still written.
pub fn encode_group(group: &MatchGroup, ctx: &EncodeContext<'_>) -> GroupOutcome {
    let mut skipped = 0u64;
    let mut log_skip = |i: usize, e: &dyn std::fmt::Display| {
        let m = &group.matches[i];
        tracing::warn!(query = %m.q_id, subject = %m.s_id, error = %e, "skipping match");
        skipped += 1;
    };

    let batch = if ctx.config.format.is_tabular() {
        let mut body = String::new();
        let mut rows = 0usize;
        for (i, m) in group.matches.iter().enumerate() {
            match tabular::format_row(m, ctx) {
                Ok(row) => {
                    body.push_str(&row);
                    body.push('\n');
                    rows += 1;
                }
                Err(e) => log_skip(i, &e),
            }
        }

        let text = if ctx.config.format == OutputFormat::TabComments {
            let mut text = tabular::group_comments(
                &group.q_id,
                &ctx.config.database,
                &ctx.config.columns,
                rows,
            );
            text.push_str(&body);
            text
        } else {
            body
        };
        EncodedBatch::Tabular {
            text,
            rows,
            groups: 1,
        }
    } else {
        let (records, failures) = assemble_group(group, ctx);
        for (i, e) in &failures {
            log_skip(*i, e);
        }
        EncodedBatch::Alignment(records.iter().map(|r| r.to_record_buf()).collect())
    };

    GroupOutcome { batch, skipped }
}

struct WorkItem {
    idx: usize,
    group: MatchGroup,
}

struct ResultItem {
    idx: usize,
    outcome: GroupOutcome,
}

fn write_outcome<S: RecordSink + ?Sized>(
    sink: &mut S,
    outcome: &GroupOutcome,
    stats: &mut Stats,
) -> Result<()> {
    sink.write_batch(&outcome.batch)?;
    stats.records_written += outcome.batch.len() as u64;
    stats.skipped_matches += outcome.skipped;
    Ok(())
}

/// Restores input order for results arriving from the worker pool.
#[derive(Default)]
struct ReorderBuffer {
    pending: BTreeMap<usize, GroupOutcome>,
    next_idx: usize,
}

impl ReorderBuffer {
    fn push<S: RecordSink + ?Sized>(
        &mut self,
        item: ResultItem,
        sink: &mut S,
        stats: &mut Stats,
    ) -> Result<()> {
        self.pending.insert(item.idx, item.outcome);
        while let Some(outcome) = self.pending.remove(&self.next_idx) {
            write_outcome(sink, &outcome, stats)?;
            self.next_idx += 1;
        }
        Ok(())
    }
}

/// Encode all groups and write them to `sink`, then finish the sink.
///
/// Input order is preserved unless `opts.unordered` is set with more than one thread, in
/// which case groups stay contiguous but may appear in any order.
pub fn run<I, S>(
    groups: I,
    ctx: &EncodeContext<'_>,
    sink: &mut S,
    opts: &PipelineOptions,
) -> Result<Stats>
where
    I: IntoIterator<Item = Result<MatchGroup>>,
    S: RecordSink + ?Sized,
{
    let stats = if opts.threads > 1 && opts.unordered {
        run_unordered(groups, ctx, &mut *sink, opts)?
    } else if opts.threads > 1 {
        run_ordered(groups, ctx, &mut *sink, opts)?
    } else {
        let mut stats = Stats::default();
        for group in groups {
            let group = group?;
            stats.query_groups += 1;
            stats.total_matches += group.matches.len() as u64;
            let outcome = encode_group(&group, ctx);
            write_outcome(sink, &outcome, &mut stats)?;
        }
        stats
    };

    sink.finish()?;
    Ok(stats)
}

fn run_ordered<I, S>(
    groups: I,
    ctx: &EncodeContext<'_>,
    sink: &mut S,
    opts: &PipelineOptions,
) -> Result<Stats>
where
    I: IntoIterator<Item = Result<MatchGroup>>,
    S: RecordSink + ?Sized,
{
    crossfire::detect_backoff_cfg();
    let worker_count = opts.threads;
    let cap = worker_count.saturating_mul(4).max(8);
    let (tx_work, rx_work) = mpmc::bounded_blocking::<WorkItem>(cap);
    let (tx_res, rx_res) = mpmc::unbounded_blocking::<ResultItem>();

    let mut stats = Stats::default();

    thread::scope(|scope| -> Result<()> {
        for _ in 0..worker_count {
            let rx_work = rx_work.clone();
            let tx_res = tx_res.clone();
            scope.spawn(move || {
                while let Ok(item) = rx_work.recv() {
                    let outcome = encode_group(&item.group, ctx);
                    if tx_res
                        .send(ResultItem {
                            idx: item.idx,
                            outcome,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
            });
        }
        drop(rx_work);
        drop(tx_res);

        let mut reorder = ReorderBuffer::default();
        let mut sent = 0usize;

        for group in groups {
            let group = group?;
            stats.query_groups += 1;
            stats.total_matches += group.matches.len() as u64;
            tx_work
                .send(WorkItem { idx: sent, group })
                .map_err(|_| anyhow!("worker channel closed"))?;
            sent += 1;

            while let Ok(item) = rx_res.try_recv() {
                reorder.push(item, &mut *sink, &mut stats)?;
            }
        }

        drop(tx_work);

        while reorder.next_idx < sent {
            let item = rx_res
                .recv()
                .map_err(|_| anyhow!("worker result channel closed"))?;
            reorder.push(item, &mut *sink, &mut stats)?;
        }

        Ok(())
    })?;

    Ok(stats)
}

fn run_unordered<I, S>(
    groups: I,
    ctx: &EncodeContext<'_>,
    sink: &mut S,
    opts: &PipelineOptions,
) -> Result<Stats>
where
    I: IntoIterator<Item = Result<MatchGroup>>,
    S: RecordSink + ?Sized,
{
    crossfire::detect_backoff_cfg();
    let worker_count = opts.threads;
    let cap = worker_count.saturating_mul(4).max(8);
    let (tx_work, rx_work) = mpmc::bounded_blocking::<WorkItem>(cap);
    let shared = ConcurrentSink::new(sink);
    let abort = AtomicBool::new(false);
    let flush_records = opts.unordered_flush_records;

    let mut stats = Stats::default();

    thread::scope(|scope| -> Result<()> {
        let mut handles = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let rx_work = rx_work.clone();
            let shared = &shared;
            let abort = &abort;
            handles.push(scope.spawn(move || -> Result<Stats> {
                let mut local = Stats::default();
                let mut buffered: Option<EncodedBatch> = None;
                let mut buffered_groups = 0usize;

                let flush = |batch: EncodedBatch, local: &mut Stats| -> Result<()> {
                    if let Err(e) = shared.write(&batch) {
                        abort.store(true, Ordering::Relaxed);
                        return Err(e);
                    }
                    local.records_written += batch.len() as u64;
                    Ok(())
                };

                while let Ok(item) = rx_work.recv() {
                    if abort.load(Ordering::Relaxed) {
                        break;
                    }
                    let outcome = encode_group(&item.group, ctx);
                    local.skipped_matches += outcome.skipped;
                    match buffered.as_mut() {
                        Some(batch) => batch.extend(outcome.batch)?,
                        None => buffered = Some(outcome.batch),
                    }
                    buffered_groups += 1;

                    let full = buffered
                        .as_ref()
                        .is_some_and(|b| b.len() >= flush_records);
                    if buffered_groups >= UNORDERED_FLUSH_GROUPS || full {
                        if let Some(batch) = buffered.take() {
                            flush(batch, &mut local)?;
                        }
                        buffered_groups = 0;
                    }
                }

                if let Some(batch) = buffered.take()
                    && !abort.load(Ordering::Relaxed)
                {
                    flush(batch, &mut local)?;
                }
                Ok(local)
            }));
        }
        drop(rx_work);

        for group in groups {
            if abort.load(Ordering::Relaxed) {
                break;
            }
            let group = group?;
            stats.query_groups += 1;
            stats.total_matches += group.matches.len() as u64;
            if tx_work.send(WorkItem { idx: 0, group }).is_err() {
                break;
            }
        }
        drop(tx_work);

        for handle in handles {
            let local = handle
                .join()
                .map_err(|_| anyhow!("output worker panicked"))??;
            stats.merge(&local);
        }
        Ok(())
    })?;

    shared.into_inner()?;
    Ok(stats)
}
