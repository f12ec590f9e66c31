//! Demo sessions: each wires the flow primitives together and writes what it sees to `sink`.

use anyhow::{Context, Result};
use log::{debug, info};
use std::io::Write;
use std::path::Path;

use crate::error::FlowError;
use crate::flow::{
    CancellationSignal, RecvOutcome, Stream, Task, generate, join_all, merge, search, split,
};
use crate::utils::config::{SearchConsts, SessionConsts};
use crate::{Opts, PipelineReport};

/// Producer writes `"Message {i}"` five times with jittered pauses; the caller reads until close.
pub fn basic(opts: &Opts, cancel: &CancellationSignal, sink: &mut dyn Write) -> Result<()> {
    let messages = Stream::unbounded();
    let reader = messages.reader();
    let producer = {
        let cancel = cancel.clone();
        let mut jitter = opts.jitter();
        Task::spawn("producer", move || {
            let _close = messages.close_on_drop();
            for i in 0..5 {
                if !cancel.sleep(jitter.next_delay()) {
                    break;
                }
                messages.write(format!("Message {i}"))?;
            }
            Ok(())
        })?
    };
    for message in &reader {
        writeln!(sink, "{message}")?;
    }
    producer.join()
}

/// Print everything `Joe` says, stopping early if the session is cancelled.
pub fn generator(opts: &Opts, cancel: &CancellationSignal, sink: &mut dyn Write) -> Result<()> {
    let (joe, task) = generate("Joe", Some(5), cancel, opts.jitter())?;
    drain_until_cancelled(&joe, cancel, sink)?;
    task.join()
}

/// Merge `Joe` (3 items) and `Ann` (5 items) and print the interleaving.
pub fn multiplex(opts: &Opts, cancel: &CancellationSignal, sink: &mut dyn Write) -> Result<()> {
    let mut jitter = opts.jitter();
    let (joe, joe_task) = generate("Joe", Some(3), cancel, jitter.fork())?;
    let (ann, ann_task) = generate("Ann", Some(5), cancel, jitter.fork())?;
    let (merged, merge_task) = merge(vec![joe, ann])?;
    drain_until_cancelled(&merged, cancel, sink)?;
    join_all([joe_task, ann_task, merge_task]).map(|_| ())
}

/// Split `Joe`'s 10 items across three readers; each prefixes its lines with its index.
pub fn demultiplex(opts: &Opts, cancel: &CancellationSignal, sink: &mut dyn Write) -> Result<()> {
    let (joe, joe_task) = generate("Joe", Some(10), cancel, opts.jitter())?;
    let (branches, split_task) = split(joe, 3)?;

    // Readers run on their own threads; their lines funnel through one stream to `sink`.
    let console = Stream::unbounded();
    let lines = console.reader();
    let readers = branches
        .into_iter()
        .enumerate()
        .map(|(i, branch)| {
            let console = console.clone();
            Task::spawn(format!("reader-{i}"), move || {
                for item in branch {
                    console.write(format!("Reader {i}: {item}"))?;
                }
                Ok(())
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let close = console.close_on_drop();
    let supervisor = Task::spawn("readers", move || {
        let _close = close;
        join_all(readers).map(|_| ())
    })?;

    for line in &lines {
        writeln!(sink, "{line}")?;
    }
    join_all([joe_task, split_task, supervisor]).map(|_| ())
}

/// Wait a fixed time for all of `Joe`'s 10 items; report whether he made it.
pub fn timeout(opts: &Opts, cancel: &CancellationSignal, sink: &mut dyn Write) -> Result<()> {
    // Joe is not told about the reader's deadline.
    let joe_cancel = CancellationSignal::new();
    let (joe, _joe_task) = generate("Joe", Some(10), &joe_cancel, opts.jitter())?;
    cancel.cancel_after(SessionConsts::TIMEOUT_AFTER);

    let outcome = loop {
        match joe.recv_cancellable(cancel) {
            Ok(item) => writeln!(sink, "{item}")?,
            Err(outcome) => break outcome,
        }
    };
    match outcome {
        RecvOutcome::Closed => writeln!(sink, "Joe sent all of his messages.")?,
        _ => writeln!(sink, "Joe, you are too slow!")?,
    }
    // Abandoned; let him wind down instead of sleeping out his schedule.
    joe_cancel.trigger();
    Ok(())
}

/// Ask `Joe` to stop after a while and print everything he sends, goodbye included.
pub fn quit(opts: &Opts, cancel: &CancellationSignal, sink: &mut dyn Write) -> Result<()> {
    let (joe, task) = generate("Joe", Some(10), cancel, opts.jitter())?;
    cancel.cancel_after(SessionConsts::QUIT_AFTER);
    for item in &joe {
        writeln!(sink, "{item}")?;
    }
    task.join()
}

/// Run the line-count pipeline under `dir`; the session signal also carries the pipeline deadline.
pub fn pipeline(
    dir: &Path,
    opts: &Opts,
    cancel: &CancellationSignal,
    sink: &mut dyn Write,
) -> Result<PipelineReport> {
    cancel.cancel_after(opts.pipeline.deadline);
    let report = crate::pipeline::run_with_signal(dir, &opts.pipeline, cancel, sink)?;
    if report.cancelled {
        info!("Pipeline deadline reached; totals are partial");
    }
    debug!(
        "pipeline: {} files, {} errors, {} lines in {:?}",
        report.files.len(),
        report.errors.len(),
        report.total_lines,
        report.elapsed
    );
    Ok(report)
}

/// Query every source for `term`; print results as they come, then the outcome.
pub fn search_sources(
    term: &str,
    sources: &[String],
    opts: &Opts,
    sink: &mut dyn Write,
) -> Result<()> {
    let mut write_error = None;
    let outcome = search(
        term,
        sources,
        opts.jitter_with(opts.search_max_delay),
        opts.search_timeout,
        |result| {
            if let Err(e) = writeln!(sink, "{result}") {
                write_error.get_or_insert(e);
            }
        },
    );
    if let Some(e) = write_error {
        return Err(e).context("write search result");
    }
    match outcome {
        Ok(_) => writeln!(sink, "All searches have completed.")?,
        Err(FlowError::TimedOut { .. }) => writeln!(sink, "Timeout.")?,
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Default sources when none are given on the command line.
pub fn default_sources() -> Vec<String> {
    SearchConsts::SOURCES.iter().map(|s| s.to_string()).collect()
}

fn drain_until_cancelled(
    reader: &crate::flow::StreamReader<String>,
    cancel: &CancellationSignal,
    sink: &mut dyn Write,
) -> Result<()> {
    loop {
        match reader.recv_cancellable(cancel) {
            Ok(item) => writeln!(sink, "{item}")?,
            Err(RecvOutcome::Closed) => return Ok(()),
            Err(_) => {
                info!("Session cancelled");
                return Ok(());
            }
        }
    }
}
