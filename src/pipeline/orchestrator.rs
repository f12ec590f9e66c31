use anyhow::{Context, Result};
use log::debug;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use crate::flow::{CancellationSignal, join_all};
use crate::pipeline::{count_lines_parallel, filter_by_extension, walk};
use crate::{PipelineOpts, PipelineReport};

/// Handles returned by [`start_pipeline`]: consume `counted`, then join `walk_task` and
/// `filter_task`.
pub struct PipelineHandles {
    pub counted: super::CountedStreams,
    pub walk_task: crate::flow::Task<crate::WalkSummary>,
    pub filter_task: crate::flow::Task,
}

/// Wire walk → extension filter → line counter under one cancellation signal.
pub fn start_pipeline(
    root: &Path,
    opts: &PipelineOpts,
    cancel: &CancellationSignal,
) -> Result<PipelineHandles> {
    let (paths, walk_task) = walk(root, cancel, &opts.walk)?;
    let (files, filter_task) = filter_by_extension(paths, &opts.extensions)?;
    let counted = count_lines_parallel(files, opts.counter_workers, cancel)?;
    Ok(PipelineHandles {
        counted,
        walk_task,
        filter_task,
    })
}

/// Count lines of every matching file under `root` before `opts.deadline` elapses.
///
/// Writes `"{path} {count}"` per file as results arrive, then `"Total lines: {n}"`, then each
/// error line verbatim. Results already queued when the deadline fires are still reported.
pub fn run(root: &Path, opts: &PipelineOpts, sink: &mut dyn Write) -> Result<PipelineReport> {
    let cancel = CancellationSignal::with_timeout(opts.deadline);
    run_with_signal(root, opts, &cancel, sink)
}

/// [`run`] with a caller-owned signal (e.g. one also wired to Ctrl+C).
pub fn run_with_signal(
    root: &Path,
    opts: &PipelineOpts,
    cancel: &CancellationSignal,
    sink: &mut dyn Write,
) -> Result<PipelineReport> {
    let start = Instant::now();
    let PipelineHandles {
        counted,
        walk_task,
        filter_task,
    } = start_pipeline(root, opts, cancel)?;

    let mut report = PipelineReport::default();
    for result in &counted.lines {
        writeln!(sink, "{} {}", result.file.display(), result.lines).context("write result")?;
        report.total_lines += result.lines;
        report.files.push(result);
    }
    writeln!(sink, "Total lines: {}", report.total_lines).context("write total")?;

    for message in &counted.errors {
        writeln!(sink, "{message}").context("write error line")?;
        report.errors.push(message);
    }
    debug!(
        "pipeline: streams drained, {} files, {} errors",
        report.files.len(),
        report.errors.len()
    );

    let walk_result = walk_task.join();
    join_all([filter_task, counted.task])?;
    report.walk = walk_result?;
    report.cancelled = cancel.is_triggered();
    report.elapsed = start.elapsed();
    Ok(report)
}
