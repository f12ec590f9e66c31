//! Parallel directory walk: a fixed pool of workers sharing a queue of pending directories.
//!
//! Each worker takes a directory, writes its files to the output, then queues its
//! subdirectories. `pending` counts queued plus in-progress directories; the worker that brings
//! it to zero closes the queue so every worker's `recv` ends.

use anyhow::Result;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::engine::tools::{check_walk_root, should_visit};
use crate::flow::{CancellationSignal, Stream, StreamReader, Task, join_all};
use crate::{WalkOpts, WalkSummary};

/// State shared by every walk worker.
struct WalkContext {
    output: Stream<PathBuf>,
    queue: Stream<PathBuf>,
    pending: AtomicUsize,
    cancel: CancellationSignal,
    cancelled: AtomicBool,
    follow_links: bool,
    exclude: Vec<String>,
    files: AtomicUsize,
    dirs: AtomicUsize,
    skipped: Mutex<Vec<(PathBuf, String)>>,
    /// Canonical directories already queued; only tracked when following links.
    seen: Mutex<HashSet<PathBuf>>,
}

impl WalkContext {
    fn new(output: Stream<PathBuf>, cancel: &CancellationSignal, opts: &WalkOpts) -> Self {
        Self {
            output,
            queue: Stream::unbounded(),
            pending: AtomicUsize::new(0),
            cancel: cancel.clone(),
            cancelled: AtomicBool::new(false),
            follow_links: opts.follow_links,
            exclude: opts.exclude.clone(),
            files: AtomicUsize::new(0),
            dirs: AtomicUsize::new(0),
            skipped: Mutex::new(Vec::new()),
            seen: Mutex::new(HashSet::new()),
        }
    }
}

/// Children of one directory, split by kind.
#[derive(Default)]
struct Listing {
    files: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
}

/// Walk `root` and stream every file path under it. The output closes once the whole walk has
/// finished or been cancelled; the task returns what the walk saw. Fails immediately if `root`
/// is not a readable directory.
pub fn walk(
    root: &Path,
    cancel: &CancellationSignal,
    opts: &WalkOpts,
) -> Result<(StreamReader<PathBuf>, Task<WalkSummary>)> {
    check_walk_root(root)?;
    let output = Stream::unbounded();
    let reader = output.reader();
    let ctx = Arc::new(WalkContext::new(output, cancel, opts));
    let root = root.to_path_buf();
    let workers = opts.workers.max(1);

    let task = Task::spawn("walk", move || {
        let _close = ctx.output.close_on_drop();
        run_walk(&ctx, vec![root], workers)?;
        let summary = WalkSummary {
            files: ctx.files.load(Ordering::SeqCst),
            dirs: ctx.dirs.load(Ordering::SeqCst),
            skipped: std::mem::take(&mut *ctx.skipped.lock().unwrap_or_else(PoisonError::into_inner)),
            cancelled: ctx.cancelled.load(Ordering::SeqCst),
        };
        if summary.cancelled {
            info!("Walk cancelled after {} files", summary.files);
        }
        if !summary.skipped.is_empty() {
            warn!(
                "Skipped {} directories due to permission errors or access issues",
                summary.skipped.len()
            );
        }
        debug!(
            "walk: {} files in {} directories",
            summary.files, summary.dirs
        );
        Ok(summary)
    })?;

    Ok((reader, task))
}

/// Run the worker pool until every directory reachable from `roots` has been visited.
fn run_walk(ctx: &Arc<WalkContext>, roots: Vec<PathBuf>, workers: usize) -> Result<()> {
    if roots.is_empty() {
        return Ok(());
    }
    ctx.pending.store(roots.len(), Ordering::SeqCst);
    for root in roots {
        if ctx.follow_links
            && let Ok(canonical) = root.canonicalize()
        {
            lock_seen(ctx).insert(canonical);
        }
        ctx.queue.write(root)?;
    }

    let handles = (0..workers)
        .map(|i| {
            let ctx = Arc::clone(ctx);
            Task::spawn(format!("walk-{i}"), move || walk_worker_loop(&ctx))
        })
        .collect::<Result<Vec<_>>>();
    let handles = match handles {
        Ok(h) => h,
        Err(e) => {
            // Let any workers that did start drain out before reporting.
            ctx.queue.close();
            return Err(e);
        }
    };
    join_all(handles)?;
    Ok(())
}

fn walk_worker_loop(ctx: &WalkContext) -> Result<()> {
    // A worker only leaves normally once the queue is closed and drained; on any other exit
    // the queue must close too or the remaining workers wait forever.
    let _close = ctx.queue.close_on_drop();
    let queue = ctx.queue.reader();
    while let Some(dir) = queue.recv() {
        let visited = visit_dir(ctx, &dir);
        if ctx.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            ctx.queue.close();
        }
        visited?;
    }
    Ok(())
}

/// Check-point, list, emit files, queue subdirectories.
fn visit_dir(ctx: &WalkContext, dir: &Path) -> Result<()> {
    if ctx.cancel.is_triggered() {
        if !ctx.cancelled.swap(true, Ordering::SeqCst) {
            debug!("walk: cancellation observed at {}", dir.display());
        }
        // Stop handing out work; queued directories drain through this same check.
        ctx.queue.close();
        return Ok(());
    }
    let listing = match list_entries(ctx, dir) {
        Ok(listing) => listing,
        Err(e) => {
            warn!("Cannot list {}: {}", dir.display(), e);
            ctx.skipped
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((dir.to_path_buf(), e.to_string()));
            return Ok(());
        }
    };
    ctx.dirs.fetch_add(1, Ordering::SeqCst);

    for file in listing.files {
        ctx.output.write(file)?;
        ctx.files.fetch_add(1, Ordering::SeqCst);
    }
    for sub in listing.dirs {
        ctx.pending.fetch_add(1, Ordering::SeqCst);
        if ctx.queue.write(sub).is_err() {
            // Queue closed by cancellation; this subtree is never visited.
            ctx.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }
    Ok(())
}

fn list_entries(ctx: &WalkContext, dir: &Path) -> std::io::Result<Listing> {
    let mut entries = fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut listing = Listing::default();
    for entry in entries {
        let name = entry.file_name();
        if !should_visit(&name.to_string_lossy(), &ctx.exclude) {
            continue;
        }
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if ctx.follow_links && !first_visit(ctx, &path) {
                continue;
            }
            listing.dirs.push(path);
        } else if file_type.is_file() {
            listing.files.push(path);
        } else if file_type.is_symlink() {
            // Links to files are always listed; links to directories only when following links.
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => listing.files.push(path),
                Ok(meta) if meta.is_dir() => {
                    if ctx.follow_links && first_visit(ctx, &path) {
                        listing.dirs.push(path);
                    }
                }
                Ok(_) => {}
                Err(e) => debug!("walk: dangling link {}: {}", path.display(), e),
            }
        }
    }
    Ok(listing)
}

/// Guards against link cycles: true the first time a canonical directory is seen.
fn first_visit(ctx: &WalkContext, dir: &Path) -> bool {
    match dir.canonicalize() {
        Ok(canonical) => lock_seen(ctx).insert(canonical),
        Err(_) => false,
    }
}

fn lock_seen(ctx: &WalkContext) -> std::sync::MutexGuard<'_, HashSet<PathBuf>> {
    ctx.seen.lock().unwrap_or_else(PoisonError::into_inner)
}
