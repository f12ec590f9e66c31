//! Public and internal types for the chanflow API and pipeline.

use std::path::PathBuf;
use std::time::Duration;

use crate::flow::Jitter;
use crate::utils::config::{PipelineConsts, SearchConsts, SessionConsts, WorkerThreadLimits};

/// Candidate file produced by the walk and accepted by the extension filter.
pub type FileTask = PathBuf;

/// Soft error reported on a line counter's error stream, e.g. `"[Error] Empty file a.rs"`.
pub type ErrorMessage = String;

/// Synthetic search answer tagged with its source and term.
pub type SearchResult = String;

/// A file with at least one line, and how many it has.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineCount {
    pub file: FileTask,
    pub lines: usize,
}

/// Options for [`walk`](crate::pipeline::walk::walk).
#[derive(Clone, Debug)]
pub struct WalkOpts {
    /// Directory-listing workers sharing the pending-directory queue.
    pub workers: usize,
    /// Follow symbolic links to directories.
    pub follow_links: bool,
    /// Exclude patterns (glob syntax, e.g. `target`, `*.log`) matched against entry names.
    pub exclude: Vec<String>,
}

/// What a finished walk saw.
#[derive(Clone, Debug, Default)]
pub struct WalkSummary {
    /// File paths written to the output.
    pub files: usize,
    pub dirs: usize,
    /// Directories that could not be listed, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
    /// True when the cancellation signal stopped the walk.
    pub cancelled: bool,
}

/// Full options for one pipeline run.
#[derive(Clone, Debug)]
pub struct PipelineOpts {
    /// Cancellation deadline measured from the start of the run.
    pub deadline: Duration,
    /// Accepted extensions, with or without the leading dot.
    pub extensions: Vec<String>,
    pub walk: WalkOpts,
    /// Line-counting branches. 1 keeps results in walk order.
    pub counter_workers: usize,
}

/// Outcome of [`run`](crate::pipeline::orchestrator::run).
#[derive(Clone, Debug, Default)]
pub struct PipelineReport {
    pub total_lines: usize,
    pub files: Vec<LineCount>,
    pub errors: Vec<ErrorMessage>,
    pub walk: WalkSummary,
    /// True when the deadline (or Ctrl+C) fired during the run.
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl Default for WalkOpts {
    fn default() -> Self {
        Self {
            workers: WorkerThreadLimits::current().walk_workers(),
            follow_links: false,
            exclude: Vec::new(),
        }
    }
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            deadline: PipelineConsts::DEADLINE,
            extensions: PipelineConsts::EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            walk: WalkOpts::default(),
            counter_workers: PipelineConsts::COUNTER_WORKERS,
        }
    }
}

/// Full options (CLI and `.chanflow.toml`). Defaults, then file, then flags.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Debug-level logging for this crate.
    pub verbose: bool,
    /// Seed for every jittered delay; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Upper bound on a generator's pause between items.
    pub max_delay: Duration,
    pub pipeline: PipelineOpts,
    pub search_timeout: Duration,
    pub search_max_delay: Duration,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            verbose: false,
            seed: None,
            max_delay: SessionConsts::MAX_DELAY,
            pipeline: PipelineOpts::default(),
            search_timeout: SearchConsts::TIMEOUT,
            search_max_delay: SearchConsts::MAX_DELAY,
        }
    }
}

impl Opts {
    /// Delay source for generators, seeded from `seed` when set.
    pub fn jitter(&self) -> Jitter {
        self.jitter_with(self.max_delay)
    }

    pub fn jitter_with(&self, max_delay: Duration) -> Jitter {
        match self.seed {
            Some(seed) => Jitter::seeded(seed, max_delay),
            None => Jitter::from_entropy(max_delay),
        }
    }
}
