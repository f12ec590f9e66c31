//! Application configuration constants.
//! Tuning and defaults in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Settings file looked up in the working directory (e.g. `.chanflow.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Worker threads ----

/// Thread limits for the walk and counting pools.
/// Use [`WorkerThreadLimits::current()`] to fill `all_threads` from rayon; the rest are const.
#[derive(Clone, Copy, Debug)]
pub struct WorkerThreadLimits {
    /// Available threads (from rayon); set by [`WorkerThreadLimits::current()`].
    pub all_threads: usize,
    pub floor: usize,
    /// Directory listing is I/O bound; more workers than this rarely helps.
    pub walk_max: usize,
}

impl Default for WorkerThreadLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            floor: Self::FLOOR_THREADS,
            walk_max: Self::WALK_MAX_THREADS,
        }
    }
}

impl WorkerThreadLimits {
    pub const FLOOR_THREADS: usize = 2;
    pub const WALK_MAX_THREADS: usize = 16;

    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }

    /// Walk workers: available threads clamped to `[floor, walk_max]`.
    pub fn walk_workers(&self) -> usize {
        self.all_threads.clamp(self.floor, self.walk_max)
    }
}

// ---- Generator / sessions ----

/// Items a generator emits when no count is given.
pub const DEFAULT_GENERATE_COUNT: usize = 5;

/// Timings for the demo sessions.
pub struct SessionConsts;

impl SessionConsts {
    /// Upper bound (exclusive) on the jittered pause after each generated item.
    pub const MAX_DELAY: Duration = Duration::from_secs(3);
    /// Outer deadline for a whole session.
    pub const SESSION_DEADLINE: Duration = Duration::from_secs(60);
    /// `timeout` session: how long the consumer waits for the slow producer.
    pub const TIMEOUT_AFTER: Duration = Duration::from_secs(5);
    /// `quit` session: when the producer is told to say goodbye.
    pub const QUIT_AFTER: Duration = Duration::from_secs(5);
}

// ---- Pipeline ----

pub struct PipelineConsts;

impl PipelineConsts {
    pub const DEADLINE: Duration = Duration::from_secs(5);
    pub const EXTENSIONS: [&'static str; 4] = [".rs", ".toml", ".json", ".md"];
    /// Counting branches. 1 keeps results in walk order.
    pub const COUNTER_WORKERS: usize = 1;
}

// ---- Search ----

pub struct SearchConsts;

impl SearchConsts {
    pub const TERM: &'static str = "Jupyter";
    pub const SOURCES: [&'static str; 3] = ["Wikipedia", "Quora", "Everything2"];
    pub const TIMEOUT: Duration = Duration::from_secs(10);
    /// Each source answers after a delay in `[0, MAX_DELAY)`.
    pub const MAX_DELAY: Duration = Duration::from_secs(5);
}
