use clap::{Parser, Subcommand};
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
}

/// Concurrent pipeline toolkit: run one of the stream demos or the line-count pipeline.
#[derive(Clone, Parser)]
#[command(name = "chanflow")]
#[command(about = "Run a stream session; `pipeline` counts lines under a directory.")]
pub struct Cli {
    #[command(subcommand)]
    pub session: SessionCommand,

    /// Verbose output.
    #[arg(long, short = 'v', global = true, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Seed for jittered delays (reproducible runs).
    #[arg(long, short = 's', global = true)]
    pub seed: Option<u64>,

    /// Upper bound on the pause after each generated item, in milliseconds.
    #[arg(long, global = true)]
    pub max_delay_ms: Option<u64>,
}

#[derive(Clone, Debug, Subcommand)]
pub enum SessionCommand {
    /// One producer, one consumer over a single stream.
    Basic,
    /// Read everything a generator emits.
    Generator,
    /// Merge two generators into one stream.
    Multiplex,
    /// Split one generator round-robin across three readers.
    Demultiplex,
    /// Give up on a slow generator after a few seconds.
    Timeout,
    /// Tell a generator to stop; it says goodbye first.
    Quit,
    /// Walk DIR, keep matching extensions, count lines, print the total.
    Pipeline(PipelineArgs),
    /// Query several sources in parallel and keep what arrives before the timeout.
    Search(SearchArgs),
}

#[derive(Clone, Debug, clap::Args)]
pub struct PipelineArgs {
    /// Directory to walk. Default: current directory.
    #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
    pub dir: PathBuf,

    /// Cancellation deadline in seconds.
    #[arg(long, short = 'd')]
    pub deadline: Option<u64>,

    /// Extensions to count (with or without the dot). Can specify multiple: -x .rs .toml
    #[arg(long = "ext", short = 'x', num_args = 1..)]
    pub extensions: Vec<String>,

    /// Directory-walk worker threads.
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Line-counting branches (results unordered when > 1).
    #[arg(long, short = 'c')]
    pub counter_workers: Option<usize>,

    /// Exclude patterns (glob syntax) matched against entry names. Can specify multiple.
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Follow symbolic links.
    #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,
}

#[derive(Clone, Debug, clap::Args)]
pub struct SearchArgs {
    /// Search term.
    #[arg(value_name = "TERM")]
    pub term: Option<String>,

    /// Sources to query. Can specify multiple.
    #[arg(long, num_args = 1..)]
    pub sources: Vec<String>,

    /// Give up after this many seconds.
    #[arg(long, short = 't')]
    pub timeout: Option<u64>,
}
