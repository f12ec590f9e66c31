//! chanflow: closable streams, fan-in/fan-out, a parallel directory walk feeding a line-count
//! pipeline, and bounded-time gathers, all with cooperative cancellation.

pub mod engine;
pub mod error;
pub mod flow;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use error::{FlowError, FlowResult};
pub use flow::{CancellationSignal, Jitter, Stream, StreamReader, Task};

/// Result alias used by public chanflow API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Count lines under `root` with default options except `deadline`, writing the report lines to
/// `sink`. See [`pipeline::run`] for the output format.
///
/// ```ignore
/// let report = chanflow::count_lines_under(Path::new("."), Duration::from_secs(5), &mut std::io::stdout())?;
/// println!("{}", report.total_lines);
/// ```
pub fn count_lines_under(
    root: &std::path::Path,
    deadline: std::time::Duration,
    sink: &mut dyn std::io::Write,
) -> Result<PipelineReport> {
    let opts = PipelineOpts {
        deadline,
        ..PipelineOpts::default()
    };
    pipeline::run(root, &opts, sink)
}
