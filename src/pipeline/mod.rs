//! Pipeline components: walk, extension filter, line counter, orchestration.

pub mod filter;
pub mod line_count;
pub mod orchestrator;
pub mod walk;

pub use filter::{filter, filter_by_extension};
pub use line_count::{
    CountedStreams, count_file_lines, count_lines, count_lines_parallel, empty_file_message,
};
pub use orchestrator::{PipelineHandles, run, run_with_signal, start_pipeline};
pub use walk::walk;
