//! Engine module: CLI parsing, session dispatch, and path helpers.

pub mod arg_parser;
pub mod cli;
pub mod sessions;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::{Cli, PipelineArgs, SearchArgs, SessionCommand};
pub use cli::{handle_run, run_session, setup_opts};
pub use tools::{
    extension_set, file_extension, glob_match, has_extension, normalize_extension, should_visit,
};
