//! CLI command handler: build options (defaults → `.chanflow.toml` → flags), then run the session.

use anyhow::Result;
use log::debug;
use std::io::Write;
use std::time::Duration;

use crate::Opts;
use crate::engine::arg_parser::{Cli, PipelineArgs, SearchArgs, SessionCommand};
use crate::engine::sessions;
use crate::flow::CancellationSignal;
use crate::utils::chanflow_toml::{apply_file_to_opts, load_chanflow_toml};
use crate::utils::config::{SearchConsts, SessionConsts};
use crate::utils::setup_logging;

fn apply_pipeline_args(args: &PipelineArgs, opts: &mut Opts) {
    let p = &mut opts.pipeline;
    if let Some(secs) = args.deadline {
        p.deadline = Duration::from_secs(secs);
    }
    if !args.extensions.is_empty() {
        p.extensions = args.extensions.clone();
    }
    if let Some(n) = args.workers {
        p.walk.workers = n.max(1);
    }
    if let Some(n) = args.counter_workers {
        p.counter_workers = n.max(1);
    }
    if !args.exclude.is_empty() {
        p.walk.exclude = args.exclude.clone();
    }
    if let Some(v) = args.follow_links {
        p.walk.follow_links = v;
    }
}

fn apply_search_args(args: &SearchArgs, opts: &mut Opts) {
    if let Some(secs) = args.timeout {
        opts.search_timeout = Duration::from_secs(secs);
    }
}

/// Resolve options for `cli`. The settings file is read from the working directory.
pub fn setup_opts(cli: &Cli) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = load_chanflow_toml(std::path::Path::new(".")) {
        apply_file_to_opts(&file, &mut opts);
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    if cli.seed.is_some() {
        opts.seed = cli.seed;
    }
    if let Some(ms) = cli.max_delay_ms {
        opts.max_delay = Duration::from_millis(ms);
    }
    match &cli.session {
        SessionCommand::Pipeline(args) => apply_pipeline_args(args, &mut opts),
        SessionCommand::Search(args) => apply_search_args(args, &mut opts),
        _ => {}
    }
    opts
}

/// Run the selected session against stdout. Ctrl+C cancels the session cooperatively.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli);
    setup_logging(opts.verbose);
    debug!("{} CONFIG:{:#?}", env!("CARGO_PKG_NAME").to_uppercase(), opts);

    let cancel = CancellationSignal::with_timeout(SessionConsts::SESSION_DEADLINE);
    cancel.trigger_on_ctrlc()?;

    let stdout = std::io::stdout();
    let mut sink = stdout.lock();
    run_session(&cli.session, &opts, &cancel, &mut sink)?;
    sink.flush()?;
    Ok(())
}

/// Dispatch one session.
pub fn run_session(
    session: &SessionCommand,
    opts: &Opts,
    cancel: &CancellationSignal,
    sink: &mut dyn Write,
) -> Result<()> {
    match session {
        SessionCommand::Basic => sessions::basic(opts, cancel, sink),
        SessionCommand::Generator => sessions::generator(opts, cancel, sink),
        SessionCommand::Multiplex => sessions::multiplex(opts, cancel, sink),
        SessionCommand::Demultiplex => sessions::demultiplex(opts, cancel, sink),
        SessionCommand::Timeout => sessions::timeout(opts, cancel, sink),
        SessionCommand::Quit => sessions::quit(opts, cancel, sink),
        SessionCommand::Pipeline(args) => {
            sessions::pipeline(&args.dir, opts, cancel, sink).map(|_| ())
        }
        SessionCommand::Search(args) => {
            let term = args.term.as_deref().unwrap_or(SearchConsts::TERM);
            let sources = if args.sources.is_empty() {
                sessions::default_sources()
            } else {
                args.sources.clone()
            };
            sessions::search_sources(term, &sources, opts, sink)
        }
    }
}
