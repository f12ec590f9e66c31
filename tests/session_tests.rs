use chanflow::engine::{Cli, PipelineArgs, SessionCommand, run_session, setup_opts};
use chanflow::{CancellationSignal, Opts};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

fn fast_opts() -> Opts {
    Opts {
        seed: Some(17),
        max_delay: Duration::from_millis(5),
        search_max_delay: Duration::from_millis(5),
        ..Opts::default()
    }
}

fn run(session: SessionCommand, opts: &Opts) -> Vec<String> {
    let cancel = CancellationSignal::with_timeout(Duration::from_secs(30));
    let mut out = Vec::new();
    run_session(&session, opts, &cancel, &mut out).unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_basic_prints_five_messages() {
    let lines = run(SessionCommand::Basic, &fast_opts());
    let expected: Vec<String> = (0..5).map(|i| format!("Message {i}")).collect();
    assert_eq!(lines, expected);
}

#[test]
fn test_multiplex_keeps_each_generator_in_order() {
    let lines = run(SessionCommand::Multiplex, &fast_opts());
    assert_eq!(lines.len(), 3 + 5);
    let joe: Vec<&String> = lines.iter().filter(|l| l.starts_with("Joe")).collect();
    let ann: Vec<&String> = lines.iter().filter(|l| l.starts_with("Ann")).collect();
    assert_eq!(joe, ["Joe 0", "Joe 1", "Joe 2"]);
    assert_eq!(ann, ["Ann 0", "Ann 1", "Ann 2", "Ann 3", "Ann 4"]);
}

#[test]
fn test_demultiplex_routes_round_robin() {
    let lines = run(SessionCommand::Demultiplex, &fast_opts());
    assert_eq!(lines.len(), 10);
    for j in 0..10 {
        let want = format!("Reader {}: Joe {j}", j % 3);
        assert!(lines.contains(&want), "missing {want:?} in {lines:?}");
    }
}

#[test]
fn test_timeout_session_fast_producer_finishes() {
    let lines = run(SessionCommand::Timeout, &fast_opts());
    assert_eq!(lines.len(), 11);
    assert_eq!(lines[10], "Joe sent all of his messages.");
}

#[test]
fn test_search_session_outcomes() {
    let args = chanflow::engine::SearchArgs {
        term: Some("rust".to_string()),
        sources: vec!["A".to_string(), "B".to_string()],
        timeout: None,
    };
    let lines = run(SessionCommand::Search(args.clone()), &fast_opts());
    assert_eq!(lines.len(), 3);
    assert!(lines.contains(&"Result from A for rust".to_string()));
    assert_eq!(lines[2], "All searches have completed.");

    let slow = Opts {
        search_timeout: Duration::from_millis(1),
        search_max_delay: Duration::from_secs(30),
        ..fast_opts()
    };
    let lines = run(SessionCommand::Search(args), &slow);
    assert_eq!(lines.last().map(String::as_str), Some("Timeout."));
}

#[test]
fn test_pipeline_session_counts_lines() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.rs"), "1\n2\n").unwrap();
    fs::write(dir.path().join("b.toml"), "x = 1\n").unwrap();
    fs::write(dir.path().join("c.bin"), "zzz\n").unwrap();
    let args = PipelineArgs {
        dir: dir.path().to_path_buf(),
        deadline: None,
        extensions: Vec::new(),
        workers: None,
        counter_workers: None,
        exclude: Vec::new(),
        follow_links: None,
    };
    let lines = run(SessionCommand::Pipeline(args), &fast_opts());
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], "Total lines: 3");
}

#[test]
fn test_cli_flags_override_defaults() {
    let cli = Cli::try_parse_from([
        "chanflow", "pipeline", "src", "-x", ".rs", ".toml", "-d", "9", "-c", "2", "--seed", "4",
    ])
    .unwrap();
    let opts = setup_opts(&cli);
    assert_eq!(opts.seed, Some(4));
    assert_eq!(opts.pipeline.deadline, Duration::from_secs(9));
    assert_eq!(opts.pipeline.extensions, vec![".rs", ".toml"]);
    assert_eq!(opts.pipeline.counter_workers, 2);
    match cli.session {
        SessionCommand::Pipeline(args) => assert_eq!(args.dir, PathBuf::from("src")),
        other => panic!("unexpected session {other:?}"),
    }
}

#[test]
fn test_cli_search_defaults() {
    let cli = Cli::try_parse_from(["chanflow", "search"]).unwrap();
    match cli.session {
        SessionCommand::Search(args) => {
            assert!(args.term.is_none());
            assert!(args.sources.is_empty());
        }
        other => panic!("unexpected session {other:?}"),
    }
}
