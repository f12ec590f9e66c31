//! Load `.chanflow.toml` from a directory (CLI only). Lib callers build [`Opts`] themselves.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChanflowToml {
    #[serde(default)]
    settings: Settings,
}

#[derive(Debug, Default, Deserialize)]
struct Settings {
    verbose: Option<bool>,
    seed: Option<u64>,
    max_delay_ms: Option<u64>,
    deadline_secs: Option<u64>,
    extensions: Option<Vec<String>>,
    workers: Option<usize>,
    counter_workers: Option<usize>,
    exclude: Option<Vec<String>>,
    follow_links: Option<bool>,
    search_timeout_secs: Option<u64>,
}

/// Load the settings file from `dir` if present. Returns None if missing or unreadable.
pub(crate) fn load_chanflow_toml(dir: &Path) -> Option<ChanflowToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_chanflow_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub(crate) fn parse_chanflow_toml(s: &str) -> Result<ChanflowToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($file:expr, $opts:expr, $file_field:ident => $($opts_field:ident).+) => {
        if let Some(v) = $file.$file_field.clone() {
            $opts.$($opts_field).+ = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub(crate) fn apply_file_to_opts(file: &ChanflowToml, opts: &mut Opts) {
    let s = &file.settings;
    apply_file_opt!(s, opts, verbose => verbose);
    if s.seed.is_some() {
        opts.seed = s.seed;
    }
    if let Some(ms) = s.max_delay_ms {
        opts.max_delay = Duration::from_millis(ms);
    }
    if let Some(secs) = s.deadline_secs {
        opts.pipeline.deadline = Duration::from_secs(secs);
    }
    apply_file_opt!(s, opts, extensions => pipeline.extensions);
    apply_file_opt!(s, opts, workers => pipeline.walk.workers);
    apply_file_opt!(s, opts, counter_workers => pipeline.counter_workers);
    apply_file_opt!(s, opts, exclude => pipeline.walk.exclude);
    apply_file_opt!(s, opts, follow_links => pipeline.walk.follow_links);
    if let Some(secs) = s.search_timeout_secs {
        opts.search_timeout = Duration::from_secs(secs);
    }
}
