use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

use crate::utils::config::PackagePaths;

/// Initialise logging: this crate at Debug when `verbose`, Info otherwise; dependencies at Warn.
/// `RUST_LOG` still applies. Lines below Info carry the emitting thread (`walk-3`,
/// `count-lines-0`, ...). Only the first call installs a logger.
pub fn setup_logging(verbose: bool) {
    let name = PackagePaths::get().pkg_name();
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(name, level)
        .format(move |buf, record| {
            let thread = std::thread::current();
            let thread = thread.name().unwrap_or("?");
            let tag = name.cyan();
            match record.level() {
                Level::Error => writeln!(buf, "[{tag} {} {thread}] {}", "ERROR".red(), record.args()),
                Level::Warn => {
                    writeln!(buf, "[{tag} {} {thread}] {}", "WARN".yellow(), record.args())
                }
                Level::Info => writeln!(buf, "[{tag}] {}", record.args()),
                Level::Debug | Level::Trace => {
                    writeln!(buf, "[{tag} {}] {}", thread.dimmed(), record.args())
                }
            }
        })
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_setup_is_harmless() {
        setup_logging(true);
        setup_logging(false);
        assert_eq!(PackagePaths::get().pkg_name(), "chanflow");
        log::debug!("logger installed");
    }
}
