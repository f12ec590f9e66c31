//! Producer that synthesizes labelled messages into a stream.

use anyhow::Result;
use log::debug;

use super::cancel::CancellationSignal;
use super::jitter::Jitter;
use super::stream::{Stream, StreamReader};
use super::task::Task;
use crate::utils::config::DEFAULT_GENERATE_COUNT;

/// Emit `"{label} {i}"` for `i in 0..count` (default [`DEFAULT_GENERATE_COUNT`]) with a jittered
/// pause after each item. If `cancel` has fired before the next item, emit `"{label} says bye!"`
/// and stop. The output is closed on every exit path.
pub fn generate(
    label: &str,
    count: Option<usize>,
    cancel: &CancellationSignal,
    mut jitter: Jitter,
) -> Result<(StreamReader<String>, Task)> {
    let count = count.unwrap_or(DEFAULT_GENERATE_COUNT);
    let output = Stream::unbounded();
    let reader = output.reader();
    let label = label.to_string();
    let cancel = cancel.clone();

    let task = Task::spawn(format!("generate-{label}"), move || {
        let _close = output.close_on_drop();
        for i in 0..count {
            if cancel.is_triggered() {
                output.write(format!("{label} says bye!"))?;
                debug!("{label}: cancelled after {i} of {count}");
                return Ok(());
            }
            output.write(format!("{label} {i}"))?;
            cancel.sleep(jitter.next_delay());
        }
        debug!("{label}: sent all {count}");
        Ok(())
    })?;

    Ok((reader, task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn emits_count_items_then_closes() {
        let cancel = CancellationSignal::new();
        let (reader, task) = generate("Joe", Some(3), &cancel, Jitter::none()).unwrap();
        assert_eq!(reader.drain(), vec!["Joe 0", "Joe 1", "Joe 2"]);
        task.join().unwrap();
    }

    #[test]
    fn default_count_is_five() {
        let cancel = CancellationSignal::new();
        let (reader, _task) = generate("Ann", None, &cancel, Jitter::none()).unwrap();
        assert_eq!(reader.drain().len(), 5);
    }

    #[test]
    fn already_cancelled_says_bye_only() {
        let cancel = CancellationSignal::new();
        cancel.trigger();
        let (reader, _task) = generate("Joe", Some(10), &cancel, Jitter::none()).unwrap();
        assert_eq!(reader.drain(), vec!["Joe says bye!"]);
    }

    #[test]
    fn cancelled_midway_is_prefix_plus_farewell() {
        let cancel = CancellationSignal::with_timeout(Duration::from_millis(60));
        let jitter = Jitter::seeded(7, Duration::from_millis(40));
        let (reader, task) = generate("Joe", Some(1_000), &cancel, jitter).unwrap();
        let items = reader.drain();
        task.join().unwrap();

        let (last, prefix) = items.split_last().unwrap();
        assert_eq!(last, "Joe says bye!");
        assert!(prefix.len() < 1_000);
        for (i, item) in prefix.iter().enumerate() {
            assert_eq!(item, &format!("Joe {i}"));
        }
    }
}
