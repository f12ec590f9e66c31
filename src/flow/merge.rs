//! Fan-in: many input streams into one.

use anyhow::Result;
use log::debug;

use super::stream::{Stream, StreamReader};
use super::task::{Task, join_all};

/// Forward every item of every input into one output. Order within an input is kept; order
/// across inputs follows scheduling. The output is closed only after every forwarder has
/// finished, and the returned task reports the first forwarder failure after joining them all.
pub fn merge<T: Send + 'static>(inputs: Vec<StreamReader<T>>) -> Result<(StreamReader<T>, Task)> {
    let output = Stream::unbounded();
    let reader = output.reader();
    let close = output.close_on_drop();
    let n = inputs.len();

    let forwarders = inputs
        .into_iter()
        .enumerate()
        .map(|(i, input)| {
            let output = output.clone();
            Task::spawn(format!("merge-{i}"), move || {
                for item in input {
                    output.write(item)?;
                }
                Ok(())
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let task = Task::spawn("merge", move || {
        let _close = close;
        join_all(forwarders)?;
        debug!("merge: all {n} inputs drained");
        Ok(())
    })?;

    Ok((reader, task))
}
