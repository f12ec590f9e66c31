//! Order-preserving predicate stage.

use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::FileTask;
use crate::engine::tools::{extension_set, has_extension};
use crate::flow::{Stream, StreamReader, Task};

/// Forward the items of `input` for which `keep` returns true. Output closes after input drains.
pub fn filter<T, P>(input: StreamReader<T>, mut keep: P) -> Result<(StreamReader<T>, Task)>
where
    T: Send + 'static,
    P: FnMut(&T) -> bool + Send + 'static,
{
    let output = Stream::unbounded();
    let reader = output.reader();
    let task = Task::spawn("filter", move || {
        let _close = output.close_on_drop();
        let (mut kept, mut dropped) = (0_usize, 0_usize);
        for item in input {
            if keep(&item) {
                output.write(item)?;
                kept += 1;
            } else {
                dropped += 1;
            }
        }
        debug!("filter: kept {kept}, dropped {dropped}");
        Ok(())
    })?;
    Ok((reader, task))
}

/// Keep paths whose extension is in `extensions` (`".rs"` or `"rs"`). Others are dropped
/// silently.
pub fn filter_by_extension<S: AsRef<str>>(
    input: StreamReader<PathBuf>,
    extensions: &[S],
) -> Result<(StreamReader<FileTask>, Task)> {
    let allowed = extension_set(extensions);
    filter(input, move |path: &PathBuf| has_extension(path, &allowed))
}
