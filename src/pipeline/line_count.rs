//! Line counting stage: files in, `(file, lines)` out, soft errors on a separate stream.

use anyhow::Result;
use log::debug;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::flow::{
    CancellationSignal, RecvOutcome, Stream, StreamReader, Task, join_all, split,
};
use crate::{ErrorMessage, FileTask, LineCount};

/// Output side of a counting stage. `lines` and `errors` close together when `task` finishes.
pub struct CountedStreams {
    pub lines: StreamReader<LineCount>,
    pub errors: StreamReader<ErrorMessage>,
    pub task: Task,
}

/// Newline-delimited lines in `path`; a trailing line without a newline counts. A file that no
/// longer exists counts as 0. Stops early (partial count) once `cancel` fires.
pub fn count_file_lines(path: &Path, cancel: &CancellationSignal) -> io::Result<usize> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    let mut lines = 0;
    for line in BufReader::new(file).split(b'\n') {
        line?;
        lines += 1;
        if cancel.is_triggered() {
            break;
        }
    }
    Ok(lines)
}

pub fn empty_file_message(path: &Path) -> ErrorMessage {
    format!("[Error] Empty file {}", path.display())
}

pub fn unreadable_file_message(path: &Path, err: &io::Error) -> ErrorMessage {
    format!("[Error] Cannot read {}: {}", path.display(), err)
}

/// Count each file of `input` in arrival order. Empty files and unreadable files go to `errors`;
/// the rest to `lines`. Stops taking new files once `cancel` fires.
pub fn count_lines(
    input: StreamReader<FileTask>,
    cancel: &CancellationSignal,
) -> Result<CountedStreams> {
    let lines = Stream::unbounded();
    let errors = Stream::unbounded();
    let (lines_rx, errors_rx) = (lines.reader(), errors.reader());
    let cancel = cancel.clone();
    let task = Task::spawn("count-lines", move || {
        let _close = (lines.close_on_drop(), errors.close_on_drop());
        let n = count_loop(&input, &cancel, &lines, &errors)?;
        debug!("count-lines: {n} files counted");
        Ok(())
    })?;
    Ok(CountedStreams {
        lines: lines_rx,
        errors: errors_rx,
        task,
    })
}

/// Deal `input` across `workers` counting branches (via [`split`]) that share one pair of
/// outputs. Results are not in walk order. `workers <= 1` is [`count_lines`].
pub fn count_lines_parallel(
    input: StreamReader<FileTask>,
    workers: usize,
    cancel: &CancellationSignal,
) -> Result<CountedStreams> {
    if workers <= 1 {
        return count_lines(input, cancel);
    }
    let lines = Stream::unbounded();
    let errors = Stream::unbounded();
    let close = (lines.close_on_drop(), errors.close_on_drop());
    let (branches, split_task) = split(input, workers)?;

    let counters = branches
        .into_iter()
        .enumerate()
        .map(|(i, branch)| {
            let (cancel, lines, errors) = (cancel.clone(), lines.clone(), errors.clone());
            Task::spawn(format!("count-lines-{i}"), move || {
                count_loop(&branch, &cancel, &lines, &errors).map(|_| ())
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let task = Task::spawn("count-lines", move || {
        let _close = close;
        let split_result = split_task.join();
        join_all(counters)?;
        split_result
    })?;
    Ok(CountedStreams {
        lines: lines.reader(),
        errors: errors.reader(),
        task,
    })
}

fn count_loop(
    input: &StreamReader<FileTask>,
    cancel: &CancellationSignal,
    lines: &Stream<LineCount>,
    errors: &Stream<ErrorMessage>,
) -> Result<usize> {
    let mut counted = 0;
    loop {
        if cancel.is_triggered() {
            debug!("count-lines: cancelled after {counted} files");
            break;
        }
        let file = match input.recv_cancellable(cancel) {
            Ok(file) => file,
            Err(RecvOutcome::Closed) => break,
            Err(_) => continue,
        };
        match count_file_lines(&file, cancel) {
            Ok(0) => errors.write(empty_file_message(&file))?,
            Ok(n) => lines.write(LineCount { file, lines: n })?,
            Err(e) => errors.write(unreadable_file_message(&file, &e))?,
        }
        counted += 1;
    }
    Ok(counted)
}
