//! Fan-out: one input stream dealt round-robin across `n` outputs.

use anyhow::Result;
use log::debug;

use super::stream::{Stream, StreamReader};
use super::task::Task;
use crate::error::FlowError;

/// Item `i` of `input` goes to output `i % n`. All outputs close once `input` is drained.
/// `n == 0` is rejected with [`FlowError::InvalidArgument`].
pub fn split<T: Send + 'static>(
    input: StreamReader<T>,
    n: usize,
) -> Result<(Vec<StreamReader<T>>, Task)> {
    if n == 0 {
        return Err(FlowError::InvalidArgument("split needs at least one output".into()).into());
    }
    let outputs: Vec<Stream<T>> = (0..n).map(|_| Stream::unbounded()).collect();
    let readers = outputs.iter().map(Stream::reader).collect();

    let task = Task::spawn("split", move || {
        let _close: Vec<_> = outputs.iter().map(Stream::close_on_drop).collect();
        let mut index = 0;
        let mut routed = 0_usize;
        for item in input {
            outputs[index].write(item)?;
            index = (index + 1) % n;
            routed += 1;
        }
        debug!("split: routed {routed} items across {n} outputs");
        Ok(())
    })?;

    Ok((readers, task))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_outputs_is_invalid() {
        let s = Stream::<u8>::unbounded();
        let err = split(s.reader(), 0).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<FlowError>(),
            Some(FlowError::InvalidArgument(_))
        ));
    }

    #[test]
    fn single_output_passes_everything_through() {
        let s = Stream::unbounded();
        for i in 0..4 {
            s.write(i).unwrap();
        }
        s.close();
        let (outs, task) = split(s.reader(), 1).unwrap();
        assert_eq!(outs[0].drain(), vec![0, 1, 2, 3]);
        task.join().unwrap();
    }
}
