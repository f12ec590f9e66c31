//! Closable, ordered transport between concurrently running tasks.
//!
//! A [`Stream`] is the writer-side handle: clone it to give several producers the same output.
//! [`Stream::close`] drops the only underlying `Sender`, so readers drain what is buffered and
//! then see end-of-stream. A [`StreamReader`] is the consumer side; clones share one queue, so
//! every item is delivered to exactly one reader.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, select, unbounded};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use super::cancel::CancellationSignal;
use crate::error::{FlowError, FlowResult};

struct Shared<T> {
    tx: RwLock<Option<Sender<T>>>,
    rx: Receiver<T>,
}

pub struct Stream<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Stream<T> {
    fn from_channel(tx: Sender<T>, rx: Receiver<T>) -> Self {
        Self {
            shared: Arc::new(Shared {
                tx: RwLock::new(Some(tx)),
                rx,
            }),
        }
    }

    /// Stream whose writes never block on capacity.
    pub fn unbounded() -> Self {
        let (tx, rx) = unbounded();
        Self::from_channel(tx, rx)
    }

    /// Stream whose writes block while `cap` items are buffered.
    pub fn bounded(cap: usize) -> Self {
        let (tx, rx) = bounded(cap);
        Self::from_channel(tx, rx)
    }

    /// Append `item`. Fails with [`FlowError::Closed`] once the stream has been closed.
    /// On a bounded stream this blocks while full; the lock is released first, so [`Self::close`]
    /// never waits on a blocked writer.
    pub fn write(&self, item: T) -> FlowResult<()> {
        let tx = self
            .shared
            .tx
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(FlowError::Closed)?;
        tx.send(item).map_err(|_| FlowError::Closed)
    }

    /// Signal that no more items will be written. Idempotent.
    pub fn close(&self) {
        self.shared
            .tx
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_closed(&self) -> bool {
        self.shared
            .tx
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Items buffered and not yet read.
    pub fn len(&self) -> usize {
        self.shared.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.rx.is_empty()
    }

    pub fn reader(&self) -> StreamReader<T> {
        StreamReader {
            rx: self.shared.rx.clone(),
        }
    }

    /// Guard that closes this stream when dropped, including while unwinding from a panic.
    pub fn close_on_drop(&self) -> CloseGuard<T> {
        CloseGuard {
            stream: self.clone(),
        }
    }
}

/// Closes its stream on drop. See [`Stream::close_on_drop`].
pub struct CloseGuard<T> {
    stream: Stream<T>,
}

impl<T> Drop for CloseGuard<T> {
    fn drop(&mut self) {
        self.stream.close();
    }
}

/// Why a bounded or cancellable read returned without an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvOutcome {
    /// Writer closed and buffer drained.
    Closed,
    TimedOut,
    Cancelled,
}

pub struct StreamReader<T> {
    rx: Receiver<T>,
}

impl<T> Clone for StreamReader<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<T> StreamReader<T> {
    /// Next item, blocking until one arrives. `None` once closed and drained.
    pub fn recv(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    pub fn recv_deadline(&self, deadline: Instant) -> Result<T, RecvOutcome> {
        self.rx.recv_deadline(deadline).map_err(|e| match e {
            RecvTimeoutError::Timeout => RecvOutcome::TimedOut,
            RecvTimeoutError::Disconnected => RecvOutcome::Closed,
        })
    }

    /// Next item unless `cancel` fires first. A buffered item is always preferred over an
    /// already-fired signal so committed work is not lost.
    pub fn recv_cancellable(&self, cancel: &CancellationSignal) -> Result<T, RecvOutcome> {
        if let Ok(item) = self.rx.try_recv() {
            return Ok(item);
        }
        if cancel.is_triggered() {
            return Err(RecvOutcome::Cancelled);
        }
        let deadline = cancel.deadline_timer();
        select! {
            recv(self.rx) -> item => item.map_err(|_| RecvOutcome::Closed),
            recv(cancel.fired()) -> _ => Err(RecvOutcome::Cancelled),
            recv(deadline) -> _ => {
                cancel.trigger();
                Err(RecvOutcome::Cancelled)
            }
        }
    }

    /// Blocking iterator that ends when the stream is closed and drained.
    pub fn iter(&self) -> crossbeam_channel::Iter<'_, T> {
        self.rx.iter()
    }

    /// Read everything until end-of-stream.
    pub fn drain(&self) -> Vec<T> {
        self.rx.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> IntoIterator for StreamReader<T> {
    type Item = T;
    type IntoIter = crossbeam_channel::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rx.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a StreamReader<T> {
    type Item = T;
    type IntoIter = crossbeam_channel::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rx.iter()
    }
}
