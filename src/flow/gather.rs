//! Bounded-time "first k of n" gather over independently launched producers.
//!
//! Producers are detached: the consumer never joins them. They share the output [`Stream`] by
//! reference count, so a producer finishing after the consumer gave up still writes into a live
//! unbounded buffer and never blocks.

use anyhow::Result;
use log::{debug, info};
use std::time::{Duration, Instant};

use super::cancel::CancellationSignal;
use super::jitter::Jitter;
use super::stream::{RecvOutcome, Stream};
use super::task::Task;
use crate::SearchResult;
use crate::error::{FlowError, FlowResult};

/// Start producers with `launch`, then read exactly `k` items or fail with
/// [`FlowError::TimedOut`] once `timeout` elapses. The signal handed to producers is triggered
/// when this returns, so stragglers can stop early.
pub fn gather_first<T, F>(k: usize, timeout: Duration, launch: F) -> FlowResult<Vec<T>>
where
    F: FnOnce(&Stream<T>, &CancellationSignal),
{
    gather_first_each(k, timeout, launch, |_| {})
}

/// [`gather_first`], calling `on_item` for each item as it arrives (so partial results are
/// visible even when the gather times out).
pub fn gather_first_each<T, F, G>(
    k: usize,
    timeout: Duration,
    launch: F,
    mut on_item: G,
) -> FlowResult<Vec<T>>
where
    F: FnOnce(&Stream<T>, &CancellationSignal),
    G: FnMut(&T),
{
    let deadline = Instant::now() + timeout;
    let output = Stream::unbounded();
    let reader = output.reader();
    let cancel = CancellationSignal::with_deadline(deadline);

    launch(&output, &cancel);

    let mut items = Vec::with_capacity(k);
    let outcome = loop {
        if items.len() == k {
            break Ok(());
        }
        match reader.recv_deadline(deadline) {
            Ok(item) => {
                on_item(&item);
                items.push(item);
            }
            Err(RecvOutcome::Closed) => {
                break Err(FlowError::Exhausted {
                    wanted: k,
                    received: items.len(),
                });
            }
            Err(_) => {
                break Err(FlowError::TimedOut {
                    wanted: k,
                    received: items.len(),
                });
            }
        }
    };
    cancel.trigger();
    outcome.map(|()| items)
}

/// Query every source in parallel and keep the results that arrive within `timeout`.
/// Each source answers once, after a jittered delay.
pub fn search<G>(
    term: &str,
    sources: &[String],
    mut jitter: Jitter,
    timeout: Duration,
    on_result: G,
) -> FlowResult<Vec<SearchResult>>
where
    G: FnMut(&SearchResult),
{
    let launch = |output: &Stream<SearchResult>, cancel: &CancellationSignal| {
        for source in sources {
            let output = output.clone();
            let cancel = cancel.clone();
            let delay = jitter.next_delay();
            let source = source.clone();
            let term = term.to_string();
            let spawned = Task::spawn(format!("search-{source}"), move || {
                if !cancel.sleep(delay) {
                    debug!("{source}: abandoned");
                    return Ok(());
                }
                output.write(format!("Result from {source} for {term}"))?;
                Ok(())
            });
            // Detached: the gather only reads the shared output.
            if let Err(e) = spawned {
                log::warn!("{e:#}");
            }
        }
    };
    gather_first_each(sources.len(), timeout, launch, on_result)
        .inspect(|results| info!("all {} searches completed", results.len()))
}
