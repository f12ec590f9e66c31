//! Cooperative cancellation shared by every task taking part in one operation.
//!
//! A [`CancellationSignal`] goes from armed to triggered exactly once, either through
//! [`CancellationSignal::trigger`] or because its deadline elapsed. Tasks observe it at their own
//! check-points; nothing is preempted.

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, after, at, bounded, never, select};
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

struct Shared {
    triggered: AtomicBool,
    deadline: Mutex<Option<Instant>>,
    /// Dropped on trigger; every clone of `fired_rx` then sees a disconnect and wakes.
    fired_tx: Mutex<Option<Sender<()>>>,
    fired_rx: Receiver<()>,
}

#[derive(Clone)]
pub struct CancellationSignal {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for CancellationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationSignal")
            .field("triggered", &self.is_triggered())
            .field("deadline", &self.deadline())
            .finish()
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CancellationSignal {
    /// Armed signal with no deadline; fires only through [`Self::trigger`].
    pub fn new() -> Self {
        let (fired_tx, fired_rx) = bounded::<()>(0);
        Self {
            shared: Arc::new(Shared {
                triggered: AtomicBool::new(false),
                deadline: Mutex::new(None),
                fired_tx: Mutex::new(Some(fired_tx)),
                fired_rx,
            }),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        let signal = Self::new();
        *lock(&signal.shared.deadline) = Some(deadline);
        signal
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Fire after `timeout` from now. Only ever moves the deadline earlier.
    pub fn cancel_after(&self, timeout: Duration) {
        let candidate = Instant::now() + timeout;
        let mut deadline = lock(&self.shared.deadline);
        *deadline = Some(match *deadline {
            Some(existing) if existing <= candidate => existing,
            _ => candidate,
        });
    }

    pub fn deadline(&self) -> Option<Instant> {
        *lock(&self.shared.deadline)
    }

    /// Fire the signal. Returns true for the call that actually transitioned it.
    pub fn trigger(&self) -> bool {
        if self.shared.triggered.swap(true, Ordering::SeqCst) {
            return false;
        }
        lock(&self.shared.fired_tx).take();
        debug!("cancellation signal triggered");
        true
    }

    /// True once triggered; an elapsed deadline latches the signal here.
    pub fn is_triggered(&self) -> bool {
        if self.shared.triggered.load(Ordering::SeqCst) {
            return true;
        }
        match self.deadline() {
            Some(deadline) if Instant::now() >= deadline => {
                self.trigger();
                true
            }
            _ => false,
        }
    }

    /// Receiver that disconnects when the signal is triggered manually. Use together with
    /// [`Self::deadline_timer`] in a `select!`.
    pub(crate) fn fired(&self) -> &Receiver<()> {
        &self.shared.fired_rx
    }

    /// One-shot timer for the current deadline, or a receiver that never fires.
    pub(crate) fn deadline_timer(&self) -> Receiver<Instant> {
        match self.deadline() {
            Some(deadline) => at(deadline),
            None => never(),
        }
    }

    /// Sleep for `duration` unless the signal fires first. Returns false when cut short.
    pub fn sleep(&self, duration: Duration) -> bool {
        if self.is_triggered() {
            return false;
        }
        let timer = after(duration);
        let deadline = self.deadline_timer();
        select! {
            recv(timer) -> _ => !self.is_triggered(),
            recv(self.fired()) -> _ => false,
            recv(deadline) -> _ => {
                self.trigger();
                false
            }
        }
    }

    /// Block until the signal fires.
    pub fn wait(&self) {
        if self.is_triggered() {
            return;
        }
        let deadline = self.deadline_timer();
        select! {
            recv(self.fired()) -> _ => {}
            recv(deadline) -> _ => {
                self.trigger();
            }
        }
    }

    /// Trigger this signal on Ctrl+C. Can be installed once per process.
    pub fn trigger_on_ctrlc(&self) -> Result<()> {
        let signal = self.clone();
        ctrlc::set_handler(move || {
            signal.trigger();
        })
        .context("set Ctrl+C handler")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_is_latched_once() {
        let signal = CancellationSignal::new();
        assert!(!signal.is_triggered());
        assert!(signal.trigger());
        assert!(!signal.trigger());
        assert!(signal.clone().is_triggered());
    }

    #[test]
    fn deadline_elapse_triggers() {
        let signal = CancellationSignal::with_timeout(Duration::from_millis(20));
        assert!(!signal.is_triggered());
        signal.wait();
        assert!(signal.is_triggered());
    }

    #[test]
    fn sleep_cut_short_by_trigger() {
        let signal = CancellationSignal::new();
        let other = signal.clone();
        let h = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            other.trigger();
        });
        let start = Instant::now();
        assert!(!signal.sleep(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(5));
        h.join().unwrap();
    }

    #[test]
    fn cancel_after_only_tightens() {
        let signal = CancellationSignal::with_timeout(Duration::from_millis(50));
        let before = signal.deadline().unwrap();
        signal.cancel_after(Duration::from_secs(60));
        assert_eq!(signal.deadline(), Some(before));
        signal.cancel_after(Duration::from_millis(1));
        assert!(signal.deadline().unwrap() < before);
    }
}
