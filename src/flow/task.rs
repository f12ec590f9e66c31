//! Named worker threads whose outcome is an `anyhow::Result`.

use anyhow::{Context, Result, anyhow};
use std::thread::{self, JoinHandle};

/// Handle to a spawned stage or producer. Dropping it detaches the thread.
pub struct Task<R = ()> {
    name: String,
    handle: JoinHandle<Result<R>>,
}

impl<R: Send + 'static> Task<R> {
    pub fn spawn<F>(name: impl Into<String>, f: F) -> Result<Self>
    where
        F: FnOnce() -> Result<R> + Send + 'static,
    {
        let name = name.into();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(f)
            .with_context(|| format!("spawn {name} thread"))?;
        Ok(Self { name, handle })
    }
}

impl<R> Task<R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the thread. A panic becomes an error naming the thread.
    pub fn join(self) -> Result<R> {
        let name = self.name;
        self.handle
            .join()
            .map_err(|_| anyhow!("{name} thread panicked"))?
    }
}

/// Join every task, then return the first failure (if any). Never stops early, so no task is
/// left running when this returns.
pub fn join_all<R>(tasks: impl IntoIterator<Item = Task<R>>) -> Result<Vec<R>> {
    let mut results = Vec::new();
    let mut first_error = None;
    for task in tasks {
        match task.join() {
            Ok(r) => results.push(r),
            Err(e) => {
                log::error!("{e:#}");
                first_error.get_or_insert(e);
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(results),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_returns_value() {
        let t = Task::spawn("adder", || Ok(2 + 2)).unwrap();
        assert_eq!(t.name(), "adder");
        assert_eq!(t.join().unwrap(), 4);
    }

    #[test]
    fn panic_becomes_error() {
        let t: Task<()> = Task::spawn("boom", || panic!("nope")).unwrap();
        let err = t.join().unwrap_err();
        assert!(err.to_string().contains("boom thread panicked"));
    }

    #[test]
    fn join_all_waits_for_everyone() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};
        let done = Arc::new(AtomicUsize::new(0));
        let mut tasks = vec![Task::spawn("fails", || Err(anyhow!("first"))).unwrap()];
        for i in 0..3 {
            let done = Arc::clone(&done);
            tasks.push(
                Task::spawn(format!("ok-{i}"), move || {
                    std::thread::sleep(std::time::Duration::from_millis(10));
                    done.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .unwrap(),
            );
        }
        assert!(join_all(tasks).is_err());
        assert_eq!(done.load(Ordering::SeqCst), 3);
    }
}
