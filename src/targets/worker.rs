//! Background worker plumbing shared by the queued targets
//!
//! - `CancellationSignal`: one-shot broadcast, observed by every clone
//! - `WorkerHandle`: owns a worker thread and stops it with a bounded wait

use crate::core::{Diagnostics, LoggerError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Broadcast cancellation built on channel disconnection
///
/// `cancel()` drops the only sender, which wakes every receiver clone at
/// once. Cancelling twice is a no-op.
#[derive(Clone)]
pub struct CancellationSignal {
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    observed: Receiver<()>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        let (trigger, observed) = bounded(0);
        Self {
            trigger: Arc::new(Mutex::new(Some(trigger))),
            observed,
        }
    }

    pub fn cancel(&self) {
        drop(self.trigger.lock().take());
    }

    pub fn is_cancelled(&self) -> bool {
        self.trigger.lock().is_none()
    }

    /// Receiver that becomes ready (disconnected) once cancelled
    pub fn receiver(&self) -> &Receiver<()> {
        &self.observed
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationSignal")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// A target's worker thread
pub(crate) struct WorkerHandle {
    target: String,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
    cancel: CancellationSignal,
}

impl WorkerHandle {
    pub(crate) fn spawn<F>(target: &str, cancel: CancellationSignal, body: F) -> Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(format!("log-target-{}", target))
            .spawn(body)
            .map_err(|e| LoggerError::worker_spawn(target, e.to_string()))?;

        Ok(Self {
            target: target.to_string(),
            handle: Mutex::new(Some(handle)),
            cancel,
        })
    }

    /// Cancel the worker and wait up to `timeout` for it to exit
    ///
    /// Only the first call waits; later calls return `true` immediately.
    pub(crate) fn stop(&self, timeout: Duration, diagnostics: &Diagnostics) -> bool {
        self.cancel.cancel();

        let Some(handle) = self.handle.lock().take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    diagnostics.error(&format!(
                        "Worker for target '{}' panicked during shutdown: {}",
                        self.target,
                        crate::core::diagnostics::panic_message(e.as_ref())
                    ));
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                diagnostics.warning(&format!(
                    "Worker for target '{}' did not finish within {:?} timeout. \
                     Some logs may be lost.",
                    self.target, timeout
                ));
                return false;
            }

            // Small sleep to avoid busy-waiting
            thread::sleep(Duration::from_millis(5));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::select;

    #[test]
    fn test_cancel_wakes_all_clones() {
        let signal = CancellationSignal::new();
        let clone = signal.clone();
        assert!(!clone.is_cancelled());

        let waiter = thread::spawn(move || {
            select! {
                recv(clone.receiver()) -> _ => true,
                default(Duration::from_secs(5)) => false,
            }
        });

        signal.cancel();
        signal.cancel();
        assert!(waiter.join().expect("waiter panicked"));
        assert!(signal.is_cancelled());
    }

    #[test]
    fn test_stop_joins_worker() {
        let cancel = CancellationSignal::new();
        let observed = cancel.clone();
        let worker = WorkerHandle::spawn("test", cancel, move || {
            let _ = observed.receiver().recv();
        })
        .expect("spawn worker");

        assert!(worker.stop(Duration::from_secs(5), &Diagnostics::stderr()));
        assert!(worker.stop(Duration::from_secs(5), &Diagnostics::stderr()));
    }

    #[test]
    fn test_stop_times_out() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&messages);
        let diagnostics = Diagnostics::callback_only(Arc::new(
            move |_: crate::core::DiagnosticLevel, msg: &str| sink.lock().push(msg.to_string()),
        ));

        let worker = WorkerHandle::spawn("slow", CancellationSignal::new(), || {
            thread::sleep(Duration::from_millis(300));
        })
        .expect("spawn worker");

        assert!(!worker.stop(Duration::from_millis(20), &diagnostics));
        assert!(messages.lock()[0].contains("did not finish"));
    }
}
