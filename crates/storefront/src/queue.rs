//! Serialized mutation queue.
//!
//! A [`MutationQueue`] owns a piece of state inside a spawned task and
//! applies closures to it one at a time, in the order they were submitted.
//! Check-then-act sequences (quantity increment, wishlist toggle) run as a
//! single closure, so they never interleave with another mutation.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

type Job<S> = Box<dyn FnOnce(&mut S) + Send>;

/// The queue's worker task is gone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("{0} mutation queue is closed")]
    Closed(&'static str),
}

/// Handle to a task that owns `S` and applies mutations in FIFO order.
///
/// Cloning the handle shares the same queue.
pub struct MutationQueue<S> {
    name: &'static str,
    jobs: mpsc::UnboundedSender<Job<S>>,
}

impl<S> Clone for MutationQueue<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            jobs: self.jobs.clone(),
        }
    }
}

impl<S> std::fmt::Debug for MutationQueue<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationQueue")
            .field("name", &self.name)
            .field("closed", &self.jobs.is_closed())
            .finish()
    }
}

impl<S: Send + 'static> MutationQueue<S> {
    /// Spawn the worker task. Must be called inside a tokio runtime.
    ///
    /// The worker exits once every handle has been dropped.
    #[must_use]
    pub fn spawn(name: &'static str, initial: S) -> Self {
        let (jobs, mut rx) = mpsc::unbounded_channel::<Job<S>>();
        tokio::spawn(async move {
            let mut state = initial;
            while let Some(job) = rx.recv().await {
                job(&mut state);
            }
            debug!(queue = name, "mutation queue drained");
        });
        Self { name, jobs }
    }

    /// Run `mutation` against the state once every earlier submission
    /// has been applied, and return its result.
    ///
    /// The job is enqueued before this future first yields, so calls
    /// issued in order are applied in order. A caller that stops awaiting
    /// does not cancel the mutation.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] if the worker task has stopped.
    pub fn apply<R, F>(&self, mutation: F) -> impl Future<Output = Result<R, QueueError>> + Send + use<R, F, S>
    where
        R: Send + 'static,
        F: FnOnce(&mut S) -> R + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job<S> = Box::new(move |state| {
            // The caller may have gone away; the mutation still counts.
            let _ = reply_tx.send(mutation(state));
        });
        let sent = self.jobs.send(job).map_err(|_| QueueError::Closed(self.name));
        let name = self.name;
        trace!(queue = name, "mutation enqueued");

        async move {
            sent?;
            reply_rx.await.map_err(|_| QueueError::Closed(name))
        }
    }
}
