//! Concurrent resolution of many host names.
//!
//! A batch is drained by a fixed pool of scoped worker threads. The indices of all host names are
//! queued before the workers start; each worker takes one index at a time from the shared queue
//! and writes the lookup result into the slot with that index. Only the queue is locked: every
//! result slot has exactly one writer, the worker that dequeued its index.

use std::{
    collections::VecDeque,
    net::IpAddr,
    num::NonZeroUsize,
    sync::{Condvar, Mutex, MutexGuard, OnceLock, PoisonError},
    thread,
};

use crate::{backend::Backend, error::LookupError, resolver::Resolver};

/// FIFO of pending batch indices shared by the workers.
struct WorkQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
}

struct QueueState {
    pending: VecDeque<usize>,
    /// Set once no more indices will be pushed.
    done: bool,
}

impl WorkQueue {
    /// Creates a queue holding `0..len`.
    fn filled(len: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                pending: (0..len).collect(),
                done: false,
            }),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // Queue state is only touched under the lock and never left half-updated.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks the queue as complete and wakes every waiting worker.
    fn finish(&self) {
        self.lock().done = true;
        self.ready.notify_all();
    }

    /// Blocks until an index is available or the queue is finished and empty.
    ///
    /// Returns `None` once there is no more work.
    fn next(&self) -> Option<usize> {
        let mut state = self
            .ready
            .wait_while(self.lock(), |s| s.pending.is_empty() && !s.done)
            .unwrap_or_else(PoisonError::into_inner);
        state.pending.pop_front()
    }
}

impl<B: Backend> Resolver<B> {
    /// Resolves every host name in `hostnames` concurrently.
    ///
    /// The result has the same length as `hostnames`, and `result[i]` holds the addresses of
    /// `hostnames[i]`, or an empty list if that lookup failed. The order in which lookups finish
    /// is unspecified.
    ///
    /// Blocks until every lookup has returned. A lookup that hangs in the system resolver holds up
    /// the whole batch.
    pub fn resolve_batch<S>(&self, hostnames: &[S]) -> Vec<Vec<IpAddr>>
    where
        S: AsRef<str> + Sync,
    {
        if hostnames.is_empty() {
            self.report(&LookupError::EmptyBatch);
            return Vec::new();
        }

        let workers = self.worker_count(hostnames.len());
        log::debug!(
            "resolving batch of {} names on {} workers",
            hostnames.len(),
            workers
        );

        let queue = WorkQueue::filled(hostnames.len());
        let results = (0..hostnames.len())
            .map(|_| OnceLock::new())
            .collect::<Vec<OnceLock<Vec<IpAddr>>>>();

        thread::scope(|s| {
            for id in 0..workers {
                let (queue, results) = (&queue, &results);
                s.spawn(move || {
                    let mut handled = 0usize;
                    while let Some(index) = queue.next() {
                        let addrs = self.resolve(hostnames[index].as_ref());
                        let first = results[index].set(addrs).is_ok();
                        debug_assert!(first, "batch slot {} written twice", index);
                        handled += 1;
                    }
                    log::trace!("worker {} exiting after {} lookups", id, handled);
                });
            }

            // Nothing is queued after the initial fill, so the batch is complete as soon as the
            // workers exist.
            queue.finish();
        });

        results
            .into_iter()
            .map(|slot| slot.into_inner().unwrap_or_default())
            .collect()
    }

    /// Number of workers to spawn for a batch of `len` names.
    fn worker_count(&self, len: usize) -> usize {
        let workers = match self.workers {
            Some(n) => n,
            None => thread::available_parallelism().unwrap_or_else(|e| {
                log::debug!("available parallelism unknown ({}), using 1 worker", e);
                NonZeroUsize::MIN
            }),
        };
        workers.get().min(len)
    }
}
