use crate::errors::{raise, ErrorKind, FirestoreResult};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

type Task = Box<dyn FnOnce() + Send>;

/// Cooperative FIFO task queue.
///
/// Listener deliveries are queued here instead of running inside the write
/// that caused them; they run when the queue is drained by awaiting a
/// [Deferred], calling [Deferred::wait] or flushing the store.
#[derive(Clone, Default)]
pub struct Scheduler {
    queue: Arc<Mutex<VecDeque<Task>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            queue: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub fn schedule<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.lock().push_back(Box::new(task));
    }

    /// Runs queued tasks until the queue is empty, including tasks queued by
    /// the tasks themselves. The queue lock is not held while a task runs.
    pub fn run_pending(&self) {
        loop {
            let task = self.queue.lock().pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn clear(&self) {
        self.queue.lock().clear();
    }
}

/// The deferred result of a store operation.
///
/// The operation itself has already been applied when a `Deferred` is
/// returned; resolving it first lets every queued delivery run, then yields
/// the outcome. It can be awaited or resolved synchronously with [wait].
///
/// [wait]: Deferred::wait
#[must_use = "a deferred result does nothing until it is awaited or waited on"]
pub struct Deferred<T> {
    result: Option<FirestoreResult<T>>,
    scheduler: Scheduler,
}

impl<T> Deferred<T> {
    pub(crate) fn new(result: FirestoreResult<T>, scheduler: Scheduler) -> Self {
        Deferred {
            result: Some(result),
            scheduler,
        }
    }

    /// Drains pending deliveries and returns the operation's result.
    pub fn wait(mut self) -> FirestoreResult<T> {
        self.scheduler.run_pending();
        self.take_result()
    }

    fn take_result(&mut self) -> FirestoreResult<T> {
        match self.result.take() {
            Some(result) => result,
            None => Err(raise(
                "Deferred result was already consumed",
                ErrorKind::InternalError,
            )),
        }
    }
}

impl<T> Unpin for Deferred<T> {}

impl<T> Future for Deferred<T> {
    type Output = FirestoreResult<T>;

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.scheduler.run_pending();
        Poll::Ready(self.take_result())
    }
}
