//! Snapshot listener registration.
//!
//! The client accepts a listener as a bare callback, as options plus a
//! callback, as an observer object, or as options plus an observer. All of
//! them are expressed as a [ListenArgs] value and normalized once into an
//! [Observer] before a registration is created.

use crate::common::{EventBus, Scheduler, SubscriberRef};
use crate::errors::{FirestoreError, FirestoreResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub type NextCallback<S> = Arc<dyn Fn(S) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(FirestoreError) + Send + Sync>;
pub type CompleteCallback = Arc<dyn Fn() + Send + Sync>;

/// Options accepted by `onSnapshot`.
///
/// Metadata never changes in memory (nothing is pending, nothing comes from
/// a cache), so `include_metadata_changes` has no observable effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotListenOptions {
    pub include_metadata_changes: bool,
}

/// Callbacks of a snapshot listener.
pub struct Observer<S> {
    next: Option<NextCallback<S>>,
    error: Option<ErrorCallback>,
    complete: Option<CompleteCallback>,
}

impl<S> Clone for Observer<S> {
    fn clone(&self) -> Self {
        Observer {
            next: self.next.clone(),
            error: self.error.clone(),
            complete: self.complete.clone(),
        }
    }
}

impl<S> Default for Observer<S> {
    fn default() -> Self {
        Observer {
            next: None,
            error: None,
            complete: None,
        }
    }
}

impl<S> Observer<S> {
    pub fn new() -> Self {
        Observer::default()
    }

    pub fn on_next<F>(mut self, callback: F) -> Self
    where
        F: Fn(S) + Send + Sync + 'static,
    {
        self.next = Some(Arc::new(callback));
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(FirestoreError) + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(callback));
        self
    }

    /// Invoked once when the store is terminated while the listener is live.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.complete = Some(Arc::new(callback));
        self
    }

    fn notify(&self, value: FirestoreResult<S>) {
        match value {
            Ok(snapshot) => {
                if let Some(next) = &self.next {
                    next(snapshot);
                }
            }
            Err(error) => match &self.error {
                Some(on_error) => on_error(error),
                None => log::warn!("Unhandled snapshot listener error: {}", error),
            },
        }
    }
}

/// Every shape in which a snapshot listener can be passed.
pub enum ListenArgs<S> {
    Callback(NextCallback<S>),
    CallbackWithError(NextCallback<S>, ErrorCallback),
    OptionsCallback(SnapshotListenOptions, NextCallback<S>),
    Observer(Observer<S>),
    OptionsObserver(SnapshotListenOptions, Observer<S>),
}

impl<S> ListenArgs<S> {
    pub fn callback<F>(callback: F) -> Self
    where
        F: Fn(S) + Send + Sync + 'static,
    {
        ListenArgs::Callback(Arc::new(callback))
    }

    pub fn callback_with_error<F, E>(callback: F, on_error: E) -> Self
    where
        F: Fn(S) + Send + Sync + 'static,
        E: Fn(FirestoreError) + Send + Sync + 'static,
    {
        ListenArgs::CallbackWithError(Arc::new(callback), Arc::new(on_error))
    }

    pub fn options_callback<F>(options: SnapshotListenOptions, callback: F) -> Self
    where
        F: Fn(S) + Send + Sync + 'static,
    {
        ListenArgs::OptionsCallback(options, Arc::new(callback))
    }

    pub(crate) fn normalize(self) -> (SnapshotListenOptions, Observer<S>) {
        match self {
            ListenArgs::Callback(next) => (
                SnapshotListenOptions::default(),
                Observer {
                    next: Some(next),
                    ..Observer::default()
                },
            ),
            ListenArgs::CallbackWithError(next, error) => (
                SnapshotListenOptions::default(),
                Observer {
                    next: Some(next),
                    error: Some(error),
                    complete: None,
                },
            ),
            ListenArgs::OptionsCallback(options, next) => (
                options,
                Observer {
                    next: Some(next),
                    ..Observer::default()
                },
            ),
            ListenArgs::Observer(observer) => (SnapshotListenOptions::default(), observer),
            ListenArgs::OptionsObserver(options, observer) => (options, observer),
        }
    }
}

impl<S> From<Observer<S>> for ListenArgs<S> {
    fn from(observer: Observer<S>) -> Self {
        ListenArgs::Observer(observer)
    }
}

/// Queues one delivery; it is dropped if the listener is removed before the
/// queue reaches it.
pub(crate) fn schedule_delivery<S: Send + 'static>(
    scheduler: &Scheduler,
    active: &Arc<AtomicBool>,
    observer: &Observer<S>,
    value: FirestoreResult<S>,
) {
    let active = active.clone();
    let observer = observer.clone();
    scheduler.schedule(move || {
        if active.load(Ordering::Acquire) {
            observer.notify(value);
        }
    });
}

/// Handle of a live snapshot listener; [remove] detaches it.
///
/// Clones share state, so removing through any clone stops the listener.
///
/// [remove]: ListenerRegistration::remove
#[derive(Clone)]
pub struct ListenerRegistration {
    inner: Arc<RegistrationInner>,
}

struct RegistrationInner {
    active: Arc<AtomicBool>,
    bus: EventBus,
    subscriptions: Mutex<Vec<SubscriberRef>>,
    on_complete: Option<CompleteCallback>,
    description: String,
}

impl ListenerRegistration {
    pub(crate) fn new<S>(bus: EventBus, description: String, observer: &Observer<S>) -> Self {
        ListenerRegistration {
            inner: Arc::new(RegistrationInner {
                active: Arc::new(AtomicBool::new(true)),
                bus,
                subscriptions: Mutex::new(Vec::new()),
                on_complete: observer.complete.clone(),
                description,
            }),
        }
    }

    pub(crate) fn active_flag(&self) -> Arc<AtomicBool> {
        self.inner.active.clone()
    }

    /// Ties a bus subscription to this registration. A subscription added
    /// after removal is released immediately.
    pub(crate) fn add_subscription(&self, subscriber: SubscriberRef) {
        let mut subscriptions = self.inner.subscriptions.lock();
        if self.is_active() {
            subscriptions.push(subscriber);
        } else {
            self.inner.bus.unsubscribe(&subscriber);
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Stops the listener. Idempotent, and safe to call from inside one of
    /// the listener's own callbacks; queued deliveries are discarded.
    pub fn remove(&self) {
        if self.detach() {
            log::debug!("Removed snapshot listener on {}", self.inner.description);
        }
    }

    /// Removes the listener because the store shut down and reports
    /// completion to the observer.
    pub(crate) fn complete(&self) {
        if self.detach() {
            if let Some(on_complete) = &self.inner.on_complete {
                on_complete();
            }
        }
    }

    fn detach(&self) -> bool {
        if !self.inner.active.swap(false, Ordering::AcqRel) {
            return false;
        }
        let subscriptions = std::mem::take(&mut *self.inner.subscriptions.lock());
        for subscriber in subscriptions.iter() {
            self.inner.bus.unsubscribe(subscriber);
        }
        true
    }
}
