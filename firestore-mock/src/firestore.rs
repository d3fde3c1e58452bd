use crate::collection::{CollectionReference, DocumentData, DocumentReference};
use crate::common::{Deferred, EventBus, Scheduler, StoreEvent};
use crate::errors::{raise, ErrorKind, FirestoreResult};
use crate::firestore_builder::FirestoreBuilder;
use crate::firestore_config::{FirestoreConfig, Settings};
use crate::listener::ListenerRegistration;
use crate::path::ResourcePath;
use crate::query::Query;
use crate::store::DocumentStore;
use crate::transaction::{Transaction, WriteBatch, WriteOperation};
use parking_lot::{Mutex, RwLock};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleState {
    NotStarted,
    Started,
    Terminated,
}

/// In-memory stand-in for a Firestore client instance.
///
/// `Firestore` is a cheap handle (`Arc` inside): clones share the same
/// documents, listeners and delivery queue. Every reference and query created
/// from it reads and writes through to that shared state.
///
/// Writes are applied when they are issued. Listener deliveries are queued
/// and run when a returned [Deferred] is awaited or waited on, or when
/// [flush](Firestore::flush) is called.
///
/// # Examples
///
/// ```rust,ignore
/// use firestore_mock::{doc, Firestore};
///
/// let db = Firestore::new();
/// let apple = db.doc("fruits/apple")?;
/// apple.set(&doc! { color: "red" }).wait()?;
/// assert!(apple.get().wait()?.exists());
/// ```
#[derive(Clone)]
pub struct Firestore {
    inner: Arc<FirestoreInner>,
}

struct FirestoreInner {
    config: FirestoreConfig,
    store: RwLock<DocumentStore>,
    bus: EventBus,
    scheduler: Scheduler,
    state: RwLock<LifecycleState>,
    id_counter: AtomicU64,
    persistence_enabled: AtomicBool,
    settings: RwLock<Settings>,
    registrations: Mutex<Vec<ListenerRegistration>>,
}

impl Default for Firestore {
    fn default() -> Self {
        Self::new()
    }
}

impl Firestore {
    /// Creates a store with the default configuration.
    pub fn new() -> Self {
        let config = FirestoreConfig::new();
        config.initialize();
        Firestore::with_config(config)
    }

    pub fn builder() -> FirestoreBuilder {
        FirestoreBuilder::new()
    }

    pub(crate) fn with_config(config: FirestoreConfig) -> Self {
        Firestore {
            inner: Arc::new(FirestoreInner {
                config,
                store: RwLock::new(DocumentStore::new()),
                bus: EventBus::new(),
                scheduler: Scheduler::new(),
                state: RwLock::new(LifecycleState::NotStarted),
                id_counter: AtomicU64::new(0),
                persistence_enabled: AtomicBool::new(false),
                settings: RwLock::new(Settings::default()),
                registrations: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.inner.config
    }

    /// Reference to the collection at `path`, which must have an odd number
    /// of segments.
    pub fn collection(&self, path: &str) -> FirestoreResult<CollectionReference<DocumentData>> {
        let path = ResourcePath::parse(path);
        if !path.is_collection() {
            return Err(raise(
                &format!(
                    "Invalid collection reference. Collection references must have an odd number of segments, but {} has {}",
                    path,
                    path.len()
                ),
                ErrorKind::InvalidArgument,
            ));
        }
        self.start()?;
        Ok(CollectionReference::new(self.clone(), path))
    }

    /// Reference to the document at `path`, which must have an even number
    /// of segments.
    pub fn doc(&self, path: &str) -> FirestoreResult<DocumentReference<DocumentData>> {
        let path = ResourcePath::parse(path);
        if !path.is_document() {
            return Err(raise(
                &format!(
                    "Invalid document reference. Document references must have an even number of segments, but {} has {}",
                    path,
                    path.len()
                ),
                ErrorKind::InvalidArgument,
            ));
        }
        self.start()?;
        Ok(DocumentReference::new(self.clone(), path))
    }

    /// Query over every collection, at any depth below the root, whose last
    /// path segment is `collection_id`.
    pub fn collection_group(&self, collection_id: &str) -> FirestoreResult<Query<DocumentData>> {
        if collection_id.is_empty() || collection_id.contains('/') {
            return Err(raise(
                &format!(
                    "Invalid collection ID '{}' passed to function collectionGroup(). Collection IDs must not contain '/'",
                    collection_id
                ),
                ErrorKind::InvalidArgument,
            ));
        }
        self.start()?;
        Ok(Query::collection_group(self.clone(), collection_id))
    }

    pub fn batch(&self) -> FirestoreResult<WriteBatch> {
        self.start()?;
        Ok(WriteBatch::new(self.clone()))
    }

    /// Runs `update_fn` against a fresh transaction and commits it when the
    /// function succeeds. An error from the function is returned as is and
    /// nothing is committed.
    pub fn run_transaction<R, F>(&self, update_fn: F) -> Deferred<R>
    where
        F: FnOnce(&Transaction) -> FirestoreResult<R>,
    {
        let result = self.start().and_then(|_| {
            let transaction = Transaction::new(self.clone());
            let value = update_fn(&transaction)?;
            transaction.commit()?;
            Ok(value)
        });
        self.deferred(result)
    }

    /// Next auto-generated document id, `{prefix}{counter}`.
    pub fn next_id(&self) -> String {
        let id = self.inner.id_counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.inner.config.auto_id_prefix(), id)
    }

    pub fn enable_persistence(&self) -> Deferred<()> {
        let result = self.ensure_not_started(
            "Firestore has already been started and persistence can no longer be enabled. \
             You can only enable persistence before calling any other methods on a Firestore object.",
        );
        if result.is_ok() {
            self.inner.persistence_enabled.store(true, Ordering::Release);
        }
        self.deferred(result)
    }

    pub fn clear_persistence(&self) -> Deferred<()> {
        let result = match *self.inner.state.read() {
            LifecycleState::Started => Err(raise(
                "Persistence can only be cleared before a Firestore instance is initialized or after it is terminated.",
                ErrorKind::FailedPrecondition,
            )),
            _ => Ok(()),
        };
        if result.is_ok() {
            self.inner.persistence_enabled.store(false, Ordering::Release);
        }
        self.deferred(result)
    }

    pub fn is_persistence_enabled(&self) -> bool {
        self.inner.persistence_enabled.load(Ordering::Acquire)
    }

    pub fn settings(&self, settings: Settings) -> FirestoreResult<()> {
        self.ensure_not_started(
            "Firestore has already been started and its settings can no longer be changed. \
             You can only modify settings before calling any other methods on a Firestore object.",
        )?;
        *self.inner.settings.write() = settings;
        Ok(())
    }

    pub fn current_settings(&self) -> Settings {
        self.inner.settings.read().clone()
    }

    /// Shuts the store down: every live listener completes and every later
    /// operation fails.
    pub fn terminate(&self) -> Deferred<()> {
        *self.inner.state.write() = LifecycleState::Terminated;
        let registrations = std::mem::take(&mut *self.inner.registrations.lock());
        for registration in registrations {
            registration.complete();
        }
        self.inner.bus.close();
        log::debug!("Terminated mock Firestore for app {}", self.inner.config.app_name());
        self.deferred(Ok(()))
    }

    pub fn is_terminated(&self) -> bool {
        *self.inner.state.read() == LifecycleState::Terminated
    }

    /// Resolves once every write is acknowledged; in memory that is always.
    pub fn wait_for_pending_writes(&self) -> Deferred<()> {
        let result = self.ensure_active();
        self.deferred(result)
    }

    pub fn enable_network(&self) -> Deferred<()> {
        self.deferred(Err(unimplemented("enableNetwork")))
    }

    pub fn disable_network(&self) -> Deferred<()> {
        self.deferred(Err(unimplemented("disableNetwork")))
    }

    pub fn on_snapshots_in_sync<F>(&self, _callback: F) -> FirestoreResult<ListenerRegistration>
    where
        F: Fn() + Send + Sync + 'static,
    {
        Err(unimplemented("onSnapshotsInSync"))
    }

    pub fn load_bundle(&self, _bundle: &[u8]) -> Deferred<()> {
        self.deferred(Err(unimplemented("loadBundle")))
    }

    pub fn named_query(&self, _name: &str) -> Deferred<Query<DocumentData>> {
        self.deferred(Err(unimplemented("namedQuery")))
    }

    /// Runs every queued listener delivery.
    pub fn flush(&self) {
        self.inner.scheduler.run_pending();
    }

    /// `true` if both handles point at the same store instance.
    pub fn is_equal(&self, other: &Firestore) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    pub(crate) fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    pub(crate) fn deferred<T>(&self, result: FirestoreResult<T>) -> Deferred<T> {
        Deferred::new(result, self.inner.scheduler.clone())
    }

    pub(crate) fn ensure_active(&self) -> FirestoreResult<()> {
        if self.is_terminated() {
            return Err(raise(
                "The client has already been terminated.",
                ErrorKind::FailedPrecondition,
            ));
        }
        Ok(())
    }

    /// Marks the store as started; persistence and settings are locked from
    /// here on.
    pub(crate) fn start(&self) -> FirestoreResult<()> {
        let mut state = self.inner.state.write();
        match *state {
            LifecycleState::Terminated => Err(raise(
                "The client has already been terminated.",
                ErrorKind::FailedPrecondition,
            )),
            LifecycleState::NotStarted => {
                log::debug!("Mock Firestore for app {} started", self.inner.config.app_name());
                *state = LifecycleState::Started;
                Ok(())
            }
            LifecycleState::Started => Ok(()),
        }
    }

    fn ensure_not_started(&self, message: &str) -> FirestoreResult<()> {
        match *self.inner.state.read() {
            LifecycleState::NotStarted => Ok(()),
            LifecycleState::Started => Err(raise(message, ErrorKind::FailedPrecondition)),
            LifecycleState::Terminated => Err(raise(
                "The client has already been terminated.",
                ErrorKind::FailedPrecondition,
            )),
        }
    }

    pub(crate) fn read_store<R>(&self, f: impl FnOnce(&DocumentStore) -> R) -> R {
        f(&self.inner.store.read())
    }

    /// Applies a mutation under the store's write lock, then publishes the
    /// events it produced once the lock is released.
    pub(crate) fn commit_store<F>(&self, mutation: F) -> FirestoreResult<()>
    where
        F: FnOnce(&mut DocumentStore) -> FirestoreResult<Vec<StoreEvent>>,
    {
        self.ensure_active()?;
        let events = {
            let mut store = self.inner.store.write();
            mutation(&mut store)?
        };
        for event in &events {
            self.inner.bus.publish(event);
        }
        Ok(())
    }

    /// A single-document write; always announced, even if the data did not
    /// change.
    pub(crate) fn apply_write(&self, path: &ResourcePath, operation: &WriteOperation) -> FirestoreResult<()> {
        self.commit_store(|store| {
            let outcome = operation.apply(store, path)?;
            let mut events = Vec::with_capacity(2);
            if outcome.created_collection {
                if let Some(collection) = path.parent() {
                    events.push(StoreEvent::CollectionCreated(collection));
                }
            }
            events.push(StoreEvent::Changed(path.clone()));
            Ok(events)
        })
    }

    pub(crate) fn register(&self, registration: ListenerRegistration) {
        let mut registrations = self.inner.registrations.lock();
        registrations.retain(|r| r.is_active());
        registrations.push(registration);
    }
}

fn unimplemented(operation: &str) -> crate::errors::FirestoreError {
    raise(
        &format!("{}() is not implemented by the in-memory store", operation),
        ErrorKind::Unimplemented,
    )
}

impl Debug for Firestore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Firestore")
            .field("app_name", &self.inner.config.app_name())
            .field("state", &*self.inner.state.read())
            .finish()
    }
}
