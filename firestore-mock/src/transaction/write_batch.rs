use crate::collection::{DocumentData, DocumentReference};
use crate::common::{Deferred, StoreEvent};
use crate::errors::{raise, ErrorKind, FirestoreError, FirestoreResult};
use crate::firestore::Firestore;
use crate::path::ResourcePath;
use indexmap::IndexSet;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::operation::{to_document_data, WriteOperation};
use super::SetOptions;

/// Queue of writes applied atomically by [commit](WriteBatch::commit).
///
/// Nothing is visible until the commit. The commit applies the queued
/// operations in order to a copy of the live store; if any of them fails the
/// live store is left as it was. Each document whose final value differs
/// from its value before the batch is announced once.
#[derive(Clone)]
pub struct WriteBatch {
    inner: Arc<WriteBatchInner>,
}

struct WriteBatchInner {
    firestore: Firestore,
    operations: Mutex<Vec<(ResourcePath, WriteOperation)>>,
    committed: AtomicBool,
    error: Mutex<Option<FirestoreError>>,
}

impl WriteBatch {
    pub(crate) fn new(firestore: Firestore) -> Self {
        WriteBatch {
            inner: Arc::new(WriteBatchInner {
                firestore,
                operations: Mutex::new(Vec::new()),
                committed: AtomicBool::new(false),
                error: Mutex::new(None),
            }),
        }
    }

    pub fn set<T>(&self, document: &DocumentReference<T>, data: &T) -> &Self {
        self.set_with_options(document, data, SetOptions::Overwrite)
    }

    pub fn set_with_options<T>(&self, document: &DocumentReference<T>, data: &T, options: SetOptions) -> &Self {
        let operation = to_document_data(document.converter(), data)
            .and_then(|data| WriteOperation::set(data, &options));
        self.enqueue(document, operation)
    }

    pub fn update<T>(&self, document: &DocumentReference<T>, data: DocumentData) -> &Self {
        self.enqueue(document, Ok(WriteOperation::Update(data)))
    }

    pub fn delete<T>(&self, document: &DocumentReference<T>) -> &Self {
        self.enqueue(document, Ok(WriteOperation::Delete))
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.inner.operations.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn commit(&self) -> Deferred<()> {
        let result = self.apply_all();
        self.inner.firestore.deferred(result)
    }

    fn apply_all(&self) -> FirestoreResult<()> {
        if self.inner.committed.swap(true, Ordering::AcqRel) {
            return Err(raise(
                "A write batch can no longer be used after commit() has been called.",
                ErrorKind::FailedPrecondition,
            ));
        }
        if let Some(error) = self.inner.error.lock().take() {
            return Err(error);
        }

        let operations = std::mem::take(&mut *self.inner.operations.lock());
        self.inner.firestore.commit_store(|store| {
            let mut working = store.clone();
            let mut touched = IndexSet::new();
            for (path, operation) in &operations {
                operation.apply(&mut working, path)?;
                touched.insert(path);
            }

            let mut events = Vec::new();
            let mut created = HashSet::new();
            for path in touched {
                if store.read(path) == working.read(path) {
                    continue;
                }
                if let Some(collection) = path.parent() {
                    if !store.has_collection(&collection)
                        && working.has_collection(&collection)
                        && created.insert(collection.clone())
                    {
                        events.push(StoreEvent::CollectionCreated(collection));
                    }
                }
                events.push(StoreEvent::Changed(path.clone()));
            }

            log::debug!(
                "Committed write batch of {} operation(s), {} event(s) to publish",
                operations.len(),
                events.len()
            );
            *store = working;
            Ok(events)
        })
    }

    fn enqueue<T>(&self, document: &DocumentReference<T>, operation: FirestoreResult<WriteOperation>) -> &Self {
        let result = self.check_usable(document).and_then(|_| operation);
        match result {
            Ok(operation) => self
                .inner
                .operations
                .lock()
                .push((document.resource_path().clone(), operation)),
            Err(error) => {
                let mut slot = self.inner.error.lock();
                if slot.is_none() {
                    *slot = Some(error);
                }
            }
        }
        self
    }

    fn check_usable<T>(&self, document: &DocumentReference<T>) -> FirestoreResult<()> {
        if self.inner.committed.load(Ordering::Acquire) {
            return Err(raise(
                "A write batch can no longer be used after commit() has been called.",
                ErrorKind::FailedPrecondition,
            ));
        }
        if !document.firestore().is_equal(&self.inner.firestore) {
            return Err(raise(
                "Provided document reference is from a different Firestore instance",
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(())
    }
}
