use crate::collection::{DocumentData, DocumentReference, DocumentSnapshot};
use crate::common::{Deferred, StoreEvent};
use crate::errors::{raise, ErrorKind, FirestoreError, FirestoreResult};
use crate::firestore::Firestore;
use crate::path::ResourcePath;
use crate::store::DocumentStore;
use indexmap::IndexSet;
use parking_lot::Mutex;
use std::sync::Arc;

use super::operation::{to_document_data, WriteOperation};
use super::SetOptions;

/// Lifecycle of a [Transaction].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Created, nothing written yet.
    Open,
    /// At least one write has been staged on the surrogate.
    Staged,
    /// Committed or rejected; the transaction can no longer be used.
    Committed,
}

/// An isolated read-write unit over a [Firestore] store.
///
/// # Purpose
/// Groups document writes so they become visible together. Listeners see at
/// most one change per document, carrying the document's final value.
///
/// # Characteristics
/// - **Isolation**: on creation the live store is cloned into a surrogate;
///   every read and write acts on the surrogate, so reads see earlier writes
///   of the same transaction.
/// - **Deferred failure**: a failing write (e.g. `update` of a missing
///   document) is remembered and reported by the commit; the live store is
///   left untouched.
/// - **Single commit**: a committed transaction rejects a second commit
///   with `FailedPrecondition`.
///
/// # Usage
/// Transactions are created by [Firestore::run_transaction]:
/// ```ignore
/// db.run_transaction(|tx| {
///     let snapshot = tx.get(&apple).wait()?;
///     tx.update(&apple, doc! { count: 2 });
///     Ok(snapshot.exists())
/// }).wait()?;
/// ```
#[derive(Clone)]
pub struct Transaction {
    inner: Arc<TransactionInner>,
}

struct TransactionInner {
    firestore: Firestore,
    surrogate: Mutex<DocumentStore>,
    touched: Mutex<IndexSet<ResourcePath>>,
    state: Mutex<TransactionState>,
    error: Mutex<Option<FirestoreError>>,
}

impl Transaction {
    pub(crate) fn new(firestore: Firestore) -> Self {
        let surrogate = firestore.read_store(|store| store.clone());
        Transaction {
            inner: Arc::new(TransactionInner {
                firestore,
                surrogate: Mutex::new(surrogate),
                touched: Mutex::new(IndexSet::new()),
                state: Mutex::new(TransactionState::Open),
                error: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> TransactionState {
        *self.inner.state.lock()
    }

    /// Reads a document as this transaction sees it.
    ///
    /// # Arguments
    /// * `document` - reference to read; must belong to the transaction's store
    ///
    /// # Returns
    /// A snapshot reflecting the store at transaction start plus every write
    /// staged so far in this transaction.
    pub fn get<T>(&self, document: &DocumentReference<T>) -> Deferred<DocumentSnapshot<T>> {
        let result = self.check_usable(document).map(|_| {
            let data = self.inner.surrogate.lock().read(document.resource_path()).cloned();
            DocumentSnapshot::new(document.clone(), data)
        });
        self.inner.firestore.deferred(result)
    }

    /// Stages a full overwrite of `document`.
    pub fn set<T>(&self, document: &DocumentReference<T>, data: &T) -> &Self {
        self.set_with_options(document, data, SetOptions::Overwrite)
    }

    /// Stages a write of `document` honoring `options`; `SetOptions::Merge`
    /// deep-merges into the staged value.
    pub fn set_with_options<T>(&self, document: &DocumentReference<T>, data: &T, options: SetOptions) -> &Self {
        let operation = to_document_data(document.converter(), data)
            .and_then(|data| WriteOperation::set(data, &options));
        self.stage(document, operation)
    }

    /// Stages a dotted-key update; the document must exist in the
    /// transaction's view.
    pub fn update<T>(&self, document: &DocumentReference<T>, data: DocumentData) -> &Self {
        self.stage(document, Ok(WriteOperation::Update(data)))
    }

    pub fn delete<T>(&self, document: &DocumentReference<T>) -> &Self {
        self.stage(document, Ok(WriteOperation::Delete))
    }

    /// Writes the final value of every touched document into the live store
    /// and announces each document whose value changed.
    ///
    /// # Returns
    /// * `Ok(())` - every staged write is now visible
    /// * `Err(FirestoreError)` - the first staged failure, or
    ///   `FailedPrecondition` if already committed; the live store is unchanged
    pub(crate) fn commit(&self) -> FirestoreResult<()> {
        {
            let mut state = self.inner.state.lock();
            if *state == TransactionState::Committed {
                return Err(raise(
                    "Transaction has already been committed",
                    ErrorKind::FailedPrecondition,
                ));
            }
            *state = TransactionState::Committed;
        }

        if let Some(error) = self.inner.error.lock().take() {
            log::debug!("Transaction rejected before commit: {}", error);
            return Err(error);
        }

        let touched: Vec<ResourcePath> = self.inner.touched.lock().iter().cloned().collect();
        let surrogate = self.inner.surrogate.lock().clone();
        self.inner.firestore.commit_store(|store| {
            let mut events = Vec::new();
            for path in &touched {
                let after = surrogate.read(path);
                let unchanged = store.read(path) == after;
                let outcome = store.write(path, after.cloned());
                if unchanged {
                    continue;
                }
                if outcome.created_collection {
                    if let Some(collection) = path.parent() {
                        events.push(StoreEvent::CollectionCreated(collection));
                    }
                }
                events.push(StoreEvent::Changed(path.clone()));
            }
            log::debug!(
                "Committed transaction over {} document(s), {} event(s) to publish",
                touched.len(),
                events.len()
            );
            Ok(events)
        })
    }

    fn stage<T>(&self, document: &DocumentReference<T>, operation: FirestoreResult<WriteOperation>) -> &Self {
        let result = self
            .check_usable(document)
            .and_then(|_| operation)
            .and_then(|operation| {
                let path = document.resource_path();
                operation.apply(&mut self.inner.surrogate.lock(), path)?;
                self.inner.touched.lock().insert(path.clone());
                Ok(())
            });

        match result {
            Ok(()) => {
                let mut state = self.inner.state.lock();
                if *state == TransactionState::Open {
                    *state = TransactionState::Staged;
                }
            }
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
        if self.state() == TransactionState::Committed {
            return Err(raise(
                "Transaction has already been committed",
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
