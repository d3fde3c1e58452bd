use crate::collection::{
    identity_converter, same_converter, CollectionReference, Converter, DocumentData, DocumentSnapshot,
};
use crate::common::{Channel, Deferred, StoreEvent, Value};
use crate::errors::{raise, ErrorKind, FirestoreResult};
use crate::firestore::Firestore;
use crate::listener::{schedule_delivery, ListenArgs, ListenerRegistration, Observer};
use crate::path::{FieldPath, ResourcePath};
use crate::transaction::{to_document_data, SetOptions, WriteOperation};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A lightweight handle on one document path.
///
/// A reference owns no data: every read goes to the store, so all
/// references to the same path observe the same document.
pub struct DocumentReference<T = DocumentData> {
    firestore: Firestore,
    path: ResourcePath,
    converter: Converter<T>,
}

impl<T> Clone for DocumentReference<T> {
    fn clone(&self) -> Self {
        DocumentReference {
            firestore: self.firestore.clone(),
            path: self.path.clone(),
            converter: self.converter.clone(),
        }
    }
}

impl DocumentReference<DocumentData> {
    pub(crate) fn new(firestore: Firestore, path: ResourcePath) -> Self {
        DocumentReference::from_parts(firestore, path, identity_converter())
    }
}

impl<T> DocumentReference<T> {
    pub(crate) fn from_parts(firestore: Firestore, path: ResourcePath, converter: Converter<T>) -> Self {
        DocumentReference {
            firestore,
            path,
            converter,
        }
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    /// Slash-separated path, e.g. `"fruits/apple"`.
    pub fn path(&self) -> String {
        self.path.to_string()
    }

    pub fn resource_path(&self) -> &ResourcePath {
        &self.path
    }

    pub fn firestore(&self) -> &Firestore {
        &self.firestore
    }

    pub(crate) fn converter(&self) -> &Converter<T> {
        &self.converter
    }

    /// The collection containing this document.
    pub fn parent(&self) -> CollectionReference<T> {
        let collection = self.path.parent().unwrap_or_else(ResourcePath::root);
        CollectionReference::from_parts(self.firestore.clone(), collection, self.converter.clone())
    }

    /// A subcollection, addressed relative to this document.
    pub fn collection(&self, path: &str) -> FirestoreResult<CollectionReference<DocumentData>> {
        let collection = self.path.child(&ResourcePath::parse(path));
        if !collection.is_collection() {
            return Err(raise(
                &format!(
                    "Invalid collection reference. Collection references must have an odd number of segments, but {} has {}",
                    collection,
                    collection.len()
                ),
                ErrorKind::InvalidArgument,
            ));
        }
        self.firestore.start()?;
        Ok(CollectionReference::new(self.firestore.clone(), collection))
    }

    pub fn with_converter<U>(&self, converter: Converter<U>) -> DocumentReference<U> {
        DocumentReference::from_parts(self.firestore.clone(), self.path.clone(), converter)
    }

    pub fn is_equal(&self, other: &DocumentReference<T>) -> bool {
        self.firestore.is_equal(&other.firestore)
            && self.path == other.path
            && same_converter(&self.converter, &other.converter)
    }

    pub fn get(&self) -> Deferred<DocumentSnapshot<T>> {
        let result = self.firestore.start().map(|_| self.snapshot());
        self.firestore.deferred(result)
    }

    /// Replaces the document with `data`.
    pub fn set(&self, data: &T) -> Deferred<()> {
        self.set_with_options(data, SetOptions::Overwrite)
    }

    /// Writes `data`, deep-merging it into the existing document with
    /// `SetOptions::Merge`.
    pub fn set_with_options(&self, data: &T, options: SetOptions) -> Deferred<()> {
        let operation = to_document_data(&self.converter, data).and_then(|data| WriteOperation::set(data, &options));
        self.write(operation)
    }

    /// Updates fields of an existing document. Keys are field paths, so
    /// `"a.b"` replaces only `b` inside the map `a`.
    pub fn update(&self, data: DocumentData) -> Deferred<()> {
        self.write(Ok(WriteOperation::Update(data)))
    }

    /// The `update(field, value, ...)` form of the client. Not supported.
    pub fn update_fields(&self, _fields: Vec<(FieldPath, Value)>) -> Deferred<()> {
        self.write(Err(raise(
            "Updating by field path is not supported by the in-memory store; pass a map of dotted keys to update()",
            ErrorKind::Unimplemented,
        )))
    }

    pub fn delete(&self) -> Deferred<()> {
        self.write(Ok(WriteOperation::Delete))
    }

    fn write(&self, operation: FirestoreResult<WriteOperation>) -> Deferred<()> {
        let result = self
            .firestore
            .start()
            .and_then(|_| operation)
            .and_then(|operation| self.firestore.apply_write(&self.path, &operation));
        self.firestore.deferred(result)
    }

    pub(crate) fn snapshot(&self) -> DocumentSnapshot<T> {
        let data = self.firestore.read_store(|store| store.read(&self.path).cloned());
        DocumentSnapshot::new(self.clone(), data)
    }
}

impl<T: 'static> DocumentReference<T> {
    /// Listens to this document with a plain callback.
    pub fn on_snapshot<F>(&self, on_next: F) -> FirestoreResult<ListenerRegistration>
    where
        F: Fn(DocumentSnapshot<T>) + Send + Sync + 'static,
    {
        self.on_snapshot_with(ListenArgs::callback(on_next))
    }

    /// Listens to this document.
    ///
    /// The current state is queued for delivery right away, and every later
    /// write to the document queues another snapshot taken at write time.
    pub fn on_snapshot_with(&self, args: ListenArgs<DocumentSnapshot<T>>) -> FirestoreResult<ListenerRegistration> {
        self.firestore.start()?;
        let (_options, observer) = args.normalize();
        let registration = ListenerRegistration::new(
            self.firestore.bus().clone(),
            format!("document {}", self.path),
            &observer,
        );
        let watcher = Arc::new(DocumentWatcher {
            reference: self.clone(),
            observer,
            active: registration.active_flag(),
        });

        watcher.deliver();
        let handler = watcher.clone();
        let subscriber = self.firestore.bus().subscribe(
            Channel::Path(self.path.clone()),
            Arc::new(move |_: &StoreEvent| handler.deliver()),
        );
        registration.add_subscription(subscriber);

        log::debug!("Listening to document {}", self.path);
        self.firestore.register(registration.clone());
        Ok(registration)
    }
}

struct DocumentWatcher<T> {
    reference: DocumentReference<T>,
    observer: Observer<DocumentSnapshot<T>>,
    active: Arc<AtomicBool>,
}

impl<T: 'static> DocumentWatcher<T> {
    fn deliver(&self) {
        if self.active.load(Ordering::Acquire) {
            let snapshot = self.reference.snapshot();
            schedule_delivery(
                self.reference.firestore.scheduler(),
                &self.active,
                &self.observer,
                Ok(snapshot),
            );
        }
    }
}

impl<T> Debug for DocumentReference<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "DocumentReference({:?})", self.path)
    }
}
