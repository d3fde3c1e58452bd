use crate::collection::{same_converter, Converter, DocumentData, DocumentReference};
use crate::common::Deferred;
use crate::errors::{raise, ErrorKind, FirestoreResult};
use crate::firestore::Firestore;
use crate::path::ResourcePath;
use crate::query::Query;
use crate::transaction::{to_document_data, WriteOperation};
use std::fmt::{Debug, Formatter};
use std::ops::Deref;

/// A handle on one collection path.
///
/// It derefs to the [Query] returning every document of the collection, so
/// every query builder is available directly on it.
pub struct CollectionReference<T = DocumentData> {
    query: Query<T>,
    path: ResourcePath,
}

impl<T> Clone for CollectionReference<T> {
    fn clone(&self) -> Self {
        CollectionReference {
            query: self.query.clone(),
            path: self.path.clone(),
        }
    }
}

impl CollectionReference<DocumentData> {
    pub(crate) fn new(firestore: Firestore, path: ResourcePath) -> Self {
        CollectionReference {
            query: Query::collection(firestore, path.clone()),
            path,
        }
    }
}

impl<T> CollectionReference<T> {
    pub(crate) fn from_parts(firestore: Firestore, path: ResourcePath, converter: Converter<T>) -> Self {
        CollectionReference {
            query: Query::collection(firestore, path.clone()).with_converter(converter),
            path,
        }
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    pub fn path(&self) -> String {
        self.path.to_string()
    }

    pub fn resource_path(&self) -> &ResourcePath {
        &self.path
    }

    /// The document owning this collection; `None` for a top-level
    /// collection.
    pub fn parent(&self) -> Option<DocumentReference<DocumentData>> {
        self.path
            .parent()
            .filter(|parent| !parent.is_root())
            .map(|parent| DocumentReference::new(self.query.firestore().clone(), parent))
    }

    /// A document addressed relative to this collection.
    pub fn doc(&self, path: &str) -> FirestoreResult<DocumentReference<T>> {
        let document = self.path.child(&ResourcePath::parse(path));
        if !document.is_document() {
            return Err(raise(
                &format!(
                    "Invalid document reference. Document references must have an even number of segments, but {} has {}",
                    document,
                    document.len()
                ),
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(self.document(document))
    }

    /// A document with a fresh auto-generated id.
    pub fn new_doc(&self) -> DocumentReference<T> {
        let id = self.query.firestore().next_id();
        self.document(self.path.child(&ResourcePath::parse(&id)))
    }

    /// Writes `data` to a new document with an auto-generated id.
    pub fn add(&self, data: &T) -> Deferred<DocumentReference<T>> {
        let firestore = self.query.firestore();
        let result = firestore
            .start()
            .and_then(|_| to_document_data(self.query.converter(), data))
            .and_then(|data| {
                let reference = self.new_doc();
                firestore.apply_write(reference.resource_path(), &WriteOperation::Set(data))?;
                Ok(reference)
            });
        firestore.deferred(result)
    }

    pub fn with_converter<U>(&self, converter: Converter<U>) -> CollectionReference<U> {
        CollectionReference {
            query: self.query.with_converter(converter),
            path: self.path.clone(),
        }
    }

    pub fn is_equal(&self, other: &CollectionReference<T>) -> bool {
        self.path == other.path
            && self.query.firestore().is_equal(other.query.firestore())
            && same_converter(self.query.converter(), other.query.converter())
    }

    fn document(&self, path: ResourcePath) -> DocumentReference<T> {
        DocumentReference::from_parts(self.query.firestore().clone(), path, self.query.converter().clone())
    }
}

impl<T> Deref for CollectionReference<T> {
    type Target = Query<T>;

    fn deref(&self) -> &Self::Target {
        &self.query
    }
}

impl<T> Debug for CollectionReference<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "CollectionReference({:?})", self.path)
    }
}
