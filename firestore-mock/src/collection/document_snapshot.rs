use crate::collection::{DocumentData, DocumentReference};
use crate::common::Value;
use crate::errors::FirestoreResult;
use crate::path::FieldPath;
use crate::transaction::from_document_data;
use std::fmt::{Debug, Formatter};

/// Metadata attached to every snapshot. In memory nothing is ever pending
/// or served from a cache, so both flags are always `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotMetadata {
    pub has_pending_writes: bool,
    pub from_cache: bool,
}

/// The contents of one document at one point in time, or its absence.
pub struct DocumentSnapshot<T = DocumentData> {
    reference: DocumentReference<T>,
    data: Option<DocumentData>,
    metadata: SnapshotMetadata,
}

impl<T> Clone for DocumentSnapshot<T> {
    fn clone(&self) -> Self {
        DocumentSnapshot {
            reference: self.reference.clone(),
            data: self.data.clone(),
            metadata: self.metadata,
        }
    }
}

impl<T> DocumentSnapshot<T> {
    pub(crate) fn new(reference: DocumentReference<T>, data: Option<DocumentData>) -> Self {
        DocumentSnapshot {
            reference,
            data,
            metadata: SnapshotMetadata::default(),
        }
    }

    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn id(&self) -> &str {
        self.reference.id()
    }

    pub fn reference(&self) -> &DocumentReference<T> {
        &self.reference
    }

    /// The document converted with the reference's converter; `None` if the
    /// document does not exist.
    pub fn data(&self) -> FirestoreResult<Option<T>> {
        self.data
            .as_ref()
            .map(|data| from_document_data(self.reference.converter(), data))
            .transpose()
    }

    /// The stored fields, without conversion.
    pub fn raw_data(&self) -> Option<&DocumentData> {
        self.data.as_ref()
    }

    /// A single field, `a.b` style paths reaching into nested maps.
    pub fn get(&self, field: impl Into<FieldPath>) -> Option<&Value> {
        let field = field.into();
        self.data.as_ref().and_then(|data| data.get_path(&field))
    }

    pub fn metadata(&self) -> SnapshotMetadata {
        self.metadata
    }

    pub fn is_equal(&self, other: &DocumentSnapshot<T>) -> bool {
        self == other
    }
}

impl<T> PartialEq for DocumentSnapshot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.reference.resource_path() == other.reference.resource_path() && self.data == other.data
    }
}

impl<T> Debug for DocumentSnapshot<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            Some(data) => write!(f, "DocumentSnapshot({:?}: {})", self.reference.resource_path(), data),
            None => write!(f, "DocumentSnapshot({:?}: missing)", self.reference.resource_path()),
        }
    }
}
