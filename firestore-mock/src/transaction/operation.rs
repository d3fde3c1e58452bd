use crate::collection::{Converter, DocumentData};
use crate::errors::{raise, ErrorKind, FirestoreError, FirestoreResult};
use crate::path::{FieldPath, ResourcePath};
use crate::store::{DocumentStore, WriteOutcome};
use itertools::Itertools;

/// How `set` treats an existing document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SetOptions {
    /// Replace the whole document.
    #[default]
    Overwrite,
    /// Deep-merge into the existing document (`{ merge: true }`).
    Merge,
    /// Merge only the listed fields (`{ mergeFields: [...] }`). Not supported.
    MergeFields(Vec<FieldPath>),
}

/// A single pending document write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WriteOperation {
    Set(DocumentData),
    Merge(DocumentData),
    Update(DocumentData),
    Delete,
}

impl WriteOperation {
    pub(crate) fn set(data: DocumentData, options: &SetOptions) -> FirestoreResult<WriteOperation> {
        match options {
            SetOptions::Overwrite => Ok(WriteOperation::Set(data)),
            SetOptions::Merge => Ok(WriteOperation::Merge(data)),
            SetOptions::MergeFields(fields) => Err(raise(
                &format!(
                    "set() with mergeFields [{}] is not supported by the in-memory store",
                    fields.iter().join(", ")
                ),
                ErrorKind::Unimplemented,
            )),
        }
    }

    pub(crate) fn apply(&self, store: &mut DocumentStore, path: &ResourcePath) -> FirestoreResult<WriteOutcome> {
        match self {
            WriteOperation::Set(data) => Ok(store.write(path, Some(data.clone()))),
            WriteOperation::Merge(data) => store.merge(path, data),
            WriteOperation::Update(data) => store.update(path, data),
            WriteOperation::Delete => Ok(store.write(path, None)),
        }
    }
}

/// Runs a value through a converter, reporting failures as mapping errors.
pub(crate) fn to_document_data<T>(converter: &Converter<T>, value: &T) -> FirestoreResult<DocumentData> {
    converter.to_firestore(value).map_err(|cause| mapping_error("to_firestore", cause))
}

pub(crate) fn from_document_data<T>(converter: &Converter<T>, data: &DocumentData) -> FirestoreResult<T> {
    converter.from_firestore(data).map_err(|cause| mapping_error("from_firestore", cause))
}

fn mapping_error(direction: &str, cause: FirestoreError) -> FirestoreError {
    if cause.kind() == &ErrorKind::ObjectMappingError {
        return cause;
    }
    log::error!("Converter {} failed: {}", direction, cause);
    FirestoreError::new_with_cause(
        &format!("Converter {} failed", direction),
        ErrorKind::ObjectMappingError,
        cause,
    )
}
