use crate::collection::{DocumentData, DocumentSnapshot, SnapshotMetadata};
use crate::path::ResourcePath;
use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use super::Query;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentChangeType {
    Added,
    Modified,
    Removed,
}

impl Display for DocumentChangeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentChangeType::Added => write!(f, "added"),
            DocumentChangeType::Modified => write!(f, "modified"),
            DocumentChangeType::Removed => write!(f, "removed"),
        }
    }
}

/// One entry of [QuerySnapshot::doc_changes].
///
/// Indices are positions in the previous and current result; `-1` marks
/// "not present" (`old_index` of an added document, `new_index` of a
/// removed one).
pub struct DocumentChange<T = DocumentData> {
    pub change_type: DocumentChangeType,
    pub doc: DocumentSnapshot<T>,
    pub old_index: isize,
    pub new_index: isize,
}

impl<T> Clone for DocumentChange<T> {
    fn clone(&self) -> Self {
        DocumentChange {
            change_type: self.change_type,
            doc: self.doc.clone(),
            old_index: self.old_index,
            new_index: self.new_index,
        }
    }
}

impl<T> Debug for DocumentChange<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({:?}, {} -> {})",
            self.change_type,
            self.doc.reference().resource_path(),
            self.old_index,
            self.new_index
        )
    }
}

/// The result of a query at one point in time.
///
/// Snapshots delivered to a listener are linked to the snapshot delivered
/// before them, which is what [doc_changes](QuerySnapshot::doc_changes)
/// compares against.
pub struct QuerySnapshot<T = DocumentData> {
    query: Query<T>,
    docs: Arc<Vec<DocumentSnapshot<T>>>,
    previous: Option<Arc<Vec<DocumentSnapshot<T>>>>,
    metadata: SnapshotMetadata,
}

impl<T> Clone for QuerySnapshot<T> {
    fn clone(&self) -> Self {
        QuerySnapshot {
            query: self.query.clone(),
            docs: self.docs.clone(),
            previous: self.previous.clone(),
            metadata: self.metadata,
        }
    }
}

impl<T> QuerySnapshot<T> {
    pub(crate) fn new(
        query: Query<T>,
        docs: Arc<Vec<DocumentSnapshot<T>>>,
        previous: Option<Arc<Vec<DocumentSnapshot<T>>>>,
    ) -> Self {
        QuerySnapshot {
            query,
            docs,
            previous,
            metadata: SnapshotMetadata::default(),
        }
    }

    pub fn docs(&self) -> &[DocumentSnapshot<T>] {
        &self.docs
    }

    pub fn size(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn for_each<F>(&self, mut callback: F)
    where
        F: FnMut(&DocumentSnapshot<T>, usize),
    {
        for (index, doc) in self.docs.iter().enumerate() {
            callback(doc, index);
        }
    }

    pub fn query(&self) -> &Query<T> {
        &self.query
    }

    pub fn metadata(&self) -> SnapshotMetadata {
        self.metadata
    }

    /// The changes since the previous snapshot of the same listener.
    ///
    /// Without a previous snapshot every document is `Added`. Otherwise a
    /// document is `Added` if it was not in the previous result, `Modified`
    /// if it moved or its data changed, and `Removed` if it is gone; an
    /// unchanged document produces no entry.
    pub fn doc_changes(&self) -> Vec<DocumentChange<T>> {
        let Some(previous) = &self.previous else {
            return self
                .docs
                .iter()
                .enumerate()
                .map(|(index, doc)| DocumentChange {
                    change_type: DocumentChangeType::Added,
                    doc: doc.clone(),
                    old_index: -1,
                    new_index: index as isize,
                })
                .collect();
        };

        let old_positions: HashMap<&ResourcePath, (usize, &DocumentSnapshot<T>)> = previous
            .iter()
            .enumerate()
            .map(|(index, doc)| (doc.reference().resource_path(), (index, doc)))
            .collect();
        let mut current_paths = HashSet::with_capacity(self.docs.len());
        let mut changes = Vec::new();

        for (index, doc) in self.docs.iter().enumerate() {
            let path = doc.reference().resource_path();
            current_paths.insert(path);
            match old_positions.get(path) {
                None => changes.push(DocumentChange {
                    change_type: DocumentChangeType::Added,
                    doc: doc.clone(),
                    old_index: -1,
                    new_index: index as isize,
                }),
                Some((old_index, old)) if *old_index != index || old.raw_data() != doc.raw_data() => {
                    changes.push(DocumentChange {
                        change_type: DocumentChangeType::Modified,
                        doc: doc.clone(),
                        old_index: *old_index as isize,
                        new_index: index as isize,
                    })
                }
                Some(_) => {}
            }
        }

        for (old_index, old) in previous.iter().enumerate() {
            if !current_paths.contains(old.reference().resource_path()) {
                changes.push(DocumentChange {
                    change_type: DocumentChangeType::Removed,
                    doc: old.clone(),
                    old_index: old_index as isize,
                    new_index: -1,
                });
            }
        }
        changes
    }

    /// `true` if both snapshots hold equal documents in the same order.
    pub fn is_equal(&self, other: &QuerySnapshot<T>) -> bool {
        self.docs.len() == other.docs.len() && self.docs.iter().zip(other.docs.iter()).all(|(a, b)| a.is_equal(b))
    }
}

impl<T> Debug for QuerySnapshot<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySnapshot")
            .field("query", &self.query)
            .field("size", &self.docs.len())
            .finish()
    }
}
