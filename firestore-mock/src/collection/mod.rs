//! Documents and collections: the data model, the reference handles that
//! address them, the snapshots that capture them and the converters that map
//! them to typed values.
//!
//! References are views: they hold a path and a handle on the store, never
//! the data itself.
//!
//! ```rust,ignore
//! use firestore_mock::{doc, Firestore};
//!
//! let db = Firestore::new();
//! let fruits = db.collection("fruits")?;
//! let apple = fruits.add(&doc! { name: "apple", weight: 150 }).wait()?;
//! let snapshot = apple.get().wait()?;
//! assert_eq!(snapshot.get("weight"), Some(&150.into()));
//! ```

mod collection_reference;
mod converter;
mod document_data;
mod document_reference;
mod document_snapshot;

pub use collection_reference::CollectionReference;
pub(crate) use converter::{identity_converter, same_converter};
pub use converter::{Converter, FirestoreDataConverter, IdentityConverter};
pub use document_data::{normalize, DocumentData};
pub use document_reference::DocumentReference;
pub use document_snapshot::{DocumentSnapshot, SnapshotMetadata};
