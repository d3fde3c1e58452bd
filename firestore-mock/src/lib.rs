//! # firestore-mock
//!
//! An in-memory, reactive stand-in for the Cloud Firestore client, for
//! exercising code written against the client API without a backend.
//!
//! It keeps a tree of collections and documents addressed by slash paths,
//! evaluates queries (filters, one ordering, cursors and limits) by scanning
//! the store, diffs consecutive results of a listener into document changes,
//! and applies transactions and write batches atomically with one
//! notification per changed document.
//!
//! ## Example
//!
//! ```rust,ignore
//! use firestore_mock::{doc, Direction, Firestore};
//!
//! let db = Firestore::new();
//! let fruits = db.collection("fruits")?;
//! fruits.doc("banana")?.set(&doc! { weight: 120 }).wait()?;
//! fruits.doc("apple")?.set(&doc! { weight: 150 }).wait()?;
//!
//! let heaviest = fruits.order_by("weight", Direction::Descending)?.limit(1).get().wait()?;
//! assert_eq!(heaviest.docs()[0].id(), "apple");
//! ```
//!
//! ## Deferred results
//!
//! Writes are applied when issued. Operations return a [Deferred] that can be
//! awaited or resolved with [Deferred::wait]; resolving one first runs every
//! queued listener delivery. Listener callbacks therefore never run inside
//! the call that registered them or the write that triggered them.

pub mod collection;
pub mod common;
pub mod errors;
pub mod filter;
pub mod firestore;
pub mod firestore_builder;
pub mod firestore_config;
pub mod listener;
pub mod path;
pub mod query;
pub(crate) mod store;
pub mod transaction;

pub use collection::{
    CollectionReference, Converter, DocumentData, DocumentReference, DocumentSnapshot, FirestoreDataConverter,
    SnapshotMetadata,
};
pub use common::{Deferred, Direction, Value};
pub use errors::{ErrorKind, FirestoreError, FirestoreResult};
pub use filter::{field, Filter, WhereFilterOp};
pub use firestore::Firestore;
pub use firestore_builder::FirestoreBuilder;
pub use firestore_config::{FirestoreConfig, NotifyPolicy, Settings};
pub use listener::{ListenArgs, ListenerRegistration, Observer, SnapshotListenOptions};
pub use path::{FieldPath, ResourcePath};
pub use query::{DocumentChange, DocumentChangeType, Query, QuerySnapshot};
pub use transaction::{SetOptions, Transaction, TransactionState, WriteBatch};
