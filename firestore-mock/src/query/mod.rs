//! Queries over collections and collection groups, their snapshots and
//! live listeners.

mod collection_group;
mod cursor;
mod engine;
mod live_query;
#[allow(clippy::module_inception)]
mod query;
mod query_snapshot;

pub(crate) use query::{OrderBy, QueryDescriptor, QueryLimit, QueryScope};
pub use query::Query;
pub use query_snapshot::{DocumentChange, DocumentChangeType, QuerySnapshot};
