//! Multi-document writes: isolated transactions and write batches.

mod operation;
#[allow(clippy::module_inception)]
mod transaction;
mod write_batch;

pub use operation::SetOptions;
pub(crate) use operation::{from_document_data, to_document_data, WriteOperation};
pub use transaction::{Transaction, TransactionState};
pub use write_batch::WriteBatch;
