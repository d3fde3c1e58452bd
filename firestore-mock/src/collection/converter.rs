use crate::collection::DocumentData;
use crate::errors::FirestoreResult;
use std::sync::{Arc, LazyLock};

/// Maps between a typed value and the raw [DocumentData] kept by the store.
///
/// Attach one with `with_converter` on a collection, document or query;
/// snapshots produced through that handle convert with it on [data].
///
/// [data]: crate::collection::DocumentSnapshot::data
pub trait FirestoreDataConverter<T>: Send + Sync {
    fn to_firestore(&self, value: &T) -> FirestoreResult<DocumentData>;

    fn from_firestore(&self, data: &DocumentData) -> FirestoreResult<T>;
}

pub type Converter<T> = Arc<dyn FirestoreDataConverter<T>>;

/// Pass-through converter used by untyped handles.
pub struct IdentityConverter;

impl FirestoreDataConverter<DocumentData> for IdentityConverter {
    fn to_firestore(&self, value: &DocumentData) -> FirestoreResult<DocumentData> {
        Ok(value.clone())
    }

    fn from_firestore(&self, data: &DocumentData) -> FirestoreResult<DocumentData> {
        Ok(data.clone())
    }
}

static IDENTITY: LazyLock<Converter<DocumentData>> = LazyLock::new(|| Arc::new(IdentityConverter));

/// The shared identity converter; every untyped handle uses this instance.
pub(crate) fn identity_converter() -> Converter<DocumentData> {
    IDENTITY.clone()
}

/// Converter identity: two handles use the same converter only if they hold
/// the same instance.
pub(crate) fn same_converter<T>(a: &Converter<T>, b: &Converter<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
