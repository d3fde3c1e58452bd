use crate::collection::{
    identity_converter, same_converter, Converter, DocumentData, DocumentReference, DocumentSnapshot,
};
use crate::common::{Deferred, Direction, Value};
use crate::errors::{raise, ErrorKind, FirestoreResult};
use crate::filter::{Filter, FilterProvider, WhereFilterOp};
use crate::firestore::Firestore;
use crate::listener::{ListenArgs, ListenerRegistration};
use crate::path::{FieldPath, ResourcePath};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use super::cursor::{Cursor, CursorKind, CursorPosition};
use super::engine;
use super::live_query::LiveQuery;
use super::query_snapshot::QuerySnapshot;

/// Where a query looks for candidate documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QueryScope {
    Collection(ResourcePath),
    /// Every collection below the root whose id matches.
    Group(String),
}

impl Display for QueryScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryScope::Collection(path) => write!(f, "{}", path),
            QueryScope::Group(id) => write!(f, "collection group '{}'", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OrderBy {
    pub(crate) field: FieldPath,
    pub(crate) direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QueryLimit {
    First(usize),
    Last(usize),
}

/// The immutable clauses of a query.
#[derive(Clone)]
pub(crate) struct QueryDescriptor {
    pub(crate) scope: QueryScope,
    pub(crate) filters: BTreeMap<String, Filter>,
    pub(crate) order_by: Option<OrderBy>,
    pub(crate) limit: Option<QueryLimit>,
    pub(crate) start: Option<Cursor>,
    pub(crate) end: Option<Cursor>,
}

impl QueryDescriptor {
    pub(crate) fn new(scope: QueryScope) -> Self {
        QueryDescriptor {
            scope,
            filters: BTreeMap::new(),
            order_by: None,
            limit: None,
            start: None,
            end: None,
        }
    }
}

impl PartialEq for QueryDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.scope == other.scope
            && self.filters.keys().eq(other.filters.keys())
            && self.order_by == other.order_by
            && self.limit == other.limit
            && self.start == other.start
            && self.end == other.end
    }
}

/// A read-only view over a collection or collection group, refined by
/// `where` clauses, an ordering, cursors and a limit.
///
/// Queries are immutable; every builder method returns a new query and
/// leaves the receiver untouched. Results are computed by a full scan each
/// time [get](Query::get) is called or a listener is notified.
pub struct Query<T = DocumentData> {
    firestore: Firestore,
    descriptor: Arc<QueryDescriptor>,
    converter: Converter<T>,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Query {
            firestore: self.firestore.clone(),
            descriptor: self.descriptor.clone(),
            converter: self.converter.clone(),
        }
    }
}

impl Query<DocumentData> {
    pub(crate) fn collection(firestore: Firestore, path: ResourcePath) -> Self {
        Query::from_parts(
            firestore,
            QueryDescriptor::new(QueryScope::Collection(path)),
            identity_converter(),
        )
    }

    pub(crate) fn collection_group(firestore: Firestore, collection_id: &str) -> Self {
        Query::from_parts(
            firestore,
            QueryDescriptor::new(QueryScope::Group(collection_id.to_string())),
            identity_converter(),
        )
    }
}

impl<T> Query<T> {
    fn from_parts(firestore: Firestore, descriptor: QueryDescriptor, converter: Converter<T>) -> Self {
        Query {
            firestore,
            descriptor: Arc::new(descriptor),
            converter,
        }
    }

    fn refine(&self, change: impl FnOnce(&mut QueryDescriptor)) -> Query<T> {
        let mut descriptor = (*self.descriptor).clone();
        change(&mut descriptor);
        Query::from_parts(self.firestore.clone(), descriptor, self.converter.clone())
    }

    pub fn firestore(&self) -> &Firestore {
        &self.firestore
    }

    pub(crate) fn converter(&self) -> &Converter<T> {
        &self.converter
    }

    pub(crate) fn scope(&self) -> &QueryScope {
        &self.descriptor.scope
    }

    /// Adds `where(field, op, value)`.
    pub fn where_field(&self, field: impl Into<FieldPath>, op: WhereFilterOp, value: impl Into<Value>) -> Query<T> {
        self.where_filter(Filter::from_op(field.into(), op, value.into()))
    }

    /// Adds a `where` clause whose operator is given the way the client
    /// spells it, e.g. `"<="` or `"array-contains"`.
    pub fn where_op(&self, field: impl Into<FieldPath>, op: &str, value: impl Into<Value>) -> FirestoreResult<Query<T>> {
        let op = WhereFilterOp::try_from(op)?;
        Ok(self.where_field(field, op, value))
    }

    /// Adds a prebuilt filter. A clause equal to one already present is
    /// not added twice.
    pub fn where_filter(&self, filter: Filter) -> Query<T> {
        self.refine(|descriptor| {
            descriptor.filters.insert(filter.key(), filter);
        })
    }

    /// Orders results by `field`. A second call replaces the ordering.
    pub fn order_by(&self, field: impl Into<FieldPath>, direction: Direction) -> FirestoreResult<Query<T>> {
        let field = field.into();
        if field.is_document_id() {
            return Err(raise(
                "orderBy() on the document id is not supported by the in-memory store",
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(self.refine(|descriptor| descriptor.order_by = Some(OrderBy { field, direction })))
    }

    /// Keeps the first `limit` results; replaces any `limit_to_last`.
    pub fn limit(&self, limit: usize) -> Query<T> {
        self.refine(|descriptor| descriptor.limit = Some(QueryLimit::First(limit)))
    }

    /// Keeps the last `limit` results; requires an ordering and replaces any
    /// `limit`.
    pub fn limit_to_last(&self, limit: usize) -> Query<T> {
        self.refine(|descriptor| descriptor.limit = Some(QueryLimit::Last(limit)))
    }

    pub fn start_at<V: Into<Value>>(&self, values: Vec<V>) -> Query<T> {
        self.with_cursor(CursorKind::StartAt, value_position(values))
    }

    pub fn start_after<V: Into<Value>>(&self, values: Vec<V>) -> Query<T> {
        self.with_cursor(CursorKind::StartAfter, value_position(values))
    }

    pub fn end_at<V: Into<Value>>(&self, values: Vec<V>) -> Query<T> {
        self.with_cursor(CursorKind::EndAt, value_position(values))
    }

    pub fn end_before<V: Into<Value>>(&self, values: Vec<V>) -> Query<T> {
        self.with_cursor(CursorKind::EndBefore, value_position(values))
    }

    pub fn start_at_snapshot<U>(&self, snapshot: &DocumentSnapshot<U>) -> Query<T> {
        self.with_cursor(CursorKind::StartAt, snapshot_position(snapshot))
    }

    pub fn start_after_snapshot<U>(&self, snapshot: &DocumentSnapshot<U>) -> Query<T> {
        self.with_cursor(CursorKind::StartAfter, snapshot_position(snapshot))
    }

    pub fn end_at_snapshot<U>(&self, snapshot: &DocumentSnapshot<U>) -> Query<T> {
        self.with_cursor(CursorKind::EndAt, snapshot_position(snapshot))
    }

    pub fn end_before_snapshot<U>(&self, snapshot: &DocumentSnapshot<U>) -> Query<T> {
        self.with_cursor(CursorKind::EndBefore, snapshot_position(snapshot))
    }

    fn with_cursor(&self, kind: CursorKind, position: CursorPosition) -> Query<T> {
        let cursor = Cursor::new(kind, position);
        self.refine(|descriptor| match kind {
            CursorKind::StartAt | CursorKind::StartAfter => descriptor.start = Some(cursor),
            CursorKind::EndAt | CursorKind::EndBefore => descriptor.end = Some(cursor),
        })
    }

    /// The same query, producing snapshots converted with `converter`.
    pub fn with_converter<U>(&self, converter: Converter<U>) -> Query<U> {
        Query {
            firestore: self.firestore.clone(),
            descriptor: self.descriptor.clone(),
            converter,
        }
    }

    /// Runs the query once.
    pub fn get(&self) -> Deferred<QuerySnapshot<T>> {
        let result = self
            .firestore
            .start()
            .and_then(|_| self.evaluate())
            .map(|docs| QuerySnapshot::new(self.clone(), Arc::new(docs), None));
        self.firestore.deferred(result)
    }

    pub(crate) fn evaluate(&self) -> FirestoreResult<Vec<DocumentSnapshot<T>>> {
        let rows = self
            .firestore
            .read_store(|store| engine::evaluate(&self.descriptor, store))?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let reference = DocumentReference::from_parts(self.firestore.clone(), row.path, self.converter.clone());
                DocumentSnapshot::new(reference, Some(row.data))
            })
            .collect())
    }

    /// `true` if both queries target the same store with the same converter
    /// instance and identical clauses.
    pub fn is_equal(&self, other: &Query<T>) -> bool {
        self.firestore.is_equal(&other.firestore)
            && same_converter(&self.converter, &other.converter)
            && *self.descriptor == *other.descriptor
    }
}

impl<T: 'static> Query<T> {
    /// Listens to the query result with a plain callback.
    pub fn on_snapshot<F>(&self, on_next: F) -> FirestoreResult<ListenerRegistration>
    where
        F: Fn(QuerySnapshot<T>) + Send + Sync + 'static,
    {
        self.on_snapshot_with(ListenArgs::callback(on_next))
    }

    /// Listens to the query result.
    ///
    /// The first snapshot is queued immediately and every write to a watched
    /// collection queues another. Evaluation errors go to the observer's
    /// error callback.
    pub fn on_snapshot_with(&self, args: ListenArgs<QuerySnapshot<T>>) -> FirestoreResult<ListenerRegistration> {
        LiveQuery::start(self, args)
    }
}

impl<T> Debug for Query<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("scope", &self.descriptor.scope)
            .field("filters", &self.descriptor.filters.keys().collect::<Vec<_>>())
            .field("order_by", &self.descriptor.order_by)
            .field("limit", &self.descriptor.limit)
            .finish()
    }
}

fn value_position<V: Into<Value>>(values: Vec<V>) -> CursorPosition {
    CursorPosition::Values(values.into_iter().map(Into::into).collect())
}

fn snapshot_position<U>(snapshot: &DocumentSnapshot<U>) -> CursorPosition {
    CursorPosition::Document {
        path: snapshot.reference().resource_path().clone(),
        data: snapshot.raw_data().cloned(),
    }
}
