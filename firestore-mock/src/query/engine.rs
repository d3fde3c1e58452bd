use crate::collection::DocumentData;
use crate::errors::{raise, ErrorKind, FirestoreResult};
use crate::filter::FilterProvider;
use crate::path::ResourcePath;
use crate::store::DocumentStore;
use itertools::Itertools;

use super::{QueryDescriptor, QueryLimit, QueryScope};

/// A document selected by a query, before it is wrapped in a snapshot.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub(crate) path: ResourcePath,
    pub(crate) data: DocumentData,
}

/// Runs a query against the current store contents.
///
/// Every call is a full scan; nothing is cached between evaluations.
pub(crate) fn evaluate(query: &QueryDescriptor, store: &DocumentStore) -> FirestoreResult<Vec<Candidate>> {
    validate(query)?;

    let mut rows = candidate_paths(&query.scope, store)
        .into_iter()
        .filter_map(|path| {
            store.read(&path).map(|data| Candidate {
                data: data.clone(),
                path,
            })
        })
        .filter(|row| query.filters.values().all(|filter| filter.apply(&row.data)))
        .collect_vec();

    if let Some(order) = &query.order_by {
        rows.retain(|row| row.data.get_path(&order.field).is_some());
        // stable: ties keep index order
        rows.sort_by(|a, b| {
            let left = a.data.get_path(&order.field);
            let right = b.data.get_path(&order.field);
            order.direction.apply(left.cmp(&right))
        });

        let start = match &query.start {
            Some(cursor) => cursor.start_index(&rows, order)?,
            None => 0,
        };
        let end = match &query.end {
            Some(cursor) => cursor.end_index(&rows, order)?,
            None => rows.len(),
        };
        let end = end.clamp(start.min(rows.len()), rows.len());
        let start = start.min(end);
        rows.truncate(end);
        rows.drain(..start);
    }

    match query.limit {
        Some(QueryLimit::First(n)) => rows.truncate(n),
        Some(QueryLimit::Last(n)) => {
            let skip = rows.len().saturating_sub(n);
            rows.drain(..skip);
        }
        None => {}
    }

    Ok(rows)
}

fn validate(query: &QueryDescriptor) -> FirestoreResult<()> {
    if query.order_by.is_some() {
        return Ok(());
    }
    if let Some(QueryLimit::Last(_)) = query.limit {
        return Err(raise(
            "limitToLast() queries require specifying at least one orderBy() clause",
            ErrorKind::InvalidArgument,
        ));
    }
    if let Some(cursor) = query.start.as_ref().or(query.end.as_ref()) {
        return Err(raise(
            &format!(
                "Too many arguments provided to {}(). The number of arguments must be less than or equal to the number of orderBy() clauses",
                cursor.kind.method_name()
            ),
            ErrorKind::InvalidArgument,
        ));
    }
    Ok(())
}

fn candidate_paths(scope: &QueryScope, store: &DocumentStore) -> Vec<ResourcePath> {
    match scope {
        QueryScope::Collection(collection) => store.children(collection),
        QueryScope::Group(collection_id) => store
            .collections_with_id(collection_id)
            .iter()
            .flat_map(|collection| store.children(collection))
            .collect(),
    }
}
