use crate::collection::DocumentSnapshot;
use crate::common::{Channel, EventHandler, StoreEvent};
use crate::errors::FirestoreResult;
use crate::firestore::Firestore;
use crate::firestore_config::NotifyPolicy;
use crate::listener::{schedule_delivery, ListenArgs, ListenerRegistration, Observer};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::collection_group::watch_group;
use super::{Query, QueryScope, QuerySnapshot};

type Docs<T> = Arc<Vec<DocumentSnapshot<T>>>;

/// A query with a listener attached.
///
/// Each notification re-evaluates the query right away, links the result to
/// the previously delivered one and queues the delivery.
pub(crate) struct LiveQuery<T> {
    query: Query<T>,
    observer: Observer<QuerySnapshot<T>>,
    active: Arc<AtomicBool>,
    previous: Mutex<Option<Docs<T>>>,
}

impl<T: 'static> LiveQuery<T> {
    pub(crate) fn start(query: &Query<T>, args: ListenArgs<QuerySnapshot<T>>) -> FirestoreResult<ListenerRegistration> {
        let firestore = query.firestore();
        firestore.start()?;

        let (_options, observer) = args.normalize();
        let registration = ListenerRegistration::new(
            firestore.bus().clone(),
            format!("query on {}", query.scope()),
            &observer,
        );
        let live = Arc::new(LiveQuery {
            query: query.clone(),
            observer,
            active: registration.active_flag(),
            previous: Mutex::new(None),
        });

        live.deliver();
        match query.scope() {
            QueryScope::Collection(collection) => {
                let subscriber = firestore
                    .bus()
                    .subscribe(Channel::Path(collection.clone()), live.handler());
                registration.add_subscription(subscriber);
            }
            QueryScope::Group(collection_id) => watch_group(&live, collection_id, &registration),
        }

        log::debug!("Listening to query on {}", query.scope());
        firestore.register(registration.clone());
        Ok(registration)
    }

    pub(crate) fn firestore(&self) -> &Firestore {
        self.query.firestore()
    }

    /// Bus handler re-delivering the query on every event.
    pub(crate) fn handler(self: &Arc<Self>) -> EventHandler {
        let live = self.clone();
        Arc::new(move |_: &StoreEvent| live.deliver())
    }

    fn deliver(&self) {
        if !self.active.load(Ordering::Acquire) {
            return;
        }

        let snapshot = self.query.evaluate().map(|docs| {
            let docs = Arc::new(docs);
            let previous = self.previous.lock().replace(docs.clone());
            (docs, previous)
        });

        let scheduler = self.firestore().scheduler();
        match snapshot {
            Ok((docs, previous)) => {
                let unchanged = previous.as_ref().is_some_and(|previous| **previous == *docs);
                if unchanged && self.firestore().config().notify_policy() == NotifyPolicy::OnResultChange {
                    log::trace!("Skipping unchanged result of query on {}", self.query.scope());
                    return;
                }
                let snapshot = QuerySnapshot::new(self.query.clone(), docs, previous);
                schedule_delivery(scheduler, &self.active, &self.observer, Ok(snapshot));
            }
            Err(error) => schedule_delivery(scheduler, &self.active, &self.observer, Err(error)),
        }
    }
}
