use crate::common::{Channel, EventHandler, StoreEvent};
use crate::listener::ListenerRegistration;
use std::sync::Arc;

use super::live_query::LiveQuery;

/// Subscribes a collection-group listener to every collection with the
/// group's id, including collections created later.
///
/// Each new member collection found on the new-collection channel gets its
/// own subscription; all of them are released with the registration.
pub(crate) fn watch_group<T: 'static>(
    live: &Arc<LiveQuery<T>>,
    collection_id: &str,
    registration: &ListenerRegistration,
) {
    let bus = live.firestore().bus().clone();
    let existing = live
        .firestore()
        .read_store(|store| store.collections_with_id(collection_id));
    for collection in existing {
        registration.add_subscription(bus.subscribe(Channel::Path(collection), live.handler()));
    }

    let watcher: EventHandler = {
        let live = live.clone();
        let bus = bus.clone();
        let registration = registration.clone();
        let collection_id = collection_id.to_string();
        Arc::new(move |event: &StoreEvent| {
            if let StoreEvent::CollectionCreated(collection) = event {
                if collection.ends_with_id(&collection_id) {
                    log::debug!("Collection group '{}' now includes {}", collection_id, collection);
                    registration.add_subscription(bus.subscribe(Channel::Path(collection.clone()), live.handler()));
                }
            }
        })
    };
    registration.add_subscription(bus.subscribe(Channel::NewCollection, watcher));
}
