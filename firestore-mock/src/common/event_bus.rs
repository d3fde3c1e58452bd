use crate::path::ResourcePath;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// An event raised by a store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The document at the path was written or deleted.
    Changed(ResourcePath),
    /// A collection received its first document.
    CollectionCreated(ResourcePath),
}

/// A subscription channel.
///
/// Every document path and every collection path is a channel of its own;
/// collection creation is announced on a single global channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    Path(ResourcePath),
    NewCollection,
}

pub type EventHandler = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// Handle returned by [EventBus::subscribe], used to unsubscribe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberRef {
    channel: Channel,
    id: u64,
}

impl SubscriberRef {
    pub fn channel(&self) -> &Channel {
        &self.channel
    }
}

/// Path-keyed publish/subscribe bus.
///
/// Handlers of a channel run in subscription order. The registry lock is
/// released before any handler runs, so handlers may subscribe or
/// unsubscribe while an event is being published.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus {
            inner: Arc::new(EventBusInner::default()),
        }
    }

    pub fn subscribe(&self, channel: Channel, handler: EventHandler) -> SubscriberRef {
        self.inner.subscribe(channel, handler)
    }

    pub fn unsubscribe(&self, subscriber: &SubscriberRef) {
        self.inner.unsubscribe(subscriber)
    }

    pub fn publish(&self, event: &StoreEvent) {
        self.inner.publish(event)
    }

    pub fn has_listeners(&self, channel: &Channel) -> bool {
        self.inner.has_listeners(channel)
    }

    pub fn close(&self) {
        self.inner.close()
    }
}

#[derive(Default)]
struct EventBusInner {
    next_id: AtomicU64,
    channels: Mutex<HashMap<Channel, IndexMap<u64, EventHandler>>>,
}

impl EventBusInner {
    fn subscribe(&self, channel: Channel, handler: EventHandler) -> SubscriberRef {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.channels
            .lock()
            .entry(channel.clone())
            .or_default()
            .insert(id, handler);
        log::trace!("Subscribed handler {} to {:?}", id, channel);
        SubscriberRef { channel, id }
    }

    fn unsubscribe(&self, subscriber: &SubscriberRef) {
        let mut channels = self.channels.lock();
        if let Some(handlers) = channels.get_mut(&subscriber.channel) {
            handlers.shift_remove(&subscriber.id);
            if handlers.is_empty() {
                channels.remove(&subscriber.channel);
            }
        }
    }

    fn publish(&self, event: &StoreEvent) {
        for channel in Self::channels_for(event) {
            let handlers: Vec<EventHandler> = match self.channels.lock().get(&channel) {
                Some(handlers) => handlers.values().cloned().collect(),
                None => continue,
            };

            log::trace!("Dispatching {:?} to {} handler(s) on {:?}", event, handlers.len(), channel);
            for handler in handlers {
                handler(event);
            }
        }
    }

    fn channels_for(event: &StoreEvent) -> Vec<Channel> {
        match event {
            StoreEvent::Changed(path) => {
                let mut channels = vec![Channel::Path(path.clone())];
                if let Some(parent) = path.parent() {
                    channels.push(Channel::Path(parent));
                }
                channels
            }
            StoreEvent::CollectionCreated(_) => vec![Channel::NewCollection],
        }
    }

    fn has_listeners(&self, channel: &Channel) -> bool {
        self.channels
            .lock()
            .get(channel)
            .is_some_and(|handlers| !handlers.is_empty())
    }

    fn close(&self) {
        self.channels.lock().clear();
    }
}
