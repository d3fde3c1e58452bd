//! Shared building blocks: field values, ordering direction, the event bus
//! and the cooperative scheduler behind deferred results.

mod direction;
mod event_bus;
mod scheduler;
mod value;

pub use direction::Direction;
pub use event_bus::{Channel, EventBus, EventHandler, StoreEvent, SubscriberRef};
pub use scheduler::{Deferred, Scheduler};
pub use value::Value;
