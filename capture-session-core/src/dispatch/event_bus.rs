//! Typed fan-out of backend notifications.
//!
//! The backend owns an [`EventBus`] and publishes [`SessionEvent`]s on
//! whatever thread the hardware reports them. Subscribers decide where the
//! event is handled; the lifecycle controller forwards every event onto its
//! session worker before touching graph state.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::subscription::Subscription;
use crate::models::events::SessionEvent;

pub type EventHandler = Arc<dyn Fn(&SessionEvent) + Send + Sync + 'static>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, EventHandler)>,
}

/// Cheap-to-clone publish/subscribe channel for [`SessionEvent`]s.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler`; it stays registered until the returned
    /// [`Subscription`] is cancelled or dropped.
    pub fn subscribe(
        &self,
        handler: impl Fn(&SessionEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.handlers.push((id, Arc::new(handler)));
            id
        };

        let registry = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.lock().handlers.retain(|(h, _)| *h != id);
            }
        })
    }

    /// Delivers `event` to every current subscriber on the calling thread.
    ///
    /// Handlers are snapshotted first, so a handler may unsubscribe (or
    /// publish) without deadlocking.
    pub fn publish(&self, event: SessionEvent) {
        let handlers: Vec<EventHandler> = self
            .registry
            .lock()
            .handlers
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();

        log::trace!("publishing {:?} to {} subscriber(s)", event, handlers.len());
        for handler in handlers {
            handler(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().handlers.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
