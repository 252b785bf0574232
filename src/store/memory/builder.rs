use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::handler::EventHandler;
use crate::store::memory::{InMemoryStore, InnerInMemoryStore};
use crate::Aggregate;

/// Struct used to build a brand new [`InMemoryStore`].
pub struct InMemoryStoreBuilder<A>
where
    A: Aggregate,
{
    event_handlers: Vec<Box<dyn EventHandler<A> + Send>>,
}

impl<A> Default for InMemoryStoreBuilder<A>
where
    A: Aggregate,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A> InMemoryStoreBuilder<A>
where
    A: Aggregate,
{
    /// Creates a new instance of an [`InMemoryStoreBuilder`].
    pub fn new() -> Self {
        Self { event_handlers: vec![] }
    }

    /// Set event handlers list
    pub fn with_event_handlers(mut self, event_handlers: Vec<Box<dyn EventHandler<A> + Send>>) -> Self {
        self.event_handlers = event_handlers;
        self
    }

    /// Add a single event handler
    pub fn add_event_handler(mut self, event_handler: impl EventHandler<A> + Send + 'static) -> Self {
        self.event_handlers.push(Box::new(event_handler));
        self
    }

    /// Returns an empty [`InMemoryStore`] wired with the configured event handlers.
    pub fn build(self) -> InMemoryStore<A> {
        InMemoryStore {
            inner: Arc::new(InnerInMemoryStore {
                events: RwLock::new(vec![]),
                locks: Mutex::new(HashMap::new()),
                event_handlers: RwLock::new(self.event_handlers),
            }),
        }
    }
}
