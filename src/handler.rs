use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{Aggregate, StoreEvent};

/// Reacts to the events of an [`Aggregate`] once a store has persisted them, typically to keep a
/// read model up to date.
///
/// Handlers cannot fail: by the time they run the events are already part of the history.
#[async_trait]
pub trait EventHandler<A>: Sync
where
    A: Aggregate,
{
    async fn handle(&self, event: &StoreEvent<A::Event>);

    /// Called when the aggregate is deleted from the store.
    async fn delete(&self, _aggregate_id: Uuid) {}

    /// Shows up in the tracing span wrapping every [`EventHandler::handle`] call.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Lets a handler be registered in a store while another reference keeps querying it.
#[async_trait]
impl<A, T> EventHandler<A> for Arc<T>
where
    A: Aggregate,
    T: EventHandler<A> + Send + ?Sized,
{
    async fn handle(&self, event: &StoreEvent<A::Event>) {
        self.as_ref().handle(event).await;
    }

    async fn delete(&self, aggregate_id: Uuid) {
        self.as_ref().delete(aggregate_id).await;
    }

    fn name(&self) -> &'static str {
        self.as_ref().name()
    }
}
