use uuid::Uuid;

use crate::store::{EventStore, StoreEvent};
use crate::{Aggregate, AggregateState};

/// Runs commands of one [`Aggregate`] against an [`EventStore`].
///
/// Loading replays the stored history onto a default state; handling a command asks the aggregate
/// for events and appends them to that history.
pub struct AggregateManager<E>
where
    E: EventStore,
{
    event_store: E,
}

impl<E> AggregateManager<E>
where
    E: EventStore,
{
    pub fn new(event_store: E) -> Self {
        Self { event_store }
    }

    /// Persists the events `command` produces on `aggregate_state`, and returns the state with
    /// them applied.
    ///
    /// A refused command stores nothing. The given state, lock included, is dropped in that case.
    pub async fn handle_command<Er>(
        &self,
        mut aggregate_state: AggregateState<<E::Aggregate as Aggregate>::State>,
        command: <E::Aggregate as Aggregate>::Command,
    ) -> Result<AggregateState<<E::Aggregate as Aggregate>::State>, Er>
    where
        Er: From<E::Error> + From<<E::Aggregate as Aggregate>::Error>,
    {
        let events: Vec<<E::Aggregate as Aggregate>::Event> =
            <E::Aggregate as Aggregate>::handle_command(aggregate_state.inner(), command)?;

        let store_events: Vec<StoreEvent<<E::Aggregate as Aggregate>::Event>> =
            self.event_store.persist(&mut aggregate_state, events).await?;

        Ok(aggregate_state.apply_store_events(store_events, <E::Aggregate as Aggregate>::apply_event))
    }

    /// Rebuilds the state of `aggregate_id` from its history, or `None` when it has no events.
    pub async fn load(
        &self,
        aggregate_id: impl Into<Uuid> + Send,
    ) -> Result<Option<AggregateState<<E::Aggregate as Aggregate>::State>>, E::Error> {
        let aggregate_id: Uuid = aggregate_id.into();

        let store_events: Vec<StoreEvent<<E::Aggregate as Aggregate>::Event>> =
            self.event_store.by_aggregate_id(aggregate_id).await?;

        if store_events.is_empty() {
            return Ok(None);
        }

        let aggregate_state = AggregateState::with_id(aggregate_id);
        Ok(Some(aggregate_state.apply_store_events(
            store_events,
            <E::Aggregate as Aggregate>::apply_event,
        )))
    }

    /// Same as [`AggregateManager::load`], but the history is read only after taking the store lock
    /// of the aggregate. The returned state holds the lock until it is persisted or dropped.
    ///
    /// With no history there is nothing to hand the lock to, so it is released right away.
    pub async fn lock_and_load(
        &self,
        aggregate_id: impl Into<Uuid> + Send,
    ) -> Result<Option<AggregateState<<E::Aggregate as Aggregate>::State>>, E::Error> {
        let aggregate_id: Uuid = aggregate_id.into();
        let guard = self.event_store.lock(aggregate_id).await?;

        Ok(self.load(aggregate_id).await?.map(|mut aggregate_state| {
            aggregate_state.set_lock(guard);
            aggregate_state
        }))
    }

    /// Removes the history of `aggregate_id` and every read model built on it.
    pub async fn delete(&self, aggregate_id: impl Into<Uuid> + Send) -> Result<(), E::Error> {
        self.event_store.delete(aggregate_id.into()).await
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }
}
