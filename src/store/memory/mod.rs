use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::Instrument;
use uuid::Uuid;

pub use builder::*;
pub use event::*;

use crate::handler::EventHandler;
use crate::store::{EventStore, EventStoreLockGuard, StoreEvent, UnlockOnDrop};
use crate::types::SequenceNumber;
use crate::{Aggregate, AggregateState};

mod builder;
mod event;

#[derive(thiserror::Error, Debug)]
pub enum InMemoryStoreError {
    /// Serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The events do not directly follow the stored history: another writer got there first, or the
    /// history was deleted meanwhile.
    #[error("aggregate {aggregate_id} cannot take events from sequence number {sequence_number}")]
    SequenceConflict {
        aggregate_id: Uuid,
        sequence_number: SequenceNumber,
    },
}

/// [`EventStore`] keeping every event in process memory.
///
/// The store is protected by an [`Arc`] that allows it to be cloneable still having the same memory
/// reference. Payloads are stored as JSON and sequence numbers are checked on write, so it behaves
/// like a database backed store would, minus durability.
pub struct InMemoryStore<A>
where
    A: Aggregate,
{
    pub(super) inner: Arc<InnerInMemoryStore<A>>,
}

pub(super) struct InnerInMemoryStore<A>
where
    A: Aggregate,
{
    pub(super) events: RwLock<Vec<PersistedEvent>>,
    pub(super) locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
    pub(super) event_handlers: RwLock<Vec<Box<dyn EventHandler<A> + Send>>>,
}

impl<A> InMemoryStore<A>
where
    A: Aggregate,
{
    /// Safely add an event handler to [`InMemoryStore`]. Since it appends an event handler to a [`RwLock`]
    /// this function needs to be `async`.
    pub async fn add_event_handler(&self, event_handler: impl EventHandler<A> + Send + 'static) {
        let mut guard = self.inner.event_handlers.write().await;

        guard.push(Box::new(event_handler))
    }

    /// Number of events currently stored, across every aggregate.
    pub async fn len(&self) -> usize {
        self.inner.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.events.read().await.is_empty()
    }

    /// This function returns a stream representing the full store content, in insertion order. This should
    /// be mainly used to rebuild read models.
    ///
    /// The stream works on a snapshot: events persisted after this call are not part of it.
    pub async fn stream_events(&self) -> BoxStream<'static, Result<StoreEvent<A::Event>, InMemoryStoreError>>
    where
        A::Event: 'static,
    {
        let snapshot: Vec<PersistedEvent> = self.inner.events.read().await.clone();

        futures::stream::iter(snapshot)
            .map(|event| {
                event
                    .try_into_store_event::<A::Event>()
                    .map_err(InMemoryStoreError::from)
            })
            .boxed()
    }

    async fn aggregate_lock(&self, aggregate_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.inner.locks.lock().await;
        Arc::clone(locks.entry(aggregate_id).or_default())
    }
}

/// Concrete implementation of [`EventStoreLockGuard`] for the [`InMemoryStore`].
///
/// When dropped, the owned guard is dropped thus releasing the aggregate mutex.
pub struct InMemoryStoreLockGuard(#[allow(dead_code)] OwnedMutexGuard<()>);

/// Marking [`InMemoryStoreLockGuard`] as an [`UnlockOnDrop`] trait object.
impl UnlockOnDrop for InMemoryStoreLockGuard {}

#[async_trait]
impl<A> EventStore for InMemoryStore<A>
where
    A: Aggregate,
    A::State: Send,
    A::Event: Send + Sync,
{
    type Aggregate = A;
    type Error = InMemoryStoreError;

    async fn lock(&self, aggregate_id: Uuid) -> Result<EventStoreLockGuard, Self::Error> {
        let guard = self.aggregate_lock(aggregate_id).await.lock_owned().await;
        Ok(EventStoreLockGuard::new(InMemoryStoreLockGuard(guard)))
    }

    async fn by_aggregate_id(&self, aggregate_id: Uuid) -> Result<Vec<StoreEvent<A::Event>>, Self::Error> {
        let mut events: Vec<PersistedEvent> = self
            .inner
            .events
            .read()
            .await
            .iter()
            .filter(|event| event.aggregate_id == aggregate_id)
            .cloned()
            .collect();

        events.sort_by_key(|event| event.sequence_number);

        Ok(events
            .into_iter()
            .map(PersistedEvent::try_into_store_event)
            .collect::<Result<Vec<StoreEvent<A::Event>>, serde_json::Error>>()?)
    }

    #[tracing::instrument(skip_all, fields(aggregate = A::NAME, aggregate_id = %aggregate_state.id()), err)]
    async fn persist(
        &self,
        aggregate_state: &mut AggregateState<A::State>,
        events: Vec<A::Event>,
    ) -> Result<Vec<StoreEvent<A::Event>>, Self::Error> {
        if events.is_empty() {
            return Ok(vec![]);
        }

        let occurred_on: DateTime<Utc> = Utc::now();
        let aggregate_id: Uuid = *aggregate_state.id();
        let first_sequence_number: SequenceNumber = aggregate_state.next_sequence_number();

        let mut rows: Vec<PersistedEvent> = Vec::with_capacity(events.len());
        let mut store_events: Vec<StoreEvent<A::Event>> = Vec::with_capacity(events.len());

        for (event, sequence_number) in events.into_iter().zip(first_sequence_number..) {
            let row = PersistedEvent::new(aggregate_id, &event, occurred_on, sequence_number)?;

            store_events.push(StoreEvent {
                id: row.id,
                aggregate_id,
                payload: event,
                occurred_on,
                sequence_number,
            });
            rows.push(row);
        }

        {
            let mut table = self.inner.events.write().await;

            let last_sequence_number: SequenceNumber = table
                .iter()
                .filter(|event| event.aggregate_id == aggregate_id)
                .map(|event| event.sequence_number)
                .max()
                .unwrap_or(0);

            if last_sequence_number != first_sequence_number - 1 {
                tracing::error!({
                    aggregate_id = %aggregate_id,
                    sequence_number = first_sequence_number,
                    last_sequence_number = last_sequence_number,
                }, "events would not follow the stored history, aggregate state is stale");

                return Err(InMemoryStoreError::SequenceConflict {
                    aggregate_id,
                    sequence_number: first_sequence_number,
                });
            }

            table.extend(rows);
        }

        // The events are stored, so the lock can go before running the event handlers: a handler
        // might need to access this aggregate atomically.
        drop(aggregate_state.take_lock());

        let event_handlers = self.inner.event_handlers.read().await;
        for store_event in &store_events {
            for event_handler in event_handlers.iter() {
                let span = tracing::debug_span!(
                    "atm_ledger.event_handler",
                    event_id = %store_event.id,
                    aggregate_id = %store_event.aggregate_id,
                    event_handler = event_handler.name()
                );

                event_handler.handle(store_event).instrument(span).await;
            }
        }

        Ok(store_events)
    }

    async fn delete(&self, aggregate_id: Uuid) -> Result<(), Self::Error> {
        self.inner
            .events
            .write()
            .await
            .retain(|event| event.aggregate_id != aggregate_id);

        {
            // A lock still held or awaited keeps its mutex: dropping it would let a second writer in.
            let mut locks = self.inner.locks.lock().await;
            if locks.get(&aggregate_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
                locks.remove(&aggregate_id);
            }
        }

        let event_handlers = self.inner.event_handlers.read().await;
        for event_handler in event_handlers.iter() {
            event_handler.delete(aggregate_id).await;
        }

        Ok(())
    }
}

/// Debug implementation for [`InMemoryStore`]. Payloads are left out.
impl<A: Aggregate> std::fmt::Debug for InMemoryStore<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore").field("aggregate", &A::NAME).finish()
    }
}

impl<A> Clone for InMemoryStore<A>
where
    A: Aggregate,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
