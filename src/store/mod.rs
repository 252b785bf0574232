use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::state::AggregateState;
use crate::types::SequenceNumber;
use crate::Aggregate;

pub mod memory;

/// Implemented by store specific guards. Dropping the value has to give the aggregate back to
/// other writers.
pub trait UnlockOnDrop: Send + Sync + 'static {}

/// Exclusive access to one aggregate, obtained with [`EventStore::lock`] and released on drop.
pub struct EventStoreLockGuard(Box<dyn UnlockOnDrop>);

impl EventStoreLockGuard {
    #[must_use]
    pub fn new(lock: impl UnlockOnDrop) -> Self {
        Self(Box::new(lock))
    }
}

/// Where the history of every aggregate instance lives.
///
/// A store appends the events emitted by an [`Aggregate`], hands them back in sequence order and
/// notifies its event handlers once they are stored.
#[async_trait]
pub trait EventStore {
    type Aggregate: Aggregate;
    type Error: std::error::Error;

    /// Waits until no one else holds the lock of `aggregate_id`, then takes it.
    ///
    /// Writers that skip this step still go through the sequence number check on
    /// [`EventStore::persist`], so a stale write is refused either way.
    async fn lock(&self, aggregate_id: Uuid) -> Result<EventStoreLockGuard, Self::Error>;

    /// History of one aggregate instance, oldest first. Empty if nothing was ever stored.
    async fn by_aggregate_id(
        &self,
        aggregate_id: Uuid,
    ) -> Result<Vec<StoreEvent<<Self::Aggregate as Aggregate>::Event>>, Self::Error>;

    /// Appends `events` right after the sequence number of `aggregate_state`, all of them or none.
    ///
    /// Any lock held by `aggregate_state` is released once the events are stored.
    async fn persist(
        &self,
        aggregate_state: &mut AggregateState<<Self::Aggregate as Aggregate>::State>,
        events: Vec<<Self::Aggregate as Aggregate>::Event>,
    ) -> Result<Vec<StoreEvent<<Self::Aggregate as Aggregate>::Event>>, Self::Error>;

    /// Forgets the aggregate instance, along with what event handlers built from it.
    async fn delete(&self, aggregate_id: Uuid) -> Result<(), Self::Error>;
}

/// An event as it comes out of a store: the payload plus where and when it was recorded.
#[derive(Debug, Clone)]
pub struct StoreEvent<Event> {
    /// Unique among the events of every aggregate.
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub payload: Event,
    /// Shared by every event persisted in the same call.
    pub occurred_on: DateTime<Utc>,
    /// Position inside the aggregate history, starting from 1.
    pub sequence_number: SequenceNumber,
}

impl<Event> StoreEvent<Event> {
    pub const fn sequence_number(&self) -> &SequenceNumber {
        &self.sequence_number
    }

    pub const fn payload(&self) -> &Event {
        &self.payload
    }
}
