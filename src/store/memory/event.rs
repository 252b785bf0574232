use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::event::Event;
use crate::store::StoreEvent;
use crate::types::SequenceNumber;

/// Event representation inside the [`super::InMemoryStore`]. The payload is kept serialized, so
/// that loading an aggregate goes through the same deserialization a real database would need.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct PersistedEvent {
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub payload: Value,
    pub occurred_on: DateTime<Utc>,
    pub sequence_number: SequenceNumber,
}

impl PersistedEvent {
    pub(super) fn new<E: Event>(
        aggregate_id: Uuid,
        event: &E,
        occurred_on: DateTime<Utc>,
        sequence_number: SequenceNumber,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: Uuid::new_v4(),
            aggregate_id,
            payload: serde_json::to_value(event)?,
            occurred_on,
            sequence_number,
        })
    }

    pub fn try_into_store_event<E: Event>(self) -> Result<StoreEvent<E>, serde_json::Error> {
        Ok(StoreEvent {
            id: self.id,
            aggregate_id: self.aggregate_id,
            payload: serde_json::from_value::<E>(self.payload)?,
            occurred_on: self.occurred_on,
            sequence_number: self.sequence_number,
        })
    }
}
