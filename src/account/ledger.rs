use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::TryStreamExt;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::account::{AccountAggregate, AccountEvent};
use crate::handler::EventHandler;
use crate::store::StoreEvent;
use crate::types::SequenceNumber;

/// What happened to an account, without any credential in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Opened,
    PinCreated { balance: u64 },
    BalanceSet { balance: u64 },
    PinChanged,
    Withdrawn { amount: u64 },
}

impl From<&AccountEvent> for Movement {
    fn from(event: &AccountEvent) -> Self {
        match event {
            AccountEvent::Opened { .. } => Self::Opened,
            AccountEvent::PinCreated { balance, .. } => Self::PinCreated { balance: *balance },
            AccountEvent::BalanceSet { balance } => Self::BalanceSet { balance: *balance },
            AccountEvent::PinChanged { .. } => Self::PinChanged,
            AccountEvent::Withdrawn { amount } => Self::Withdrawn { amount: *amount },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub event_id: Uuid,
    pub sequence_number: SequenceNumber,
    pub occurred_on: DateTime<Utc>,
    pub movement: Movement,
}

/// Read model keeping the history of every account, fed by the event store.
///
/// Cloning is cheap and every clone shares the same entries: register one clone in the store and
/// query another.
#[derive(Default, Clone)]
pub struct AccountLedger {
    entries: Arc<RwLock<HashMap<Uuid, Vec<LedgerEntry>>>>,
}

impl AccountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// History of the given aggregate, oldest first.
    pub async fn entries(&self, aggregate_id: Uuid) -> Vec<LedgerEntry> {
        self.entries
            .read()
            .await
            .get(&aggregate_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Drops everything and replays the given stream, e.g. [`crate::store::memory::InMemoryStore::stream_events`].
    pub async fn rebuild<E>(&self, mut events: BoxStream<'_, Result<StoreEvent<AccountEvent>, E>>) -> Result<(), E> {
        self.entries.write().await.clear();

        while let Some(event) = events.try_next().await? {
            self.record(&event).await;
        }

        Ok(())
    }

    async fn record(&self, event: &StoreEvent<AccountEvent>) {
        let entry = LedgerEntry {
            event_id: event.id,
            sequence_number: event.sequence_number,
            occurred_on: event.occurred_on,
            movement: Movement::from(&event.payload),
        };

        self.entries
            .write()
            .await
            .entry(event.aggregate_id)
            .or_default()
            .push(entry);
    }
}

#[async_trait]
impl EventHandler<AccountAggregate> for AccountLedger {
    async fn handle(&self, event: &StoreEvent<AccountEvent>) {
        self.record(event).await;
    }

    async fn delete(&self, aggregate_id: Uuid) {
        self.entries.write().await.remove(&aggregate_id);
    }

    fn name(&self) -> &'static str {
        "account_ledger"
    }
}
