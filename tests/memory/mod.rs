use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use uuid::Uuid;

use atm_ledger::manager::AggregateManager;
use atm_ledger::store::memory::{InMemoryStore, InMemoryStoreBuilder, InMemoryStoreError};
use atm_ledger::store::{EventStore, StoreEvent};
use atm_ledger::AggregateState;

use crate::aggregate::{TestAggregate, TestAggregateState, TestCommand, TestError, TestEvent, TestEventHandler};

#[tokio::test]
async fn by_aggregate_id_insert_and_delete_by_aggregate_id_test() {
    let store: InMemoryStore<TestAggregate> = InMemoryStoreBuilder::new().build();

    let aggregate_id: Uuid = Uuid::new_v4();

    let store_events: Vec<StoreEvent<TestEvent>> = store.by_aggregate_id(aggregate_id).await.unwrap();
    assert!(store_events.is_empty());

    let mut aggregate_state: AggregateState<TestAggregateState> = AggregateState::with_id(aggregate_id);

    let store_events: Vec<StoreEvent<TestEvent>> = store
        .persist(&mut aggregate_state, vec![TestEvent { add: 1 }])
        .await
        .unwrap();

    assert_eq!(store_events.len(), 1);
    let store_event = store_events.first().unwrap();
    assert_eq!(store_event.aggregate_id, aggregate_id);
    assert_eq!(store_event.payload.add, 1);
    // Sequence numbers starts from 1 and not from 0.
    assert_eq!(store_event.sequence_number, 1);

    // A state that never saw the first event tries to write at the same position.
    let mut stale_state: AggregateState<TestAggregateState> = AggregateState::with_id(aggregate_id);

    let result: Result<Vec<StoreEvent<TestEvent>>, InMemoryStoreError> =
        store.persist(&mut stale_state, vec![TestEvent { add: 1 }]).await;

    assert!(matches!(
        result,
        Err(InMemoryStoreError::SequenceConflict { sequence_number: 1, .. })
    ));

    let store_events: Vec<StoreEvent<TestEvent>> = store.by_aggregate_id(aggregate_id).await.unwrap();
    assert_eq!(store_events.len(), 1);

    store.delete(aggregate_id).await.unwrap();

    let store_events: Vec<StoreEvent<TestEvent>> = store.by_aggregate_id(aggregate_id).await.unwrap();
    assert!(store_events.is_empty());

    // Is idempotent
    store.delete(aggregate_id).await.unwrap();
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn persist_multiple_events_test() {
    let store: InMemoryStore<TestAggregate> = InMemoryStoreBuilder::new().build();

    let mut aggregate_state = AggregateState::new();
    let aggregate_id = *aggregate_state.id();

    let store_events: Vec<StoreEvent<TestEvent>> =
        EventStore::persist(&store, &mut aggregate_state, vec![TestEvent { add: 1 }, TestEvent { add: 2 }])
            .await
            .unwrap();

    assert_eq!(store_events.len(), 2);
    assert_eq!(store_events[0].payload.add, 1);
    assert_eq!(store_events[0].sequence_number, 1);
    assert_eq!(store_events[1].payload.add, 2);
    assert_eq!(store_events[1].sequence_number, 2);
    assert_eq!(store_events[0].occurred_on, store_events[1].occurred_on);

    let loaded: Vec<StoreEvent<TestEvent>> = store.by_aggregate_id(aggregate_id).await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].id, store_events[0].id);
    assert_eq!(loaded[1].id, store_events[1].id);
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn persisting_nothing_is_a_no_op_test() {
    let store: InMemoryStore<TestAggregate> = InMemoryStoreBuilder::new().build();
    let mut aggregate_state = AggregateState::new();

    let store_events = store.persist(&mut aggregate_state, vec![]).await.unwrap();

    assert!(store_events.is_empty());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn event_handling_test() {
    let event_handler = TestEventHandler::default();
    let store: InMemoryStore<TestAggregate> = InMemoryStoreBuilder::new()
        .add_event_handler(event_handler.clone())
        .build();

    let mut aggregate_state = AggregateState::new();
    let aggregate_id = *aggregate_state.id();

    let _ = store
        .persist(&mut aggregate_state, vec![TestEvent { add: 2 }, TestEvent { add: 3 }])
        .await
        .unwrap();

    assert_eq!(*event_handler.total.lock().unwrap(), 5);

    store.delete(aggregate_id).await.unwrap();

    assert_eq!(*event_handler.total.lock().unwrap(), 0);
}

#[tokio::test]
async fn late_event_handler_test() {
    let store: InMemoryStore<TestAggregate> = InMemoryStoreBuilder::new().build();
    let event_handler = TestEventHandler::default();

    let mut aggregate_state = AggregateState::new();
    let _ = store
        .persist(&mut aggregate_state, vec![TestEvent { add: 10 }])
        .await
        .unwrap();

    store.add_event_handler(Arc::new(event_handler.clone())).await;

    let mut aggregate_state = AggregateState::new();
    let _ = store
        .persist(&mut aggregate_state, vec![TestEvent { add: 1 }])
        .await
        .unwrap();

    // Only what was persisted after the registration.
    assert_eq!(*event_handler.total.lock().unwrap(), 1);
}

#[tokio::test]
async fn stream_events_test() {
    let store: InMemoryStore<TestAggregate> = InMemoryStoreBuilder::new().build();

    let mut first = AggregateState::new();
    let mut second = AggregateState::new();
    let _ = store.persist(&mut first, vec![TestEvent { add: 1 }]).await.unwrap();
    let _ = store.persist(&mut second, vec![TestEvent { add: 2 }]).await.unwrap();

    let events: Vec<StoreEvent<TestEvent>> = store
        .stream_events()
        .await
        .map(Result::unwrap)
        .collect()
        .await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].aggregate_id, *first.id());
    assert_eq!(events[1].aggregate_id, *second.id());
    assert_eq!(events[1].payload.add, 2);
}

#[tokio::test]
async fn handle_command_test() {
    let manager = AggregateManager::new(InMemoryStoreBuilder::<TestAggregate>::new().build());
    let aggregate_state: AggregateState<TestAggregateState> = AggregateState::new();

    let aggregate_state = manager
        .handle_command::<TestError>(aggregate_state, TestCommand::Single)
        .await
        .unwrap();
    assert_eq!(aggregate_state.inner().count, 2);
    assert_eq!(aggregate_state.sequence_number(), &1);

    let aggregate_state = manager
        .handle_command::<TestError>(aggregate_state, TestCommand::Multi)
        .await
        .unwrap();
    assert_eq!(aggregate_state.inner().count, 4);
    assert_eq!(aggregate_state.sequence_number(), &3);

    let loaded = manager.load(*aggregate_state.id()).await.unwrap().unwrap();
    assert_eq!(loaded.id(), aggregate_state.id());
    assert_eq!(loaded.sequence_number(), aggregate_state.sequence_number());
    assert_eq!(loaded.inner().count, aggregate_state.inner().count);
}

#[tokio::test]
async fn refused_command_persists_nothing_test() {
    let manager = AggregateManager::new(InMemoryStoreBuilder::<TestAggregate>::new().build());
    let aggregate_state: AggregateState<TestAggregateState> = AggregateState::new();
    let aggregate_id = *aggregate_state.id();

    let result = manager
        .handle_command::<TestError>(aggregate_state, TestCommand::Refuse)
        .await;

    assert!(matches!(result, Err(TestError::Refused)));
    assert!(manager.load(aggregate_id).await.unwrap().is_none());
    assert!(manager.event_store().is_empty().await);
}

#[tokio::test]
async fn lock_and_load_test() {
    let manager = Arc::new(AggregateManager::new(
        InMemoryStoreBuilder::<TestAggregate>::new().build(),
    ));

    let aggregate_state = manager
        .handle_command::<TestError>(AggregateState::new(), TestCommand::Single)
        .await
        .unwrap();
    let aggregate_id = *aggregate_state.id();

    // Nothing stored yet: no state, and the lock is not kept around.
    assert!(manager.lock_and_load(Uuid::new_v4()).await.unwrap().is_none());

    let locked = manager.lock_and_load(aggregate_id).await.unwrap().unwrap();
    assert!(locked.is_locked());

    let contender = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.lock_and_load(aggregate_id).await.unwrap().unwrap() })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!contender.is_finished());

    // Persisting releases the lock.
    let updated = manager
        .handle_command::<TestError>(locked, TestCommand::Single)
        .await
        .unwrap();
    assert!(!updated.is_locked());

    let reloaded = contender.await.unwrap();
    assert!(reloaded.is_locked());
    assert_eq!(reloaded.inner().count, 3);
    assert_eq!(reloaded.sequence_number(), &2);
}

#[tokio::test]
async fn delete_test() {
    let manager = AggregateManager::new(InMemoryStoreBuilder::<TestAggregate>::new().build());

    let aggregate_state = manager
        .handle_command::<TestError>(AggregateState::new(), TestCommand::Multi)
        .await
        .unwrap();
    let aggregate_id = *aggregate_state.id();

    manager.delete(aggregate_id).await.unwrap();

    assert!(manager.load(aggregate_id).await.unwrap().is_none());
}

#[tokio::test]
async fn persist_after_delete_is_refused_test() {
    let manager = AggregateManager::new(InMemoryStoreBuilder::<TestAggregate>::new().build());

    let aggregate_state = manager
        .handle_command::<TestError>(AggregateState::new(), TestCommand::Single)
        .await
        .unwrap();
    let aggregate_id = *aggregate_state.id();

    manager.delete(aggregate_id).await.unwrap();

    // The state still believes event 1 is stored: event 2 would start the history with a gap.
    let result = manager
        .handle_command::<TestError>(aggregate_state, TestCommand::Single)
        .await;

    assert!(matches!(
        result,
        Err(TestError::Store(InMemoryStoreError::SequenceConflict { sequence_number: 2, .. }))
    ));
    assert!(manager.event_store().is_empty().await);
}

#[tokio::test]
async fn lock_survives_delete_test() {
    let store: InMemoryStore<TestAggregate> = InMemoryStoreBuilder::new().build();
    let aggregate_id = Uuid::new_v4();

    let guard = store.lock(aggregate_id).await.unwrap();
    store.delete(aggregate_id).await.unwrap();

    let contender = {
        let store = store.clone();
        tokio::spawn(async move { store.lock(aggregate_id).await.unwrap() })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!contender.is_finished());

    drop(guard);
    let second = contender.await.unwrap();
    drop(second);

    store.delete(aggregate_id).await.unwrap();
    assert!(store.lock(aggregate_id).await.is_ok());
}
