use std::fmt::{Debug, Formatter};

use uuid::Uuid;

use crate::store::{EventStoreLockGuard, StoreEvent};
use crate::types::SequenceNumber;

/// The internal state for an Aggregate.
/// It contains:
/// - an id uniquely representing the aggregate,
/// - an incremental sequence number,
/// - a lock representing the atomicity of the access to the aggregate,
/// - a state defined by the user of this library.
pub struct AggregateState<S> {
    id: Uuid,
    sequence_number: SequenceNumber,
    lock: Option<EventStoreLockGuard>,
    inner: S,
}

/// Default implementation for [`AggregateState`]
impl<S: Default> Default for AggregateState<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Debug> Debug for AggregateState<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateState")
            .field("id", &self.id)
            .field("sequence_number", &self.sequence_number)
            .field("locked", &self.lock.is_some())
            .field("inner", &self.inner)
            .finish()
    }
}

impl<S: Default> AggregateState<S> {
    /// Creates a new instance of an [`AggregateState`] with a new unique id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Creates a new instance of an [`AggregateState`] with the given aggregate id. The use of this
    /// is discouraged being that that aggregate id could be already existing and a clash of ids
    /// might happen.
    ///
    /// Prefer [`AggregateState::new`] or [`AggregateState::default`].
    #[must_use]
    pub fn with_id(id: impl Into<Uuid>) -> Self {
        Self {
            id: id.into(),
            sequence_number: 0,
            lock: None,
            inner: Default::default(),
        }
    }
}

impl<S> AggregateState<S> {
    /// Consumes the aggregate state and generates a new one with the events applied to it,
    /// as dictated by `apply_event`.
    #[must_use]
    pub fn apply_store_events<T, F>(self, store_events: Vec<StoreEvent<T>>, apply_event: F) -> Self
    where
        F: Fn(S, T) -> S,
    {
        store_events.into_iter().fold(self, |state, store_event| {
            let sequence_number: SequenceNumber = store_event.sequence_number;
            let inner: S = apply_event(state.inner, store_event.payload);

            Self {
                sequence_number,
                inner,
                ..state
            }
        })
    }

    /// Returns an Uuid representing the aggregate id.
    pub const fn id(&self) -> &Uuid {
        &self.id
    }

    /// Returns the internal sequence number incremented by 1.
    pub const fn next_sequence_number(&self) -> SequenceNumber {
        self.sequence_number + 1
    }

    /// Returns the current sequence number.
    pub const fn sequence_number(&self) -> &SequenceNumber {
        &self.sequence_number
    }

    /// Returns the internal state.
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Consumes self and extracts the internal state.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Inserts the lock guard into self, replacing any current one.
    pub fn set_lock(&mut self, guard: EventStoreLockGuard) {
        self.lock = Some(guard);
    }

    /// Extracts the lock from self, leaving nothing behind.
    pub fn take_lock(&mut self) -> Option<EventStoreLockGuard> {
        self.lock.take()
    }

    /// Returns whether this state currently holds a lock on its aggregate.
    pub const fn is_locked(&self) -> bool {
        self.lock.is_some()
    }
}
