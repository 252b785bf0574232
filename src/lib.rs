//! PIN-gated bank accounts built on a small event sourcing core.
//!
//! The [`account::Account`] entity can be used on its own, fully in memory. The same domain logic
//! is exposed as an [`Aggregate`] so that [`bank::Bank`] can persist every account movement as an
//! event in an [`EventStore`] and rebuild accounts by replaying them.

pub use crate::aggregate::Aggregate;
pub use crate::event::Event;
pub use crate::handler::EventHandler;
pub use crate::state::AggregateState;
pub use crate::store::{EventStore, EventStoreLockGuard, StoreEvent, UnlockOnDrop};

mod aggregate;
mod event;
mod handler;
mod state;

pub mod account;
pub mod bank;
pub mod manager;
pub mod registry;
pub mod store;

pub mod types {
    pub use crate::account::AccountId;

    pub type SequenceNumber = i32;
}
