//! Many accounts behind an [`EventStore`]: every change is an event, every read a replay.

use std::collections::HashMap;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

pub use config::*;
pub use error::*;

use crate::account::{AccountAggregate, AccountCommand, AccountId, AccountState, Pin};
use crate::manager::AggregateManager;
use crate::registry::AccountRegistry;
use crate::store::memory::{InMemoryStore, InMemoryStoreBuilder};
use crate::store::EventStore;
use crate::AggregateState;

mod config;
mod error;

pub struct Bank<E = InMemoryStore<AccountAggregate>>
where
    E: EventStore<Aggregate = AccountAggregate>,
{
    manager: AggregateManager<E>,
    registry: Mutex<AccountRegistry>,
    accounts: RwLock<HashMap<AccountId, Uuid>>,
    config: BankConfig,
}

impl<E> Bank<E>
where
    E: EventStore<Aggregate = AccountAggregate>,
    BankError: From<E::Error>,
{
    pub fn new(event_store: E, config: BankConfig) -> Self {
        Self {
            manager: AggregateManager::new(event_store),
            registry: Mutex::new(AccountRegistry::starting_at(config.first_account_id())),
            accounts: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Opens an account with a zero balance and no PIN, and returns its number.
    pub async fn open_account(&self) -> Result<AccountId, BankError> {
        let account_id: AccountId = self
            .registry
            .lock()
            .await
            .next_id()
            .ok_or(BankError::AccountIdsExhausted)?;
        let aggregate_state: AggregateState<AccountState> = AggregateState::new();
        let aggregate_id: Uuid = *aggregate_state.id();

        self.manager
            .handle_command::<BankError>(aggregate_state, AccountCommand::Open { account_id })
            .await?;

        self.accounts.write().await.insert(account_id, aggregate_id);

        tracing::info!(%account_id, %aggregate_id, "account opened");

        Ok(account_id)
    }

    /// Number the next opened account will receive, unless the identifiers are exhausted.
    pub async fn counter(&self) -> u64 {
        self.registry.lock().await.counter()
    }

    /// Identifier of the aggregate holding the events of the given account.
    pub async fn aggregate_id(&self, account_id: AccountId) -> Result<Uuid, BankError> {
        self.accounts
            .read()
            .await
            .get(&account_id)
            .copied()
            .ok_or(BankError::UnknownAccount(account_id))
    }

    pub async fn create_pin(
        &self,
        account_id: AccountId,
        pin: impl Into<Pin>,
        initial_balance: u64,
    ) -> Result<(), BankError> {
        let command = AccountCommand::CreatePin {
            pin: pin.into(),
            initial_balance,
        };
        self.execute(account_id, command).await.map(|_| ())
    }

    pub async fn set_balance(&self, account_id: AccountId, value: i64) -> Result<(), BankError> {
        self.execute(account_id, AccountCommand::SetBalance { value })
            .await
            .map(|_| ())
    }

    pub async fn change_pin(
        &self,
        account_id: AccountId,
        old_pin: &str,
        new_pin: impl Into<Pin>,
    ) -> Result<(), BankError> {
        let command = AccountCommand::ChangePin {
            old_pin: old_pin.to_string(),
            new_pin: new_pin.into(),
        };
        self.execute(account_id, command).await.map(|_| ())
    }

    pub async fn check_balance(&self, account_id: AccountId, pin: &str) -> Result<u64, BankError> {
        let aggregate_id: Uuid = self.aggregate_id(account_id).await?;
        let aggregate_state = self
            .manager
            .load(aggregate_id)
            .await?
            .ok_or(BankError::UnknownAccount(account_id))?;

        aggregate_state.inner().check_balance(pin).map_err(|error| {
            tracing::warn!(%account_id, %error, "balance check refused");
            BankError::Account(error)
        })
    }

    /// Returns the balance left after the withdrawal.
    pub async fn withdraw(&self, account_id: AccountId, pin: &str, amount: i64) -> Result<u64, BankError> {
        let command = AccountCommand::Withdraw {
            pin: pin.to_string(),
            amount,
        };
        let aggregate_state = self.execute(account_id, command).await?;
        Ok(aggregate_state.inner().balance())
    }

    /// Removes the account events, and the read models built on them. The account number is not reused.
    pub async fn delete_account(&self, account_id: AccountId) -> Result<(), BankError> {
        let aggregate_id: Uuid = self.aggregate_id(account_id).await?;
        self.manager.delete(aggregate_id).await?;
        self.accounts.write().await.remove(&account_id);

        tracing::info!(%account_id, %aggregate_id, "account deleted");

        Ok(())
    }

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    /// Returns the internal event store
    pub fn event_store(&self) -> &E {
        self.manager.event_store()
    }

    async fn execute(
        &self,
        account_id: AccountId,
        command: AccountCommand,
    ) -> Result<AggregateState<AccountState>, BankError> {
        let aggregate_id: Uuid = self.aggregate_id(account_id).await?;

        let loaded = if self.config.pessimistic_lock() {
            self.manager.lock_and_load(aggregate_id).await?
        } else {
            self.manager.load(aggregate_id).await?
        };
        let aggregate_state = loaded.ok_or(BankError::UnknownAccount(account_id))?;

        let command_name: &'static str = command.name();

        match self
            .manager
            .handle_command::<BankError>(aggregate_state, command)
            .await
        {
            Ok(aggregate_state) => {
                tracing::info!(
                    %account_id,
                    command = command_name,
                    sequence_number = *aggregate_state.sequence_number(),
                    "account command applied"
                );
                Ok(aggregate_state)
            }
            Err(error) => {
                tracing::warn!(%account_id, command = command_name, %error, "account command refused");
                Err(error)
            }
        }
    }
}

impl Bank<InMemoryStore<AccountAggregate>> {
    /// A bank backed by a fresh [`InMemoryStore`] without event handlers.
    pub fn in_memory(config: BankConfig) -> Self {
        Self::new(InMemoryStoreBuilder::new().build(), config)
    }
}
