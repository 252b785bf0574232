//! The account domain: a balance that can only be read or spent with the right PIN.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub use aggregate::*;
pub use command::*;
pub use error::*;
pub use event::*;
pub use ledger::*;
pub use pin::*;
pub use state::*;

use crate::Aggregate;

mod aggregate;
mod command;
mod error;
mod event;
mod ledger;
mod pin;
mod state;

/// Positive account number, handed out by an [`crate::registry::AccountRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(u64);

impl AccountId {
    pub(crate) const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single account living in memory.
///
/// Fields are private: the balance and the PIN can only change through the methods below. Every
/// change is an [`AccountEvent`] applied by [`AccountAggregate`], and every operation that can be
/// refused is validated by it, so the rules are the same as for stored accounts. A refused
/// operation leaves the account untouched.
#[derive(Debug)]
pub struct Account {
    id: AccountId,
    state: AccountState,
}

impl Account {
    pub(crate) fn open(id: AccountId) -> Self {
        Self {
            id,
            state: AccountAggregate::apply_event(AccountState::default(), AccountEvent::Opened { account_id: id }),
        }
    }

    pub const fn id(&self) -> AccountId {
        self.id
    }

    /// Balance without PIN verification, for the owner of the value (e.g. tests, back office).
    pub const fn balance(&self) -> u64 {
        self.state.balance()
    }

    pub const fn has_pin(&self) -> bool {
        self.state.has_pin()
    }

    /// First time setup. Overwrites both PIN and balance on every call.
    pub fn create_pin(&mut self, pin: impl Into<Pin>, initial_balance: u64) {
        self.apply(AccountEvent::PinCreated {
            pin: pin.into(),
            balance: initial_balance,
        });
    }

    pub fn set_balance(&mut self, value: i64) -> Result<(), AccountError> {
        self.execute(AccountCommand::SetBalance { value })
    }

    pub fn change_pin(&mut self, old_pin: &str, new_pin: impl Into<Pin>) -> Result<(), AccountError> {
        self.execute(AccountCommand::ChangePin {
            old_pin: old_pin.to_string(),
            new_pin: new_pin.into(),
        })
    }

    pub fn check_balance(&self, pin: &str) -> Result<u64, AccountError> {
        self.state.check_balance(pin)
    }

    /// Returns the balance left after the withdrawal.
    pub fn withdraw(&mut self, pin: &str, amount: i64) -> Result<u64, AccountError> {
        self.execute(AccountCommand::Withdraw {
            pin: pin.to_string(),
            amount,
        })?;
        Ok(self.state.balance())
    }

    fn execute(&mut self, command: AccountCommand) -> Result<(), AccountError> {
        let events: Vec<AccountEvent> = AccountAggregate::handle_command(&self.state, command)?;
        events.into_iter().for_each(|event| self.apply(event));
        Ok(())
    }

    fn apply(&mut self, event: AccountEvent) {
        let state: AccountState = std::mem::take(&mut self.state);
        self.state = AccountAggregate::apply_event(state, event);
    }
}

/// Reads a withdrawal amount typed by a user.
pub fn parse_amount(raw: &str) -> Result<i64, AccountError> {
    raw.trim().parse::<i64>().map_err(|_| AccountError::InvalidAmount)
}

/// Reads a balance typed by a user. Only non-negative integers are accepted.
pub fn parse_balance(raw: &str) -> Result<i64, AccountError> {
    match raw.trim().parse::<i64>() {
        Ok(value) if value >= 0 => Ok(value),
        _ => Err(AccountError::InvalidBalanceValue),
    }
}
