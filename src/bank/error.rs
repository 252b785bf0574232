use thiserror::Error;

use crate::account::{AccountError, AccountId};
use crate::store::memory::InMemoryStoreError;

#[derive(Debug, Error)]
pub enum BankError {
    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Store(#[from] InMemoryStoreError),

    #[error("Unknown account {0}")]
    UnknownAccount(AccountId),

    #[error("No account identifier left to hand out")]
    AccountIdsExhausted,
}

impl BankError {
    /// The domain refusal behind this error, if that is what it is.
    pub const fn account_error(&self) -> Option<&AccountError> {
        match self {
            Self::Account(error) => Some(error),
            _ => None,
        }
    }
}
