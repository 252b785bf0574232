use crate::account::{AccountError, AccountId, Pin};

/// Current state of an account, as derived from its events.
///
/// The PIN is `None` until it gets created: an unset PIN never matches, not even an empty input.
#[derive(Default, Debug, Clone)]
pub struct AccountState {
    account_id: Option<AccountId>,
    pin: Option<Pin>,
    balance: u64,
}

impl AccountState {
    pub const fn account_id(&self) -> Option<AccountId> {
        self.account_id
    }

    pub const fn balance(&self) -> u64 {
        self.balance
    }

    pub const fn has_pin(&self) -> bool {
        self.pin.is_some()
    }

    /// Succeeds only when a PIN was created and `candidate` equals it.
    pub fn verify(&self, candidate: &str) -> Result<(), AccountError> {
        match &self.pin {
            Some(pin) if pin.matches(candidate) => Ok(()),
            _ => Err(AccountError::AuthenticationFailure),
        }
    }

    pub fn check_balance(&self, candidate: &str) -> Result<u64, AccountError> {
        self.verify(candidate).map(|()| self.balance)
    }

    pub(crate) fn opened(self, account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
            ..self
        }
    }

    pub(crate) fn with_pin(self, pin: Pin) -> Self {
        Self { pin: Some(pin), ..self }
    }

    pub(crate) fn with_balance(self, balance: u64) -> Self {
        Self { balance, ..self }
    }

    pub(crate) fn sub_amount(self, amount: u64) -> Self {
        Self {
            balance: self.balance.saturating_sub(amount),
            ..self
        }
    }
}
