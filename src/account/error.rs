use thiserror::Error;

/// Reasons an account operation is refused. A refused operation never changes the account.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// Withdrawal amount is zero, negative or not a number.
    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: u64, available: u64 },

    /// The given PIN does not match, or no PIN was created yet.
    #[error("Incorrect PIN")]
    AuthenticationFailure,

    /// Direct balance assignment with a negative or non-integral value.
    #[error("Invalid balance amount")]
    InvalidBalanceValue,
}
