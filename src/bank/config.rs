use typed_builder::TypedBuilder;

/// Settings of a [`super::Bank`].
///
/// ```
/// use atm_ledger::bank::BankConfig;
///
/// let config = BankConfig::builder().first_account_id(1000).build();
/// assert_eq!(config.first_account_id(), 1000);
/// assert!(config.pessimistic_lock());
/// ```
#[derive(Debug, Clone, TypedBuilder)]
pub struct BankConfig {
    /// Identifier given to the first opened account.
    #[builder(default = 1)]
    first_account_id: u64,
    /// Lock each account while a command runs on it. Without it concurrent writers on the same
    /// account are caught by the store sequence check instead.
    #[builder(default = true)]
    pessimistic_lock: bool,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BankConfig {
    pub const fn first_account_id(&self) -> u64 {
        self.first_account_id
    }

    pub const fn pessimistic_lock(&self) -> bool {
        self.pessimistic_lock
    }
}
