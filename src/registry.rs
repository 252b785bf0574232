use crate::account::{Account, AccountId};

/// Hands out account identifiers and opens accounts.
///
/// The counter lives here rather than in a global: two registries never see each other, and the
/// identifiers one registry hands out are strictly increasing and never repeated.
#[derive(Debug, Clone)]
pub struct AccountRegistry {
    counter: u64,
}

impl Default for AccountRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountRegistry {
    /// First account gets the identifier 1.
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    /// Seeds the counter. Identifiers are positive, so 0 is bumped to 1.
    pub const fn starting_at(first: u64) -> Self {
        Self {
            counter: if first == 0 { 1 } else { first },
        }
    }

    /// Identifier the next opened account will receive.
    pub const fn counter(&self) -> u64 {
        self.counter
    }

    /// `None` once the counter reached `u64::MAX`: that value is never handed out, and the
    /// counter stays where it is.
    pub fn next_id(&mut self) -> Option<AccountId> {
        let next: u64 = self.counter.checked_add(1)?;
        let id = AccountId::new(self.counter);
        self.counter = next;
        Some(id)
    }

    /// Opens a new account with a zero balance and no PIN.
    pub fn open(&mut self) -> Option<Account> {
        self.next_id().map(Account::open)
    }
}
