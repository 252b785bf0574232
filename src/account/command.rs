use crate::account::{AccountId, Pin};

pub enum AccountCommand {
    Open { account_id: AccountId },
    CreatePin { pin: Pin, initial_balance: u64 },
    SetBalance { value: i64 },
    ChangePin { old_pin: String, new_pin: Pin },
    Withdraw { pin: String, amount: i64 },
}

impl AccountCommand {
    /// Name used in logs. Never includes the command payload, which may carry a PIN.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::CreatePin { .. } => "create_pin",
            Self::SetBalance { .. } => "set_balance",
            Self::ChangePin { .. } => "change_pin",
            Self::Withdraw { .. } => "withdraw",
        }
    }
}
