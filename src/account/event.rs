use serde::{Deserialize, Serialize};

use crate::account::{AccountId, Pin};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum AccountEvent {
    Opened { account_id: AccountId },
    PinCreated { pin: Pin, balance: u64 },
    BalanceSet { balance: u64 },
    PinChanged { pin: Pin },
    Withdrawn { amount: u64 },
}
