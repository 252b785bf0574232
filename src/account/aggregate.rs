use crate::account::{AccountCommand, AccountError, AccountEvent, AccountState};
use crate::Aggregate;

pub struct AccountAggregate;

impl Aggregate for AccountAggregate {
    const NAME: &'static str = "account";
    type State = AccountState;
    type Command = AccountCommand;
    type Event = AccountEvent;
    type Error = AccountError;

    fn handle_command(state: &Self::State, command: Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            // Opening twice is a no-op: the first identifier sticks.
            AccountCommand::Open { .. } if state.account_id().is_some() => Ok(vec![]),
            AccountCommand::Open { account_id } => Ok(vec![AccountEvent::Opened { account_id }]),
            AccountCommand::CreatePin { pin, initial_balance } => Ok(vec![AccountEvent::PinCreated {
                pin,
                balance: initial_balance,
            }]),
            AccountCommand::SetBalance { value } => {
                let balance: u64 = u64::try_from(value).map_err(|_| AccountError::InvalidBalanceValue)?;
                Ok(vec![AccountEvent::BalanceSet { balance }])
            }
            AccountCommand::ChangePin { old_pin, new_pin } => {
                state.verify(&old_pin)?;
                Ok(vec![AccountEvent::PinChanged { pin: new_pin }])
            }
            AccountCommand::Withdraw { pin, amount } => {
                state.verify(&pin)?;

                let amount: u64 = u64::try_from(amount)
                    .ok()
                    .filter(|amount| *amount > 0)
                    .ok_or(AccountError::InvalidAmount)?;

                if amount > state.balance() {
                    Err(AccountError::InsufficientFunds {
                        requested: amount,
                        available: state.balance(),
                    })
                } else {
                    Ok(vec![AccountEvent::Withdrawn { amount }])
                }
            }
        }
    }

    fn apply_event(state: Self::State, payload: Self::Event) -> Self::State {
        match payload {
            AccountEvent::Opened { account_id } => state.opened(account_id),
            AccountEvent::PinCreated { pin, balance } => state.with_pin(pin).with_balance(balance),
            AccountEvent::BalanceSet { balance } => state.with_balance(balance),
            AccountEvent::PinChanged { pin } => state.with_pin(pin),
            AccountEvent::Withdrawn { amount } => state.sub_amount(amount),
        }
    }
}
