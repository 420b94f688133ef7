use std::collections::HashMap;

use tracing::debug;

use ecycle_types::{Address, Amount, ErrandId, EwasteId};

use crate::error::LedgerError;
use crate::records::{
    BuyerRecord, ErrandRecord, EwasteRecord, Transition, TransitionEffect, UserRecord,
};

/// Tokens minted per unit of recycled weight. Fixed protocol constant.
pub const REWARD_RATE: Amount = 10;

/// Byte cap on free-form text fields (descriptions, names, locations).
pub const MAX_TEXT_LEN: usize = 512;

/// The full contract-resident state of the recycling-rewards token.
///
/// Every mutation goes through [`ContractState::apply`], which validates the
/// transition completely before touching any field: a rejected transition
/// leaves the state byte-identical.
///
/// Invariant maintained by every transition:
/// `sum(balances) + escrow == total_supply`.
#[derive(Clone, Debug)]
pub struct ContractState {
    pub(crate) owner: Address,
    pub(crate) total_supply: Amount,
    pub(crate) escrow: Amount,
    pub(crate) balances: HashMap<Address, Amount>,
    pub(crate) allowances: HashMap<(Address, Address), Amount>,
    pub(crate) users: HashMap<Address, UserRecord>,
    pub(crate) buyers: HashMap<Address, BuyerRecord>,
    pub(crate) ewaste: Vec<EwasteRecord>,
    pub(crate) errands: Vec<ErrandRecord>,
}

impl ContractState {
    /// Deploy a fresh contract with the given owner and zero supply.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            total_supply: 0,
            escrow: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            users: HashMap::new(),
            buyers: HashMap::new(),
            ewaste: Vec::new(),
            errands: Vec::new(),
        }
    }

    /// Apply one transition atomically on behalf of `caller`.
    pub fn apply(
        &mut self,
        caller: Address,
        transition: &Transition,
    ) -> Result<TransitionEffect, LedgerError> {
        let effect = match transition {
            Transition::RegisterUser => self.register_user(caller),
            Transition::RegisterBuyer {
                name,
                location,
                additional_info,
            } => self.register_buyer(caller, name, location, additional_info),
            Transition::RecycleEwaste {
                description,
                weight,
            } => self.recycle_ewaste(caller, description, *weight),
            Transition::CreateErrand {
                description,
                reward,
            } => self.create_errand(caller, description, *reward),
            Transition::CompleteErrand { errand } => self.complete_errand(caller, *errand),
            Transition::VerifyBuyer { buyer } => self.verify_buyer(caller, *buyer),
            Transition::ProcessEwaste { ewaste } => self.process_ewaste(caller, *ewaste),
            Transition::PayForEwaste { recycler, amount } => {
                self.pay_for_ewaste(caller, *recycler, *amount)
            }
            Transition::Transfer { to, value } => self.transfer(caller, *to, *value),
            Transition::Approve { spender, value } => self.approve(caller, *spender, *value),
            Transition::TransferFrom { from, to, value } => {
                self.transfer_from(caller, *from, *to, *value)
            }
        }?;

        debug!(caller = %caller.short(), op = transition.name(), "transition applied");
        Ok(effect)
    }

    fn register_user(&mut self, caller: Address) -> Result<TransitionEffect, LedgerError> {
        if self.users.get(&caller).is_some_and(|u| u.registered) {
            return Err(LedgerError::AlreadyRegistered);
        }

        self.users.insert(
            caller,
            UserRecord {
                registered: true,
                reputation: 0,
                recycled_amount: 0,
            },
        );
        Ok(TransitionEffect::UserRegistered { account: caller })
    }

    fn register_buyer(
        &mut self,
        caller: Address,
        name: &str,
        location: &str,
        additional_info: &str,
    ) -> Result<TransitionEffect, LedgerError> {
        check_text(name)?;
        check_text(location)?;
        check_text(additional_info)?;
        // A verified buyer is locked in; before verification, re-registration
        // overwrites the descriptive fields (intentional idempotent re-submission).
        if self.buyers.get(&caller).is_some_and(|b| b.verified) {
            return Err(LedgerError::AlreadyRegistered);
        }

        self.buyers.insert(
            caller,
            BuyerRecord {
                name: name.to_string(),
                verified: false,
                location: location.to_string(),
                additional_info: additional_info.to_string(),
            },
        );
        Ok(TransitionEffect::BuyerRegistered { account: caller })
    }

    fn recycle_ewaste(
        &mut self,
        caller: Address,
        description: &str,
        weight: Amount,
    ) -> Result<TransitionEffect, LedgerError> {
        check_text(description)?;
        let user = self
            .users
            .get(&caller)
            .filter(|u| u.registered)
            .ok_or(LedgerError::NotRegistered)?;

        let minted = weight.checked_mul(REWARD_RATE).ok_or(LedgerError::Overflow)?;
        let new_supply = self
            .total_supply
            .checked_add(minted)
            .ok_or(LedgerError::Overflow)?;
        let new_balance = self
            .balance_of(caller)
            .checked_add(minted)
            .ok_or(LedgerError::Overflow)?;
        let new_recycled = user
            .recycled_amount
            .checked_add(weight)
            .ok_or(LedgerError::Overflow)?;
        let new_reputation = user.reputation.checked_add(1).ok_or(LedgerError::Overflow)?;

        let id = self.ewaste.len() as EwasteId;
        self.ewaste.push(EwasteRecord {
            id,
            recycler: caller,
            description: description.to_string(),
            weight,
            collected: false,
            processed: false,
        });

        self.total_supply = new_supply;
        self.balances.insert(caller, new_balance);
        let user = self.users.get_mut(&caller).ok_or(LedgerError::NotRegistered)?;
        user.recycled_amount = new_recycled;
        user.reputation = new_reputation;

        Ok(TransitionEffect::EwasteRecycled { id, weight, minted })
    }

    fn create_errand(
        &mut self,
        caller: Address,
        description: &str,
        reward: Amount,
    ) -> Result<TransitionEffect, LedgerError> {
        check_text(description)?;
        if !self.users.get(&caller).is_some_and(|u| u.registered) {
            return Err(LedgerError::NotRegistered);
        }

        let available = self.balance_of(caller);
        if available < reward {
            return Err(LedgerError::InsufficientBalance {
                required: reward,
                available,
            });
        }
        let new_escrow = self.escrow.checked_add(reward).ok_or(LedgerError::Overflow)?;

        let id = self.errands.len() as ErrandId;
        self.errands.push(ErrandRecord {
            id,
            runner: None,
            creator: caller,
            description: description.to_string(),
            reward,
            completed: false,
        });
        self.balances.insert(caller, available - reward);
        self.escrow = new_escrow;

        Ok(TransitionEffect::ErrandCreated { id, reward })
    }

    fn complete_errand(
        &mut self,
        caller: Address,
        id: ErrandId,
    ) -> Result<TransitionEffect, LedgerError> {
        if !self.users.get(&caller).is_some_and(|u| u.registered) {
            return Err(LedgerError::NotRegistered);
        }
        let errand = self
            .errands
            .get(id as usize)
            .ok_or(LedgerError::InvalidIndex { index: id })?;

        // First-writer-wins guard: runner assignment is checked before the
        // completion flag, so every later caller observes AlreadyAssigned.
        if errand.runner.is_some() {
            return Err(LedgerError::AlreadyAssigned);
        }
        if errand.completed {
            return Err(LedgerError::AlreadyCompleted);
        }

        let reward = errand.reward;
        let new_balance = self
            .balance_of(caller)
            .checked_add(reward)
            .ok_or(LedgerError::Overflow)?;
        let new_escrow = self.escrow.checked_sub(reward).ok_or(LedgerError::Overflow)?;
        let new_reputation = self
            .users
            .get(&caller)
            .ok_or(LedgerError::NotRegistered)?
            .reputation
            .checked_add(1)
            .ok_or(LedgerError::Overflow)?;

        let errand = self
            .errands
            .get_mut(id as usize)
            .ok_or(LedgerError::InvalidIndex { index: id })?;
        errand.runner = Some(caller);
        errand.completed = true;
        self.escrow = new_escrow;
        self.balances.insert(caller, new_balance);
        if let Some(user) = self.users.get_mut(&caller) {
            user.reputation = new_reputation;
        }

        Ok(TransitionEffect::ErrandCompleted {
            id,
            runner: caller,
            reward,
        })
    }

    fn verify_buyer(
        &mut self,
        caller: Address,
        buyer: Address,
    ) -> Result<TransitionEffect, LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized);
        }
        let record = self.buyers.get_mut(&buyer).ok_or(LedgerError::NotRegistered)?;
        if record.verified {
            return Err(LedgerError::AlreadyVerified);
        }

        record.verified = true;
        Ok(TransitionEffect::BuyerVerified { buyer })
    }

    fn process_ewaste(
        &mut self,
        caller: Address,
        id: EwasteId,
    ) -> Result<TransitionEffect, LedgerError> {
        if !self.buyers.get(&caller).is_some_and(|b| b.verified) {
            return Err(LedgerError::Unauthorized);
        }
        let record = self
            .ewaste
            .get(id as usize)
            .ok_or(LedgerError::InvalidIndex { index: id })?;
        if record.processed {
            return Err(LedgerError::AlreadyProcessed);
        }

        let recycler = record.recycler;
        let new_reputation = self
            .users
            .get(&recycler)
            .ok_or(LedgerError::NotRegistered)?
            .reputation
            .checked_add(2)
            .ok_or(LedgerError::Overflow)?;

        if let Some(record) = self.ewaste.get_mut(id as usize) {
            record.processed = true;
        }
        if let Some(user) = self.users.get_mut(&recycler) {
            user.reputation = new_reputation;
        }

        Ok(TransitionEffect::EwasteProcessed { id, recycler })
    }

    fn pay_for_ewaste(
        &mut self,
        caller: Address,
        recycler: Address,
        amount: Amount,
    ) -> Result<TransitionEffect, LedgerError> {
        if !self.buyers.get(&caller).is_some_and(|b| b.verified) {
            return Err(LedgerError::Unauthorized);
        }
        // No linkage to a specific e-waste record is enforced; the protocol
        // allows free-form payment from a verified buyer to any address.
        self.move_tokens(caller, recycler, amount)?;
        Ok(TransitionEffect::PaymentSent {
            from: caller,
            to: recycler,
            amount,
        })
    }

    fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        value: Amount,
    ) -> Result<TransitionEffect, LedgerError> {
        self.move_tokens(caller, to, value)?;
        Ok(TransitionEffect::Transferred {
            from: caller,
            to,
            value,
        })
    }

    fn approve(
        &mut self,
        caller: Address,
        spender: Address,
        value: Amount,
    ) -> Result<TransitionEffect, LedgerError> {
        self.allowances.insert((caller, spender), value);
        Ok(TransitionEffect::Approved {
            owner: caller,
            spender,
            value,
        })
    }

    fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        value: Amount,
    ) -> Result<TransitionEffect, LedgerError> {
        let allowance = self.allowance(from, caller);
        if allowance < value {
            return Err(LedgerError::InsufficientAllowance {
                required: value,
                available: allowance,
            });
        }

        self.move_tokens(from, to, value)?;
        self.allowances.insert((from, caller), allowance - value);
        Ok(TransitionEffect::Transferred { from, to, value })
    }

    /// Move tokens between balances with full validation up front.
    fn move_tokens(
        &mut self,
        from: Address,
        to: Address,
        value: Amount,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        if available < value {
            return Err(LedgerError::InsufficientBalance {
                required: value,
                available,
            });
        }
        if from == to {
            // Self-transfer is a no-op once the balance check passes.
            return Ok(());
        }
        let new_to = self
            .balance_of(to)
            .checked_add(value)
            .ok_or(LedgerError::Overflow)?;

        self.balances.insert(from, available - value);
        self.balances.insert(to, new_to);
        Ok(())
    }

}

fn check_text(text: &str) -> Result<(), LedgerError> {
    if text.len() > MAX_TEXT_LEN {
        return Err(LedgerError::TextTooLong {
            len: text.len(),
            max: MAX_TEXT_LEN,
        });
    }
    Ok(())
}
