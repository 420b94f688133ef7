//! Read-only projections over [`ContractState`].
//!
//! Views have no side effects and reflect exactly the state produced by the
//! most recently applied transition; visibility timing relative to in-flight
//! submissions is the substrate's concern.

use ecycle_types::{Address, Amount, ErrandId, EwasteId};

use crate::records::{BuyerRecord, ErrandRecord, EwasteRecord, UserRecord};
use crate::state::ContractState;

impl ContractState {
    /// The privileged owner account fixed at deployment.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Total minted token supply.
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Tokens held by the contract pending errand completion.
    pub fn escrow_balance(&self) -> Amount {
        self.escrow
    }

    /// Token balance of an account (0 for unknown accounts).
    pub fn balance_of(&self, account: Address) -> Amount {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    /// Remaining delegated spend for `(owner, spender)` (0 if never approved).
    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    /// The user record for an account, if it ever registered.
    pub fn user(&self, account: Address) -> Option<&UserRecord> {
        self.users.get(&account)
    }

    /// Whether an account is a registered user.
    pub fn is_registered(&self, account: Address) -> bool {
        self.users.get(&account).is_some_and(|u| u.registered)
    }

    /// Reputation score (0 for unregistered accounts).
    pub fn reputation_of(&self, account: Address) -> u64 {
        self.users.get(&account).map_or(0, |u| u.reputation)
    }

    /// Lifetime recycled weight (0 for unregistered accounts).
    pub fn recycled_amount_of(&self, account: Address) -> Amount {
        self.users.get(&account).map_or(0, |u| u.recycled_amount)
    }

    /// The buyer record for an account, if one was self-registered.
    pub fn buyer(&self, account: Address) -> Option<&BuyerRecord> {
        self.buyers.get(&account)
    }

    /// An e-waste record by id.
    pub fn ewaste(&self, id: EwasteId) -> Option<&EwasteRecord> {
        self.ewaste.get(id as usize)
    }

    /// Number of e-waste records ever created.
    pub fn ewaste_count(&self) -> u64 {
        self.ewaste.len() as u64
    }

    /// An errand by id.
    pub fn errand(&self, id: ErrandId) -> Option<&ErrandRecord> {
        self.errands.get(id as usize)
    }

    /// Number of errands ever created.
    pub fn errand_count(&self) -> u64 {
        self.errands.len() as u64
    }

    /// Check the conservation invariant:
    /// `sum(balances) + escrow == total_supply`.
    ///
    /// Used by tests and debug assertions; a `false` here means a transition
    /// minted, burned, or duplicated value outside the rules.
    pub fn supply_invariant_holds(&self) -> bool {
        let circulating = self
            .balances
            .values()
            .try_fold(0 as Amount, |acc, v| acc.checked_add(*v));
        match circulating.and_then(|c| c.checked_add(self.escrow)) {
            Some(total) => total == self.total_supply,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Transition;

    fn addr(seed: u8) -> Address {
        Address::from_raw([seed; 20])
    }

    fn populated() -> ContractState {
        let mut s = ContractState::new(addr(0xee));
        s.apply(addr(1), &Transition::RegisterUser).unwrap();
        s.apply(
            addr(1),
            &Transition::RecycleEwaste {
                description: "phone batteries".into(),
                weight: 7,
            },
        )
        .unwrap();
        s.apply(
            addr(1),
            &Transition::CreateErrand {
                description: "collect from dropoff".into(),
                reward: 20,
            },
        )
        .unwrap();
        s
    }

    #[test]
    fn unknown_accounts_read_as_zero() {
        let s = populated();
        assert_eq!(s.balance_of(addr(9)), 0);
        assert_eq!(s.reputation_of(addr(9)), 0);
        assert_eq!(s.recycled_amount_of(addr(9)), 0);
        assert_eq!(s.allowance(addr(9), addr(8)), 0);
        assert!(s.user(addr(9)).is_none());
        assert!(s.buyer(addr(9)).is_none());
    }

    #[test]
    fn counts_and_lookups_agree() {
        let s = populated();
        assert_eq!(s.ewaste_count(), 1);
        assert_eq!(s.errand_count(), 1);
        assert!(s.ewaste(0).is_some());
        assert!(s.ewaste(1).is_none());
        assert!(s.errand(0).is_some());
        assert!(s.errand(1).is_none());
    }

    #[test]
    fn supply_reflects_mint_and_escrow() {
        let s = populated();
        assert_eq!(s.total_supply(), 70);
        assert_eq!(s.balance_of(addr(1)), 50);
        assert_eq!(s.escrow_balance(), 20);
        assert!(s.supply_invariant_holds());
    }

    #[test]
    fn owner_is_fixed() {
        let s = populated();
        assert_eq!(s.owner(), addr(0xee));
    }

    #[test]
    fn is_registered_tracks_registration() {
        let s = populated();
        assert!(s.is_registered(addr(1)));
        assert!(!s.is_registered(addr(2)));
    }
}
