use serde::{Deserialize, Serialize};

use ecycle_ledger::{BuyerRecord, ErrandRecord, EwasteRecord};
use ecycle_types::{Address, Amount, ErrandId, EwasteId};

/// A read-only projection over confirmed substrate state.
///
/// Views never mutate and never observe un-sealed transactions; a transition
/// is visible to views only once its receipt exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    TokenBalance(Address),
    NativeBalance(Address),
    AccountNonce(Address),
    Reputation(Address),
    RecycledAmount(Address),
    BuyerInfo(Address),
    Errand(ErrandId),
    ErrandCount,
    Ewaste(EwasteId),
    EwasteCount,
    Allowance { owner: Address, spender: Address },
    TotalSupply,
    EscrowBalance,
    ContractOwner,
    Height,
}

/// Result of evaluating a [`View`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewResult {
    Amount(Amount),
    Count(u64),
    Buyer(Option<BuyerRecord>),
    Errand(Option<ErrandRecord>),
    Ewaste(Option<EwasteRecord>),
    Address(Address),
}

impl ViewResult {
    pub fn into_amount(self) -> Option<Amount> {
        match self {
            Self::Amount(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_count(self) -> Option<u64> {
        match self {
            Self::Count(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_buyer(self) -> Option<Option<BuyerRecord>> {
        match self {
            Self::Buyer(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_errand(self) -> Option<Option<ErrandRecord>> {
        match self {
            Self::Errand(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_ewaste(self) -> Option<Option<EwasteRecord>> {
        match self {
            Self::Ewaste(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_address(self) -> Option<Address> {
        match self {
            Self::Address(v) => Some(v),
            _ => None,
        }
    }
}
