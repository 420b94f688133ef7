use serde::{Deserialize, Serialize};

use ecycle_types::{Address, Amount, ErrandId, EwasteId};

/// Per-account recycler record. Created once by registration, never deleted.
///
/// `reputation` and `recycled_amount` are monotonic non-decreasing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub registered: bool,
    pub reputation: u64,
    pub recycled_amount: Amount,
}

/// Per-account buyer record, created by self-registration (unverified).
///
/// Re-registration before verification overwrites the descriptive fields;
/// `verified` flips false→true exactly once, by the contract owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerRecord {
    pub name: String,
    pub verified: bool,
    pub location: String,
    pub additional_info: String,
}

/// A submitted batch of e-waste.
///
/// `collected` is carried for pickup tracking but no transition currently
/// sets it; `processed` flips false→true exactly once, by a verified buyer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EwasteRecord {
    pub id: EwasteId,
    pub recycler: Address,
    pub description: String,
    pub weight: Amount,
    pub collected: bool,
    pub processed: bool,
}

/// A task bounty with its reward escrowed by the contract.
///
/// `runner` is `None` until the first registered account completes the
/// errand; assignment and completion happen in the same transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrandRecord {
    pub id: ErrandId,
    pub runner: Option<Address>,
    pub creator: Address,
    pub description: String,
    pub reward: Amount,
    pub completed: bool,
}

/// An atomic state-transition request against the contract.
///
/// The caller identity is not part of the transition; it is supplied by the
/// execution substrate from the transaction's verified sender.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    RegisterUser,
    RegisterBuyer {
        name: String,
        location: String,
        additional_info: String,
    },
    RecycleEwaste {
        description: String,
        weight: Amount,
    },
    CreateErrand {
        description: String,
        reward: Amount,
    },
    CompleteErrand {
        errand: ErrandId,
    },
    VerifyBuyer {
        buyer: Address,
    },
    ProcessEwaste {
        ewaste: EwasteId,
    },
    PayForEwaste {
        recycler: Address,
        amount: Amount,
    },
    Transfer {
        to: Address,
        value: Amount,
    },
    Approve {
        spender: Address,
        value: Amount,
    },
    TransferFrom {
        from: Address,
        to: Address,
        value: Amount,
    },
}

impl Transition {
    /// Short operation name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterUser => "register_user",
            Self::RegisterBuyer { .. } => "register_buyer",
            Self::RecycleEwaste { .. } => "recycle_ewaste",
            Self::CreateErrand { .. } => "create_errand",
            Self::CompleteErrand { .. } => "complete_errand",
            Self::VerifyBuyer { .. } => "verify_buyer",
            Self::ProcessEwaste { .. } => "process_ewaste",
            Self::PayForEwaste { .. } => "pay_for_ewaste",
            Self::Transfer { .. } => "transfer",
            Self::Approve { .. } => "approve",
            Self::TransferFrom { .. } => "transfer_from",
        }
    }
}

/// What an applied transition produced, echoed back in the receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionEffect {
    UserRegistered {
        account: Address,
    },
    BuyerRegistered {
        account: Address,
    },
    EwasteRecycled {
        id: EwasteId,
        weight: Amount,
        minted: Amount,
    },
    ErrandCreated {
        id: ErrandId,
        reward: Amount,
    },
    ErrandCompleted {
        id: ErrandId,
        runner: Address,
        reward: Amount,
    },
    BuyerVerified {
        buyer: Address,
    },
    EwasteProcessed {
        id: EwasteId,
        recycler: Address,
    },
    PaymentSent {
        from: Address,
        to: Address,
        amount: Amount,
    },
    Transferred {
        from: Address,
        to: Address,
        value: Amount,
    },
    Approved {
        owner: Address,
        spender: Address,
        value: Amount,
    },
}
