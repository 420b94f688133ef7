use std::time::Duration;

use ecycle_types::{Address, Amount};

/// Initial substrate state fixed at chain construction.
#[derive(Clone, Debug)]
pub struct GenesisConfig {
    /// The privileged contract owner (can verify buyers).
    pub contract_owner: Address,
    /// Initial native-coin allocations (funding accounts, operators).
    pub native_balances: Vec<(Address, Amount)>,
}

impl GenesisConfig {
    pub fn new(contract_owner: Address) -> Self {
        Self {
            contract_owner,
            native_balances: Vec::new(),
        }
    }

    pub fn with_native_balance(mut self, account: Address, amount: Amount) -> Self {
        self.native_balances.push((account, amount));
        self
    }
}

/// Runtime parameters of the in-process chain.
#[derive(Clone, Debug)]
pub struct ChainConfig {
    /// Flat native fee charged per applied or reverted transaction.
    pub base_fee: Amount,
    /// Seal-loop tick for the auto-sealing task.
    pub block_interval: Duration,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            base_fee: 1,
            block_interval: Duration::from_millis(50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ChainConfig::default();
        assert_eq!(c.base_fee, 1);
        assert_eq!(c.block_interval, Duration::from_millis(50));
    }

    #[test]
    fn genesis_builder() {
        let owner = Address::from_raw([1; 20]);
        let funder = Address::from_raw([2; 20]);
        let genesis = GenesisConfig::new(owner).with_native_balance(funder, 1_000);
        assert_eq!(genesis.contract_owner, owner);
        assert_eq!(genesis.native_balances, vec![(funder, 1_000)]);
    }
}
