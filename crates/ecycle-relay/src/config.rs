use std::time::Duration;

use ecycle_types::Amount;

/// Tuning for submission, confirmation waiting, and gas prefunding.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Receipt polling cadence during a confirmation wait.
    pub poll_interval: Duration,
    /// Maximum wait for a receipt per submission attempt.
    pub confirm_timeout: Duration,
    /// Total submission attempts (first try plus resubmissions).
    pub max_attempts: u32,
    /// Sleep before the first resubmission; doubles on each further attempt.
    pub retry_backoff: Duration,
    /// Native coin granted per faucet funding transfer.
    pub funding_amount: Amount,
    /// Native balance below which an account gets topped up.
    pub funding_low_water: Amount,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(25),
            confirm_timeout: Duration::from_secs(2),
            max_attempts: 3,
            retry_backoff: Duration::from_millis(100),
            funding_amount: 100,
            funding_low_water: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_bounded() {
        let c = RelayConfig::default();
        assert!(c.max_attempts >= 1);
        assert!(c.poll_interval < c.confirm_timeout);
        assert!(c.funding_low_water < c.funding_amount);
    }
}
