//! Funds transfer configuration

use std::env;

use crate::gateway::Wei;

/// 0.03 ether
pub const DEFAULT_MIN_ACCOUNT_BALANCE_WEI: Wei = 30_000_000_000_000_000;

/// Gas limit of a plain value transfer into a safe
pub const DEFAULT_GAS_LIMIT: u64 = 41_000;

/// Configuration for [`TransferFunds`](crate::TransferFunds)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    /// Balance left behind on the EOA
    pub min_account_balance_wei: Wei,

    /// Gas limit of the funding transaction
    pub gas_limit: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            min_account_balance_wei: DEFAULT_MIN_ACCOUNT_BALANCE_WEI,
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }
}

impl TransferConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `FUND_SAFE_MIN_BALANCE_WEI`: reserve kept on the EOA (default: 30000000000000000)
    /// - `FUND_SAFE_GAS_LIMIT`: gas limit (default: 41000)
    pub fn from_env() -> Self {
        let min_account_balance_wei = env::var("FUND_SAFE_MIN_BALANCE_WEI")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MIN_ACCOUNT_BALANCE_WEI);

        let gas_limit = env::var("FUND_SAFE_GAS_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|gas: &u64| *gas > 0)
            .unwrap_or(DEFAULT_GAS_LIMIT);

        Self {
            min_account_balance_wei,
            gas_limit,
        }
    }

    pub fn with_min_account_balance(mut self, wei: Wei) -> Self {
        self.min_account_balance_wei = wei;
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }
}
