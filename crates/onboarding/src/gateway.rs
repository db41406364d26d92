//! Chain access and signing capabilities

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use waypoint_process::OperationError;

/// Amount in wei
pub type Wei = u128;

/// Transaction to be signed
///
/// Amounts serialize as decimal strings, since JSON numbers cannot hold every
/// wei value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    pub from: String,
    pub to: String,
    #[serde(with = "wei_string")]
    pub value: Wei,
    #[serde(with = "wei_string")]
    pub gas_price: Wei,
    pub gas: u64,
    pub nonce: u64,
}

/// Result of signing
///
/// Signers may return no raw transaction, which callers treat as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    pub raw_transaction: Option<String>,
}

/// Receipt of a sent transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: String,
}

/// Errors from the chain gateway
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The RPC endpoint could not be reached or answered with an error
    #[error("rpc request failed: {0}")]
    Rpc(String),

    /// The node rejected the transaction
    #[error("transaction rejected: {0}")]
    Rejected(String),
}

impl From<GatewayError> for OperationError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rpc(_) => OperationError::retryable(err.to_string()).with_type("RPC"),
            GatewayError::Rejected(_) => {
                OperationError::new(err.to_string()).with_type("TX_REJECTED")
            }
        }
    }
}

/// Read access to the chain plus transaction submission
#[async_trait]
pub trait ChainGateway: Send + Sync {
    async fn balance(&self, address: &str) -> Result<Wei, GatewayError>;

    async fn gas_price(&self) -> Result<Wei, GatewayError>;

    /// Next nonce for `address`
    async fn transaction_count(&self, address: &str) -> Result<u64, GatewayError>;

    async fn send_raw_transaction(&self, raw_transaction: &str) -> Result<TxReceipt, GatewayError>;
}

/// Errors from the wallet
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("The private key is not unlocked")]
    Locked,

    #[error("signing failed: {0}")]
    Signing(String),
}

impl From<WalletError> for OperationError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Locked => OperationError::new(err.to_string()).with_type("WALLET_LOCKED"),
            WalletError::Signing(_) => {
                OperationError::new(err.to_string()).with_type("SIGNING_FAILED")
            }
        }
    }
}

/// Holder of the signing key
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Whether the key is available for signing
    fn is_unlocked(&self) -> bool;

    async fn sign_transaction(
        &self,
        transaction: &UnsignedTransaction,
    ) -> Result<SignedTransaction, WalletError>;
}

/// Serde support for Wei as a decimal string
mod wei_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::Wei;

    pub fn serialize<S>(wei: &Wei, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(wei)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Wei, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| D::Error::custom(format!("invalid wei amount: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_errors_are_retryable() {
        let err: OperationError = GatewayError::Rpc("connection reset".to_string()).into();
        assert!(err.retryable);
        assert_eq!(err.message, "rpc request failed: connection reset");
        assert_eq!(err.error_type.as_deref(), Some("RPC"));
    }

    #[test]
    fn test_rejections_are_permanent() {
        let err: OperationError = GatewayError::Rejected("nonce too low".to_string()).into();
        assert!(!err.retryable);
        assert_eq!(err.error_type.as_deref(), Some("TX_REJECTED"));
    }

    #[test]
    fn test_unsigned_transaction_serialization() {
        let tx = UnsignedTransaction {
            from: "0xeoa".to_string(),
            to: "0xsafe".to_string(),
            value: 1,
            gas_price: 2,
            gas: 41_000,
            nonce: 7,
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["value"], "1");
        assert_eq!(json["gasPrice"], "2");
        assert_eq!(json["nonce"], 7);
    }

    #[test]
    fn test_unsigned_transaction_keeps_amounts_above_u64() {
        let tx = UnsignedTransaction {
            from: "0xeoa".to_string(),
            to: "0xsafe".to_string(),
            value: Wei::MAX,
            gas_price: u64::MAX as Wei + 1,
            gas: 41_000,
            nonce: 0,
        };

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["value"], Wei::MAX.to_string());
        assert_eq!(json["gasPrice"], "18446744073709551616");

        let parsed: UnsignedTransaction = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, tx);
    }

    #[test]
    fn test_unsigned_transaction_rejects_bad_amount() {
        let result = serde_json::from_value::<UnsignedTransaction>(serde_json::json!({
            "from": "0xeoa",
            "to": "0xsafe",
            "value": "-5",
            "gasPrice": "1",
            "gas": 41000,
            "nonce": 0,
        }));

        let err = result.unwrap_err().to_string();
        assert!(err.contains("invalid wei amount: -5"), "{err}");
    }
}
