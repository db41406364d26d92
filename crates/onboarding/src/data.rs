//! Context data of the fundSafeFromEoa process

use serde::{Deserialize, Serialize};

/// Data carried through a fundSafeFromEoa instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundSafeFromEoaData {
    /// Account the funds are taken from
    #[serde(default)]
    pub eoa_address: String,

    /// Safe receiving the funds
    #[serde(default)]
    pub safe_address: String,

    /// Hash of the funding transaction, set once it was sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

impl FundSafeFromEoaData {
    pub fn new(eoa_address: impl Into<String>, safe_address: impl Into<String>) -> Self {
        Self {
            eoa_address: eoa_address.into(),
            safe_address: safe_address.into(),
            transaction_hash: None,
        }
    }
}
