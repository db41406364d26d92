//! Funds transfer from the EOA into the safe

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, instrument};
use waypoint_process::{Operation, OperationError, ProcessContext};

use crate::config::TransferConfig;
use crate::data::FundSafeFromEoaData;
use crate::gateway::{ChainGateway, UnsignedTransaction, Wallet, WalletError, Wei};

/// Transfers everything above fees and the configured reserve from
/// `eoaAddress` to `safeAddress`
///
/// Resolves with the transaction hash. Preconditions are checked before the
/// gateway is contacted.
pub struct TransferFunds {
    wallet: Arc<dyn Wallet>,
    gateway: Arc<dyn ChainGateway>,
    config: TransferConfig,
}

impl TransferFunds {
    pub fn new(wallet: Arc<dyn Wallet>, gateway: Arc<dyn ChainGateway>) -> Self {
        Self::with_config(wallet, gateway, TransferConfig::default())
    }

    pub fn with_config(
        wallet: Arc<dyn Wallet>,
        gateway: Arc<dyn ChainGateway>,
        config: TransferConfig,
    ) -> Self {
        Self {
            wallet,
            gateway,
            config,
        }
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }
}

/// Amount left after fees and reserve, if any
pub fn available_for_transfer(
    balance: Wei,
    gas_price: Wei,
    gas_limit: u64,
    min_account_balance: Wei,
) -> Option<Wei> {
    gas_price
        .checked_mul(Wei::from(gas_limit))
        .and_then(|fee| balance.checked_sub(fee))
        .and_then(|rest| rest.checked_sub(min_account_balance))
}

fn require(value: &str, property: &str) -> Result<(), OperationError> {
    if value.trim().is_empty() {
        return Err(
            OperationError::new(format!("The context's '{property}' property is not set."))
                .with_type("MISSING_PRECONDITION"),
        );
    }
    Ok(())
}

#[async_trait]
impl Operation<FundSafeFromEoaData> for TransferFunds {
    type Output = String;

    fn name(&self) -> &str {
        "transfer_funds"
    }

    #[instrument(skip_all, fields(process_id = %ctx.process_id))]
    async fn run(&self, ctx: &ProcessContext<FundSafeFromEoaData>) -> Result<String, OperationError> {
        if !self.wallet.is_unlocked() {
            return Err(WalletError::Locked.into());
        }

        let data = &ctx.data;
        require(&data.eoa_address, "eoaAddress")?;
        require(&data.safe_address, "safeAddress")?;

        let balance = self.gateway.balance(&data.eoa_address).await?;
        let gas_price = self.gateway.gas_price().await?;
        let nonce = self.gateway.transaction_count(&data.eoa_address).await?;

        let value = available_for_transfer(
            balance,
            gas_price,
            self.config.gas_limit,
            self.config.min_account_balance_wei,
        )
        .ok_or_else(|| {
            OperationError::new("insufficient balance")
                .with_type("INSUFFICIENT_BALANCE")
                .with_details(json!({
                    "balance": balance.to_string(),
                    "gasPrice": gas_price.to_string(),
                    "gasLimit": self.config.gas_limit,
                    "minAccountBalance": self.config.min_account_balance_wei.to_string(),
                }))
        })?;

        debug!(eoa = %data.eoa_address, safe = %data.safe_address, %value, nonce, "signing funding transaction");

        let signed = self
            .wallet
            .sign_transaction(&UnsignedTransaction {
                from: data.eoa_address.clone(),
                to: data.safe_address.clone(),
                value,
                gas_price,
                gas: self.config.gas_limit,
                nonce,
            })
            .await?;

        let raw = signed
            .raw_transaction
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| {
                OperationError::new("Couldn't send the funding transaction")
                    .with_type("SIGNING_FAILED")
            })?;

        let receipt = self.gateway.send_raw_transaction(&raw).await?;
        info!(
            safe = %data.safe_address,
            transaction_hash = %receipt.transaction_hash,
            "funded safe from eoa"
        );

        Ok(receipt.transaction_hash)
    }
}
