//! In-memory gateway and wallet
//!
//! Stand-ins for a real RPC client and key store, used by tests and local
//! demos. The gateway counts every call so tests can assert it was never
//! contacted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::gateway::{
    ChainGateway, GatewayError, SignedTransaction, TxReceipt, UnsignedTransaction, Wallet,
    WalletError, Wei,
};

/// Chain state held in memory
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    balances: Mutex<HashMap<String, Wei>>,
    nonces: Mutex<HashMap<String, u64>>,
    gas_price: Mutex<Wei>,
    sent: Mutex<Vec<String>>,
    fail_with: Mutex<Option<GatewayError>>,
    calls: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new(gas_price: Wei) -> Self {
        Self {
            gas_price: Mutex::new(gas_price),
            ..Default::default()
        }
    }

    pub fn with_balance(self, address: impl Into<String>, balance: Wei) -> Self {
        self.balances.lock().insert(address.into(), balance);
        self
    }

    pub fn with_nonce(self, address: impl Into<String>, nonce: u64) -> Self {
        self.nonces.lock().insert(address.into(), nonce);
        self
    }

    /// Make every following call fail with `error`
    pub fn fail_with(&self, error: GatewayError) {
        *self.fail_with.lock() = Some(error);
    }

    /// Number of gateway calls made
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Raw transactions sent so far
    pub fn sent_transactions(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    fn record_call(&self) -> Result<(), GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_with.lock().as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ChainGateway for InMemoryGateway {
    async fn balance(&self, address: &str) -> Result<Wei, GatewayError> {
        self.record_call()?;
        Ok(self.balances.lock().get(address).copied().unwrap_or(0))
    }

    async fn gas_price(&self) -> Result<Wei, GatewayError> {
        self.record_call()?;
        Ok(*self.gas_price.lock())
    }

    async fn transaction_count(&self, address: &str) -> Result<u64, GatewayError> {
        self.record_call()?;
        Ok(self.nonces.lock().get(address).copied().unwrap_or(0))
    }

    async fn send_raw_transaction(&self, raw_transaction: &str) -> Result<TxReceipt, GatewayError> {
        self.record_call()?;
        let mut sent = self.sent.lock();
        sent.push(raw_transaction.to_string());
        Ok(TxReceipt {
            transaction_hash: format!("0x{:064x}", sent.len()),
        })
    }
}

/// Wallet that "signs" by encoding the transaction
///
/// The raw transaction is the JSON encoding of the unsigned transaction.
#[derive(Debug)]
pub struct StaticWallet {
    unlocked: AtomicBool,
    omit_raw_transaction: AtomicBool,
    signed: Mutex<Vec<UnsignedTransaction>>,
}

impl StaticWallet {
    pub fn unlocked() -> Self {
        Self {
            unlocked: AtomicBool::new(true),
            omit_raw_transaction: AtomicBool::new(false),
            signed: Mutex::new(Vec::new()),
        }
    }

    pub fn locked() -> Self {
        let wallet = Self::unlocked();
        wallet.lock();
        wallet
    }

    pub fn lock(&self) {
        self.unlocked.store(false, Ordering::SeqCst);
    }

    /// Make signing return no raw transaction
    pub fn omit_raw_transaction(&self) {
        self.omit_raw_transaction.store(true, Ordering::SeqCst);
    }

    /// Transactions signed so far
    pub fn signed_transactions(&self) -> Vec<UnsignedTransaction> {
        self.signed.lock().clone()
    }
}

#[async_trait]
impl Wallet for StaticWallet {
    fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }

    async fn sign_transaction(
        &self,
        transaction: &UnsignedTransaction,
    ) -> Result<SignedTransaction, WalletError> {
        if !self.is_unlocked() {
            return Err(WalletError::Locked);
        }
        self.signed.lock().push(transaction.clone());

        if self.omit_raw_transaction.load(Ordering::SeqCst) {
            return Ok(SignedTransaction {
                raw_transaction: None,
            });
        }

        let raw = serde_json::to_string(transaction)
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(SignedTransaction {
            raw_transaction: Some(raw),
        })
    }
}
