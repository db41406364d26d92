//! # Onboarding Processes
//!
//! `fundSafeFromEoa` moves the balance of a user's externally owned account
//! into their new safe, keeping a small reserve for later transactions.
//!
//! ## Example
//!
//! ```ignore
//! use waypoint_onboarding::*;
//!
//! let transfer = TransferFunds::with_config(wallet, gateway, TransferConfig::from_env());
//! let definition = fund_safe_from_eoa(viewer, transfer)?;
//!
//! let report = ProcessExecutor::new()
//!     .run(
//!         &definition,
//!         FundSafeFromEoaData::new(eoa, safe),
//!         StartOptions::new(session_id).on_success(|data| notify_funded(data)),
//!     )
//!     .await?;
//! ```

pub mod config;
pub mod data;
pub mod fund_safe;
pub mod gateway;
pub mod memory;
pub mod transfer;

pub use config::TransferConfig;
pub use data::FundSafeFromEoaData;
pub use fund_safe::{fund_safe_from_eoa, info_view, FUND_SAFE_FROM_EOA};
pub use gateway::{
    ChainGateway, GatewayError, SignedTransaction, TxReceipt, UnsignedTransaction, Wallet,
    WalletError, Wei,
};
pub use memory::{InMemoryGateway, StaticWallet};
pub use transfer::{available_for_transfer, TransferFunds};
