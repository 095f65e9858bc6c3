//! Shared building blocks for the Good Pax services.
//!
//! Table of contents:
//! - [`config`]: chain environments, client and application configuration.
//! - [`eth`]: address parsing, hex quantities and the minimal ABI plumbing
//!   used by the contract-backed SDK clients.
//! - [`chain`]: read-side chain access, receipts, typed-data payloads.
//! - [`rpc`]: JSON-RPC implementation of [`chain::ChainReadClient`].
//! - [`wallet`]: wallet session and signing seams.
//! - [`sdk`]: the GoodDollar SDK surfaces this app orchestrates.

pub mod chain;
pub mod config;
pub mod eth;
pub mod rpc;
pub mod sdk;
pub mod wallet;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use chain::{ChainReadClient, ReceiptStatus, TransactionReceipt, TypedData};
pub use config::{AppConfig, ChainClientConfig, ChainEnv, HttpClientConfig};
pub use sdk::{
    CitizenSdkConnector, ClaimReceipt, ClaimSdk, EngagementRewardsSdk, Entitlement, IdentitySdk,
    SdkError,
};
pub use wallet::{WalletClient, WalletSession};
