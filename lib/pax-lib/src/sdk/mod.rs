//! The GoodDollar SDK surfaces this app orchestrates. Internals (EIP-712
//! hashing, signing, on-chain entitlement accounting) belong to the SDKs
//! and contracts; these traits pin down the call/response contracts only.

pub mod engagement;
pub mod identity;
pub mod ubi;

pub use engagement::{ContractEngagementRewards, EngagementRewardsSdk};
pub use identity::{GoodIdSdk, IdentitySdk};
pub use ubi::{
    CitizenSdkConnector, ClaimReceipt, ClaimSdk, ContractClaimSdk, ContractSdkConnector,
    Entitlement,
};

/// Error type of SDK calls. Every failure carries a human-readable message
/// suitable for direct display.
pub type SdkError = anyhow::Error;
