use alloy_primitives::{Address, Bytes};
use anyhow::anyhow;
use async_trait::async_trait;
use pax_lib::{sdk::EngagementRewardsSdk, SdkError, WalletClient};
use std::sync::Arc;

/// App-side claim authorization. This is the one surface where a
/// server-held key signs on behalf of the app; everything above it only
/// ever sees the resulting signature bytes.
#[async_trait]
pub trait AppClaimSigner: Send + Sync {
    fn app_address(&self) -> Address;
    async fn sign_app_claim(
        &self,
        user: Address,
        valid_until_block: u64,
    ) -> Result<Bytes, SdkError>;
}

/// Production signer: the rewards SDK prepares the typed-data payload and
/// the app wallet signs it.
pub struct SdkAppSigner {
    sdk: Arc<dyn EngagementRewardsSdk>,
    wallet: Arc<dyn WalletClient>,
    app: Address,
}

impl SdkAppSigner {
    pub fn new(
        sdk: Arc<dyn EngagementRewardsSdk>,
        wallet: Arc<dyn WalletClient>,
        app: Address,
    ) -> Self {
        Self { sdk, wallet, app }
    }
}

#[async_trait]
impl AppClaimSigner for SdkAppSigner {
    fn app_address(&self) -> Address {
        self.app
    }

    async fn sign_app_claim(
        &self,
        user: Address,
        valid_until_block: u64,
    ) -> Result<Bytes, SdkError> {
        let payload = self
            .sdk
            .prepare_app_signature(self.app, user, valid_until_block)
            .await?;
        self.wallet
            .sign_typed_data(&payload)
            .await
            .map_err(|e| anyhow!(e))
    }
}
