use super::{
    identity::{GoodIdSdk, IdentitySdk},
    SdkError,
};
use crate::{
    chain::ChainReadClient,
    config::{AppConfig, ChainEnv},
    eth::{self, AbiToken},
    wallet::WalletClient,
};
use alloy_primitives::{Address, B256, U256};
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

/// Amount of reward token currently claimable, in base units. Zero means no
/// claim is available right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entitlement {
    pub amount: U256,
}

impl Entitlement {
    pub fn is_claimable(&self) -> bool {
        !self.amount.is_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub transaction_hash: B256,
}

/// Daily-UBI surface of the citizen SDK pairing.
#[async_trait]
pub trait ClaimSdk: Send + Sync {
    async fn check_entitlement(&self) -> Result<Entitlement, SdkError>;

    /// When the next UBI cooldown ends. Advisory only; the chain remains
    /// authoritative and this value can be stale under clock drift.
    async fn next_claim_time(&self) -> Result<DateTime<Utc>, SdkError>;

    async fn claim(&self) -> Result<ClaimReceipt, SdkError>;
}

/// Two-step construction seam for the citizen SDK pairing. The claim SDK is
/// contractually dependent on a live identity handle: [`connect_claim`] is
/// only ever called with the result of a successful [`connect_identity`].
///
/// [`connect_identity`]: CitizenSdkConnector::connect_identity
/// [`connect_claim`]: CitizenSdkConnector::connect_claim
#[async_trait]
pub trait CitizenSdkConnector: Send + Sync {
    async fn connect_identity(&self) -> Result<Arc<dyn IdentitySdk>, SdkError>;
    async fn connect_claim(
        &self,
        identity: Arc<dyn IdentitySdk>,
    ) -> Result<Arc<dyn ClaimSdk>, SdkError>;
}

/// Claim SDK over the UBI scheme contract: entitlement and next-claim-time
/// are view calls, the claim itself is a wallet-submitted transaction.
pub struct ContractClaimSdk {
    read: Arc<dyn ChainReadClient>,
    wallet: Arc<dyn WalletClient>,
    scheme: Address,
}

impl ContractClaimSdk {
    pub fn new(
        read: Arc<dyn ChainReadClient>,
        wallet: Arc<dyn WalletClient>,
        scheme: Address,
    ) -> Self {
        Self {
            read,
            wallet,
            scheme,
        }
    }
}

#[async_trait]
impl ClaimSdk for ContractClaimSdk {
    async fn check_entitlement(&self) -> Result<Entitlement, SdkError> {
        let data = eth::encode_call(
            eth::selector("checkEntitlement(address)"),
            &[AbiToken::Address(self.wallet.address())],
        );
        let ret = self
            .read
            .call(self.scheme, data)
            .await
            .map_err(|e| anyhow!(e))?;
        Ok(Entitlement {
            amount: eth::decode_uint(&ret)?,
        })
    }

    async fn next_claim_time(&self) -> Result<DateTime<Utc>, SdkError> {
        let data = eth::encode_call(eth::selector("nextClaimTime()"), &[]);
        let ret = self
            .read
            .call(self.scheme, data)
            .await
            .map_err(|e| anyhow!(e))?;
        let seconds = eth::decode_uint(&ret)?;
        let seconds = u64::try_from(seconds)
            .ok()
            .and_then(|s| i64::try_from(s).ok())
            .ok_or_else(|| anyhow!("next claim time out of range: {seconds}"))?;
        Utc.timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| anyhow!("next claim time out of range: {seconds}"))
    }

    async fn claim(&self) -> Result<ClaimReceipt, SdkError> {
        let data = eth::encode_call(eth::selector("claim()"), &[]);
        let transaction_hash = self
            .wallet
            .send_transaction(self.scheme, data)
            .await
            .map_err(|e| anyhow!(e))?;
        Ok(ClaimReceipt { transaction_hash })
    }
}

/// Production connector wiring the contract-backed SDK clients.
pub struct ContractSdkConnector {
    read: Arc<dyn ChainReadClient>,
    wallet: Arc<dyn WalletClient>,
    app: AppConfig,
    env: ChainEnv,
}

impl ContractSdkConnector {
    pub fn new(
        read: Arc<dyn ChainReadClient>,
        wallet: Arc<dyn WalletClient>,
        app: AppConfig,
        env: ChainEnv,
    ) -> Self {
        Self {
            read,
            wallet,
            app,
            env,
        }
    }
}

#[async_trait]
impl CitizenSdkConnector for ContractSdkConnector {
    async fn connect_identity(&self) -> Result<Arc<dyn IdentitySdk>, SdkError> {
        if self.app.identity_contract == Address::ZERO {
            bail!("identity contract not configured");
        }
        Ok(Arc::new(GoodIdSdk::new(self.env, self.wallet.address())))
    }

    async fn connect_claim(
        &self,
        _identity: Arc<dyn IdentitySdk>,
    ) -> Result<Arc<dyn ClaimSdk>, SdkError> {
        if self.app.ubi_scheme == Address::ZERO {
            bail!("UBI scheme contract not configured");
        }
        Ok(Arc::new(ContractClaimSdk::new(
            self.read.clone(),
            self.wallet.clone(),
            self.app.ubi_scheme,
        )))
    }
}
