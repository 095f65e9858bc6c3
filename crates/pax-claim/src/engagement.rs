use crate::{
    analytics::{AnalyticsEvent, AnalyticsSink, ENGAGEMENT_REWARD_VALUE},
    app_signature::AppSignatureApi,
    attribution::ClickIdStore,
    claim_failure_status,
    ubi::{STATUS_CONNECT_WALLET, STATUS_PROCESSING},
};
use alloy_primitives::{Address, B256};
use anyhow::anyhow;
use chrono::Utc;
use pax_lib::{sdk::EngagementRewardsSdk, ChainReadClient, SdkError, WalletSession};
use std::sync::Arc;
use tokio::sync::watch;

/// How many blocks an engagement claim authorization stays valid.
pub const VALIDITY_WINDOW_BLOCKS: u64 = 20;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngagementState {
    pub status: String,
    /// True while a claim attempt is in flight; the trigger is disabled.
    pub busy: bool,
}

enum Outcome {
    Confirmed(B256),
    Reverted(B256),
}

/// The engagement-reward claim sequence: current block, user signature, app
/// signature from the backend, submission, receipt check. Strictly linear;
/// nothing overlaps within one attempt.
pub struct EngagementFlow {
    sdk: Arc<dyn EngagementRewardsSdk>,
    signatures: Arc<dyn AppSignatureApi>,
    read: Arc<dyn ChainReadClient>,
    analytics: Arc<dyn AnalyticsSink>,
    attribution: Arc<ClickIdStore>,
    app: Address,
    inviter: Address,
    state: watch::Sender<EngagementState>,
}

impl EngagementFlow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sdk: Arc<dyn EngagementRewardsSdk>,
        signatures: Arc<dyn AppSignatureApi>,
        read: Arc<dyn ChainReadClient>,
        analytics: Arc<dyn AnalyticsSink>,
        attribution: Arc<ClickIdStore>,
        app: Address,
        inviter: Address,
    ) -> Self {
        let (state, _) = watch::channel(EngagementState::default());
        Self {
            sdk,
            signatures,
            read,
            analytics,
            attribution,
            app,
            inviter,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<EngagementState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> EngagementState {
        self.state.borrow().clone()
    }

    /// User-triggered claim. A missing wallet is refused with a status
    /// string; overlapping attempts are refused by the busy flag.
    pub async fn claim(&self, session: WalletSession) {
        let Some(user) = session.account() else {
            self.state
                .send_modify(|s| s.status = STATUS_CONNECT_WALLET.to_owned());
            return;
        };

        let mut started = false;
        self.state.send_modify(|s| {
            if !s.busy {
                s.busy = true;
                s.status = STATUS_PROCESSING.to_owned();
                started = true;
            }
        });
        if !started {
            return;
        }

        match self.run(user).await {
            Ok(Outcome::Confirmed(hash)) => {
                self.state.send_modify(|s| {
                    s.busy = false;
                    s.status = format!("Claim successful! Transaction: {hash}");
                });
                let click_id = self.attribution.get(Utc::now());
                self.analytics.track(AnalyticsEvent::EngagementRewardClaimed {
                    transaction_hash: hash,
                    amount: ENGAGEMENT_REWARD_VALUE.to_string(),
                    success: true,
                    click_id,
                });
            }
            Ok(Outcome::Reverted(hash)) => {
                self.state.send_modify(|s| {
                    s.busy = false;
                    s.status = format!("Claim failed: Transaction reverted. Transaction: {hash}");
                });
            }
            Err(error) => {
                tracing::warn!("engagement claim failed: {error:#}");
                self.state.send_modify(|s| {
                    s.busy = false;
                    s.status = claim_failure_status(&error.to_string());
                });
            }
        }
    }

    async fn run(&self, user: Address) -> Result<Outcome, SdkError> {
        self.set_status("User eligible, preparing claim...");
        let current_block = self.sdk.current_block().await?;
        let valid_until_block = current_block + VALIDITY_WINDOW_BLOCKS;

        self.set_status("Generating user signature...");
        let user_signature = self
            .sdk
            .sign_claim(self.app, self.inviter, valid_until_block)
            .await?;

        self.set_status("Getting app signature...");
        let app_signature = self
            .signatures
            .app_signature(user, valid_until_block, self.inviter)
            .await?;

        self.set_status("Submitting claim...");
        let receipt = self
            .sdk
            .app_claim(
                self.app,
                self.inviter,
                valid_until_block,
                user_signature,
                app_signature,
            )
            .await?;

        self.set_status("Checking transaction status...");
        match self.read.transaction_receipt(receipt.transaction_hash).await {
            Ok(Some(onchain)) if onchain.reverted() => {
                Ok(Outcome::Reverted(receipt.transaction_hash))
            }
            Ok(Some(_)) => Ok(Outcome::Confirmed(receipt.transaction_hash)),
            Ok(None) => {
                // app_claim resolves only once the transaction is mined
                tracing::warn!("no receipt found for {}", receipt.transaction_hash);
                Ok(Outcome::Confirmed(receipt.transaction_hash))
            }
            Err(error) => Err(anyhow!(error)),
        }
    }

    fn set_status(&self, status: &str) {
        self.state.send_modify(|s| s.status = status.to_owned());
    }
}
