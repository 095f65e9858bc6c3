use super::{ubi::ClaimReceipt, SdkError};
use crate::{
    chain::{ChainReadClient, TypedData},
    eth::{self, AbiToken},
    wallet::WalletClient,
};
use alloy_primitives::{Address, Bytes, U256};
use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Engagement-rewards surface: a one-time-per-cooldown reward requiring both
/// a user-signed and an app-signed authorization.
#[async_trait]
pub trait EngagementRewardsSdk: Send + Sync {
    async fn current_block(&self) -> Result<u64, SdkError>;

    /// User-side claim authorization, signed by the connected wallet.
    async fn sign_claim(
        &self,
        app: Address,
        inviter: Address,
        valid_until_block: u64,
    ) -> Result<Bytes, SdkError>;

    /// The app-side authorization payload, ready for a typed-data signer.
    /// Building the payload is data plumbing; hashing and signing are not.
    async fn prepare_app_signature(
        &self,
        app: Address,
        user: Address,
        valid_until_block: u64,
    ) -> Result<TypedData, SdkError>;

    /// Submit a claim carrying both authorizations.
    async fn app_claim(
        &self,
        app: Address,
        inviter: Address,
        valid_until_block: u64,
        user_signature: Bytes,
        app_signature: Bytes,
    ) -> Result<ClaimReceipt, SdkError>;
}

/// Contract-backed implementation over the deployed rewards contract.
pub struct ContractEngagementRewards {
    read: Arc<dyn ChainReadClient>,
    wallet: Arc<dyn WalletClient>,
    contract: Address,
    chain_id: u64,
}

impl ContractEngagementRewards {
    pub fn new(
        read: Arc<dyn ChainReadClient>,
        wallet: Arc<dyn WalletClient>,
        contract: Address,
        chain_id: u64,
    ) -> Self {
        Self {
            read,
            wallet,
            contract,
            chain_id,
        }
    }

    fn domain(&self) -> serde_json::Value {
        json!({
            "name": "EngagementRewards",
            "version": "1.0",
            "chainId": self.chain_id,
            "verifyingContract": self.contract,
        })
    }
}

#[async_trait]
impl EngagementRewardsSdk for ContractEngagementRewards {
    async fn current_block(&self) -> Result<u64, SdkError> {
        self.read.block_number().await.map_err(|e| anyhow!(e))
    }

    async fn sign_claim(
        &self,
        app: Address,
        inviter: Address,
        valid_until_block: u64,
    ) -> Result<Bytes, SdkError> {
        let data = TypedData {
            domain: self.domain(),
            types: json!({
                "Claim": [
                    {"name": "app", "type": "address"},
                    {"name": "inviter", "type": "address"},
                    {"name": "validUntilBlock", "type": "uint256"},
                ],
            }),
            primary_type: "Claim".to_owned(),
            message: json!({
                "app": app,
                "inviter": inviter,
                "validUntilBlock": valid_until_block.to_string(),
            }),
        };
        self.wallet
            .sign_typed_data(&data)
            .await
            .map_err(|e| anyhow!(e))
    }

    async fn prepare_app_signature(
        &self,
        app: Address,
        user: Address,
        valid_until_block: u64,
    ) -> Result<TypedData, SdkError> {
        Ok(TypedData {
            domain: self.domain(),
            types: json!({
                "AppClaim": [
                    {"name": "app", "type": "address"},
                    {"name": "user", "type": "address"},
                    {"name": "validUntilBlock", "type": "uint256"},
                ],
            }),
            primary_type: "AppClaim".to_owned(),
            message: json!({
                "app": app,
                "user": user,
                "validUntilBlock": valid_until_block.to_string(),
            }),
        })
    }

    async fn app_claim(
        &self,
        app: Address,
        inviter: Address,
        valid_until_block: u64,
        user_signature: Bytes,
        app_signature: Bytes,
    ) -> Result<ClaimReceipt, SdkError> {
        let data = eth::encode_call(
            eth::selector("nonContractAppClaim(address,address,uint256,bytes,bytes)"),
            &[
                AbiToken::Address(app),
                AbiToken::Address(inviter),
                AbiToken::Uint(U256::from(valid_until_block)),
                AbiToken::Bytes(user_signature.to_vec()),
                AbiToken::Bytes(app_signature.to_vec()),
            ],
        );
        let transaction_hash = self
            .wallet
            .send_transaction(self.contract, data)
            .await
            .map_err(|e| anyhow!(e))?;
        Ok(ClaimReceipt { transaction_hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::TransactionReceipt;
    use crate::BoxError;
    use alloy_primitives::B256;
    use std::sync::Mutex;

    struct NullRead;

    #[async_trait]
    impl ChainReadClient for NullRead {
        async fn call(&self, _to: Address, _data: Bytes) -> Result<Bytes, BoxError> {
            Ok(Bytes::new())
        }

        async fn block_number(&self) -> Result<u64, BoxError> {
            Ok(1_234)
        }

        async fn transaction_receipt(
            &self,
            _hash: B256,
        ) -> Result<Option<TransactionReceipt>, BoxError> {
            Ok(None)
        }
    }

    struct RecordingWallet {
        address: Address,
        signed: Mutex<Vec<TypedData>>,
        sent: Mutex<Vec<(Address, Bytes)>>,
    }

    impl RecordingWallet {
        fn new(address: Address) -> Self {
            Self {
                address,
                signed: Mutex::new(Vec::new()),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl WalletClient for RecordingWallet {
        fn address(&self) -> Address {
            self.address
        }

        async fn sign_typed_data(&self, data: &TypedData) -> Result<Bytes, BoxError> {
            self.signed.lock().unwrap().push(data.clone());
            Ok(Bytes::from(vec![0x11; 65]))
        }

        async fn send_transaction(&self, to: Address, data: Bytes) -> Result<B256, BoxError> {
            self.sent.lock().unwrap().push((to, data));
            Ok(B256::repeat_byte(0xcd))
        }
    }

    fn sdk(wallet: Arc<RecordingWallet>) -> ContractEngagementRewards {
        ContractEngagementRewards::new(
            Arc::new(NullRead),
            wallet,
            Address::repeat_byte(0x77),
            42220,
        )
    }

    #[tokio::test]
    async fn user_claim_signature_uses_claim_type() {
        let wallet = Arc::new(RecordingWallet::new(Address::repeat_byte(0x42)));
        let sdk = sdk(wallet.clone());

        sdk.sign_claim(Address::repeat_byte(0x01), Address::repeat_byte(0x02), 500)
            .await
            .unwrap();

        let signed = wallet.signed.lock().unwrap();
        assert_eq!(signed[0].primary_type, "Claim");
        assert_eq!(signed[0].message["validUntilBlock"], "500");
        assert_eq!(signed[0].domain["chainId"], 42220);
    }

    #[tokio::test]
    async fn app_signature_payload_names_the_user() {
        let wallet = Arc::new(RecordingWallet::new(Address::repeat_byte(0x42)));
        let sdk = sdk(wallet);
        let user = Address::repeat_byte(0x99);

        let data = sdk
            .prepare_app_signature(Address::repeat_byte(0x01), user, 500)
            .await
            .unwrap();
        assert_eq!(data.primary_type, "AppClaim");
        assert_eq!(
            data.message["user"],
            serde_json::to_value(user).unwrap()
        );
        assert!(data.types["AppClaim"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f["name"] == "validUntilBlock"));
    }

    #[tokio::test]
    async fn claim_submission_targets_rewards_contract() {
        let wallet = Arc::new(RecordingWallet::new(Address::repeat_byte(0x42)));
        let sdk = sdk(wallet.clone());

        let receipt = sdk
            .app_claim(
                Address::repeat_byte(0x01),
                Address::repeat_byte(0x02),
                500,
                Bytes::from(vec![0xaa; 65]),
                Bytes::from(vec![0xbb; 65]),
            )
            .await
            .unwrap();
        assert_eq!(receipt.transaction_hash, B256::repeat_byte(0xcd));

        let sent = wallet.sent.lock().unwrap();
        let (to, data) = &sent[0];
        assert_eq!(*to, Address::repeat_byte(0x77));
        assert_eq!(
            &data[..4],
            &eth::selector("nonContractAppClaim(address,address,uint256,bytes,bytes)")
        );
    }
}
