use crate::BoxError;
use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub status: ReceiptStatus,
}

impl TransactionReceipt {
    pub fn reverted(&self) -> bool {
        self.status == ReceiptStatus::Reverted
    }
}

/// Read-only chain access. The engine and the SDK clients only ever read
/// through this seam; writes go through [`crate::wallet::WalletClient`].
#[async_trait]
pub trait ChainReadClient: Send + Sync {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, BoxError>;
    async fn block_number(&self) -> Result<u64, BoxError>;
    async fn transaction_receipt(&self, hash: B256)
        -> Result<Option<TransactionReceipt>, BoxError>;
}

/// EIP-712 payload in the shape wallet signers consume: domain, type
/// definitions, primary type and message. Hashing and signing stay on the
/// wallet side of the seam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedData {
    pub domain: serde_json::Value,
    pub types: serde_json::Value,
    #[serde(rename = "primaryType")]
    pub primary_type: String,
    pub message: serde_json::Value,
}
