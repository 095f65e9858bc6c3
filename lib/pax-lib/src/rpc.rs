use crate::{
    chain::{ChainReadClient, ReceiptStatus, TransactionReceipt},
    config::{ChainClientConfig, HttpClientConfig},
    eth, BoxError,
};
use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error(transparent)]
    Hex(#[from] eth::HexError),
}

/// JSON-RPC 2.0 client over HTTP, the read side of every chain interaction.
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(chain: &ChainClientConfig, http: &HttpClientConfig) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(http.timeout_in_secs.get()))
            .gzip(http.gzip)
            .build()?;
        Ok(Self::with_client(client, chain.url.clone()))
    }

    pub fn with_client(http: reqwest::Client, url: String) -> Self {
        Self {
            http,
            url,
            next_id: AtomicU64::new(1),
        }
    }

    async fn request(&self, method: &str, params: JsonValue) -> Result<JsonValue, RpcError> {
        #[derive(Deserialize)]
        struct RpcResponse {
            result: Option<JsonValue>,
            error: Option<RpcErrorBody>,
        }
        #[derive(Deserialize)]
        struct RpcErrorBody {
            code: i64,
            message: String,
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        let response: RpcResponse = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if let Some(error) = response.error {
            tracing::warn!("{} failed with rpc error {}", method, error.code);
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        response
            .result
            .ok_or_else(|| RpcError::Malformed(format!("{method}: missing result")))
    }

    pub async fn eth_call(&self, to: Address, data: Bytes) -> Result<Bytes, RpcError> {
        let result = self
            .request("eth_call", json!([{"to": to, "data": data}, "latest"]))
            .await?;
        let hex = result
            .as_str()
            .ok_or_else(|| RpcError::Malformed("eth_call: result is not a string".to_owned()))?;
        Ok(Bytes::from(eth::parse_hex_data(hex)?))
    }

    pub async fn eth_block_number(&self) -> Result<u64, RpcError> {
        let result = self.request("eth_blockNumber", json!([])).await?;
        let hex = result.as_str().ok_or_else(|| {
            RpcError::Malformed("eth_blockNumber: result is not a string".to_owned())
        })?;
        Ok(eth::parse_quantity(hex)?)
    }

    pub async fn eth_transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, RpcError> {
        let result = self
            .request("eth_getTransactionReceipt", json!([hash]))
            .await?;
        receipt_from_value(result)
    }
}

fn receipt_from_value(value: JsonValue) -> Result<Option<TransactionReceipt>, RpcError> {
    if value.is_null() {
        return Ok(None);
    }

    #[derive(Deserialize)]
    struct RawReceipt {
        #[serde(rename = "transactionHash")]
        transaction_hash: B256,
        status: String,
    }

    let raw: RawReceipt = serde_json::from_value(value)
        .map_err(|error| RpcError::Malformed(format!("receipt: {error}")))?;
    let status = match raw.status.as_str() {
        "0x1" => ReceiptStatus::Success,
        "0x0" => ReceiptStatus::Reverted,
        other => {
            return Err(RpcError::Malformed(format!(
                "receipt: unexpected status {other}"
            )))
        }
    };
    Ok(Some(TransactionReceipt {
        transaction_hash: raw.transaction_hash,
        status,
    }))
}

#[async_trait]
impl ChainReadClient for JsonRpcClient {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, BoxError> {
        self.eth_call(to, data).await.map_err(Into::into)
    }

    async fn block_number(&self) -> Result<u64, BoxError> {
        self.eth_block_number().await.map_err(Into::into)
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, BoxError> {
        self.eth_transaction_receipt(hash).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0x00000000000000000000000000000000000000000000000000000000000000ab";

    #[test]
    fn receipt_parsing() {
        assert_eq!(receipt_from_value(JsonValue::Null).unwrap(), None);

        let ok = receipt_from_value(json!({"transactionHash": HASH, "status": "0x1"}))
            .unwrap()
            .unwrap();
        assert_eq!(ok.status, ReceiptStatus::Success);
        assert!(!ok.reverted());

        let reverted = receipt_from_value(json!({"transactionHash": HASH, "status": "0x0"}))
            .unwrap()
            .unwrap();
        assert!(reverted.reverted());

        assert!(receipt_from_value(json!({"transactionHash": HASH, "status": "0x2"})).is_err());
        assert!(receipt_from_value(json!({"status": "0x1"})).is_err());
    }
}
