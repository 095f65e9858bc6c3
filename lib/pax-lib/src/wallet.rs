use crate::{chain::TypedData, config::HttpClientConfig, BoxError};
use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error as ThisError;
use url::Url;

/// Connected wallet as reported by the hosting surface. Owned by the caller,
/// read-only to everything in this workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalletSession {
    pub address: Option<Address>,
    pub is_connected: bool,
}

impl WalletSession {
    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
            is_connected: true,
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// The account usable for claims: present only while connected.
    pub fn account(&self) -> Option<Address> {
        if self.is_connected { self.address } else { None }
    }
}

/// Signing and submission seam. Key custody lives behind this trait; nothing
/// in the workspace touches private key material.
#[async_trait]
pub trait WalletClient: Send + Sync {
    fn address(&self) -> Address;
    async fn sign_typed_data(&self, data: &TypedData) -> Result<Bytes, BoxError>;
    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<B256, BoxError>;
}

#[derive(Debug, ThisError)]
pub enum SignerError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("signer endpoint returned {status}: {message}")]
    Endpoint {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// Wallet client backed by a remote signer service. The service holds the
/// key; this client ships typed-data payloads and unsigned calls to it.
pub struct HttpSignerClient {
    http: reqwest::Client,
    base: Url,
    address: Address,
}

impl HttpSignerClient {
    pub fn new(base: Url, address: Address, http: &HttpClientConfig) -> Result<Self, SignerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(http.timeout_in_secs.get()))
            .gzip(http.gzip)
            .build()?;
        Ok(Self {
            http: client,
            base,
            address,
        })
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, SignerError> {
        let response = self.http.post(self.base.join(path)?).json(body).send().await?;
        if !response.status().is_success() {
            #[derive(Deserialize)]
            struct ErrorBody {
                error: String,
            }
            let status = response.status();
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(SignerError::Endpoint { status, message });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl WalletClient for HttpSignerClient {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_typed_data(&self, data: &TypedData) -> Result<Bytes, BoxError> {
        #[derive(Serialize)]
        struct Request<'a> {
            address: Address,
            #[serde(rename = "typedData")]
            typed_data: &'a TypedData,
        }
        #[derive(Deserialize)]
        struct Response {
            signature: Bytes,
        }
        let response: Response = self
            .post(
                "sign-typed-data",
                &Request {
                    address: self.address,
                    typed_data: data,
                },
            )
            .await?;
        Ok(response.signature)
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<B256, BoxError> {
        #[derive(Serialize)]
        struct Request {
            from: Address,
            to: Address,
            data: Bytes,
        }
        #[derive(Deserialize)]
        struct Response {
            #[serde(rename = "transactionHash")]
            transaction_hash: B256,
        }
        let response: Response = self
            .post(
                "send-transaction",
                &Request {
                    from: self.address,
                    to,
                    data,
                },
            )
            .await?;
        Ok(response.transaction_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_account_requires_connection() {
        let address = Address::repeat_byte(0x11);
        assert_eq!(WalletSession::connected(address).account(), Some(address));
        assert_eq!(WalletSession::disconnected().account(), None);

        let stale = WalletSession {
            address: Some(address),
            is_connected: false,
        };
        assert_eq!(stale.account(), None);
    }
}
