use alloy_primitives::{Address, Bytes};
use anyhow::anyhow;
use async_trait::async_trait;
use pax_lib::SdkError;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use url::Url;

/// Backend endpoint handing out app-side claim authorizations. The server
/// behind it holds the app key; this is the client half of that trust
/// boundary.
#[async_trait]
pub trait AppSignatureApi: Send + Sync {
    async fn app_signature(
        &self,
        user: Address,
        valid_until_block: u64,
        inviter: Address,
    ) -> Result<Bytes, SdkError>;
}

pub struct HttpAppSignatureClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpAppSignatureClient {
    pub fn new(http: reqwest::Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }
}

#[serde_as]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignatureRequest {
    user: Address,
    /// String-encoded on the wire.
    #[serde_as(as = "DisplayFromStr")]
    valid_until_block: u64,
    inviter: Address,
}

#[derive(Deserialize)]
struct SignatureResponse {
    signature: Bytes,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[async_trait]
impl AppSignatureApi for HttpAppSignatureClient {
    async fn app_signature(
        &self,
        user: Address,
        valid_until_block: u64,
        inviter: Address,
    ) -> Result<Bytes, SdkError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&SignatureRequest {
                user,
                valid_until_block,
                inviter,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| "Failed to get app signature".to_owned());
            return Err(anyhow!(message));
        }

        Ok(response.json::<SignatureResponse>().await?.signature)
    }
}
