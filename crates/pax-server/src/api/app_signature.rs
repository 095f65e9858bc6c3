use super::prelude::*;
use crate::signer::AppClaimSigner;
use alloy_primitives::{Address, Bytes};
use chrono::{DateTime, Utc};
use pax_lib::eth;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct Params {
    user: Option<String>,
    #[serde(rename = "validUntilBlock")]
    valid_until_block: Option<String>,
    #[serde(default)]
    inviter: Option<String>,
}

#[derive(Serialize)]
pub struct Output {
    signature: Bytes,
    message: &'static str,
}

#[derive(Serialize)]
struct Health {
    message: &'static str,
    #[serde(with = "chrono::serde::ts_seconds")]
    timestamp: DateTime<Utc>,
}

pub fn service(
    config: &Config,
    signer: Arc<dyn AppClaimSigner>,
) -> impl HttpServiceFactory + 'static {
    web::resource("/api/getAppSignature")
        .wrap(config.cors())
        .app_data(web::Data::from(signer))
        .route(web::post().to(get_app_signature))
        .route(web::get().to(health))
}

/// Validation happens before the signer is touched: a malformed request
/// never reaches the key.
async fn get_app_signature(
    params: web::Json<Params>,
    signer: web::Data<dyn AppClaimSigner>,
) -> Result<web::Json<Output>, Error> {
    let params = params.into_inner();
    let (Some(user), Some(valid_until_block)) = (&params.user, &params.valid_until_block) else {
        return Err(Error::MissingParams);
    };

    let user = eth::parse_address(user).map_err(|_| Error::InvalidUserAddress)?;
    let valid_until_block: u64 = valid_until_block
        .parse()
        .map_err(|_| Error::InvalidValidUntilBlock)?;
    if valid_until_block == 0 {
        return Err(Error::InvalidValidUntilBlock);
    }
    let inviter = match params.inviter.as_deref() {
        Some(s) if !s.is_empty() => {
            Some(eth::parse_address(s).map_err(|_| Error::InvalidInviterAddress)?)
        }
        _ => None,
    };

    let signature = signer
        .sign_app_claim(user, valid_until_block)
        .await
        .map_err(|error| Error::Signing(error.to_string()))?;

    // audit trail for every signature handed out
    tracing::info!(
        app = %signer.app_address(),
        user = %user,
        inviter = %inviter.map(|a| a.to_string()).unwrap_or_default(),
        valid_until_block,
        signature = %signature,
        "app signature issued",
    );

    Ok(web::Json(Output {
        signature,
        message: "Signature generated successfully",
    }))
}

async fn health() -> web::Json<Health> {
    web::Json(Health {
        message: "getAppSignature API endpoint is running",
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use pax_lib::SdkError;
    use serde_json::{json, Value as JsonValue};
    use std::sync::atomic::{AtomicU64, Ordering};

    struct CountingSigner {
        calls: AtomicU64,
        fail: bool,
    }

    impl CountingSigner {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU64::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl AppClaimSigner for CountingSigner {
        fn app_address(&self) -> Address {
            Address::repeat_byte(0x01)
        }

        async fn sign_app_claim(
            &self,
            _user: Address,
            _valid_until_block: u64,
        ) -> Result<Bytes, SdkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("signer unavailable"));
            }
            Ok(Bytes::from(vec![0xab; 65]))
        }
    }

    async fn post(signer: Arc<CountingSigner>, body: JsonValue) -> (StatusCode, JsonValue) {
        let app = test::init_service(
            App::new().service(service(&Config::default(), signer as Arc<dyn AppClaimSigner>)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/getAppSignature")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: JsonValue = test::read_body_json(resp).await;
        (status, body)
    }

    const USER: &str = "0xC361A6E67822a0EDc17D899227dd9FC50BD62F42";

    #[actix_web::test]
    async fn signs_a_well_formed_request() {
        let signer = CountingSigner::new(false);
        let (status, body) = post(
            signer.clone(),
            json!({"user": USER, "validUntilBlock": "120", "inviter": USER}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["signature"].as_str().unwrap().starts_with("0x"));
        assert_eq!(body["message"], "Signature generated successfully");
        assert_eq!(signer.calls.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn rejects_malformed_user_without_signing() {
        let signer = CountingSigner::new(false);
        let (status, body) = post(
            signer.clone(),
            json!({"user": "0x1234", "validUntilBlock": "120"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid user address format");
        assert_eq!(signer.calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn rejects_non_positive_block_without_signing() {
        for block in ["0", "-5", "twenty"] {
            let signer = CountingSigner::new(false);
            let (status, body) = post(
                signer.clone(),
                json!({"user": USER, "validUntilBlock": block}),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "block = {block}");
            assert_eq!(body["error"], "validUntilBlock must be a positive number");
            assert_eq!(signer.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[actix_web::test]
    async fn rejects_missing_parameters() {
        let signer = CountingSigner::new(false);
        let (status, body) = post(signer.clone(), json!({"user": USER})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Missing required parameters: user and validUntilBlock are required"
        );
        assert_eq!(signer.calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn signer_failure_is_a_server_error() {
        let signer = CountingSigner::new(true);
        let (status, body) = post(
            signer.clone(),
            json!({"user": USER, "validUntilBlock": "120"}),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to sign message: signer unavailable");
    }

    #[actix_web::test]
    async fn health_check_responds() {
        let signer = CountingSigner::new(false);
        let app = test::init_service(
            App::new().service(service(&Config::default(), signer as Arc<dyn AppClaimSigner>)),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/api/getAppSignature")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
