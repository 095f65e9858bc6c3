use super::SdkError;
use crate::config::ChainEnv;
use alloy_primitives::Address;
use async_trait::async_trait;
use url::Url;

/// Identity-verification surface: hands out links into the external
/// face-verification flow. Completing that flow whitelists the wallet
/// on-chain; nothing here performs verification itself.
#[async_trait]
pub trait IdentitySdk: Send + Sync {
    /// Returns the verification URL, or `None` when the provider declines to
    /// issue one.
    async fn generate_fv_link(
        &self,
        force_reverify: bool,
        return_url: &str,
        chain_id: u64,
    ) -> Result<Option<Url>, SdkError>;
}

/// Link generator for the hosted GoodID verification flow.
pub struct GoodIdSdk {
    env: ChainEnv,
    account: Address,
}

impl GoodIdSdk {
    pub fn new(env: ChainEnv, account: Address) -> Self {
        Self { env, account }
    }

    fn base_url(env: ChainEnv) -> &'static str {
        match env {
            ChainEnv::Production => "https://goodid.gooddollar.org",
            ChainEnv::Staging => "https://goodid-qa.gooddollar.org",
            ChainEnv::Development => "http://127.0.0.1:3000",
        }
    }
}

#[async_trait]
impl IdentitySdk for GoodIdSdk {
    async fn generate_fv_link(
        &self,
        force_reverify: bool,
        return_url: &str,
        chain_id: u64,
    ) -> Result<Option<Url>, SdkError> {
        let mut url = Url::parse(Self::base_url(self.env))?;
        url.query_pairs_mut()
            .append_pair("account", &self.account.to_string())
            .append_pair("rdu", return_url)
            .append_pair("chain", &chain_id.to_string());
        if force_reverify {
            url.query_pairs_mut().append_pair("reverify", "1");
        }
        Ok(Some(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn link_carries_return_url_and_chain() {
        let sdk = GoodIdSdk::new(ChainEnv::Production, Address::repeat_byte(0x42));
        let link = sdk
            .generate_fv_link(false, "https://thegoodpax.app/verify-identity", 42220)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(link.host_str(), Some("goodid.gooddollar.org"));
        let query: Vec<(String, String)> = link
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(query.contains(&(
            "rdu".to_owned(),
            "https://thegoodpax.app/verify-identity".to_owned()
        )));
        assert!(query.contains(&("chain".to_owned(), "42220".to_owned())));
        assert!(!query.iter().any(|(k, _)| k == "reverify"));

        let again = sdk
            .generate_fv_link(true, "https://thegoodpax.app/", 42220)
            .await
            .unwrap()
            .unwrap();
        assert!(again
            .query_pairs()
            .any(|(k, v)| k == "reverify" && v == "1"));
    }
}
