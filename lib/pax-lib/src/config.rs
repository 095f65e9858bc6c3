use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::{num::NonZeroU64, str::FromStr, sync::LazyLock};
use thiserror::Error as ThisError;

/// Which GoodDollar deployment the app talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainEnv {
    #[serde(rename = "production")]
    Production,
    #[serde(rename = "staging")]
    Staging,
    #[serde(rename = "development")]
    Development,
}

/// Unknown chain environment.
#[derive(Debug, ThisError)]
#[error("unknown environment: {0}")]
pub struct UnknownEnv(pub String);

impl FromStr for ChainEnv {
    type Err = UnknownEnv;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            s => Err(UnknownEnv(s.to_owned())),
        }
    }
}

impl ChainEnv {
    pub fn url(&self) -> String {
        match self {
            ChainEnv::Production => {
                static URL: LazyLock<String> = LazyLock::new(|| {
                    std::env::var("CELO_MAINNET_URL")
                        .unwrap_or_else(|_| "https://forno.celo.org".to_owned())
                });
                URL.clone()
            }
            ChainEnv::Staging => {
                static URL: LazyLock<String> = LazyLock::new(|| {
                    std::env::var("CELO_TESTNET_URL")
                        .unwrap_or_else(|_| "https://alfajores-forno.celo-testnet.org".to_owned())
                });
                URL.clone()
            }
            ChainEnv::Development => {
                static URL: LazyLock<String> = LazyLock::new(|| {
                    std::env::var("DEV_RPC_URL")
                        .unwrap_or_else(|_| "http://127.0.0.1:8545".to_owned())
                });
                URL.clone()
            }
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            ChainEnv::Production => 42220,
            ChainEnv::Staging => 44787,
            ChainEnv::Development => 31337,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainEnv::Production => "production",
            ChainEnv::Staging => "staging",
            ChainEnv::Development => "development",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainClientConfig {
    pub url: String,
    pub chain_id: u64,
    pub env: ChainEnv,
}

impl ChainClientConfig {
    pub fn for_env(env: ChainEnv) -> Self {
        Self {
            url: env.url(),
            chain_id: env.chain_id(),
            env,
        }
    }
}

impl Default for ChainClientConfig {
    fn default() -> Self {
        Self::for_env(ChainEnv::Development)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpClientConfig {
    pub timeout_in_secs: NonZeroU64,
    pub gzip: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_in_secs: NonZeroU64::new(100).unwrap(),
            gzip: true,
        }
    }
}

/// Contract addresses and identities the app is deployed with.
///
/// Always passed in explicitly; nothing in the workspace reads these from
/// globals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Identity whitelist contract, source of `getWhitelistedRoot`.
    #[serde(default = "AppConfig::default_identity_contract")]
    pub identity_contract: Address,
    /// Engagement rewards contract.
    #[serde(default = "AppConfig::default_rewards_contract")]
    pub rewards_contract: Address,
    /// UBI scheme contract the daily claim runs against.
    #[serde(default)]
    pub ubi_scheme: Address,
    /// Address this app is registered under with the rewards contract.
    #[serde(default)]
    pub app_address: Address,
    /// Inviter credited on engagement claims.
    #[serde(default)]
    pub inviter_address: Address,
}

impl AppConfig {
    pub fn default_identity_contract() -> Address {
        address!("C361A6E67822a0EDc17D899227dd9FC50BD62F42")
    }

    pub fn default_rewards_contract() -> Address {
        address!("25db74CF4E7BA120526fd87e159CF656d94bAE43")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            identity_contract: Self::default_identity_contract(),
            rewards_contract: Self::default_rewards_contract(),
            ubi_scheme: Address::ZERO,
            app_address: Address::ZERO,
            inviter_address: Address::ZERO,
        }
    }
}
