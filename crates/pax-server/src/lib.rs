use actix_web::http::header::HeaderValue;
use alloy_primitives::Address;
use pax_lib::{AppConfig, ChainClientConfig, ChainEnv, HttpClientConfig};
use serde::Deserialize;
use url::Url;

pub mod api;
pub mod error;
pub mod middleware;
pub mod signer;

pub use api::manifest::ManifestConfig;

fn match_wildcard(pat: &str, origin: &HeaderValue) -> bool {
    let Ok(mut origin_str) = origin.to_str() else {
        return false;
    };

    let mut segments = pat.split('*');

    let Some(first) = segments.next() else {
        return false;
    };
    origin_str = match origin_str.strip_prefix(first) {
        Some(s) => s,
        None => return false,
    };

    for s in segments {
        if s.is_empty() {
            continue;
        }
        match origin_str.find(s) {
            Some(pos) => {
                let wildcard = &origin_str[..pos];
                if !wildcard.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return false;
                }
                origin_str = &origin_str[pos..];
            }
            None => {
                return false;
            }
        }
    }

    true
}

/// Remote signer holding the app key.
#[derive(Deserialize, Clone)]
pub struct SignerConfig {
    pub endpoint: Url,
    pub address: Address,
}

#[derive(Deserialize, Clone)]
pub struct Config {
    #[serde(default = "Config::default_host")]
    pub host: String,
    #[serde(default = "Config::default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default = "Config::default_env")]
    pub env: ChainEnv,
    /// Overrides the environment's default RPC endpoint.
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub http: HttpClientConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub signer: Option<SignerConfig>,
    #[serde(default)]
    pub manifest: ManifestConfig,
    /// Analytics collector; absent means events are dropped.
    #[serde(default)]
    pub collector_url: Option<Url>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            cors_origins: Vec::new(),
            env: Self::default_env(),
            rpc_url: None,
            http: HttpClientConfig::default(),
            app: AppConfig::default(),
            signer: None,
            manifest: ManifestConfig::default(),
            collector_url: None,
        }
    }
}

impl Config {
    pub fn default_host() -> String {
        "127.0.0.1".to_owned()
    }

    pub fn default_port() -> u16 {
        8080
    }

    pub fn default_env() -> ChainEnv {
        ChainEnv::Development
    }

    pub fn get_config() -> Self {
        match std::env::args().nth(1) {
            Some(s) => if s == "-" {
                use std::io::Read;
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .map_err(|error| {
                        tracing::error!("Error reading STDIN: {}", error);
                    })
                    .map(move |_| buf)
            } else {
                std::fs::read_to_string(s).map_err(|error| {
                    tracing::error!("Error reading config: {}", error);
                })
            }
            .and_then(|s| {
                toml::from_str(&s).map_err(|error| {
                    tracing::error!("Error parsing config: {}", error);
                })
            })
            .map_err(|_| {
                tracing::warn!("Invalid config file, using default");
            })
            .unwrap_or_default(),
            None => {
                tracing::info!("No config specified, using default");
                Config::default()
            }
        }
    }

    pub fn chain_client(&self) -> ChainClientConfig {
        let mut chain = ChainClientConfig::for_env(self.env);
        if let Some(url) = &self.rpc_url {
            chain.url = url.clone();
        }
        chain
    }

    /// Build a CORS middleware.
    pub fn cors(&self) -> actix_cors::Cors {
        let mut cors = actix_cors::Cors::default()
            .allow_any_header()
            .allow_any_method()
            .supports_credentials();
        for origin in &self.cors_origins {
            if origin.contains('*') {
                let pattern = origin.clone();
                cors = cors.allowed_origin_fn(move |origin, _| match_wildcard(&pattern, origin));
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors
    }
}
