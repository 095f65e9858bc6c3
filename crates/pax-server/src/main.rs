use actix_web::{middleware::Logger, App, HttpServer};
use pax_claim::{AnalyticsSink, NoopSink, PixelSink};
use pax_lib::{
    rpc::JsonRpcClient,
    sdk::{ContractEngagementRewards, EngagementRewardsSdk},
    wallet::HttpSignerClient,
    ChainReadClient, WalletClient,
};
use pax_server::{
    api,
    middleware::{AttributionCapture, OnboardingGate},
    signer::{AppClaimSigner, SdkAppSigner},
    Config,
};
use std::{sync::Arc, time::Duration};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::get_config();
    tracing::info!("environment: {}", config.env.as_str());
    tracing::info!("allow CORS origins: {:?}", config.cors_origins);

    let chain = config.chain_client();
    let read: Arc<dyn ChainReadClient> = match JsonRpcClient::new(&chain, &config.http) {
        Ok(client) => Arc::new(client),
        Err(error) => {
            tracing::error!("failed to build chain client: {}", error);
            return Ok(());
        }
    };

    let signer: Option<Arc<dyn AppClaimSigner>> = match &config.signer {
        Some(signer_config) => {
            match HttpSignerClient::new(
                signer_config.endpoint.clone(),
                signer_config.address,
                &config.http,
            ) {
                Ok(wallet) => {
                    let wallet: Arc<dyn WalletClient> = Arc::new(wallet);
                    let rewards: Arc<dyn EngagementRewardsSdk> =
                        Arc::new(ContractEngagementRewards::new(
                            read.clone(),
                            wallet.clone(),
                            config.app.rewards_contract,
                            chain.chain_id,
                        ));
                    Some(Arc::new(SdkAppSigner::new(
                        rewards,
                        wallet,
                        config.app.app_address,
                    )))
                }
                Err(error) => {
                    tracing::error!("failed to build signer client: {}", error);
                    return Ok(());
                }
            }
        }
        None => {
            tracing::warn!("no signer configured, the app-signature route is not available");
            None
        }
    };

    let analytics: Arc<dyn AnalyticsSink> = match &config.collector_url {
        Some(collector) => {
            match reqwest::Client::builder()
                .timeout(Duration::from_secs(config.http.timeout_in_secs.get()))
                .build()
            {
                Ok(http) => Arc::new(PixelSink::new(http, collector.clone())),
                Err(error) => {
                    tracing::error!("failed to build analytics client: {}", error);
                    return Ok(());
                }
            }
        }
        None => Arc::new(NoopSink),
    };

    let bind = (config.host.clone(), config.port);
    tracing::info!("listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let mut app = App::new()
            .wrap(Logger::default())
            .wrap(OnboardingGate)
            .wrap(AttributionCapture)
            .service(api::manifest::service(&config))
            .service(api::onboarding::service(&config, analytics.clone()));
        if let Some(signer) = signer.clone() {
            app = app.service(api::app_signature::service(&config, signer));
        }
        app
    })
    .bind(bind)?
    .run()
    .await
}
