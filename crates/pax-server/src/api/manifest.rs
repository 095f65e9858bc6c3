use super::prelude::*;

/// Proof binding the app to its social account, generated once out of band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAssociation {
    pub header: String,
    pub payload: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameConfig {
    pub name: String,
    pub version: String,
    pub icon_url: String,
    pub home_url: String,
    pub image_url: String,
    pub splash_image_url: String,
    pub splash_background_color: String,
    pub subtitle: String,
    pub hero_image_url: String,
    pub description: String,
    pub primary_category: String,
}

/// App metadata served to the social embedding host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestConfig {
    pub account_association: AccountAssociation,
    pub frame: FrameConfig,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            account_association: AccountAssociation {
                header: String::new(),
                payload: String::new(),
                signature: String::new(),
            },
            frame: FrameConfig {
                name: "The Good Pax App".to_owned(),
                version: "1".to_owned(),
                icon_url: "https://thegoodpax.app/thegoodpaxapp.svg".to_owned(),
                home_url: "https://thegoodpax.app".to_owned(),
                image_url: "https://thegoodpax.app/thegoodpaxapp.svg".to_owned(),
                splash_image_url: "https://thegoodpax.app/thegoodpaxapp.svg".to_owned(),
                splash_background_color: "#f5f0ec".to_owned(),
                subtitle: "The GoodDollar wrapper on Farcaster - claim UBI today!".to_owned(),
                hero_image_url: "https://thegoodpax.app/thegoodpaxapp.svg".to_owned(),
                description: "The Good Pax App brings GoodDollar UBI claiming and Engagement \
                              Rewards, right in Farcaster. Powered by Canvassing."
                    .to_owned(),
                primary_category: "finance".to_owned(),
            },
        }
    }
}

pub fn service(config: &Config) -> impl HttpServiceFactory + 'static {
    web::resource("/.well-known/farcaster.json")
        .app_data(web::Data::new(config.manifest.clone()))
        .route(web::get().to(manifest))
}

async fn manifest(manifest: web::Data<ManifestConfig>) -> web::Json<ManifestConfig> {
    web::Json(manifest.as_ref().clone())
}
