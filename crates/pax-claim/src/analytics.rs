use alloy_primitives::{Address, B256};
use serde_json::{json, Value as JsonValue};
use url::Url;

/// Engagement rewards pay out a fixed 3,000 G$ per cooldown period.
pub const ENGAGEMENT_REWARD_VALUE: u64 = 3000;

/// Marketing event vocabulary. The mapping from event to wire name and
/// parameters is fixed; delivery is whatever sink the caller injects.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsEvent {
    HomePageViewed,
    ClaimPageViewed,
    EngagementPageViewed,
    OnboardingPageViewed,
    UbiClaimed {
        transaction_hash: B256,
        amount: String,
    },
    EngagementRewardClaimed {
        transaction_hash: B256,
        amount: String,
        success: bool,
        /// Ad click id, when the visit is attributed to an ad. Its presence
        /// selects the from-ad event name.
        click_id: Option<String>,
    },
    WalletVerified {
        wallet_address: Address,
        is_verified: bool,
    },
    Custom {
        name: String,
        params: JsonValue,
    },
}

impl AnalyticsEvent {
    pub fn name(&self) -> &str {
        match self {
            Self::HomePageViewed => "HomePageViewed",
            Self::ClaimPageViewed => "ClaimPageViewed",
            Self::EngagementPageViewed => "EngagementPageViewed",
            Self::OnboardingPageViewed => "OnboardingPageViewed",
            Self::UbiClaimed { .. } => "UBIClaimed",
            Self::EngagementRewardClaimed { click_id, .. } => {
                if click_id.is_some() {
                    "EngagementRewardClaimedFromAd"
                } else {
                    "EngagementRewardClaimed"
                }
            }
            Self::WalletVerified { .. } => "WalletVerified",
            Self::Custom { name, .. } => name,
        }
    }

    pub fn params(&self) -> JsonValue {
        match self {
            Self::HomePageViewed
            | Self::ClaimPageViewed
            | Self::EngagementPageViewed
            | Self::OnboardingPageViewed => json!({}),
            Self::UbiClaimed {
                transaction_hash,
                amount,
            } => json!({
                "currency": "G$",
                "transactionHash": transaction_hash,
                "amount": amount,
            }),
            Self::EngagementRewardClaimed {
                transaction_hash,
                amount,
                success,
                click_id,
            } => {
                let mut params = json!({
                    "value": ENGAGEMENT_REWARD_VALUE,
                    "currency": "G$",
                    "transactionHash": transaction_hash,
                    "amount": amount,
                    "success": success,
                });
                if let Some(click_id) = click_id {
                    params["fbclid"] = json!(click_id);
                }
                params
            }
            Self::WalletVerified {
                wallet_address,
                is_verified,
            } => json!({
                "walletAddress": wallet_address,
                "isVerified": is_verified,
            }),
            Self::Custom { params, .. } => params.clone(),
        }
    }
}

/// Delivery seam. Injected everywhere an event is tracked; sinks must never
/// fail a claim.
pub trait AnalyticsSink: Send + Sync {
    fn track(&self, event: AnalyticsEvent);
}

pub struct NoopSink;

impl AnalyticsSink for NoopSink {
    fn track(&self, _event: AnalyticsEvent) {}
}

/// Fire-and-forget delivery to a pixel collector endpoint. Failures are
/// logged and swallowed.
pub struct PixelSink {
    http: reqwest::Client,
    collector: Url,
}

impl PixelSink {
    pub fn new(http: reqwest::Client, collector: Url) -> Self {
        Self { http, collector }
    }
}

impl AnalyticsSink for PixelSink {
    fn track(&self, event: AnalyticsEvent) {
        let payload = json!({
            "event": event.name(),
            "params": event.params(),
        });
        let request = self.http.post(self.collector.clone()).json(&payload);
        tokio::spawn(async move {
            match request.send().await.and_then(|r| r.error_for_status()) {
                Ok(_) => {}
                Err(error) => tracing::warn!("analytics delivery failed: {error}"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engagement_event_name_depends_on_attribution() {
        let base = AnalyticsEvent::EngagementRewardClaimed {
            transaction_hash: B256::repeat_byte(0x01),
            amount: "3000".to_owned(),
            success: true,
            click_id: None,
        };
        assert_eq!(base.name(), "EngagementRewardClaimed");
        assert!(base.params().get("fbclid").is_none());
        assert_eq!(base.params()["value"], ENGAGEMENT_REWARD_VALUE);
        assert_eq!(base.params()["currency"], "G$");

        let attributed = AnalyticsEvent::EngagementRewardClaimed {
            transaction_hash: B256::repeat_byte(0x01),
            amount: "3000".to_owned(),
            success: true,
            click_id: Some("abc123".to_owned()),
        };
        assert_eq!(attributed.name(), "EngagementRewardClaimedFromAd");
        assert_eq!(attributed.params()["fbclid"], "abc123");
    }

    #[test]
    fn page_views_carry_no_params() {
        assert_eq!(AnalyticsEvent::OnboardingPageViewed.params(), json!({}));
        assert_eq!(AnalyticsEvent::HomePageViewed.name(), "HomePageViewed");
    }

    #[test]
    fn wallet_verification_carries_the_address() {
        let event = AnalyticsEvent::WalletVerified {
            wallet_address: Address::repeat_byte(0x42),
            is_verified: true,
        };
        assert_eq!(event.name(), "WalletVerified");
        assert_eq!(event.params()["isVerified"], true);
        assert!(event.params()["walletAddress"]
            .as_str()
            .unwrap()
            .starts_with("0x"));
    }
}
