use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;
use url::Url;

/// Query parameter carrying the ad click id.
pub const CLICK_ID_PARAM: &str = "fbclid";

/// Ad-platform attribution window.
pub const ATTRIBUTION_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone)]
struct StoredClickId {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Session-scoped click-id cache so ad attribution survives navigation.
/// The clock is passed in by the caller; expiry is enforced on read.
#[derive(Debug, Default)]
pub struct ClickIdStore {
    inner: Mutex<Option<StoredClickId>>,
}

impl ClickIdStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&self, value: &str, now: DateTime<Utc>) {
        *self.inner.lock().unwrap() = Some(StoredClickId {
            value: value.to_owned(),
            expires_at: now + Duration::days(ATTRIBUTION_WINDOW_DAYS),
        });
    }

    /// The stored click id, unless the attribution window has passed.
    /// Expired entries are removed.
    pub fn get(&self, now: DateTime<Utc>) -> Option<String> {
        let mut slot = self.inner.lock().unwrap();
        match &*slot {
            Some(stored) if now <= stored.expires_at => Some(stored.value.clone()),
            Some(_) => {
                slot.take();
                None
            }
            None => None,
        }
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().take();
    }

    /// Pick the click id out of a URL, preferring a fresh value from the
    /// query string over whatever is stored.
    pub fn capture(&self, url: &Url, now: DateTime<Utc>) -> Option<String> {
        let fresh = url
            .query_pairs()
            .find(|(key, _)| key == CLICK_ID_PARAM)
            .map(|(_, value)| value.into_owned());
        match fresh {
            Some(value) => {
                self.save(&value, now);
                Some(value)
            }
            None => self.get(now),
        }
    }

    /// Propagate the stored click id onto an outgoing URL, if one is live.
    pub fn append_to_url(&self, mut url: Url, now: DateTime<Utc>) -> Url {
        if let Some(click_id) = self.get(now) {
            url.query_pairs_mut().append_pair(CLICK_ID_PARAM, &click_id);
        }
        url
    }
}
