use super::prelude::*;
use crate::middleware::onboarding::ONBOARDING_COOKIE;
use actix_web::{
    cookie::{time::Duration, Cookie},
    HttpResponse,
};
use pax_claim::{AnalyticsEvent, AnalyticsSink};
use std::sync::Arc;

const ONE_YEAR: Duration = Duration::days(365);

pub fn service(
    config: &Config,
    analytics: Arc<dyn AnalyticsSink>,
) -> impl HttpServiceFactory + 'static {
    web::resource("/api/onboarding/complete")
        .wrap(config.cors())
        .app_data(web::Data::from(analytics))
        .route(web::post().to(complete))
}

/// Marks onboarding as seen; the gate middleware stops redirecting once the
/// cookie is set.
async fn complete(analytics: web::Data<dyn AnalyticsSink>) -> HttpResponse {
    analytics.track(AnalyticsEvent::OnboardingPageViewed);
    let cookie = Cookie::build(ONBOARDING_COOKIE, "true")
        .path("/")
        .max_age(ONE_YEAR)
        .finish();
    HttpResponse::Ok().cookie(cookie).json(Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingSink {
        events: Mutex<Vec<String>>,
    }

    impl AnalyticsSink for CountingSink {
        fn track(&self, event: AnalyticsEvent) {
            self.events.lock().unwrap().push(event.name().to_owned());
        }
    }

    #[actix_web::test]
    async fn sets_the_onboarding_cookie_and_tracks_the_event() {
        let sink = Arc::new(CountingSink::default());
        let app = test::init_service(App::new().service(service(
            &Config::default(),
            sink.clone() as Arc<dyn AnalyticsSink>,
        )))
        .await;
        let req = test::TestRequest::post()
            .uri("/api/onboarding/complete")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == ONBOARDING_COOKIE)
            .expect("cookie set");
        assert_eq!(cookie.value(), "true");
        assert_eq!(cookie.max_age(), Some(ONE_YEAR));
        assert_eq!(
            sink.events.lock().unwrap().as_slice(),
            ["OnboardingPageViewed".to_owned()]
        );
    }
}
