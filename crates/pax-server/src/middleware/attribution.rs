use actix_web::{
    cookie::{time::Duration, Cookie},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures_util::future::LocalBoxFuture;
use pax_claim::attribution::{ATTRIBUTION_WINDOW_DAYS, CLICK_ID_PARAM};
use std::future::{ready, Ready};

/// Persists an ad click id arriving in the query string as a cookie with the
/// attribution window, so it survives navigation.
pub struct AttributionCapture;

impl<S, B> Transform<S, ServiceRequest> for AttributionCapture
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Transform = AttributionCaptureMiddleware<S>;
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();

    fn new_transform(&self, s: S) -> Self::Future {
        ready(Ok(AttributionCaptureMiddleware { s }))
    }
}

pub struct AttributionCaptureMiddleware<S> {
    s: S,
}

impl<S, B> Service<ServiceRequest> for AttributionCaptureMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(s);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let click_id = url::form_urlencoded::parse(req.query_string().as_bytes())
            .find(|(key, _)| key == CLICK_ID_PARAM)
            .map(|(_, value)| value.into_owned());
        let fut = self.s.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            if let Some(value) = click_id {
                let cookie = Cookie::build(CLICK_ID_PARAM, value)
                    .path("/")
                    .max_age(Duration::days(ATTRIBUTION_WINDOW_DAYS))
                    .finish();
                if let Err(error) = res.response_mut().add_cookie(&cookie) {
                    tracing::warn!("failed to set attribution cookie: {error}");
                }
            }
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    async fn page() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn click_id_from_query_becomes_a_cookie() {
        let app = test::init_service(
            App::new()
                .wrap(AttributionCapture)
                .route("/engage", web::get().to(page)),
        )
        .await;
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/engage?fbclid=click-7&x=1")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == CLICK_ID_PARAM)
            .expect("cookie set");
        assert_eq!(cookie.value(), "click-7");
        assert_eq!(
            cookie.max_age(),
            Some(Duration::days(ATTRIBUTION_WINDOW_DAYS))
        );
    }

    #[actix_web::test]
    async fn no_query_no_cookie() {
        let app = test::init_service(
            App::new()
                .wrap(AttributionCapture)
                .route("/engage", web::get().to(page)),
        )
        .await;
        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/engage").to_request(),
        )
        .await;
        assert!(resp
            .response()
            .cookies()
            .all(|c| c.name() != CLICK_ID_PARAM));
    }
}
