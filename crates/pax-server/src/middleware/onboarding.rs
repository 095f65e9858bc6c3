use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpResponse,
};
use futures_util::{
    future::{Either, MapOk},
    TryFutureExt,
};
use std::future::{ready, Ready};

pub const ONBOARDING_COOKIE: &str = "hasSeenOnboarding";
pub const ONBOARDING_PATH: &str = "/onboarding";

const PUBLIC_PREFIXES: &[&str] = &["/onboarding", "/api", "/.well-known", "/_next"];
const STATIC_EXTENSIONS: &[&str] = &[
    ".svg", ".png", ".jpg", ".jpeg", ".gif", ".webp", ".ico", ".woff", ".woff2", ".ttf", ".eot",
];

fn is_public(path: &str) -> bool {
    if PUBLIC_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
    {
        return true;
    }
    let lower = path.to_ascii_lowercase();
    STATIC_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Request-time onboarding gate: anything but public paths and static assets
/// redirects to the onboarding page until the cookie is present.
pub struct OnboardingGate;

impl<S, B> Transform<S, ServiceRequest> for OnboardingGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Transform = OnboardingGateMiddleware<S>;
    type Response = <Self::Transform as Service<ServiceRequest>>::Response;
    type Error = <Self::Transform as Service<ServiceRequest>>::Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();

    fn new_transform(&self, s: S) -> Self::Future {
        ready(Ok(OnboardingGateMiddleware { s }))
    }
}

pub struct OnboardingGateMiddleware<S> {
    s: S,
}

impl<S, B> Service<ServiceRequest> for OnboardingGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Either<
        MapOk<S::Future, fn(ServiceResponse<B>) -> Self::Response>,
        Ready<Result<Self::Response, Self::Error>>,
    >;

    forward_ready!(s);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let seen = req.cookie(ONBOARDING_COOKIE).is_some();
        if seen || is_public(req.path()) {
            Either::Left(
                self.s
                    .call(req)
                    .map_ok(ServiceResponse::<B>::map_into_left_body),
            )
        } else {
            let response = HttpResponse::TemporaryRedirect()
                .insert_header((header::LOCATION, ONBOARDING_PATH))
                .finish();
            Either::Right(ready(Ok(req.into_response(response).map_into_right_body())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{cookie::Cookie, http::StatusCode, test, web, App, HttpResponse};

    async fn page() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    macro_rules! gated_app {
        () => {
            test::init_service(
                App::new()
                    .wrap(OnboardingGate)
                    .route("/", web::get().to(page))
                    .route("/onboarding", web::get().to(page))
                    .route("/api/ping", web::get().to(page))
                    .route("/logo.svg", web::get().to(page)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn redirects_first_time_visitors() {
        let app = gated_app!();
        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            ONBOARDING_PATH
        );
    }

    #[actix_web::test]
    async fn lets_returning_visitors_through() {
        let app = gated_app!();
        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(ONBOARDING_COOKIE, "true"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn public_paths_and_assets_skip_the_gate() {
        let app = gated_app!();
        for uri in ["/onboarding", "/api/ping", "/logo.svg"] {
            let resp =
                test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK, "uri = {uri}");
        }
    }
}
