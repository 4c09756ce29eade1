use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::REFERER,
    web, Error,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{errors::MediaError, use_cases::access::referer_host, AppState};

/// Rejects image fetches whose `Referer` is not on the allow-list.
/// Denials look exactly like a missing image.
pub struct RefererGuard;

impl<S> Transform<S, ServiceRequest> for RefererGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RefererGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RefererGuardService {
            service: Rc::new(service),
        })
    }
}

pub struct RefererGuardService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for RefererGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let Some(state) = req.app_data::<web::Data<AppState>>() else {
                tracing::error!("AppState missing in referer guard");
                return Ok(denied(req));
            };

            let referer = req
                .headers()
                .get(REFERER)
                .and_then(|value| value.to_str().ok());

            if !state.access_guard.allows(referer) {
                let host = referer.and_then(referer_host);
                tracing::debug!(host = host.as_deref().unwrap_or("-"), "referer denied");
                return Ok(denied(req));
            }

            service.call(req).await
        })
    }
}

fn denied(req: ServiceRequest) -> ServiceResponse<BoxBody> {
    req.into_response(MediaError::NotFound.to_fetch_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{settings::AppConfig, test_helpers::test_config};
    use actix_web::{http::StatusCode, test, App, HttpResponse};
    use tempfile::TempDir;

    async fn status_for(config: AppConfig, referer: Option<&str>) -> StatusCode {
        let state = web::Data::new(AppState::new(&config));
        let app = test::init_service(
            App::new().app_data(state).service(
                web::resource("/guarded")
                    .wrap(RefererGuard)
                    .to(|| async { HttpResponse::Ok().finish() }),
            ),
        )
        .await;

        let mut req = test::TestRequest::get().uri("/guarded");
        if let Some(referer) = referer {
            req = req.insert_header((REFERER, referer));
        }
        test::call_service(&app, req.to_request()).await.status()
    }

    #[actix_rt::test]
    async fn listed_host_passes_and_others_look_missing() {
        let tmp = TempDir::new().unwrap();
        let config = || test_config(tmp.path(), &["mysite.com"]);

        assert_eq!(status_for(config(), Some("https://mysite.com/page")).await, StatusCode::OK);
        assert_eq!(status_for(config(), Some("https://evil.example/")).await, StatusCode::NOT_FOUND);
        assert_eq!(status_for(config(), None).await, StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn wildcard_admits_requests_without_referer() {
        let tmp = TempDir::new().unwrap();

        assert_eq!(status_for(test_config(tmp.path(), &["*"]), None).await, StatusCode::OK);
    }
}
