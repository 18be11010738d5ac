use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::ResponseError;
use actix_web::http::Method;
use actix_web::HttpMessage;
use futures::future::{ok, LocalBoxFuture, Ready};

use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::{ACCESS_TOKEN_COOKIE, ACCESS_TOKEN_HEADER};

pub const CSRF_TOKEN_HEADER: &str = "CSRF-Token";
pub const CSRF_TOKEN_COOKIE: &str = "csrf_token";

/// Double-submit CSRF guard. Mutating requests that authenticate via the
/// access token cookie must echo the `csrf_token` cookie in the `CSRF-Token`
/// header. Requests authenticating via the `AccessToken` header are exempt
/// (a cross-site attacker cannot set headers).
pub struct CsrfProtection;

impl<S, B> Transform<S, ServiceRequest> for CsrfProtection
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = CsrfProtectionService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(CsrfProtectionService { service })
    }
}

pub struct CsrfProtectionService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for CsrfProtectionService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let is_mutating = matches!(*req.method(), Method::POST | Method::PUT | Method::DELETE);
        let cookie_authenticated = req.headers().get(ACCESS_TOKEN_HEADER).is_none()
            && req.cookie(ACCESS_TOKEN_COOKIE).is_some();

        if is_mutating && cookie_authenticated {
            let csrf_header = req
                .headers()
                .get(CSRF_TOKEN_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(String::from);
            let csrf_cookie = req.cookie(CSRF_TOKEN_COOKIE);

            let tokens_match = match (csrf_header, csrf_cookie) {
                (Some(header), Some(cookie)) => {
                    constant_time_eq(header.as_bytes(), cookie.value().as_bytes())
                }
                _ => false,
            };

            if !tokens_match {
                let (req, _payload) = req.into_parts();
                let resp =
                    HttpErrorResponse::CsrfTokenRejected("Missing or mismatched CSRF token")
                        .error_response();

                return Box::pin(async move { Ok(ServiceResponse::new(req, resp)) });
            }
        }

        let fut = self.service.call(req);

        Box::pin(async move {
            let resp = fut.await?;
            Ok(resp.map_into_boxed_body())
        })
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }

    diff == 0
}
