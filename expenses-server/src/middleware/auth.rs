use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures::future;
use std::marker::PhantomData;

use expenses_common::token::{validate_access_token, TokenClaims};

use crate::env;
use crate::handlers::error::HttpErrorResponse;

pub const ACCESS_TOKEN_HEADER: &str = "AccessToken";
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

pub trait TokenLocation {
    fn get_from_request(req: &HttpRequest) -> Option<String>;
}

pub struct FromHeader {}
pub struct FromCookie {}
pub struct FromHeaderOrCookie {}

impl TokenLocation for FromHeader {
    fn get_from_request(req: &HttpRequest) -> Option<String> {
        req.headers()
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(String::from)
    }
}

impl TokenLocation for FromCookie {
    fn get_from_request(req: &HttpRequest) -> Option<String> {
        req.cookie(ACCESS_TOKEN_COOKIE)
            .map(|cookie| String::from(cookie.value()))
    }
}

impl TokenLocation for FromHeaderOrCookie {
    fn get_from_request(req: &HttpRequest) -> Option<String> {
        FromHeader::get_from_request(req).or_else(|| FromCookie::get_from_request(req))
    }
}

/// Extractor that verifies the JWT's signature and expiry. The server-side
/// revocation record is checked separately by the handler.
pub struct VerifiedToken<L: TokenLocation> {
    pub claims: TokenClaims,
    location: PhantomData<L>,
}

impl<L: TokenLocation> FromRequest for VerifiedToken<L> {
    type Error = HttpErrorResponse;
    type Future = future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = match L::get_from_request(req) {
            Some(token) => token,
            None => {
                return future::err(HttpErrorResponse::TokenMissing("Token is missing"));
            }
        };

        match validate_access_token(&token, &env::CONF.token_signing_key) {
            Ok(claims) => future::ok(VerifiedToken {
                claims,
                location: PhantomData,
            }),
            Err(e) => future::err(e.into()),
        }
    }
}
