pub mod auth;
pub mod category;
pub mod expense;
pub mod health;
pub mod user;

pub mod error {
    use actix_web::http::StatusCode;
    use actix_web::{HttpResponse, HttpResponseBuilder};
    use std::fmt;

    use expenses_common::request_io::ErrorResponse;
    use expenses_common::token::TokenError;

    #[derive(Debug)]
    pub enum HttpErrorResponse {
        // 400
        IncorrectlyFormed(&'static str),

        // 401
        IncorrectCredential(&'static str),
        BadToken(&'static str),
        TokenExpired(&'static str),
        TokenMissing(&'static str),

        // 403
        CsrfTokenRejected(&'static str),

        // 404
        DoesNotExist(&'static str),

        // 409
        ConflictWithExisting(&'static str),

        // 500
        InternalError(&'static str),
    }

    impl HttpErrorResponse {
        fn err_type(&self) -> &'static str {
            match self {
                HttpErrorResponse::IncorrectlyFormed(_) => "incorrectly_formed",
                HttpErrorResponse::IncorrectCredential(_) => "incorrect_credential",
                HttpErrorResponse::BadToken(_) => "bad_token",
                HttpErrorResponse::TokenExpired(_) => "token_expired",
                HttpErrorResponse::TokenMissing(_) => "token_missing",
                HttpErrorResponse::CsrfTokenRejected(_) => "csrf_token_rejected",
                HttpErrorResponse::DoesNotExist(_) => "does_not_exist",
                HttpErrorResponse::ConflictWithExisting(_) => "conflict_with_existing",
                HttpErrorResponse::InternalError(_) => "internal_error",
            }
        }

        fn err_message(&self) -> &'static str {
            match self {
                HttpErrorResponse::IncorrectlyFormed(msg)
                | HttpErrorResponse::IncorrectCredential(msg)
                | HttpErrorResponse::BadToken(msg)
                | HttpErrorResponse::TokenExpired(msg)
                | HttpErrorResponse::TokenMissing(msg)
                | HttpErrorResponse::CsrfTokenRejected(msg)
                | HttpErrorResponse::DoesNotExist(msg)
                | HttpErrorResponse::ConflictWithExisting(msg)
                | HttpErrorResponse::InternalError(msg) => msg,
            }
        }
    }

    impl fmt::Display for HttpErrorResponse {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}: {}", self.err_type(), self.err_message())
        }
    }

    impl From<&HttpErrorResponse> for ErrorResponse {
        fn from(error: &HttpErrorResponse) -> Self {
            ErrorResponse {
                err_type: String::from(error.err_type()),
                err_message: String::from(error.err_message()),
            }
        }
    }

    impl actix_web::error::ResponseError for HttpErrorResponse {
        fn status_code(&self) -> StatusCode {
            match self {
                HttpErrorResponse::IncorrectlyFormed(_) => StatusCode::BAD_REQUEST,
                HttpErrorResponse::IncorrectCredential(_)
                | HttpErrorResponse::BadToken(_)
                | HttpErrorResponse::TokenExpired(_)
                | HttpErrorResponse::TokenMissing(_) => StatusCode::UNAUTHORIZED,
                HttpErrorResponse::CsrfTokenRejected(_) => StatusCode::FORBIDDEN,
                HttpErrorResponse::DoesNotExist(_) => StatusCode::NOT_FOUND,
                HttpErrorResponse::ConflictWithExisting(_) => StatusCode::CONFLICT,
                HttpErrorResponse::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }

        fn error_response(&self) -> HttpResponse {
            HttpResponseBuilder::new(self.status_code()).json(ErrorResponse::from(self))
        }
    }

    impl From<actix_web::error::BlockingError> for HttpErrorResponse {
        fn from(_: actix_web::error::BlockingError) -> Self {
            HttpErrorResponse::InternalError("Actix thread pool failure")
        }
    }

    impl From<tokio::sync::oneshot::error::RecvError> for HttpErrorResponse {
        fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
            HttpErrorResponse::InternalError("Rayon thread pool failure")
        }
    }

    impl From<TokenError> for HttpErrorResponse {
        fn from(error: TokenError) -> Self {
            match error {
                TokenError::TokenInvalid => HttpErrorResponse::BadToken("Token is invalid"),
                TokenError::TokenExpired => HttpErrorResponse::TokenExpired("Token is expired"),
                TokenError::TokenMissing => HttpErrorResponse::TokenMissing("Token is missing"),
                TokenError::EncodingError(_) => {
                    HttpErrorResponse::InternalError("Failed to encode token")
                }
            }
        }
    }
}

pub mod access {
    use actix_web::web;

    use expenses_common::db::{auth, DbThreadPool};
    use expenses_common::token::TokenClaims;

    use crate::handlers::error::HttpErrorResponse;

    /// Denies tokens whose server-side record is revoked or missing, even when
    /// the JWT itself verifies.
    pub async fn assert_token_active(
        claims: &TokenClaims,
        db_thread_pool: &DbThreadPool,
    ) -> Result<(), HttpErrorResponse> {
        let auth_dao = auth::Dao::new(db_thread_pool);
        let token_id = claims.jti.to_string();

        let is_active = match web::block(move || auth_dao.check_token_active(&token_id)).await? {
            Ok(a) => a,
            Err(e) => {
                log::error!("{e}");
                return Err(HttpErrorResponse::InternalError(
                    "Failed to check token status",
                ));
            }
        };

        if !is_active {
            return Err(HttpErrorResponse::BadToken("Token is no longer valid"));
        }

        Ok(())
    }
}
