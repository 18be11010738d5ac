use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpResponse};
use argon2_kdf::{Algorithm, Hash, Hasher, Secret};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::oneshot;
use zeroize::Zeroizing;

use expenses_common::db::{auth, user, DaoError, DbThreadPool};
use expenses_common::request_io::{CredentialPair, TokenData};
use expenses_common::token::generate_access_token;

use crate::env;
use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::{FromHeaderOrCookie, VerifiedToken, ACCESS_TOKEN_COOKIE};
use crate::middleware::csrf::CSRF_TOKEN_COOKIE;

/// Hashes a password on a rayon thread using the configured Argon2id
/// parameters and server-side secret.
pub(crate) async fn hash_password(
    password: Zeroizing<String>,
) -> Result<String, HttpErrorResponse> {
    let (sender, receiver) = oneshot::channel();

    rayon::spawn(move || {
        let hash_result = Hasher::default()
            .algorithm(Algorithm::Argon2id)
            .salt_length(env::CONF.hash_salt_length)
            .hash_length(env::CONF.hash_length)
            .iterations(env::CONF.hash_iterations)
            .memory_cost_kib(env::CONF.hash_mem_cost_kib)
            .threads(env::CONF.hash_threads)
            .secret(Secret::using(&env::CONF.hashing_key))
            .hash(password.as_bytes())
            .map(|hash| hash.to_string());

        sender
            .send(hash_result)
            .expect("Sending to channel failed");
    });

    match receiver.await? {
        Ok(hash) => Ok(hash),
        Err(e) => {
            log::error!("Failed to hash password: {e}");
            Err(HttpErrorResponse::InternalError("Failed to hash password"))
        }
    }
}

pub async fn sign_in(
    db_thread_pool: web::Data<DbThreadPool>,
    credentials: web::Json<CredentialPair>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let credentials = credentials.into_inner();
    let password = Zeroizing::new(credentials.password);

    let user_dao = user::Dao::new(&db_thread_pool);
    let identifier = credentials.user.clone();
    let user_lookup = web::block(move || user_dao.get_user_by_identifier(&identifier)).await?;

    let user = match user_lookup {
        Ok(u) => Some(u),
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => None,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError("Failed to look up user"));
        }
    };

    let Some(user) = user else {
        // Hash the password anyway so response timing doesn't reveal whether
        // the account exists
        hash_password(password).await?;
        return Err(HttpErrorResponse::IncorrectCredential(
            "Incorrect username, email, or password",
        ));
    };

    let hash = match Hash::from_str(&user.password_hash) {
        Ok(h) => h,
        Err(e) => {
            log::error!("Failed to parse password hash for user {}: {e}", user.id);
            return Err(HttpErrorResponse::InternalError(
                "Failed to verify credentials",
            ));
        }
    };

    let (sender, receiver) = oneshot::channel();

    rayon::spawn(move || {
        let does_match = hash.verify_with_secret(
            password.as_bytes(),
            Secret::using(&env::CONF.hashing_key),
        );

        sender.send(does_match).expect("Sending to channel failed");
    });

    if !receiver.await? {
        return Err(HttpErrorResponse::IncorrectCredential(
            "Incorrect username, email, or password",
        ));
    }

    let (token, token_id) = generate_access_token(
        user.id,
        &user.username,
        env::CONF.access_token_lifetime,
        &env::CONF.token_signing_key,
    )?;

    let auth_dao = auth::Dao::new(&db_thread_pool);
    let token_id_string = token_id.to_string();
    let record_result =
        web::block(move || auth_dao.create_token_record(&token_id_string, user.id)).await?;

    if let Err(e) = record_result {
        log::error!("{e}");
        return Err(HttpErrorResponse::InternalError(
            "Failed to record access token",
        ));
    }

    let mut csrf_token_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut csrf_token_bytes);
    let csrf_token = URL_SAFE_NO_PAD.encode(csrf_token_bytes);

    let access_token_cookie = Cookie::build(ACCESS_TOKEN_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .finish();

    // Readable by scripts so browser clients can echo it in the CSRF-Token
    // header
    let csrf_token_cookie = Cookie::build(CSRF_TOKEN_COOKIE, csrf_token)
        .path("/")
        .http_only(false)
        .same_site(SameSite::Strict)
        .finish();

    let server_time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Failed to fetch system time")
        .as_millis();

    Ok(HttpResponse::Ok()
        .cookie(access_token_cookie)
        .cookie(csrf_token_cookie)
        .json(TokenData {
            access_token: token,
            token_type: String::from("bearer"),
            server_time,
        }))
}

pub async fn logout(
    db_thread_pool: web::Data<DbThreadPool>,
    verified_token: VerifiedToken<FromHeaderOrCookie>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let auth_dao = auth::Dao::new(&db_thread_pool);
    let token_id = verified_token.claims.jti.to_string();

    let affected_row_count = match web::block(move || auth_dao.revoke_token(&token_id)).await? {
        Ok(count) => count,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError("Failed to revoke token"));
        }
    };

    if affected_row_count == 0 {
        return Err(HttpErrorResponse::BadToken("Token is no longer valid"));
    }

    let mut access_token_cookie = Cookie::build(ACCESS_TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .finish();
    access_token_cookie.make_removal();

    let mut csrf_token_cookie = Cookie::build(CSRF_TOKEN_COOKIE, "")
        .path("/")
        .same_site(SameSite::Strict)
        .finish();
    csrf_token_cookie.make_removal();

    Ok(HttpResponse::Ok()
        .cookie(access_token_cookie)
        .cookie(csrf_token_cookie)
        .finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    use expenses_common::request_io::ErrorResponse;
    use expenses_common::token::validate_access_token;

    use crate::env::testing::DB_THREAD_POOL;
    use crate::handlers::test_utils::{create_user, create_user_and_sign_in, TEST_PASSWORD};
    use crate::middleware::auth::ACCESS_TOKEN_HEADER;
    use crate::services;

    #[actix_web::test]
    async fn test_sign_in_with_username_and_email() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DB_THREAD_POOL.clone()))
                .configure(services::api::configure),
        )
        .await;

        let (created_user, new_user) = create_user().await;

        for identifier in [new_user.username.clone(), new_user.email.clone()] {
            let req = test::TestRequest::post()
                .uri("/api/auth/sign_in")
                .set_json(CredentialPair {
                    user: identifier,
                    password: String::from(TEST_PASSWORD),
                })
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);

            let cookies: Vec<_> = resp.response().cookies().collect();
            assert!(cookies.iter().any(|c| c.name() == ACCESS_TOKEN_COOKIE));
            assert!(cookies.iter().any(|c| c.name() == CSRF_TOKEN_COOKIE));

            let token_data: TokenData = test::read_body_json(resp).await;
            assert_eq!(token_data.token_type, "bearer");

            let claims =
                validate_access_token(&token_data.access_token, &env::CONF.token_signing_key)
                    .unwrap();
            assert_eq!(claims.uid, created_user.id);
            assert_eq!(claims.unm, created_user.username);
        }
    }

    #[actix_web::test]
    async fn test_sign_in_wrong_password() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DB_THREAD_POOL.clone()))
                .configure(services::api::configure),
        )
        .await;

        let (_, new_user) = create_user().await;

        let req = test::TestRequest::post()
            .uri("/api/auth/sign_in")
            .set_json(CredentialPair {
                user: new_user.username,
                password: String::from("wrong-password1"),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let error: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(error.err_type, "incorrect_credential");
    }

    #[actix_web::test]
    async fn test_sign_in_unknown_user() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DB_THREAD_POOL.clone()))
                .configure(services::api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/auth/sign_in")
            .set_json(CredentialPair {
                user: String::from("no_such_user_anywhere"),
                password: String::from(TEST_PASSWORD),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let error: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(error.err_type, "incorrect_credential");
    }

    #[actix_web::test]
    async fn test_logout_revokes_token() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DB_THREAD_POOL.clone()))
                .configure(services::api::configure),
        )
        .await;

        let (_, _, access_token) = create_user_and_sign_in().await;

        let req = test::TestRequest::get()
            .uri("/api/user/get")
            .insert_header((ACCESS_TOKEN_HEADER, access_token.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/auth/logout")
            .insert_header((ACCESS_TOKEN_HEADER, access_token.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        // The JWT still verifies, but the server-side record is revoked
        let req = test::TestRequest::get()
            .uri("/api/user/get")
            .insert_header((ACCESS_TOKEN_HEADER, access_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let error: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(error.err_type, "bad_token");
    }
}
