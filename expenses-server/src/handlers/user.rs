use actix_web::{web, HttpResponse};
use zeroize::Zeroizing;

use expenses_common::db::{user, DaoError, DbThreadPool};
use expenses_common::request_io::{InputUser, OutputUser};
use expenses_common::validators::{self, Validity};

use crate::handlers::access::assert_token_active;
use crate::handlers::auth::hash_password;
use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::{FromHeaderOrCookie, VerifiedToken};

pub async fn create(
    db_thread_pool: web::Data<DbThreadPool>,
    user_data: web::Json<InputUser>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let user_data = user_data.into_inner();

    if let Validity::Invalid(msg) = validators::validate_username(&user_data.username) {
        log::info!("Rejected registration: {msg}");
        return Err(HttpErrorResponse::IncorrectlyFormed("Invalid username"));
    }

    if let Validity::Invalid(msg) = validators::validate_email_address(&user_data.email) {
        log::info!("Rejected registration: {msg}");
        return Err(HttpErrorResponse::IncorrectlyFormed("Invalid email address"));
    }

    if let Validity::Invalid(msg) = validators::validate_password(&user_data.password) {
        log::info!("Rejected registration: {msg}");
        return Err(HttpErrorResponse::IncorrectlyFormed("Invalid password"));
    }

    let password_hash = hash_password(Zeroizing::new(user_data.password)).await?;

    let user_dao = user::Dao::new(&db_thread_pool);
    let create_result = web::block(move || {
        user_dao.create_user(&user_data.username, &user_data.email, &password_hash)
    })
    .await?;

    let (created_user, seeded_categories) = match create_result {
        Ok(pair) => pair,
        Err(DaoError::QueryFailure(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        ))) => {
            return Err(HttpErrorResponse::ConflictWithExisting(
                "A user with that username or email address already exists",
            ));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError("Failed to create user"));
        }
    };

    Ok(HttpResponse::Created().json(OutputUser::from((created_user, seeded_categories))))
}

pub async fn get(
    db_thread_pool: web::Data<DbThreadPool>,
    verified_token: VerifiedToken<FromHeaderOrCookie>,
) -> Result<HttpResponse, HttpErrorResponse> {
    assert_token_active(&verified_token.claims, &db_thread_pool).await?;

    let user_dao = user::Dao::new(&db_thread_pool);
    let user_id = verified_token.claims.uid;

    let user_with_categories =
        match web::block(move || user_dao.get_user_with_categories(user_id)).await? {
            Ok(pair) => pair,
            Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
                return Err(HttpErrorResponse::DoesNotExist("User does not exist"));
            }
            Err(e) => {
                log::error!("{e}");
                return Err(HttpErrorResponse::InternalError("Failed to get user"));
            }
        };

    Ok(HttpResponse::Ok().json(OutputUser::from(user_with_categories)))
}

pub async fn delete(
    db_thread_pool: web::Data<DbThreadPool>,
    verified_token: VerifiedToken<FromHeaderOrCookie>,
) -> Result<HttpResponse, HttpErrorResponse> {
    assert_token_active(&verified_token.claims, &db_thread_pool).await?;

    let user_dao = user::Dao::new(&db_thread_pool);
    let user_id = verified_token.claims.uid;

    let affected_row_count = match web::block(move || user_dao.delete_user(user_id)).await? {
        Ok(count) => count,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError("Failed to delete user"));
        }
    };

    if affected_row_count == 0 {
        return Err(HttpErrorResponse::DoesNotExist("User does not exist"));
    }

    Ok(HttpResponse::Ok().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    use expenses_common::db::category::DEFAULT_CATEGORIES;
    use expenses_common::request_io::ErrorResponse;

    use crate::env::testing::DB_THREAD_POOL;
    use crate::handlers::test_utils::{create_user_and_sign_in, gen_test_user_input};
    use crate::middleware::auth::ACCESS_TOKEN_HEADER;
    use crate::services;

    #[actix_web::test]
    async fn test_create_user_seeds_categories() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DB_THREAD_POOL.clone()))
                .configure(services::api::configure),
        )
        .await;

        let new_user = gen_test_user_input();

        let req = test::TestRequest::post()
            .uri("/api/user/create")
            .set_json(&new_user)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let created_user: OutputUser = test::read_body_json(resp).await;
        assert_eq!(created_user.username, new_user.username);
        assert_eq!(created_user.email, new_user.email);
        assert_eq!(created_user.categories.len(), DEFAULT_CATEGORIES.len());

        for name in DEFAULT_CATEGORIES {
            assert!(created_user.categories.iter().any(|c| c.name == name));
        }
    }

    #[actix_web::test]
    async fn test_create_user_duplicate_returns_409() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DB_THREAD_POOL.clone()))
                .configure(services::api::configure),
        )
        .await;

        let new_user = gen_test_user_input();

        let req = test::TestRequest::post()
            .uri("/api/user/create")
            .set_json(&new_user)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/user/create")
            .set_json(&new_user)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let error: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(error.err_type, "conflict_with_existing");
    }

    #[actix_web::test]
    async fn test_create_user_invalid_input() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DB_THREAD_POOL.clone()))
                .configure(services::api::configure),
        )
        .await;

        let mut bad_username = gen_test_user_input();
        bad_username.username = String::from("ab");

        let mut bad_email = gen_test_user_input();
        bad_email.email = String::from("not-an-email");

        let mut bad_password = gen_test_user_input();
        bad_password.password = String::from("short");

        for input in [bad_username, bad_email, bad_password] {
            let req = test::TestRequest::post()
                .uri("/api/user/create")
                .set_json(&input)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[actix_web::test]
    async fn test_get_user() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DB_THREAD_POOL.clone()))
                .configure(services::api::configure),
        )
        .await;

        let (created_user, _, access_token) = create_user_and_sign_in().await;

        let req = test::TestRequest::get()
            .uri("/api/user/get")
            .insert_header((ACCESS_TOKEN_HEADER, access_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let fetched_user: OutputUser = test::read_body_json(resp).await;
        assert_eq!(fetched_user.id, created_user.id);
        assert_eq!(fetched_user.username, created_user.username);
        assert_eq!(fetched_user.categories.len(), DEFAULT_CATEGORIES.len());
    }

    #[actix_web::test]
    async fn test_get_user_with_cookie() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DB_THREAD_POOL.clone()))
                .configure(services::api::configure),
        )
        .await;

        let (created_user, _, access_token) = create_user_and_sign_in().await;

        let req = test::TestRequest::get()
            .uri("/api/user/get")
            .cookie(crate::handlers::test_utils::access_token_cookie(
                &access_token,
            ))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let fetched_user: OutputUser = test::read_body_json(resp).await;
        assert_eq!(fetched_user.id, created_user.id);
    }

    #[actix_web::test]
    async fn test_get_user_requires_token() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DB_THREAD_POOL.clone()))
                .configure(services::api::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/user/get").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let error: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(error.err_type, "token_missing");
    }

    #[actix_web::test]
    async fn test_delete_user_removes_data_and_invalidates_token() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DB_THREAD_POOL.clone()))
                .configure(services::api::configure),
        )
        .await;

        let (created_user, _, access_token) = create_user_and_sign_in().await;

        let expense_dao = expenses_common::db::expense::Dao::new(&DB_THREAD_POOL);
        expense_dao
            .create_expense(created_user.id, "Doomed expense", 9.99, "Others")
            .unwrap();

        let req = test::TestRequest::delete()
            .uri("/api/user/delete")
            .insert_header((ACCESS_TOKEN_HEADER, access_token.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let (_, total) = expense_dao
            .get_expenses_page(created_user.id, 10, 0)
            .unwrap();
        assert_eq!(total, 0);

        let category_dao = expenses_common::db::category::Dao::new(&DB_THREAD_POOL);
        assert!(category_dao
            .get_categories(created_user.id)
            .unwrap()
            .is_empty());

        // Token records cascade with the user, so the old token is dead
        let req = test::TestRequest::get()
            .uri("/api/user/get")
            .insert_header((ACCESS_TOKEN_HEADER, access_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
