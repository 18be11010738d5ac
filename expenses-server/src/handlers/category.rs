use actix_web::{web, HttpResponse};

use expenses_common::db::{category, DaoError, DbThreadPool};
use expenses_common::request_io::{InputCategory, OutputCategory};
use expenses_common::validators::{self, Validity};

use crate::handlers::access::assert_token_active;
use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::{FromHeaderOrCookie, VerifiedToken};

pub async fn create(
    db_thread_pool: web::Data<DbThreadPool>,
    verified_token: VerifiedToken<FromHeaderOrCookie>,
    category_data: web::Json<InputCategory>,
) -> Result<HttpResponse, HttpErrorResponse> {
    assert_token_active(&verified_token.claims, &db_thread_pool).await?;

    let name = category_data.into_inner().name;

    if let Validity::Invalid(msg) = validators::validate_category_name(&name) {
        log::info!("Rejected category: {msg}");
        return Err(HttpErrorResponse::IncorrectlyFormed("Invalid category name"));
    }

    let category_dao = category::Dao::new(&db_thread_pool);
    let user_id = verified_token.claims.uid;

    // Returns the user's existing category of the same name rather than
    // erroring on a duplicate
    let create_result =
        web::block(move || category_dao.get_or_create_category(user_id, &name)).await?;

    let created_category = match create_result {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to create category",
            ));
        }
    };

    Ok(HttpResponse::Created().json(OutputCategory::from(created_category)))
}

pub async fn update(
    db_thread_pool: web::Data<DbThreadPool>,
    verified_token: VerifiedToken<FromHeaderOrCookie>,
    category_id: web::Path<i32>,
    category_data: web::Json<InputCategory>,
) -> Result<HttpResponse, HttpErrorResponse> {
    assert_token_active(&verified_token.claims, &db_thread_pool).await?;

    let name = category_data.into_inner().name;

    if let Validity::Invalid(msg) = validators::validate_category_name(&name) {
        log::info!("Rejected category rename: {msg}");
        return Err(HttpErrorResponse::IncorrectlyFormed("Invalid category name"));
    }

    let category_dao = category::Dao::new(&db_thread_pool);
    let user_id = verified_token.claims.uid;
    let category_id = category_id.into_inner();

    let rename_result =
        web::block(move || category_dao.rename_category(user_id, category_id, &name)).await?;

    let renamed_category = match rename_result {
        Ok(c) => c,
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(HttpErrorResponse::DoesNotExist("Category does not exist"));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to rename category",
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputCategory::from(renamed_category)))
}

pub async fn delete(
    db_thread_pool: web::Data<DbThreadPool>,
    verified_token: VerifiedToken<FromHeaderOrCookie>,
    category_id: web::Path<i32>,
) -> Result<HttpResponse, HttpErrorResponse> {
    assert_token_active(&verified_token.claims, &db_thread_pool).await?;

    let category_dao = category::Dao::new(&db_thread_pool);
    let user_id = verified_token.claims.uid;
    let category_id = category_id.into_inner();

    let delete_result =
        web::block(move || category_dao.delete_category(user_id, category_id)).await?;

    match delete_result {
        Ok(()) => (),
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(HttpErrorResponse::DoesNotExist("Category does not exist"));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to delete category",
            ));
        }
    }

    Ok(HttpResponse::Ok().finish())
}

pub async fn get_all(
    db_thread_pool: web::Data<DbThreadPool>,
    verified_token: VerifiedToken<FromHeaderOrCookie>,
) -> Result<HttpResponse, HttpErrorResponse> {
    assert_token_active(&verified_token.claims, &db_thread_pool).await?;

    let category_dao = category::Dao::new(&db_thread_pool);
    let user_id = verified_token.claims.uid;

    let categories = match web::block(move || category_dao.get_categories(user_id)).await? {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError("Failed to list categories"));
        }
    };

    let categories: Vec<OutputCategory> =
        categories.into_iter().map(OutputCategory::from).collect();

    Ok(HttpResponse::Ok().json(categories))
}
