use actix_web::{web, HttpResponse};
use chrono::{Duration, Utc};

use expenses_common::db::category::FALLBACK_CATEGORY;
use expenses_common::db::{category, expense, DaoError, DbThreadPool};
use expenses_common::request_io::{
    CategoryFilterParams, ExpenseSummary, InputEditExpense, InputExpense, OutputCategory,
    OutputCategoryExpenses, OutputExpense, OutputExpenseList, OutputFilteredExpenses, PageInfo,
    PaginationParams, RecentParams, SearchParams,
};
use expenses_common::validators::{self, Validity};

use crate::handlers::access::assert_token_active;
use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::{FromHeaderOrCookie, VerifiedToken};

const DEFAULT_PAGE_LIMIT: i64 = 10;
const MAX_PAGE_LIMIT: i64 = 100;
const DEFAULT_RECENT_WEEKS: i64 = 1;

pub async fn create(
    db_thread_pool: web::Data<DbThreadPool>,
    verified_token: VerifiedToken<FromHeaderOrCookie>,
    expense_data: web::Json<InputExpense>,
) -> Result<HttpResponse, HttpErrorResponse> {
    assert_token_active(&verified_token.claims, &db_thread_pool).await?;

    let expense_data = expense_data.into_inner();

    if !expense_data.amount.is_finite() {
        return Err(HttpErrorResponse::IncorrectlyFormed(
            "Expense amount must be a finite number",
        ));
    }

    if let Validity::Invalid(msg) =
        validators::validate_expense_description(&expense_data.description)
    {
        log::info!("Rejected expense: {msg}");
        return Err(HttpErrorResponse::IncorrectlyFormed("Invalid description"));
    }

    if let Some(name) = expense_data.category.as_deref() {
        if let Validity::Invalid(msg) = validators::validate_category_name(name) {
            log::info!("Rejected expense: {msg}");
            return Err(HttpErrorResponse::IncorrectlyFormed("Invalid category name"));
        }
    }

    let expense_dao = expense::Dao::new(&db_thread_pool);
    let user_id = verified_token.claims.uid;

    let create_result = web::block(move || {
        let category_name = expense_data
            .category
            .as_deref()
            .unwrap_or(FALLBACK_CATEGORY);
        expense_dao.create_expense(
            user_id,
            &expense_data.description,
            expense_data.amount,
            category_name,
        )
    })
    .await?;

    let expense_with_category = match create_result {
        Ok(pair) => pair,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError("Failed to create expense"));
        }
    };

    Ok(HttpResponse::Created().json(OutputExpense::from(expense_with_category)))
}

pub async fn update(
    db_thread_pool: web::Data<DbThreadPool>,
    verified_token: VerifiedToken<FromHeaderOrCookie>,
    expense_id: web::Path<i32>,
    expense_data: web::Json<InputEditExpense>,
) -> Result<HttpResponse, HttpErrorResponse> {
    assert_token_active(&verified_token.claims, &db_thread_pool).await?;

    let expense_data = expense_data.into_inner();

    if let Some(amount) = expense_data.amount {
        if !amount.is_finite() {
            return Err(HttpErrorResponse::IncorrectlyFormed(
                "Expense amount must be a finite number",
            ));
        }
    }

    if let Some(description) = expense_data.description.as_deref() {
        if let Validity::Invalid(msg) = validators::validate_expense_description(description) {
            log::info!("Rejected expense edit: {msg}");
            return Err(HttpErrorResponse::IncorrectlyFormed("Invalid description"));
        }
    }

    if let Some(name) = expense_data.category.as_deref() {
        if let Validity::Invalid(msg) = validators::validate_category_name(name) {
            log::info!("Rejected expense edit: {msg}");
            return Err(HttpErrorResponse::IncorrectlyFormed("Invalid category name"));
        }
    }

    let expense_dao = expense::Dao::new(&db_thread_pool);
    let user_id = verified_token.claims.uid;
    let expense_id = expense_id.into_inner();

    let update_result = web::block(move || {
        expense_dao.update_expense(
            user_id,
            expense_id,
            expense_data.description.as_deref(),
            expense_data.amount,
            expense_data.category.as_deref(),
        )
    })
    .await?;

    let expense_with_category = match update_result {
        Ok(pair) => pair,
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(HttpErrorResponse::DoesNotExist("Expense does not exist"));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError("Failed to update expense"));
        }
    };

    Ok(HttpResponse::Ok().json(OutputExpense::from(expense_with_category)))
}

pub async fn delete(
    db_thread_pool: web::Data<DbThreadPool>,
    verified_token: VerifiedToken<FromHeaderOrCookie>,
    expense_id: web::Path<i32>,
) -> Result<HttpResponse, HttpErrorResponse> {
    assert_token_active(&verified_token.claims, &db_thread_pool).await?;

    let expense_dao = expense::Dao::new(&db_thread_pool);
    let user_id = verified_token.claims.uid;
    let expense_id = expense_id.into_inner();

    let affected_row_count =
        match web::block(move || expense_dao.delete_expense(user_id, expense_id)).await? {
            Ok(count) => count,
            Err(e) => {
                log::error!("{e}");
                return Err(HttpErrorResponse::InternalError("Failed to delete expense"));
            }
        };

    if affected_row_count == 0 {
        return Err(HttpErrorResponse::DoesNotExist("Expense does not exist"));
    }

    Ok(HttpResponse::Ok().finish())
}

pub async fn get_all(
    db_thread_pool: web::Data<DbThreadPool>,
    verified_token: VerifiedToken<FromHeaderOrCookie>,
    pagination: web::Query<PaginationParams>,
) -> Result<HttpResponse, HttpErrorResponse> {
    assert_token_active(&verified_token.claims, &db_thread_pool).await?;

    let limit = pagination
        .limit
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .clamp(1, MAX_PAGE_LIMIT);
    let skip = pagination.skip.unwrap_or(0).max(0);

    let expense_dao = expense::Dao::new(&db_thread_pool);
    let user_id = verified_token.claims.uid;

    let page_result =
        web::block(move || expense_dao.get_expenses_page(user_id, limit, skip)).await?;

    let (page, total) = match page_result {
        Ok(pair) => pair,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError("Failed to list expenses"));
        }
    };

    Ok(HttpResponse::Ok().json(OutputExpenseList {
        expenses: page.into_iter().map(OutputExpense::from).collect(),
        pagination: PageInfo::new(total, limit, skip),
    }))
}

pub async fn search(
    db_thread_pool: web::Data<DbThreadPool>,
    verified_token: VerifiedToken<FromHeaderOrCookie>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse, HttpErrorResponse> {
    assert_token_active(&verified_token.claims, &db_thread_pool).await?;

    let expense_dao = expense::Dao::new(&db_thread_pool);
    let user_id = verified_token.claims.uid;
    let description_fragment = params.into_inner().description;

    let search_result =
        web::block(move || expense_dao.search_expenses(user_id, &description_fragment)).await?;

    let matches = match search_result {
        Ok(m) => m,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to search expenses",
            ));
        }
    };

    let expenses: Vec<OutputExpense> = matches.into_iter().map(OutputExpense::from).collect();

    Ok(HttpResponse::Ok().json(expenses))
}

pub async fn recent(
    db_thread_pool: web::Data<DbThreadPool>,
    verified_token: VerifiedToken<FromHeaderOrCookie>,
    params: web::Query<RecentParams>,
) -> Result<HttpResponse, HttpErrorResponse> {
    assert_token_active(&verified_token.claims, &db_thread_pool).await?;

    let weeks = params.weeks.unwrap_or(DEFAULT_RECENT_WEEKS);

    if weeks < 1 {
        return Err(HttpErrorResponse::IncorrectlyFormed(
            "Weeks must be a positive number",
        ));
    }

    let cutoff = Utc::now().naive_utc() - Duration::weeks(weeks);

    let expense_dao = expense::Dao::new(&db_thread_pool);
    let user_id = verified_token.claims.uid;

    let recent_result =
        web::block(move || expense_dao.get_expenses_since(user_id, cutoff)).await?;

    let recent_expenses = match recent_result {
        Ok(r) => r,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to list recent expenses",
            ));
        }
    };

    let expenses: Vec<OutputExpense> = recent_expenses
        .into_iter()
        .map(OutputExpense::from)
        .collect();

    Ok(HttpResponse::Ok().json(OutputFilteredExpenses {
        summary: ExpenseSummary::new(&expenses),
        expenses,
    }))
}

pub async fn by_category(
    db_thread_pool: web::Data<DbThreadPool>,
    verified_token: VerifiedToken<FromHeaderOrCookie>,
    params: web::Query<CategoryFilterParams>,
) -> Result<HttpResponse, HttpErrorResponse> {
    assert_token_active(&verified_token.claims, &db_thread_pool).await?;

    let category_dao = category::Dao::new(&db_thread_pool);
    let user_id = verified_token.claims.uid;
    let name_fragment = params.into_inner().name;

    let filter_result = web::block(move || {
        category_dao.get_category_with_expenses_by_name(user_id, &name_fragment)
    })
    .await?;

    let (matched_category, category_expenses) = match filter_result {
        Ok(pair) => pair,
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(HttpErrorResponse::DoesNotExist("Category does not exist"));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(
                "Failed to filter expenses by category",
            ));
        }
    };

    let expenses: Vec<OutputExpense> = category_expenses
        .into_iter()
        .map(|e| OutputExpense::from((e, matched_category.clone())))
        .collect();

    Ok(HttpResponse::Ok().json(OutputCategoryExpenses {
        category: OutputCategory::from(matched_category),
        summary: ExpenseSummary::new(&expenses),
        expenses,
    }))
}
