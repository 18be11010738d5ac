use diesel::{
    Connection, ExpressionMethods, QueryDsl, QueryResult, RunQueryDsl, TextExpressionMethods,
};

use crate::db::{DaoError, DbConnection, DbThreadPool};
use crate::models::expense_category::{ExpenseCategory, NewExpenseCategory};
use crate::schema::categories as category_fields;
use crate::schema::categories::dsl::categories;
use crate::schema::expenses as expense_fields;
use crate::schema::expenses::dsl::expenses;

/// Categories seeded for every new user at registration.
pub const DEFAULT_CATEGORIES: [&str; 7] = [
    "Groceries",
    "Leisure",
    "Electronics",
    "Utilities",
    "Clothing",
    "Health",
    "Others",
];

/// Expenses orphaned by a category deletion get reassigned here.
pub const FALLBACK_CATEGORY: &str = "Others";

pub(crate) fn get_or_create(
    conn: &mut DbConnection,
    user_id: i32,
    name: &str,
) -> QueryResult<ExpenseCategory> {
    let existing = categories
        .filter(category_fields::user_id.eq(user_id))
        .filter(category_fields::name.eq(name))
        .first::<ExpenseCategory>(conn);

    match existing {
        Ok(c) => Ok(c),
        Err(diesel::result::Error::NotFound) => {
            diesel::insert_into(categories)
                .values(&NewExpenseCategory { name, user_id })
                .get_result::<ExpenseCategory>(conn)
        }
        Err(e) => Err(e),
    }
}

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    pub fn get_or_create_category(
        &self,
        user_id: i32,
        name: &str,
    ) -> Result<ExpenseCategory, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;
        Ok(get_or_create(&mut db_connection, user_id, name)?)
    }

    pub fn get_categories(&self, user_id: i32) -> Result<Vec<ExpenseCategory>, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        Ok(categories
            .filter(category_fields::user_id.eq(user_id))
            .order(category_fields::id.asc())
            .load::<ExpenseCategory>(&mut db_connection)?)
    }

    pub fn rename_category(
        &self,
        user_id: i32,
        category_id: i32,
        new_name: &str,
    ) -> Result<ExpenseCategory, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        let affected = diesel::update(
            categories
                .find(category_id)
                .filter(category_fields::user_id.eq(user_id)),
        )
        .set(category_fields::name.eq(new_name))
        .execute(&mut db_connection)?;

        if affected == 0 {
            return Err(DaoError::QueryFailure(diesel::result::Error::NotFound));
        }

        Ok(categories
            .find(category_id)
            .first::<ExpenseCategory>(&mut db_connection)?)
    }

    /// Deletes a category, reassigning its expenses to the fallback category.
    /// Deleting the fallback category itself deletes its expenses.
    pub fn delete_category(&self, user_id: i32, category_id: i32) -> Result<(), DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        Ok(db_connection.transaction(|conn| {
            let category = categories
                .find(category_id)
                .filter(category_fields::user_id.eq(user_id))
                .first::<ExpenseCategory>(conn)?;

            if category.name == FALLBACK_CATEGORY {
                diesel::delete(expenses.filter(expense_fields::category_id.eq(category_id)))
                    .execute(conn)?;
            } else {
                let fallback = get_or_create(conn, user_id, FALLBACK_CATEGORY)?;
                diesel::update(expenses.filter(expense_fields::category_id.eq(category_id)))
                    .set(expense_fields::category_id.eq(fallback.id))
                    .execute(conn)?;
            }

            diesel::delete(categories.find(category_id)).execute(conn)?;

            QueryResult::Ok(())
        })?)
    }

    pub fn get_category_with_expenses_by_name(
        &self,
        user_id: i32,
        name_fragment: &str,
    ) -> Result<(ExpenseCategory, Vec<crate::models::expense::Expense>), DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        let category = categories
            .filter(category_fields::user_id.eq(user_id))
            .filter(category_fields::name.like(format!("%{name_fragment}%")))
            .order(category_fields::id.asc())
            .first::<ExpenseCategory>(&mut db_connection)?;

        let category_expenses = expenses
            .filter(expense_fields::user_id.eq(user_id))
            .filter(expense_fields::category_id.eq(category.id))
            .order(expense_fields::id.asc())
            .load::<crate::models::expense::Expense>(&mut db_connection)?;

        Ok((category, category_expenses))
    }
}
