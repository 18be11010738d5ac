use chrono::{NaiveDateTime, Utc};
use diesel::{
    Connection, ExpressionMethods, JoinOnDsl, QueryDsl, QueryResult, RunQueryDsl,
    TextExpressionMethods,
};

use crate::db::{category, DaoError, DbThreadPool};
use crate::models::expense::{Expense, NewExpense};
use crate::models::expense_category::ExpenseCategory;
use crate::schema::categories as category_fields;
use crate::schema::categories::dsl::categories;
use crate::schema::expenses as expense_fields;
use crate::schema::expenses::dsl::expenses;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    pub fn create_expense(
        &self,
        user_id: i32,
        description: &str,
        amount: f64,
        category_name: &str,
    ) -> Result<(Expense, ExpenseCategory), DaoError> {
        let current_time = Utc::now().naive_utc();
        let mut db_connection = self.db_thread_pool.get()?;

        Ok(db_connection.transaction(|conn| {
            let expense_category = category::get_or_create(conn, user_id, category_name)?;

            let expense = diesel::insert_into(expenses)
                .values(&NewExpense {
                    description,
                    amount,
                    category_id: expense_category.id,
                    user_id,
                    created_timestamp: current_time,
                    modified_timestamp: current_time,
                })
                .get_result::<Expense>(conn)?;

            QueryResult::Ok((expense, expense_category))
        })?)
    }

    pub fn update_expense(
        &self,
        user_id: i32,
        expense_id: i32,
        description: Option<&str>,
        amount: Option<f64>,
        category_name: Option<&str>,
    ) -> Result<(Expense, ExpenseCategory), DaoError> {
        let current_time = Utc::now().naive_utc();
        let mut db_connection = self.db_thread_pool.get()?;

        Ok(db_connection.transaction(|conn| {
            let expense = expenses
                .find(expense_id)
                .filter(expense_fields::user_id.eq(user_id))
                .first::<Expense>(conn)?;

            let category_id = match category_name {
                Some(name) => category::get_or_create(conn, user_id, name)?.id,
                None => expense.category_id,
            };

            diesel::update(expenses.find(expense.id))
                .set((
                    expense_fields::description
                        .eq(description.unwrap_or(&expense.description)),
                    expense_fields::amount.eq(amount.unwrap_or(expense.amount)),
                    expense_fields::category_id.eq(category_id),
                    expense_fields::modified_timestamp.eq(current_time),
                ))
                .execute(conn)?;

            let updated_expense = expenses.find(expense.id).first::<Expense>(conn)?;
            let expense_category = categories
                .find(updated_expense.category_id)
                .first::<ExpenseCategory>(conn)?;

            QueryResult::Ok((updated_expense, expense_category))
        })?)
    }

    pub fn delete_expense(&self, user_id: i32, expense_id: i32) -> Result<usize, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        Ok(diesel::delete(
            expenses
                .find(expense_id)
                .filter(expense_fields::user_id.eq(user_id)),
        )
        .execute(&mut db_connection)?)
    }

    /// Returns one page of the user's expenses (with their categories) plus
    /// the user's total expense count.
    pub fn get_expenses_page(
        &self,
        user_id: i32,
        limit: i64,
        skip: i64,
    ) -> Result<(Vec<(Expense, ExpenseCategory)>, i64), DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        let total = expenses
            .filter(expense_fields::user_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut db_connection)?;

        let page = expenses
            .inner_join(categories.on(category_fields::id.eq(expense_fields::category_id)))
            .filter(expense_fields::user_id.eq(user_id))
            .order(expense_fields::id.asc())
            .limit(limit)
            .offset(skip)
            .load::<(Expense, ExpenseCategory)>(&mut db_connection)?;

        Ok((page, total))
    }

    pub fn search_expenses(
        &self,
        user_id: i32,
        description_fragment: &str,
    ) -> Result<Vec<(Expense, ExpenseCategory)>, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        // SQLite LIKE is case-insensitive for ASCII
        Ok(expenses
            .inner_join(categories.on(category_fields::id.eq(expense_fields::category_id)))
            .filter(expense_fields::user_id.eq(user_id))
            .filter(expense_fields::description.like(format!("%{description_fragment}%")))
            .order(expense_fields::id.asc())
            .load::<(Expense, ExpenseCategory)>(&mut db_connection)?)
    }

    pub fn get_expenses_since(
        &self,
        user_id: i32,
        cutoff: NaiveDateTime,
    ) -> Result<Vec<(Expense, ExpenseCategory)>, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        Ok(expenses
            .inner_join(categories.on(category_fields::id.eq(expense_fields::category_id)))
            .filter(expense_fields::user_id.eq(user_id))
            .filter(expense_fields::created_timestamp.ge(cutoff))
            .order(expense_fields::id.asc())
            .load::<(Expense, ExpenseCategory)>(&mut db_connection)?)
    }
}
