use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::expense_category::ExpenseCategory;
use crate::models::user::User;
use crate::schema::expenses;

#[derive(Clone, Debug, Serialize, Deserialize, Associations, Identifiable, Queryable)]
#[diesel(belongs_to(User))]
#[diesel(belongs_to(ExpenseCategory, foreign_key = category_id))]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Expense {
    pub id: i32,
    pub description: String,
    pub amount: f64,
    pub category_id: i32,
    pub user_id: i32,
    pub created_timestamp: NaiveDateTime,
    pub modified_timestamp: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = expenses)]
pub struct NewExpense<'a> {
    pub description: &'a str,
    pub amount: f64,
    pub category_id: i32,
    pub user_id: i32,
    pub created_timestamp: NaiveDateTime,
    pub modified_timestamp: NaiveDateTime,
}
