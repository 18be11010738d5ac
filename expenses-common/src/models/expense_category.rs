use serde::{Deserialize, Serialize};

use crate::models::user::User;
use crate::schema::categories;

#[derive(Clone, Debug, Serialize, Deserialize, Associations, Identifiable, Queryable)]
#[diesel(belongs_to(User))]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExpenseCategory {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = categories)]
pub struct NewExpenseCategory<'a> {
    pub name: &'a str,
    pub user_id: i32,
}
