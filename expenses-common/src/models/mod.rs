pub mod access_token;
pub mod expense;
pub mod expense_category;
pub mod user;
