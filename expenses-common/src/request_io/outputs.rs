use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::expense::Expense;
use crate::models::expense_category::ExpenseCategory;
use crate::models::user::User;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputCategory {
    pub id: i32,
    pub name: String,
}

impl From<ExpenseCategory> for OutputCategory {
    fn from(category: ExpenseCategory) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_timestamp: NaiveDateTime,
    pub modified_timestamp: NaiveDateTime,
    pub categories: Vec<OutputCategory>,
}

impl From<(User, Vec<ExpenseCategory>)> for OutputUser {
    fn from((user, categories): (User, Vec<ExpenseCategory>)) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_timestamp: user.created_timestamp,
            modified_timestamp: user.modified_timestamp,
            categories: categories.into_iter().map(OutputCategory::from).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputExpense {
    pub id: i32,
    pub description: String,
    pub amount: f64,
    pub category: OutputCategory,
    pub created_timestamp: NaiveDateTime,
    pub modified_timestamp: NaiveDateTime,
}

impl From<(Expense, ExpenseCategory)> for OutputExpense {
    fn from((expense, category): (Expense, ExpenseCategory)) -> Self {
        Self {
            id: expense.id,
            description: expense.description,
            amount: expense.amount,
            category: OutputCategory::from(category),
            created_timestamp: expense.created_timestamp,
            modified_timestamp: expense.modified_timestamp,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageInfo {
    pub total: i64,
    pub limit: i64,
    pub skip: i64,
    pub current_page: i64,
    pub total_pages: i64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageInfo {
    /// `limit` must be positive and `skip` non-negative (the handler clamps
    /// them before paginating).
    pub fn new(total: i64, limit: i64, skip: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        // skip is client-supplied and may be as large as i64::MAX
        let current_page = (skip / limit).saturating_add(1);

        Self {
            total,
            limit,
            skip,
            current_page,
            total_pages,
            has_previous: current_page > 1,
            has_next: current_page < total_pages,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputExpenseList {
    pub expenses: Vec<OutputExpense>,
    pub pagination: PageInfo,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub total_count: i64,
    pub total_amount: f64,
}

impl ExpenseSummary {
    pub fn new(expenses: &[OutputExpense]) -> Self {
        Self {
            total_count: expenses.len() as i64,
            total_amount: expenses.iter().map(|e| e.amount).sum(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputFilteredExpenses {
    pub summary: ExpenseSummary,
    pub expenses: Vec<OutputExpense>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputCategoryExpenses {
    pub category: OutputCategory,
    pub summary: ExpenseSummary,
    pub expenses: Vec<OutputExpense>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenData {
    pub access_token: String,
    pub token_type: String,
    pub server_time: u128,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub err_type: String,
    pub err_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_info_empty() {
        let info = PageInfo::new(0, 10, 0);

        assert_eq!(info.total_pages, 0);
        assert_eq!(info.current_page, 1);
        assert!(!info.has_previous);
        assert!(!info.has_next);
    }

    #[test]
    fn test_page_info_exact_multiple() {
        let info = PageInfo::new(20, 10, 0);

        assert_eq!(info.total_pages, 2);
        assert_eq!(info.current_page, 1);
        assert!(!info.has_previous);
        assert!(info.has_next);

        let info = PageInfo::new(20, 10, 10);
        assert_eq!(info.current_page, 2);
        assert!(info.has_previous);
        assert!(!info.has_next);
    }

    #[test]
    fn test_page_info_partial_last_page() {
        let info = PageInfo::new(25, 10, 20);

        assert_eq!(info.total_pages, 3);
        assert_eq!(info.current_page, 3);
        assert!(info.has_previous);
        assert!(!info.has_next);
    }

    #[test]
    fn test_page_info_huge_skip() {
        let info = PageInfo::new(25, 1, i64::MAX);

        assert_eq!(info.current_page, i64::MAX);
        assert!(info.has_previous);
        assert!(!info.has_next);

        let info = PageInfo::new(25, 10, i64::MAX);
        assert_eq!(info.current_page, i64::MAX / 10 + 1);
        assert!(!info.has_next);
    }

    #[test]
    fn test_page_info_consistency() {
        for total in [0i64, 1, 9, 10, 11, 99, 100] {
            for limit in [1i64, 7, 10, 100] {
                for page in 0..12 {
                    let skip = page * limit;
                    let info = PageInfo::new(total, limit, skip);

                    let expected_pages = (total + limit - 1) / limit;
                    assert_eq!(info.total_pages, expected_pages);
                    assert_eq!(info.current_page, skip / limit + 1);
                    assert_eq!(info.has_previous, info.current_page > 1);
                    assert_eq!(info.has_next, info.current_page < info.total_pages);
                }
            }
        }
    }

    #[test]
    fn test_expense_summary() {
        let expenses = vec![
            OutputExpense {
                id: 1,
                description: String::from("One"),
                amount: 10.5,
                category: OutputCategory {
                    id: 1,
                    name: String::from("Others"),
                },
                created_timestamp: chrono::Utc::now().naive_utc(),
                modified_timestamp: chrono::Utc::now().naive_utc(),
            },
            OutputExpense {
                id: 2,
                description: String::from("Two"),
                amount: 4.5,
                category: OutputCategory {
                    id: 1,
                    name: String::from("Others"),
                },
                created_timestamp: chrono::Utc::now().naive_utc(),
                modified_timestamp: chrono::Utc::now().naive_utc(),
            },
        ];

        let summary = ExpenseSummary::new(&expenses);
        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.total_amount, 15.0);

        let empty = ExpenseSummary::new(&[]);
        assert_eq!(empty.total_count, 0);
        assert_eq!(empty.total_amount, 0.0);
    }
}
