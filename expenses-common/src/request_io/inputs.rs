use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Sign-in credentials. `user` may be a username or an email address.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CredentialPair {
    pub user: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputExpense {
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputEditExpense {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputCategory {
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchParams {
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecentParams {
    pub weeks: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoryFilterParams {
    pub name: String,
}
