use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::user::User;
use crate::schema::access_tokens;

/// Server-side record of an issued token, keyed by the token's `jti` claim.
#[derive(Clone, Debug, Serialize, Deserialize, Associations, Identifiable, Queryable)]
#[diesel(belongs_to(User))]
#[diesel(table_name = access_tokens)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccessToken {
    pub id: String,
    pub user_id: i32,
    pub created_timestamp: NaiveDateTime,
    pub is_revoked: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = access_tokens)]
pub struct NewAccessToken<'a> {
    pub id: &'a str,
    pub user_id: i32,
    pub created_timestamp: NaiveDateTime,
    pub is_revoked: bool,
}
