use chrono::Utc;
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};

use crate::db::{DaoError, DbThreadPool};
use crate::models::access_token::NewAccessToken;
use crate::schema::access_tokens as access_token_fields;
use crate::schema::access_tokens::dsl::access_tokens;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    pub fn create_token_record(&self, token_id: &str, user_id: i32) -> Result<(), DaoError> {
        let record = NewAccessToken {
            id: token_id,
            user_id,
            created_timestamp: Utc::now().naive_utc(),
            is_revoked: false,
        };

        let mut db_connection = self.db_thread_pool.get()?;

        diesel::insert_into(access_tokens)
            .values(&record)
            .execute(&mut db_connection)?;

        Ok(())
    }

    /// A token with no record (e.g. its user was deleted) counts as inactive.
    pub fn check_token_active(&self, token_id: &str) -> Result<bool, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        let is_revoked = access_tokens
            .find(token_id)
            .select(access_token_fields::is_revoked)
            .first::<bool>(&mut db_connection);

        match is_revoked {
            Ok(revoked) => Ok(!revoked),
            Err(diesel::result::Error::NotFound) => Ok(false),
            Err(e) => Err(DaoError::QueryFailure(e)),
        }
    }

    pub fn revoke_token(&self, token_id: &str) -> Result<usize, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        Ok(diesel::update(access_tokens.find(token_id))
            .set(access_token_fields::is_revoked.eq(true))
            .execute(&mut db_connection)?)
    }
}
