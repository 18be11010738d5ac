use chrono::Utc;
use diesel::{
    BoolExpressionMethods, Connection, ExpressionMethods, QueryDsl, QueryResult, RunQueryDsl,
};

use crate::db::category::DEFAULT_CATEGORIES;
use crate::db::{DaoError, DbThreadPool};
use crate::models::expense_category::{ExpenseCategory, NewExpenseCategory};
use crate::models::user::{NewUser, User};
use crate::schema::categories as category_fields;
use crate::schema::categories::dsl::categories;
use crate::schema::users as user_fields;
use crate::schema::users::dsl::users;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    /// Creates the user and seeds their default categories in one transaction.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<(User, Vec<ExpenseCategory>), DaoError> {
        let current_time = Utc::now().naive_utc();
        let email_lowercase = email.to_lowercase();

        let new_user = NewUser {
            username,
            email: &email_lowercase,
            password_hash,
            created_timestamp: current_time,
            modified_timestamp: current_time,
        };

        let mut db_connection = self.db_thread_pool.get()?;

        Ok(db_connection.transaction(|conn| {
            let user = diesel::insert_into(users)
                .values(&new_user)
                .get_result::<User>(conn)?;

            let mut seeded_categories = Vec::with_capacity(DEFAULT_CATEGORIES.len());
            for name in DEFAULT_CATEGORIES {
                let category = diesel::insert_into(categories)
                    .values(&NewExpenseCategory {
                        name,
                        user_id: user.id,
                    })
                    .get_result::<ExpenseCategory>(conn)?;
                seeded_categories.push(category);
            }

            QueryResult::Ok((user, seeded_categories))
        })?)
    }

    pub fn get_user_by_id(&self, user_id: i32) -> Result<User, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;
        Ok(users.find(user_id).first::<User>(&mut db_connection)?)
    }

    /// Looks a user up by username or (lowercased) email address.
    pub fn get_user_by_identifier(&self, identifier: &str) -> Result<User, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        Ok(users
            .filter(
                user_fields::username
                    .eq(identifier)
                    .or(user_fields::email.eq(identifier.to_lowercase())),
            )
            .first::<User>(&mut db_connection)?)
    }

    pub fn get_user_with_categories(
        &self,
        user_id: i32,
    ) -> Result<(User, Vec<ExpenseCategory>), DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        let user = users.find(user_id).first::<User>(&mut db_connection)?;
        let user_categories = categories
            .filter(category_fields::user_id.eq(user_id))
            .order(category_fields::id.asc())
            .load::<ExpenseCategory>(&mut db_connection)?;

        Ok((user, user_categories))
    }

    pub fn delete_user(&self, user_id: i32) -> Result<usize, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;
        Ok(diesel::delete(users.find(user_id)).execute(&mut db_connection)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::Rng;

    use crate::db::test_utils::DB_THREAD_POOL;
    use crate::db::{auth, category, expense};

    #[test]
    fn test_create_user_seeds_default_categories() {
        let user_number: u32 = rand::thread_rng().gen();
        let dao = Dao::new(&DB_THREAD_POOL);

        let (created_user, seeded_categories) = dao
            .create_user(
                &format!("test_user{user_number}"),
                &format!("Test_User{user_number}@Test.com"),
                "$argon2id$hashedpassword",
            )
            .unwrap();

        assert_eq!(
            created_user.email,
            format!("test_user{user_number}@test.com")
        );
        assert_eq!(seeded_categories.len(), DEFAULT_CATEGORIES.len());

        for name in DEFAULT_CATEGORIES {
            assert!(seeded_categories.iter().any(|c| c.name == name));
        }
    }

    #[test]
    fn test_create_user_duplicate_username_fails() {
        let user_number: u32 = rand::thread_rng().gen();
        let dao = Dao::new(&DB_THREAD_POOL);

        dao.create_user(
            &format!("test_user{user_number}"),
            &format!("test_user{user_number}@test.com"),
            "$argon2id$hashedpassword",
        )
        .unwrap();

        let result = dao.create_user(
            &format!("test_user{user_number}"),
            &format!("other{user_number}@test.com"),
            "$argon2id$hashedpassword",
        );

        assert!(matches!(
            result,
            Err(DaoError::QueryFailure(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            )))
        ));
    }

    #[test]
    fn test_get_user_by_identifier() {
        let user_number: u32 = rand::thread_rng().gen();
        let dao = Dao::new(&DB_THREAD_POOL);

        let (created_user, _) = dao
            .create_user(
                &format!("test_user{user_number}"),
                &format!("test_user{user_number}@test.com"),
                "$argon2id$hashedpassword",
            )
            .unwrap();

        let by_username = dao
            .get_user_by_identifier(&format!("test_user{user_number}"))
            .unwrap();
        assert_eq!(by_username.id, created_user.id);

        let by_email = dao
            .get_user_by_identifier(&format!("Test_User{user_number}@Test.com"))
            .unwrap();
        assert_eq!(by_email.id, created_user.id);

        let missing = dao.get_user_by_identifier("no_such_user");
        assert!(matches!(
            missing,
            Err(DaoError::QueryFailure(diesel::result::Error::NotFound))
        ));
    }

    #[test]
    fn test_delete_user_cascades() {
        let user_number: u32 = rand::thread_rng().gen();
        let dao = Dao::new(&DB_THREAD_POOL);
        let expense_dao = expense::Dao::new(&DB_THREAD_POOL);
        let category_dao = category::Dao::new(&DB_THREAD_POOL);
        let auth_dao = auth::Dao::new(&DB_THREAD_POOL);

        let (created_user, _) = dao
            .create_user(
                &format!("test_user{user_number}"),
                &format!("test_user{user_number}@test.com"),
                "$argon2id$hashedpassword",
            )
            .unwrap();

        expense_dao
            .create_expense(created_user.id, "Groceries run", 54.20, "Groceries")
            .unwrap();
        let token_id = uuid::Uuid::now_v7().to_string();
        auth_dao
            .create_token_record(&token_id, created_user.id)
            .unwrap();

        let affected = dao.delete_user(created_user.id).unwrap();
        assert_eq!(affected, 1);

        let (_, total) = expense_dao
            .get_expenses_page(created_user.id, 10, 0)
            .unwrap();
        assert_eq!(total, 0);
        assert!(category_dao
            .get_categories(created_user.id)
            .unwrap()
            .is_empty());
        assert!(!auth_dao.check_token_active(&token_id).unwrap());
    }
}
