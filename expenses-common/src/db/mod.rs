use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use std::fmt;

pub mod auth;
pub mod category;
pub mod expense;
pub mod user;

pub type DbThreadPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Debug)]
pub enum DaoError {
    DbThreadPoolFailure(r2d2::Error),
    QueryFailure(diesel::result::Error),
}

impl std::error::Error for DaoError {}

impl fmt::Display for DaoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaoError::DbThreadPoolFailure(e) => {
                write!(f, "DaoError: Failed to obtain database connection: {e}")
            }
            DaoError::QueryFailure(e) => write!(f, "DaoError: Query failed: {e}"),
        }
    }
}

impl From<r2d2::Error> for DaoError {
    fn from(error: r2d2::Error) -> Self {
        DaoError::DbThreadPoolFailure(error)
    }
}

impl From<diesel::result::Error> for DaoError {
    fn from(error: diesel::result::Error) -> Self {
        DaoError::QueryFailure(error)
    }
}

/// SQLite leaves foreign key enforcement off unless each connection opts in,
/// and concurrent writers need a busy timeout rather than an immediate
/// `SQLITE_BUSY` failure.
#[derive(Clone, Copy, Debug)]
struct SqliteConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqliteConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        use diesel::connection::SimpleConnection;

        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn create_db_thread_pool(db_path: &str, max_db_connections: u32) -> DbThreadPool {
    Pool::builder()
        .max_size(max_db_connections)
        .connection_customizer(Box::new(SqliteConnectionOptions))
        .build(ConnectionManager::<SqliteConnection>::new(db_path))
        .expect("Failed to create DB thread pool")
}

#[cfg(test)]
pub(crate) mod test_utils {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
    use once_cell::sync::Lazy;

    use super::DbThreadPool;

    pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

    pub static DB_THREAD_POOL: Lazy<DbThreadPool> = Lazy::new(|| {
        let db_path = std::env::temp_dir().join(format!(
            "expenses-common-test-{}.db",
            uuid::Uuid::now_v7().as_simple()
        ));
        let pool = super::create_db_thread_pool(
            db_path.to_str().expect("Invalid temp DB path"),
            8,
        );

        pool.get()
            .expect("Failed to get connection for test migrations")
            .run_pending_migrations(MIGRATIONS)
            .expect("Failed to run test migrations");

        pool
    });
}
