use base64::engine::general_purpose::STANDARD as b64;
use base64::Engine;
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use zeroize::Zeroizing;

pub const DB_PATH_VAR: &str = "EXPENSES_DB_PATH";
pub const DB_MAX_CONNECTIONS_VAR: &str = "EXPENSES_DB_MAX_CONNECTIONS";

pub const HASHING_KEY_VAR: &str = "EXPENSES_HASHING_KEY_B64";
pub const TOKEN_SIGNING_KEY_VAR: &str = "EXPENSES_TOKEN_SIGNING_KEY_B64";

pub const HASH_LENGTH_VAR: &str = "EXPENSES_HASH_LENGTH";
pub const HASH_ITERATIONS_VAR: &str = "EXPENSES_HASH_ITERATIONS";
pub const HASH_MEM_COST_KIB_VAR: &str = "EXPENSES_HASH_MEM_COST_KIB";
pub const HASH_THREADS_VAR: &str = "EXPENSES_HASH_THREADS";
pub const HASH_SALT_LENGTH_VAR: &str = "EXPENSES_HASH_SALT_LENGTH";

pub const ACCESS_TOKEN_LIFETIME_MINS_VAR: &str = "EXPENSES_ACCESS_TOKEN_LIFETIME_MINS";

pub const ACTIX_WORKER_COUNT_VAR: &str = "EXPENSES_ACTIX_WORKER_COUNT";
pub const LOG_LEVEL_VAR: &str = "EXPENSES_LOG_LEVEL";

#[derive(Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar(&'static str),
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVar(var) => {
                write!(f, "Missing environment variable: '{var}'")
            }
            ConfigError::InvalidVar(var) => {
                write!(f, "Environment variable '{var}' is invalid")
            }
        }
    }
}

pub struct Config {
    pub db_path: String,
    pub db_max_connections: u32,

    pub hashing_key: [u8; 32],
    pub token_signing_key: [u8; 64],

    pub hash_length: u32,
    pub hash_iterations: u32,
    pub hash_mem_cost_kib: u32,
    pub hash_threads: u32,
    pub hash_salt_length: u32,

    pub access_token_lifetime: Duration,

    pub actix_worker_count: usize,
    pub log_level: String,
}

pub static CONF: Lazy<Config> = Lazy::new(|| match build_conf() {
    Ok(conf) => conf,
    Err(e) => {
        eprintln!("CONFIGURATION ERROR: {e}");
        std::process::exit(1);
    }
});

fn build_conf() -> Result<Config, ConfigError> {
    if cfg!(test) {
        return Ok(test_conf());
    }

    let hashing_key_b64 = Zeroizing::new(env_var::<String>(HASHING_KEY_VAR)?);
    let hashing_key = Zeroizing::new(
        b64.decode(hashing_key_b64.as_str())
            .map_err(|_| ConfigError::InvalidVar(HASHING_KEY_VAR))?,
    );
    let hashing_key: [u8; 32] = hashing_key
        .as_slice()
        .try_into()
        .map_err(|_| ConfigError::InvalidVar(HASHING_KEY_VAR))?;

    let token_signing_key_b64 = Zeroizing::new(env_var::<String>(TOKEN_SIGNING_KEY_VAR)?);
    let token_signing_key = Zeroizing::new(
        b64.decode(token_signing_key_b64.as_str())
            .map_err(|_| ConfigError::InvalidVar(TOKEN_SIGNING_KEY_VAR))?,
    );
    let token_signing_key: [u8; 64] = token_signing_key
        .as_slice()
        .try_into()
        .map_err(|_| ConfigError::InvalidVar(TOKEN_SIGNING_KEY_VAR))?;

    Ok(Config {
        db_path: env_var(DB_PATH_VAR)?,
        db_max_connections: env_var_or(DB_MAX_CONNECTIONS_VAR, 24)?,

        hashing_key,
        token_signing_key,

        hash_length: env_var_or(HASH_LENGTH_VAR, 32)?,
        hash_iterations: env_var_or(HASH_ITERATIONS_VAR, 18)?,
        hash_mem_cost_kib: env_var_or(HASH_MEM_COST_KIB_VAR, 62500)?,
        hash_threads: env_var_or(HASH_THREADS_VAR, 1)?,
        hash_salt_length: env_var_or(HASH_SALT_LENGTH_VAR, 16)?,

        access_token_lifetime: Duration::from_secs(
            60 * env_var_or::<u64>(ACCESS_TOKEN_LIFETIME_MINS_VAR, 30)?,
        ),

        actix_worker_count: env_var_or(ACTIX_WORKER_COUNT_VAR, num_cpus::get())?,
        log_level: env_var_or(LOG_LEVEL_VAR, String::from("info"))?,
    })
}

// Hermetic configuration for the test suite. Keys are fixed and hash
// parameters are cheap so tests stay fast.
fn test_conf() -> Config {
    let db_path = std::env::temp_dir().join(format!(
        "expenses-server-test-{}.db",
        uuid::Uuid::now_v7().as_simple()
    ));

    Config {
        db_path: db_path
            .to_str()
            .expect("Invalid temp DB path")
            .to_string(),
        db_max_connections: 8,

        hashing_key: [7; 32],
        token_signing_key: [11; 64],

        hash_length: 32,
        hash_iterations: 1,
        hash_mem_cost_kib: 1024,
        hash_threads: 1,
        hash_salt_length: 16,

        access_token_lifetime: Duration::from_secs(60 * 30),

        actix_worker_count: 2,
        log_level: String::from("info"),
    }
}

fn env_var<T: FromStr>(key: &'static str) -> Result<T, ConfigError> {
    std::env::var(key)
        .map_err(|_| ConfigError::MissingVar(key))?
        .parse()
        .map_err(|_| ConfigError::InvalidVar(key))
}

fn env_var_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value.parse().map_err(|_| ConfigError::InvalidVar(key)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
pub mod testing {
    use diesel_migrations::MigrationHarness;
    use once_cell::sync::Lazy;

    use expenses_common::db::DbThreadPool;

    pub static DB_THREAD_POOL: Lazy<DbThreadPool> = Lazy::new(|| {
        let pool = expenses_common::db::create_db_thread_pool(
            &super::CONF.db_path,
            super::CONF.db_max_connections,
        );

        pool.get()
            .expect("Failed to get connection for test migrations")
            .run_pending_migrations(crate::MIGRATIONS)
            .expect("Failed to run test migrations");

        pool
    });
}
