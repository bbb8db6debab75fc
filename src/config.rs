use std::env;

/// Number of news items shown on the home page unless overridden.
pub const DEFAULT_NEWS_PAGE_SIZE: i64 = 10;

/// Lifetime of issued access tokens unless overridden (one day).
pub const DEFAULT_JWT_TTL_SECONDS: u64 = 86_400;

/// `DATABASE_URL` value that selects the in-memory repository (local runs only).
pub const MEMORY_DB_URL: &str = "memory://";

const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and
/// pulled into handlers and extractors via `FromRef`, so every request sees the same values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Database connection string (Postgres), or `memory://` in local runs.
    pub db_url: String,
    // Runtime environment marker. Controls the `x-user-id` development bypass and log format.
    pub env: Env,
    // Secret used to sign and validate access tokens (HS256).
    pub jwt_secret: String,
    pub jwt_ttl_seconds: u64,
    // How many news items the home page lists.
    pub news_page_size: i64,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Insert demo news on startup (local convenience).
    pub seed_demo: bool,
}

/// Env
///
/// Runtime context: `Local` enables development utilities, `Production` hardens auth
/// and switches logging to JSON.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking configuration for tests: local env, in-memory storage,
    /// default page size.
    fn default() -> Self {
        Self {
            db_url: MEMORY_DB_URL.to_string(),
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            jwt_ttl_seconds: DEFAULT_JWT_TTL_SECONDS,
            news_page_size: DEFAULT_NEWS_PAGE_SIZE,
            bind_addr: "127.0.0.1:3000".to_string(),
            seed_demo: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads all parameters from environment variables, failing fast on anything the
    /// current environment cannot run without.
    ///
    /// # Panics
    /// Panics if `DATABASE_URL` is missing, if `JWT_SECRET` is missing in production,
    /// if production is pointed at the in-memory store, if a numeric variable does
    /// not parse, or if `NEWS_COUNT_ON_HOME_PAGE` is not a positive count.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            Env::Local => env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
        };

        let db_url = env::var("DATABASE_URL").expect("FATAL: DATABASE_URL must be set");
        if env == Env::Production && db_url == MEMORY_DB_URL {
            panic!("FATAL: the in-memory store cannot be used in production.");
        }

        let news_page_size: u32 = parse_var("NEWS_COUNT_ON_HOME_PAGE", DEFAULT_NEWS_PAGE_SIZE as u32);
        if news_page_size == 0 {
            panic!("FATAL: NEWS_COUNT_ON_HOME_PAGE must be at least 1.");
        }

        Self {
            db_url,
            jwt_secret,
            jwt_ttl_seconds: parse_var("JWT_TTL_SECONDS", DEFAULT_JWT_TTL_SECONDS),
            news_page_size: i64::from(news_page_size),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            seed_demo: env == Env::Local && env::var("SEED_DEMO").is_ok_and(|v| v == "1"),
            env,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("FATAL: {name} is not a valid number: {raw:?}")),
        Err(_) => default,
    }
}
