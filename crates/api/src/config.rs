/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. Unparsable
/// numeric values fall back to their defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// SQLite database URL (default: `sqlite://industrial_iot.db`).
    pub database_url: String,
    /// Connection pool size (default: `5`).
    pub max_connections: u32,
    /// Upper bound for `?limit=` on list endpoints (default: `1000`).
    pub max_query_limit: i64,
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                      |
    /// |------------------------|------------------------------|
    /// | `HOST`                 | `0.0.0.0`                    |
    /// | `PORT`                 | `8000`                       |
    /// | `CORS_ORIGINS`         | `http://localhost:8501`      |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                         |
    /// | `DATABASE_URL`         | `sqlite://industrial_iot.db` |
    /// | `DB_MAX_CONNECTIONS`   | `5`                          |
    /// | `MAX_QUERY_LIMIT`      | `1000`                       |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:8501".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(lookup("PORT"), 8000),
            cors_origins,
            request_timeout_secs: parse_or(lookup("REQUEST_TIMEOUT_SECS"), 30),
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://industrial_iot.db".into()),
            max_connections: parse_or(lookup("DB_MAX_CONNECTIONS"), 5u32).max(1),
            max_query_limit: parse_or(lookup("MAX_QUERY_LIMIT"), 1000i64).max(1),
        }
    }
}
