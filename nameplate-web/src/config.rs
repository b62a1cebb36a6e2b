/// Configuration management for the web server
///
/// Loads configuration from environment variables (a `.env` file is picked
/// up in development).
///
/// # Environment Variables
///
/// - `HOST`: host to bind to (default: 0.0.0.0)
/// - `PORT`: port to bind to (default: 8080)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `LOGIN_TOKEN_TTL_SECONDS`: login token time-to-live (default: 300)
/// - `APP_URL`: public base URL used in delivered login links
///   (default: http://localhost:8080)
/// - `RUST_LOG`: log filter

use nameplate_shared::db::DatabaseConfig;
use std::env;

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// How long a login token stays usable, in seconds
    pub token_ttl_seconds: u64,

    /// Public base URL, used when building login links for delivery
    pub app_url: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let token_ttl_seconds = env::var("LOGIN_TOKEN_TTL_SECONDS")
            .unwrap_or_else(|_| "300".to_string())
            .parse::<u64>()?;

        let app_url =
            env::var("APP_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                ..Default::default()
            },
            auth: AuthConfig {
                token_ttl_seconds,
                app_url,
            },
        })
    }

    /// Returns the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Login token time-to-live as a duration.
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.auth.token_ttl_seconds as i64)
    }

    /// Builds the login URL delivered for `token`.
    pub fn login_url(&self, token: &str) -> String {
        format!("{}/login/{token}", self.auth.app_url.trim_end_matches('/'))
    }
}
