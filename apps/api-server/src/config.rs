//! Application configuration loaded from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use quill_core::services::NewAccount;
use quill_infra::{DEFAULT_JWT_SECRET, DatabaseConfig, JwtConfig};

#[cfg(feature = "rate-limit")]
use quill_infra::RateLimitConfig;

/// Credentials of the administrator account ensured at startup.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl From<AdminBootstrap> for NewAccount {
    fn from(admin: AdminBootstrap) -> Self {
        Self {
            username: admin.username,
            email: admin.email,
            password: admin.password,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Apply pending schema migrations at startup.
    pub run_migrations: bool,
    pub jwt: JwtConfig,
    #[cfg(feature = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    /// Take client addresses from forwarding headers. Only safe behind a proxy.
    pub trust_proxy: bool,
    pub admin: Option<AdminBootstrap>,
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed_or("DB_MAX_CONNECTIONS", 20),
            min_connections: parsed_or("DB_MIN_CONNECTIONS", 2),
            connect_timeout: Duration::from_secs(parsed_or("DB_CONNECT_TIMEOUT_SECS", 10)),
        });

        let defaults = JwtConfig::default();
        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                tracing::warn!("JWT_SECRET not set, using the development default");
                DEFAULT_JWT_SECRET.to_string()
            }),
            expiration_hours: parsed_or("JWT_EXPIRATION_HOURS", defaults.expiration_hours),
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        };

        let admin = match (
            env::var("ADMIN_EMAIL"),
            env::var("ADMIN_USERNAME"),
            env::var("ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(username), Ok(password)) => Some(AdminBootstrap {
                email,
                username,
                password,
            }),
            _ => None,
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed_or("PORT", 5001),
            database,
            run_migrations: parsed_or("RUN_MIGRATIONS", false),
            jwt,
            #[cfg(feature = "rate-limit")]
            rate_limit: RateLimitConfig {
                max_requests: parsed_or("RATE_LIMIT_MAX_REQUESTS", 100),
                window: Duration::from_secs(parsed_or("RATE_LIMIT_WINDOW_SECS", 60)),
            },
            trust_proxy: parsed_or("TRUST_PROXY", false),
            admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_password_is_redacted() {
        let admin = AdminBootstrap {
            email: "admin@example.com".into(),
            username: "admin".into(),
            password: "s3cret-pass".into(),
        };
        let printed = format!("{admin:?}");
        assert!(!printed.contains("s3cret-pass"));
        assert!(printed.contains("admin@example.com"));
    }

    #[test]
    fn test_parsed_or_defaults_when_unset() {
        assert_eq!(parsed_or("QUILL_TEST_SURELY_UNSET_KEY", 42u16), 42);
    }
}
