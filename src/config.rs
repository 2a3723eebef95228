// ⚙️ Configuration
//
// Loaded from environment variables with defaults suitable for local development.
// Binaries call dotenvy::dotenv() first so a .env file can supply them.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file
    pub database_path: String,
    pub server: ServerConfig,
    pub colin: ColinConfig,
    pub namex: NamexConfig,
    pub accounts: AccountServiceConfig,
    /// Capacity of the in-process filing queue
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Corporate number allocator (COLIN)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColinConfig {
    pub api_url: String,
    pub timeout_secs: u64,
}

/// Name reservation service (NameX)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamexConfig {
    /// Base URL; the NR number is appended directly, so keep the trailing slash
    pub api_url: String,
}

/// Accounts / affiliation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountServiceConfig {
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub entity_url: String,
    pub affiliate_url: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "business_registry.db".to_string()),
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("SERVER_PORT", 3000),
            },
            colin: ColinConfig {
                api_url: env::var("COLIN_API_URL")
                    .unwrap_or_else(|_| "http://localhost:5001/api/v1/businesses".to_string()),
                timeout_secs: parse_var("COLIN_API_TIMEOUT_SECS", 20),
            },
            namex: NamexConfig {
                api_url: env::var("NAMEX_API_URL")
                    .unwrap_or_else(|_| "http://localhost:5002/api/v1/requests/".to_string()),
            },
            accounts: AccountServiceConfig {
                auth_url: env::var("ACCOUNT_SVC_AUTH_URL")
                    .unwrap_or_else(|_| "http://localhost:8081/auth/token".to_string()),
                client_id: env::var("ACCOUNT_SVC_CLIENT_ID").unwrap_or_default(),
                client_secret: env::var("ACCOUNT_SVC_CLIENT_SECRET").unwrap_or_default(),
                entity_url: env::var("ACCOUNT_SVC_ENTITY_URL")
                    .unwrap_or_else(|_| "http://localhost:5003/api/v1/entities".to_string()),
                affiliate_url: env::var("ACCOUNT_SVC_AFFILIATE_URL")
                    .unwrap_or_else(|_| "http://localhost:5003/api/v1/orgs".to_string()),
                timeout_secs: parse_var("ACCOUNT_SVC_TIMEOUT_SECS", 20),
            },
            queue_capacity: parse_var("QUEUE_CAPACITY", 100),
        }
    }

    /// Address the API server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ColinConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AccountServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
