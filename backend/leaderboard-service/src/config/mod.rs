use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub leaderboard: LeaderboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_env")]
    pub env: String,

    #[serde(default = "default_app_host")]
    pub host: String,

    #[serde(default = "default_app_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins; "*" allows any origin
    pub allowed_origins: String,

    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardConfig {
    /// Cache bound K: maximum entries retained in the rank index
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Interval for the periodic resync job; 0 disables it
    #[serde(default = "default_resync_interval_secs")]
    pub resync_interval_secs: u64,
}

// Default value functions
fn default_app_env() -> String {
    "development".to_string()
}

fn default_app_host() -> String {
    "0.0.0.0".to_string()
}

fn default_app_port() -> u16 {
    8080
}

fn default_db_max_connections() -> u32 {
    20
}

fn default_cors_max_age() -> u64 {
    3600
}

fn default_cache_capacity() -> usize {
    10_000
}

fn default_resync_interval_secs() -> u64 {
    0
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let app = AppConfig {
            env: env::var("APP_ENV").unwrap_or_else(|_| default_app_env()),
            host: env::var("APP_HOST").unwrap_or_else(|_| default_app_host()),
            port: env::var("APP_PORT")
                .unwrap_or_else(|_| default_app_port().to_string())
                .parse()
                .unwrap_or(default_app_port()),
        };

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| default_db_max_connections().to_string())
                .parse()
                .unwrap_or(default_db_max_connections()),
        };

        let cors = CorsConfig {
            allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            max_age: env::var("CORS_MAX_AGE")
                .unwrap_or_else(|_| default_cors_max_age().to_string())
                .parse()
                .unwrap_or(default_cors_max_age()),
        };

        let leaderboard = LeaderboardConfig {
            cache_capacity: env::var("LEADERBOARD_CACHE_CAPACITY")
                .unwrap_or_else(|_| default_cache_capacity().to_string())
                .parse()
                .unwrap_or(default_cache_capacity()),
            resync_interval_secs: env::var("LEADERBOARD_RESYNC_INTERVAL_SECS")
                .unwrap_or_else(|_| default_resync_interval_secs().to_string())
                .parse()
                .unwrap_or(default_resync_interval_secs()),
        };

        Ok(Config {
            app,
            database,
            cors,
            leaderboard,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(default_app_env(), "development");
        assert_eq!(default_app_host(), "0.0.0.0");
        assert_eq!(default_app_port(), 8080);
        assert_eq!(default_db_max_connections(), 20);
        assert_eq!(default_cache_capacity(), 10_000);
        assert_eq!(default_resync_interval_secs(), 0);
    }
}
