use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::{AdminConfig, DEFAULT_ADMIN_SECRET};
use crate::recommend::RecommendConfig;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub catalog: CatalogConfig,
    pub admin: AdminConfig,
    pub recommend: RecommendConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let data_file = env::var("MELCOFFEE_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data").join("coffee.json"));
        let public_dir = env::var("MELCOFFEE_PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("public"));

        let session_ttl = match env::var("MELCOFFEE_SESSION_TTL_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidSessionTtl)?,
            Err(_) => AdminConfig::default().session_ttl,
        };
        let admin = AdminConfig {
            password: env::var("MELCOFFEE_ADMIN_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_ADMIN_SECRET.to_string()),
            token: env::var("MELCOFFEE_ADMIN_TOKEN")
                .unwrap_or_else(|_| DEFAULT_ADMIN_SECRET.to_string()),
            session_ttl,
        };

        let mut recommend = RecommendConfig::default();
        if let Ok(raw) = env::var("MELCOFFEE_RECOMMEND_LIMIT") {
            recommend.default_limit = raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(NonZeroUsize::new)
                .ok_or(ConfigError::InvalidRecommendLimit)?;
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            catalog: CatalogConfig {
                data_file,
                public_dir,
            },
            admin,
            recommend,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the catalog file and the browser assets live.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub data_file: PathBuf,
    pub public_dir: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSessionTtl,
    InvalidRecommendLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSessionTtl => {
                write!(f, "MELCOFFEE_SESSION_TTL_SECS must be a positive integer")
            }
            ConfigError::InvalidRecommendLimit => {
                write!(f, "MELCOFFEE_RECOMMEND_LIMIT must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidSessionTtl
            | ConfigError::InvalidRecommendLimit => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "PORT",
            "APP_LOG_LEVEL",
            "MELCOFFEE_DATA_FILE",
            "MELCOFFEE_PUBLIC_DIR",
            "MELCOFFEE_ADMIN_PASSWORD",
            "MELCOFFEE_ADMIN_TOKEN",
            "MELCOFFEE_SESSION_TTL_SECS",
            "MELCOFFEE_RECOMMEND_LIMIT",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.catalog.data_file, PathBuf::from("data/coffee.json"));
        assert_eq!(config.recommend.default_limit.get(), 8);
        assert_eq!(config.admin.session_ttl, Duration::from_secs(86_400));
        assert!(config.admin.uses_default_credentials());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn falls_back_to_plain_port_variable() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PORT", "8080");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.server.port, 8080);
        reset_env();
    }

    #[test]
    fn rejects_zero_recommend_limit() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MELCOFFEE_RECOMMEND_LIMIT", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidRecommendLimit)
        ));
        reset_env();
    }

    #[test]
    fn reads_admin_credentials() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MELCOFFEE_ADMIN_PASSWORD", "espresso");
        env::set_var("MELCOFFEE_ADMIN_TOKEN", "crema");
        env::set_var("MELCOFFEE_SESSION_TTL_SECS", "600");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.admin.password, "espresso");
        assert_eq!(config.admin.token, "crema");
        assert_eq!(config.admin.session_ttl, Duration::from_secs(600));
        assert!(!config.admin.uses_default_credentials());
        reset_env();
    }
}
