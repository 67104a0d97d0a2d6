use crate::workflows::stays::report::MAX_REPORT_SLOTS;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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

/// Top-level configuration for the ledger service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub ledger: LedgerConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let include_targets = environment == AppEnvironment::Development;

        let report_slots = positive_var("LEDGER_REPORT_SLOTS", 10)
            .map(|slots| slots as usize)
            .filter(|slots| *slots <= MAX_REPORT_SLOTS)
            .ok_or(ConfigError::InvalidReportSlots)?;
        let sync_attempts =
            positive_var("LEDGER_SYNC_ATTEMPTS", 3).ok_or(ConfigError::InvalidSyncAttempts)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                include_targets,
            },
            ledger: LedgerConfig {
                report_slots,
                sync_attempts,
            },
        })
    }
}

/// Reads a strictly positive integer, falling back to `default` when unset.
fn positive_var(name: &str, default: u32) -> Option<u32> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<u32>().ok().filter(|value| *value > 0),
        Err(_) => Some(default),
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
    pub include_targets: bool,
}

/// Stay ledger behavior.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Interval columns per status kind in rendered reports.
    pub report_slots: usize,
    /// Whole-month recompute-and-write attempts before a sync gives up.
    pub sync_attempts: u32,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidReportSlots,
    InvalidSyncAttempts,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidReportSlots => {
                write!(
                    f,
                    "LEDGER_REPORT_SLOTS must be an integer between 1 and {MAX_REPORT_SLOTS}"
                )
            }
            ConfigError::InvalidSyncAttempts => {
                write!(f, "LEDGER_SYNC_ATTEMPTS must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidReportSlots
            | ConfigError::InvalidSyncAttempts => None,
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
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "LEDGER_REPORT_SLOTS",
            "LEDGER_SYNC_ATTEMPTS",
        ] {
            env::remove_var(name);
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
        assert!(config.telemetry.include_targets);
        assert_eq!(config.ledger.report_slots, 10);
        assert_eq!(config.ledger.sync_attempts, 3);
    }

    #[test]
    fn reads_ledger_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        env::set_var("LEDGER_REPORT_SLOTS", "6");
        env::set_var("LEDGER_SYNC_ATTEMPTS", " 5 ");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert!(!config.telemetry.include_targets);
        assert_eq!(config.ledger.report_slots, 6);
        assert_eq!(config.ledger.sync_attempts, 5);
        reset_env();
    }

    #[test]
    fn rejects_zero_report_slots() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LEDGER_REPORT_SLOTS", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidReportSlots)
        ));
        reset_env();
    }

    #[test]
    fn rejects_report_slots_beyond_a_month() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LEDGER_REPORT_SLOTS", "32");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidReportSlots)
        ));
        env::set_var("LEDGER_REPORT_SLOTS", "31");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.ledger.report_slots, 31);
        reset_env();
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
}
