//! Runtime configuration, read from the environment (and `.env` if present).

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use rolegate_auth::Password;
use rolegate_core::Email;
use rolegate_observability::LogFormat;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080";
pub const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("ROLEGATE_BOOTSTRAP_ADMIN_EMAIL and ROLEGATE_BOOTSTRAP_ADMIN_PASSWORD must be set together")]
    IncompleteBootstrap,
}

/// Credentials for the admin seeded at startup.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: Email,
    pub password: Password,
}

impl core::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind: SocketAddr,
    /// Postgres is used when set; otherwise everything is in memory.
    pub database_url: Option<String>,
    /// Base for links sent to users (email verification).
    pub public_url: String,
    pub session_ttl: Duration,
    pub cookie_secure: bool,
    pub log_format: LogFormat,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
            cookie_secure: false,
            log_format: LogFormat::Json,
            bootstrap_admin: None,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get("ROLEGATE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "ROLEGATE_BIND",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let session_ttl = match get("ROLEGATE_SESSION_TTL_SECS") {
            None => Duration::seconds(DEFAULT_SESSION_TTL_SECS),
            Some(raw) => match raw.parse::<i64>() {
                Ok(secs) if secs > 0 => Duration::seconds(secs),
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        var: "ROLEGATE_SESSION_TTL_SECS",
                        value: raw,
                        reason: "must be positive".to_string(),
                    });
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: "ROLEGATE_SESSION_TTL_SECS",
                        value: raw,
                        reason: e.to_string(),
                    });
                }
            },
        };

        let cookie_secure = match get("ROLEGATE_COOKIE_SECURE") {
            None => false,
            Some(raw) => raw.parse::<bool>().map_err(|e| ConfigError::Invalid {
                var: "ROLEGATE_COOKIE_SECURE",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
        };

        let log_format = match get("ROLEGATE_LOG_FORMAT") {
            None => LogFormat::Json,
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| ConfigError::Invalid {
                var: "ROLEGATE_LOG_FORMAT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
        };

        let bootstrap_admin = match (
            get("ROLEGATE_BOOTSTRAP_ADMIN_EMAIL"),
            get("ROLEGATE_BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (None, None) => None,
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                email: Email::parse(&email).map_err(|e| ConfigError::Invalid {
                    var: "ROLEGATE_BOOTSTRAP_ADMIN_EMAIL",
                    value: email.clone(),
                    reason: e.to_string(),
                })?,
                password: Password::new(password),
            }),
            _ => return Err(ConfigError::IncompleteBootstrap),
        };

        Ok(Self {
            bind,
            database_url: get("DATABASE_URL"),
            public_url: get("ROLEGATE_PUBLIC_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string()),
            session_ttl,
            cookie_secure,
            log_format,
            bootstrap_admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ApiConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.bind.port(), 8080);
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.session_ttl, Duration::seconds(3600));
        assert!(!cfg.cookie_secure);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert!(cfg.bootstrap_admin.is_none());
    }

    #[test]
    fn reads_overrides() {
        let cfg = load(&[
            ("ROLEGATE_BIND", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://localhost/rolegate"),
            ("ROLEGATE_SESSION_TTL_SECS", "60"),
            ("ROLEGATE_COOKIE_SECURE", "true"),
            ("ROLEGATE_LOG_FORMAT", "pretty"),
            ("ROLEGATE_PUBLIC_URL", "https://uni.example/"),
            ("ROLEGATE_BOOTSTRAP_ADMIN_EMAIL", "Root@Uni.edu"),
            ("ROLEGATE_BOOTSTRAP_ADMIN_PASSWORD", "rootpw1"),
        ])
        .unwrap();
        assert_eq!(cfg.bind.to_string(), "127.0.0.1:9000");
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/rolegate"));
        assert_eq!(cfg.session_ttl, Duration::seconds(60));
        assert!(cfg.cookie_secure);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert_eq!(cfg.public_url, "https://uni.example");
        assert_eq!(cfg.bootstrap_admin.unwrap().email.as_str(), "root@uni.edu");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            load(&[("ROLEGATE_SESSION_TTL_SECS", "0")]),
            Err(ConfigError::Invalid { var: "ROLEGATE_SESSION_TTL_SECS", .. })
        ));
        assert!(matches!(
            load(&[("ROLEGATE_BIND", "nowhere")]),
            Err(ConfigError::Invalid { var: "ROLEGATE_BIND", .. })
        ));
        assert!(matches!(
            load(&[("ROLEGATE_LOG_FORMAT", "xml")]),
            Err(ConfigError::Invalid { var: "ROLEGATE_LOG_FORMAT", .. })
        ));
    }

    #[test]
    fn bootstrap_needs_both_halves() {
        assert!(matches!(
            load(&[("ROLEGATE_BOOTSTRAP_ADMIN_EMAIL", "root@uni.edu")]),
            Err(ConfigError::IncompleteBootstrap)
        ));
    }

    #[test]
    fn debug_output_hides_bootstrap_password() {
        let cfg = load(&[
            ("ROLEGATE_BOOTSTRAP_ADMIN_EMAIL", "root@uni.edu"),
            ("ROLEGATE_BOOTSTRAP_ADMIN_PASSWORD", "hunter22"),
        ])
        .unwrap();
        assert!(!format!("{cfg:?}").contains("hunter22"));
    }
}
