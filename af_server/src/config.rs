//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use actsfile::auth::{MIN_PASSWORD_LEN, TokenLifetimes, is_valid_email};
use chrono::Duration;
use std::net::SocketAddr;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Deployment environment name reported by `/health`
    pub environment: String,
    /// Security configuration
    pub security: SecurityConfig,
    /// Token lifetimes
    pub tokens: TokenConfig,
    /// Prometheus exporter address, if metrics are enabled
    pub metrics_bind: Option<SocketAddr>,
    /// Verified account created at startup, if configured
    pub seed_user: Option<SeedUserConfig>,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// Password hashing pepper (required)
    pub password_pepper: String,
}

/// Token lifetimes in seconds
#[derive(Debug, Clone, Copy)]
pub struct TokenConfig {
    pub session_ttl_secs: i64,
    pub verification_ttl_secs: i64,
    pub reset_ttl_secs: i64,
}

impl TokenConfig {
    pub fn lifetimes(&self) -> TokenLifetimes {
        TokenLifetimes {
            session: Duration::seconds(self.session_ttl_secs),
            email_verification: Duration::seconds(self.verification_ttl_secs),
            password_reset: Duration::seconds(self.reset_ttl_secs),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 7 * 24 * 60 * 60,
            verification_ttl_secs: 24 * 60 * 60,
            reset_ttl_secs: 60 * 60,
        }
    }
}

/// Demo account seeded into the in-memory store
#[derive(Debug, Clone)]
pub struct SeedUserConfig {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(addr) => addr,
            None => match std::env::var("SERVER_BIND") {
                Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("'{raw}' is not an IP:PORT address"),
                })?,
                Err(_) => SocketAddr::from(([127, 0, 0, 1], 3000)),
            },
        };

        // Security configuration (REQUIRED)
        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let password_pepper =
            std::env::var("PASSWORD_PEPPER").map_err(|_| ConfigError::MissingRequired {
                var: "PASSWORD_PEPPER".to_string(),
                hint: "Generate with: openssl rand -hex 16".to_string(),
            })?;

        let metrics_bind = match std::env::var("METRICS_BIND") {
            Ok(raw) if !raw.trim().is_empty() => {
                Some(raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "METRICS_BIND".to_string(),
                    reason: format!("'{raw}' is not an IP:PORT address"),
                })?)
            }
            _ => None,
        };

        let seed_user = match (
            std::env::var("DEMO_USER_EMAIL"),
            std::env::var("DEMO_USER_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(SeedUserConfig {
                name: std::env::var("DEMO_USER_NAME").unwrap_or_else(|_| "Demo User".to_string()),
                email,
                password,
            }),
            _ => None,
        };

        let defaults = TokenConfig::default();
        let config = ServerConfig {
            bind,
            environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            security: SecurityConfig {
                jwt_secret,
                password_pepper,
            },
            tokens: TokenConfig {
                session_ttl_secs: parse_env_or("SESSION_TTL_SECS", defaults.session_ttl_secs),
                verification_ttl_secs: parse_env_or(
                    "VERIFICATION_TTL_SECS",
                    defaults.verification_ttl_secs,
                ),
                reset_ttl_secs: parse_env_or("RESET_TTL_SECS", defaults.reset_ttl_secs),
            },
            metrics_bind,
            seed_user,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        if self.security.password_pepper.len() < 16 {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_PEPPER".to_string(),
                reason: "Must be at least 16 characters (64-bit security)".to_string(),
            });
        }

        for (var, value) in [
            ("SESSION_TTL_SECS", self.tokens.session_ttl_secs),
            ("VERIFICATION_TTL_SECS", self.tokens.verification_ttl_secs),
            ("RESET_TTL_SECS", self.tokens.reset_ttl_secs),
        ] {
            if value <= 0 {
                return Err(ConfigError::Invalid {
                    var: var.to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }
        }

        if let Some(seed) = &self.seed_user {
            if !is_valid_email(&seed.email) {
                return Err(ConfigError::Invalid {
                    var: "DEMO_USER_EMAIL".to_string(),
                    reason: "Must be a valid email address".to_string(),
                });
            }
            if seed.password.chars().count() < MIN_PASSWORD_LEN {
                return Err(ConfigError::Invalid {
                    var: "DEMO_USER_PASSWORD".to_string(),
                    reason: format!("Must be at least {MIN_PASSWORD_LEN} characters"),
                });
            }
        }

        Ok(())
    }

    /// Whether internal error details may be returned to clients
    pub fn expose_error_details(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:8080".parse().unwrap(),
            environment: "test".to_string(),
            security: SecurityConfig {
                jwt_secret: "a".repeat(32),
                password_pepper: "a".repeat(16),
            },
            tokens: TokenConfig::default(),
            metrics_bind: None,
            seed_user: None,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Use openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("JWT_SECRET"));
        assert!(msg.contains("Use openssl"));
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut config = valid_config();
        config.security.jwt_secret = "short".to_string();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "JWT_SECRET"));
    }

    #[test]
    fn test_short_pepper_rejected() {
        let mut config = valid_config();
        config.security.password_pepper = "pepper".to_string();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "PASSWORD_PEPPER"));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = valid_config();
        config.tokens.reset_ttl_secs = 0;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "RESET_TTL_SECS"));
    }

    #[test]
    fn test_seed_user_validated() {
        let mut config = valid_config();
        config.seed_user = Some(SeedUserConfig {
            name: "Demo".to_string(),
            email: "demo@example.com".to_string(),
            password: "short".to_string(),
        });

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "DEMO_USER_PASSWORD"));
    }

    #[test]
    fn test_lifetimes_from_token_config() {
        let lifetimes = TokenConfig::default().lifetimes();
        assert_eq!(lifetimes.session, Duration::days(7));
        assert_eq!(lifetimes.password_reset, Duration::hours(1));
    }

    #[test]
    fn test_expose_error_details_only_in_development() {
        let mut config = valid_config();
        assert!(!config.expose_error_details());
        config.environment = "Development".to_string();
        assert!(config.expose_error_details());
    }
}
