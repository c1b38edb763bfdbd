// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! typed [`AppConfig`] loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SESSION_SECRET` | HMAC key for session cookies (>= 32 bytes) | Required |
//! | `SESSION_TTL_HOURS` | Session lifetime in hours | `12` |
//! | `DATA_DIR` | Directory holding the user database | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SITE_NAME` | Site name used in logs and API docs | `Stadli` |
//! | `BASE_URL` | Public base URL of the console | `http://localhost:8080` |
//! | `TLS_CERT_PATH` | PEM certificate chain (HTTPS when set with key) | Optional |
//! | `TLS_KEY_PATH` | PEM private key | Optional |
//! | `SEED_ADMIN_EMAIL` | Admin account created at startup if missing | Optional |
//! | `SEED_ADMIN_PASSWORD` | Password for the seeded admin | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use url::Url;

pub const SESSION_SECRET_ENV: &str = "SESSION_SECRET";
pub const SESSION_TTL_HOURS_ENV: &str = "SESSION_TTL_HOURS";

/// Environment variable name for the data directory.
///
/// The user database lives at `$DATA_DIR/users.redb`.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const SITE_NAME_ENV: &str = "SITE_NAME";
pub const BASE_URL_ENV: &str = "BASE_URL";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const SEED_ADMIN_EMAIL_ENV: &str = "SEED_ADMIN_EMAIL";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SITE_NAME: &str = "Stadli";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL_HOURS: u32 = 12;

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// File name of the user database inside `DATA_DIR`.
pub const USER_DB_FILE: &str = "users.redb";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process-wide HMAC key for session cookies.
///
/// Set once at startup and never mutated. `Debug` output is redacted.
#[derive(Clone)]
pub struct SessionSecret(Vec<u8>);

impl SessionSecret {
    /// Wrap a secret, rejecting keys shorter than [`MIN_SECRET_LEN`] bytes.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: SESSION_SECRET_ENV,
                reason: format!(
                    "must be at least {MIN_SECRET_LEN} bytes (got {})",
                    secret.len()
                ),
            });
        }
        Ok(Self(secret))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionSecret([redacted])")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "" => Ok(LogFormat::Pretty),
            other => Err(ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                reason: format!("expected `json` or `pretty`, got `{other}`"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Admin account created at startup when no user with that email exists.
#[derive(Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub session_secret: SessionSecret,
    pub session_ttl_hours: u32,
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub site_name: String,
    pub base_url: Url,
    pub tls: Option<TlsPaths>,
    pub seed_admin: Option<SeedAdmin>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let session_secret = get(SESSION_SECRET_ENV)
            .ok_or(ConfigError::Missing(SESSION_SECRET_ENV))
            .and_then(SessionSecret::new)?;

        let session_ttl_hours = match get(SESSION_TTL_HOURS_ENV) {
            Some(raw) => parse_ttl_hours(&raw)?,
            None => DEFAULT_SESSION_TTL_HOURS,
        };

        let port = match get(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let base_url_raw = get(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(base_url_raw.trim()).map_err(|e| ConfigError::Invalid {
            name: BASE_URL_ENV,
            reason: e.to_string(),
        })?;

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        let seed_admin = match (get(SEED_ADMIN_EMAIL_ENV), get(SEED_ADMIN_PASSWORD_ENV)) {
            (Some(email), Some(password)) => Some(SeedAdmin { email, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(SEED_ADMIN_PASSWORD_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(SEED_ADMIN_EMAIL_ENV)),
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(raw) => LogFormat::parse(&raw)?,
            None => LogFormat::default(),
        };

        Ok(Self {
            session_secret,
            session_ttl_hours,
            data_dir: PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.into())),
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            site_name: get(SITE_NAME_ENV).unwrap_or_else(|| DEFAULT_SITE_NAME.to_string()),
            base_url,
            tls,
            seed_admin,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: HOST_ENV,
                reason: e.to_string(),
            })
    }

    pub fn user_db_path(&self) -> PathBuf {
        self.data_dir.join(USER_DB_FILE)
    }
}

fn parse_ttl_hours(raw: &str) -> Result<u32, ConfigError> {
    let hours = raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
        name: SESSION_TTL_HOURS_ENV,
        reason: e.to_string(),
    })?;
    if hours == 0 {
        return Err(ConfigError::Invalid {
            name: SESSION_TTL_HOURS_ENV,
            reason: "must be a positive number of hours".to_string(),
        });
    }
    Ok(hours)
}
