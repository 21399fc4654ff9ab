// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`Config`] object built from them at startup. `.env` files are loaded by
//! `main` before [`Config::from_env`] runs.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `PRIVY_APP_ID` | Privy app id, also the expected token audience | Required |
//! | `PRIVY_APP_SECRET` | Privy app secret for the user API | Required |
//! | `PRIVY_VERIFICATION_KEY` | ES256 PEM public key for access tokens | JWKS |
//! | `PRIVY_API_URL` | Privy API base URL | `https://auth.privy.io` |
//! | `SUPABASE_URL` | Supabase project URL | In-memory store |
//! | `SUPABASE_SERVICE_ROLE_KEY` | Supabase service-role key | Required with `SUPABASE_URL` |
//! | `PINATA_JWT` | Pinata API JWT | In-memory storage |
//! | `PINATA_GATEWAY_URL` | Dedicated Pinata gateway domain | Required with `PINATA_JWT` |
//! | `PINATA_GROUP_ID` | Vector group holding questionnaire documents | `0195b878-…-710312d2f33d` |
//! | `TACT_PROVER_BIN` | Path to the `tact` proof binary | In-process prover |
//! | `TACT_PROVER_TIMEOUT_SECS` | Proof binary timeout in seconds | `600` |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::auth::privy::{PrivyConfig, DEFAULT_API_URL as PRIVY_DEFAULT_API_URL};
use crate::storage::pinata::{DEFAULT_API_URL as PINATA_DEFAULT_API_URL, DEFAULT_UPLOADS_URL};
use crate::storage::PinataConfig;
use crate::store::SupabaseConfig;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const PRIVY_APP_ID_ENV: &str = "PRIVY_APP_ID";
pub const PRIVY_APP_SECRET_ENV: &str = "PRIVY_APP_SECRET";
pub const PRIVY_VERIFICATION_KEY_ENV: &str = "PRIVY_VERIFICATION_KEY";
pub const PRIVY_API_URL_ENV: &str = "PRIVY_API_URL";

pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_SERVICE_ROLE_KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";

pub const PINATA_JWT_ENV: &str = "PINATA_JWT";
pub const PINATA_GATEWAY_URL_ENV: &str = "PINATA_GATEWAY_URL";
pub const PINATA_GROUP_ID_ENV: &str = "PINATA_GROUP_ID";

pub const TACT_PROVER_BIN_ENV: &str = "TACT_PROVER_BIN";
pub const TACT_PROVER_TIMEOUT_SECS_ENV: &str = "TACT_PROVER_TIMEOUT_SECS";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Vector group every questionnaire document is uploaded into and queried from.
pub const DEFAULT_GROUP_ID: &str = "0195b878-390f-7ab6-85d4-710312d2f33d";

pub const DEFAULT_PROVER_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(format!("expected `json` or `pretty`, got `{other}`")),
        }
    }
}

/// Which proof capability backs `POST /matches/{wallet}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProverConfig {
    Binary { path: PathBuf, timeout: Duration },
    InProcess,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub privy: PrivyConfig,
    /// `None` runs against the in-memory store.
    pub supabase: Option<SupabaseConfig>,
    /// `None` runs against in-memory storage.
    pub pinata: Option<PinataConfig>,
    pub group_id: String,
    pub prover: ProverConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => parse(PORT_ENV, &raw)?,
            None => DEFAULT_PORT,
        };
        let log_format = match get(LOG_FORMAT_ENV) {
            Some(raw) => parse(LOG_FORMAT_ENV, &raw)?,
            None => LogFormat::default(),
        };

        let privy = PrivyConfig {
            app_id: require(PRIVY_APP_ID_ENV)?,
            app_secret: require(PRIVY_APP_SECRET_ENV)?,
            verification_key: get(PRIVY_VERIFICATION_KEY_ENV),
            api_url: parse_url(
                PRIVY_API_URL_ENV,
                &get(PRIVY_API_URL_ENV).unwrap_or_else(|| PRIVY_DEFAULT_API_URL.to_string()),
            )?,
        };

        let supabase = match get(SUPABASE_URL_ENV) {
            Some(raw) => Some(SupabaseConfig {
                url: parse_url(SUPABASE_URL_ENV, &raw)?,
                service_role_key: require(SUPABASE_SERVICE_ROLE_KEY_ENV)?,
            }),
            None => None,
        };

        let pinata = match get(PINATA_JWT_ENV) {
            Some(jwt) => Some(PinataConfig {
                jwt,
                gateway: require(PINATA_GATEWAY_URL_ENV)?,
                api_url: parse_url(PINATA_JWT_ENV, PINATA_DEFAULT_API_URL)?,
                uploads_url: parse_url(PINATA_JWT_ENV, DEFAULT_UPLOADS_URL)?,
            }),
            None => None,
        };

        let group_id = get(PINATA_GROUP_ID_ENV).unwrap_or_else(|| DEFAULT_GROUP_ID.to_string());

        let prover = match get(TACT_PROVER_BIN_ENV) {
            Some(path) => {
                let secs = match get(TACT_PROVER_TIMEOUT_SECS_ENV) {
                    Some(raw) => parse(TACT_PROVER_TIMEOUT_SECS_ENV, &raw)?,
                    None => DEFAULT_PROVER_TIMEOUT_SECS,
                };
                ProverConfig::Binary {
                    path: PathBuf::from(path),
                    timeout: Duration::from_secs(secs),
                }
            }
            None => ProverConfig::InProcess,
        };

        Ok(Self {
            host,
            port,
            log_format,
            privy,
            supabase,
            pinata,
            group_id,
            prover,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}
