// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Process-level settings read once at startup.
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `GROUP_NAME` | yes | |
//! | `IC_API_KEY` | yes | |
//! | `CIS_API_ENDPOINT` | no | `https://api.cis.cloud.ibm.com` |
//! | `IAM_TOKEN_ENDPOINT` | no | `https://iam.cloud.ibm.com/identity/token` |
//! | `WEBHOOK_LISTEN_ADDR` | no | `0.0.0.0:8443` |
//! | `HTTP_TIMEOUT_SECS` | no | `30` |

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

use crate::constants::{
    DEFAULT_CIS_API_ENDPOINT, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_IAM_TOKEN_ENDPOINT,
    DEFAULT_LISTEN_ADDR, ENV_API_KEY, ENV_CIS_API_ENDPOINT, ENV_GROUP_NAME,
    ENV_HTTP_TIMEOUT_SECS, ENV_IAM_TOKEN_ENDPOINT, ENV_LISTEN_ADDR,
};

/// Errors raised while reading startup settings.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    /// A required variable is unset or empty
    #[error("{0} must be specified")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed
    #[error("invalid value '{value}' for {name}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
}

/// Startup settings for the webhook process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSettings {
    /// API group the solver is served under
    pub group_name: String,
    /// API key used when an issuer does not reference a secret
    pub api_key: String,
    /// CIS API base URL
    pub cis_api_endpoint: String,
    /// IAM token URL
    pub iam_token_endpoint: String,
    /// Address the HTTP server binds to
    pub listen_addr: SocketAddr,
    /// Timeout for outbound CIS and IAM requests
    pub http_timeout: Duration,
}

impl WebhookSettings {
    /// Read settings from the process environment.
    ///
    /// # Errors
    ///
    /// See [`WebhookSettings::from_lookup`].
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Missing`] if `GROUP_NAME` or `IC_API_KEY` is
    /// absent, or [`SettingsError::Invalid`] if an optional value fails to parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let group_name = get(ENV_GROUP_NAME).ok_or(SettingsError::Missing(ENV_GROUP_NAME))?;
        let api_key = get(ENV_API_KEY).ok_or(SettingsError::Missing(ENV_API_KEY))?;

        let cis_api_endpoint =
            get(ENV_CIS_API_ENDPOINT).unwrap_or_else(|| DEFAULT_CIS_API_ENDPOINT.to_string());
        let iam_token_endpoint =
            get(ENV_IAM_TOKEN_ENDPOINT).unwrap_or_else(|| DEFAULT_IAM_TOKEN_ENDPOINT.to_string());

        let raw_addr = get(ENV_LISTEN_ADDR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = raw_addr.parse().map_err(|_| SettingsError::Invalid {
            name: ENV_LISTEN_ADDR,
            value: raw_addr.clone(),
        })?;

        let http_timeout = match get(ENV_HTTP_TIMEOUT_SECS) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| SettingsError::Invalid {
                    name: ENV_HTTP_TIMEOUT_SECS,
                    value: value.clone(),
                })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            group_name,
            api_key,
            cis_api_endpoint,
            iam_token_endpoint,
            listen_addr,
            http_timeout: Duration::from_secs(http_timeout),
        })
    }
}
