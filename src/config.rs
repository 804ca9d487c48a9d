// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-issuer solver configuration.
//!
//! cert-manager forwards the Issuer's `webhook.config` JSON unchanged with
//! every challenge. It is decoded on each call and never stored:
//!
//! ```json
//! {
//!   "cisCRN": "crn:v1:bluemix:public:internet-svcs:global:a/1234::",
//!   "apiKeySecretRef": { "name": "cis-credentials", "key": "api-key" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;

/// Reference to a single key inside a Kubernetes Secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKeySelector {
    /// Name of the Secret in the challenge's resource namespace
    #[serde(default)]
    pub name: String,
    /// Key within the Secret's data
    #[serde(default)]
    pub key: String,
}

/// Solver configuration decoded from a challenge request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Comma-separated list of CIS instance CRNs to search for zones
    #[serde(default, rename = "cisCRN")]
    pub cis_crn: String,
    /// Secret holding the IBM Cloud API key used for this issuer
    #[serde(default)]
    pub api_key_secret_ref: SecretKeySelector,
}

impl ProviderConfig {
    /// Returns each CRN from the comma-separated `cisCRN` field.
    ///
    /// Surrounding whitespace is trimmed and empty entries are dropped, so
    /// `"crn:a, crn:b,"` yields `["crn:a", "crn:b"]`.
    pub fn crns(&self) -> impl Iterator<Item = &str> {
        self.cis_crn
            .split(',')
            .map(str::trim)
            .filter(|crn| !crn.is_empty())
    }

    /// Whether an API key secret is referenced at all.
    ///
    /// Without one the solver falls back to the API key it was started with.
    #[must_use]
    pub fn has_secret_ref(&self) -> bool {
        !self.api_key_secret_ref.name.is_empty() || !self.api_key_secret_ref.key.is_empty()
    }

    /// Check that every field needed to talk to CIS is present.
    ///
    /// The secret reference may be omitted entirely, but if either of its
    /// fields is set both must be.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] for the first missing field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crns().next().is_none() {
            return Err(ConfigError::MissingCrn);
        }
        if self.has_secret_ref() {
            if self.api_key_secret_ref.name.is_empty() {
                return Err(ConfigError::MissingSecretName);
            }
            if self.api_key_secret_ref.key.is_empty() {
                return Err(ConfigError::MissingSecretKey);
            }
        }
        Ok(())
    }
}

/// Decode the raw `webhook.config` JSON into a [`ProviderConfig`].
///
/// A missing or empty blob yields the default (empty) configuration so that
/// unconfigured issuers decode cleanly; validation happens separately.
///
/// # Errors
///
/// Returns [`ConfigError::Decode`] if the bytes are not a valid config object.
pub fn load_config(raw: Option<&[u8]>) -> Result<ProviderConfig, ConfigError> {
    let Some(raw) = raw.filter(|bytes| !bytes.is_empty()) else {
        debug!("No solver config provided, using defaults");
        return Ok(ProviderConfig::default());
    };

    let config: ProviderConfig = serde_json::from_slice(raw)?;
    debug!(
        cis_crn = %config.cis_crn,
        secret_name = %config.api_key_secret_ref.name,
        secret_key = %config.api_key_secret_ref.key,
        "Decoded solver config"
    );
    Ok(config)
}
