// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the CIS webhook solver.
//!
//! This module provides specialized error types for:
//! - Decoding and validating per-issuer solver configuration
//! - Looking up API key credentials in Kubernetes Secrets
//! - IBM Cloud IAM and Internet Services API calls
//!
//! Every error maps to a status reason that is reported back to cert-manager
//! in the `ChallengeResponse` status.

use thiserror::Error;

/// Errors raised while decoding or validating the solver configuration.
///
/// The configuration is the JSON blob from the Issuer's
/// `spec.acme.solvers[].dns01.webhook.config` field.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config blob is not valid JSON for [`crate::config::ProviderConfig`]
    #[error("error decoding solver config: {0}")]
    Decode(#[from] serde_json::Error),

    /// `cisCRN` is missing or empty
    #[error("No IBM Cloud Internet Service CRN provided")]
    MissingCrn,

    /// `apiKeySecretRef.name` is missing or empty
    #[error("No API key secret name to access IBM Cloud Internet Service provided")]
    MissingSecretName,

    /// `apiKeySecretRef.key` is missing or empty
    #[error("No API key secret key to access IBM Cloud Internet Service provided")]
    MissingSecretKey,
}

/// Errors raised while resolving a credential from a Kubernetes Secret.
#[derive(Error, Debug)]
pub enum SecretError {
    /// The referenced Secret does not exist
    #[error("unable to get secret '{name}' in namespace '{namespace}'")]
    SecretNotFound {
        /// Secret name
        name: String,
        /// Namespace the Secret was looked up in
        namespace: String,
    },

    /// The Secret exists but has no entry under the requested key
    #[error("key '{key}' not found in secret '{namespace}/{name}'")]
    KeyNotFound {
        /// Secret name
        name: String,
        /// Namespace of the Secret
        namespace: String,
        /// Data key that was requested
        key: String,
    },

    /// The Secret value is not valid UTF-8
    #[error("key '{key}' in secret '{namespace}/{name}' is not valid UTF-8")]
    InvalidData {
        /// Secret name
        name: String,
        /// Namespace of the Secret
        namespace: String,
        /// Data key that was requested
        key: String,
    },

    /// The secret store could not be queried
    #[error("secret store request for '{namespace}/{name}' failed: {reason}")]
    Api {
        /// Secret name
        name: String,
        /// Namespace of the Secret
        namespace: String,
        /// Underlying failure
        reason: String,
    },
}

/// Errors raised by the DNS provider (IBM Cloud IAM and CIS APIs).
#[derive(Error, Debug)]
pub enum ProviderError {
    /// IAM refused to exchange the API key for an access token
    #[error("IBM Cloud IAM authentication failed: {0}")]
    Authentication(String),

    /// The API answered with a non-success HTTP status
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// Request URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// The API answered with `success: false` in its response envelope
    #[error("CIS API error {code}: {message}")]
    Api {
        /// CIS error code
        code: i64,
        /// CIS error message
        message: String,
    },

    /// The request could not be sent or the connection failed
    #[error("request to {url} failed: {reason}")]
    Transport {
        /// Request URL
        url: String,
        /// Underlying failure
        reason: String,
    },

    /// The response body could not be decoded
    #[error("unable to decode response from {url}: {reason}")]
    Decode {
        /// Request URL
        url: String,
        /// Underlying failure
        reason: String,
    },

    /// A provider URL could not be built from the configured endpoint
    #[error("invalid provider endpoint '{0}'")]
    InvalidEndpoint(String),
}

/// Composite error returned by [`crate::solver::Solver`] operations.
#[derive(Error, Debug)]
pub enum SolverError {
    /// Solver configuration could not be decoded or is incomplete
    #[error("unable to load config: {0}")]
    Config(#[from] ConfigError),

    /// The API key credential could not be resolved
    #[error(transparent)]
    Secret(#[from] SecretError),

    /// A DNS provider call failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// `present` or `cleanup` was called before `initialize`
    #[error("solver has not been initialized")]
    NotInitialized,

    /// The solver could not be initialized
    #[error("unable to initialize solver: {0}")]
    Initialization(String),
}

impl SolverError {
    /// Returns the status reason code reported to cert-manager for this error.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::Config(ConfigError::Decode(_)) => "ConfigDecodeFailed",
            Self::Config(_) => "InvalidConfig",

            Self::Secret(SecretError::SecretNotFound { .. }) => "SecretNotFound",
            Self::Secret(SecretError::KeyNotFound { .. }) => "SecretKeyNotFound",
            Self::Secret(SecretError::InvalidData { .. }) => "InvalidSecretData",
            Self::Secret(SecretError::Api { .. }) => "SecretLookupFailed",

            Self::Provider(ProviderError::Authentication(_)) => "ProviderAuthFailed",
            Self::Provider(_) => "ProviderApiError",

            Self::NotInitialized => "NotInitialized",
            Self::Initialization(_) => "InitializationFailed",
        }
    }
}
