// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! cert-manager webhook payload types.
//!
//! cert-manager calls a DNS-01 webhook solver by POSTing a `ChallengeReview`
//! (`acme.cert-manager.io/v1alpha1`) whose `request` describes the challenge.
//! The webhook fills in `response` and echoes the review back.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::constants::{CHALLENGE_REVIEW_API_VERSION, CHALLENGE_REVIEW_KIND, STATUS_FAILURE};
use crate::errors::SolverError;

/// What cert-manager wants done with the challenge record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeAction {
    /// Publish the TXT record
    Present,
    /// Remove the TXT record
    CleanUp,
}

impl ChallengeAction {
    /// Wire name of the action, used as a metrics and log label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::CleanUp => "CleanUp",
        }
    }
}

/// A single DNS-01 challenge as sent by cert-manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    /// Unique identifier of this review, echoed in the response
    #[serde(default)]
    pub uid: String,
    /// Requested action
    pub action: ChallengeAction,
    /// Challenge type, always `dns-01` for this solver
    #[serde(default, rename = "type")]
    pub challenge_type: String,
    /// Domain the certificate is being issued for
    #[serde(default)]
    pub dns_name: String,
    /// Expected TXT record value
    pub key: String,
    /// Namespace of the Issuer (or cert-manager's namespace for a ClusterIssuer)
    #[serde(default)]
    pub resource_namespace: String,
    /// Trailing-dot FQDN of the challenge record, e.g. `_acme-challenge.example.com.`
    #[serde(rename = "resolvedFQDN")]
    pub resolved_fqdn: String,
    /// Zone cert-manager resolved via SOA lookup, e.g. `example.com.`
    #[serde(default)]
    pub resolved_zone: String,
    /// Whether ambient credentials may be used
    #[serde(default)]
    pub allow_ambient_credentials: bool,
    /// Raw solver configuration from the Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Box<RawValue>>,
}

impl ChallengeRequest {
    /// Raw bytes of the solver configuration, if any was given.
    #[must_use]
    pub fn raw_config(&self) -> Option<&[u8]> {
        self.config.as_deref().map(|raw| raw.get().as_bytes())
    }
}

/// Status details attached to a failed response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseStatus {
    /// `Failure`
    #[serde(default)]
    pub status: String,
    /// Human-readable error
    #[serde(default)]
    pub message: String,
    /// Machine-readable reason
    #[serde(default)]
    pub reason: String,
}

/// Outcome of a challenge request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeResponse {
    /// UID of the request this answers
    #[serde(default)]
    pub uid: String,
    /// Whether the action succeeded
    #[serde(default)]
    pub success: bool,
    /// Failure details, absent on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResponseStatus>,
}

impl ChallengeResponse {
    /// Successful response for request `uid`.
    #[must_use]
    pub fn success(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            success: true,
            status: None,
        }
    }

    /// Failed response carrying `reason` and a human-readable `message`.
    #[must_use]
    pub fn failure(uid: &str, reason: &str, message: String) -> Self {
        Self {
            uid: uid.to_string(),
            success: false,
            status: Some(ResponseStatus {
                status: STATUS_FAILURE.to_string(),
                message,
                reason: reason.to_string(),
            }),
        }
    }

    /// Failed response built from a solver error and its status reason.
    #[must_use]
    pub fn from_error(uid: &str, err: &SolverError) -> Self {
        Self::failure(uid, err.status_reason(), err.to_string())
    }
}

/// The envelope cert-manager POSTs to the solver endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeReview {
    /// `acme.cert-manager.io/v1alpha1`
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// `ChallengeReview`
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Challenge sent by cert-manager
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequest>,
    /// Outcome filled in by the webhook
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

fn default_api_version() -> String {
    CHALLENGE_REVIEW_API_VERSION.to_string()
}

fn default_kind() -> String {
    CHALLENGE_REVIEW_KIND.to_string()
}
