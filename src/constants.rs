// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the CIS webhook solver.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Solver Identity
// ============================================================================

/// Name under which the solver is referenced from an Issuer's `webhook.solverName`.
///
/// Existing issuers reference this solver as `softlayer`, so the name is kept.
pub const SOLVER_NAME: &str = "softlayer";

/// API version served for every registered solver resource
pub const SOLVER_API_VERSION: &str = "v1alpha1";

// ============================================================================
// cert-manager Webhook Protocol
// ============================================================================

/// API group/version of the `ChallengeReview` payload
pub const CHALLENGE_REVIEW_API_VERSION: &str = "acme.cert-manager.io/v1alpha1";

/// Kind of the `ChallengeReview` payload
pub const CHALLENGE_REVIEW_KIND: &str = "ChallengeReview";

/// Status value reported in a failed `ChallengeResponse`
pub const STATUS_FAILURE: &str = "Failure";

// ============================================================================
// DNS Constants
// ============================================================================

/// Record type used for DNS-01 challenge records
pub const TXT_RECORD_TYPE: &str = "TXT";

// ============================================================================
// IBM Cloud Endpoints
// ============================================================================

/// Default IBM Cloud Internet Services API endpoint
pub const DEFAULT_CIS_API_ENDPOINT: &str = "https://api.cis.cloud.ibm.com";

/// Default IBM Cloud IAM token endpoint
pub const DEFAULT_IAM_TOKEN_ENDPOINT: &str = "https://iam.cloud.ibm.com/identity/token";

/// IAM grant type for exchanging an API key for an access token
pub const IAM_APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Header carrying the IAM bearer token on CIS requests
pub const CIS_AUTH_HEADER: &str = "X-Auth-User-Token";

/// Page size requested when listing zones
pub const CIS_ZONES_PAGE_SIZE: u32 = 50;

/// Page size requested when listing DNS records
pub const CIS_RECORDS_PAGE_SIZE: u32 = 100;

// ============================================================================
// Startup Settings
// ============================================================================

/// Environment variable holding the API group the webhook is registered under
pub const ENV_GROUP_NAME: &str = "GROUP_NAME";

/// Environment variable holding the default IBM Cloud API key
pub const ENV_API_KEY: &str = "IC_API_KEY";

/// Environment variable overriding the CIS API endpoint
pub const ENV_CIS_API_ENDPOINT: &str = "CIS_API_ENDPOINT";

/// Environment variable overriding the IAM token endpoint
pub const ENV_IAM_TOKEN_ENDPOINT: &str = "IAM_TOKEN_ENDPOINT";

/// Environment variable overriding the HTTP listen address
pub const ENV_LISTEN_ADDR: &str = "WEBHOOK_LISTEN_ADDR";

/// Environment variable overriding the outbound HTTP timeout
pub const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8443";

/// Default timeout for outbound CIS and IAM requests
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of Tokio worker threads
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Maximum accepted `ChallengeReview` body size (1 MiB)
pub const MAX_REVIEW_BODY_BYTES: usize = 1024 * 1024;
