// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # cis-webhook - cert-manager DNS-01 solver for IBM Cloud Internet Services
//!
//! cert-manager hands DNS-01 challenges to this webhook. For each challenge
//! the solver finds the CIS zones owning the challenge FQDN and creates
//! (`Present`) or removes (`CleanUp`) the `_acme-challenge` TXT record.
//!
//! ## Modules
//!
//! - [`challenge`] - cert-manager `ChallengeReview` payload types
//! - [`config`] - Per-issuer solver configuration
//! - [`secrets`] - API key lookup from Kubernetes Secrets
//! - [`zones`] - Zone ownership and challenge record matching
//! - [`provider`] - DNS provider capability traits
//! - [`cis`] - IBM Cloud IAM and CIS REST client
//! - [`solver`] - Present/CleanUp reconciliation
//! - [`webhook`] - HTTP routes served to cert-manager
//! - [`settings`] - Startup settings from the environment
//! - [`shutdown`] - SIGTERM/SIGINT handling for graceful shutdown
//!
//! ## Example
//!
//! ```rust
//! use cis_webhook::config::load_config;
//!
//! let raw = br#"{"cisCRN":"crn:1","apiKeySecretRef":{"name":"cis","key":"api-key"}}"#;
//! let config = load_config(Some(raw.as_slice())).unwrap();
//! assert_eq!(config.crns().collect::<Vec<_>>(), vec!["crn:1"]);
//! ```

pub mod challenge;
pub mod cis;
pub mod config;
pub mod constants;
pub mod errors;
pub mod metrics;
pub mod provider;
pub mod secrets;
pub mod settings;
pub mod shutdown;
pub mod solver;
pub mod webhook;
pub mod zones;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod cis_tests;
