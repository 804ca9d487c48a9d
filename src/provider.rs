// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS provider capability interfaces.
//!
//! The reconciliation logic only needs four calls against the provider
//! account: list zones, list records, create a record and delete a record.
//! [`DnsProvider`] captures exactly those so the solver can run against the
//! real CIS client or an in-memory fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

/// Result type for DNS provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// A DNS zone owned by a provider account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Provider-assigned zone identifier
    pub id: String,
    /// Zone apex without a trailing dot (e.g. `example.com`)
    pub name: String,
}

/// A DNS record as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned record identifier
    pub id: String,
    /// Record type (`TXT`, `A`, ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Fully-qualified record name without a trailing dot
    pub name: String,
    /// Record content
    pub content: String,
    /// TTL in seconds, `1` meaning automatic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

/// Body of a record creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDnsRecord {
    /// Record type
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record name, as given by cert-manager (trailing dot allowed)
    pub name: String,
    /// Record content
    pub content: String,
}

/// Operations the solver needs from a DNS provider account.
///
/// Every method is scoped by `account`, the CIS instance CRN.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List every zone in the account.
    async fn list_zones(&self, account: &str) -> ProviderResult<Vec<Zone>>;

    /// List DNS records in a zone.
    async fn list_records(&self, account: &str, zone_id: &str) -> ProviderResult<Vec<DnsRecord>>;

    /// Create a DNS record in a zone, returning the created record.
    async fn create_record(
        &self,
        account: &str,
        zone_id: &str,
        record: &NewDnsRecord,
    ) -> ProviderResult<DnsRecord>;

    /// Delete a DNS record from a zone.
    async fn delete_record(&self, account: &str, zone_id: &str, record_id: &str)
        -> ProviderResult<()>;
}

/// Opens an authenticated [`DnsProvider`] session for an API key.
///
/// One session is opened per challenge call; sessions are not reused.
#[async_trait]
pub trait ProviderConnector: Send + Sync {
    /// Authenticate with `api_key` and return a provider session.
    async fn connect(&self, api_key: &str) -> ProviderResult<Box<dyn DnsProvider>>;
}
