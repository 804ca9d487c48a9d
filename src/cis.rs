// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! IBM Cloud Internet Services (CIS) DNS API client.
//!
//! [`CisConnector`] exchanges an IBM Cloud API key for an IAM access token and
//! hands out a [`CisClient`] bound to that token. The client implements
//! [`DnsProvider`] over the CIS REST API:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list zones | `GET /v1/{crn}/zones` |
//! | list records | `GET /v1/{crn}/zones/{zone_id}/dns_records` |
//! | create record | `POST /v1/{crn}/zones/{zone_id}/dns_records` |
//! | delete record | `DELETE /v1/{crn}/zones/{zone_id}/dns_records/{record_id}` |
//!
//! The CRN is sent as a single escaped path segment.

use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

use crate::constants::{
    CIS_AUTH_HEADER, CIS_RECORDS_PAGE_SIZE, CIS_ZONES_PAGE_SIZE, IAM_APIKEY_GRANT_TYPE,
    TXT_RECORD_TYPE,
};
use crate::errors::ProviderError;
use crate::provider::{
    DnsProvider, DnsRecord, NewDnsRecord, ProviderConnector, ProviderResult, Zone,
};

/// Standard CIS response envelope.
#[derive(Debug, Deserialize)]
struct CisEnvelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<CisMessage>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct CisMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Pagination info attached to list responses.
#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
}

/// Builds authenticated [`CisClient`] sessions.
#[derive(Debug, Clone)]
pub struct CisConnector {
    http: HttpClient,
    api_endpoint: Url,
    iam_endpoint: Url,
}

impl CisConnector {
    /// Create a connector for the given CIS and IAM endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidEndpoint`] if an endpoint is not a
    /// valid base URL, or [`ProviderError::Transport`] if the HTTP client
    /// cannot be built.
    pub fn new(api_endpoint: &str, iam_endpoint: &str, timeout: Duration) -> ProviderResult<Self> {
        let api_endpoint = parse_base_url(api_endpoint)?;
        let iam_endpoint = Url::parse(iam_endpoint)
            .map_err(|_| ProviderError::InvalidEndpoint(iam_endpoint.to_string()))?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport {
                url: api_endpoint.to_string(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            api_endpoint,
            iam_endpoint,
        })
    }

    /// Exchange an API key for an IAM access token.
    async fn fetch_token(&self, api_key: &str) -> ProviderResult<String> {
        debug!(iam_endpoint = %self.iam_endpoint, "Requesting IAM access token");

        let response = self
            .http
            .post(self.iam_endpoint.clone())
            .header("Accept", "application/json")
            .form(&[("grant_type", IAM_APIKEY_GRANT_TYPE), ("apikey", api_key)])
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                url: self.iam_endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "IAM token request failed");
            return Err(ProviderError::Authentication(format!("HTTP {status}: {body}")));
        }

        let token: IamTokenResponse =
            response.json().await.map_err(|e| ProviderError::Decode {
                url: self.iam_endpoint.to_string(),
                reason: e.to_string(),
            })?;

        Ok(token.access_token)
    }
}

#[async_trait]
impl ProviderConnector for CisConnector {
    async fn connect(&self, api_key: &str) -> ProviderResult<Box<dyn DnsProvider>> {
        let token = self.fetch_token(api_key).await?;
        debug!("IBM Cloud IAM session established");
        Ok(Box::new(CisClient {
            http: self.http.clone(),
            api_endpoint: self.api_endpoint.clone(),
            token,
        }))
    }
}

/// CIS DNS API session bound to one IAM access token.
#[derive(Debug, Clone)]
pub struct CisClient {
    http: HttpClient,
    api_endpoint: Url,
    token: String,
}

impl CisClient {
    /// Build `{api_endpoint}/v1/{segments...}`, escaping each segment.
    fn url(&self, segments: &[&str]) -> ProviderResult<Url> {
        let mut url = self.api_endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| ProviderError::InvalidEndpoint(self.api_endpoint.to_string()))?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    fn zones_url(&self, account: &str) -> ProviderResult<Url> {
        self.url(&[account, "zones"])
    }

    fn records_url(&self, account: &str, zone_id: &str) -> ProviderResult<Url> {
        self.url(&[account, "zones", zone_id, "dns_records"])
    }

    /// Send a request and unwrap the CIS envelope.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> ProviderResult<CisEnvelope<T>> {
        let response = request
            .header(CIS_AUTH_HEADER, format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                url = %url,
                status = %status,
                error = %message,
                "CIS API request failed"
            );
            return Err(ProviderError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let envelope: CisEnvelope<T> =
            response.json().await.map_err(|e| ProviderError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !envelope.success {
            let (code, message) = envelope
                .errors
                .first()
                .map_or((0, "request was not successful".to_string()), |e| {
                    (e.code, e.message.clone())
                });
            error!(url = %url, code = code, error = %message, "CIS API returned an error");
            return Err(ProviderError::Api { code, message });
        }

        Ok(envelope)
    }

    /// GET every page of a list endpoint.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        base: Url,
        per_page: u32,
        filters: &[(&str, &str)],
    ) -> ProviderResult<Vec<T>> {
        let mut items = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut url = base.clone();
            {
                let mut query = url.query_pairs_mut();
                for (key, value) in filters {
                    query.append_pair(key, value);
                }
                query
                    .append_pair("page", &page.to_string())
                    .append_pair("per_page", &per_page.to_string());
            }

            let envelope: CisEnvelope<Vec<T>> =
                self.execute(self.http.get(url.clone()), &url).await?;
            items.extend(envelope.result.unwrap_or_default());

            let total_pages = envelope.result_info.map_or(1, |info| info.total_pages);
            if page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

#[async_trait]
impl DnsProvider for CisClient {
    async fn list_zones(&self, account: &str) -> ProviderResult<Vec<Zone>> {
        let zones: Vec<Zone> = self
            .get_all_pages(self.zones_url(account)?, CIS_ZONES_PAGE_SIZE, &[])
            .await?;
        debug!(crn = %account, count = zones.len(), "Listed CIS zones");
        Ok(zones)
    }

    async fn list_records(&self, account: &str, zone_id: &str) -> ProviderResult<Vec<DnsRecord>> {
        let records: Vec<DnsRecord> = self
            .get_all_pages(
                self.records_url(account, zone_id)?,
                CIS_RECORDS_PAGE_SIZE,
                &[("type", TXT_RECORD_TYPE)],
            )
            .await?;
        debug!(
            crn = %account,
            zone_id = %zone_id,
            count = records.len(),
            "Listed CIS DNS records"
        );
        Ok(records)
    }

    async fn create_record(
        &self,
        account: &str,
        zone_id: &str,
        record: &NewDnsRecord,
    ) -> ProviderResult<DnsRecord> {
        let url = self.records_url(account, zone_id)?;
        let envelope: CisEnvelope<DnsRecord> = self
            .execute(self.http.post(url.clone()).json(record), &url)
            .await?;

        let created = envelope.result.ok_or_else(|| ProviderError::Decode {
            url: url.to_string(),
            reason: "missing result in create response".to_string(),
        })?;

        info!(
            crn = %account,
            zone_id = %zone_id,
            record_id = %created.id,
            name = %created.name,
            "Created CIS DNS record"
        );
        Ok(created)
    }

    async fn delete_record(
        &self,
        account: &str,
        zone_id: &str,
        record_id: &str,
    ) -> ProviderResult<()> {
        let url = self.url(&[account, "zones", zone_id, "dns_records", record_id])?;
        let _: CisEnvelope<serde_json::Value> =
            self.execute(self.http.delete(url.clone()), &url).await?;

        info!(
            crn = %account,
            zone_id = %zone_id,
            record_id = %record_id,
            "Deleted CIS DNS record"
        );
        Ok(())
    }
}

/// Parse an endpoint URL so that path segments can be appended to it.
fn parse_base_url(endpoint: &str) -> ProviderResult<Url> {
    let url =
        Url::parse(endpoint).map_err(|_| ProviderError::InvalidEndpoint(endpoint.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ProviderError::InvalidEndpoint(endpoint.to_string()));
    }
    Ok(url)
}
