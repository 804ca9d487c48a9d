// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS-01 challenge solver for IBM Cloud Internet Services.
//!
//! # Present
//!
//! 1. Decode and validate the issuer config
//! 2. Resolve the API key (issuer secret, or the startup key if none is referenced)
//! 3. For every CRN, list zones; any failure aborts the call
//! 4. In every zone owning the FQDN, create the TXT record unless an identical one exists
//!
//! # CleanUp
//!
//! Steps 1-3 as above, then delete every record in the owning zones whose
//! type, name and content all match the challenge. Records that share the
//! name but carry another key belong to concurrent challenges and are kept.
//!
//! Both operations are safe to repeat.

use async_trait::async_trait;
use kube::Client;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::challenge::{ChallengeAction, ChallengeRequest};
use crate::config::{load_config, ProviderConfig};
use crate::constants::{SOLVER_NAME, TXT_RECORD_TYPE};
use crate::errors::SolverError;
use crate::metrics;
use crate::provider::{DnsProvider, NewDnsRecord, ProviderConnector};
use crate::secrets::{resolve_credential, KubeSecretStore, SecretStore};
use crate::zones::{find_owning_zones, is_challenge_record};

/// A DNS-01 solver that cert-manager can call through the webhook.
#[async_trait]
pub trait Solver: Send + Sync {
    /// Name referenced by `webhook.solverName` on the Issuer.
    fn name(&self) -> &str;

    /// Establish the Kubernetes client. Called once before serving.
    ///
    /// `shutdown` only gates startup; it never interrupts a running challenge.
    async fn initialize(
        &mut self,
        kube_config: kube::Config,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(), SolverError>;

    /// Publish the challenge TXT record.
    async fn present(&self, request: &ChallengeRequest) -> Result<(), SolverError>;

    /// Remove the challenge TXT record.
    async fn cleanup(&self, request: &ChallengeRequest) -> Result<(), SolverError>;
}

/// Solver backed by the IBM Cloud Internet Services DNS API.
pub struct CisSolver {
    connector: Arc<dyn ProviderConnector>,
    default_api_key: String,
    secrets: Option<Arc<dyn SecretStore>>,
}

impl CisSolver {
    /// Create a solver that opens provider sessions through `connector`.
    ///
    /// `default_api_key` is used for issuers that do not reference a secret.
    #[must_use]
    pub fn new(connector: Arc<dyn ProviderConnector>, default_api_key: impl Into<String>) -> Self {
        Self {
            connector,
            default_api_key: default_api_key.into(),
            secrets: None,
        }
    }

    /// Use `store` for secret lookups instead of the Kubernetes API.
    #[must_use]
    pub fn with_secret_store(mut self, store: Arc<dyn SecretStore>) -> Self {
        self.secrets = Some(store);
        self
    }

    /// Load the config and open an authenticated provider session.
    async fn open_session(
        &self,
        request: &ChallengeRequest,
    ) -> Result<(ProviderConfig, Box<dyn DnsProvider>), SolverError> {
        let store = self.secrets.as_ref().ok_or(SolverError::NotInitialized)?;

        let config = load_config(request.raw_config())?;
        config.validate()?;

        let api_key = if config.has_secret_ref() {
            resolve_credential(
                store.as_ref(),
                &config.api_key_secret_ref,
                &request.resource_namespace,
            )
            .await?
        } else {
            debug!("No apiKeySecretRef configured, using default API key");
            self.default_api_key.clone()
        };

        let provider = self.connector.connect(&api_key).await?;
        Ok((config, provider))
    }

    async fn present_records(&self, request: &ChallengeRequest) -> Result<(), SolverError> {
        let (config, provider) = self.open_session(request).await?;
        let fqdn = request.resolved_fqdn.as_str();
        let mut matched_zones = 0;

        for (index, crn) in config.crns().enumerate() {
            debug!(index = index, crn = %crn, "Listing zones for CRN");

            let zones = provider.list_zones(crn).await.map_err(|e| {
                error!(crn = %crn, error = %e, "Failed to list zones");
                e
            })?;

            for zone in find_owning_zones(fqdn, &zones) {
                matched_zones += 1;
                debug!(zone = %zone.name, zone_id = %zone.id, "Zone owns challenge FQDN");

                let records = provider.list_records(crn, &zone.id).await?;
                if records
                    .iter()
                    .any(|record| is_challenge_record(record, fqdn, &request.key))
                {
                    info!(
                        zone = %zone.name,
                        fqdn = %fqdn,
                        "Challenge record already present, skipping create"
                    );
                    continue;
                }

                let record = NewDnsRecord {
                    record_type: TXT_RECORD_TYPE.to_string(),
                    name: fqdn.to_string(),
                    content: request.key.clone(),
                };
                provider.create_record(crn, &zone.id, &record).await?;
                metrics::record_txt_created();

                info!(zone = %zone.name, fqdn = %fqdn, "DNS01 challenge record created");
            }
        }

        if matched_zones == 0 {
            warn!(fqdn = %fqdn, "No CIS zone owns the challenge FQDN, nothing to present");
        }
        Ok(())
    }

    async fn cleanup_records(&self, request: &ChallengeRequest) -> Result<(), SolverError> {
        let (config, provider) = self.open_session(request).await?;
        let fqdn = request.resolved_fqdn.as_str();

        for (index, crn) in config.crns().enumerate() {
            debug!(index = index, crn = %crn, "Listing zones for CRN");

            let zones = provider.list_zones(crn).await.map_err(|e| {
                error!(crn = %crn, error = %e, "Failed to list zones");
                e
            })?;

            for zone in find_owning_zones(fqdn, &zones) {
                debug!(zone = %zone.name, zone_id = %zone.id, "Zone owns challenge FQDN");

                let records = provider.list_records(crn, &zone.id).await?;
                for record in records {
                    if !is_challenge_record(&record, fqdn, &request.key) {
                        debug!(
                            record_id = %record.id,
                            record_type = %record.record_type,
                            name = %record.name,
                            "Skipping record that is not this challenge"
                        );
                        continue;
                    }

                    info!(
                        zone = %zone.name,
                        record_id = %record.id,
                        fqdn = %fqdn,
                        "Deleting DNS01 challenge record"
                    );
                    provider.delete_record(crn, &zone.id, &record.id).await?;
                    metrics::record_txt_deleted();
                }
            }
        }
        Ok(())
    }
}

/// Record metrics for a finished challenge operation.
fn observe(action: ChallengeAction, started: Instant, result: &Result<(), SolverError>) {
    match result {
        Ok(()) => metrics::record_challenge_success(action.as_str(), started.elapsed()),
        Err(e) => {
            error!(action = action.as_str(), error = %e, "Challenge operation failed");
            metrics::record_challenge_error(action.as_str(), e.status_reason(), started.elapsed());
        }
    }
}

#[async_trait]
impl Solver for CisSolver {
    fn name(&self) -> &str {
        SOLVER_NAME
    }

    async fn initialize(
        &mut self,
        kube_config: kube::Config,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(), SolverError> {
        info!("Starting up webhook solver");

        if *shutdown.borrow() {
            return Err(SolverError::Initialization(
                "shutdown requested before initialization".to_string(),
            ));
        }

        let client = Client::try_from(kube_config)
            .map_err(|e| SolverError::Initialization(format!("unable to get k8s client: {e}")))?;
        debug!("Kubernetes client in place");

        self.secrets = Some(Arc::new(KubeSecretStore::new(client)));
        Ok(())
    }

    async fn present(&self, request: &ChallengeRequest) -> Result<(), SolverError> {
        info!(
            namespace = %request.resource_namespace,
            zone = %request.resolved_zone,
            fqdn = %request.resolved_fqdn,
            "Present"
        );
        let started = Instant::now();
        let result = self.present_records(request).await;
        observe(ChallengeAction::Present, started, &result);
        result
    }

    async fn cleanup(&self, request: &ChallengeRequest) -> Result<(), SolverError> {
        info!(
            namespace = %request.resource_namespace,
            zone = %request.resolved_zone,
            fqdn = %request.resolved_fqdn,
            "CleanUp"
        );
        let started = Instant::now();
        let result = self.cleanup_records(request).await;
        observe(ChallengeAction::CleanUp, started, &result);
        result
    }
}
