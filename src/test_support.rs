// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory fakes for the provider and secret store capabilities.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::challenge::{ChallengeAction, ChallengeRequest};
use crate::errors::{ProviderError, SecretError};
use crate::provider::{
    DnsProvider, DnsRecord, NewDnsRecord, ProviderConnector, ProviderResult, Zone,
};
use crate::secrets::SecretStore;

/// A create or delete call observed by [`FakeProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Create {
        account: String,
        zone_id: String,
        record: NewDnsRecord,
    },
    Delete {
        account: String,
        zone_id: String,
        record_id: String,
    },
}

/// Provider operation that [`FakeProvider::fail_operation`] can make fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeOperation {
    ListRecords,
    CreateRecord,
    DeleteRecord,
}

#[derive(Default)]
struct FakeState {
    zones: HashMap<String, Vec<Zone>>,
    records: HashMap<String, Vec<DnsRecord>>,
    failing_accounts: HashSet<String>,
    failing_operations: HashSet<FakeOperation>,
    calls: Vec<ProviderCall>,
    api_keys: Vec<String>,
    next_id: u32,
}

/// Shared in-memory DNS provider account.
///
/// Clones share state, so a test can hand one clone to the solver and inspect another.
#[derive(Clone, Default)]
pub struct FakeProvider {
    state: Arc<Mutex<FakeState>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_zone(&self, account: &str, id: &str, name: &str) {
        let mut state = self.state.lock().unwrap();
        state.zones.entry(account.to_string()).or_default().push(Zone {
            id: id.to_string(),
            name: name.to_string(),
        });
    }

    pub fn add_record(&self, zone_id: &str, record_type: &str, name: &str, content: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("seed-{}", state.next_id);
        state
            .records
            .entry(zone_id.to_string())
            .or_default()
            .push(DnsRecord {
                id: id.clone(),
                record_type: record_type.to_string(),
                name: name.to_string(),
                content: content.to_string(),
                ttl: None,
            });
        id
    }

    pub fn fail_account(&self, account: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing_accounts.insert(account.to_string());
    }

    /// Make every call of `operation` fail with a 500.
    pub fn fail_operation(&self, operation: FakeOperation) {
        let mut state = self.state.lock().unwrap();
        state.failing_operations.insert(operation);
    }

    pub fn records(&self, zone_id: &str) -> Vec<DnsRecord> {
        let state = self.state.lock().unwrap();
        state.records.get(zone_id).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn creates(&self) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, ProviderCall::Create { .. }))
            .collect()
    }

    pub fn deletes(&self) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, ProviderCall::Delete { .. }))
            .collect()
    }

    pub fn api_keys(&self) -> Vec<String> {
        self.state.lock().unwrap().api_keys.clone()
    }
}

impl FakeState {
    fn check(&self, operation: FakeOperation, zone_id: &str) -> ProviderResult<()> {
        if self.failing_operations.contains(&operation) {
            return Err(ProviderError::Http {
                url: format!("fake://zones/{zone_id}/dns_records"),
                status: 500,
                message: format!("{operation:?} failed"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DnsProvider for FakeProvider {
    async fn list_zones(&self, account: &str) -> ProviderResult<Vec<Zone>> {
        let state = self.state.lock().unwrap();
        if state.failing_accounts.contains(account) {
            return Err(ProviderError::Http {
                url: format!("fake://{account}/zones"),
                status: 403,
                message: "forbidden".to_string(),
            });
        }
        Ok(state.zones.get(account).cloned().unwrap_or_default())
    }

    async fn list_records(&self, _account: &str, zone_id: &str) -> ProviderResult<Vec<DnsRecord>> {
        let state = self.state.lock().unwrap();
        state.check(FakeOperation::ListRecords, zone_id)?;
        Ok(state.records.get(zone_id).cloned().unwrap_or_default())
    }

    async fn create_record(
        &self,
        account: &str,
        zone_id: &str,
        record: &NewDnsRecord,
    ) -> ProviderResult<DnsRecord> {
        let mut state = self.state.lock().unwrap();
        state.check(FakeOperation::CreateRecord, zone_id)?;
        state.next_id += 1;
        let created = DnsRecord {
            id: format!("rec-{}", state.next_id),
            record_type: record.record_type.clone(),
            name: record.name.trim_end_matches('.').to_string(),
            content: record.content.clone(),
            ttl: Some(1),
        };
        state
            .records
            .entry(zone_id.to_string())
            .or_default()
            .push(created.clone());
        state.calls.push(ProviderCall::Create {
            account: account.to_string(),
            zone_id: zone_id.to_string(),
            record: record.clone(),
        });
        Ok(created)
    }

    async fn delete_record(
        &self,
        account: &str,
        zone_id: &str,
        record_id: &str,
    ) -> ProviderResult<()> {
        let mut state = self.state.lock().unwrap();
        state.check(FakeOperation::DeleteRecord, zone_id)?;
        if let Some(records) = state.records.get_mut(zone_id) {
            records.retain(|record| record.id != record_id);
        }
        state.calls.push(ProviderCall::Delete {
            account: account.to_string(),
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl ProviderConnector for FakeProvider {
    async fn connect(&self, api_key: &str) -> ProviderResult<Box<dyn DnsProvider>> {
        self.state.lock().unwrap().api_keys.push(api_key.to_string());
        Ok(Box::new(self.clone()))
    }
}

/// In-memory secret store keyed by `(namespace, name)`.
#[derive(Default)]
pub struct FakeSecretStore {
    secrets: BTreeMap<(String, String), BTreeMap<String, Vec<u8>>>,
}

impl FakeSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, namespace: &str, name: &str, key: &str, value: &[u8]) -> Self {
        self.secrets
            .entry((namespace.to_string(), name.to_string()))
            .or_default()
            .insert(key.to_string(), value.to_vec());
        self
    }
}

#[async_trait]
impl SecretStore for FakeSecretStore {
    async fn get_secret_data(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, Vec<u8>>>, SecretError> {
        Ok(self
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }
}

/// Build a challenge request for `fqdn` with the given raw config JSON.
pub fn challenge(action: ChallengeAction, fqdn: &str, key: &str, config: Option<&str>) -> ChallengeRequest {
    ChallengeRequest {
        uid: "uid-1".to_string(),
        action,
        challenge_type: "dns-01".to_string(),
        dns_name: fqdn.trim_start_matches("_acme-challenge.").trim_end_matches('.').to_string(),
        key: key.to_string(),
        resource_namespace: "cert-manager".to_string(),
        resolved_fqdn: fqdn.to_string(),
        resolved_zone: String::new(),
        allow_ambient_credentials: false,
        config: config.map(|raw| serde_json::value::RawValue::from_string(raw.to_string()).unwrap()),
    }
}
