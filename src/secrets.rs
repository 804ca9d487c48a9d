// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Credential lookup from Kubernetes Secrets.
//!
//! The IBM Cloud API key for an issuer lives in a Secret in the challenge's
//! resource namespace. Each challenge performs exactly one read; values are
//! never cached.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use std::collections::BTreeMap;
use tracing::{debug, error};

use crate::config::SecretKeySelector;
use crate::errors::SecretError;

/// Read access to namespaced key-value secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the data map of secret `name` in `namespace`.
    ///
    /// Returns `Ok(None)` when the secret does not exist.
    async fn get_secret_data(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, Vec<u8>>>, SecretError>;
}

/// [`SecretStore`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get_secret_data(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<BTreeMap<String, Vec<u8>>>, SecretError> {
        let secret_api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);

        let secret = secret_api.get_opt(name).await.map_err(|e| SecretError::Api {
            name: name.to_string(),
            namespace: namespace.to_string(),
            reason: e.to_string(),
        })?;

        Ok(secret.map(|s| {
            s.data
                .unwrap_or_default()
                .into_iter()
                .map(|(key, value)| (key, value.0))
                .collect()
        }))
    }
}

/// Resolve the value referenced by `selector` in `namespace`.
///
/// # Errors
///
/// - [`SecretError::SecretNotFound`] if the secret does not exist
/// - [`SecretError::KeyNotFound`] if the secret has no such key
/// - [`SecretError::InvalidData`] if the value is not UTF-8
/// - [`SecretError::Api`] if the store itself fails
pub async fn resolve_credential(
    store: &dyn SecretStore,
    selector: &SecretKeySelector,
    namespace: &str,
) -> Result<String, SecretError> {
    debug!(
        secret_name = %selector.name,
        secret_key = %selector.key,
        namespace = %namespace,
        "Loading API key from secret"
    );

    let Some(data) = store.get_secret_data(namespace, &selector.name).await? else {
        error!(
            secret_name = %selector.name,
            namespace = %namespace,
            "Secret not found"
        );
        return Err(SecretError::SecretNotFound {
            name: selector.name.clone(),
            namespace: namespace.to_string(),
        });
    };

    let Some(bytes) = data.get(&selector.key) else {
        error!(
            secret_name = %selector.name,
            secret_key = %selector.key,
            namespace = %namespace,
            "Key not found in secret"
        );
        return Err(SecretError::KeyNotFound {
            name: selector.name.clone(),
            namespace: namespace.to_string(),
            key: selector.key.clone(),
        });
    };

    String::from_utf8(bytes.clone())
        .map(|value| value.trim().to_string())
        .map_err(|_| SecretError::InvalidData {
            name: selector.name.clone(),
            namespace: namespace.to_string(),
            key: selector.key.clone(),
        })
}
