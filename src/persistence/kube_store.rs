//! Kubernetes Backend Store
//!
//! Persists backend envelopes as `StorageBackend` custom resources in a
//! single namespace.

use async_trait::async_trait;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::Client;
use tracing::{debug, info};

use crate::crd::{sanitize_name, StorageBackend};
use crate::error::Result;
use crate::persistence::store::{already_exists, not_found, BackendStore};
use crate::persistence::translator::{from_envelope, to_envelope};
use crate::storage::PersistentBackendRecord;

/// [`BackendStore`] backed by `StorageBackend` custom resources
#[derive(Clone)]
pub struct KubeBackendStore {
    api: Api<StorageBackend>,
    namespace: String,
}

impl KubeBackendStore {
    /// Create a store writing to `namespace`
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
            namespace: namespace.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

fn is_status(err: &kube::Error, code: u16) -> bool {
    matches!(err, kube::Error::Api(response) if response.code == code)
}

#[async_trait]
impl BackendStore for KubeBackendStore {
    async fn add_backend(&self, record: &PersistentBackendRecord) -> Result<()> {
        let envelope = to_envelope(record)?;
        let name = envelope.metadata.name.clone().unwrap_or_default();

        match self.api.create(&PostParams::default(), &envelope).await {
            Ok(_) => {
                info!("Created StorageBackend {}/{}", self.namespace, name);
                Ok(())
            }
            Err(e) if is_status(&e, 409) => Err(already_exists(&name)),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_backend(&self, backend_name: &str) -> Result<PersistentBackendRecord> {
        let name = sanitize_name(backend_name)?;
        let envelope = self.api.get_opt(&name).await?.ok_or_else(|| not_found(&name))?;
        from_envelope(&envelope)
    }

    async fn update_backend(&self, record: &PersistentBackendRecord) -> Result<()> {
        let mut envelope = to_envelope(record)?;
        let name = envelope.metadata.name.clone().unwrap_or_default();

        let existing = self.api.get_opt(&name).await?.ok_or_else(|| not_found(&name))?;
        envelope.metadata.resource_version = existing.metadata.resource_version;

        self.api
            .replace(&name, &PostParams::default(), &envelope)
            .await?;
        debug!("Replaced StorageBackend {}/{}", self.namespace, name);
        Ok(())
    }

    async fn delete_backend(&self, backend_name: &str) -> Result<()> {
        let name = sanitize_name(backend_name)?;

        match self.api.delete(&name, &DeleteParams::default()).await {
            Ok(_) => {
                info!("Deleted StorageBackend {}/{}", self.namespace, name);
                Ok(())
            }
            Err(e) if is_status(&e, 404) => Err(not_found(&name)),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_backends(&self) -> Result<Vec<PersistentBackendRecord>> {
        let list = self.api.list(&ListParams::default()).await?;
        list.items.iter().map(from_envelope).collect()
    }
}
