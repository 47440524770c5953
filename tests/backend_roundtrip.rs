//! Backend persistence across a simulated restart

use std::sync::Arc;

use assert_matches::assert_matches;
use serde::Serialize;
use storage_bridge::{
    construct_record, decode_envelope, encode_driver_config, encode_envelope, to_envelope, Backend,
    BackendStore, Error, InMemoryBackendStore, StorageDriver, DEFAULT_SCHEMA_VERSION,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NasConfig {
    management_lif: String,
    svm: String,
    export_policy: String,
}

#[derive(Debug)]
struct NasDriver {
    config: NasConfig,
}

impl StorageDriver for NasDriver {
    fn driver_name(&self) -> &str {
        "ontap-nas"
    }

    fn encode_config(&self) -> storage_bridge::Result<Vec<u8>> {
        encode_driver_config(&self.config)
    }
}

fn nas_backend(name: &str, uuid: &str) -> Backend {
    let driver = Arc::new(NasDriver {
        config: NasConfig {
            management_lif: "10.0.0.1".to_string(),
            svm: "svm0".to_string(),
            export_policy: "default".to_string(),
        },
    });
    let mut backend = Backend::new(name, driver).with_uuid(uuid);
    backend.set_online(true);
    backend
}

#[tokio::test]
async fn test_backend_survives_restart() {
    let backend = nas_backend("NAS Primary", "abc-123");
    let record = backend.construct_persistent().unwrap();
    assert_eq!(record.version, DEFAULT_SCHEMA_VERSION);

    let store = InMemoryBackendStore::new();
    store.add_backend(&record).await.unwrap();

    // a fresh process only knows the human-assigned name
    let reloaded = store.get_backend("NAS Primary").await.unwrap();
    assert_eq!(reloaded, record);
    assert_eq!(reloaded.backend_uuid, "abc-123");
    assert!(reloaded.online);

    let config: serde_json::Value = reloaded.config_as().unwrap();
    assert_eq!(config["managementLif"], "10.0.0.1");
    assert_eq!(config["svm"], "svm0");
}

#[tokio::test]
async fn test_identity_stable_across_updates() {
    let store = InMemoryBackendStore::new();
    let mut backend = nas_backend("nas-secondary", "abc-123");
    store
        .add_backend(&construct_record(&backend).unwrap())
        .await
        .unwrap();

    backend.set_online(false);
    store
        .update_backend(&construct_record(&backend).unwrap())
        .await
        .unwrap();

    let reloaded = store.get_backend("nas-secondary").await.unwrap();
    assert_eq!(reloaded.backend_uuid, "abc-123");
    assert!(!reloaded.online);

    let all = store.list_backends().await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_duplicate_and_missing_backends() {
    let store = InMemoryBackendStore::new();
    let record = construct_record(&nas_backend("nas", "abc-123")).unwrap();
    store.add_backend(&record).await.unwrap();

    assert_matches!(
        store.add_backend(&record).await,
        Err(Error::ResourceExists { .. })
    );

    store.delete_backend("nas").await.unwrap();
    assert_matches!(
        store.get_backend("nas").await,
        Err(Error::ResourceNotFound { .. })
    );
    assert!(store.is_empty());
}

#[test]
fn test_envelope_bytes_carry_type_information() {
    let record = construct_record(&nas_backend("nas", "abc-123")).unwrap();
    let bytes = encode_envelope(&to_envelope(&record).unwrap()).unwrap();

    let document: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(document["kind"], "StorageBackend");
    assert_eq!(document["apiVersion"], "storagebridge.io/v1");
    assert_eq!(document["spec"]["backendUUID"], "abc-123");

    let decoded = decode_envelope(&bytes).unwrap();
    assert_eq!(decoded.spec.backend_name, "nas");
}
