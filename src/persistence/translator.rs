//! Backend Record Translator
//!
//! Converts between the three representations of a backend:
//!
//! ```text
//! Backend ──construct_record──▶ PersistentBackendRecord ──to_envelope──▶ StorageBackend
//!                                        ▲                                    │
//!                                        └────────────from_envelope───────────┘
//! ```
//!
//! Every function here is pure and reentrant. Identity is carried, never
//! assigned: a non-empty `backend_uuid` passes through all conversions as is,
//! and so does the record version.

use k8s_openapi::ByteString;
use kube::core::TypeMeta;

use crate::crd::{sanitize_name, StorageBackend, StorageBackendSpec, BACKEND_API_VERSION, BACKEND_KIND};
use crate::error::{Error, Result};
use crate::storage::{BackendSource, PersistentBackendRecord, DEFAULT_SCHEMA_VERSION};

// =============================================================================
// Backend -> Record
// =============================================================================

/// Build the durable record for a live backend.
///
/// Fails only when the driver cannot encode its configuration.
pub fn construct_record<B: BackendSource + ?Sized>(backend: &B) -> Result<PersistentBackendRecord> {
    let config = backend.encode_config()?;

    Ok(PersistentBackendRecord {
        backend_name: backend.name().to_string(),
        backend_uuid: backend.backend_uuid().to_string(),
        online: backend.is_online(),
        version: DEFAULT_SCHEMA_VERSION.to_string(),
        config,
    })
}

// =============================================================================
// Record <-> Envelope
// =============================================================================

/// Wrap a record in its stored envelope
pub fn to_envelope(record: &PersistentBackendRecord) -> Result<StorageBackend> {
    let name = sanitize_name(&record.backend_name)?;

    Ok(StorageBackend::new(
        &name,
        StorageBackendSpec {
            backend_name: record.backend_name.clone(),
            backend_uuid: record.backend_uuid.clone(),
            online: record.online,
            version: record.version.clone(),
            config: ByteString(record.config.clone()),
        },
    ))
}

/// Recover the record from a stored envelope.
///
/// The envelope must be named after its backend; anything else is rejected
/// whole. The config payload is copied back byte for byte.
pub fn from_envelope(envelope: &StorageBackend) -> Result<PersistentBackendRecord> {
    let spec = &envelope.spec;

    let expected = sanitize_name(&spec.backend_name)
        .map_err(|_| Error::Decode(format!("illegal backend name {:?}", spec.backend_name)))?;
    match envelope.metadata.name.as_deref() {
        Some(name) if name == expected => {}
        Some(name) => {
            return Err(Error::Decode(format!(
                "envelope {} does not belong to backend {}",
                name, spec.backend_name
            )))
        }
        None => {
            return Err(Error::Decode(format!(
                "envelope for backend {} has no name",
                spec.backend_name
            )))
        }
    }

    Ok(PersistentBackendRecord {
        backend_name: spec.backend_name.clone(),
        backend_uuid: spec.backend_uuid.clone(),
        online: spec.online,
        version: spec.version.clone(),
        config: spec.config.0.clone(),
    })
}

// =============================================================================
// Envelope <-> Bytes
// =============================================================================

/// Serialize an envelope for a raw store write
pub fn encode_envelope(envelope: &StorageBackend) -> Result<Vec<u8>> {
    serde_json::to_vec(envelope).map_err(|e| Error::Serialization(e.to_string()))
}

/// Parse an envelope read from a raw store.
///
/// Rejects truncated or mis-shaped payloads and envelopes of another kind or
/// API version.
pub fn decode_envelope(bytes: &[u8]) -> Result<StorageBackend> {
    let types: TypeMeta = serde_json::from_slice(bytes)
        .map_err(|e| Error::Decode(format!("invalid envelope header: {}", e)))?;
    if types.kind != BACKEND_KIND || types.api_version != BACKEND_API_VERSION {
        return Err(Error::Decode(format!(
            "unexpected envelope type {}/{}",
            types.api_version, types.kind
        )));
    }

    serde_json::from_slice(bytes).map_err(|e| Error::Decode(format!("invalid envelope: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{encode_driver_config, Backend, StorageDriver};
    use assert_matches::assert_matches;
    use serde::{Serialize, Serializer};
    use std::sync::Arc;

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct OntapConfig {
        storage_driver_name: String,
        management_lif: String,
        data_lif: String,
        svm: String,
        username: String,
        password: String,
    }

    #[derive(Debug)]
    struct OntapDriver {
        config: OntapConfig,
    }

    impl StorageDriver for OntapDriver {
        fn driver_name(&self) -> &str {
            &self.config.storage_driver_name
        }

        fn encode_config(&self) -> Result<Vec<u8>> {
            encode_driver_config(&self.config)
        }
    }

    #[derive(Debug)]
    struct BrokenConfig;

    impl Serialize for BrokenConfig {
        fn serialize<S: Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("credentials unavailable"))
        }
    }

    #[derive(Debug)]
    struct BrokenDriver;

    impl StorageDriver for BrokenDriver {
        fn driver_name(&self) -> &str {
            "broken"
        }

        fn encode_config(&self) -> Result<Vec<u8>> {
            encode_driver_config(&BrokenConfig)
        }
    }

    fn nfs_backend() -> Backend {
        let driver = OntapDriver {
            config: OntapConfig {
                storage_driver_name: "ontap-nas".into(),
                management_lif: "10.0.0.4".into(),
                data_lif: "10.0.0.100".into(),
                svm: "svm1".into(),
                username: "admin".into(),
                password: "secret".into(),
            },
        };
        Backend::new("nfs_server_1-10.0.0.4", Arc::new(driver))
    }

    #[test]
    fn test_construct_record() {
        let backend = nfs_backend();
        let record = construct_record(&backend).unwrap();

        assert_eq!(record.backend_name, "nfs_server_1-10.0.0.4");
        assert_eq!(record.backend_uuid, "");
        assert!(!record.online);
        assert_eq!(record.version, DEFAULT_SCHEMA_VERSION);
        assert_eq!(record.config, backend.driver.encode_config().unwrap());
    }

    #[test]
    fn test_construct_record_serialization_error() {
        let backend = Backend::new("broken", Arc::new(BrokenDriver));
        assert_matches!(construct_record(&backend), Err(Error::Serialization(msg)) if msg.contains("credentials"));
    }

    #[test]
    fn test_to_envelope() {
        let record = nfs_backend().construct_persistent().unwrap();
        let envelope = to_envelope(&record).unwrap();

        assert_eq!(envelope.metadata.name.as_deref(), Some("nfs-server-1-10-0-0-4"));
        assert_eq!(envelope.spec.backend_name, record.backend_name);
        assert_eq!(envelope.spec.version, "1");
        assert_eq!(envelope.spec.config.0, record.config);
    }

    #[test]
    fn test_to_envelope_invalid_identity() {
        let record = PersistentBackendRecord {
            backend_name: "___".into(),
            backend_uuid: String::new(),
            online: true,
            version: "1".into(),
            config: b"{}".to_vec(),
        };
        assert_matches!(to_envelope(&record), Err(Error::InvalidIdentity { .. }));
    }

    fn record_with_config(name: &str, config: &[u8]) -> PersistentBackendRecord {
        PersistentBackendRecord {
            backend_name: name.into(),
            backend_uuid: "abc-123".into(),
            online: true,
            version: "2".into(),
            config: config.to_vec(),
        }
    }

    #[test]
    fn test_round_trip() {
        let records = vec![
            nfs_backend().construct_persistent().unwrap(),
            record_with_config("Gold.Tier_A", br#"{ "spaced" :  [1, 2, 3] }"#),
            record_with_config("empty", b""),
            record_with_config("yaml", b"managementLIF: 10.0.0.1\nsvm: svm0\n"),
            record_with_config("binary", &[0xff, 0xfe, 0x00, 0x80, 0xc3, 0x28]),
            record_with_config("truncated-json", br#"{"svm": "sv"#),
            record_with_config(&"x".repeat(200), b"{}"),
        ];

        for record in records {
            let envelope = to_envelope(&record).unwrap();
            assert_eq!(from_envelope(&envelope).unwrap(), record);

            let bytes = encode_envelope(&envelope).unwrap();
            let decoded = decode_envelope(&bytes).unwrap();
            assert_eq!(from_envelope(&decoded).unwrap(), record);
        }
    }

    #[test]
    fn test_uuid_survives_round_trip() {
        let backend = nfs_backend().with_uuid("abc-123");
        let record = construct_record(&backend).unwrap();
        let restored = from_envelope(&to_envelope(&record).unwrap()).unwrap();
        assert_eq!(restored.backend_uuid, "abc-123");
    }

    #[test]
    fn test_from_envelope_rejects_foreign_name() {
        let record = nfs_backend().construct_persistent().unwrap();
        let mut envelope = to_envelope(&record).unwrap();
        envelope.metadata.name = Some("someone-else".into());
        assert_matches!(from_envelope(&envelope), Err(Error::Decode(_)));

        envelope.metadata.name = None;
        assert_matches!(from_envelope(&envelope), Err(Error::Decode(_)));
    }

    #[test]
    fn test_from_envelope_keeps_opaque_config() {
        let record = nfs_backend().construct_persistent().unwrap();
        let mut envelope = to_envelope(&record).unwrap();
        let half = envelope.spec.config.0.len() / 2;
        envelope.spec.config.0.truncate(half);

        let restored = from_envelope(&envelope).unwrap();
        assert_eq!(restored.config, record.config[..half].to_vec());
        assert!(restored.config_as::<serde_json::Value>().is_err());
    }

    #[test]
    fn test_decode_envelope_rejects_bad_bytes() {
        let record = nfs_backend().construct_persistent().unwrap();
        let bytes = encode_envelope(&to_envelope(&record).unwrap()).unwrap();

        assert_matches!(decode_envelope(&bytes[..bytes.len() - 5]), Err(Error::Decode(_)));
        assert_matches!(decode_envelope(b"[1, 2, 3]"), Err(Error::Decode(_)));

        let foreign = String::from_utf8(bytes)
            .unwrap()
            .replace(BACKEND_API_VERSION, "storagebridge.io/v2");
        assert_matches!(decode_envelope(foreign.as_bytes()), Err(Error::Decode(msg)) if msg.contains("v2"));
    }
}
