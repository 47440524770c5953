//! StorageBackend CRD
//!
//! The persisted envelope for a backend record. Field names, the kind and
//! API version, and the naming rule in [`sanitize_name`] are part of the
//! stored schema; changing any of them requires a new record version.

use k8s_openapi::ByteString;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// =============================================================================
// Schema Constants
// =============================================================================

/// Kind of the persisted backend envelope
pub const BACKEND_KIND: &str = "StorageBackend";

/// API version of the persisted backend envelope
pub const BACKEND_API_VERSION: &str = "storagebridge.io/v1";

/// Longest legal resource name (RFC 1123 label)
pub const MAX_NAME_LENGTH: usize = 63;

// =============================================================================
// StorageBackend CRD
// =============================================================================

/// StorageBackend persists one configured storage backend so the orchestrator
/// can rebuild its view of provisioned backends after a restart.
#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "storagebridge.io",
    version = "v1",
    kind = "StorageBackend",
    plural = "storagebackends",
    shortname = "sbe",
    derive = "PartialEq",
    printcolumn = r#"{"name": "Backend", "type": "string", "jsonPath": ".spec.backendName"}"#,
    printcolumn = r#"{"name": "UUID", "type": "string", "jsonPath": ".spec.backendUUID"}"#,
    printcolumn = r#"{"name": "Online", "type": "boolean", "jsonPath": ".spec.online"}"#,
    printcolumn = r#"{"name": "Version", "type": "string", "jsonPath": ".spec.version"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#,
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct StorageBackendSpec {
    /// Human-assigned backend name, before sanitizing
    pub backend_name: String,

    /// Backend identity assigned by the orchestrator
    #[serde(rename = "backendUUID", default)]
    pub backend_uuid: String,

    /// Whether the backend was reachable when persisted
    #[serde(default)]
    pub online: bool,

    /// Record schema version
    pub version: String,

    /// Opaque driver configuration
    #[schemars(with = "String")]
    pub config: ByteString,
}

// =============================================================================
// Resource Naming
// =============================================================================

/// Derive a legal resource name from a backend name.
///
/// ASCII letters are lowercased, every character outside `[a-z0-9]` becomes
/// `-`, leading and trailing dashes are trimmed and the result is capped at
/// [`MAX_NAME_LENGTH`]. Applying it to its own output is a no-op.
pub fn sanitize_name(name: &str) -> Result<String> {
    let mapped: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();

    let mut sanitized = mapped.trim_matches('-').to_string();
    if sanitized.len() > MAX_NAME_LENGTH {
        // only ASCII remains, so byte truncation is char-safe
        sanitized.truncate(MAX_NAME_LENGTH);
        sanitized = sanitized.trim_end_matches('-').to_string();
    }

    if sanitized.is_empty() {
        return Err(Error::InvalidIdentity {
            name: name.to_string(),
        });
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::Resource;

    #[test]
    fn test_schema_constants_match_resource() {
        assert_eq!(StorageBackend::kind(&()), BACKEND_KIND);
        assert_eq!(StorageBackend::api_version(&()), BACKEND_API_VERSION);
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(
            sanitize_name("nfs_server_1-10.0.0.4").unwrap(),
            "nfs-server-1-10-0-0-4"
        );
        assert_eq!(sanitize_name("OntapNAS").unwrap(), "ontapnas");
        assert_eq!(sanitize_name("__gold__").unwrap(), "gold");
        assert_eq!(sanitize_name("café").unwrap(), "caf");
    }

    #[test]
    fn test_sanitize_name_bounded() {
        let long = "a".repeat(62) + "_b" + &"c".repeat(40);
        let sanitized = sanitize_name(&long).unwrap();
        assert!(sanitized.len() <= MAX_NAME_LENGTH);
        assert!(!sanitized.ends_with('-'));
        assert_eq!(sanitized, "a".repeat(62));
    }

    #[test]
    fn test_sanitize_name_idempotent() {
        let inputs = [
            "nfs_server_1-10.0.0.4",
            "UPPER.lower_Mixed",
            "--leading-and-trailing--",
            "a..b__c",
            "ünïcödé-backend",
            &"x_".repeat(80),
        ];

        for input in inputs {
            let once = sanitize_name(input).unwrap();
            let twice = sanitize_name(&once).unwrap();
            assert_eq!(once, twice, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_sanitize_name_generated_inputs() {
        let alphabet = ['a', 'Z', '7', '-', '_', '.', ' ', '/', 'é', '日'];
        let mut seed: u64 = 0x5eed;
        let mut inputs: Vec<String> = vec!["-".repeat(70), "_.-/ ".repeat(20)];
        for len in (0..=130).chain(60..=68) {
            let input: String = (0..len)
                .map(|_| {
                    seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                    alphabet[(seed >> 33) as usize % alphabet.len()]
                })
                .collect();
            inputs.push(input);
        }
        for len in 60..=66 {
            inputs.push("b".repeat(len));
            inputs.push("b".repeat(len - 2) + "_c" + "d");
        }

        for input in &inputs {
            match sanitize_name(input) {
                Ok(once) => {
                    assert_eq!(sanitize_name(&once).unwrap(), once, "not idempotent for {:?}", input);
                    assert!(once.len() <= MAX_NAME_LENGTH);
                    assert!(!once.starts_with('-') && !once.ends_with('-'));
                    assert!(once
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
                }
                Err(err) => {
                    assert!(!input.chars().any(|c| c.is_ascii_alphanumeric()), "{:?}", input);
                    assert!(matches!(err, Error::InvalidIdentity { .. }));
                }
            }
        }
    }

    #[test]
    fn test_sanitize_name_rejects_empty() {
        for input in ["", "___", "...", "日本"] {
            let err = sanitize_name(input).unwrap_err();
            assert!(matches!(err, Error::InvalidIdentity { ref name } if name == input));
        }
    }

    #[test]
    fn test_crd_serializes_type_meta() {
        let backend = StorageBackend::new(
            "nas-1",
            StorageBackendSpec {
                backend_name: "nas_1".into(),
                backend_uuid: "abc-123".into(),
                online: true,
                version: "1".into(),
                config: ByteString(b"{}".to_vec()),
            },
        );

        let value = serde_json::to_value(&backend).unwrap();
        assert_eq!(value["apiVersion"], BACKEND_API_VERSION);
        assert_eq!(value["kind"], BACKEND_KIND);
        assert_eq!(value["metadata"]["name"], "nas-1");
        assert_eq!(value["spec"]["backendUUID"], "abc-123");
        assert_eq!(value["spec"]["config"], "e30=");
    }
}
