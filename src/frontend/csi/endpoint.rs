//! CSI endpoint strings
//!
//! Endpoints take the form `<scheme>://<address>`. Only the scheme and the
//! presence of an address are checked here; the transport binder decides
//! whether the address is usable.

use crate::error::{Error, Result};

const SUPPORTED_SCHEMES: [&str; 2] = ["unix", "tcp"];

/// Split an endpoint into `(scheme, address)`.
///
/// The scheme is matched case-insensitively but returned exactly as written,
/// so `TCP://127.0.0.1:9000` yields `("TCP", "127.0.0.1:9000")`.
pub fn parse_endpoint(endpoint: &str) -> Result<(&str, &str)> {
    let invalid = || Error::InvalidEndpoint {
        endpoint: endpoint.to_string(),
    };

    let (scheme, address) = endpoint.split_once("://").ok_or_else(invalid)?;
    let supported = SUPPORTED_SCHEMES
        .iter()
        .any(|s| scheme.eq_ignore_ascii_case(s));

    if !supported || address.is_empty() {
        return Err(invalid());
    }

    Ok((scheme, address))
}
