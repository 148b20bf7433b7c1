//! Error types for each stage of an update run.
//!
//! Configuration, discovery and store-load errors abort the run. Registrar,
//! protocol and store-save errors are reported but never stop the run.

use std::path::PathBuf;
use thiserror::Error;

/// Settings problems, all detected before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("registrar is not set")]
    MissingRegistrar,

    #[error("user is not set")]
    MissingUser,

    #[error("password is not set")]
    MissingPassword,

    #[error("host is not set")]
    MissingHost,

    #[error("updateIpv4 and updateIpv6 cannot both be false")]
    NoAddressFamily,

    #[error("{0} must be greater than zero")]
    InvalidTimeout(&'static str),

    #[error("unsupported registrar: {0} (supported: strato, dyndns/dyndns2, noip/no-ip)")]
    UnsupportedRegistrar(String),

    #[error("unifiSiteManagerApiKey is not set")]
    MissingDiscoveryKey,

    #[error("unifiSiteManagerHostId is not set")]
    MissingDiscoveryHost,

    #[error("'{0}' is an invalid {1} address")]
    InvalidAddress(String, &'static str),
}

/// Public address discovery failures.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("discovery request failed: {0}")]
    Transport(#[from] minreq::Error),

    #[error("discovery service returned HTTP {0}")]
    HttpStatus(i32),

    #[error("failed to decode discovery response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no WAN info found in response")]
    NoWanData,

    #[error("failed to parse IPv4 from {0:?}")]
    InvalidIpv4(String),

    #[error("failed to parse IPv6 from {0:?}")]
    InvalidIpv6(String),
}

/// Failures of a single dyndns2 update exchange.
///
/// A registrar answering with an adverse status is not an error here; see
/// [`crate::clients::dyndns2::UpdateStatus`].
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("hostname is required")]
    MissingHostname,

    #[error("bad endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("update request failed: {0}")]
    Transport(minreq::Error),

    #[error("update response is not readable text: {0}")]
    InvalidBody(minreq::Error),
}

#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error("host is required")]
    MissingHost,

    #[error("user and password required")]
    MissingCredentials,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read state file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("state file {} is corrupted: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write state file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize state: {0}")]
    Serialize(serde_json::Error),
}

/// Errors that abort a run before the stored record is touched.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("discover public IPs error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("cannot load previous addresses: {0}")]
    Store(#[from] StoreError),
}
