//! Transport-level health probe shared by backend adapters.
//!
//! A probe is a single bounded TCP handshake against the backend's
//! configured address, independent of the load dispatcher. Failures come
//! back as typed [`ProbeError`]s so callers can echo them without
//! unwinding.

use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

/// Upper bound on the connection handshake.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Ways a health probe can fail.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The configured address did not parse as a URL with a host.
    #[error("invalid probe address {0:?}")]
    InvalidAddress(String),

    /// The URL names no port and the scheme has no conventional one.
    #[error("unsupported url scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    /// The handshake did not complete within [`PROBE_TIMEOUT`].
    #[error("connect to {addr} timed out after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    /// The transport refused or failed the connection.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The backend answered the transport but rejected the protocol-level
    /// handshake (e.g. an AUTH failure on a key-value store).
    #[error("probe rejected: {0}")]
    Handshake(String),
}

/// Reduce a configured URL to the `host:port` its transport listens on.
///
/// A URL without an explicit port falls back to the scheme's conventional
/// one (80 for http, 443 for https).
pub fn normalize_host_port(raw: &str) -> Result<String, ProbeError> {
    let url = Url::parse(raw).map_err(|_| ProbeError::InvalidAddress(raw.to_owned()))?;
    let host = url
        .host_str()
        .ok_or_else(|| ProbeError::InvalidAddress(raw.to_owned()))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| ProbeError::UnsupportedScheme(url.scheme().to_owned()))?;
    Ok(format!("{host}:{port}"))
}

/// Attempt one TCP handshake against `host_port`, bounded by
/// [`PROBE_TIMEOUT`]. The connection is dropped immediately on success;
/// reachability is all we are after.
pub async fn tcp_probe(host_port: &str) -> Result<(), ProbeError> {
    match timeout(PROBE_TIMEOUT, TcpStream::connect(host_port)).await {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(source)) => Err(ProbeError::Connect {
            addr: host_port.to_owned(),
            source,
        }),
        Err(_elapsed) => Err(ProbeError::ConnectTimeout {
            addr: host_port.to_owned(),
            timeout: PROBE_TIMEOUT,
        }),
    }
}
