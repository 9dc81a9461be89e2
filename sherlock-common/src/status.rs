//! Broker reachability status and the HTTP probe behind it

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Timeout applied to a status probe when the caller does not pick one
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of a status probe against a broker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClusterStatus {
    /// The broker answered with an HTTP response
    Ok,
    /// The broker could not be reached
    Error,
}

impl ClusterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Error => "ERROR",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue a single GET against `url` and return the response status code.
///
/// Any HTTP response counts as reachable, whatever its code. Only transport
/// failures (resolution, refusal, timeout, malformed URL) are errors. No retry.
pub(crate) async fn probe_url(url: &str, timeout: Duration) -> Result<u16> {
    let client = reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .no_proxy()
        .build()
        .map_err(|e| Error::Probe(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Probe(e.to_string()))?;

    Ok(response.status().as_u16())
}
