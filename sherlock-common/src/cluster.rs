//! Druid cluster descriptor
//!
//! A [`ClusterDescriptor`] records where a Druid broker lives and how to
//! authenticate against it. Descriptors are filled in either all at once
//! through [`ClusterDescriptor::new`] (e.g. when loaded from a store) or field
//! by field through the setters (e.g. from a form), and must pass
//! [`ClusterDescriptor::validate`] before they are saved or queried.

use crate::allowlist::BrokerAllowList;
use crate::status::{self, ClusterStatus, DEFAULT_PROBE_TIMEOUT};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Connection descriptor for a Druid broker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDescriptor {
    #[serde(rename = "clusterId", default, skip_serializing_if = "Option::is_none")]
    id: Option<i32>,
    #[serde(rename = "clusterName", default)]
    name: String,
    #[serde(rename = "clusterDescription", default)]
    description: Option<String>,
    #[serde(default)]
    broker_host: String,
    #[serde(default)]
    broker_port: Option<i32>,
    #[serde(default)]
    broker_endpoint: String,
    #[serde(default)]
    hours_of_lag: i32,
    #[serde(rename = "isSSLAuth", default)]
    use_ssl_auth: bool,
    #[serde(default)]
    principal_name: String,
}

impl ClusterDescriptor {
    /// Build a fully populated descriptor. Values are stored as given; nothing
    /// is checked or normalized until [`validate`](Self::validate) runs.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Option<i32>,
        name: impl Into<String>,
        description: impl Into<String>,
        broker_host: impl Into<String>,
        broker_port: i32,
        broker_endpoint: impl Into<String>,
        hours_of_lag: i32,
        use_ssl_auth: bool,
        principal_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: Some(description.into()),
            broker_host: broker_host.into(),
            broker_port: Some(broker_port),
            broker_endpoint: broker_endpoint.into(),
            hours_of_lag,
            use_ssl_auth,
            principal_name: principal_name.into(),
        }
    }

    /// Check the descriptor and normalize it in place.
    ///
    /// Checks run in a fixed order and stop at the first failure, so the
    /// message always names the earliest offending field. On success the
    /// broker endpoint loses one leading and one trailing `/`, and a missing
    /// description becomes the empty string.
    pub fn validate(&mut self) -> Result<()> {
        if self.name.is_empty() {
            return Err(invalid("name", "Cluster name cannot be empty"));
        }
        if self.broker_host.is_empty() {
            return Err(invalid("broker_host", "Broker host cannot be empty"));
        }
        if self.broker_host.contains(['/', ':']) {
            return Err(invalid(
                "broker_host",
                "Broker host should not contain any '/' or ':' characters",
            ));
        }
        match self.broker_port {
            None => return Err(invalid("broker_port", "Broker port cannot be empty")),
            Some(port) if port < 0 => {
                return Err(invalid(
                    "broker_port",
                    "Broker port must be a non-negative number",
                ))
            }
            Some(_) => {}
        }

        let endpoint = trim_endpoint(&self.broker_endpoint);
        if endpoint.is_empty() {
            return Err(invalid("broker_endpoint", "Broker endpoint cannot be empty"));
        }
        self.broker_endpoint = endpoint.to_string();

        if self.description.is_none() {
            self.description = Some(String::new());
        }

        Ok(())
    }

    /// `http://{host}:{port}/`. Always plain HTTP, whatever the SSL flag says.
    pub fn base_url(&self) -> String {
        let port = self
            .broker_port
            .map(|p| p.to_string())
            .unwrap_or_default();
        format!("http://{}:{}/", self.broker_host, port)
    }

    /// Broker query URL: the base URL followed by the endpoint and a `/`.
    /// Expects an endpoint already normalized by `validate`.
    pub fn broker_url(&self) -> String {
        format!("{}{}/", self.base_url(), self.broker_endpoint)
    }

    /// Probe the broker with the default timeout
    pub async fn status(&self) -> ClusterStatus {
        self.status_with_timeout(DEFAULT_PROBE_TIMEOUT).await
    }

    /// Probe the broker once. Every failure is reported as
    /// [`ClusterStatus::Error`]; nothing is returned as an error.
    pub async fn status_with_timeout(&self, timeout: Duration) -> ClusterStatus {
        match self.probe(timeout).await {
            Ok(_) => ClusterStatus::Ok,
            Err(_) => ClusterStatus::Error,
        }
    }

    /// Send one GET to [`base_url`](Self::base_url) and return the HTTP status
    /// code, or the transport failure for callers that need the detail.
    pub async fn probe(&self, timeout: Duration) -> Result<u16> {
        let url = self.base_url();
        match status::probe_url(&url, timeout).await {
            Ok(code) => {
                debug!(cluster = %self.name, url = %url, status_code = code, "Broker reachable");
                Ok(code)
            }
            Err(e) => {
                warn!(cluster = %self.name, url = %url, error = %e, "Broker unreachable");
                Err(e)
            }
        }
    }

    /// Whether this descriptor's broker is in `allowed`. False when no port is set.
    pub fn is_allowed_broker(&self, allowed: &BrokerAllowList) -> bool {
        match self.broker_port {
            Some(port) => self.is_allowed_host(&self.broker_host, port, allowed),
            None => false,
        }
    }

    pub(crate) fn is_allowed_host(&self, host: &str, port: i32, allowed: &BrokerAllowList) -> bool {
        allowed.contains_key(&BrokerAllowList::key(host, port))
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub fn set_id(&mut self, id: Option<i32>) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// `None` until set, or until `validate` defaults it
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn broker_host(&self) -> &str {
        &self.broker_host
    }

    pub fn set_broker_host(&mut self, host: impl Into<String>) {
        self.broker_host = host.into();
    }

    pub fn broker_port(&self) -> Option<i32> {
        self.broker_port
    }

    pub fn set_broker_port(&mut self, port: i32) {
        self.broker_port = Some(port);
    }

    pub fn broker_endpoint(&self) -> &str {
        &self.broker_endpoint
    }

    pub fn set_broker_endpoint(&mut self, endpoint: impl Into<String>) {
        self.broker_endpoint = endpoint.into();
    }

    pub fn hours_of_lag(&self) -> i32 {
        self.hours_of_lag
    }

    pub fn set_hours_of_lag(&mut self, hours: i32) {
        self.hours_of_lag = hours;
    }

    pub fn use_ssl_auth(&self) -> bool {
        self.use_ssl_auth
    }

    pub fn set_use_ssl_auth(&mut self, enabled: bool) {
        self.use_ssl_auth = enabled;
    }

    pub fn principal_name(&self) -> &str {
        &self.principal_name
    }

    pub fn set_principal_name(&mut self, principal: impl Into<String>) {
        self.principal_name = principal.into();
    }
}

fn invalid(field: &'static str, message: &str) -> Error {
    debug!(field, reason = message, "Cluster descriptor rejected");
    Error::InvalidConfig(message.to_string())
}

/// Strip at most one leading and one trailing slash
fn trim_endpoint(endpoint: &str) -> &str {
    let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
    endpoint.strip_suffix('/').unwrap_or(endpoint)
}
