use crate::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::error::{self, Result};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// The environment under test, usually read from `config/env.yaml`.
///
/// ```yaml
/// kiali_hostname: kiali-istio-system.apps.example.com
/// kiali_username: admin
/// kiali_password: admin
/// kiali_ssl_enabled: true
/// mesh_bookinfo_namespace: bookinfo
/// istio_clusterrole: https://example.com/istio-clusterrole.yaml
/// kiali_openshift_clusterrole: https://example.com/kiali-openshift.yaml
/// kiali_kubernetes_clusterrole: https://example.com/kiali-kubernetes.yaml
/// ```
///
/// The configuration is passed explicitly to the constructors that need it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Host (and optional port) where Kiali is reachable, e.g. `kiali.example.com:443`.
    pub kiali_hostname: String,
    #[serde(default)]
    pub kiali_username: Option<String>,
    #[serde(default)]
    pub kiali_password: Option<String>,
    /// Selects `https` when true, `http` otherwise.
    #[serde(default)]
    pub kiali_ssl_enabled: bool,
    /// Whether the Kiali certificate must be valid. Test clusters usually serve self-signed
    /// certificates, so this is off unless requested.
    #[serde(default)]
    pub kiali_verify_tls: bool,
    pub mesh_bookinfo_namespace: String,
    #[serde(default)]
    pub istio_clusterrole: Option<String>,
    #[serde(default)]
    pub kiali_openshift_clusterrole: Option<String>,
    #[serde(default)]
    pub kiali_kubernetes_clusterrole: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl EnvironmentConfig {
    /// Reads and parses the environment file at `path`.
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).context(error::ConfigReadSnafu { path })?;
        Ok(serde_yaml::from_str(&contents).context(error::ConfigParseSnafu { path })?)
    }

    /// Parses an environment from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml).context(error::ConfigYamlSnafu)?)
    }

    /// The URL scheme and authority of the Kiali server, e.g. `https://kiali.example.com`.
    pub fn base_url(&self) -> String {
        let hostname = self.kiali_hostname.trim_end_matches('/');
        if hostname.starts_with("http://") || hostname.starts_with("https://") {
            return hostname.to_string();
        }
        let scheme = if self.kiali_ssl_enabled {
            "https"
        } else {
            "http"
        };
        format!("{}://{}", scheme, hostname)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl FromStr for EnvironmentConfig {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_yaml(s)
    }
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
