//! Downloads the cluster role manifests of Istio and Kiali and turns their templates into plain
//! YAML.

use crate::constants::{CLUSTER_ROLE_VERSION_LABEL, KIALI_ACCOUNT_NAME};
use crate::error::{self, Result};
use crate::EnvironmentConfig;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt};

const VERSION_LABEL_PLACEHOLDER: &str = "${VERSION_LABEL}";

/// The platform a Kiali cluster role is written for.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ClusterRoleFlavor {
    Openshift,
    Kubernetes,
}

serde_plain::derive_fromstr_from_deserialize!(ClusterRoleFlavor, |e| -> crate::Error {
    crate::error::OpaqueError::SerdePlain { source: e }.into()
});
serde_plain::derive_display_from_serialize!(ClusterRoleFlavor);

/// Replaces the Helm template markers of the Istio cluster role with fixed values.
pub fn render_istio_cluster_role(template: &str) -> Result<String> {
    let app_label = format!("app: {}", KIALI_ACCOUNT_NAME);
    let version_label = format!("version: {} ", CLUSTER_ROLE_VERSION_LABEL);
    let rewrites = [
        (r"app: \{\{.+\}\}", app_label.as_str()),
        (r"chart: \{\{.+\}\}", version_label.as_str()),
        (r"heritage: \{\{.+\}\}\n", ""),
        (r"release: \{\{.+\}\}", ""),
    ];
    let mut rendered = template.to_string();
    for (pattern, replacement) in rewrites {
        let regex = Regex::new(pattern).context(error::RegexSnafu { pattern })?;
        rendered = regex.replace_all(&rendered, replacement).into_owned();
    }
    Ok(rendered)
}

/// Fills in the version label of a Kiali cluster role.
pub fn render_kiali_cluster_role(template: &str) -> String {
    template.replace(VERSION_LABEL_PLACEHOLDER, CLUSTER_ROLE_VERSION_LABEL)
}

/// Downloads and renders the Istio cluster role named by `istio_clusterrole`.
pub async fn fetch_istio_cluster_role(config: &EnvironmentConfig) -> Result<serde_yaml::Value> {
    let url = config
        .istio_clusterrole
        .as_deref()
        .context(error::ClusterRoleUrlMissingSnafu { what: "istio" })?;
    let template = download(url).await?;
    parse(url, &render_istio_cluster_role(&template)?)
}

/// Downloads and renders the Kiali cluster role of `flavor`.
pub async fn fetch_kiali_cluster_role(
    config: &EnvironmentConfig,
    flavor: ClusterRoleFlavor,
) -> Result<serde_yaml::Value> {
    let url = match flavor {
        ClusterRoleFlavor::Openshift => config.kiali_openshift_clusterrole.as_deref(),
        ClusterRoleFlavor::Kubernetes => config.kiali_kubernetes_clusterrole.as_deref(),
    }
    .context(error::ClusterRoleUrlMissingSnafu {
        what: format!("kiali {}", flavor),
    })?;
    let template = download(url).await?;
    parse(url, &render_kiali_cluster_role(&template))
}

async fn download(url: &str) -> Result<String> {
    debug!("Downloading cluster role from '{}'", url);
    let response = reqwest::get(url)
        .await
        .and_then(|response| response.error_for_status())
        .context(error::ClusterRoleFetchSnafu { url })?;
    Ok(response
        .text()
        .await
        .context(error::ClusterRoleFetchSnafu { url })?)
}

fn parse(url: &str, yaml: &str) -> Result<serde_yaml::Value> {
    Ok(serde_yaml::from_str(yaml).context(error::ClusterRoleParseSnafu { url })?)
}

#[cfg(test)]
mod test {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ISTIO_TEMPLATE: &str = r#"apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRole
metadata:
  name: kiali
  labels:
    app: {{ template "kiali.name" . }}
    chart: {{ template "kiali.chart" . }}
    heritage: {{ .Release.Service }}
    release: {{ .Release.Name }}
rules:
- apiGroups: [""]
  resources: ["pods"]
  verbs: ["get", "list"]
"#;

    const KIALI_TEMPLATE: &str = r#"apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRole
metadata:
  name: kiali
  labels:
    app: kiali
    version: ${VERSION_LABEL}
"#;

    #[test]
    fn istio_markers_are_replaced() {
        let rendered = render_istio_cluster_role(ISTIO_TEMPLATE).unwrap();
        assert!(!rendered.contains("{{"));
        assert!(rendered.contains("    app: kiali\n"));
        assert!(rendered.contains("    version: 0.10 \n"));
        assert!(!rendered.contains("heritage"));
        assert!(!rendered.contains("release"));

        let value: serde_yaml::Value = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(value["metadata"]["labels"]["app"].as_str(), Some("kiali"));
        assert_eq!(value["kind"].as_str(), Some("ClusterRole"));
    }

    #[test]
    fn kiali_version_label() {
        let rendered = render_kiali_cluster_role(KIALI_TEMPLATE);
        assert!(rendered.contains("version: 0.10\n"));
        assert!(!rendered.contains("VERSION_LABEL"));
    }

    #[test]
    fn flavor_names() {
        assert_eq!(ClusterRoleFlavor::Openshift.to_string(), "openshift");
        assert_eq!(
            "kubernetes".parse::<ClusterRoleFlavor>().unwrap(),
            ClusterRoleFlavor::Kubernetes
        );
    }

    #[tokio::test]
    async fn fetch_and_render() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/istio.yaml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ISTIO_TEMPLATE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/kiali-openshift.yaml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(KIALI_TEMPLATE))
            .mount(&server)
            .await;
        let config = EnvironmentConfig {
            istio_clusterrole: Some(format!("{}/istio.yaml", server.uri())),
            kiali_openshift_clusterrole: Some(format!("{}/kiali-openshift.yaml", server.uri())),
            kiali_kubernetes_clusterrole: Some(format!("{}/missing.yaml", server.uri())),
            ..Default::default()
        };

        let istio = fetch_istio_cluster_role(&config).await.unwrap();
        assert_eq!(istio["metadata"]["labels"]["version"].as_f64(), Some(0.1));

        let kiali = fetch_kiali_cluster_role(&config, ClusterRoleFlavor::Openshift)
            .await
            .unwrap();
        assert_eq!(kiali["metadata"]["name"].as_str(), Some("kiali"));

        let missing = fetch_kiali_cluster_role(&config, ClusterRoleFlavor::Kubernetes)
            .await
            .unwrap_err();
        assert!(missing.to_string().contains("missing.yaml"));
    }

    #[tokio::test]
    async fn unconfigured_url() {
        let err = fetch_istio_cluster_role(&EnvironmentConfig::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No URL is configured for the istio cluster role"
        );
    }
}
