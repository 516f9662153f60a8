use super::error::{self, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use snafu::OptionExt;

/// The Kiali REST operations exercised by the suite, named by their operation id.
///
/// ```
///# use meshtest_model::ApiMethod;
/// let method: ApiMethod = "namespaceHealth".parse().unwrap();
/// assert_eq!(method, ApiMethod::NamespaceHealth);
/// assert_eq!(method.path_template(), "/api/namespaces/{namespace}/health");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "camelCase")]
pub enum ApiMethod {
    #[serde(rename = "Root")]
    Root,
    #[serde(rename = "Authenticate")]
    Authenticate,
    GetStatus,
    GetConfig,
    JaegerInfo,
    GrafanaInfo,

    NamespaceList,
    NamespaceMetrics,
    NamespaceHealth,
    NamespaceValidations,

    IstioConfigList,
    IstioConfigDetails,
    IstioConfigDetailsSubtype,
    ObjectValidations,

    ServiceList,
    ServiceDetails,
    ServiceMetrics,
    ServiceHealth,
    ServiceValidations,
    ServiceDashboard,

    AppList,
    AppDetails,
    AppMetrics,
    AppHealth,
    AppDashboard,

    WorkloadList,
    WorkloadDetails,
    WorkloadMetrics,
    WorkloadHealth,
    WorkloadValidations,
    WorkloadDashboard,

    GraphNamespaces,
    GraphNamespace,
    GraphService,
    GraphWorkload,
    GraphApp,
    GraphAppVersion,
}

serde_plain::derive_fromstr_from_deserialize!(ApiMethod, |e| -> crate::Error {
    crate::error::OpaqueError::SerdePlain { source: e }.into()
});
serde_plain::derive_display_from_serialize!(ApiMethod);

impl ApiMethod {
    /// Every operation, in the order of the table above.
    pub const ALL: &'static [ApiMethod] = &[
        ApiMethod::Root,
        ApiMethod::Authenticate,
        ApiMethod::GetStatus,
        ApiMethod::GetConfig,
        ApiMethod::JaegerInfo,
        ApiMethod::GrafanaInfo,
        ApiMethod::NamespaceList,
        ApiMethod::NamespaceMetrics,
        ApiMethod::NamespaceHealth,
        ApiMethod::NamespaceValidations,
        ApiMethod::IstioConfigList,
        ApiMethod::IstioConfigDetails,
        ApiMethod::IstioConfigDetailsSubtype,
        ApiMethod::ObjectValidations,
        ApiMethod::ServiceList,
        ApiMethod::ServiceDetails,
        ApiMethod::ServiceMetrics,
        ApiMethod::ServiceHealth,
        ApiMethod::ServiceValidations,
        ApiMethod::ServiceDashboard,
        ApiMethod::AppList,
        ApiMethod::AppDetails,
        ApiMethod::AppMetrics,
        ApiMethod::AppHealth,
        ApiMethod::AppDashboard,
        ApiMethod::WorkloadList,
        ApiMethod::WorkloadDetails,
        ApiMethod::WorkloadMetrics,
        ApiMethod::WorkloadHealth,
        ApiMethod::WorkloadValidations,
        ApiMethod::WorkloadDashboard,
        ApiMethod::GraphNamespaces,
        ApiMethod::GraphNamespace,
        ApiMethod::GraphService,
        ApiMethod::GraphWorkload,
        ApiMethod::GraphApp,
        ApiMethod::GraphAppVersion,
    ];

    pub fn http_method(&self) -> Method {
        Method::GET
    }

    /// The path of the operation with `{placeholders}` for its path parameters.
    pub fn path_template(&self) -> &'static str {
        match self {
            ApiMethod::Root => "/api",
            ApiMethod::Authenticate => "/api/token",
            ApiMethod::GetStatus => "/api/status",
            ApiMethod::GetConfig => "/api/config",
            ApiMethod::JaegerInfo => "/api/jaeger",
            ApiMethod::GrafanaInfo => "/api/grafana",
            ApiMethod::NamespaceList => "/api/namespaces",
            ApiMethod::NamespaceMetrics => "/api/namespaces/{namespace}/metrics",
            ApiMethod::NamespaceHealth => "/api/namespaces/{namespace}/health",
            ApiMethod::NamespaceValidations => "/api/namespaces/{namespace}/istio_validations",
            ApiMethod::IstioConfigList => "/api/namespaces/{namespace}/istio",
            ApiMethod::IstioConfigDetails => {
                "/api/namespaces/{namespace}/istio/{object_type}/{object}"
            }
            ApiMethod::IstioConfigDetailsSubtype => {
                "/api/namespaces/{namespace}/istio/{object_type}/{object_subtype}/{object}"
            }
            ApiMethod::ObjectValidations => {
                "/api/namespaces/{namespace}/istio/{object_type}/{object}/istio_validations"
            }
            ApiMethod::ServiceList => "/api/namespaces/{namespace}/services",
            ApiMethod::ServiceDetails => "/api/namespaces/{namespace}/services/{service}",
            ApiMethod::ServiceMetrics => "/api/namespaces/{namespace}/services/{service}/metrics",
            ApiMethod::ServiceHealth => "/api/namespaces/{namespace}/services/{service}/health",
            ApiMethod::ServiceValidations => {
                "/api/namespaces/{namespace}/services/{service}/istio_validations"
            }
            ApiMethod::ServiceDashboard => {
                "/api/namespaces/{namespace}/services/{service}/dashboard"
            }
            ApiMethod::AppList => "/api/namespaces/{namespace}/apps",
            ApiMethod::AppDetails => "/api/namespaces/{namespace}/apps/{app}",
            ApiMethod::AppMetrics => "/api/namespaces/{namespace}/apps/{app}/metrics",
            ApiMethod::AppHealth => "/api/namespaces/{namespace}/apps/{app}/health",
            ApiMethod::AppDashboard => "/api/namespaces/{namespace}/apps/{app}/dashboard",
            ApiMethod::WorkloadList => "/api/namespaces/{namespace}/workloads",
            ApiMethod::WorkloadDetails => "/api/namespaces/{namespace}/workloads/{workload}",
            ApiMethod::WorkloadMetrics => {
                "/api/namespaces/{namespace}/workloads/{workload}/metrics"
            }
            ApiMethod::WorkloadHealth => "/api/namespaces/{namespace}/workloads/{workload}/health",
            ApiMethod::WorkloadValidations => {
                "/api/namespaces/{namespace}/workloads/{workload}/istio_validations"
            }
            ApiMethod::WorkloadDashboard => {
                "/api/namespaces/{namespace}/workloads/{workload}/dashboard"
            }
            ApiMethod::GraphNamespaces => "/api/namespaces/graph",
            ApiMethod::GraphNamespace => "/api/namespaces/{namespace}/graph",
            ApiMethod::GraphService => "/api/namespaces/{namespace}/services/{service}/graph",
            ApiMethod::GraphWorkload => "/api/namespaces/{namespace}/workloads/{workload}/graph",
            ApiMethod::GraphApp => "/api/namespaces/{namespace}/applications/{app}/graph",
            ApiMethod::GraphAppVersion => {
                "/api/namespaces/{namespace}/applications/{app}/versions/{version}/graph"
            }
        }
    }

    /// The names of the `{placeholders}` in the path template, in order.
    pub fn path_parameters(&self) -> Vec<&'static str> {
        self.path_template()
            .split('/')
            .filter_map(placeholder)
            .collect()
    }

    /// The decoded path segments of the operation, with each placeholder replaced by its value in
    /// `path_params`. Parameters that the template does not use are ignored.
    pub fn path_segments(&self, path_params: &[(&str, &str)]) -> Result<Vec<String>> {
        self.path_template()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match placeholder(segment) {
                None => Ok(segment.to_string()),
                Some(name) => path_params
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| value.to_string())
                    .context(error::MissingPathParameterSnafu {
                        method: self.to_string(),
                        parameter: name,
                    })
                    .map_err(Into::into),
            })
            .collect()
    }

    /// The path of the operation with its parameters substituted, for display.
    pub fn render_path(&self, path_params: &[(&str, &str)]) -> Result<String> {
        Ok(format!("/{}", self.path_segments(path_params)?.join("/")))
    }
}

fn placeholder(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}
