use super::error::{self, Result};
use super::{ApiMethod, ApiResponse, StatusCode};
use crate::graph::GraphParams;
use crate::EnvironmentConfig;
use async_trait::async_trait;
use log::{debug, trace};
use serde_json::Value;
use snafu::{OptionExt, ResultExt};
use url::Url;

/// The interface to the Kiali REST API. The purpose of the interface is to allow injection of a
/// fake for testing code that polls Kiali, such as the graph badge waits, without the presence of
/// a cluster. In practice you will use [`KialiClient`].
#[async_trait]
pub trait KialiApi: Send + Sync {
    /// Calls `method` with `path_params` substituted into its path and `query_params` appended
    /// as the query string. The response is returned whatever its status.
    async fn request(
        &self,
        method: ApiMethod,
        path_params: &[(&str, &str)],
        query_params: &[(&str, &str)],
    ) -> Result<ApiResponse>;

    /// Calls `method`, requires a `200 OK` and returns the JSON body.
    async fn get_json(
        &self,
        method: ApiMethod,
        path_params: &[(&str, &str)],
        query_params: &[(&str, &str)],
    ) -> Result<Value> {
        self.request(method, path_params, query_params)
            .await?
            .expect_status(StatusCode::OK)?
            .json_value()
    }

    /// The service graph of a single namespace.
    async fn graph_namespace(&self, namespace: &str, params: &GraphParams) -> Result<Value> {
        let query = params.query();
        let query: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.get_json(
            ApiMethod::GraphNamespace,
            &[("namespace", namespace)],
            &query,
        )
        .await
    }

    async fn service_details(&self, namespace: &str, service: &str) -> Result<Value> {
        self.get_json(
            ApiMethod::ServiceDetails,
            &[("namespace", namespace), ("service", service)],
            &[],
        )
        .await
    }

    async fn app_list(&self, namespace: &str) -> Result<Value> {
        self.get_json(ApiMethod::AppList, &[("namespace", namespace)], &[])
            .await
    }

    async fn app_details(&self, namespace: &str, app: &str) -> Result<Value> {
        self.get_json(
            ApiMethod::AppDetails,
            &[("namespace", namespace), ("app", app)],
            &[],
        )
        .await
    }

    async fn app_health(&self, namespace: &str, app: &str) -> Result<Value> {
        self.get_json(
            ApiMethod::AppHealth,
            &[("namespace", namespace), ("app", app)],
            &[],
        )
        .await
    }

    async fn app_metrics(&self, namespace: &str, app: &str) -> Result<Value> {
        self.get_json(
            ApiMethod::AppMetrics,
            &[("namespace", namespace), ("app", app)],
            &[],
        )
        .await
    }

    async fn workload_list(&self, namespace: &str) -> Result<Value> {
        self.get_json(ApiMethod::WorkloadList, &[("namespace", namespace)], &[])
            .await
    }

    async fn workload_details(&self, namespace: &str, workload: &str) -> Result<Value> {
        self.get_json(
            ApiMethod::WorkloadDetails,
            &[("namespace", namespace), ("workload", workload)],
            &[],
        )
        .await
    }

    async fn workload_health(&self, namespace: &str, workload: &str) -> Result<Value> {
        self.get_json(
            ApiMethod::WorkloadHealth,
            &[("namespace", namespace), ("workload", workload)],
            &[],
        )
        .await
    }

    async fn workload_metrics(&self, namespace: &str, workload: &str) -> Result<Value> {
        self.get_json(
            ApiMethod::WorkloadMetrics,
            &[("namespace", namespace), ("workload", workload)],
            &[],
        )
        .await
    }

    async fn workload_istio_validations(&self, namespace: &str, workload: &str) -> Result<Value> {
        self.get_json(
            ApiMethod::WorkloadValidations,
            &[("namespace", namespace), ("workload", workload)],
            &[],
        )
        .await
    }
}

/// An HTTP client for the Kiali REST API.
///
/// # Example
///
/// ```
///# use meshtest_model::{EnvironmentConfig, KialiApi, KialiClient};
///# async fn no_run() {
/// let config = EnvironmentConfig::from_path("config/env.yaml").unwrap();
/// let client = KialiClient::new(&config).unwrap();
/// let apps = client.app_list(&config.mesh_bookinfo_namespace).await.unwrap();
///# }
/// ```
#[derive(Clone, Debug)]
pub struct KialiClient {
    http: reqwest::Client,
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
}

impl KialiClient {
    pub fn new(config: &EnvironmentConfig) -> Result<Self> {
        let base_url = config.base_url();
        let base_url = Url::parse(&base_url).context(error::InvalidUrlSnafu { url: &base_url })?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .danger_accept_invalid_certs(!config.kiali_verify_tls)
            .build()
            .context(error::ClientBuildSnafu)?;
        Ok(Self {
            http,
            base_url,
            username: config.kiali_username.clone(),
            password: config.kiali_password.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The full URL of `method` with its path parameters substituted.
    pub fn url(&self, method: ApiMethod, path_params: &[(&str, &str)]) -> Result<Url> {
        let segments = method.path_segments(path_params)?;
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .ok()
            .context(error::CannotBeABaseSnafu {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl KialiApi for KialiClient {
    async fn request(
        &self,
        method: ApiMethod,
        path_params: &[(&str, &str)],
        query_params: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        let url = self.url(method, path_params)?;
        debug!("{} {} {:?}", method.http_method(), url, query_params);
        let mut request = self.http.request(method.http_method(), url.clone());
        if !query_params.is_empty() {
            request = request.query(query_params);
        }
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }
        let response = request.send().await.context(error::RequestSnafu {
            method: method.to_string(),
            url: url.to_string(),
        })?;
        let status = response.status();
        let body = response.bytes().await.context(error::ReadBodySnafu {
            method: method.to_string(),
        })?;
        debug!("{} returned {}", method, status);
        trace!("{} body: {}", method, String::from_utf8_lossy(&body));
        Ok(ApiResponse::new(method, status, body.to_vec()))
    }
}
