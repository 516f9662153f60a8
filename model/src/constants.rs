use std::time::Duration;

// Environment file
pub const DEFAULT_ENV_FILE: &str = "./config/env.yaml";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Kiali
pub const API_PREFIX: &str = "/api";
pub const KIALI_ACCOUNT_NAME: &str = "kiali";
pub const KIALI_SERVICE_ACCOUNT_NAMESPACE: &str = "istio-system";
pub const CLUSTER_ROLE_VERSION_LABEL: &str = "0.10";

// Graph
pub const DEFAULT_GRAPH_DURATION: &str = "60s";

// Waits used by the reconfiguration scenarios
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const CREATE_TIMEOUT: Duration = Duration::from_secs(60);
pub const DELETE_TIMEOUT: Duration = Duration::from_secs(30);

// Query parameter keys
pub const PARAM_GRAPH_TYPE: &str = "graphType";
pub const PARAM_DURATION: &str = "duration";
pub const PARAM_NAMESPACES: &str = "namespaces";
pub const PARAM_RATE_INTERVAL: &str = "rateInterval";
pub const PARAM_TYPE: &str = "type";
