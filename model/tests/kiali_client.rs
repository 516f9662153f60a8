use maplit::btreemap;
use meshtest_model::clients::{HttpStatusCode, StatusCode};
use meshtest_model::graph::{self, BadgeCondition};
use meshtest_model::{
    ApiMethod, Badge, EnvironmentConfig, GraphParams, GraphType, KialiApi, KialiClient, Poller,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{basic_auth, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> EnvironmentConfig {
    EnvironmentConfig {
        kiali_hostname: server.uri(),
        kiali_username: Some("admin".to_string()),
        kiali_password: Some("secret".to_string()),
        mesh_bookinfo_namespace: "bookinfo".to_string(),
        request_timeout_secs: 5,
        ..Default::default()
    }
}

fn bookinfo_graph(circuit_breakers: usize) -> serde_json::Value {
    let nodes: Vec<_> = ["productpage", "details", "reviews", "ratings"]
        .iter()
        .enumerate()
        .map(|(i, app)| json!({"data": {"id": app, "app": app, "hasCB": i < circuit_breakers}}))
        .collect();
    json!({
        "timestamp": 1_523_364_075,
        "graphType": "versionedApp",
        "elements": {
            "nodes": nodes,
            "edges": [{"data": {"source": "productpage", "target": "details"}}]
        }
    })
}

#[tokio::test]
async fn url_encodes_path_parameters() {
    let server = MockServer::start().await;
    let client = KialiClient::new(&config(&server)).unwrap();
    let url = client
        .url(
            ApiMethod::ServiceDetails,
            &[("namespace", "bookinfo"), ("service", "a b/c")],
        )
        .unwrap();
    assert_eq!(
        url.as_str(),
        format!("{}/api/namespaces/bookinfo/services/a%20b%2Fc", server.uri())
    );

    let err = client.url(ApiMethod::ServiceDetails, &[]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing path parameter 'namespace' for 'serviceDetails'"
    );
}

#[tokio::test]
async fn request_sends_query_and_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/namespaces/bookinfo/health"))
        .and(query_param("type", "app"))
        .and(query_param("rateInterval", "60s"))
        .and(basic_auth("admin", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reviews": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = KialiClient::new(&config(&server)).unwrap();
    let params: Vec<(&str, &str)> = btreemap! {
        "type" => "app",
        "rateInterval" => "60s",
    }
    .into_iter()
    .collect();
    let response = client
        .request(
            ApiMethod::NamespaceHealth,
            &[("namespace", "bookinfo")],
            &params,
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.method(), ApiMethod::NamespaceHealth);
    assert_eq!(response.json_value().unwrap(), json!({"reviews": {}}));
}

#[tokio::test]
async fn error_statuses_are_returned_to_the_caller() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/namespaces/invalid/health"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let client = KialiClient::new(&config(&server)).unwrap();
    let response = client
        .request(
            ApiMethod::NamespaceHealth,
            &[("namespace", "invalid")],
            &[],
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.text(), "forbidden");

    let err = client
        .get_json(
            ApiMethod::NamespaceHealth,
            &[("namespace", "invalid")],
            &[],
        )
        .await
        .unwrap_err();
    assert!(err.is_status_code(StatusCode::FORBIDDEN));
}

#[tokio::test]
async fn unreachable_server() {
    let config = EnvironmentConfig {
        kiali_hostname: "127.0.0.1:1".to_string(),
        mesh_bookinfo_namespace: "bookinfo".to_string(),
        request_timeout_secs: 1,
        ..Default::default()
    };
    let client = KialiClient::new(&config).unwrap();
    let err = client
        .request(ApiMethod::GetStatus, &[], &[])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("getStatus"));
}

#[tokio::test]
async fn typed_helpers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/namespaces/bookinfo/apps/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "reviews",
            "workloads": [{"workloadName": "reviews-v1"}, {"workloadName": "reviews-v2"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/namespaces/bookinfo/workloads/details-v1/istio_validations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pod": {}})))
        .mount(&server)
        .await;

    let client = KialiClient::new(&config(&server)).unwrap();
    let app = client.app_details("bookinfo", "reviews").await.unwrap();
    assert_eq!(app["workloads"].as_array().unwrap().len(), 2);
    let validations = client
        .workload_istio_validations("bookinfo", "details-v1")
        .await
        .unwrap();
    assert!(validations.get("pod").is_some());
}

#[tokio::test]
async fn graph_badges_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/namespaces/bookinfo/graph"))
        .and(query_param("graphType", "versionedApp"))
        .and(query_param("duration", "60s"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bookinfo_graph(2)))
        .mount(&server)
        .await;

    let client = KialiClient::new(&config(&server)).unwrap();
    let params = GraphParams::new(GraphType::VersionedApp);
    let graph_json = client.graph_namespace("bookinfo", &params).await.unwrap();
    assert_eq!(graph::nodes(&graph_json).unwrap().len(), 4);
    assert_eq!(graph::edges(&graph_json).unwrap().len(), 1);

    let count = graph::wait_for_badges(
        &client,
        "bookinfo",
        &params,
        Badge::CircuitBreaker,
        BadgeCondition::AtLeast(2),
        &Poller::new("circuit breakers", Duration::from_secs(5)),
    )
    .await
    .unwrap();
    assert_eq!(count, 2);
    assert_eq!(
        graph::badge_count(&client, "bookinfo", &params, Badge::VirtualService)
            .await
            .unwrap(),
        0
    );
}
