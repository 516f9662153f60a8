//! Helpers for the Kiali service graph.

use crate::clients::{self, ApiMethod, KialiApi};
use crate::constants::{DEFAULT_GRAPH_DURATION, PARAM_DURATION, PARAM_GRAPH_TYPE};
use crate::poll::{PollError, Poller};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The kinds of graph Kiali can draw.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum GraphType {
    App,
    VersionedApp,
    Workload,
    Service,
}

serde_plain::derive_fromstr_from_deserialize!(GraphType, |e| -> crate::Error {
    crate::error::OpaqueError::SerdePlain { source: e }.into()
});
serde_plain::derive_display_from_serialize!(GraphType);

/// Node flags that Kiali sets when Istio configuration applies to the node.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq)]
pub enum Badge {
    /// A destination rule with a circuit breaker.
    #[serde(rename = "hasCB")]
    CircuitBreaker,
    /// A virtual service.
    #[serde(rename = "hasVS")]
    VirtualService,
}

serde_plain::derive_fromstr_from_deserialize!(Badge, |e| -> crate::Error {
    crate::error::OpaqueError::SerdePlain { source: e }.into()
});
serde_plain::derive_display_from_serialize!(Badge);

/// The query parameters of a graph request.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct GraphParams {
    pub graph_type: GraphType,
    pub duration: String,
}

impl GraphParams {
    pub fn new(graph_type: GraphType) -> Self {
        Self {
            graph_type,
            duration: DEFAULT_GRAPH_DURATION.to_string(),
        }
    }

    pub fn with_duration<S>(mut self, duration: S) -> Self
    where
        S: Into<String>,
    {
        self.duration = duration.into();
        self
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            (PARAM_GRAPH_TYPE, self.graph_type.to_string()),
            (PARAM_DURATION, self.duration.clone()),
        ]
    }
}

/// The `elements.nodes` array of a graph.
pub fn nodes(graph: &Value) -> clients::Result<&Vec<Value>> {
    elements(graph, "nodes")
}

/// The `elements.edges` array of a graph.
pub fn edges(graph: &Value) -> clients::Result<&Vec<Value>> {
    elements(graph, "edges")
}

fn elements<'a>(graph: &'a Value, kind: &str) -> clients::Result<&'a Vec<Value>> {
    match graph
        .get("elements")
        .and_then(|elements| elements.get(kind))
        .and_then(Value::as_array)
    {
        Some(array) => Ok(array),
        None => Err(clients::error::InnerError::MissingField {
            method: ApiMethod::GraphNamespace.to_string(),
            field: format!("elements.{}", kind),
        }
        .into()),
    }
}

/// Counts the nodes of `graph` whose `data` carries `badge` with a truthy value.
pub fn count_badges(graph: &Value, badge: Badge) -> clients::Result<usize> {
    let badge = badge.to_string();
    Ok(nodes(graph)?
        .iter()
        .filter(|node| {
            node.get("data")
                .and_then(|data| data.get(&badge))
                .map(is_truthy)
                .unwrap_or_default()
        })
        .count())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or_default(),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Fetches the graph of `namespace` and counts the nodes carrying `badge`.
pub async fn badge_count<A>(
    api: &A,
    namespace: &str,
    params: &GraphParams,
    badge: Badge,
) -> clients::Result<usize>
where
    A: KialiApi + ?Sized,
{
    let graph = api.graph_namespace(namespace, params).await?;
    count_badges(&graph, badge)
}

/// The badge count a wait is looking for.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BadgeCondition {
    /// At least one node carries the badge, and no fewer than the given count.
    AtLeast(usize),
    /// No more than the given count of nodes carry the badge.
    AtMost(usize),
}

impl BadgeCondition {
    pub fn holds(&self, count: usize) -> bool {
        match self {
            BadgeCondition::AtLeast(baseline) => count != 0 && count >= *baseline,
            BadgeCondition::AtMost(baseline) => count <= *baseline,
        }
    }
}

impl fmt::Display for BadgeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadgeCondition::AtLeast(baseline) => {
                write!(f, "at least {} node(s)", (*baseline).max(1))
            }
            BadgeCondition::AtMost(baseline) => write!(f, "at most {} node(s)", baseline),
        }
    }
}

/// Polls the graph of `namespace` until the count of `badge` satisfies `condition` and returns
/// that count.
pub async fn wait_for_badges<A>(
    api: &A,
    namespace: &str,
    params: &GraphParams,
    badge: Badge,
    condition: BadgeCondition,
    poller: &Poller,
) -> Result<usize, PollError<clients::Error>>
where
    A: KialiApi + ?Sized,
{
    info!(
        "Waiting up to {:?} for {} on {} in the {} graph of '{}'",
        poller.timeout(),
        badge,
        condition,
        params.graph_type,
        namespace
    );
    poller
        .wait(
            || badge_count(api, namespace, params, badge),
            |count| condition.holds(*count),
        )
        .await
}
