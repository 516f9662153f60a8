use anyhow::{Context, Result};
use clap::Parser;
use meshtest_model::graph::{self, BadgeCondition};
use meshtest_model::{Badge, EnvironmentConfig, GraphParams, GraphType, KialiClient, Poller};
use std::time::Duration;

/// Poll the graph of a namespace until enough (or few enough) nodes carry a badge.
#[derive(Debug, Parser)]
pub(crate) struct WaitBadge {
    /// The badge, `hasCB` or `hasVS`.
    badge: Badge,

    /// The graph to inspect [app|versionedApp|workload|service].
    #[clap(long = "graph-type", default_value = "versionedApp")]
    graph_type: GraphType,

    /// The namespace to inspect. Defaults to the bookinfo namespace of the environment.
    #[clap(long, short = 'n')]
    namespace: Option<String>,

    /// Wait until at least one node, and no fewer than this many, carry the badge. This is the
    /// default, with a count of 1.
    #[clap(long = "at-least", conflicts_with = "at-most")]
    at_least: Option<usize>,

    /// Wait until no more than this many nodes carry the badge.
    #[clap(long = "at-most")]
    at_most: Option<usize>,

    /// Seconds to wait before giving up.
    #[clap(long, default_value = "60")]
    timeout: u64,

    /// Seconds between two graph fetches, at least 1.
    #[clap(long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,
}

impl WaitBadge {
    pub(crate) async fn run(self, config: EnvironmentConfig) -> Result<()> {
        let client = KialiClient::new(&config).context("Unable to create the Kiali client")?;
        let namespace = self
            .namespace
            .clone()
            .unwrap_or_else(|| config.mesh_bookinfo_namespace.clone());
        let condition = self.condition();
        let poller = Poller::new(
            format!("{} on {}", self.badge, condition),
            Duration::from_secs(self.timeout),
        )
        .interval(Duration::from_secs(self.interval));
        let count = graph::wait_for_badges(
            &client,
            &namespace,
            &GraphParams::new(self.graph_type),
            self.badge,
            condition,
            &poller,
        )
        .await?;
        println!("{} nodes of '{}' carry {}.", count, namespace, self.badge);
        Ok(())
    }

    fn condition(&self) -> BadgeCondition {
        match (self.at_least, self.at_most) {
            (_, Some(at_most)) => BadgeCondition::AtMost(at_most),
            (at_least, None) => BadgeCondition::AtLeast(at_least.unwrap_or(1)),
        }
    }
}
