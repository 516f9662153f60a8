use crate::test_settings::TestSettings;
use anyhow::{ensure, format_err, Context, Result};
use log::info;
use meshtest_model::clients::StatusCode;
use meshtest_model::constants::{CREATE_TIMEOUT, DELETE_TIMEOUT};
use meshtest_model::graph::{self, BadgeCondition};
use meshtest_model::{
    ApiMethod, ApiResponse, Badge, EnvironmentConfig, GraphParams, KialiApi, KialiClient, Oc,
    Poller,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, MutexGuard};

lazy_static::lazy_static! {
    static ref EXCLUSIVE: Mutex<()> = Mutex::new(());
}

pub const CIRCUIT_BREAKER_ASSET: &str = "bookinfo-reviews-all-cb.yaml";
pub const VIRTUAL_SERVICE_ASSET: &str = "bookinfo-ratings-delay.yaml";
pub const REVIEWS_80_20_ASSET: &str = "bookinfo-reviews-80-20.yaml";
pub const REVIEWS_DESTINATION_RULE_ASSET: &str = "bookinfo-destination-rule-reviews.yaml";

/// Represents a connection to the cluster under test. The `Drop` trait is implemented deleting any
/// asset applied through the session that has not been deleted yet.
#[derive(Debug)]
pub struct Session {
    env_file: PathBuf,
    config: EnvironmentConfig,
    client: KialiClient,
    oc: Oc,
    assets_dir: PathBuf,
    applied: Vec<String>,
}

impl Session {
    /// Creates a `Session` from the `MESHTEST_` environment variables.
    pub fn new() -> Result<Self> {
        Self::from_parts(
            TestSettings::env_file(),
            TestSettings::oc_path(),
            TestSettings::assets_dir(),
        )
    }

    pub fn from_parts<P1, P2, P3>(env_file: P1, oc_path: P2, assets_dir: P3) -> Result<Self>
    where
        P1: AsRef<Path>,
        P2: Into<PathBuf>,
        P3: Into<PathBuf>,
    {
        let env_file = env_file.as_ref().to_path_buf();
        let config = EnvironmentConfig::from_path(&env_file)?;
        let client = KialiClient::new(&config)?;
        Ok(Self {
            env_file,
            config,
            client,
            oc: Oc::new(oc_path),
            assets_dir: assets_dir.into(),
            applied: Vec::new(),
        })
    }

    /// Serialises the scenarios of a test binary that change the cluster. Hold the guard for the
    /// duration of the scenario.
    pub async fn exclusive() -> MutexGuard<'static, ()> {
        EXCLUSIVE.lock().await
    }

    pub fn env_file(&self) -> &Path {
        &self.env_file
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    pub fn client(&self) -> &KialiClient {
        &self.client
    }

    pub fn oc(&self) -> &Oc {
        &self.oc
    }

    pub fn bookinfo_namespace(&self) -> &str {
        &self.config.mesh_bookinfo_namespace
    }

    /// The assets applied through this session and not deleted since.
    pub fn applied_assets(&self) -> &[String] {
        &self.applied
    }

    pub fn asset_path(&self, name: &str) -> PathBuf {
        self.assets_dir.join(name)
    }

    /// Calls `method` and requires the `expected` status.
    pub async fn call(
        &self,
        method: ApiMethod,
        path: &[(&str, &str)],
        params: &[(&str, &str)],
        expected: StatusCode,
    ) -> Result<ApiResponse> {
        let response = self.client.request(method, path, params).await?;
        Ok(response.expect_status(expected)?)
    }

    /// Calls `method`, requires the `expected` status and a JSON body, and returns the body.
    pub async fn evaluate(
        &self,
        method: ApiMethod,
        path: &[(&str, &str)],
        params: &[(&str, &str)],
        expected: StatusCode,
    ) -> Result<Value> {
        let response = self.call(method, path, params, expected).await?;
        response
            .json_value()
            .with_context(|| format!("'{}' did not return JSON: {}", method, response.text()))
    }

    /// Applies the asset `name` to the bookinfo namespace.
    pub fn apply_asset(&mut self, name: &str) -> Result<()> {
        let path = self.asset_path(name);
        let namespace = self.config.mesh_bookinfo_namespace.clone();
        ensure!(
            self.oc.apply(&path, &namespace)?,
            "'{}' was neither created nor configured in '{}'",
            name,
            namespace
        );
        if !self.applied.iter().any(|applied| applied == name) {
            self.applied.push(name.to_string());
        }
        Ok(())
    }

    /// Deletes the asset `name` from the bookinfo namespace.
    pub fn delete_asset(&mut self, name: &str) -> Result<()> {
        let path = self.asset_path(name);
        let namespace = self.config.mesh_bookinfo_namespace.clone();
        self.applied.retain(|applied| applied != name);
        ensure!(
            self.oc.delete(&path, &namespace)?,
            "'{}' was not deleted from '{}'",
            name,
            namespace
        );
        Ok(())
    }

    /// Deletes every manifest of the assets directory from the bookinfo namespace, whether or not
    /// it was applied, and returns the number of manifests.
    pub fn remove_all_assets(&mut self) -> Result<usize> {
        let namespace = self.bookinfo_namespace().to_string();
        let mut count = 0;
        for entry in std::fs::read_dir(&self.assets_dir)
            .with_context(|| format!("Unable to read '{}'", self.assets_dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() {
                // Not being deleted only means the objects were already gone.
                self.oc.delete(&path, &namespace)?;
                count += 1;
            }
        }
        self.applied.clear();
        info!("Assets deleted: {}", count);
        Ok(count)
    }

    /// Applies `asset`, waits for the graph to show `badge` on at least as many nodes as before,
    /// deletes `asset` and waits for the count to drop back.
    pub async fn verify_badge_lifecycle(
        &mut self,
        params: &GraphParams,
        asset: &str,
        badge: Badge,
    ) -> Result<()> {
        let namespace = self.bookinfo_namespace().to_string();
        let graph_json = self.client.graph_namespace(&namespace, params).await?;
        let graph_type = graph_json
            .get("graphType")
            .and_then(Value::as_str)
            .ok_or_else(|| format_err!("The graph of '{}' has no graphType", namespace))?;
        ensure!(
            graph_type == params.graph_type.to_string(),
            "Expected a '{}' graph but got '{}'",
            params.graph_type,
            graph_type
        );

        let baseline = graph::badge_count(&self.client, &namespace, params, badge).await?;
        info!("'{}' has {} nodes with {}", namespace, baseline, badge);

        self.apply_asset(asset)?;
        graph::wait_for_badges(
            &self.client,
            &namespace,
            params,
            badge,
            BadgeCondition::AtLeast(baseline),
            &Poller::new("Create", CREATE_TIMEOUT),
        )
        .await?;

        self.delete_asset(asset)?;
        graph::wait_for_badges(
            &self.client,
            &namespace,
            params,
            badge,
            BadgeCondition::AtMost(baseline),
            &Poller::new("Delete", DELETE_TIMEOUT),
        )
        .await?;
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let namespace = self.bookinfo_namespace().to_string();
        for name in self.applied.drain(..) {
            let path = self.assets_dir.join(&name);
            match self.oc.delete(&path, &namespace) {
                Ok(true) => {}
                Ok(false) => eprintln!("asset '{}' was not deleted from '{}'", name, namespace),
                Err(e) => eprintln!("unable to delete asset '{}': {}", name, e),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bundled_assets_exist() {
        let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        for name in [
            CIRCUIT_BREAKER_ASSET,
            VIRTUAL_SERVICE_ASSET,
            REVIEWS_80_20_ASSET,
            REVIEWS_DESTINATION_RULE_ASSET,
        ] {
            assert!(assets.join(name).is_file(), "{}", name);
        }
    }

    #[test]
    fn missing_env_file() {
        let err = Session::from_parts("/no/such/env.yaml", "oc", "assets").unwrap_err();
        assert!(err.to_string().contains("/no/such/env.yaml"));
    }

    #[cfg(unix)]
    mod fake_oc {
        use super::super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::sync::Mutex;
        use tempfile::TempDir;

        /// Held while a test writes or runs the script so that no child inherits an open handle
        /// to it.
        static SPAWN: Mutex<()> = Mutex::new(());

        const ASSETS: [&str; 3] = ["reviews.yaml", "ratings.yaml", "details.yaml"];

        /// A session whose `oc` records `<verb> <file name>` for every call in `oc.log` and
        /// reports success.
        fn session(dir: &TempDir) -> Session {
            let env = dir.path().join("env.yaml");
            std::fs::write(
                &env,
                "kiali_hostname: localhost:20001\nmesh_bookinfo_namespace: bookinfo\n",
            )
            .unwrap();

            let assets = dir.path().join("assets");
            std::fs::create_dir(&assets).unwrap();
            for name in ASSETS {
                std::fs::write(assets.join(name), "kind: VirtualService\n").unwrap();
            }
            std::fs::create_dir(assets.join("nested")).unwrap();

            let oc = dir.path().join("oc");
            std::fs::write(
                &oc,
                format!(
                    "#!/bin/sh\necho \"$1 $(basename \"$5\")\" >> '{}'\n\
                     case \"$1\" in\n\
                     apply) echo 'virtualservice.networking.istio.io/x configured' ;;\n\
                     delete) echo 'virtualservice.networking.istio.io \"x\" deleted' ;;\n\
                     esac\n",
                    dir.path().join("oc.log").display()
                ),
            )
            .unwrap();
            std::fs::set_permissions(&oc, std::fs::Permissions::from_mode(0o755)).unwrap();

            Session::from_parts(env, oc, assets).unwrap()
        }

        fn calls(dir: &TempDir) -> Vec<String> {
            std::fs::read_to_string(dir.path().join("oc.log"))
                .unwrap_or_default()
                .lines()
                .map(str::to_string)
                .collect()
        }

        #[test]
        fn drop_deletes_leftover_assets() {
            let _guard = SPAWN.lock().unwrap_or_else(|e| e.into_inner());
            let dir = tempfile::tempdir().unwrap();
            let mut session = session(&dir);

            session.apply_asset("reviews.yaml").unwrap();
            session.apply_asset("ratings.yaml").unwrap();
            session.apply_asset("reviews.yaml").unwrap();
            assert_eq!(session.applied_assets(), ["reviews.yaml", "ratings.yaml"]);

            session.delete_asset("reviews.yaml").unwrap();
            assert_eq!(session.applied_assets(), ["ratings.yaml"]);

            drop(session);
            assert_eq!(
                calls(&dir),
                [
                    "apply reviews.yaml",
                    "apply ratings.yaml",
                    "apply reviews.yaml",
                    "delete reviews.yaml",
                    "delete ratings.yaml",
                ]
            );
        }

        #[test]
        fn remove_all_assets_deletes_every_file() {
            let _guard = SPAWN.lock().unwrap_or_else(|e| e.into_inner());
            let dir = tempfile::tempdir().unwrap();
            let mut session = session(&dir);

            session.apply_asset("details.yaml").unwrap();
            assert_eq!(session.remove_all_assets().unwrap(), ASSETS.len());
            assert!(session.applied_assets().is_empty());

            drop(session);
            let mut deletes: Vec<_> = calls(&dir)
                .into_iter()
                .filter(|call| call.starts_with("delete "))
                .collect();
            deletes.sort();
            assert_eq!(
                deletes,
                ["delete details.yaml", "delete ratings.yaml", "delete reviews.yaml"]
            );
        }
    }
}
