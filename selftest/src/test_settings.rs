use meshtest_model::constants::DEFAULT_ENV_FILE;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Test settings provides a way to send arguments into the Rust tests using environment variables.
pub(super) struct TestSettings {}

impl TestSettings {
    /// The path to the environment file describing the cluster under test.
    pub(super) fn env_file() -> &'static Path {
        TEST_SETTINGS.env_file.as_path()
    }

    /// The path or name of the `oc` binary.
    pub(super) fn oc_path() -> &'static Path {
        TEST_SETTINGS.oc_path.as_path()
    }

    /// The directory holding the Istio manifests applied by the scenarios.
    pub(super) fn assets_dir() -> &'static Path {
        TEST_SETTINGS.assets_dir.as_path()
    }
}

#[derive(Debug, Deserialize)]
struct Inner {
    /// The environment file. Defaults to `./config/env.yaml`.
    ///
    /// # Example
    ///
    /// ```text
    /// MESHTEST_ENV_FILE=/wherever/env.yaml
    /// ```
    #[serde(default = "env_file")]
    env_file: PathBuf,

    /// The path to the [oc] binary. Defaults to `oc` (i.e. by default the oc binary is expected to
    /// be found via `$PATH`).
    ///
    /// [oc]: https://docs.openshift.com/container-platform/latest/cli_reference/openshift_cli/getting-started-cli.html
    #[serde(default = "oc")]
    oc_path: PathBuf,

    /// Defaults to the `assets` directory of this crate.
    #[serde(default = "assets_dir")]
    assets_dir: PathBuf,
}

lazy_static::lazy_static! {
    static ref TEST_SETTINGS: Inner =
        envy::prefixed("MESHTEST_")
            .from_env::<Inner>()
            .expect("Error parsing TestSettings environment variables");
}

fn env_file() -> PathBuf {
    PathBuf::from(DEFAULT_ENV_FILE)
}

fn oc() -> PathBuf {
    PathBuf::from("oc")
}

fn assets_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets")
}
