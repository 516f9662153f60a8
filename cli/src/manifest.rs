use anyhow::{ensure, Result};
use clap::Parser;
use meshtest_model::{EnvironmentConfig, Oc};
use std::path::PathBuf;

/// Apply a manifest to a namespace.
#[derive(Debug, Parser)]
pub(crate) struct Apply {
    /// Path to the manifest.
    #[clap(parse(from_os_str))]
    file: PathBuf,

    /// The namespace to apply to. Defaults to the bookinfo namespace of the environment.
    #[clap(long, short = 'n')]
    namespace: Option<String>,
}

impl Apply {
    pub(crate) fn run(self, config: EnvironmentConfig, oc: Oc) -> Result<()> {
        let namespace = self
            .namespace
            .unwrap_or(config.mesh_bookinfo_namespace);
        ensure!(
            oc.apply(&self.file, &namespace)?,
            "'{}' was neither created nor configured in '{}'",
            self.file.display(),
            namespace
        );
        println!("Applied '{}' to '{}'.", self.file.display(), namespace);
        Ok(())
    }
}

/// Delete the objects of a manifest from a namespace.
#[derive(Debug, Parser)]
pub(crate) struct Delete {
    /// Path to the manifest.
    #[clap(parse(from_os_str))]
    file: PathBuf,

    /// The namespace to delete from. Defaults to the bookinfo namespace of the environment.
    #[clap(long, short = 'n')]
    namespace: Option<String>,
}

impl Delete {
    pub(crate) fn run(self, config: EnvironmentConfig, oc: Oc) -> Result<()> {
        let namespace = self
            .namespace
            .unwrap_or(config.mesh_bookinfo_namespace);
        ensure!(
            oc.delete(&self.file, &namespace)?,
            "'{}' was not deleted from '{}'",
            self.file.display(),
            namespace
        );
        println!("Deleted '{}' from '{}'.", self.file.display(), namespace);
        Ok(())
    }
}
