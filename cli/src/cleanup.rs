use anyhow::{Context, Result};
use clap::Parser;
use meshtest_model::{EnvironmentConfig, Oc};
use std::path::PathBuf;

/// Delete every manifest of a directory from the bookinfo namespace.
#[derive(Debug, Parser)]
pub(crate) struct Cleanup {
    /// The directory holding the manifests.
    #[clap(long, parse(from_os_str), default_value = "./assets")]
    assets: PathBuf,
}

impl Cleanup {
    pub(crate) fn run(self, config: EnvironmentConfig, oc: Oc) -> Result<()> {
        let namespace = config.mesh_bookinfo_namespace;
        let mut count = 0;
        for entry in std::fs::read_dir(&self.assets)
            .with_context(|| format!("Unable to read '{}'", self.assets.display()))?
        {
            let path = entry
                .with_context(|| format!("Unable to read '{}'", self.assets.display()))?
                .path();
            if !path.is_file() {
                continue;
            }
            if oc.delete(&path, &namespace)? {
                println!("Deleted '{}'.", path.display());
            }
            count += 1;
        }
        println!("Assets deleted: {}", count);
        Ok(())
    }
}
