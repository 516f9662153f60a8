//! A thin wrapper around the OpenShift `oc` command line tool, used to add and remove Istio
//! configuration while the suite observes Kiali.

use crate::constants::{KIALI_ACCOUNT_NAME, KIALI_SERVICE_ACCOUNT_NAMESPACE};
use crate::error::{self, Result};
use log::{debug, info, warn};
use snafu::ResultExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Runs `oc` commands against the cluster of the current `oc` login.
#[derive(Debug, Clone)]
pub struct Oc {
    binary: PathBuf,
}

impl Default for Oc {
    fn default() -> Self {
        Self::new("oc")
    }
}

impl Oc {
    pub fn new<P>(binary: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// `oc apply -n <namespace> -f <file>`. Returns `true` when `oc` reports the objects as
    /// created or configured.
    pub fn apply<P>(&self, file: P, namespace: &str) -> Result<bool>
    where
        P: AsRef<Path>,
    {
        let file = absolute(file.as_ref())?;
        info!("Applying '{}' in '{}'", file.display(), namespace);
        let output = self.output(
            self.command()
                .args(["apply", "-n", namespace, "-f"])
                .arg(&file),
        )?;
        Ok(applied(&String::from_utf8_lossy(&output.stdout)))
    }

    /// `oc delete -n <namespace> -f <file>`. Returns `true` when `oc` reports the objects as
    /// deleted.
    pub fn delete<P>(&self, file: P, namespace: &str) -> Result<bool>
    where
        P: AsRef<Path>,
    {
        let file = absolute(file.as_ref())?;
        info!("Deleting '{}' from '{}'", file.display(), namespace);
        let output = self.output(
            self.command()
                .args(["delete", "-n", namespace, "-f"])
                .arg(&file),
        )?;
        Ok(deleted(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Grants the `kiali` cluster role to the Kiali service account.
    pub fn add_cluster_role_to_kiali(&self) -> Result<bool> {
        self.cluster_role_policy("add-cluster-role-to-user", "added")
    }

    /// Revokes the `kiali` cluster role from the Kiali service account.
    pub fn remove_cluster_role_from_kiali(&self) -> Result<bool> {
        self.cluster_role_policy("remove-cluster-role-from-user", "removed")
    }

    fn cluster_role_policy(&self, verb: &str, marker: &str) -> Result<bool> {
        let user = kiali_service_account();
        let output = self.output(self.command().args([
            "adm",
            "policy",
            verb,
            KIALI_ACCOUNT_NAME,
            user.as_str(),
        ]))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let success = stdout.contains(&cluster_role_marker(marker));
        if !success {
            warn!(
                "'{} {}' did not report success: {}",
                verb,
                user,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(success)
    }

    fn command(&self) -> Command {
        Command::new(&self.binary)
    }

    fn output(&self, command: &mut Command) -> Result<Output> {
        debug!("Running {:?}", command);
        let output = command
            .output()
            .context(error::OcSpawnSnafu {
                binary: &self.binary,
            })?;
        debug!(
            "'{}' exited with {}: {}",
            self.binary.display(),
            output.status,
            String::from_utf8_lossy(&output.stdout)
        );
        Ok(output)
    }
}

fn absolute(file: &Path) -> Result<PathBuf> {
    Ok(file
        .canonicalize()
        .context(error::ManifestPathSnafu { path: file })?)
}

fn kiali_service_account() -> String {
    format!(
        "system:serviceaccount:{}:{}",
        KIALI_SERVICE_ACCOUNT_NAMESPACE, KIALI_ACCOUNT_NAME
    )
}

fn cluster_role_marker(verb: &str) -> String {
    format!("cluster role \"{}\" {}", KIALI_ACCOUNT_NAME, verb)
}

fn applied(stdout: &str) -> bool {
    stdout.contains("created") || stdout.contains("configured")
}

fn deleted(stdout: &str) -> bool {
    stdout.contains("deleted")
}
