use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
pub struct Error(OpaqueError);
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum OpaqueError {
    #[snafu(display("Unable to read environment file '{}': {}", path.display(), source))]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to parse environment file '{}': {}", path.display(), source))]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[snafu(display("Unable to parse environment yaml: {}", source))]
    ConfigYaml { source: serde_yaml::Error },

    #[snafu(display("Parse error: {}", source))]
    SerdePlain { source: serde_plain::Error },

    #[snafu(display("Unable to run '{}': {}", binary.display(), source))]
    OcSpawn {
        binary: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to resolve manifest '{}': {}", path.display(), source))]
    ManifestPath {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("No URL is configured for the {} cluster role", what))]
    ClusterRoleUrlMissing { what: String },

    #[snafu(display("Unable to fetch the cluster role from '{}': {}", url, source))]
    ClusterRoleFetch { url: String, source: reqwest::Error },

    #[snafu(display("Unable to parse the cluster role from '{}': {}", url, source))]
    ClusterRoleParse {
        url: String,
        source: serde_yaml::Error,
    },

    #[snafu(display("Invalid pattern '{}': {}", pattern, source))]
    Regex {
        pattern: String,
        source: regex::Error,
    },
}
