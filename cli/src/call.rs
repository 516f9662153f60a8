use anyhow::{Context, Result};
use clap::Parser;
use meshtest_model::clients::StatusCode;
use meshtest_model::{ApiMethod, EnvironmentConfig, KialiApi, KialiClient};

/// Call a Kiali API operation and print the JSON body of the response.
#[derive(Debug, Parser)]
pub(crate) struct Call {
    /// The operation id, e.g. `namespaceHealth`. See `meshtest methods`.
    method: ApiMethod,

    /// A path parameter (key=value). May be repeated.
    #[clap(long = "path", parse(try_from_str = parse_key_val))]
    path: Vec<(String, String)>,

    /// A query parameter (key=value). May be repeated.
    #[clap(long = "param", parse(try_from_str = parse_key_val))]
    params: Vec<(String, String)>,

    /// The status the response must have.
    #[clap(long = "expect-status", default_value = "200")]
    expect_status: u16,
}

impl Call {
    pub(crate) async fn run(self, config: EnvironmentConfig) -> Result<()> {
        let expected = StatusCode::from_u16(self.expect_status)
            .with_context(|| format!("'{}' is not an HTTP status", self.expect_status))?;
        let client = KialiClient::new(&config).context("Unable to create the Kiali client")?;
        let path = pairs(&self.path);
        let params = pairs(&self.params);
        let body = client
            .request(self.method, &path, &params)
            .await
            .with_context(|| format!("Unable to call '{}'", self.method))?
            .expect_status(expected)?
            .json_value()?;
        println!(
            "{}",
            serde_json::to_string_pretty(&body).context("Could not create string from body.")?
        );
        Ok(())
    }
}

fn pairs(args: &[(String, String)]) -> Vec<(&str, &str)> {
    args.iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect()
}

pub(crate) fn parse_key_val(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .with_context(|| format!("'{}' is not of the form key=value", s))?;
    Ok((key.to_string(), value.to_string()))
}
