use anyhow::Result;
use clap::Parser;
use meshtest_model::ApiMethod;

/// List the operation ids of the Kiali API with their path templates.
#[derive(Debug, Parser)]
pub(crate) struct Methods {
    /// Print only the operation ids.
    #[clap(long = "names-only")]
    names_only: bool,
}

impl Methods {
    pub(crate) fn run(self) -> Result<()> {
        for method in ApiMethod::ALL {
            if self.names_only {
                println!("{}", method);
            } else {
                println!(
                    "{:<28} {} {}",
                    method.to_string(),
                    method.http_method(),
                    method.path_template()
                );
            }
        }
        Ok(())
    }
}
