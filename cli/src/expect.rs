use anyhow::{Context, Result};
use clap::Parser;
use pkotest_model::{expected_config, PresenceFlags};

/// Print the `spec.config` a `ClusterPackage` should hold when the given secrets are present.
#[derive(Debug, Parser)]
pub(crate) struct Expect {
    /// The addon parameters secret is present.
    #[clap(long)]
    parameters: bool,

    /// The Dead Man's Snitch secret is present.
    #[clap(long)]
    snitch: bool,

    /// The PagerDuty secret is present.
    #[clap(long = "pager-duty")]
    pager_duty: bool,

    /// The namespace the addon installs into.
    #[clap(long, default_value = "namespace-onbgdions-0")]
    namespace: String,
}

impl Expect {
    pub(crate) fn run(self) -> Result<()> {
        let flags = PresenceFlags::new(self.parameters, self.snitch, self.pager_duty);
        let expected = expected_config(flags, &self.namespace);
        println!(
            "{}",
            serde_json::to_string_pretty(&expected.to_payload())
                .context("Could not create string from the expected config.")?
        );
        Ok(())
    }
}
