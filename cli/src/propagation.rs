use anyhow::{Context, Result};
use clap::Parser;
use pkotest_model::clients::K8sObjectClient;
use pkotest_model::constants::DEFAULT_AVAILABILITY_TIMEOUT;
use pkotest_model::wait::{PollSettings, Waiter};
use pkotest_model::{verify_status_propagation, InstallSettings, PropagationCheck};
use std::time::Duration;

/// Create an addon with a broken package image, wait for the failure to show on the addon, then
/// patch in a working image and wait for the addon to become available.
#[derive(Debug, Parser)]
pub(crate) struct Propagation {
    /// How long to wait for each step, in seconds.
    #[clap(long = "timeout-secs", default_value_t = DEFAULT_AVAILABILITY_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// The working package image to patch in.
    #[clap(long = "patched-image")]
    patched_image: Option<String>,
}

impl Propagation {
    pub(crate) async fn run(self, client: K8sObjectClient) -> Result<()> {
        let mut check = PropagationCheck::default();
        if let Some(image) = self.patched_image {
            check.patched_image = image;
        }
        let settings = PollSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            ..PollSettings::default()
        };
        verify_status_propagation(
            &Waiter::new(&client, settings),
            &check,
            &InstallSettings::default(),
        )
        .await
        .context("Status propagation check failed")?;
        println!("Addon '{}' recovered after the image patch.", check.addon_name);
        Ok(())
    }
}
