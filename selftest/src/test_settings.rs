use pkotest_model::constants::{PKO_IMAGE_OPTIONAL_PARAMS, PKO_IMAGE_REQUIRED_PARAMS};
use pkotest_model::wait::{PollSettings, SuiteBudget};
use pkotest_model::ImageSet;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Test settings provides a way to send arguments into the Rust tests using environment variables.
pub struct TestSettings {}

impl TestSettings {
    /// The kubeconfig to connect with. When `None`, the default `kube::Client` configuration is
    /// used.
    pub fn kubeconfig_path() -> Option<&'static Path> {
        TEST_SETTINGS.kubeconfig_path.as_deref().map(Path::new)
    }

    pub fn poll_settings() -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(TEST_SETTINGS.poll_interval_secs),
            timeout: Duration::from_secs(TEST_SETTINGS.timeout_secs),
        }
    }

    /// A budget for the whole run, starting now, if one was requested.
    pub fn suite_budget() -> Option<SuiteBudget> {
        TEST_SETTINGS
            .suite_budget_secs
            .map(|secs| SuiteBudget::starting_now(Duration::from_secs(secs)))
    }

    pub fn images() -> ImageSet {
        ImageSet {
            optional_params: TEST_SETTINGS.optional_params_image.clone(),
            required_params: TEST_SETTINGS.required_params_image.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Inner {
    /// The path to the kubeconfig of the cluster under test.
    ///
    /// # Example
    ///
    /// ```text
    /// PKOTEST_KUBECONFIG_PATH=/wherever/kubeconfig.yaml
    /// ```
    #[serde(default)]
    kubeconfig_path: Option<String>,
    #[serde(default = "poll_interval_secs")]
    poll_interval_secs: u64,
    /// Per-wait timeout. Defaults to ten minutes.
    #[serde(default = "timeout_secs")]
    timeout_secs: u64,
    #[serde(default)]
    suite_budget_secs: Option<u64>,
    #[serde(default = "optional_params_image")]
    optional_params_image: String,
    #[serde(default = "required_params_image")]
    required_params_image: String,
}

lazy_static::lazy_static! {
    static ref TEST_SETTINGS: Inner =
        envy::prefixed("PKOTEST_")
            .from_env::<Inner>()
            .expect("Error parsing TestSettings environment variables");
}

// Defaults for serde.

fn poll_interval_secs() -> u64 {
    PollSettings::default().interval.as_secs()
}

fn timeout_secs() -> u64 {
    PollSettings::default().timeout.as_secs()
}

fn optional_params_image() -> String {
    PKO_IMAGE_OPTIONAL_PARAMS.to_string()
}

fn required_params_image() -> String {
    PKO_IMAGE_REQUIRED_PARAMS.to_string()
}
