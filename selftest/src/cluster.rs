use crate::TestSettings;
use anyhow::{format_err, Context, Result};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{Api, Client};
use pkotest_model::clients::K8sObjectClient;
use pkotest_model::constants::{ADDONS_GROUP, PKO_GROUP};
use pkotest_model::wait::Waiter;
use std::time::Duration;

/// The CRDs that must be served before the scenarios can run.
const REQUIRED_CRDS: [(&str, &str); 3] = [
    ("addons", ADDONS_GROUP),
    ("clusterpackages", PKO_GROUP),
    ("clusterobjecttemplates", PKO_GROUP),
];

/// A connection to the cluster under test. Unlike the objects the scenarios create, the cluster
/// itself is not managed here: it must already run the addon operator and the package operator.
#[derive(Clone)]
pub struct Cluster {
    client: K8sObjectClient,
}

impl Cluster {
    /// Connects using `PKOTEST_KUBECONFIG_PATH`, or the default kubeconfig when it is not set.
    pub async fn connect() -> Result<Cluster> {
        let client = match TestSettings::kubeconfig_path() {
            Some(path) => K8sObjectClient::new_from_kubeconfig_path(path).await,
            None => K8sObjectClient::new().await,
        }
        .context("Unable to connect to the cluster under test")?;
        Ok(Self { client })
    }

    pub fn k8s_client(&self) -> Client {
        self.client.k8s_client().clone()
    }

    /// A waiter configured from the environment.
    pub fn waiter(&self) -> Waiter<'_, K8sObjectClient> {
        let waiter = Waiter::new(&self.client, TestSettings::poll_settings());
        match TestSettings::suite_budget() {
            Some(budget) => waiter.with_budget(budget),
            None => waiter,
        }
    }

    /// Returns `true` if the CRD for `plural` in `group` is installed.
    pub async fn is_crd_installed(&self, plural: &str, group: &str) -> Result<bool> {
        let api = Api::<CustomResourceDefinition>::all(self.k8s_client());
        Ok(api.get_opt(&format!("{}.{}", plural, group)).await?.is_some())
    }

    /// Waits until the addon operator and package operator CRDs are installed.
    pub async fn wait_for_operators(&self, duration: Duration) -> Result<()> {
        tokio::time::timeout(duration, self.wait_for_operators_loop())
            .await
            .map_err(|_| format_err!("Timed out waiting for the operator CRDs"))?
    }

    async fn wait_for_operators_loop(&self) -> Result<()> {
        loop {
            let mut installed = true;
            for (plural, group) in REQUIRED_CRDS {
                installed &= self.is_crd_installed(plural, group).await?;
            }
            if installed {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(1000)).await;
        }
    }
}
