use super::error::{self, Result};
use super::{AllowNotFound, ResourceIdentity};
use crate::CrdExt;
use core::fmt::Debug;
use kube::api::{DeleteParams, Patch, PatchParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Config, Resource};
use log::trace;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use snafu::{ensure, OptionExt, ResultExt};
use std::path::Path;

/// The bounds shared by every kind of object the suite reads or writes.
pub trait Observable:
    Resource<DynamicType = ()>
    + Serialize
    + DeserializeOwned
    + Debug
    + Clone
    + Send
    + Sync
    + CrdExt
    + 'static
{
}

impl<T> Observable for T where
    T: Resource<DynamicType = ()>
        + Serialize
        + DeserializeOwned
        + Debug
        + Clone
        + Send
        + Sync
        + CrdExt
        + 'static
{
}

/// Identity-addressed access to the object store. This is the only way the poller, the fixtures
/// and the convergence checker touch the cluster.
///
/// This is provided as a trait so that test doubles can be injected in place of a Kubernetes API
/// server. In practice you will use the [`K8sObjectClient`].
#[async_trait::async_trait]
pub trait ObjectClient: Send + Sync {
    /// Get the current state of the object, or `None` if it does not exist. Any other failure is
    /// returned as an error.
    async fn fetch<K>(&self, identity: &ResourceIdentity) -> Result<Option<K>>
    where
        K: Observable;

    /// Create the object. The identity is taken from the object's metadata.
    async fn create<K>(&self, object: &K) -> Result<K>
    where
        K: Observable;

    /// Apply a JSON merge patch to the object.
    async fn merge_patch<K>(&self, identity: &ResourceIdentity, patch: &Value) -> Result<K>
    where
        K: Observable;

    /// Delete the object. Returns `false` if it did not exist.
    async fn delete<K>(&self, identity: &ResourceIdentity) -> Result<bool>
    where
        K: Observable;
}

/// An [`ObjectClient`] that talks to a Kubernetes API server.
///
/// # Example
///
/// ```
///# use pkotest_model::clients::{K8sObjectClient, ObjectClient, ResourceIdentity};
///# use pkotest_model::Addon;
///# async fn no_run() {
/// let client = K8sObjectClient::new().await.unwrap();
/// let identity = ResourceIdentity::cluster_scoped::<Addon, _>("my-addon");
/// let addon: Option<Addon> = client.fetch(&identity).await.unwrap();
///# }
/// ```
#[derive(Clone)]
pub struct K8sObjectClient {
    k8s_client: kube::Client,
}

impl K8sObjectClient {
    /// Create a client using the default `kube::Client` (i.e. `KUBECONFIG` or in-cluster config).
    pub async fn new() -> Result<Self> {
        let k8s_client = kube::Client::try_default()
            .await
            .context(error::InitializationSnafu)?;
        Ok(Self::new_from_k8s_client(k8s_client))
    }

    /// Create a client from the path to a kubeconfig file.
    pub async fn new_from_kubeconfig_path(kubeconfig_path: &Path) -> Result<Self> {
        let kubeconfig = Kubeconfig::read_from(kubeconfig_path).context(error::ConfigReadSnafu)?;
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .context(error::ClientCreateKubeconfigSnafu)?;
        let k8s_client = kube::Client::try_from(config).context(error::InitializationSnafu)?;
        Ok(Self::new_from_k8s_client(k8s_client))
    }

    pub fn new_from_k8s_client(k8s_client: kube::Client) -> Self {
        Self { k8s_client }
    }

    pub fn k8s_client(&self) -> &kube::Client {
        &self.k8s_client
    }

    fn api<K>(&self, namespace: Option<&str>) -> Api<K>
    where
        K: Observable,
    {
        match namespace {
            Some(namespace) => Api::<K>::namespaced(self.k8s_client.clone(), namespace),
            None => Api::<K>::all(self.k8s_client.clone()),
        }
    }
}

fn ensure_kind<K>(identity: &ResourceIdentity) -> Result<()>
where
    K: Observable,
{
    ensure!(
        identity.is_kind::<K>(),
        error::KindMismatchSnafu {
            identity: identity.clone(),
            requested: K::kind(&()),
        }
    );
    Ok(())
}

#[async_trait::async_trait]
impl ObjectClient for K8sObjectClient {
    async fn fetch<K>(&self, identity: &ResourceIdentity) -> Result<Option<K>>
    where
        K: Observable,
    {
        ensure_kind::<K>(identity)?;
        trace!("getting {}", identity);
        self.api::<K>(identity.namespace())
            .get(identity.name())
            .await
            .allow_not_found()
            .context(error::KubeApiCallSnafu {
                method: "get",
                what: identity.to_string(),
            })
    }

    async fn create<K>(&self, object: &K) -> Result<K>
    where
        K: Observable,
    {
        let identity = ResourceIdentity::of(object).context(error::MissingNameSnafu {
            method: "create",
            kind: K::kind(&()),
        })?;
        trace!("creating {}", identity);
        self.api::<K>(identity.namespace())
            .create(&PostParams::default(), object)
            .await
            .context(error::KubeApiCallSnafu {
                method: "create",
                what: identity.to_string(),
            })
    }

    async fn merge_patch<K>(&self, identity: &ResourceIdentity, patch: &Value) -> Result<K>
    where
        K: Observable,
    {
        ensure_kind::<K>(identity)?;
        trace!("patching {} with {}", identity, patch);
        self.api::<K>(identity.namespace())
            .patch(
                identity.name(),
                &PatchParams::default(),
                &Patch::Merge(patch),
            )
            .await
            .context(error::KubeApiCallSnafu {
                method: "patch",
                what: identity.to_string(),
            })
    }

    async fn delete<K>(&self, identity: &ResourceIdentity) -> Result<bool>
    where
        K: Observable,
    {
        ensure_kind::<K>(identity)?;
        trace!("deleting {}", identity);
        Ok(self
            .api::<K>(identity.namespace())
            .delete(identity.name(), &DeleteParams::default())
            .await
            .allow_not_found()
            .context(error::KubeApiCallSnafu {
                method: "delete",
                what: identity.to_string(),
            })?
            .is_some())
    }
}
