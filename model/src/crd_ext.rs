use crate::condition::{summarize_conditions, HasConditions};
use crate::{Addon, ClusterObjectTemplate, ClusterPackage};
use k8s_openapi::api::core::v1::{Namespace, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Provides some conveniences for querying a `kube-rs` object that the suite observes.
pub trait CrdExt {
    /// Returns this objects `ObjectMeta` information (i.e. the `metadata` field).
    fn object_meta(&self) -> &ObjectMeta;

    /// A one-line description of the observed status, included in timeout errors.
    fn status_summary(&self) -> String;
}

macro_rules! impl_crd_ext_with_conditions {
    ($t:ty) => {
        impl CrdExt for $t {
            fn object_meta(&self) -> &ObjectMeta {
                &self.metadata
            }

            fn status_summary(&self) -> String {
                summarize_conditions(self.conditions())
            }
        }
    };
}

impl_crd_ext_with_conditions!(Addon);
impl_crd_ext_with_conditions!(ClusterPackage);
impl_crd_ext_with_conditions!(ClusterObjectTemplate);

impl CrdExt for Namespace {
    fn object_meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn status_summary(&self) -> String {
        let phase = self
            .status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .unwrap_or("Unknown");
        format!("phase={}", phase)
    }
}

impl CrdExt for Secret {
    fn object_meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    /// Only the keys, never the secret values.
    fn status_summary(&self) -> String {
        let keys = self
            .data
            .as_ref()
            .map(|data| data.keys().cloned().collect::<Vec<_>>().join(","))
            .unwrap_or_default();
        format!("keys=[{}]", keys)
    }
}
