use crate::condition::{HasConditions, StatusCondition};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An addon managed by the addon operator. The `CustomResource` derive also produces a struct named
/// `Addon` which represents an addon object in the k8s API. Only the fields that the conformance
/// suite writes or inspects are modeled.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    derive = "Default",
    derive = "PartialEq",
    group = "addons.managed.openshift.io",
    kind = "Addon",
    plural = "addons",
    singular = "addon",
    status = "AddonStatus",
    version = "v1alpha1"
)]
#[serde(rename_all = "camelCase")]
pub struct AddonSpec {
    pub version: String,
    pub display_name: String,
    /// When present, the addon operator renders a `ClusterObjectTemplate` that installs this
    /// package image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_operator: Option<AddonPackageOperator>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<AddonNamespace>,
    pub install: AddonInstallSpec,
}

#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone, JsonSchema)]
pub struct AddonPackageOperator {
    pub image: String,
}

#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone, JsonSchema)]
pub struct AddonNamespace {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Copy, JsonSchema)]
pub enum AddonInstallType {
    #[serde(rename = "OLMOwnNamespace")]
    OlmOwnNamespace,
}

impl Default for AddonInstallType {
    fn default() -> Self {
        AddonInstallType::OlmOwnNamespace
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddonInstallSpec {
    #[serde(rename = "type")]
    pub type_: AddonInstallType,
    #[serde(
        default,
        rename = "olmOwnNamespace",
        skip_serializing_if = "Option::is_none"
    )]
    pub olm_own_namespace: Option<AddonInstallOlmCommon>,
}

/// Settings shared by all OLM install types.
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddonInstallOlmCommon {
    pub namespace: String,
    pub catalog_source_image: String,
    pub channel: String,
    pub package_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<SubscriptionConfig>,
}

#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone, JsonSchema)]
pub struct SubscriptionConfig {
    #[serde(default)]
    pub env: Vec<EnvObject>,
}

#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone, JsonSchema)]
pub struct EnvObject {
    pub name: String,
    pub value: String,
}

/// The status field of the `Addon`. The addon operator mirrors the state of the generated
/// `ClusterPackage` into the `Available` condition.
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddonStatus {
    #[serde(default)]
    pub conditions: Vec<StatusCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

impl Addon {
    /// The package image requested by the spec, if any.
    pub fn package_image(&self) -> Option<&str> {
        self.spec
            .package_operator
            .as_ref()
            .map(|pko| pko.image.as_str())
    }
}

impl HasConditions for Addon {
    fn conditions(&self) -> &[StatusCondition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }
}
