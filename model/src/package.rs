use crate::condition::{HasConditions, StatusCondition};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A cluster-scoped package installation owned by the package operator. The addon operator
/// generates one per addon (same name as the addon) through a `ClusterObjectTemplate`, injecting
/// the discovered secrets into `spec.config`.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    derive = "Default",
    derive = "PartialEq",
    group = "package-operator.run",
    kind = "ClusterPackage",
    plural = "clusterpackages",
    singular = "clusterpackage",
    status = "PackageStatus",
    version = "v1alpha1"
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterPackageSpec {
    /// The package image to install.
    pub image: String,
    /// The raw configuration handed to the package templates. For addon packages this is an
    /// object with a single `addonsv1` key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackageStatus {
    #[serde(default)]
    pub conditions: Vec<StatusCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

impl HasConditions for ClusterPackage {
    fn conditions(&self) -> &[StatusCondition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }
}

/// A template that the package operator renders into an object once all of its sources can be
/// read. The addon operator writes one per addon, with the same name as the addon.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    derive = "Default",
    derive = "PartialEq",
    group = "package-operator.run",
    kind = "ClusterObjectTemplate",
    plural = "clusterobjecttemplates",
    singular = "clusterobjecttemplate",
    status = "PackageStatus",
    version = "v1alpha1"
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterObjectTemplateSpec {
    /// The Go template of the rendered object, as a YAML string.
    pub template: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<ObjectTemplateSource>,
}

#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTemplateSource {
    pub api_version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
    #[serde(default)]
    pub items: Vec<ObjectTemplateSourceItem>,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone, JsonSchema)]
pub struct ObjectTemplateSourceItem {
    pub key: String,
    pub destination: String,
}

impl ClusterObjectTemplate {
    /// Whether the rendered template references `image`.
    pub fn references_image(&self, image: &str) -> bool {
        self.spec.template.contains(image)
    }
}

impl HasConditions for ClusterObjectTemplate {
    fn conditions(&self) -> &[StatusCondition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }
}
