use std::time::Duration;

/// Helper macro to avoid retyping the API group of the addon operator when creating further string
/// constants from it. When given no parameters, this returns the group name. When given a string
/// literal parameter it adds `/parameter` to the end.
macro_rules! addons {
    () => {
        "addons.managed.openshift.io"
    };
    ($s:literal) => {
        concat!(addons!(), "/", $s)
    };
}

/// Same as `addons!` for the package operator API group.
macro_rules! pko {
    () => {
        "package-operator.run"
    };
    ($s:literal) => {
        concat!(pko!(), "/", $s)
    };
}

// System identifiers
pub const ADDONS_GROUP: &str = addons!();
pub const ADDONS_API_VERSION: &str = addons!("v1alpha1");
pub const PKO_GROUP: &str = pko!();
pub const PKO_API_VERSION: &str = pko!("v1alpha1");

// Condition types
pub const CONDITION_AVAILABLE: &str = "Available";
pub const CONDITION_INVALID: &str = "Invalid";

// Condition reasons
pub const REASON_UNREADY_CLUSTER_PACKAGE_TEMPLATE: &str = "UnreadyClusterPackageTemplate";

// The outer key of a `ClusterPackage` configuration payload.
pub const CONFIG_ROOT_KEY: &str = "addonsv1";

// Literal values known to the environment under test. The reconciler injects the cluster ids from
// the cluster version object of the test environment.
pub const CLUSTER_ID_VALUE: &str = "a440b136-b2d6-406b-a884-fca2d62cd170";
pub const OCM_CLUSTER_ID_VALUE: &str = "foobar";
pub const DEAD_MANS_SNITCH_URL_VALUE: &str = "https://example.com/test-snitch-url";
pub const PAGER_DUTY_KEY_VALUE: &str = "1234567890ABCDEF";

// Addon parameter secret data.
pub const PARAMETER_FOO1: (&str, &str) = ("foo1", "bar");
pub const PARAMETER_FOO2: (&str, &str) = ("foo2", "baz");

// Secret data keys read by the reconciler.
pub const SNITCH_URL_SECRET_KEY: &str = "SNITCH_URL";
pub const PAGER_DUTY_SECRET_KEY: &str = "PAGERDUTY_KEY";

// Scenario identity prefixes. Each scenario appends `-<index>`.
pub const SCENARIO_ADDON_NAME: &str = "addonname-pko-boatboat";
pub const SCENARIO_ADDON_NAMESPACE: &str = "namespace-onbgdions";

// Package images. The optional-params package treats every injected input as optional, the
// required-params package fails validation unless all of them are present.
pub const PKO_IMAGE_OPTIONAL_PARAMS: &str = "quay.io/alcosta/package-operator-packages/openshift/addon-operator/apnp-test-optional-params:v2.0";
pub const PKO_IMAGE_REQUIRED_PARAMS: &str = "quay.io/alcosta/package-operator-packages/openshift/addon-operator/apnp-test-required-params:v2.0";

// Status propagation scenario.
pub const PROPAGATION_ADDON_NAME: &str = "addonname-pko-boatboat";
pub const PROPAGATION_NAMESPACE: &str = "redhat-reference-addon";
pub const PROPAGATION_BROKEN_IMAGE: &str = "nonExistantImage";
pub const PROPAGATION_PATCHED_IMAGE: &str = "quay.io/osd-addons/reference-addon-package:56916cb";

// OLM install fixture values.
pub const REFERENCE_ADDON_CATALOG_SOURCE_IMAGE: &str = "quay.io/osd-addons/reference-addon-index:latest";
pub const REFERENCE_ADDON_CHANNEL: &str = "alpha";
pub const REFERENCE_ADDON_PACKAGE_NAME: &str = "reference-addon";
pub const REFERENCE_ADDON_VERSION: &str = "1.0";

// Polling defaults
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Shorter poll intervals are raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(10 * 60);

// Standard tags https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
pub const APP_CREATED_BY: &str = "app.kubernetes.io/created-by";
pub const PKOTEST: &str = "pkotest";

#[test]
fn api_group_macro_test() {
    assert_eq!("addons.managed.openshift.io", addons!());
    assert_eq!("addons.managed.openshift.io/v1alpha1", ADDONS_API_VERSION);
    assert_eq!("package-operator.run/v1alpha1", PKO_API_VERSION);
    assert_eq!("package-operator.run/foo", pko!("foo"));
}
