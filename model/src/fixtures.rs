/*!

Builders for the objects a scenario creates: the `Addon` itself and the secrets the addon operator
discovers in the addon's namespace.

!*/

use crate::clients::{Error as ClientError, ObjectClient, ResourceIdentity};
use crate::constants::{
    APP_CREATED_BY, DEAD_MANS_SNITCH_URL_VALUE, PAGER_DUTY_KEY_VALUE, PAGER_DUTY_SECRET_KEY,
    PARAMETER_FOO1, PARAMETER_FOO2, PKOTEST, REFERENCE_ADDON_CATALOG_SOURCE_IMAGE,
    REFERENCE_ADDON_CHANNEL, REFERENCE_ADDON_PACKAGE_NAME, REFERENCE_ADDON_VERSION,
    SNITCH_URL_SECRET_KEY,
};
use crate::expectation::PresenceFlags;
use crate::wait::{self, exists, Waiter};
use crate::{
    Addon, AddonInstallOlmCommon, AddonInstallSpec, AddonInstallType, AddonNamespace,
    AddonPackageOperator, AddonSpec, EnvObject, SubscriptionConfig,
};
use k8s_openapi::api::core::v1::{Namespace, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use log::debug;
use maplit::btreemap;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use std::collections::BTreeMap;
use std::convert::Infallible;

/// The OLM install settings written into every fixture addon.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstallSettings {
    pub catalog_source_image: String,
    pub channel: String,
    pub package_name: String,
    /// Environment variables passed to the operator's subscription.
    #[serde(default)]
    pub env: Vec<EnvObject>,
}

impl Default for InstallSettings {
    fn default() -> Self {
        Self {
            catalog_source_image: REFERENCE_ADDON_CATALOG_SOURCE_IMAGE.to_string(),
            channel: REFERENCE_ADDON_CHANNEL.to_string(),
            package_name: REFERENCE_ADDON_PACKAGE_NAME.to_string(),
            env: Vec::new(),
        }
    }
}

/// Builds an `Addon` that installs `image` through the package operator into `namespace`.
pub fn addon(name: &str, namespace: &str, image: &str, install: &InstallSettings) -> Addon {
    let mut addon = Addon::new(
        name,
        AddonSpec {
            version: REFERENCE_ADDON_VERSION.to_string(),
            display_name: name.to_string(),
            package_operator: Some(AddonPackageOperator {
                image: image.to_string(),
            }),
            namespaces: vec![AddonNamespace {
                name: namespace.to_string(),
            }],
            install: AddonInstallSpec {
                type_: AddonInstallType::OlmOwnNamespace,
                olm_own_namespace: Some(AddonInstallOlmCommon {
                    namespace: namespace.to_string(),
                    catalog_source_image: install.catalog_source_image.clone(),
                    channel: install.channel.clone(),
                    package_name: install.package_name.clone(),
                    config: Some(SubscriptionConfig {
                        env: install.env.clone(),
                    }),
                }),
            },
        },
    );
    addon.metadata.labels = Some(created_by_label());
    addon
}

fn created_by_label() -> BTreeMap<String, String> {
    btreemap! { APP_CREATED_BY.to_string() => PKOTEST.to_string() }
}

fn secret(name: String, namespace: &str, data: &[(&str, &str)]) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: Some(namespace.to_string()),
            labels: Some(created_by_label()),
            ..ObjectMeta::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| (k.to_string(), ByteString(v.as_bytes().to_vec())))
                .collect(),
        ),
        ..Secret::default()
    }
}

/// `addon-<name>-parameters` holding the two addon parameters.
pub fn parameters_secret(addon_name: &str, namespace: &str) -> Secret {
    secret(
        format!("addon-{}-parameters", addon_name),
        namespace,
        &[PARAMETER_FOO1, PARAMETER_FOO2],
    )
}

/// `<name>-deadmanssnitch` holding the snitch URL.
pub fn dead_mans_snitch_secret(addon_name: &str, namespace: &str) -> Secret {
    secret(
        format!("{}-deadmanssnitch", addon_name),
        namespace,
        &[(SNITCH_URL_SECRET_KEY, DEAD_MANS_SNITCH_URL_VALUE)],
    )
}

/// `<name>-pagerduty` holding the PagerDuty key.
pub fn pager_duty_secret(addon_name: &str, namespace: &str) -> Secret {
    secret(
        format!("{}-pagerduty", addon_name),
        namespace,
        &[(PAGER_DUTY_SECRET_KEY, PAGER_DUTY_KEY_VALUE)],
    )
}

/// The secrets selected by `flags`, in flag order.
pub fn secrets_for(flags: &PresenceFlags, addon_name: &str, namespace: &str) -> Vec<Secret> {
    let mut secrets = Vec::new();
    if flags.parameters_secret_present {
        secrets.push(parameters_secret(addon_name, namespace));
    }
    if flags.snitch_secret_present {
        secrets.push(dead_mans_snitch_secret(addon_name, namespace));
    }
    if flags.pager_duty_key_present {
        secrets.push(pager_duty_secret(addon_name, namespace));
    }
    secrets
}

/// The error type for fixture creation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Unable to create {}: {}", what, source))]
    Create { what: String, source: ClientError },

    #[snafu(display("Namespace for the addon never appeared: {}", source))]
    NamespaceWait { source: wait::Error<Infallible> },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Creates `addon`, waits for the addon operator to create the addon's namespace, then creates the
/// secrets selected by `flags` in that namespace.
pub async fn create_scenario_fixtures<C>(
    waiter: &Waiter<'_, C>,
    addon: &Addon,
    namespace: &str,
    flags: &PresenceFlags,
) -> Result<()>
where
    C: ObjectClient,
{
    let client = waiter.client();
    let addon_name = addon.metadata.name.clone().unwrap_or_default();
    debug!("Creating addon '{}' ({})", addon_name, flags);
    client.create(addon).await.context(CreateSnafu {
        what: format!("addon '{}'", addon_name),
    })?;

    let namespace_identity = ResourceIdentity::cluster_scoped::<Namespace, _>(namespace);
    waiter
        .await_default::<Namespace, _>(&namespace_identity, "to be created", exists())
        .await
        .context(NamespaceWaitSnafu)?;

    for secret in secrets_for(flags, &addon_name, namespace) {
        let name = secret.metadata.name.clone().unwrap_or_default();
        debug!("Creating secret '{}/{}'", namespace, name);
        client.create(&secret).await.context(CreateSnafu {
            what: format!("secret '{}/{}'", namespace, name),
        })?;
    }
    Ok(())
}
