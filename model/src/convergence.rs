/*!

The convergence checker. It waits for the `ClusterPackage` generated for an addon to reach its
terminal status, validates the injected config when the package is available, and then waits,
separately, for the `Addon` to mirror that status.

!*/

use crate::clients::{Error as ClientError, ObjectClient, ResourceIdentity};
use crate::condition::{ConditionStatus, HasConditions};
use crate::constants::{
    CONDITION_AVAILABLE, PROPAGATION_ADDON_NAME, PROPAGATION_BROKEN_IMAGE, PROPAGATION_NAMESPACE,
    PROPAGATION_PATCHED_IMAGE, REASON_UNREADY_CLUSTER_PACKAGE_TEMPLATE,
};
use crate::expectation::{expected_config, ExpectationError, PresenceFlags};
use crate::fixtures::{self, InstallSettings};
use crate::scenario::TerminalStatus;
use crate::wait::{self, exists, has_condition, when_present, Condition, Verdict, Waiter};
use crate::{Addon, ClusterObjectTemplate, ClusterPackage};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_plain::derive_display_from_serialize;
use snafu::{ResultExt, Snafu};
use std::convert::Infallible;

/// The error type for the checker.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Unable to create fixtures: {}", source))]
    Fixture { source: fixtures::Error },

    #[snafu(display("{}", source))]
    Wait {
        source: wait::Error<ExpectationError>,
    },

    #[snafu(display("Unable to patch {}: {}", identity, source))]
    Patch {
        identity: ResourceIdentity,
        source: ClientError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A coarse classification of checker failures, used in reports.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum FailureKind {
    Timeout,
    BudgetExceeded,
    MalformedPayload,
    ExpectationMismatch,
    FetchFailure,
    FixtureFailure,
}

derive_display_from_serialize!(FailureKind);

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Fixture { source } => match source {
                fixtures::Error::NamespaceWait { source } => {
                    deadline_kind(source).unwrap_or(FailureKind::FixtureFailure)
                }
                fixtures::Error::Create { .. } => FailureKind::FixtureFailure,
            },
            Error::Patch { .. } => FailureKind::FixtureFailure,
            Error::Wait { source } => deadline_kind(source).unwrap_or_else(|| match source {
                wait::Error::Condition {
                    source: ExpectationError::MalformedPayload { .. },
                    ..
                } => FailureKind::MalformedPayload,
                _ => FailureKind::ExpectationMismatch,
            }),
        }
    }
}

/// The kind of a wait failure that did not come from the condition itself.
fn deadline_kind<E>(error: &wait::Error<E>) -> Option<FailureKind>
where
    E: std::fmt::Debug + std::fmt::Display + Send + Sync + 'static,
{
    match error {
        wait::Error::Timeout(_) => Some(FailureKind::Timeout),
        wait::Error::BudgetExceeded(_) => Some(FailureKind::BudgetExceeded),
        wait::Error::Fetch { .. } => Some(FailureKind::FetchFailure),
        wait::Error::Condition { .. } => None,
    }
}

/// Runs one wait whose condition cannot fail, reporting its errors in the checker's terms.
async fn await_infallible<C, K, P>(
    waiter: &Waiter<'_, C>,
    identity: &ResourceIdentity,
    description: &str,
    condition: P,
) -> Result<Option<K>>
where
    C: ObjectClient,
    K: crate::clients::Observable,
    P: Condition<K, Error = Infallible>,
{
    waiter
        .await_default(identity, description, condition)
        .await
        .map_err(|e| e.map_condition::<_, ExpectationError>(|never| match never {}))
        .context(WaitSnafu)
}

/// Waits for the package at `package_id` to reach `expected`. When `expected` is
/// [`TerminalStatus::Available`] the package's `spec.config` must also match the config expected
/// for `flags` and `namespace`. Once the package has settled, waits for the addon at `addon_id`
/// to mirror the status in its `Available` condition. The two waits are timed independently.
pub async fn verify_scenario<C>(
    waiter: &Waiter<'_, C>,
    addon_id: &ResourceIdentity,
    package_id: &ResourceIdentity,
    flags: &PresenceFlags,
    namespace: &str,
    expected: TerminalStatus,
) -> Result<()>
where
    C: ObjectClient,
{
    match expected {
        TerminalStatus::Invalid => {
            await_infallible::<_, ClusterPackage, _>(
                waiter,
                package_id,
                "to be Invalid",
                has_condition(expected.condition_type(), ConditionStatus::True, None),
            )
            .await?;
        }
        TerminalStatus::Available => {
            let expected_config = expected_config(*flags, namespace);
            let condition = when_present(|package: &ClusterPackage| {
                if !package.is_condition_true(CONDITION_AVAILABLE) {
                    return Ok(Verdict::pending(format!(
                        "'{}' is not True",
                        CONDITION_AVAILABLE
                    )));
                }
                expected_config.compare(package.spec.config.as_ref())
            });
            waiter
                .await_default::<ClusterPackage, _>(
                    package_id,
                    "to be Available with the expected config",
                    condition,
                )
                .await
                .context(WaitSnafu)?;
        }
    }
    info!("{} reached {}", package_id, expected);

    let mirrored = match expected {
        TerminalStatus::Available => ConditionStatus::True,
        TerminalStatus::Invalid => ConditionStatus::False,
    };
    await_infallible::<_, Addon, _>(
        waiter,
        addon_id,
        &format!("to have {}={}", CONDITION_AVAILABLE, mirrored),
        has_condition(CONDITION_AVAILABLE, mirrored, None),
    )
    .await?;
    Ok(())
}

/// The inputs of the status propagation check.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropagationCheck {
    pub addon_name: String,
    pub namespace: String,
    /// A package image that cannot be pulled.
    pub broken_image: String,
    /// A working package image, patched in after the addon has reported the failure.
    pub patched_image: String,
}

impl Default for PropagationCheck {
    fn default() -> Self {
        Self {
            addon_name: PROPAGATION_ADDON_NAME.to_string(),
            namespace: PROPAGATION_NAMESPACE.to_string(),
            broken_image: PROPAGATION_BROKEN_IMAGE.to_string(),
            patched_image: PROPAGATION_PATCHED_IMAGE.to_string(),
        }
    }
}

impl PropagationCheck {
    pub fn addon_identity(&self) -> ResourceIdentity {
        ResourceIdentity::cluster_scoped::<Addon, _>(&self.addon_name)
    }

    pub fn template_identity(&self) -> ResourceIdentity {
        ResourceIdentity::cluster_scoped::<ClusterObjectTemplate, _>(&self.addon_name)
    }
}

/// Checks that a broken package image surfaces on the addon and that fixing the image clears it.
///
/// Creates an addon with `check.broken_image`, waits for its template and for the addon to
/// report `UnreadyClusterPackageTemplate`, patches in `check.patched_image`, then waits for the
/// template to reference the new image and for the addon to become available.
pub async fn verify_status_propagation<C>(
    waiter: &Waiter<'_, C>,
    check: &PropagationCheck,
    install: &InstallSettings,
) -> Result<()>
where
    C: ObjectClient,
{
    let addon = fixtures::addon(
        &check.addon_name,
        &check.namespace,
        &check.broken_image,
        install,
    );
    let addon_id = check.addon_identity();
    let template_id = check.template_identity();
    waiter
        .client()
        .create(&addon)
        .await
        .context(fixtures::CreateSnafu {
            what: addon_id.to_string(),
        })
        .context(FixtureSnafu)?;

    await_infallible::<_, ClusterObjectTemplate, _>(
        waiter,
        &template_id,
        "to be created",
        exists(),
    )
    .await?;

    await_infallible::<_, Addon, _>(
        waiter,
        &addon_id,
        "to be unavailable",
        has_condition(
            CONDITION_AVAILABLE,
            ConditionStatus::False,
            Some(REASON_UNREADY_CLUSTER_PACKAGE_TEMPLATE),
        ),
    )
    .await?;
    info!("{} reported the broken package image", addon_id);

    let patch = json!({"spec": {"packageOperator": {"image": check.patched_image}}});
    waiter
        .client()
        .merge_patch::<Addon>(&addon_id, &patch)
        .await
        .context(PatchSnafu {
            identity: addon_id.clone(),
        })?;

    let patched_image = check.patched_image.as_str();
    await_infallible::<_, ClusterObjectTemplate, _>(
        waiter,
        &template_id,
        "to be patched",
        when_present(|template: &ClusterObjectTemplate| {
            Ok::<_, Infallible>(if template.references_image(patched_image) {
                Verdict::Done
            } else {
                Verdict::pending(format!("template does not reference '{}'", patched_image))
            })
        }),
    )
    .await?;

    await_infallible::<_, Addon, _>(
        waiter,
        &addon_id,
        "to be available",
        has_condition(CONDITION_AVAILABLE, ConditionStatus::True, None),
    )
    .await?;
    info!("{} recovered after the image patch", addon_id);
    Ok(())
}
